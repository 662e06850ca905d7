use std::path::{Path, MAIN_SEPARATOR};

/// Build the object key for a discovered file
///
/// The source folder is removed from the front of `file_path` as a string, one
/// leading separator is dropped, and the remainder (or only its file name when
/// `flatten` is set) is placed under `target_folder`. The result always uses `/`.
///
/// # Arguments
///
/// * `file_path` - Absolute path yielded by discovery, inside `source_folder`
/// * `source_folder` - Root the selection was made from
/// * `target_folder` - Optional key prefix; empty means the bucket root
/// * `flatten` - Drop the directory structure below `source_folder`
pub fn normalize_key(
    file_path: &Path,
    source_folder: &Path,
    target_folder: Option<&str>,
    flatten: bool,
) -> String {
    normalize_key_with(
        &file_path.to_string_lossy(),
        &source_folder.to_string_lossy(),
        target_folder,
        flatten,
        MAIN_SEPARATOR,
    )
}

/// [`normalize_key`] over plain strings with an explicit host separator
pub fn normalize_key_with(
    file_path: &str,
    source_folder: &str,
    target_folder: Option<&str>,
    flatten: bool,
    separator: char,
) -> String {
    let relative = file_path.strip_prefix(source_folder).unwrap_or(file_path);
    let relative = relative.strip_prefix(separator).unwrap_or(relative);

    let name = if flatten {
        relative.rsplit(separator).next().unwrap_or(relative)
    } else {
        relative
    };

    let target = target_folder
        .unwrap_or_default()
        .trim_matches(|c| c == separator || c == '/');

    let joined = if target.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", target, separator, name)
    };

    if separator == '/' {
        joined
    } else {
        joined.replace(separator, "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn key(file: &str, target: Option<&str>, flatten: bool) -> String {
        normalize_key_with(file, "/build/out", target, flatten, '/')
    }

    #[test]
    fn test_keys_preserve_structure() {
        assert_eq!(key("/build/out/a.txt", Some("release"), false), "release/a.txt");
        assert_eq!(
            key("/build/out/img/b.png", Some("release"), false),
            "release/img/b.png"
        );
    }

    #[test]
    fn test_keys_flattened() {
        assert_eq!(key("/build/out/a.txt", Some("release"), true), "release/a.txt");
        assert_eq!(key("/build/out/img/b.png", Some("release"), true), "release/b.png");
    }

    #[test]
    fn test_no_target_folder_has_no_leading_slash() {
        assert_eq!(key("/build/out/img/b.png", None, false), "img/b.png");
        assert_eq!(key("/build/out/img/b.png", Some(""), false), "img/b.png");
        assert_eq!(key("/build/out/img/b.png", None, true), "b.png");
    }

    #[test]
    fn test_target_folder_edges_trimmed() {
        assert_eq!(key("/build/out/a.txt", Some("release/"), false), "release/a.txt");
        assert_eq!(key("/build/out/a.txt", Some("/release"), false), "release/a.txt");
        assert_eq!(
            key("/build/out/a.txt", Some("release/v1"), false),
            "release/v1/a.txt"
        );
    }

    #[test]
    fn test_source_folder_with_trailing_separator() {
        assert_eq!(
            normalize_key_with("/build/out/img/b.png", "/build/out/", None, false, '/'),
            "img/b.png"
        );
    }

    #[test]
    fn test_backslash_host_separator() {
        let k = normalize_key_with(
            r"C:\build\out\img\nested\b.png",
            r"C:\build\out",
            Some(r"release\v1"),
            false,
            '\\',
        );
        assert_eq!(k, "release/v1/img/nested/b.png");

        let k = normalize_key_with(r"C:\build\out\img\b.png", r"C:\build\out", None, true, '\\');
        assert_eq!(k, "b.png");
    }

    #[test]
    fn test_keys_are_deterministic() {
        let first = key("/build/out/img/b.png", Some("release"), false);
        let second = key("/build/out/img/b.png", Some("release"), false);
        assert_eq!(first, second);
    }

    #[test]
    fn test_flatten_collides_on_same_name() {
        let a = key("/build/out/x/logo.png", Some("assets"), true);
        let b = key("/build/out/x/y/z/logo.png", Some("assets"), true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_structure_preserving_keys_are_distinct() {
        let files = [
            "/build/out/logo.png",
            "/build/out/x/logo.png",
            "/build/out/x/y/logo.png",
            "/build/out/xy/logo.png",
            "/build/out/x/ylogo.png",
        ];
        let keys: HashSet<String> = files
            .iter()
            .map(|f| key(f, Some("assets"), false))
            .collect();
        assert_eq!(keys.len(), files.len());
        assert!(keys.iter().all(|k| !k.starts_with('/')));
    }

    #[test]
    fn test_normalize_key_on_host_paths() {
        let source = Path::new(std::path::MAIN_SEPARATOR_STR)
            .join("build")
            .join("out");
        let file = source.join("img").join("b.png");
        assert_eq!(
            normalize_key(&file, &source, Some("release"), false),
            "release/img/b.png"
        );
    }
}
