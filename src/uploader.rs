use std::path::PathBuf;

use aws_sdk_s3::types::ObjectCannedAcl;

use crate::config::UploadConfig;
use crate::discovery::find_files;
use crate::error::{Result, UploadError};
use crate::key::normalize_key;
use crate::report::{Reporter, UploadEvent};
use crate::s3::{ObjectStore, PutObject};

/// A discovered file and where it will go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpload {
    pub path: PathBuf,
    pub key: String,
    pub content_type: Option<String>,
}

/// Totals of a fully successful pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub files: usize,
    pub bytes: u64,
}

/// Validate `config`, discover files and work out each key and content type
///
/// Nothing is uploaded; the order is the order uploads will happen in.
pub fn plan(config: &UploadConfig) -> Result<Vec<PlannedUpload>> {
    config.validate()?;

    let files = find_files(&config.source_folder, &config.content_pattern)?;

    Ok(files
        .into_iter()
        .map(|path| {
            let key = normalize_key(
                &path,
                &config.source_folder,
                config.target_folder.as_deref(),
                config.flatten,
            );
            let content_type = config.content_type.resolve(&path);
            PlannedUpload {
                path,
                key,
                content_type,
            }
        })
        .collect())
}

/// Uploads a selection of files one after another, stopping at the first failure
pub struct Uploader<'a, S, R> {
    store: &'a S,
    reporter: &'a R,
}

impl<'a, S: ObjectStore, R: Reporter> Uploader<'a, S, R> {
    pub fn new(store: &'a S, reporter: &'a R) -> Self {
        Self { store, reporter }
    }

    /// Run one upload pass
    ///
    /// An empty selection is a success. The first failed file ends the pass with
    /// [`UploadError::Transfer`]; files after it are not attempted.
    pub async fn run(&self, config: &UploadConfig) -> Result<UploadSummary> {
        self.reporter.report(&UploadEvent::Started {
            source: &config.source_folder,
            target: config.target_display(),
            bucket: &config.spaces.bucket,
        });

        let planned = plan(config)?;
        let mut summary = UploadSummary::default();

        if planned.is_empty() {
            self.reporter.report(&UploadEvent::NoFiles {
                source: &config.source_folder,
                pattern: &config.content_pattern,
            });
            return Ok(summary);
        }

        let acl = ObjectCannedAcl::from(config.acl);

        for item in &planned {
            let bytes = self.upload_one(config, &acl, item).await?;
            summary.files += 1;
            summary.bytes += bytes;
        }

        self.reporter.report(&UploadEvent::Finished {
            files: summary.files,
            bytes: summary.bytes,
        });

        Ok(summary)
    }

    async fn upload_one(
        &self,
        config: &UploadConfig,
        acl: &ObjectCannedAcl,
        item: &PlannedUpload,
    ) -> Result<u64> {
        self.reporter.report(&UploadEvent::FileStarted {
            path: &item.path,
            key: &item.key,
            content_type: item.content_type.as_deref(),
        });

        let request = PutObject {
            bucket: &config.spaces.bucket,
            key: &item.key,
            acl,
            local_path: &item.path,
            content_type: item.content_type.as_deref(),
        };

        let mut on_progress = |loaded: u64, total: u64| {
            self.reporter.report(&UploadEvent::FileProgress {
                path: &item.path,
                loaded,
                total,
            });
        };

        match self.store.put_object(request, &mut on_progress).await {
            Ok(bytes) => {
                self.reporter.report(&UploadEvent::FileCompleted {
                    path: &item.path,
                    key: &item.key,
                    bytes,
                });
                Ok(bytes)
            }
            Err(e) => {
                let error = UploadError::transfer(&item.path, &item.key, &e);
                self.reporter.report(&UploadEvent::FileFailed {
                    path: &item.path,
                    error: &error,
                });
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Acl, ContentTypeMode, Credentials, SpacesConfig};
    use crate::s3::ProgressFn;
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        bucket: String,
        key: String,
        acl: ObjectCannedAcl,
        content_type: Option<String>,
    }

    #[derive(Default)]
    struct MockStore {
        calls: RefCell<Vec<Call>>,
        fail_on: Option<usize>,
    }

    impl ObjectStore for MockStore {
        async fn put_object(
            &self,
            request: PutObject<'_>,
            on_progress: &mut ProgressFn<'_>,
        ) -> anyhow::Result<u64> {
            let index = self.calls.borrow().len();
            self.calls.borrow_mut().push(Call {
                bucket: request.bucket.to_string(),
                key: request.key.to_string(),
                acl: request.acl.clone(),
                content_type: request.content_type.map(str::to_string),
            });

            if self.fail_on == Some(index) {
                anyhow::bail!("connection reset by peer");
            }

            let size = fs::metadata(request.local_path)?.len();
            on_progress(size / 2, size);
            on_progress(size, size);
            Ok(size)
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: RefCell<Vec<String>>,
    }

    impl RecordingReporter {
        fn count(&self, kind: &str) -> usize {
            self.events.borrow().iter().filter(|e| e.starts_with(kind)).count()
        }
    }

    impl Reporter for RecordingReporter {
        fn report(&self, event: &UploadEvent<'_>) {
            let kind = match event {
                UploadEvent::Started { .. } => "started",
                UploadEvent::NoFiles { .. } => "no_files",
                UploadEvent::FileStarted { .. } => "file_started",
                UploadEvent::FileProgress { .. } => "file_progress",
                UploadEvent::FileCompleted { .. } => "file_completed",
                UploadEvent::FileFailed { .. } => "file_failed",
                UploadEvent::Finished { .. } => "finished",
            };
            self.events.borrow_mut().push(format!("{}: {}", kind, event));
        }
    }

    fn write_files(root: &Path, files: &[&str]) {
        for file in files {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, file.as_bytes()).unwrap();
        }
    }

    fn config(dir: &TempDir) -> UploadConfig {
        UploadConfig {
            source_folder: dir.path().to_path_buf(),
            content_pattern: "**/*".to_string(),
            target_folder: Some("release".to_string()),
            flatten: false,
            acl: Acl::PublicRead,
            content_type: ContentTypeMode::default(),
            spaces: SpacesConfig {
                region: "nyc3".to_string(),
                endpoint: None,
                bucket: "artifacts".to_string(),
                credentials: Credentials {
                    access_key: "key".to_string(),
                    secret_key: "secret".to_string(),
                },
            },
        }
    }

    fn keys(store: &MockStore) -> Vec<String> {
        store.calls.borrow().iter().map(|c| c.key.clone()).collect()
    }

    #[tokio::test]
    async fn test_uploads_preserve_structure() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), &["a.txt", "img/b.png"]);
        let store = MockStore::default();
        let reporter = RecordingReporter::default();

        let summary = Uploader::new(&store, &reporter)
            .run(&config(&dir))
            .await
            .unwrap();

        assert_eq!(keys(&store), vec!["release/a.txt", "release/img/b.png"]);
        assert_eq!(summary.files, 2);
        assert_eq!(summary.bytes, ("a.txt".len() + "img/b.png".len()) as u64);

        let calls = store.calls.borrow();
        assert!(calls.iter().all(|c| c.bucket == "artifacts"));
        assert!(calls.iter().all(|c| c.acl == ObjectCannedAcl::PublicRead));
        assert_eq!(calls[0].content_type.as_deref(), Some("text/plain"));
        assert_eq!(calls[1].content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn test_uploads_flattened() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), &["a.txt", "img/b.png"]);
        let store = MockStore::default();
        let reporter = RecordingReporter::default();

        let mut config = config(&dir);
        config.flatten = true;
        Uploader::new(&store, &reporter).run(&config).await.unwrap();

        assert_eq!(keys(&store), vec!["release/a.txt", "release/b.png"]);
    }

    #[tokio::test]
    async fn test_empty_selection_succeeds_without_uploads() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), &["a.txt"]);
        let store = MockStore::default();
        let reporter = RecordingReporter::default();

        let mut config = config(&dir);
        config.content_pattern = "**/*.zip".to_string();
        let summary = Uploader::new(&store, &reporter).run(&config).await.unwrap();

        assert_eq!(summary, UploadSummary::default());
        assert!(store.calls.borrow().is_empty());
        assert_eq!(reporter.count("no_files"), 1);
        assert_eq!(reporter.count("finished"), 0);
    }

    #[tokio::test]
    async fn test_first_failure_stops_the_pass() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), &["a.txt", "b.txt", "c.txt"]);
        let store = MockStore {
            fail_on: Some(1),
            ..Default::default()
        };
        let reporter = RecordingReporter::default();

        let err = Uploader::new(&store, &reporter)
            .run(&config(&dir))
            .await
            .unwrap_err();

        match err {
            UploadError::Transfer { path, key, message } => {
                assert_eq!(path, dir.path().join("b.txt"));
                assert_eq!(key, "release/b.txt");
                assert!(message.contains("connection reset by peer"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(keys(&store), vec!["release/a.txt", "release/b.txt"]);
        assert_eq!(reporter.count("file_completed"), 1);
        assert_eq!(reporter.count("file_failed"), 1);
        assert_eq!(reporter.count("finished"), 0);
    }

    #[tokio::test]
    async fn test_progress_events_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("data.bin"), vec![0u8; 4096]).unwrap();
        let store = MockStore::default();
        let reporter = RecordingReporter::default();

        Uploader::new(&store, &reporter)
            .run(&config(&dir))
            .await
            .unwrap();

        let events = reporter.events.borrow();
        let progress: Vec<&String> = events
            .iter()
            .filter(|e| e.starts_with("file_progress"))
            .collect();
        assert_eq!(progress.len(), 2);
        assert!(progress[0].ends_with("2.00 KB / 4.00 KB (50.0%)"));
        assert!(progress[1].ends_with("4.00 KB / 4.00 KB (100.0%)"));
    }

    #[tokio::test]
    async fn test_event_order() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), &["a.txt"]);
        let store = MockStore::default();
        let reporter = RecordingReporter::default();

        Uploader::new(&store, &reporter)
            .run(&config(&dir))
            .await
            .unwrap();

        let kinds: Vec<String> = reporter
            .events
            .borrow()
            .iter()
            .map(|e| e.split(':').next().unwrap().to_string())
            .collect();
        assert_eq!(
            kinds,
            vec![
                "started",
                "file_started",
                "file_progress",
                "file_progress",
                "file_completed",
                "finished"
            ]
        );
        assert!(reporter.events.borrow()[0].contains("'release' in bucket 'artifacts'"));
    }

    #[tokio::test]
    async fn test_content_type_modes() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), &["a.pdf", "b.unknownext"]);
        let reporter = RecordingReporter::default();

        let store = MockStore::default();
        let mut config = config(&dir);
        config.content_type = ContentTypeMode::Omit;
        Uploader::new(&store, &reporter).run(&config).await.unwrap();
        assert!(store.calls.borrow().iter().all(|c| c.content_type.is_none()));

        let store = MockStore::default();
        config.content_type = ContentTypeMode::Detect { explicit: None };
        Uploader::new(&store, &reporter).run(&config).await.unwrap();
        let types: Vec<Option<String>> = store
            .calls
            .borrow()
            .iter()
            .map(|c| c.content_type.clone())
            .collect();
        assert_eq!(
            types,
            vec![
                Some("application/pdf".to_string()),
                Some("application/octet-stream".to_string())
            ]
        );

        let store = MockStore::default();
        config.content_type = ContentTypeMode::Detect {
            explicit: Some("text/plain".to_string()),
        };
        Uploader::new(&store, &reporter).run(&config).await.unwrap();
        assert!(
            store
                .calls
                .borrow()
                .iter()
                .all(|c| c.content_type.as_deref() == Some("text/plain"))
        );
    }

    #[tokio::test]
    async fn test_missing_source_fails_before_upload() {
        let dir = tempfile::tempdir().unwrap();
        let store = MockStore::default();
        let reporter = RecordingReporter::default();

        let mut config = config(&dir);
        config.source_folder = dir.path().join("missing");
        let err = Uploader::new(&store, &reporter).run(&config).await.unwrap_err();

        assert!(matches!(err, UploadError::SourceNotFound { .. }));
        assert!(store.calls.borrow().is_empty());
    }

    #[test]
    fn test_plan_without_target_folder() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), &["img/b.png"]);

        let mut config = config(&dir);
        config.target_folder = None;
        let planned = plan(&config).unwrap();

        assert_eq!(
            planned,
            vec![PlannedUpload {
                path: dir.path().join("img").join("b.png"),
                key: "img/b.png".to_string(),
                content_type: Some("image/png".to_string()),
            }]
        );
    }
}
