use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use aws_sdk_s3::types::ObjectCannedAcl;
use clap::ValueEnum;

use crate::error::{Result, UploadError};
use crate::mime::resolve_content_type;

/// Static access key pair for a Spaces account
#[derive(Clone)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .finish()
    }
}

/// Canned ACLs supported by Spaces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Acl {
    #[default]
    Private,
    PublicRead,
}

impl From<Acl> for ObjectCannedAcl {
    fn from(acl: Acl) -> Self {
        match acl {
            Acl::Private => ObjectCannedAcl::Private,
            Acl::PublicRead => ObjectCannedAcl::PublicRead,
        }
    }
}

/// How uploads pick their Content-Type header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentTypeMode {
    /// Send no Content-Type and let the service decide
    Omit,
    /// Look the extension up in the MIME table; `explicit` wins when non-empty
    Detect { explicit: Option<String> },
}

impl Default for ContentTypeMode {
    fn default() -> Self {
        Self::Detect { explicit: None }
    }
}

impl ContentTypeMode {
    /// Content-Type to send for `path`, or `None` to omit the header
    pub fn resolve(&self, path: &Path) -> Option<String> {
        match self {
            Self::Omit => None,
            Self::Detect { explicit } => Some(resolve_content_type(path, explicit.as_deref())),
        }
    }
}

/// Connection settings for a Spaces bucket
#[derive(Debug, Clone)]
pub struct SpacesConfig {
    pub region: String,
    pub endpoint: Option<String>,
    pub bucket: String,
    pub credentials: Credentials,
}

impl SpacesConfig {
    /// Load configuration from environment variables and .env file
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if it exists

        let region = require_env("DO_SPACES_REGION")?;
        Self::validate_region(&region)?;

        let endpoint = env::var("DO_SPACES_ENDPOINT")
            .ok()
            .filter(|e| !e.trim().is_empty());
        if let Some(endpoint) = &endpoint {
            Self::validate_endpoint(endpoint)?;
        }

        let bucket = require_env("DO_SPACES_BUCKET")?;
        Self::validate_bucket_name(&bucket)?;

        let credentials = Credentials {
            access_key: require_env("DO_SPACES_KEY")?,
            secret_key: require_env("DO_SPACES_SECRET")?,
        };

        Ok(Self {
            region,
            endpoint,
            bucket,
            credentials,
        })
    }

    /// Endpoint the client talks to: the explicit one, else the regional Spaces host
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}.digitaloceanspaces.com", self.region),
        }
    }

    /// Validate a Spaces region slug such as `nyc3` or `fra1`
    fn validate_region(region: &str) -> Result<()> {
        if region.is_empty() {
            return Err(UploadError::config("DO_SPACES_REGION cannot be empty"));
        }

        if !region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(UploadError::config(format!(
                "DO_SPACES_REGION '{}' doesn't look like a valid region (e.g., nyc3, fra1, sgp1)",
                region
            )));
        }

        Ok(())
    }

    fn validate_endpoint(endpoint: &str) -> Result<()> {
        if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
            return Err(UploadError::config(format!(
                "DO_SPACES_ENDPOINT '{}' must start with http:// or https://",
                endpoint
            )));
        }

        Ok(())
    }

    /// Validate bucket name according to S3 naming rules
    fn validate_bucket_name(bucket: &str) -> Result<()> {
        if bucket.len() < 3 || bucket.len() > 63 {
            return Err(UploadError::config(format!(
                "DO_SPACES_BUCKET '{}' must be between 3 and 63 characters (got {})",
                bucket,
                bucket.len()
            )));
        }

        let edge_ok = |c: Option<char>| c.is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        if !edge_ok(bucket.chars().next()) || !edge_ok(bucket.chars().last()) {
            return Err(UploadError::config(format!(
                "DO_SPACES_BUCKET '{}' must start and end with a lowercase letter or number",
                bucket
            )));
        }

        if let Some(c) = bucket
            .chars()
            .find(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && *c != '-' && *c != '.')
        {
            return Err(UploadError::config(format!(
                "DO_SPACES_BUCKET '{}' contains invalid character '{}'. Only lowercase letters, numbers, hyphens, and periods are allowed",
                bucket, c
            )));
        }

        if bucket.contains("..") {
            return Err(UploadError::config(format!(
                "DO_SPACES_BUCKET '{}' cannot contain consecutive periods",
                bucket
            )));
        }

        let parts: Vec<&str> = bucket.split('.').collect();
        if parts.len() == 4 && parts.iter().all(|part| part.parse::<u8>().is_ok()) {
            return Err(UploadError::config(format!(
                "DO_SPACES_BUCKET '{}' cannot be formatted as an IP address",
                bucket
            )));
        }

        Ok(())
    }
}

/// Everything a single upload pass needs
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub source_folder: PathBuf,
    pub content_pattern: String,
    pub target_folder: Option<String>,
    pub flatten: bool,
    pub acl: Acl,
    pub content_type: ContentTypeMode,
    pub spaces: SpacesConfig,
}

impl UploadConfig {
    /// Check the per-pass settings before anything touches the network
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Configuration`] for a relative source folder or a bad
    /// target folder, and [`UploadError::SourceNotFound`] when the folder is missing.
    pub fn validate(&self) -> Result<()> {
        if !self.source_folder.is_absolute() {
            return Err(UploadError::config(format!(
                "source folder '{}' must be an absolute path",
                self.source_folder.display()
            )));
        }

        if !self.source_folder.is_dir() {
            return Err(UploadError::SourceNotFound {
                path: self.source_folder.clone(),
            });
        }

        if let Some(target) = &self.target_folder {
            validate_target_folder(target)?;
        }

        Ok(())
    }

    /// Target folder as shown in logs
    pub fn target_display(&self) -> &str {
        match self.target_folder.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => "root",
        }
    }
}

/// Validate the key prefix uploads are placed under
fn validate_target_folder(path: &str) -> Result<()> {
    if path.is_empty() {
        return Ok(());
    }

    if path.contains("//") {
        return Err(UploadError::config(format!(
            "target folder '{}' contains consecutive slashes (not allowed)",
            path
        )));
    }

    if path.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(UploadError::config(format!(
            "target folder '{}' contains '..' (not allowed for security)",
            path
        )));
    }

    Ok(())
}

fn require_env(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(UploadError::config(format!(
            "{} not found in environment. Please set it in .env file",
            name
        ))),
    }
}
