//! Upload build output to a DigitalOcean Spaces bucket.
//!
//! Files are selected from a source folder with a glob pattern, mapped to object
//! keys under an optional target folder, and uploaded one at a time. The first
//! failure stops the pass.

pub mod config;
pub mod discovery;
pub mod error;
pub mod key;
pub mod mime;
pub mod report;
pub mod s3;
pub mod uploader;

pub use config::{Acl, ContentTypeMode, Credentials, SpacesConfig, UploadConfig};
pub use error::{Result, UploadError};
pub use key::normalize_key;
pub use mime::resolve_content_type;
pub use report::{Reporter, TracingReporter, UploadEvent};
pub use s3::{ObjectStore, SpacesClient};
pub use uploader::{PlannedUpload, UploadSummary, Uploader, plan};
