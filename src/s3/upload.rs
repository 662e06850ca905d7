use std::future::Future;
use std::path::Path;

use anyhow::{Context, Result};
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;

use super::SpacesClient;
use super::multipart::{MULTIPART_THRESHOLD, upload_multipart};

/// A single-object upload request
#[derive(Debug, Clone, Copy)]
pub struct PutObject<'a> {
    pub bucket: &'a str,
    pub key: &'a str,
    pub acl: &'a ObjectCannedAcl,
    pub local_path: &'a Path,
    pub content_type: Option<&'a str>,
}

/// Progress observer, called with `(bytes_transferred, total_bytes)`
pub type ProgressFn<'a> = dyn FnMut(u64, u64) + 'a;

/// Storage that accepts one object at a time
pub trait ObjectStore {
    /// Upload `request.local_path` and resolve to the number of bytes sent.
    ///
    /// `on_progress` may be called any number of times while the upload is in flight.
    fn put_object(
        &self,
        request: PutObject<'_>,
        on_progress: &mut ProgressFn<'_>,
    ) -> impl Future<Output = Result<u64>>;
}

impl ObjectStore for SpacesClient {
    async fn put_object(&self, request: PutObject<'_>, on_progress: &mut ProgressFn<'_>) -> Result<u64> {
        let file_size = tokio::fs::metadata(request.local_path)
            .await
            .context("Failed to get file metadata")?
            .len();

        if file_size >= MULTIPART_THRESHOLD {
            upload_multipart(self.client(), request, file_size, on_progress).await
        } else {
            upload_file(self.client(), request, file_size, on_progress).await
        }
    }
}

/// Upload a file with a single PUT
async fn upload_file(
    client: &Client,
    request: PutObject<'_>,
    file_size: u64,
    on_progress: &mut ProgressFn<'_>,
) -> Result<u64> {
    on_progress(0, file_size);

    let body = ByteStream::from_path(request.local_path)
        .await
        .context("Failed to create byte stream from file")?;

    client
        .put_object()
        .bucket(request.bucket)
        .key(request.key)
        .acl(request.acl.clone())
        .set_content_type(request.content_type.map(str::to_string))
        .body(body)
        .content_length(file_size as i64)
        .send()
        .await
        .context("Failed to upload file to Spaces")?;

    on_progress(file_size, file_size);

    Ok(file_size)
}
