use anyhow::{Context, Result};
use aws_sdk_s3::{
    Client,
    primitives::ByteStream,
    types::{CompletedMultipartUpload, CompletedPart},
};
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use super::upload::{ProgressFn, PutObject};

// Threshold for using multipart upload (100MB)
pub const MULTIPART_THRESHOLD: u64 = 100 * 1024 * 1024;

// Size of each part (10MB) - S3 minimum is 5MB
const PART_SIZE: usize = 10 * 1024 * 1024;

/// Upload a large file using S3 multipart upload
///
/// Used for files at or above [`MULTIPART_THRESHOLD`]. Progress is reported after
/// each part is accepted. If any part fails the upload is aborted on the server
/// before the error is returned, so no orphaned parts are left behind.
pub async fn upload_multipart(
    client: &Client,
    request: PutObject<'_>,
    file_size: u64,
    on_progress: &mut ProgressFn<'_>,
) -> Result<u64> {
    info!(
        "Starting multipart upload for {} ({} bytes, {} parts)",
        request.local_path.display(),
        file_size,
        (file_size as usize).div_ceil(PART_SIZE)
    );

    let multipart = client
        .create_multipart_upload()
        .bucket(request.bucket)
        .key(request.key)
        .acl(request.acl.clone())
        .set_content_type(request.content_type.map(str::to_string))
        .send()
        .await
        .context("Failed to initiate multipart upload")?;

    let upload_id = multipart
        .upload_id()
        .context("No upload ID returned from Spaces")?;

    debug!("Multipart upload initiated with ID: {}", upload_id);

    match upload_parts(client, request, upload_id, file_size, on_progress).await {
        Ok(parts) => {
            debug!(
                "All {} parts uploaded, completing multipart upload",
                parts.len()
            );

            let completed = CompletedMultipartUpload::builder()
                .set_parts(Some(parts))
                .build();

            client
                .complete_multipart_upload()
                .bucket(request.bucket)
                .key(request.key)
                .upload_id(upload_id)
                .multipart_upload(completed)
                .send()
                .await
                .context("Failed to complete multipart upload")?;

            info!(
                "Successfully completed multipart upload: {} -> {}/{}",
                request.local_path.display(),
                request.bucket,
                request.key
            );

            Ok(file_size)
        }
        Err(e) => {
            if let Err(abort_err) =
                abort_multipart_upload(client, request.bucket, request.key, upload_id).await
            {
                warn!("{:#}", abort_err);
            }
            Err(e)
        }
    }
}

async fn upload_parts(
    client: &Client,
    request: PutObject<'_>,
    upload_id: &str,
    file_size: u64,
    on_progress: &mut ProgressFn<'_>,
) -> Result<Vec<CompletedPart>> {
    let mut file = tokio::fs::File::open(request.local_path)
        .await
        .context("Failed to open local file")?;
    let mut parts = Vec::new();
    let mut part_number = 1i32;
    let mut uploaded_bytes = 0u64;

    on_progress(0, file_size);

    loop {
        let mut buffer = vec![0u8; PART_SIZE];
        let bytes_read = read_part(&mut file, &mut buffer).await?;

        if bytes_read == 0 {
            break; // EOF
        }

        buffer.truncate(bytes_read);

        debug!("Uploading part {} ({} bytes)", part_number, buffer.len());

        let part_result = client
            .upload_part()
            .bucket(request.bucket)
            .key(request.key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(ByteStream::from(buffer))
            .send()
            .await
            .with_context(|| format!("Failed to upload part {}", part_number))?;

        parts.push(
            CompletedPart::builder()
                .part_number(part_number)
                .e_tag(part_result.e_tag().unwrap_or(""))
                .build(),
        );

        uploaded_bytes += bytes_read as u64;
        on_progress(uploaded_bytes, file_size);

        part_number += 1;
    }

    Ok(parts)
}

/// Fill `buffer` as far as the file allows; a short read only happens at EOF
async fn read_part(file: &mut tokio::fs::File, buffer: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        let n = file
            .read(&mut buffer[filled..])
            .await
            .context("Failed to read local file")?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Abort a multipart upload (for cleanup on error)
async fn abort_multipart_upload(
    client: &Client,
    bucket: &str,
    key: &str,
    upload_id: &str,
) -> Result<()> {
    client
        .abort_multipart_upload()
        .bucket(bucket)
        .key(key)
        .upload_id(upload_id)
        .send()
        .await
        .context("Failed to abort multipart upload")?;

    debug!("Aborted multipart upload {}", upload_id);

    Ok(())
}
