pub mod client;
pub mod multipart;
pub mod upload;

pub use client::SpacesClient;
pub use upload::{ObjectStore, ProgressFn, PutObject};

/// Client wired to a canned HTTP layer, with retries off so each call is one request
#[cfg(test)]
pub(crate) fn test_client(
    http_client: impl aws_sdk_s3::config::HttpClient + 'static,
) -> aws_sdk_s3::Client {
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region, retry::RetryConfig};

    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("key", "secret", None, None, "test"))
        .endpoint_url("http://localhost:9000")
        .force_path_style(true)
        .retry_config(RetryConfig::disabled())
        .http_client(http_client)
        .build();
    aws_sdk_s3::Client::from_conf(config)
}
