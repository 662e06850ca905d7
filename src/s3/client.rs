use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use tracing::debug;

use crate::config::SpacesConfig;

/// Region used for request signing; Spaces routes by endpoint host, not region
const SIGNING_REGION: &str = "us-east-1";

/// S3 client bound to a Spaces endpoint and bucket
#[derive(Debug, Clone)]
pub struct SpacesClient {
    client: Client,
    pub config: SpacesConfig,
}

impl SpacesClient {
    pub async fn new(config: SpacesConfig) -> Self {
        let endpoint = config.endpoint_url();
        debug!("Connecting to {} (bucket {})", endpoint, config.bucket);

        let credentials = Credentials::new(
            &config.credentials.access_key,
            &config.credentials.secret_key,
            None,
            None,
            "spaces-upload",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(SIGNING_REGION))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .load()
            .await;
        let client = Client::new(&sdk_config);

        Self { client, config }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}
