//! Secrets Manager credential source.

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use tracing::{info, warn};

use stackmon_core::{CredentialSource, Credentials, SecretsConfig};

/// Reads a `{"<user>": "<token>"}` secret.
///
/// Any failure is logged and reported as missing credentials.
#[derive(Debug, Clone)]
pub struct SecretsManagerCredentials {
    client: aws_sdk_secretsmanager::Client,
    name: String,
    version_stage: String,
}

impl SecretsManagerCredentials {
    pub fn new(client: aws_sdk_secretsmanager::Client, config: &SecretsConfig) -> Self {
        Self {
            client,
            name: config.name.clone(),
            version_stage: config.version_stage.clone(),
        }
    }

    /// Build a client pinned to the configured secret region.
    pub async fn from_config(config: &SecretsConfig) -> Self {
        let sdk_config = aws_config::from_env()
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;
        Self::new(aws_sdk_secretsmanager::Client::new(&sdk_config), config)
    }
}

#[async_trait]
impl CredentialSource for SecretsManagerCredentials {
    async fn credentials(&self) -> Option<Credentials> {
        let result = self
            .client
            .get_secret_value()
            .secret_id(&self.name)
            .version_stage(&self.version_stage)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                warn!(secret = %self.name, error = %DisplayErrorContext(&e), "failed to read vendor secret");
                return None;
            }
        };

        let Some(secret) = output.secret_string() else {
            warn!(secret = %self.name, "vendor secret has no string value");
            return None;
        };

        let credentials = Credentials::from_secret_json(secret)?;
        info!(secret = %self.name, user = %credentials.user, "vendor credentials retrieved");
        Some(credentials)
    }
}
