//! S3 state source.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use tracing::info;

use stackmon_core::{SourceError, StateSource};

/// Reads state objects with the Lambda's ambient AWS credentials.
#[derive(Debug, Clone)]
pub struct S3StateSource {
    client: aws_sdk_s3::Client,
}

impl S3StateSource {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// Build a client from the environment's region and credentials.
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&sdk_config))
    }
}

#[async_trait]
impl StateSource for S3StateSource {
    async fn fetch_state(&self, bucket: &str, key: &str) -> Result<String, SourceError> {
        let fetch_error = |detail: String| SourceError::Fetch {
            bucket: bucket.to_string(),
            key: key.to_string(),
            detail,
        };

        let object = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| fetch_error(DisplayErrorContext(&e).to_string()))?;

        let body = object
            .body
            .collect()
            .await
            .map_err(|e| fetch_error(e.to_string()))?
            .into_bytes();

        info!(%bucket, %key, bytes = body.len(), "state object retrieved");
        decode_state(bucket, key, body.to_vec())
    }
}

/// Object bytes as UTF-8 text.
pub fn decode_state(bucket: &str, key: &str, bytes: Vec<u8>) -> Result<String, SourceError> {
    String::from_utf8(bytes).map_err(|_| SourceError::Encoding {
        bucket: bucket.to_string(),
        key: key.to_string(),
    })
}
