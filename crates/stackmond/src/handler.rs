//! Per-invocation event handling.

use std::path::Path;

use anyhow::Context;
use tracing::info;

use stackmon_aws::{S3StateSource, SecretsManagerCredentials};
use stackmon_core::{CredentialSource, ReconcilerConfig, S3Event, StateSource};
use stackmon_reconcile::{ReconcileReport, ReconcileResult, Reconciler, connect_monitor};
use stackmon_vendor::VendorClient;

/// Owns the long-lived adapters; vendor credentials are resolved on
/// every invocation.
pub struct EventHandler<S, C> {
    config: ReconcilerConfig,
    state: S,
    credentials: C,
}

impl EventHandler<S3StateSource, SecretsManagerCredentials> {
    /// Adapters backed by the ambient AWS environment.
    pub async fn from_env(config: ReconcilerConfig) -> Self {
        let state = S3StateSource::from_env().await;
        let credentials = SecretsManagerCredentials::from_config(&config.secrets).await;
        info!(
            secret = %config.secrets.name,
            region = %config.secrets.region,
            vendor = %config.vendor.base_url,
            dry_run = config.dry_run,
            "AWS adapters initialized"
        );
        Self::new(config, state, credentials)
    }
}

impl<S: StateSource, C: CredentialSource> EventHandler<S, C> {
    pub fn new(config: ReconcilerConfig, state: S, credentials: C) -> Self {
        Self {
            config,
            state,
            credentials,
        }
    }

    pub async fn handle(&self, event: &S3Event) -> ReconcileResult<Vec<ReconcileReport>> {
        let vendor = &self.config.vendor;
        let monitor = connect_monitor(&self.credentials, |creds| VendorClient::new(vendor, creds)).await?;

        Reconciler::new(&self.state, monitor.as_ref())
            .with_dry_run(self.config.dry_run)
            .handle_event(event)
            .await
    }
}

/// Read a stored S3 notification from disk.
pub fn load_event(path: &Path) -> anyhow::Result<S3Event> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid S3 event in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use stackmon_core::{Credentials, SourceError, VendorConfig};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = "prod/us-west-2/mystack/terraform.tfstate";

    struct StaticState(&'static str);

    #[async_trait]
    impl StateSource for StaticState {
        async fn fetch_state(&self, _bucket: &str, _key: &str) -> Result<String, SourceError> {
            Ok(self.0.to_string())
        }
    }

    struct StaticCredentials(Option<Credentials>);

    #[async_trait]
    impl CredentialSource for StaticCredentials {
        async fn credentials(&self) -> Option<Credentials> {
            self.0.clone()
        }
    }

    fn put_event() -> S3Event {
        serde_json::from_value(json!({
            "Records": [{
                "eventSource": "aws:s3",
                "eventTime": "2024-03-01T12:00:00.000Z",
                "eventName": "ObjectCreated:Put",
                "s3": { "bucket": { "name": "tf-states" }, "object": { "key": KEY } }
            }]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn no_credentials_skips_vendor() {
        let handler = EventHandler::new(
            ReconcilerConfig::default(),
            StaticState(r#"{"resources": []}"#),
            StaticCredentials(None),
        );

        let reports = handler.handle(&put_event()).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].vendor_skipped);
        assert_eq!(reports[0].stack, "mystack");
    }

    #[tokio::test]
    async fn credentials_reach_the_vendor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "test": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let config = ReconcilerConfig {
            vendor: VendorConfig {
                base_url: server.uri(),
                ..VendorConfig::default()
            },
            ..ReconcilerConfig::default()
        };
        let handler = EventHandler::new(
            config,
            StaticState(r#"{"resources": []}"#),
            StaticCredentials(Credentials::new("user", "token")),
        );

        let reports = handler.handle(&put_event()).await.unwrap();
        assert!(!reports[0].vendor_skipped);
        assert_eq!(reports[0].outcome, "DELETE_ALL");
        assert_eq!(reports[0].deleted, 0);
    }

    #[test]
    fn load_event_reads_notification() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, serde_json::to_string(&json!({
            "Records": [{
                "eventSource": "aws:s3",
                "eventTime": "2024-03-01T12:00:00.000Z",
                "eventName": "ObjectCreated:Put",
                "s3": { "bucket": { "name": "tf-states" }, "object": { "key": KEY } }
            }]
        })).unwrap())
        .unwrap();

        let event = load_event(&path).unwrap();
        assert_eq!(event.records.len(), 1);
        assert_eq!(event.records[0].key(), KEY);
    }

    #[test]
    fn load_event_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_event(&path).is_err());
    }
}
