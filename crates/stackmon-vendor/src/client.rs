//! Vendor API client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, header};
use tracing::{debug, info};

use stackmon_core::{
    Credentials, HTTP_SERVER_TEST, MonitorApi, MonitorError, NewTest, RemoteTest, VendorConfig,
};

use crate::payload::{AgentRef, HttpServerTestCreate, TestListPayload};

/// Authenticated client for one reconciliation run.
pub struct VendorClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
    agent_ids: Vec<u64>,
    interval: u32,
    content_regex: String,
}

impl fmt::Debug for VendorClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VendorClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl VendorClient {
    pub fn new(config: &VendorConfig, credentials: Credentials) -> Result<Self, MonitorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MonitorError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            agent_ids: config.agent_ids.clone(),
            interval: config.interval,
            content_regex: config.content_regex.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Create-request body for an `http-server` test.
    pub fn http_server_body(&self, test: &NewTest) -> HttpServerTestCreate {
        HttpServerTestCreate {
            interval: self.interval,
            agents: self.agent_ids.iter().map(|&agent_id| AgentRef { agent_id }).collect(),
            test_name: test.test_name(),
            content_regex: self.content_regex.clone(),
            url: test.url.clone(),
            alerts_enabled: 0,
            bgp_measurements: 0,
            network_measurements: 0,
            verify_certificate: 0,
        }
    }

    /// Authenticate, send, and reject non-2xx responses.
    async fn send(&self, builder: RequestBuilder, endpoint: &str) -> Result<Response, MonitorError> {
        let response = builder
            .basic_auth(&self.credentials.user, Some(&self.credentials.token))
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| MonitorError::Transport {
                endpoint: endpoint.to_string(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        debug!(%endpoint, %status, "vendor response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(MonitorError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl MonitorApi for VendorClient {
    async fn list_tests(&self) -> Result<Vec<RemoteTest>, MonitorError> {
        let endpoint = self.endpoint("/tests");
        let response = self.send(self.client.get(&endpoint), &endpoint).await?;

        let payload: TestListPayload = response.json().await.map_err(|e| MonitorError::Decode {
            endpoint: endpoint.clone(),
            detail: e.to_string(),
        })?;

        let tests: Vec<RemoteTest> = payload.test.into_iter().map(RemoteTest::from).collect();
        info!(tests = tests.len(), "vendor inventory fetched");
        Ok(tests)
    }

    async fn create_test(&self, test: &NewTest) -> Result<(), MonitorError> {
        if test.test_type != HTTP_SERVER_TEST {
            return Err(MonitorError::UnsupportedTestType(test.test_type.clone()));
        }

        let endpoint = self.endpoint(&format!("/tests/{}/new.json", test.test_type));
        let body = self.http_server_body(test);
        self.send(self.client.post(&endpoint).json(&body), &endpoint).await?;

        info!(url = %test.url, name = %body.test_name, "test created");
        Ok(())
    }

    async fn delete_test(&self, test: &RemoteTest) -> Result<(), MonitorError> {
        let endpoint = self.endpoint(&format!("/tests/{}/{}/delete.json", test.test_type, test.id));
        self.send(self.client.post(&endpoint), &endpoint).await?;

        info!(url = %test.url, id = test.id, test_type = %test.test_type, "test deleted");
        Ok(())
    }
}
