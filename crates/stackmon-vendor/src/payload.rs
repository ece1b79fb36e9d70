//! Wire types for the vendor API.

use serde::{Deserialize, Serialize};

use stackmon_core::RemoteTest;

/// `GET /tests` response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestListPayload {
    #[serde(default)]
    pub test: Vec<TestRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    #[serde(default)]
    pub test_id: u64,
    #[serde(default)]
    pub test_name: String,
    #[serde(rename = "type", default)]
    pub test_type: String,
    #[serde(default)]
    pub url: String,
}

impl From<TestRecord> for RemoteTest {
    fn from(record: TestRecord) -> Self {
        RemoteTest {
            url: record.url,
            name: record.test_name,
            test_type: record.test_type,
            id: record.test_id,
        }
    }
}

/// `POST /tests/http-server/new.json` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpServerTestCreate {
    pub interval: u32,
    pub agents: Vec<AgentRef>,
    pub test_name: String,
    pub content_regex: String,
    pub url: String,
    pub alerts_enabled: u8,
    pub bgp_measurements: u8,
    pub network_measurements: u8,
    pub verify_certificate: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRef {
    pub agent_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_payload_tolerates_missing_fields() {
        let payload: TestListPayload = serde_json::from_value(json!({
            "test": [
                { "testId": 7, "testName": "web", "type": "http-server", "url": "https://a", "enabled": 1 },
                { "testId": 8, "type": "page-load" }
            ]
        }))
        .unwrap();

        let tests: Vec<RemoteTest> = payload.test.into_iter().map(RemoteTest::from).collect();
        assert_eq!(tests[0].id, 7);
        assert_eq!(tests[0].url, "https://a");
        assert_eq!(tests[1].url, "");
    }

    #[test]
    fn create_body_field_names() {
        let body = HttpServerTestCreate {
            interval: 60,
            agents: vec![AgentRef { agent_id: 14410 }],
            test_name: "n".to_string(),
            content_regex: "someregex".to_string(),
            url: "https://a".to_string(),
            alerts_enabled: 0,
            bgp_measurements: 0,
            network_measurements: 0,
            verify_certificate: 0,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "interval": 60,
                "agents": [{ "agentId": 14410 }],
                "testName": "n",
                "contentRegex": "someregex",
                "url": "https://a",
                "alertsEnabled": 0,
                "bgpMeasurements": 0,
                "networkMeasurements": 0,
                "verifyCertificate": 0
            })
        );
    }
}
