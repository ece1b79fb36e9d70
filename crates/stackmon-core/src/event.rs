//! S3 event notifications that trigger a reconciliation.
//!
//! Only the fields stackmon reads are modelled; everything else in the
//! notification is ignored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Object key segment (0-based) that names the stack.
const STACK_SEGMENT: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3EventRecord {
    #[serde(default)]
    pub event_source: String,
    #[serde(default)]
    pub event_time: String,
    pub event_name: String,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Object {
    pub key: String,
}

/// What happened to the state object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageEvent {
    /// `ObjectCreated:Put`: a new state snapshot landed.
    StateWritten,
    /// `ObjectRemoved:Delete`: the snapshot was removed.
    StateRemoved,
    /// Anything else; carried for logging.
    Other(String),
}

impl StorageEvent {
    pub fn from_name(name: &str) -> Self {
        match name {
            "ObjectCreated:Put" => StorageEvent::StateWritten,
            "ObjectRemoved:Delete" => StorageEvent::StateRemoved,
            other => StorageEvent::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("object key {0:?} has no stack segment")]
    MissingStack(String),
}

impl S3EventRecord {
    pub fn storage_event(&self) -> StorageEvent {
        StorageEvent::from_name(&self.event_name)
    }

    pub fn bucket(&self) -> &str {
        &self.s3.bucket.name
    }

    pub fn key(&self) -> &str {
        &self.s3.object.key
    }

    /// Stack name: the third `/`-separated segment of the object key.
    pub fn stack(&self) -> Result<&str, EventError> {
        stack_from_key(self.key())
    }
}

/// `env/region/<stack>/terraform.tfstate` → `<stack>`.
pub fn stack_from_key(key: &str) -> Result<&str, EventError> {
    key.split('/')
        .nth(STACK_SEGMENT)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| EventError::MissingStack(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTIFICATION: &str = r#"{
        "Records": [{
            "eventVersion": "2.1",
            "eventSource": "aws:s3",
            "awsRegion": "us-west-2",
            "eventTime": "2024-03-01T12:00:00.000Z",
            "eventName": "ObjectCreated:Put",
            "s3": {
                "bucket": { "name": "tf-states", "arn": "arn:aws:s3:::tf-states" },
                "object": { "key": "prod/us-west-2/mystack/terraform.tfstate", "size": 1024 }
            }
        }]
    }"#;

    #[test]
    fn parses_notification() {
        let event: S3Event = serde_json::from_str(NOTIFICATION).unwrap();
        assert_eq!(event.records.len(), 1);

        let record = &event.records[0];
        assert_eq!(record.storage_event(), StorageEvent::StateWritten);
        assert_eq!(record.bucket(), "tf-states");
        assert_eq!(record.stack().unwrap(), "mystack");
    }

    #[test]
    fn event_names() {
        assert_eq!(StorageEvent::from_name("ObjectRemoved:Delete"), StorageEvent::StateRemoved);
        assert_eq!(
            StorageEvent::from_name("ObjectCreated:Copy"),
            StorageEvent::Other("ObjectCreated:Copy".to_string())
        );
    }

    #[test]
    fn short_key_has_no_stack() {
        assert!(matches!(stack_from_key("prod/terraform.tfstate"), Err(EventError::MissingStack(_))));
        assert!(stack_from_key("prod/us-west-2//x").is_err());
    }
}
