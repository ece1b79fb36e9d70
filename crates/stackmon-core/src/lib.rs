//! stackmon-core — shared vocabulary for the stackmon reconciler.
//!
//! Holds the types that flow between the state parser, the inventory
//! differ and the reconciliation driver, the URL rules every stage agrees
//! on, the storage-event model, configuration, and the async ports the
//! driver talks to (object storage, secret store, monitoring vendor).

pub mod config;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod event;
pub mod ports;
pub mod types;

pub use config::{ConfigError, ReconcilerConfig, SecretsConfig, VendorConfig};
pub use credentials::Credentials;
pub use error::{MonitorError, SourceError};
pub use event::{EventError, S3Event, S3EventRecord, StorageEvent};
pub use ports::{CredentialSource, MonitorApi, StateSource};
pub use types::*;
