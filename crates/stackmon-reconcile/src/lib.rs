//! stackmon-reconcile — drives one reconciliation per state notification.
//!
//! # Architecture
//!
//! ```text
//! S3Event
//!   └── per record, in order
//!       ├── ObjectCreated:Put    → StateSource::fetch_state
//!       │                        → stackmon_tfstate::parse
//!       │                        → MonitorApi::list_tests
//!       │                        → stackmon_diff::diff
//!       │                        → MonitorApi::create_test / delete_test
//!       ├── ObjectRemoved:Delete → logged, ignored
//!       └── anything else        → logged, skipped
//! ```
//!
//! Without vendor credentials the state is still parsed and logged, but
//! no vendor call is made. Any other failure aborts the invocation;
//! actions already applied stay applied.

pub mod driver;
pub mod error;
pub mod report;

pub use driver::{Reconciler, connect_monitor};
pub use error::{ReconcileError, ReconcileResult};
pub use report::ReconcileReport;
