//! stackmon-diff — compares desired endpoints with the vendor inventory.
//!
//! ```text
//! desired test ─► login URL ─► in full inventory?   ─► reconciled (never updated)
//!                             ├► staging/ephemeral? ─► skipped
//!                             └► otherwise          ─► create
//! stack inventory − touched URLs                    ─► delete
//! ```
//!
//! Directives skip the desired side entirely: every test of the stack is
//! deleted and nothing is created.

pub mod differ;

pub use differ::{DiffError, DiffResult, Plan, diff, diff_desired};
