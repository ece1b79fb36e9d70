//! Per-stack reconciliation summary.

use serde::Serialize;

/// What one reconciliation did, logged and returned to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub stack: String,
    /// `DESIRED` or the directive label.
    pub outcome: String,
    pub desired: u32,
    pub created: u32,
    pub deleted: u32,
    pub reconciled: u32,
    pub skipped_non_production: u32,
    /// No credentials, so the vendor was never contacted.
    pub vendor_skipped: bool,
    /// Actions were planned but not sent.
    pub dry_run: bool,
}
