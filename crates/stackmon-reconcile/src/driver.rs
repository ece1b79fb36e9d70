//! Reconciliation driver.
//!
//! Records are processed strictly in order and every call is awaited
//! before the next one starts; there is no shared state between records.

use tracing::{info, warn};

use stackmon_core::{
    CredentialSource, Credentials, Inventory, MonitorApi, MonitorError, S3Event, S3EventRecord,
    StateSource, StorageEvent,
};
use stackmon_diff::Plan;

use crate::error::ReconcileResult;
use crate::report::ReconcileReport;

/// Resolve vendor credentials and build a client from them.
///
/// Returns `Ok(None)` when no usable credentials exist; the run then
/// skips every vendor call.
pub async fn connect_monitor<C, M, F>(source: &C, connect: F) -> ReconcileResult<Option<M>>
where
    C: CredentialSource,
    F: FnOnce(Credentials) -> Result<M, MonitorError>,
{
    match source.credentials().await {
        Some(credentials) => Ok(Some(connect(credentials)?)),
        None => {
            warn!("vendor credentials unavailable, vendor calls will be skipped");
            Ok(None)
        }
    }
}

/// Drives state notifications through parse, diff and vendor actions.
pub struct Reconciler<'a, S, M> {
    state: &'a S,
    monitor: Option<&'a M>,
    dry_run: bool,
}

impl<'a, S: StateSource, M: MonitorApi> Reconciler<'a, S, M> {
    /// `monitor` is `None` when the run has no vendor credentials.
    pub fn new(state: &'a S, monitor: Option<&'a M>) -> Self {
        Self {
            state,
            monitor,
            dry_run: false,
        }
    }

    /// Plan and log actions without sending them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process every record of a notification, in order.
    pub async fn handle_event(&self, event: &S3Event) -> ReconcileResult<Vec<ReconcileReport>> {
        let mut reports = Vec::new();

        for record in &event.records {
            info!(
                source = %record.event_source,
                time = %record.event_time,
                bucket = %record.bucket(),
                key = %record.key(),
                event = %record.event_name,
                "storage notification"
            );

            match record.storage_event() {
                StorageEvent::StateWritten => reports.push(self.handle_state_written(record).await?),
                StorageEvent::StateRemoved => {
                    info!(key = %record.key(), "state object removed, nothing to reconcile")
                }
                StorageEvent::Other(name) => warn!(event = %name, "ignoring storage event"),
            }
        }

        Ok(reports)
    }

    async fn handle_state_written(&self, record: &S3EventRecord) -> ReconcileResult<ReconcileReport> {
        let stack = record.stack()?;
        info!(%stack, "reconciling stack");

        let raw_state = self.state.fetch_state(record.bucket(), record.key()).await?;
        self.reconcile(stack, &raw_state).await
    }

    /// Reconcile `stack` against the given raw state.
    pub async fn reconcile(&self, stack: &str, raw_state: &str) -> ReconcileResult<ReconcileReport> {
        let outcome = stackmon_tfstate::parse(raw_state)?;

        let mut report = ReconcileReport {
            stack: stack.to_string(),
            outcome: outcome.label().to_string(),
            desired: outcome.desired().map_or(0, |d| d.len() as u32),
            dry_run: self.dry_run,
            ..ReconcileReport::default()
        };

        let Some(monitor) = self.monitor else {
            report.vendor_skipped = true;
            log_report(&report);
            return Ok(report);
        };

        let inventory = Inventory::from_tests(monitor.list_tests().await?);
        let plan = stackmon_diff::diff(&outcome, &inventory, stack)?;
        report.reconciled = plan.reconciled.len() as u32;
        report.skipped_non_production = plan.skipped.len() as u32;

        if plan.is_empty() {
            info!(%stack, "vendor tests in sync with state");
        }

        if self.dry_run {
            log_planned(&plan);
            report.created = plan.create.len() as u32;
            report.deleted = plan.delete.len() as u32;
        } else {
            for test in &plan.create {
                monitor.create_test(test).await?;
                report.created += 1;
            }
            for test in &plan.delete {
                monitor.delete_test(test).await?;
                report.deleted += 1;
            }
        }

        log_report(&report);
        Ok(report)
    }
}

fn log_planned(plan: &Plan) {
    for test in &plan.create {
        info!(url = %test.url, identifier = %test.identifier, "dry run: would create test");
    }
    for test in &plan.delete {
        info!(url = %test.url, id = test.id, test_type = %test.test_type, "dry run: would delete test");
    }
}

fn log_report(report: &ReconcileReport) {
    info!(
        stack = %report.stack,
        outcome = %report.outcome,
        desired = report.desired,
        created = report.created,
        deleted = report.deleted,
        reconciled = report.reconciled,
        skipped_non_production = report.skipped_non_production,
        vendor_skipped = report.vendor_skipped,
        dry_run = report.dry_run,
        "reconciliation complete"
    );
}
