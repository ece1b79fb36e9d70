//! Plan computation for one stack.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use stackmon_core::endpoint;
use stackmon_core::{DesiredTests, Directive, Inventory, NewTest, Outcome, RemoteTest};

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("invalid stack pattern for {stack:?}: {source}")]
    Pattern {
        stack: String,
        #[source]
        source: regex::Error,
    },

    /// An empty stack would match every vendor URL.
    #[error("stack name is empty")]
    EmptyStack,
}

pub type DiffResult<T> = Result<T, DiffError>;

/// Vendor actions that bring the stack in line with its state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub stack: String,
    pub create: Vec<NewTest>,
    pub delete: Vec<RemoteTest>,
    /// URLs already present remotely.
    pub reconciled: Vec<String>,
    /// Non-production URLs deliberately left unmonitored.
    pub skipped: Vec<String>,
}

impl Plan {
    /// No vendor call needed.
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.delete.is_empty()
    }
}

/// Plan the actions for `stack` given the parse outcome and the vendor's
/// full inventory.
pub fn diff(outcome: &Outcome, inventory: &Inventory, stack: &str) -> DiffResult<Plan> {
    if stack.trim().is_empty() {
        return Err(DiffError::EmptyStack);
    }
    let current_for_stack = inventory.for_stack(stack).map_err(|source| DiffError::Pattern {
        stack: stack.to_string(),
        source,
    })?;
    debug!(%stack, tests = current_for_stack.len(), "current tests for stack");

    let plan = match outcome {
        Outcome::Directive(directive) => delete_all(stack, *directive, current_for_stack),
        Outcome::Desired(desired) => diff_desired(stack, desired, inventory, current_for_stack),
    };

    info!(
        %stack,
        outcome = outcome.label(),
        create = plan.create.len(),
        delete = plan.delete.len(),
        reconciled = plan.reconciled.len(),
        skipped = plan.skipped.len(),
        "plan computed"
    );
    Ok(plan)
}

fn delete_all(stack: &str, directive: Directive, current_for_stack: BTreeMap<String, RemoteTest>) -> Plan {
    if current_for_stack.is_empty() {
        info!(%stack, %directive, "no existing tests for stack");
    }
    Plan {
        stack: stack.to_string(),
        delete: current_for_stack.into_values().collect(),
        ..Plan::default()
    }
}

/// Diff desired tests against `current_for_stack`, consulting the full
/// `inventory` for existence.
pub fn diff_desired(
    stack: &str,
    desired: &DesiredTests,
    inventory: &Inventory,
    mut current_for_stack: BTreeMap<String, RemoteTest>,
) -> Plan {
    let mut plan = Plan {
        stack: stack.to_string(),
        ..Plan::default()
    };

    for test in desired.iter() {
        let url = test.url();
        current_for_stack.remove(&url);

        if let Some(existing) = inventory.get(&url) {
            debug!(
                %url,
                id = existing.id,
                test_type = %existing.test_type,
                name = %existing.name,
                "test exists"
            );
            plan.reconciled.push(url);
        } else if endpoint::is_non_production(&test.host) {
            debug!(%url, "non-production endpoint, not creating test");
            plan.skipped.push(url);
        } else {
            debug!(%url, identifier = %test.identifier, "test missing");
            plan.create.push(NewTest::http_server(stack, &url, &test.identifier));
        }
    }

    plan.delete = current_for_stack.into_values().collect();
    plan
}
