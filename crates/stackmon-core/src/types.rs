//! Shared types used across stackmon crates.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::endpoint;

/// Identifier recorded when no sub-identifier could be extracted.
pub const STANDARD_IDENTIFIER: &str = "standard";

/// The only test type stackmon creates.
pub const HTTP_SERVER_TEST: &str = "http-server";

// ── Desired state ─────────────────────────────────────────────────

/// One endpoint that should be monitored, derived from infrastructure state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredTest {
    pub stack: String,
    /// Externally reachable hostname (CNAME domain or synthesized).
    pub host: String,
    /// `standard` or the sub-identifier extracted from the domain.
    pub identifier: String,
}

impl DesiredTest {
    pub fn new(stack: &str, host: &str, identifier: &str) -> Self {
        Self {
            stack: stack.to_string(),
            host: host.to_string(),
            identifier: identifier.to_string(),
        }
    }

    /// Key in `stack~host` form.
    pub fn key(&self) -> String {
        format!("{}~{}", self.stack, self.host)
    }

    /// The login URL the vendor probes for this endpoint.
    pub fn url(&self) -> String {
        endpoint::login_url(&self.host)
    }
}

/// Desired tests keyed by `stack~host`, iterated in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredTests {
    entries: BTreeMap<String, DesiredTest>,
}

impl DesiredTests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a test, replacing any previous entry with the same key.
    pub fn insert(&mut self, test: DesiredTest) -> Option<DesiredTest> {
        self.entries.insert(test.key(), test)
    }

    pub fn get(&self, key: &str) -> Option<&DesiredTest> {
        self.entries.get(key)
    }

    /// Identifier recorded for a `stack~host` key.
    pub fn identifier(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|t| t.identifier.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DesiredTest> {
        self.entries.values()
    }
}

impl FromIterator<DesiredTest> for DesiredTests {
    fn from_iter<I: IntoIterator<Item = DesiredTest>>(iter: I) -> Self {
        let mut tests = DesiredTests::new();
        for test in iter {
            tests.insert(test);
        }
        tests
    }
}

// ── Parse outcome ─────────────────────────────────────────────────

/// Short-circuit result of parsing: monitoring is not wanted for the stack,
/// so every known test for it gets deleted and nothing is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Directive {
    /// The state holds no resources; the stack is gone.
    DeleteAll,
    /// No search-head was tagged in the state.
    NoSearchHeads,
    /// Public search-head access is restricted by CIDR rules.
    Whitelisted,
}

impl Directive {
    pub fn label(&self) -> &'static str {
        match self {
            Directive::DeleteAll => "DELETE_ALL",
            Directive::NoSearchHeads => "NO_SEARCH_HEADS",
            Directive::Whitelisted => "WHITELISTED",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the state parser can conclude about a stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Directive(Directive),
    Desired(DesiredTests),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Directive(d) => d.label(),
            Outcome::Desired(_) => "DESIRED",
        }
    }

    pub fn directive(&self) -> Option<Directive> {
        match self {
            Outcome::Directive(d) => Some(*d),
            Outcome::Desired(_) => None,
        }
    }

    pub fn desired(&self) -> Option<&DesiredTests> {
        match self {
            Outcome::Directive(_) => None,
            Outcome::Desired(tests) => Some(tests),
        }
    }
}

// ── Remote state ──────────────────────────────────────────────────

/// A test as the monitoring vendor reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTest {
    pub url: String,
    pub name: String,
    pub test_type: String,
    pub id: u64,
}

/// The vendor's full test inventory, keyed by URL.
///
/// When the vendor reports several tests for one URL the last one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    tests: BTreeMap<String, RemoteTest>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tests(tests: impl IntoIterator<Item = RemoteTest>) -> Self {
        Self {
            tests: tests.into_iter().map(|t| (t.url.clone(), t)).collect(),
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.tests.contains_key(url)
    }

    pub fn get(&self, url: &str) -> Option<&RemoteTest> {
        self.tests.get(url)
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RemoteTest> {
        self.tests.values()
    }

    /// Tests whose URL belongs to `stack`, keyed by URL.
    pub fn for_stack(&self, stack: &str) -> Result<BTreeMap<String, RemoteTest>, regex::Error> {
        let pattern = endpoint::stack_url_pattern(stack)?;
        Ok(self
            .tests
            .iter()
            .filter(|(url, _)| pattern.is_match(url))
            .map(|(url, test)| (url.clone(), test.clone()))
            .collect())
    }
}

// ── Actions ───────────────────────────────────────────────────────

/// A test the reconciler wants the vendor to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTest {
    pub stack: String,
    pub test_type: String,
    pub url: String,
    pub identifier: String,
}

impl NewTest {
    pub fn http_server(stack: &str, url: &str, identifier: &str) -> Self {
        Self {
            stack: stack.to_string(),
            test_type: HTTP_SERVER_TEST.to_string(),
            url: url.to_string(),
            identifier: identifier.to_string(),
        }
    }

    /// Human-readable name stored on the vendor side.
    pub fn test_name(&self) -> String {
        format!(
            "stack={} id={} metric=web_check testname=web_check~{}",
            self.stack, self.identifier, self.url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(url: &str, id: u64) -> RemoteTest {
        RemoteTest {
            url: url.to_string(),
            name: format!("test {id}"),
            test_type: HTTP_SERVER_TEST.to_string(),
            id,
        }
    }

    #[test]
    fn desired_key_and_url() {
        let test = DesiredTest::new("mystack", "foo-mystack.companycloud.com", "foo");
        assert_eq!(test.key(), "mystack~foo-mystack.companycloud.com");
        assert_eq!(
            test.url(),
            "https://foo-mystack.companycloud.com/en-US/account/login?loginType=company"
        );
    }

    #[test]
    fn desired_tests_replace_same_key() {
        let mut tests = DesiredTests::new();
        assert!(tests.insert(DesiredTest::new("s", "a.com", "x")).is_none());
        assert!(tests.insert(DesiredTest::new("s", "a.com", "y")).is_some());
        assert_eq!(tests.len(), 1);
        assert_eq!(tests.identifier("s~a.com"), Some("y"));
    }

    #[test]
    fn inventory_last_duplicate_wins() {
        let inventory = Inventory::from_tests(vec![remote("https://a", 1), remote("https://a", 2)]);
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.get("https://a").unwrap().id, 2);
    }

    #[test]
    fn inventory_filters_by_stack() {
        let inventory = Inventory::from_tests(vec![
            remote("https://foo-mystack.companycloud.com/en-US/account/login?loginType=company", 1),
            remote("https://sh1.mystack.stg.companycloud.com/en-US/account/login?loginType=company", 2),
            remote("https://foo-other.companycloud.com/en-US/account/login?loginType=company", 3),
        ]);

        let current = inventory.for_stack("mystack").unwrap();
        assert_eq!(current.len(), 2);
        assert!(current.values().all(|t| t.id != 3));
    }

    #[test]
    fn new_test_name_format() {
        let test = NewTest::http_server("mystack", "https://foo-mystack.companycloud.com/x", "foo");
        assert_eq!(test.test_type, "http-server");
        assert_eq!(
            test.test_name(),
            "stack=mystack id=foo metric=web_check testname=web_check~https://foo-mystack.companycloud.com/x"
        );
    }

    #[test]
    fn directive_labels() {
        assert_eq!(Directive::DeleteAll.to_string(), "DELETE_ALL");
        assert_eq!(Outcome::Directive(Directive::Whitelisted).label(), "WHITELISTED");
        assert_eq!(Outcome::Desired(DesiredTests::new()).label(), "DESIRED");
    }
}
