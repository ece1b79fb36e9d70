//! Desired-endpoint derivation from a Terraform state document.
//!
//! Iteration over search-heads and CNAME domains is lexicographic, so the
//! "first match wins" rule picks the same record on every run.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use tracing::{debug, info, warn};

use stackmon_core::endpoint;
use stackmon_core::{DesiredTest, DesiredTests, Directive, Outcome, STANDARD_IDENTIFIER};

use crate::error::{ParseError, ParseResult};
use crate::model::{Resource, StateDocument};

/// Security-group rule resources that gate public search-head access.
pub const WHITELIST_RULE_RESOURCES: [&str; 2] = [
    "public_search_head_sg_rules_80",
    "public_search_head_sg_rules_443",
];

/// The only CIDR list that leaves a search-head publicly reachable.
pub const OPEN_CIDR: &str = "0.0.0.0/0";

pub const SEARCH_HEAD_ROLE: &str = "search-head";

/// Search-head that keeps its CNAME domain even when no identifier can
/// be extracted from it.
pub const PRIMARY_SEARCH_HEAD: &str = "sh1";

/// The stack's base domain, from `vars.domain_name` across all instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseDomain {
    Unique(String),
    Missing,
    Ambiguous(Vec<String>),
}

impl BaseDomain {
    fn from_candidates(candidates: BTreeSet<String>) -> Self {
        let mut candidates: Vec<String> = candidates.into_iter().collect();
        match candidates.len() {
            0 => BaseDomain::Missing,
            1 => BaseDomain::Unique(candidates.remove(0)),
            _ => BaseDomain::Ambiguous(candidates),
        }
    }
}

/// Parse raw state text.
pub fn parse(raw: &str) -> ParseResult<Outcome> {
    let document: StateDocument = serde_json::from_str(raw)?;
    parse_document(&document)
}

/// Derive the outcome for an already-decoded document.
pub fn parse_document(document: &StateDocument) -> ParseResult<Outcome> {
    debug!(
        terraform_version = document.terraform_version.as_deref().unwrap_or("unknown"),
        resources = document.resources.len(),
        "state document decoded"
    );
    if document.resources.is_empty() {
        info!("state holds no resources");
        return Ok(Outcome::Directive(Directive::DeleteAll));
    }

    let base_domain = base_domain(document);
    match &base_domain {
        BaseDomain::Unique(domain) => debug!(%domain, "base domain set"),
        BaseDomain::Missing => debug!("no base domain in state"),
        BaseDomain::Ambiguous(domains) => {
            warn!(count = domains.len(), ?domains, "more than one base domain in state")
        }
    }

    if let Some(rule) = whitelisted_rule(document) {
        info!(resource = %rule, "search-head whitelisting found");
        return Ok(Outcome::Directive(Directive::Whitelisted));
    }

    let scan = Scan::run(document);
    if scan.search_heads.is_empty() {
        info!("no search-heads in state");
        return Ok(Outcome::Directive(Directive::NoSearchHeads));
    }

    let stack = scan.stack()?;
    let desired = resolve(&scan, &stack, &base_domain)?;
    info!(%stack, tests = desired.len(), "desired tests derived");
    Ok(Outcome::Desired(desired))
}

fn base_domain(document: &StateDocument) -> BaseDomain {
    let candidates = document
        .resources
        .iter()
        .flat_map(|r| &r.instances)
        .filter_map(|i| i.attributes.base_domain())
        .map(str::to_string)
        .collect();
    BaseDomain::from_candidates(candidates)
}

/// Name of the first rule resource (document order) whose CIDR list is
/// anything other than exactly `["0.0.0.0/0"]`.
fn whitelisted_rule(document: &StateDocument) -> Option<&str> {
    document
        .resources
        .iter()
        .filter(|r| WHITELIST_RULE_RESOURCES.contains(&r.name.as_str()))
        .find(|r| is_restricted(r))
        .map(|r| r.name.as_str())
}

fn is_restricted(resource: &Resource) -> bool {
    let Some(instance) = resource.instances.first() else {
        warn!(resource = %resource.name, "security-group rule has no instances");
        return false;
    };

    let cidrs = &instance.attributes.cidr_blocks;
    if cidrs.len() == 1 && cidrs[0] == OPEN_CIDR {
        debug!(resource = %resource.name, "search-head rule is open");
        return false;
    }

    for cidr in cidrs {
        info!(resource = %resource.name, %cidr, "whitelist rule");
    }
    true
}

/// CNAME records and search-heads gathered in one pass over all instances.
#[derive(Debug, Default)]
struct Scan {
    /// Domain → aliases, in answer order.
    cnames: BTreeMap<String, Vec<String>>,
    search_heads: BTreeSet<String>,
    /// Distinct non-empty `Stack` tags seen on search-heads.
    stacks: BTreeSet<String>,
}

impl Scan {
    fn run(document: &StateDocument) -> Self {
        let mut scan = Scan::default();

        for instance in document.resources.iter().flat_map(|r| &r.instances) {
            let attrs = &instance.attributes;

            if attrs.is_cname() {
                if let Some(domain) = attrs.domain.as_deref().filter(|d| !d.is_empty()) {
                    let aliases = scan.cnames.entry(domain.to_string()).or_default();
                    for alias in attrs.aliases() {
                        debug!(%domain, %alias, "CNAME alias");
                        aliases.push(alias.to_string());
                    }
                }
            }

            let Some(tags) = attrs.tags.fields() else {
                continue;
            };
            if tags.role.as_deref() != Some(SEARCH_HEAD_ROLE) {
                continue;
            }
            let search_head = tags.search_head.as_deref().unwrap_or_default();
            if search_head.is_empty() {
                warn!("search-head instance without a SearchHead tag, keeping it with an empty identifier");
            }
            scan.search_heads.insert(search_head.to_string());
            if let Some(stack) = tags.stack.as_deref().filter(|s| !s.is_empty()) {
                scan.stacks.insert(stack.to_string());
            }
        }

        scan
    }

    /// The single stack the search-heads belong to.
    fn stack(&self) -> ParseResult<String> {
        match self.stacks.len() {
            0 => {
                warn!("search-heads carry no Stack tag");
                Ok(String::new())
            }
            1 => Ok(self.stacks.iter().next().cloned().unwrap_or_default()),
            _ => Err(ParseError::ConflictingStacks(self.stacks.iter().cloned().collect())),
        }
    }
}

fn resolve(scan: &Scan, stack: &str, base_domain: &BaseDomain) -> ParseResult<DesiredTests> {
    let pattern = endpoint::identifier_pattern(stack)?;
    let mut desired = DesiredTests::new();

    for search_head in &scan.search_heads {
        let test = match match_cname(search_head, &scan.cnames, &pattern) {
            Some((domain, identifier)) => DesiredTest::new(stack, domain, &identifier),
            None => {
                let host = fallback_host(search_head, stack, base_domain)?;
                debug!(%search_head, %host, "no CNAME for search-head, using fallback host");
                DesiredTest::new(stack, &host, STANDARD_IDENTIFIER)
            }
        };
        debug!(key = %test.key(), identifier = %test.identifier, "desired test");
        desired.insert(test);
    }

    Ok(desired)
}

/// First CNAME domain whose alias starts with `search_head` and either
/// yields an identifier or belongs to the primary search-head.
fn match_cname<'a>(
    search_head: &str,
    cnames: &'a BTreeMap<String, Vec<String>>,
    pattern: &Regex,
) -> Option<(&'a str, String)> {
    for (domain, aliases) in cnames {
        if !aliases.iter().any(|a| a.starts_with(search_head)) {
            continue;
        }

        if let Some(caps) = pattern.captures(domain) {
            return Some((domain.as_str(), caps[1].to_string()));
        }
        if search_head == PRIMARY_SEARCH_HEAD {
            return Some((domain.as_str(), STANDARD_IDENTIFIER.to_string()));
        }
        debug!(%search_head, %domain, "alias matches but domain yields no identifier");
    }
    None
}

fn fallback_host(search_head: &str, stack: &str, base_domain: &BaseDomain) -> ParseResult<String> {
    match base_domain {
        BaseDomain::Unique(domain) => Ok(endpoint::synthesized_host(search_head, stack, domain)),
        BaseDomain::Missing => {
            let host = endpoint::synthesized_host(search_head, stack, "");
            warn!(%search_head, %host, "state has no domain_name, fallback host has an empty base domain");
            Ok(host)
        }
        BaseDomain::Ambiguous(domains) => Err(ParseError::BaseDomainUnavailable {
            search_head: search_head.to_string(),
            reason: format!("several domain names: {}", domains.join(", ")),
        }),
    }
}
