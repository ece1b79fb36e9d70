//! stackmon-tfstate — turns a Terraform state snapshot into the set of
//! endpoints that should be monitored.
//!
//! # Pipeline
//!
//! ```text
//! raw JSON ─► StateDocument ─► zero resources?        ─► DELETE_ALL
//!                            ├► base domain candidates
//!                            ├► SG rule CIDRs not open? ─► WHITELISTED
//!                            ├► CNAME records + search-heads
//!                            │     no search-heads?    ─► NO_SEARCH_HEADS
//!                            └► per search-head: first CNAME alias match,
//!                               else `<sh>.<stack>.<base domain>`
//! ```
//!
//! Attribute bags are loosely typed. Fields with an unexpected shape are
//! treated as absent instead of failing the parse; only text that is not
//! JSON at all is rejected.

pub mod error;
pub mod model;
pub mod parser;

pub use error::{ParseError, ParseResult};
pub use model::{StateDocument, TagFields, TagSet};
pub use parser::{BaseDomain, parse, parse_document};
