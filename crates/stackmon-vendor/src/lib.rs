//! stackmon-vendor — HTTP client for the monitoring vendor's test API.
//!
//! Implements [`stackmon_core::MonitorApi`] over the vendor's JSON API:
//!
//! ```text
//! GET  /tests                          → list every test
//! POST /tests/<type>/new.json          → create a test
//! POST /tests/<type>/<id>/delete.json  → delete a test
//! ```
//!
//! Every request authenticates with HTTP Basic. Non-2xx responses are
//! errors; nothing is retried.

pub mod client;
pub mod payload;

pub use client::VendorClient;
