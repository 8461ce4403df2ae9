//! Types shared between the audit ledger server and its clients.
//!
//! `model` holds the persisted entities and the shapes the pipeline passes around,
//! `requests` the JSON bodies and query strings accepted by the HTTP API and
//! `responses` what it sends back.

pub mod model;
pub mod requests;
pub mod responses;
