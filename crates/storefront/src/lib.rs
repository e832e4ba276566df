//! machbar.io storefront library.
//!
//! The catalog store, the Airtable adapter behind it and the JSON API that
//! serves it. Split from the binary so it can be tested and reused by the
//! CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod airtable;
pub mod catalog;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
