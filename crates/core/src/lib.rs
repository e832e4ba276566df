//! machbar core - catalog types and ranking logic.
//!
//! This crate provides the domain model shared by all machbar components:
//! - `storefront` - catalog store, remote adapter and JSON API
//! - `cli` - operator tooling for the remote source and the seed catalog
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async. This keeps it lightweight and trivially testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, slugs, images and enums
//! - [`catalog`] - Products, creators, posts and apps, plus ranking, feed
//!   and query logic over them

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;

pub use catalog::*;
pub use types::*;

#[doc(hidden)]
pub mod __private {
    pub use uuid::Uuid;
}
