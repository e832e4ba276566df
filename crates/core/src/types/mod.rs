//! Core types for machbar.
//!
//! This module provides type-safe wrappers for common catalog concepts.

pub mod category;
pub mod id;
pub mod image;
pub mod price;
pub mod slug;
pub mod status;

pub use category::{CategoryInfo, ProductCategory, ProductSubcategory};
pub use id::*;
pub use image::{DEFAULT_PLACEHOLDER, ImageRef};
pub use price::Price;
pub use slug::Slug;
pub use status::*;
