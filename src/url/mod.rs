//! URL handling module for Link-Ripple
//!
//! This module turns the raw `href` values found on a page into absolute,
//! navigable URLs. No normalization is applied: two URLs that differ only in
//! a trailing slash, letter case or query order are treated as distinct links.

mod resolve;

pub use resolve::{is_navigable, is_skippable_reference, resolve};

/// Schemes the crawler is able to fetch
pub const NAVIGABLE_SCHEMES: &[&str] = &["http", "https"];

/// Reference prefixes that never point at a fetchable page
pub const SKIPPED_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];
