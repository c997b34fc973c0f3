//! URL handling module for AutoSiteFix
//!
//! This module provides URL normalization, entry URL validation, and the same-origin
//! test used to keep discovery on one site.

mod normalize;
mod origin;

pub use normalize::normalize_url;
pub use origin::{is_same_origin, parse_entry_url};
