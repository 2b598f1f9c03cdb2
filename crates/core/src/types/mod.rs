//! Core types for the POS storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod rule;
pub mod status;

pub use id::*;
pub use money::{Money, MoneyError};
pub use rule::Rule;
pub use status::*;
