//! Shopping cart state.
//!
//! - [`line`] - cart line items and their piece/carton pricing
//! - [`persist`] - the persisted JSON format, including legacy spellings
//! - [`store`] - the session cart store and its background writer

pub mod line;
pub mod persist;
pub mod store;

pub use line::{CartLineItem, LineDetails, LineKind, LinePricing, Step, Unit};
pub use store::{CartSnapshot, CartStore, LineOutcome};
