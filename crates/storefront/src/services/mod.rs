//! Storefront workflows built on the cart, the session and the API client.
//!
//! - [`checkout`] - sale order assembly and submission
//! - [`reorder`] - copying a past order back into the cart
//! - [`session`] - the persisted logged-in user

pub mod checkout;
pub mod reorder;
pub mod session;

pub use checkout::{
    CheckoutError, CheckoutOptions, SaleOrder, SaleOrderLine, SaleReceipt, SalesGateway,
    build_sale_order, submit,
};
pub use reorder::{CatalogSource, ReorderSummary, reorder};
pub use session::{SessionError, SessionStore};
