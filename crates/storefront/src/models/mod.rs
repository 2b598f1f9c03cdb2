//! Data models for catalog documents, past orders and the user session.

pub mod catalog;
pub mod de;
pub mod order;
pub mod session;

pub use catalog::{
    Brand, BrandSection, CatalogProduct, CatalogVariant, Company, CompanyCatalog, ProductPage,
};
pub use order::{OrderHistory, OrderLine, OrderSummary, ProductRef};
pub use session::{UserSession, keys};
