//! Catalog descriptors returned by the product catalog service.
//!
//! These are read-only views of remote documents. Cart lines are built from
//! them (see [`crate::cart::CartLineItem::from_product`]) and never refer back
//! to them afterwards.

use serde::Deserialize;

use pos_storefront_core::{
    BrandId, CompanyId, Money, ProductId, Rule, VARIANT_PRODUCT_TYPE, VariantId,
};

use super::de;

/// Pick the first non-zero carton price among the accepted spellings.
fn first_non_zero(candidates: &[Option<Money>]) -> Money {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|price| !price.is_zero())
        .unwrap_or(Money::ZERO)
}

// =============================================================================
// Products
// =============================================================================

/// A sellable product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    /// Catalog document id.
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_image")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub item_code: Option<String>,
    /// Brand name (the service sometimes embeds the brand document).
    #[serde(default, deserialize_with = "de::opt_text")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub company: Option<String>,
    /// Product type string; see [`VARIANT_PRODUCT_TYPE`].
    #[serde(default, deserialize_with = "de::opt_text")]
    pub product_type: Option<String>,
    /// Price per piece.
    #[serde(default, deserialize_with = "de::opt_money")]
    pub sales_price: Option<Money>,
    #[serde(default, deserialize_with = "de::opt_money")]
    sales_price_of_carton: Option<Money>,
    #[serde(
        default,
        rename = "salesPriceofCarton",
        deserialize_with = "de::opt_money"
    )]
    legacy_sales_price_of_carton: Option<Money>,
    #[serde(default, deserialize_with = "de::opt_count")]
    rule: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_count")]
    remaining_stock: Option<u32>,
    /// Whether the current user has this product on their wishlist.
    #[serde(default, deserialize_with = "de::flag")]
    pub is_liked: bool,
    #[serde(default, deserialize_with = "de::lossy_seq")]
    pub variants: Vec<CatalogVariant>,
}

impl CatalogProduct {
    /// Whether the product is sold per variant.
    #[must_use]
    pub fn is_variant_product(&self) -> bool {
        self.product_type.as_deref() == Some(VARIANT_PRODUCT_TYPE)
    }

    /// Price per piece, zero when the catalog has none.
    #[must_use]
    pub fn unit_price(&self) -> Money {
        self.sales_price.unwrap_or(Money::ZERO)
    }

    /// Price per carton, accepting either catalog spelling.
    #[must_use]
    pub fn carton_price(&self) -> Money {
        first_non_zero(&[self.sales_price_of_carton, self.legacy_sales_price_of_carton])
    }

    /// Pieces per carton.
    #[must_use]
    pub fn rule(&self) -> Rule {
        Rule::from_raw(self.rule)
    }

    /// Stock on hand in pieces.
    #[must_use]
    pub fn remaining_stock(&self) -> u32 {
        self.remaining_stock.unwrap_or(0)
    }

    /// Look up a variant by id.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&CatalogVariant> {
        self.variants.iter().find(|v| &v.variant_id == id)
    }

    /// Look up a variant by its display value (e.g. "Red / XL").
    #[must_use]
    pub fn variant_by_value(&self, value: &str) -> Option<&CatalogVariant> {
        self.variants.iter().find(|v| v.variant_value == value)
    }
}

/// One purchasable configuration of a variant product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogVariant {
    pub variant_id: VariantId,
    /// Display value, used as the cart line's variant name.
    #[serde(default, deserialize_with = "de::text")]
    pub variant_value: String,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub item_code: Option<String>,
    #[serde(default, deserialize_with = "de::opt_money")]
    pub sales_price: Option<Money>,
    #[serde(default, deserialize_with = "de::opt_money")]
    sales_price_of_carton: Option<Money>,
    #[serde(
        default,
        rename = "salesPriceofCarton",
        deserialize_with = "de::opt_money"
    )]
    legacy_sales_price_of_carton: Option<Money>,
    #[serde(default, deserialize_with = "de::opt_count")]
    rule: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_count")]
    remaining_stock: Option<u32>,
}

impl CatalogVariant {
    #[must_use]
    pub fn unit_price(&self) -> Money {
        self.sales_price.unwrap_or(Money::ZERO)
    }

    #[must_use]
    pub fn carton_price(&self) -> Money {
        first_non_zero(&[self.sales_price_of_carton, self.legacy_sales_price_of_carton])
    }

    #[must_use]
    pub fn rule(&self) -> Rule {
        Rule::from_raw(self.rule)
    }

    #[must_use]
    pub fn remaining_stock(&self) -> u32 {
        self.remaining_stock.unwrap_or(0)
    }
}

// =============================================================================
// Browsing
// =============================================================================

/// A company (supplier) listed on the home screen.
#[derive(Debug, Clone, Deserialize)]
pub struct Company {
    #[serde(rename = "_id")]
    pub id: CompanyId,
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_image")]
    pub image: Option<String>,
}

/// A brand belonging to a company.
#[derive(Debug, Clone, Deserialize)]
pub struct Brand {
    #[serde(rename = "_id")]
    pub id: BrandId,
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_image")]
    pub image: Option<String>,
}

/// A brand together with its products, as returned by the company catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct BrandSection {
    #[serde(rename = "_id")]
    pub id: BrandId,
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "de::lossy_seq")]
    pub products: Vec<CatalogProduct>,
}

/// Company catalog grouped by brand.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyCatalog {
    #[serde(default, deserialize_with = "de::lossy_seq")]
    pub brands: Vec<BrandSection>,
}

impl CompanyCatalog {
    /// Products the current user has liked, across all brands.
    pub fn liked_products(&self) -> impl Iterator<Item = &CatalogProduct> {
        self.brands
            .iter()
            .flat_map(|brand| &brand.products)
            .filter(|product| product.is_liked)
    }
}

/// A paginated product listing (`{ docs: [...] }`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPage {
    #[serde(default, deserialize_with = "de::lossy_seq")]
    pub docs: Vec<CatalogProduct>,
}
