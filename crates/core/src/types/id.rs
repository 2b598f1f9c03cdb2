//! Newtype IDs for type-safe entity references.
//!
//! The remote catalog identifies every entity with an opaque string (a
//! document id). Use the `define_id!` macro to create type-safe wrappers that
//! prevent accidentally mixing IDs from different entity types.

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use pos_storefront_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new("64f0c1");
/// let order_id = OrderId::new("64f0c1");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(CompanyId);
define_id!(BrandId);
define_id!(ProductId);
define_id!(VariantId);
define_id!(OrderId);

/// Key of a cart line.
///
/// A plain product line is keyed by the product id. A variant line is keyed by
/// `{product_id}-{variant_id}`, which lets two variants of the same product
/// occupy two distinct lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(String);

impl LineId {
    /// Key for a plain (non-variant) product line.
    #[must_use]
    pub fn for_product(product: &ProductId) -> Self {
        Self(product.as_str().to_owned())
    }

    /// Composite key for a variant line.
    #[must_use]
    pub fn for_variant(product: &ProductId, variant: &VariantId) -> Self {
        Self(format!("{product}-{variant}"))
    }

    /// Wrap a raw key, e.g. one typed on a command line.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LineId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_id_for_product_is_product_id() {
        let product = ProductId::new("P1");
        assert_eq!(LineId::for_product(&product).as_str(), "P1");
    }

    #[test]
    fn test_line_id_for_variant_is_composite() {
        let product = ProductId::new("P1");
        let variant = VariantId::new("V1");
        assert_eq!(LineId::for_variant(&product, &variant).as_str(), "P1-V1");
    }

    #[test]
    fn test_variants_of_same_product_have_distinct_keys() {
        let product = ProductId::new("P1");
        let red = LineId::for_variant(&product, &VariantId::new("red"));
        let blue = LineId::for_variant(&product, &VariantId::new("blue"));
        assert_ne!(red, blue);
        assert_ne!(red, LineId::for_product(&product));
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let id = ProductId::new("64f0c1a2");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"64f0c1a2\"");

        let parsed: ProductId = serde_json::from_str("\"64f0c1a2\"").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_display() {
        assert_eq!(UserId::new("u-1").to_string(), "u-1");
        assert_eq!(LineId::new("P1-V1").to_string(), "P1-V1");
    }
}
