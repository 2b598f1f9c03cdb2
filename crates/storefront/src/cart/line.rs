//! Cart line items.
//!
//! A line is either a simple product or one variant of a variant product.
//! Counts are kept in two units, loose pieces and whole cartons, and the
//! piece-equivalent quantity and subtotal are derived from them. The derived
//! fields are private and recomputed whenever a count changes, so they cannot
//! drift from the counts.

use pos_storefront_core::{LineId, Money, ProductId, Rule, VariantId};

use crate::models::{CatalogProduct, CatalogVariant, OrderLine};

/// Unit a count change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Piece,
    Carton,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Piece => write!(f, "piece"),
            Self::Carton => write!(f, "carton"),
        }
    }
}

/// Direction of a single-unit count change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
}

/// What a line represents in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// A product sold without variants.
    Simple,
    /// One variant of a variant product.
    Variant {
        variant_id: VariantId,
        variant_name: String,
    },
}

/// Display metadata copied from the catalog when the line is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineDetails {
    pub name: String,
    pub image: Option<String>,
    pub item_code: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub product_type: Option<String>,
}

impl LineDetails {
    fn from_product(product: &CatalogProduct) -> Self {
        Self {
            name: product.name.clone(),
            image: product.image.clone(),
            item_code: product.item_code.clone(),
            brand: product.brand.clone(),
            category: product.category.clone(),
            product_type: product.product_type.clone(),
        }
    }
}

/// Unit prices and carton size of a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinePricing {
    pub unit_price: Money,
    pub carton_price: Money,
    pub rule: Rule,
}

/// One entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineItem {
    id: LineId,
    product_id: ProductId,
    kind: LineKind,
    details: LineDetails,
    pricing: LinePricing,
    pieces: u32,
    cartons: u32,
    remaining_stock: u32,
    quantity: u64,
    subtotal: Money,
}

impl CartLineItem {
    /// Build a line with explicit counts.
    ///
    /// The line id is derived from `product_id` and `kind`: the product id for
    /// a simple line, `{productId}-{variantId}` for a variant line.
    #[must_use]
    pub fn new(
        product_id: ProductId,
        kind: LineKind,
        details: LineDetails,
        pricing: LinePricing,
        remaining_stock: u32,
    ) -> Self {
        let id = match &kind {
            LineKind::Simple => LineId::for_product(&product_id),
            LineKind::Variant { variant_id, .. } => LineId::for_variant(&product_id, variant_id),
        };

        let mut line = Self {
            id,
            product_id,
            kind,
            details,
            pricing,
            pieces: 0,
            cartons: 0,
            remaining_stock,
            quantity: 0,
            subtotal: Money::ZERO,
        };
        line.recompute();
        line
    }

    /// One piece of a simple product.
    #[must_use]
    pub fn from_product(product: &CatalogProduct) -> Self {
        Self::new(
            product.id.clone(),
            LineKind::Simple,
            LineDetails::from_product(product),
            LinePricing {
                unit_price: product.unit_price(),
                carton_price: product.carton_price(),
                rule: product.rule(),
            },
            product.remaining_stock(),
        )
        .with_counts(1, 0)
    }

    /// One piece of a single variant of `product`.
    #[must_use]
    pub fn from_variant(product: &CatalogProduct, variant: &CatalogVariant) -> Self {
        let mut details = LineDetails::from_product(product);
        if variant.item_code.is_some() {
            details.item_code.clone_from(&variant.item_code);
        }

        Self::new(
            product.id.clone(),
            LineKind::Variant {
                variant_id: variant.variant_id.clone(),
                variant_name: variant.variant_value.clone(),
            },
            details,
            LinePricing {
                unit_price: variant.unit_price(),
                carton_price: variant.carton_price(),
                rule: variant.rule(),
            },
            variant.remaining_stock(),
        )
        .with_counts(1, 0)
    }

    /// Rebuild a line from a past order, using `product` as freshly fetched
    /// from the catalog.
    ///
    /// Counts and prices come from the order; prices the order does not carry
    /// fall back to the current catalog price. The variant is matched by its
    /// display value first and its id second. The carton size and stock
    /// always come from the catalog.
    #[must_use]
    pub fn from_order_line(line: &OrderLine, product: &CatalogProduct) -> Self {
        let matched = line
            .variant_value
            .as_deref()
            .and_then(|value| product.variant_by_value(value))
            .or_else(|| line.variant_id.as_ref().and_then(|id| product.variant(id)));

        let mut item = match matched {
            Some(variant) => Self::from_variant(product, variant),
            None => {
                let mut item = Self::from_product(product);
                if let Some(variant_id) = &line.variant_id {
                    item = item.into_kind(LineKind::Variant {
                        variant_id: variant_id.clone(),
                        variant_name: line
                            .variant_name
                            .clone()
                            .or_else(|| line.variant_value.clone())
                            .unwrap_or_default(),
                    });
                }
                item
            }
        };

        if item.details.name.is_empty()
            && let Some(name) = &line.product.name
        {
            item.details.name.clone_from(name);
        }
        if item.details.image.is_none() {
            item.details.image.clone_from(&line.product.image);
        }

        if let Some(price) = line.unit_price.filter(|p| !p.is_zero()) {
            item.pricing.unit_price = price;
        }
        if let Some(price) = line.carton_price.filter(|p| !p.is_zero()) {
            item.pricing.carton_price = price;
        }

        let (pieces, cartons) = match (line.no_of_pieces, line.no_of_cartons) {
            (None, None) => (line.quantity.unwrap_or(0), 0),
            (pieces, cartons) => (pieces.unwrap_or(0), cartons.unwrap_or(0)),
        };
        item.with_counts(pieces, cartons)
    }

    fn into_kind(self, kind: LineKind) -> Self {
        Self::new(
            self.product_id,
            kind,
            self.details,
            self.pricing,
            self.remaining_stock,
        )
        .with_counts(self.pieces, self.cartons)
    }

    /// Replace both counts.
    #[must_use]
    pub fn with_counts(mut self, pieces: u32, cartons: u32) -> Self {
        self.set_counts(pieces, cartons);
        self
    }

    /// Replace both counts and recompute the derived fields.
    pub fn set_counts(&mut self, pieces: u32, cartons: u32) {
        self.pieces = pieces;
        self.cartons = cartons;
        self.recompute();
    }

    /// Move one unit up or down.
    ///
    /// Returns `false` without changing anything when stepping down a unit
    /// that is already at zero.
    pub fn adjust(&mut self, unit: Unit, step: Step) -> bool {
        let count = match unit {
            Unit::Piece => &mut self.pieces,
            Unit::Carton => &mut self.cartons,
        };

        match step {
            Step::Up => *count = count.saturating_add(1),
            Step::Down if *count == 0 => return false,
            Step::Down => *count -= 1,
        }

        self.recompute();
        true
    }

    fn recompute(&mut self) {
        self.quantity = self.pricing.rule.piece_equivalent(self.pieces, self.cartons);
        self.subtotal = self.pricing.unit_price.times(self.pieces)
            + self.pricing.carton_price.times(self.cartons);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn id(&self) -> &LineId {
        &self.id
    }

    /// Catalog product id (the parent product for variant lines).
    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    #[must_use]
    pub const fn kind(&self) -> &LineKind {
        &self.kind
    }

    #[must_use]
    pub const fn variant_id(&self) -> Option<&VariantId> {
        match &self.kind {
            LineKind::Simple => None,
            LineKind::Variant { variant_id, .. } => Some(variant_id),
        }
    }

    #[must_use]
    pub fn variant_name(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Simple => None,
            LineKind::Variant { variant_name, .. } => Some(variant_name),
        }
    }

    #[must_use]
    pub const fn details(&self) -> &LineDetails {
        &self.details
    }

    #[must_use]
    pub const fn pricing(&self) -> &LinePricing {
        &self.pricing
    }

    #[must_use]
    pub const fn unit_price(&self) -> Money {
        self.pricing.unit_price
    }

    #[must_use]
    pub const fn carton_price(&self) -> Money {
        self.pricing.carton_price
    }

    #[must_use]
    pub const fn rule(&self) -> Rule {
        self.pricing.rule
    }

    /// Loose pieces.
    #[must_use]
    pub const fn pieces(&self) -> u32 {
        self.pieces
    }

    /// Whole cartons.
    #[must_use]
    pub const fn cartons(&self) -> u32 {
        self.cartons
    }

    /// Piece-equivalent quantity: `pieces + cartons * rule`.
    #[must_use]
    pub const fn quantity(&self) -> u64 {
        self.quantity
    }

    /// `pieces * unit_price + cartons * carton_price`.
    #[must_use]
    pub const fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// Stock on hand when the line was created.
    #[must_use]
    pub const fn remaining_stock(&self) -> u32 {
        self.remaining_stock
    }

    /// Whether both counts are zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pieces == 0 && self.cartons == 0
    }

    #[must_use]
    pub const fn is_out_of_stock(&self) -> bool {
        self.remaining_stock == 0
    }

    /// Whether the quantity has reached the stock snapshot. The store does not
    /// enforce this; increment controls should.
    #[must_use]
    pub fn at_stock_limit(&self) -> bool {
        self.quantity >= u64::from(self.remaining_stock)
    }

    /// Product name with the variant appended, e.g. `Shampoo (250ml)`.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.variant_name() {
            Some(variant) if !variant.is_empty() => format!("{} ({variant})", self.details.name),
            _ => self.details.name.clone(),
        }
    }
}
