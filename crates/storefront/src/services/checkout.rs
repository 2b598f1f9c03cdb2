//! Checkout assembly and submission.
//!
//! [`build_sale_order`] is a pure mapping from cart lines to the payload the
//! sales endpoint expects. [`submit`] sends it through a [`SalesGateway`] and
//! clears the cart only once the server has accepted the order.

use std::future::Future;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument, warn};

use pos_storefront_core::{
    Money, OrderId, OrderStatus, PaymentMethod, ProductId, Rule, UserId, VariantId,
};

use crate::api::ApiError;
use crate::cart::{CartLineItem, CartStore};
use crate::config::{CheckoutDefaults, ConfigError};
use crate::models::UserSession;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// Orders are placed on behalf of a logged-in customer.
    #[error("no user is logged in")]
    NotLoggedIn,

    /// The sales endpoint refused or could not be reached.
    #[error("sale was not accepted: {0}")]
    Api(#[from] ApiError),
}

/// Order fields chosen at checkout rather than derived from the cart.
#[derive(Debug, Clone)]
pub struct CheckoutOptions {
    pub sales_person: UserId,
    pub pickup_location: String,
    pub terms: String,
    pub payment_method: PaymentMethod,
}

impl CheckoutOptions {
    /// Options from configured defaults and the customer's payment choice.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no sales person is configured.
    pub fn from_defaults(
        defaults: &CheckoutDefaults,
        payment_method: PaymentMethod,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            sales_person: defaults.require_sales_person()?.clone(),
            pickup_location: defaults.pickup_location.clone(),
            terms: defaults.terms.clone(),
            payment_method,
        })
    }
}

/// Payload for `POST sales/create`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleOrder {
    pub customer: UserId,
    pub discount: Money,
    pub paid_payment: Money,
    pub payments: Vec<Value>,
    /// RFC 3339 with the local offset.
    pub sales_date: String,
    pub order_status: OrderStatus,
    pub order_tax: Money,
    pub shipping: Money,
    pub total_amount: Money,
    pub terms_conditions: String,
    pub is_online: bool,
    pub sales_person: UserId,
    pub notes: String,
    pub payment_method: PaymentMethod,
    pub products: Vec<SaleOrderLine>,
}

/// One product line of a [`SaleOrder`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleOrderLine {
    pub product: ProductId,
    pub product_type: Option<String>,
    pub variant_name: Option<String>,
    pub variant_id: Option<VariantId>,
    pub product_name: String,
    pub product_image: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub item_code: Option<String>,
    pub quantity: u64,
    pub unit_price: Money,
    pub carton_price: Money,
    pub subtotal: Money,
    pub rule: Rule,
    pub no_of_pieces: u32,
    pub no_of_cartons: u32,
}

impl From<&CartLineItem> for SaleOrderLine {
    fn from(line: &CartLineItem) -> Self {
        let details = line.details();
        Self {
            product: line.product_id().clone(),
            product_type: details.product_type.clone(),
            variant_name: line.variant_name().map(str::to_string),
            variant_id: line.variant_id().cloned(),
            product_name: details.name.clone(),
            product_image: details.image.clone(),
            brand: details.brand.clone(),
            category: details.category.clone(),
            item_code: details.item_code.clone(),
            quantity: line.quantity(),
            unit_price: line.unit_price(),
            carton_price: line.carton_price(),
            subtotal: line.subtotal(),
            rule: line.rule(),
            no_of_pieces: line.pieces(),
            no_of_cartons: line.cartons(),
        }
    }
}

/// What the sales endpoint returns for an accepted order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleReceipt {
    #[serde(rename = "_id", default)]
    pub id: Option<OrderId>,
    #[serde(default)]
    pub invoice_number: Option<String>,
}

impl SaleReceipt {
    /// Invoice number when assigned, otherwise the order id.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.invoice_number
            .as_deref()
            .or_else(|| self.id.as_ref().map(OrderId::as_str))
    }
}

/// Anything that can place a sale.
pub trait SalesGateway: Send + Sync {
    /// Submit an order.
    fn create_sale(
        &self,
        order: &SaleOrder,
    ) -> impl Future<Output = Result<SaleReceipt, ApiError>> + Send;
}

/// Build the sale order for the given cart lines.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` if there are no lines and
/// `CheckoutError::NotLoggedIn` if there is no customer.
pub fn build_sale_order(
    customer: Option<&UserSession>,
    lines: &[CartLineItem],
    options: &CheckoutOptions,
    sales_date: DateTime<FixedOffset>,
) -> Result<SaleOrder, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let customer = customer.ok_or(CheckoutError::NotLoggedIn)?;

    Ok(SaleOrder {
        customer: customer.id.clone(),
        discount: Money::ZERO,
        paid_payment: Money::ZERO,
        payments: Vec::new(),
        sales_date: sales_date.to_rfc3339_opts(SecondsFormat::Secs, false),
        order_status: OrderStatus::Pending,
        order_tax: Money::ZERO,
        shipping: Money::ZERO,
        total_amount: lines.iter().map(CartLineItem::subtotal).sum(),
        terms_conditions: options.terms.clone(),
        is_online: true,
        sales_person: options.sales_person.clone(),
        notes: format!("Pickup from '{}'", options.pickup_location),
        payment_method: options.payment_method,
        products: lines.iter().map(SaleOrderLine::from).collect(),
    })
}

/// Place the cart as an order.
///
/// The cart is cleared and flushed after the gateway accepts the order. On
/// any error it is left as it was.
///
/// # Errors
///
/// Returns `CheckoutError` if the order cannot be built or is not accepted.
#[instrument(skip_all, fields(lines = cart.len()))]
pub async fn submit<G: SalesGateway>(
    cart: &mut CartStore,
    customer: Option<&UserSession>,
    options: &CheckoutOptions,
    gateway: &G,
) -> Result<SaleReceipt, CheckoutError> {
    let order = build_sale_order(
        customer,
        cart.items(),
        options,
        chrono::Local::now().fixed_offset(),
    )?;

    let receipt = gateway.create_sale(&order).await.map_err(|e| {
        warn!(error = %e, "Sale was not accepted, keeping cart");
        e
    })?;

    info!(
        invoice = receipt.label().unwrap_or("-"),
        total = %order.total_amount,
        "Sale created"
    );
    cart.clear();
    cart.flush().await;

    Ok(receipt)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::TimeZone;

    use super::*;
    use crate::cart::{LineDetails, LineKind, LinePricing};
    use crate::models::keys;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn options() -> CheckoutOptions {
        CheckoutOptions {
            sales_person: UserId::new("SP1"),
            pickup_location: "Main Street".to_string(),
            terms: "No returns after 7 days.".to_string(),
            payment_method: PaymentMethod::Cash,
        }
    }

    fn customer() -> UserSession {
        UserSession::new(UserId::new("U1"), "Ayesha")
    }

    fn variant_line() -> CartLineItem {
        CartLineItem::new(
            ProductId::new("P1"),
            LineKind::Variant {
                variant_id: VariantId::new("V1"),
                variant_name: "250ml".to_string(),
            },
            LineDetails {
                name: "Shampoo".to_string(),
                brand: Some("Sunsilk".to_string()),
                product_type: Some("Variant Type Product".to_string()),
                ..LineDetails::default()
            },
            LinePricing {
                unit_price: Money::from_units(10),
                carton_price: Money::from_units(100),
                rule: Rule::new(12),
            },
            50,
        )
        .with_counts(3, 2)
    }

    fn sales_date() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 4, 9, 14, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_build_sale_order_payload() {
        let user = customer();
        let order =
            build_sale_order(Some(&user), &[variant_line()], &options(), sales_date()).unwrap();
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["customer"], "U1");
        assert_eq!(json["salesPerson"], "SP1");
        assert_eq!(json["salesDate"], "2025-04-09T14:30:00+05:00");
        assert_eq!(json["orderStatus"], "Pending");
        assert_eq!(json["isOnline"], true);
        assert_eq!(json["notes"], "Pickup from 'Main Street'");
        assert_eq!(json["termsConditions"], "No returns after 7 days.");
        assert_eq!(json["paymentMethod"], "Cash");
        assert_eq!(json["payments"], serde_json::json!([]));
        assert_eq!(json["discount"].as_f64(), Some(0.0));
        assert_eq!(json["totalAmount"].as_f64(), Some(230.0));

        let line = &json["products"][0];
        assert_eq!(line["product"], "P1");
        assert_eq!(line["variantId"], "V1");
        assert_eq!(line["variantName"], "250ml");
        assert_eq!(line["productName"], "Shampoo");
        assert_eq!(line["brand"], "Sunsilk");
        assert_eq!(line["productType"], "Variant Type Product");
        assert_eq!(line["quantity"], 27);
        assert_eq!(line["noOfPieces"], 3);
        assert_eq!(line["noOfCartons"], 2);
        assert_eq!(line["rule"], 12);
        assert_eq!(line["unitPrice"].as_f64(), Some(10.0));
        assert_eq!(line["cartonPrice"].as_f64(), Some(100.0));
        assert_eq!(line["subtotal"].as_f64(), Some(230.0));
    }

    #[test]
    fn test_build_sale_order_rejects_empty_cart_and_missing_user() {
        let user = customer();
        assert!(matches!(
            build_sale_order(Some(&user), &[], &options(), sales_date()),
            Err(CheckoutError::EmptyCart)
        ));
        assert!(matches!(
            build_sale_order(None, &[variant_line()], &options(), sales_date()),
            Err(CheckoutError::NotLoggedIn)
        ));
    }

    #[test]
    fn test_options_require_sales_person() {
        let defaults = CheckoutDefaults::default();
        assert!(matches!(
            CheckoutOptions::from_defaults(&defaults, PaymentMethod::Card),
            Err(ConfigError::MissingEnvVar(_))
        ));

        let defaults = CheckoutDefaults {
            sales_person: Some(UserId::new("SP9")),
            ..CheckoutDefaults::default()
        };
        let options = CheckoutOptions::from_defaults(&defaults, PaymentMethod::Card).unwrap();
        assert_eq!(options.sales_person.as_str(), "SP9");
        assert_eq!(options.payment_method, PaymentMethod::Card);
    }

    #[derive(Default)]
    struct FakeGateway {
        reject: Option<String>,
        orders: Mutex<Vec<SaleOrder>>,
    }

    impl SalesGateway for FakeGateway {
        async fn create_sale(&self, order: &SaleOrder) -> Result<SaleReceipt, ApiError> {
            if let Some(msg) = &self.reject {
                return Err(ApiError::Rejected(msg.clone()));
            }
            self.orders.lock().unwrap().push(order.clone());
            Ok(SaleReceipt {
                id: Some(OrderId::new("O1")),
                invoice_number: Some("INV-0001".to_string()),
            })
        }
    }

    #[tokio::test]
    async fn test_submit_clears_cart_on_success() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = CartStore::initialize(Arc::clone(&storage)).await;
        cart.add_or_increment(variant_line());
        cart.flush().await;

        let gateway = FakeGateway::default();
        let user = customer();
        let receipt = submit(&mut cart, Some(&user), &options(), &gateway)
            .await
            .unwrap();

        assert_eq!(receipt.label(), Some("INV-0001"));
        assert_eq!(gateway.orders.lock().unwrap().len(), 1);
        assert!(cart.is_empty());
        assert_eq!(storage.get(keys::CART).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_submit_keeps_cart_on_rejection() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = CartStore::initialize(Arc::clone(&storage)).await;
        cart.add_or_increment(variant_line());
        cart.flush().await;

        let gateway = FakeGateway {
            reject: Some("Out of stock".to_string()),
            ..FakeGateway::default()
        };
        let user = customer();
        let err = submit(&mut cart, Some(&user), &options(), &gateway)
            .await
            .unwrap_err();

        assert!(matches!(&err, CheckoutError::Api(e) if e.user_message() == "Out of stock"));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total(), Money::from_units(230));
        assert!(storage.get(keys::CART).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_submit_without_user_does_not_call_gateway() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = CartStore::initialize(storage).await;
        cart.add_or_increment(variant_line());

        let gateway = FakeGateway::default();
        let err = submit(&mut cart, None, &options(), &gateway)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::NotLoggedIn));
        assert!(gateway.orders.lock().unwrap().is_empty());
        assert_eq!(cart.len(), 1);
    }
}
