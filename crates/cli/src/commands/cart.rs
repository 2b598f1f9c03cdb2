//! Cart and checkout commands.
//!
//! # Usage
//!
//! ```bash
//! pos-cli cart add <product-id> [--variant <variant-id>]
//! pos-cli cart inc <line-id> [--carton]
//! pos-cli cart set <line-id> --pieces 3 --cartons 2
//! pos-cli cart show
//! pos-cli checkout --payment-method cash
//! ```

use tracing::info;

use pos_storefront::cart::{CartLineItem, CartStore, LineOutcome, Unit};
use pos_storefront::services::{self, CheckoutOptions};
use pos_storefront::{AppError, Result};
use pos_storefront_core::{LineId, PaymentMethod, ProductId, VariantId};

use super::{Context, require_user};

/// Print every line with its counts and subtotal.
#[allow(clippy::print_stdout)]
pub async fn show(ctx: &Context) {
    let cart = ctx.cart().await;

    if cart.is_empty() {
        println!("Cart is empty");
    } else {
        for line in cart.items() {
            print_line(line);
        }
        println!();
        println!(
            "{} line(s), {} piece(s), total {}",
            cart.len(),
            cart.total_quantity(),
            cart.total()
        );
    }

    cart.teardown().await;
}

#[allow(clippy::print_stdout)]
pub async fn total(ctx: &Context) {
    let cart = ctx.cart().await;
    println!("{}", cart.total());
    cart.teardown().await;
}

/// Add a catalog product, or one more piece of it if already in the cart.
pub async fn add(ctx: &Context, product_id: &str, variant: Option<&str>) -> Result<()> {
    let client = ctx.client()?;
    let product = client.get_product(&ProductId::new(product_id)).await?;

    let item = match variant {
        Some(variant_id) => {
            let variant = product
                .variant(&VariantId::new(variant_id))
                .ok_or_else(|| AppError::NotFound(format!("Variant {variant_id}")))?;
            CartLineItem::from_variant(&product, variant)
        }
        None if product.is_variant_product() => {
            let choices = product
                .variants
                .iter()
                .map(|v| format!("{} ({})", v.variant_id, v.variant_value))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(AppError::BadRequest(format!(
                "{} is sold per variant, pass --variant with one of: {choices}",
                product.name
            )));
        }
        None => CartLineItem::from_product(&product),
    };

    if item.is_out_of_stock() {
        return Err(AppError::BadRequest(format!(
            "{} is out of stock",
            item.display_name()
        )));
    }

    let mut cart = ctx.cart().await;
    if cart.get(item.id()).is_some_and(CartLineItem::at_stock_limit) {
        let name = item.display_name();
        cart.teardown().await;
        return Err(AppError::BadRequest(format!(
            "Only {} of {name} in stock",
            item.remaining_stock()
        )));
    }

    let id = item.id().clone();
    let outcome = cart.add_or_increment(item);
    info!(line_id = %id, ?outcome, "Added to cart");
    report(&cart, &id, outcome);

    cart.teardown().await;
    Ok(())
}

/// Add or remove a single piece or carton.
pub async fn step(ctx: &Context, line_id: &str, carton: bool, up: bool) -> Result<()> {
    let id = LineId::new(line_id);
    let unit = if carton { Unit::Carton } else { Unit::Piece };
    let mut cart = ctx.cart().await;
    if cart.get(&id).is_none() {
        cart.teardown().await;
        return Err(AppError::NotFound(format!("Cart line {id}")));
    }

    let outcome = if up {
        // Stock is checked in pieces, so a carton must fit entirely
        let blocked = cart.get(&id).is_some_and(|line| {
            let added = match unit {
                Unit::Piece => 1,
                Unit::Carton => u64::from(line.rule().get()),
            };
            line.quantity() + added > u64::from(line.remaining_stock())
        });
        if blocked {
            cart.teardown().await;
            return Err(AppError::BadRequest(format!(
                "Not enough stock to add another {unit}"
            )));
        }
        cart.increment(&id, unit)
    } else {
        cart.decrement(&id, unit)
    };

    report(&cart, &id, outcome);
    cart.teardown().await;
    Ok(())
}

/// Replace both counts of a line. Zero counts remove it.
pub async fn set(ctx: &Context, line_id: &str, pieces: u32, cartons: u32) -> Result<()> {
    let id = LineId::new(line_id);
    let mut cart = ctx.cart().await;

    let Some(line) = cart.get(&id).cloned() else {
        cart.teardown().await;
        return Err(AppError::NotFound(format!("Cart line {id}")));
    };

    let outcome = cart.update_item(line.with_counts(pieces, cartons));
    report(&cart, &id, outcome);
    cart.teardown().await;
    Ok(())
}

pub async fn remove(ctx: &Context, line_id: &str) -> Result<()> {
    let id = LineId::new(line_id);
    let mut cart = ctx.cart().await;

    let outcome = cart.remove(&id);
    report(&cart, &id, outcome);
    cart.teardown().await;

    if outcome == LineOutcome::Unchanged {
        return Err(AppError::NotFound(format!("Cart line {id}")));
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn clear(ctx: &Context) {
    let mut cart = ctx.cart().await;
    cart.clear();
    cart.teardown().await;
    println!("Cart cleared");
}

/// Submit the cart as a sale for the logged-in user.
#[allow(clippy::print_stdout)]
pub async fn checkout(ctx: &Context, payment_method: PaymentMethod) -> Result<()> {
    let options = CheckoutOptions::from_defaults(&ctx.config.checkout, payment_method)?;
    let session = ctx.session().await;
    let user = require_user(&session)?;
    let client = ctx.client()?;

    let mut cart = ctx.cart().await;
    let total = cart.total();
    let result = services::submit(&mut cart, Some(user), &options, &client).await;
    cart.teardown().await;

    let receipt = result?;
    println!(
        "Order placed: {} ({total}, {payment_method})",
        receipt.label().unwrap_or("pending invoice")
    );
    Ok(())
}

// =============================================================================
// Output
// =============================================================================

#[allow(clippy::print_stdout)]
fn print_line(line: &CartLineItem) {
    let stock = if line.is_out_of_stock() {
        " [out of stock]"
    } else if line.at_stock_limit() {
        " [stock limit]"
    } else {
        ""
    };
    println!(
        "{:<28} {:<40} {:>3} pc + {:>3} ctn (x{}) = {:>6} pcs  {}{stock}",
        line.id().as_str(),
        line.display_name(),
        line.pieces(),
        line.cartons(),
        line.rule(),
        line.quantity(),
        line.subtotal(),
    );
}

#[allow(clippy::print_stdout)]
fn report(cart: &CartStore, id: &LineId, outcome: LineOutcome) {
    match outcome {
        LineOutcome::Inserted | LineOutcome::Updated => {
            if let Some(line) = cart.get(id) {
                print_line(line);
            }
        }
        LineOutcome::Removed => println!("Removed {id}"),
        LineOutcome::Unchanged => println!("No change to {id}"),
    }
    println!("Cart total: {}", cart.total());
}
