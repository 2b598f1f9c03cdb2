//! Account commands: session, order history and wishlist.

use pos_storefront::models::{CatalogProduct, UserSession};
use pos_storefront::services;
use pos_storefront::{AppError, Result};
use pos_storefront_core::{ProductId, UserId};

use super::{Context, require_user};

/// Persist a user as the logged-in customer.
#[allow(clippy::print_stdout)]
pub async fn login(ctx: &Context, id: String, name: String, email: Option<String>) -> Result<()> {
    let mut user = UserSession::new(UserId::new(id), name);
    if let Some(email) = email {
        user = user.with_email(email);
    }

    let mut session = ctx.session().await;
    session.login(user).await?;

    if let Some(user) = session.current() {
        println!("Logged in as {} ({})", user.name, user.id);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn logout(ctx: &Context) -> Result<()> {
    let mut session = ctx.session().await;
    session.logout().await?;
    println!("Logged out");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn whoami(ctx: &Context) {
    let session = ctx.session().await;
    match session.current() {
        Some(user) => {
            println!("{} ({})", user.name, user.id);
            if let Some(email) = &user.email {
                println!("  {email}");
            }
        }
        None => println!("Not logged in"),
    }
}

/// List past orders, most recent as returned by the server.
#[allow(clippy::print_stdout)]
pub async fn orders(ctx: &Context) -> Result<()> {
    let session = ctx.session().await;
    let user = require_user(&session)?;
    let orders = ctx.client()?.order_history(&user.id).await?;

    if orders.is_empty() {
        println!("No orders yet");
        return Ok(());
    }

    for order in &orders {
        let date = order
            .sales_date
            .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
        let amount = order
            .total_amount
            .map_or_else(|| "N/A".to_string(), |a| a.to_string());
        println!(
            "{:<24} {date}  {:<10} {amount}",
            order.label(),
            order.order_status.to_string()
        );
        for line in &order.products {
            println!(
                "    {} x{}",
                line.product.name.as_deref().unwrap_or(line.product.id.as_str()),
                line.quantity.unwrap_or(0)
            );
        }
    }
    Ok(())
}

/// Copy a past order, found by id or invoice number, into the cart.
#[allow(clippy::print_stdout)]
pub async fn reorder(ctx: &Context, order_ref: &str) -> Result<()> {
    let session = ctx.session().await;
    let user = require_user(&session)?;
    let client = ctx.client()?;

    let orders = client.order_history(&user.id).await?;
    let order = orders
        .iter()
        .find(|order| order.id.as_str() == order_ref || order.label() == order_ref)
        .ok_or_else(|| AppError::NotFound(format!("Order {order_ref}")))?;

    let mut cart = ctx.cart().await;
    let summary = services::reorder(&mut cart, order, &client).await;
    let total = cart.total();
    cart.teardown().await;

    println!(
        "Added {} line(s) from {} to the cart (total {total})",
        summary.added,
        order.label()
    );
    for product_id in &summary.skipped {
        println!("  skipped {product_id}: product could not be loaded");
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn credit(ctx: &Context) -> Result<()> {
    let session = ctx.session().await;
    let user = require_user(&session)?;
    let credit = ctx.client()?.user_credit(&user.id).await?;
    println!("Available credit: {credit}");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn wishlist(ctx: &Context) -> Result<()> {
    let session = ctx.session().await;
    let user = require_user(&session)?;
    let products = ctx.client()?.liked_products(&user.id).await?;

    if products.is_empty() {
        println!("Wishlist is empty");
    }
    for product in &products {
        print_product(product);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn toggle_like(ctx: &Context, product_id: &str) -> Result<()> {
    let session = ctx.session().await;
    let user = require_user(&session)?;
    let client = ctx.client()?;
    let product_id = ProductId::new(product_id);

    client.toggle_like(&user.id, &product_id).await?;
    let product = client.get_product(&product_id).await?;
    let state = if product.is_liked { "liked" } else { "unliked" };
    println!("{} {state}", product.name);
    Ok(())
}

/// One catalog product per line: id, name, price and stock.
#[allow(clippy::print_stdout)]
pub fn print_product(product: &CatalogProduct) {
    let variants = if product.is_variant_product() {
        format!(" [{} variant(s)]", product.variants.len())
    } else {
        String::new()
    };
    println!(
        "{:<26} {:<40} {} / ctn {} (x{})  stock {}{variants}",
        product.id.as_str(),
        product.name,
        product.unit_price(),
        product.carton_price(),
        product.rule(),
        product.remaining_stock(),
    );
}
