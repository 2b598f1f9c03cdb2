//! Catalog browsing commands.

use pos_storefront::Result;
use pos_storefront_core::{BrandId, CompanyId};

use super::Context;
use super::account::print_product;

#[allow(clippy::print_stdout)]
pub async fn companies(ctx: &Context) -> Result<()> {
    for company in ctx.client()?.list_companies().await? {
        println!("{:<26} {}", company.id.as_str(), company.name);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn brands(ctx: &Context, company_id: &str) -> Result<()> {
    let brands = ctx
        .client()?
        .list_brands(&CompanyId::new(company_id))
        .await?;
    for brand in brands {
        println!("{:<26} {}", brand.id.as_str(), brand.name);
    }
    Ok(())
}

/// Products grouped under their brand headings.
#[allow(clippy::print_stdout)]
pub async fn company_catalog(ctx: &Context, company_id: &str) -> Result<()> {
    let catalog = ctx
        .client()?
        .company_catalog(&CompanyId::new(company_id))
        .await?;

    for section in &catalog.brands {
        println!("{} ({})", section.name, section.id.as_str());
        section.products.iter().for_each(print_product);
        println!();
    }

    let liked = catalog.liked_products().count();
    if liked > 0 {
        println!("{liked} liked product(s)");
    }
    Ok(())
}

/// Products of one brand, or the default listing.
#[allow(clippy::print_stdout)]
pub async fn products(ctx: &Context, brand_id: Option<&str>) -> Result<()> {
    let client = ctx.client()?;
    let products = match brand_id {
        Some(brand_id) => client.brand_products(&BrandId::new(brand_id)).await?,
        None => client.list_products().await?,
    };
    if products.is_empty() {
        println!("No products");
    }
    products.iter().for_each(print_product);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn search(ctx: &Context, query: &str) -> Result<()> {
    let products = ctx.client()?.search_products(query).await?;
    if products.is_empty() {
        println!("No products match '{query}'");
    }
    products.iter().for_each(print_product);
    Ok(())
}
