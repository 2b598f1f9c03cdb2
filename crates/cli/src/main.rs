//! POS Storefront CLI - cart, checkout and account from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in as a customer
//! pos-cli login --id 67f5a28e310ad54d5b2d9c65 --name "Ayesha"
//!
//! # Browse and fill the cart
//! pos-cli companies
//! pos-cli products <brand-id>
//! pos-cli cart add <product-id> --variant <variant-id>
//! pos-cli cart inc <line-id> --carton
//!
//! # Place the order
//! pos-cli checkout --payment-method card
//! ```
//!
//! # Commands
//!
//! - `cart` - Show and edit the persisted cart
//! - `checkout` - Submit the cart as a sale
//! - `login`, `logout`, `whoami` - Manage the logged-in user
//! - `orders`, `reorder`, `credit` - Order history and store credit
//! - `wishlist` - Liked products
//! - `companies`, `brands`, `catalog`, `products`, `search` - Browse the catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pos_storefront_core::PaymentMethod;

mod commands;

#[derive(Parser)]
#[command(name = "pos-cli")]
#[command(author, version, about = "POS storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Submit the cart as a sale for the logged-in user
    Checkout {
        /// Payment method (`cash`, `card`, `bank_transfer`)
        #[arg(short, long, default_value = "cash")]
        payment_method: PaymentMethod,
    },
    /// Log in as a customer
    Login {
        /// User document id
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Log out the current user
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List past orders
    Orders,
    /// Copy a past order into the cart
    Reorder {
        /// Order id or invoice number
        order: String,
    },
    /// Show remaining store credit
    Credit,
    /// Liked products
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// List companies
    Companies,
    /// List the brands of a company
    Brands {
        /// Company id
        company_id: String,
    },
    /// Show a company's products grouped by brand
    Catalog {
        /// Company id
        company_id: String,
    },
    /// List products, optionally of one brand
    Products {
        /// Brand id
        brand_id: Option<String>,
    },
    /// Search products by name
    Search {
        /// Text to search for
        query: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart lines
    Show,
    /// Show the cart total
    Total,
    /// Add a product, or one more piece of it
    Add {
        /// Product id
        product_id: String,

        /// Variant id, required for variant products
        #[arg(short, long)]
        variant: Option<String>,
    },
    /// Add one piece (or carton) to a line
    Inc {
        /// Line id as shown by `cart show`
        line_id: String,

        /// Change cartons instead of pieces
        #[arg(short, long)]
        carton: bool,
    },
    /// Remove one piece (or carton) from a line
    Dec {
        /// Line id as shown by `cart show`
        line_id: String,

        /// Change cartons instead of pieces
        #[arg(short, long)]
        carton: bool,
    },
    /// Set both counts of a line
    Set {
        /// Line id as shown by `cart show`
        line_id: String,

        #[arg(short, long, default_value_t = 0)]
        pieces: u32,

        #[arg(short, long, default_value_t = 0)]
        cartons: u32,
    },
    /// Remove a line
    Remove {
        /// Line id as shown by `cart show`
        line_id: String,
    },
    /// Remove every line
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// List liked products
    List,
    /// Like a product, or unlike it if already liked
    Toggle {
        /// Product id
        product_id: String,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output stays pipeable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pos_storefront=info,pos_storefront_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!(detail = %e, "Command failed: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> pos_storefront::Result<()> {
    let ctx = commands::Context::load().await?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx).await,
            CartAction::Total => commands::cart::total(&ctx).await,
            CartAction::Add {
                product_id,
                variant,
            } => commands::cart::add(&ctx, &product_id, variant.as_deref()).await?,
            CartAction::Inc { line_id, carton } => {
                commands::cart::step(&ctx, &line_id, carton, true).await?;
            }
            CartAction::Dec { line_id, carton } => {
                commands::cart::step(&ctx, &line_id, carton, false).await?;
            }
            CartAction::Set {
                line_id,
                pieces,
                cartons,
            } => commands::cart::set(&ctx, &line_id, pieces, cartons).await?,
            CartAction::Remove { line_id } => commands::cart::remove(&ctx, &line_id).await?,
            CartAction::Clear => commands::cart::clear(&ctx).await,
        },
        Commands::Checkout { payment_method } => {
            commands::cart::checkout(&ctx, payment_method).await?;
        }
        Commands::Login { id, name, email } => {
            commands::account::login(&ctx, id, name, email).await?;
        }
        Commands::Logout => commands::account::logout(&ctx).await?,
        Commands::Whoami => commands::account::whoami(&ctx).await,
        Commands::Orders => commands::account::orders(&ctx).await?,
        Commands::Reorder { order } => commands::account::reorder(&ctx, &order).await?,
        Commands::Credit => commands::account::credit(&ctx).await?,
        Commands::Wishlist { action } => match action {
            WishlistAction::List => commands::account::wishlist(&ctx).await?,
            WishlistAction::Toggle { product_id } => {
                commands::account::toggle_like(&ctx, &product_id).await?;
            }
        },
        Commands::Companies => commands::catalog::companies(&ctx).await?,
        Commands::Brands { company_id } => commands::catalog::brands(&ctx, &company_id).await?,
        Commands::Catalog { company_id } => {
            commands::catalog::company_catalog(&ctx, &company_id).await?;
        }
        Commands::Products { brand_id } => {
            commands::catalog::products(&ctx, brand_id.as_deref()).await?;
        }
        Commands::Search { query } => commands::catalog::search(&ctx, &query).await?,
    }
    Ok(())
}
