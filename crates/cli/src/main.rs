//! Relux CLI - Terminal front end for the Relux watch shop.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the session is kept between runs)
//! relux login -e mc@relux.ph -p secret
//!
//! # Browse and search
//! relux shop -q daytona -b Rolex -s price_desc
//!
//! # Manage the cart and check out
//! relux cart add 42 --qty 1
//! relux checkout --name "Maria Clara" --phone 0917 --address "1 Ayala Ave" \
//!     --city Makati --postal-code 1226 --payment gcash
//!
//! # Interactive session
//! relux shell
//! ```
//!
//! # Commands
//!
//! - `login`, `signup`, `logout`, `whoami` - Account
//! - `shop` - Browse the collection
//! - `cart` - Show and change the cart
//! - `checkout` - Place an order
//! - `orders` - Order history
//! - `open` - Resolve a hash fragment to a page
//! - `shell` - Interactive session

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use relux_core::{CartItemId, OrderId, PaymentMethod, ProductId, SortOrder};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "relux")]
#[command(author, version, about = "Relux luxury watch shop")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Signup {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 6 characters)
        #[arg(short, long)]
        password: String,

        /// Password again
        #[arg(short = 'c', long)]
        confirm: String,

        /// Agree to the terms and conditions
        #[arg(long)]
        agree_terms: bool,
    },
    /// Sign out and forget the saved session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Browse the collection
    Shop {
        /// Search text
        #[arg(short, long, default_value = "")]
        query: String,

        /// Brand filter
        #[arg(short, long, default_value = "")]
        brand: String,

        /// Sort order (`price_asc`, `price_desc`, `newest`)
        #[arg(short, long)]
        sort: Option<SortOrder>,

        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Place an order for everything in the cart
    Checkout {
        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        address: String,

        #[arg(long)]
        city: String,

        #[arg(long)]
        postal_code: String,

        /// Delivery notes
        #[arg(long, default_value = "")]
        notes: String,

        /// Payment method (`cod`, `card`, `gcash`, `paymaya`)
        #[arg(long, default_value = "cod")]
        payment: PaymentMethod,
    },
    /// Show order history, or one order
    Orders {
        /// Order ID
        id: Option<OrderId>,
    },
    /// Resolve a hash fragment (`#shop`, `#about`, ...) to a page
    Open {
        /// Hash fragment
        hash: String,
    },
    /// Interactive session reading commands from stdin
    Shell,
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product
    Add {
        /// Product ID
        product: ProductId,

        /// Quantity
        #[arg(long, default_value_t = 1)]
        qty: u32,
    },
    /// Set the quantity of a line
    Set {
        /// Cart item ID
        item: CartItemId,

        /// New quantity (at least 1)
        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },
    /// Remove a line
    Remove {
        /// Cart item ID
        item: CartItemId,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        #[allow(clippy::print_stderr)]
        {
            eprintln!("error: {e}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = relux_storefront::StorefrontConfig::from_env()?;
    let _sentry_guard = relux_storefront::telemetry::init(&config);

    match cli.command {
        Commands::Login { email, password } => {
            commands::account::login(&config, email, password).await?;
        }
        Commands::Signup {
            name,
            email,
            password,
            confirm,
            agree_terms,
        } => {
            commands::account::signup(&config, name, email, password, confirm, agree_terms)
                .await?;
        }
        Commands::Logout => commands::account::logout(&config).await?,
        Commands::Whoami => commands::account::whoami(&config).await?,
        Commands::Shop {
            query,
            brand,
            sort,
            page,
        } => {
            let filters = relux_core::SearchFilters {
                query,
                brand,
                sort: sort.unwrap_or_default(),
            };
            commands::shop::browse(&config, filters, page).await?;
        }
        Commands::Cart { action } => match action {
            None => commands::cart::show(&config).await?,
            Some(CartAction::Add { product, qty }) => {
                commands::cart::add(&config, product, qty).await?;
            }
            Some(CartAction::Set { item, qty }) => commands::cart::set(&config, item, qty).await?,
            Some(CartAction::Remove { item }) => commands::cart::remove(&config, item).await?,
        },
        Commands::Checkout {
            name,
            phone,
            address,
            city,
            postal_code,
            notes,
            payment,
        } => {
            let form = relux_core::DeliveryForm {
                delivery_name: name,
                delivery_phone: phone,
                delivery_address: address,
                delivery_city: city,
                delivery_postal_code: postal_code,
                delivery_notes: notes,
                payment_method: payment,
            };
            commands::cart::checkout(&config, form).await?;
        }
        Commands::Orders { id } => commands::orders::show(&config, id).await?,
        Commands::Open { hash } => commands::shop::open(&config, &hash).await?,
        Commands::Shell => commands::shell::run(&config).await?,
    }
    Ok(())
}
