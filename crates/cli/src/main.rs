//! Fresh Basket CLI - command-line storefront client.
//!
//! # Usage
//!
//! ```bash
//! # Log in
//! fb auth login -e asha@example.com -p secret
//!
//! # Browse the catalog
//! fb catalog categories
//! fb catalog packs "Fruits Pack"
//!
//! # Add a pack and check out against wallet credits
//! fb cart add --pack 3
//! fb checkout --method wallet --time-slot "9 AM - 11 AM"
//!
//! # Wallet balance and credit purchases
//! fb wallet show
//! fb wallet buy-credits --package 2
//! ```
//!
//! # Commands
//!
//! - `auth` - Login, registration, session management
//! - `catalog` - Categories, packs, and products
//! - `cart` - Cart lines and quantities
//! - `custom-pack` - Build a custom pack against the category minimum
//! - `address` - Saved delivery addresses
//! - `wallet` - Balance, ledger, credit purchases
//! - `checkout` - Place an order from the cart
//! - `orders` - Order history

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::Context;
use fresh_basket_client::ClientConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fb")]
#[command(author, version, about = "Fresh Basket storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Login, registration, and session management
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Browse categories, packs, and products
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// Cart lines and quantities
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Build a custom pack from ad-hoc products
    CustomPack {
        #[command(subcommand)]
        action: commands::custom_pack::CustomPackAction,
    },
    /// Saved delivery addresses
    Address {
        #[command(subcommand)]
        action: commands::address::AddressAction,
    },
    /// Wallet balance, ledger, and credit purchases
    Wallet {
        #[command(subcommand)]
        action: commands::wallet::WalletAction,
    },
    /// Place an order from the current cart
    Checkout(commands::checkout::CheckoutArgs),
    /// Order history
    Orders {
        #[command(subcommand)]
        action: commands::orders::OrdersAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = ClientConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fb=info,fresh_basket_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let result = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), commands::CliError> {
    let ctx = Context::new(config)?;

    match cli.command {
        Commands::Auth { action } => commands::auth::run(&ctx, action).await,
        Commands::Catalog { action } => commands::catalog::run(&ctx, action).await,
        Commands::Cart { action } => commands::cart::run(&ctx, action).await,
        Commands::CustomPack { action } => commands::custom_pack::run(&ctx, action).await,
        Commands::Address { action } => commands::address::run(&ctx, action).await,
        Commands::Wallet { action } => commands::wallet::run(&ctx, action).await,
        Commands::Checkout(args) => commands::checkout::run(&ctx, args).await,
        Commands::Orders { action } => commands::orders::run(&ctx, action).await,
    }
}
