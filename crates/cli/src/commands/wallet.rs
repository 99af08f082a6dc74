//! Wallet balance, transaction ledger, and credit purchases.
//!
//! # Usage
//!
//! ```bash
//! fb wallet show
//! fb wallet buy-credits --package 2
//! ```

use clap::Subcommand;
use tracing::info;

use fresh_basket_client::{StubGateway, WalletService};
use fresh_basket_core::CreditPackageId;

use super::{CliError, Context};

#[derive(Subcommand)]
pub enum WalletAction {
    /// Show balance, ledger, and purchasable credit packages
    Show,
    /// Buy a credit package through the payment gateway
    BuyCredits {
        /// Credit package id (see `fb wallet show`)
        #[arg(long)]
        package: i64,
    },
}

pub async fn run(ctx: &Context, action: WalletAction) -> Result<(), CliError> {
    ctx.require_session()?;
    let service = WalletService::new(ctx.client.clone());

    match action {
        WalletAction::Show => {
            let overview = service.overview().await?;
            info!("Balance: {}", overview.wallet.balance);
            info!(
                "Earned {} / Spent {}",
                overview.wallet.total_credits_earned, overview.wallet.total_credits_spent
            );

            if !overview.transactions.is_empty() {
                info!("Recent transactions:");
                for tx in &overview.transactions {
                    let sign = if tx.kind.is_credit() { "+" } else { "-" };
                    let note = tx.description.as_deref().unwrap_or("");
                    info!("  {sign}{} {note}", tx.amount);
                }
            }

            info!("Credit packages:");
            for package in &overview.packages {
                info!(
                    "  [{}] {}: {} credits for {}",
                    package.id, package.name, package.credits, package.price
                );
            }
        }
        WalletAction::BuyCredits { package } => {
            let overview = service.overview().await?;
            let package = overview
                .packages
                .iter()
                .find(|p| p.id == CreditPackageId::new(package))
                .ok_or_else(|| {
                    CliError::InvalidArgument(format!("no credit package with id {package}"))
                })?;

            let credits = service.buy_credits(package, &StubGateway).await?;
            info!("Added {credits} to the wallet");
        }
    }
    Ok(())
}
