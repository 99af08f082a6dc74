//! Saved delivery addresses.
//!
//! # Usage
//!
//! ```bash
//! fb address list
//! fb address add --name "Home" --address "42 Park St, Kochi" --kind home
//! fb address update --id 2 --name "Office" --address "12 MG Road" --kind work --default
//! fb address delete --id 2
//! ```

use clap::Subcommand;
use tracing::info;

use fresh_basket_client::api::types::{CreateAddressRequest, UpdateAddressRequest};
use fresh_basket_core::{AddressId, AddressKind};

use super::{CliError, Context};

#[derive(Subcommand)]
pub enum AddressAction {
    /// List saved addresses
    List,
    /// Save a new address
    Add {
        /// Label for the address
        #[arg(long)]
        name: String,

        /// Free-text delivery address
        #[arg(long)]
        address: String,

        /// Address type (`home`, `work`, `other`)
        #[arg(long, default_value = "home")]
        kind: AddressKind,

        /// Make this the default delivery address
        #[arg(long)]
        default: bool,
    },
    /// Update an existing address
    Update {
        /// Address id (see `fb address list`)
        #[arg(long)]
        id: i64,

        /// Label for the address
        #[arg(long)]
        name: String,

        /// Free-text delivery address
        #[arg(long)]
        address: String,

        /// Address type (`home`, `work`, `other`)
        #[arg(long, default_value = "home")]
        kind: AddressKind,

        /// Make this the default delivery address
        #[arg(long)]
        default: bool,
    },
    /// Delete an address
    Delete {
        /// Address id
        #[arg(long)]
        id: i64,
    },
}

pub async fn run(ctx: &Context, action: AddressAction) -> Result<(), CliError> {
    let session = ctx.require_session()?;
    let user_id = session.user.id;

    match action {
        AddressAction::List => {
            let addresses = ctx.client.addresses(user_id).await?;
            if addresses.is_empty() {
                info!("No saved addresses");
                return Ok(());
            }
            for address in addresses {
                let marker = if address.is_default { " (default)" } else { "" };
                info!(
                    "[{}] {} ({}): {}{marker}",
                    address.id, address.name, address.kind, address.address
                );
            }
        }
        AddressAction::Add {
            name,
            address,
            kind,
            default,
        } => {
            // The first saved address always becomes the default
            let existing = ctx.client.addresses(user_id).await?;
            let is_default = default || existing.is_empty();

            let created = ctx
                .client
                .create_address(&CreateAddressRequest {
                    user_id,
                    kind,
                    name,
                    address,
                    is_default,
                })
                .await?;
            info!("Saved address [{}] {}", created.id, created.name);
        }
        AddressAction::Update {
            id,
            name,
            address,
            kind,
            default,
        } => {
            let updated = ctx
                .client
                .update_address(
                    AddressId::new(id),
                    &UpdateAddressRequest {
                        kind,
                        name,
                        address,
                        is_default: default,
                    },
                )
                .await?;
            info!("Updated address [{}] {}", updated.id, updated.name);
        }
        AddressAction::Delete { id } => {
            ctx.client.delete_address(AddressId::new(id)).await?;
            info!("Deleted address {id}");
        }
    }
    Ok(())
}
