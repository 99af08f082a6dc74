//! Login, registration, and session management.
//!
//! # Usage
//!
//! ```bash
//! fb auth login -e asha@example.com -p secret
//! fb auth register -n "Asha" -e asha@example.com --phone 9876543210 -p secret
//! fb auth whoami
//! fb auth update-profile --phone 9999999999
//! fb auth logout
//! ```

use clap::Subcommand;
use tracing::info;

use fresh_basket_client::api::types::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use fresh_basket_client::{Session, SessionProvider};
use fresh_basket_core::Email;

use super::{CliError, Context};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Log in with email and password
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create a new account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Phone number
        #[arg(long)]
        phone: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Clear the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Update profile fields
    UpdateProfile {
        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// New phone number
        #[arg(long)]
        phone: Option<String>,
    },
}

pub async fn run(ctx: &Context, action: AuthAction) -> Result<(), CliError> {
    match action {
        AuthAction::Login { email, password } => {
            let email = Email::parse(&email)?;
            let response = ctx.client.login(&LoginRequest { email, password }).await?;
            ctx.sessions
                .set_session(&Session::new(response.token, response.user.clone()))?;
            info!("Logged in as {} <{}>", response.user.name, response.user.email);
        }
        AuthAction::Register {
            name,
            email,
            phone,
            password,
        } => {
            let email = Email::parse(&email)?;
            let response = ctx
                .client
                .register(&RegisterRequest {
                    name,
                    email,
                    phone,
                    password,
                })
                .await?;
            ctx.sessions
                .set_session(&Session::new(response.token, response.user.clone()))?;
            info!("Account created for {}", response.user.email);
        }
        AuthAction::Logout => {
            ctx.sessions.clear_session()?;
            ctx.client.clear_token();
            info!("Logged out");
        }
        AuthAction::Whoami => {
            let session = ctx.require_session()?;
            let user = &session.user;
            info!("{} <{}>", user.name, user.email);
            if let Some(phone) = &user.phone {
                info!("Phone: {phone}");
            }
        }
        AuthAction::UpdateProfile { name, phone } => {
            if name.is_none() && phone.is_none() {
                return Err(CliError::InvalidArgument(
                    "nothing to update; pass --name and/or --phone".to_owned(),
                ));
            }
            let session = ctx.require_session()?;
            let user = ctx
                .client
                .update_profile(session.user.id, &UpdateProfileRequest { name, phone })
                .await?;
            // Keep the stored profile in sync with the backend
            ctx.sessions
                .set_session(&Session { token: session.token, user: user.clone() })?;
            info!("Profile updated for {}", user.email);
        }
    }
    Ok(())
}
