//! Command implementations and the shared command context.

pub mod address;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod custom_pack;
pub mod orders;
pub mod wallet;

use thiserror::Error;

use fresh_basket_client::session::SessionError;
use fresh_basket_client::{
    ApiClient, ApiError, ClientConfig, FileSessionStore, Session, SessionProvider,
};
use fresh_basket_core::EmailError;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("{0}")]
    InvalidArgument(String),
}

impl From<fresh_basket_client::ConfigError> for CliError {
    fn from(e: fresh_basket_client::ConfigError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

/// Shared state every command runs against: the API client with any
/// persisted session token already installed, plus the session store.
pub struct Context {
    pub client: ApiClient,
    pub sessions: FileSessionStore,
}

impl Context {
    /// Build the context, restoring a persisted session if one exists.
    pub fn new(config: &ClientConfig) -> Result<Self, CliError> {
        let client = ApiClient::new(config)?;
        let sessions = FileSessionStore::new(config.session_file.clone());

        if let Some(session) = sessions.get_session()? {
            client.set_token(session.token.clone());
        }

        Ok(Self { client, sessions })
    }

    /// The stored session, or `Unauthenticated` if nobody is logged in.
    pub fn require_session(&self) -> Result<Session, CliError> {
        self.sessions
            .get_session()?
            .ok_or(CliError::Api(ApiError::Unauthenticated))
    }
}
