//! Fresh Basket client library.
//!
//! Storefront-side logic for the Fresh Basket produce subscription service:
//! a REST client for the backend, session persistence, catalog resolution,
//! cost aggregation, the checkout state machine, and wallet operations.
//! All I/O goes through [`api::ApiClient`]; everything above it is either
//! pure ([`pricing`]) or orchestrates the client through narrow seams
//! ([`checkout::CheckoutBackend`], [`wallet::PaymentGateway`]).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod pricing;
pub mod session;
pub mod wallet;

pub use api::ApiClient;
pub use catalog::CatalogResolver;
pub use checkout::{CheckoutOutcome, CheckoutReconciler, CheckoutRequest};
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionProvider};
pub use wallet::{StubGateway, WalletService};
