//! Core type definitions.
//!
//! Newtype wrappers that prevent mixing up semantically different values:
//! IDs of different entities, monetary amounts, email addresses, and the
//! closed enums the backend exchanges with the client.

mod email;
mod id;
pub mod money;
mod status;

pub use email::{Email, EmailError};
pub use id::{
    AddressId, CartItemId, CategoryId, CreditPackageId, OrderId, PackId, PackTypeId, ProductId,
    TransactionId, UserId,
};
pub use money::Money;
pub use status::{AddressKind, OrderStatus, PackDuration, PaymentMethod, TransactionKind};
