//! Cache types for catalog API responses.

use fresh_basket_core::CategoryId;

use super::types::{Category, Pack, Product};

/// Cache key for session-scoped catalog data.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    Packs(CategoryId),
    Products(CategoryId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    Packs(Vec<Pack>),
    Products(Vec<Product>),
}
