//! Cache types for catalog responses.

use std::sync::Arc;

use holycat_core::ProductId;
use holycat_core::model::Product;

/// Cache key for products.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products {
        search: Option<String>,
        category: Option<String>,
    },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Arc<Vec<Product>>),
}
