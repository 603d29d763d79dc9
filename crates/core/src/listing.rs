//! Admin table filtering and pagination.
//!
//! The backend returns every order and product in one response; the admin
//! tables filter, sort and paginate them in memory.

use std::ops::Range;

use crate::model::{Order, Product};
use crate::types::OrderStatus;

/// Rows per admin table page.
pub const DEFAULT_PER_PAGE: usize = 10;

/// One page of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub current: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub per_page: usize,
}

impl Page {
    /// Clamp `requested` to `1..=max(total_pages, 1)`.
    #[must_use]
    pub fn new(total_items: usize, requested: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total_items.div_ceil(per_page);
        let current = requested.clamp(1, total_pages.max(1));
        Self {
            current,
            total_pages,
            total_items,
            per_page,
        }
    }

    /// Slice bounds of this page within the filtered rows.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        let start = ((self.current - 1) * self.per_page).min(self.total_items);
        let end = (start + self.per_page).min(self.total_items);
        start..end
    }

    /// Borrow this page's rows.
    #[must_use]
    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        rows.get(self.range()).unwrap_or_default()
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.current > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current < self.total_pages
    }

    #[must_use]
    pub const fn prev(&self) -> usize {
        if self.has_prev() { self.current - 1 } else { 1 }
    }

    #[must_use]
    pub const fn next(&self) -> usize {
        if self.has_next() { self.current + 1 } else { self.current }
    }

    /// Every page number, for the pager links.
    #[must_use]
    pub fn numbers(&self) -> Vec<usize> {
        (1..=self.total_pages).collect()
    }
}

/// Newest orders first.
pub fn sort_orders_desc(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.id.cmp(&a.id));
}

/// Newest products first.
pub fn sort_products_desc(products: &mut [Product]) {
    products.sort_by(|a, b| b.id.cmp(&a.id));
}

/// Status part of the orders filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// `SEMUA`: every status.
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    /// Parse the `status` query parameter; anything unknown means all.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse::<OrderStatus>().ok())
            .map_or(Self::All, Self::Only)
    }

    /// The query parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "SEMUA",
            Self::Only(status) => status.as_str(),
        }
    }

    #[must_use]
    pub fn matches(&self, status: OrderStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

/// Filter for the admin orders table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: StatusFilter,
    pub query: String,
}

impl OrderFilter {
    /// Status matches and the query is found in the courier or tracking number.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        if !self.status.matches(order.status) {
            return false;
        }
        let query = self.query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        contains_lower(order.courier.as_deref(), &query)
            || contains_lower(order.tracking_number.as_deref(), &query)
    }

    /// Matching orders, newest first.
    #[must_use]
    pub fn apply(&self, orders: &[Order]) -> Vec<Order> {
        let mut matched: Vec<Order> = orders.iter().filter(|o| self.matches(o)).cloned().collect();
        sort_orders_desc(&mut matched);
        matched
    }
}

/// Filter for the admin products table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub query: String,
}

impl ProductFilter {
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let query = self.query.trim().to_lowercase();
        query.is_empty()
            || product.title.to_lowercase().contains(&query)
            || contains_lower(product.category.as_deref(), &query)
    }

    /// Matching products, newest first.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut matched: Vec<Product> =
            products.iter().filter(|p| self.matches(p)).cloned().collect();
        sort_products_desc(&mut matched);
        matched
    }
}

fn contains_lower(haystack: Option<&str>, needle: &str) -> bool {
    haystack.unwrap_or_default().to_lowercase().contains(needle)
}
