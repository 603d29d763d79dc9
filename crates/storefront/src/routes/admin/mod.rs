//! Admin console route handlers.
//!
//! Every handler takes [`RequireAdmin`](crate::middleware::RequireAdmin);
//! non-admin users get a 403 page and anonymous visitors are sent to login.

pub mod dashboard;
pub mod orders;
pub mod products;
pub mod reports;

use axum::{
    Router,
    routing::{get, post},
};
use holycat_core::listing::Page;

use crate::state::AppState;

/// Create the admin routes router (nested at `/admin`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/orders", get(orders::index))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/products", get(products::index).post(products::create))
        .route("/products/new", get(products::new_form))
        .route("/products/{id}", post(products::update))
        .route("/products/{id}/edit", get(products::edit_form))
        .route("/products/{id}/delete", post(products::delete))
        .route("/reports", get(reports::index))
}

/// Admin sidebar entry.
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Sidebar links with `current` highlighted.
#[must_use]
pub fn nav_links(current: &str) -> Vec<NavLink> {
    [
        ("/admin", "Dashboard"),
        ("/admin/orders", "Pesanan"),
        ("/admin/products", "Produk"),
        ("/admin/reports", "Laporan"),
    ]
    .into_iter()
    .map(|(href, label)| NavLink {
        href,
        label,
        active: href == current,
    })
    .collect()
}

/// One pager link.
pub struct PageLink {
    pub number: usize,
    pub href: String,
    pub current: bool,
}

/// Pager markup data for a table page.
pub struct Pager {
    pub links: Vec<PageLink>,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
    pub total_items: usize,
}

impl Pager {
    /// Build pager links. `base` is the table URL with its filter query
    /// already applied (`/admin/orders?status=SEMUA&q=`).
    #[must_use]
    pub fn new(page: &Page, base: &str) -> Self {
        let href = |n: usize| format!("{base}&page={n}");
        Self {
            links: page
                .numbers()
                .into_iter()
                .map(|number| PageLink {
                    number,
                    href: href(number),
                    current: number == page.current,
                })
                .collect(),
            prev_href: page.has_prev().then(|| href(page.prev())),
            next_href: page.has_next().then(|| href(page.next())),
            total_items: page.total_items,
        }
    }

    /// Whether more than one page exists.
    #[must_use]
    pub fn is_paged(&self) -> bool {
        self.links.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pager_links_keep_filter_query() {
        let page = Page::new(25, 2, 10);
        let pager = Pager::new(&page, "/admin/orders?status=Dikirim&q=jne");

        assert_eq!(pager.links.len(), 3);
        assert!(pager.links.get(1).is_some_and(|l| l.current));
        assert_eq!(
            pager.prev_href.as_deref(),
            Some("/admin/orders?status=Dikirim&q=jne&page=1")
        );
        assert_eq!(
            pager.next_href.as_deref(),
            Some("/admin/orders?status=Dikirim&q=jne&page=3")
        );
        assert!(pager.is_paged());
    }

    #[test]
    fn test_single_page_has_no_neighbours() {
        let pager = Pager::new(&Page::new(4, 1, 10), "/admin/products?q=");
        assert!(pager.prev_href.is_none());
        assert!(pager.next_href.is_none());
        assert!(!pager.is_paged());
    }

    #[test]
    fn test_nav_marks_current_section() {
        let links = nav_links("/admin/products");
        let active: Vec<_> = links.iter().filter(|l| l.active).map(|l| l.label).collect();
        assert_eq!(active, ["Produk"]);
    }
}
