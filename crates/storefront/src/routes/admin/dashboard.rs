//! Admin dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use holycat_core::listing::sort_orders_desc;
use tracing::instrument;

use super::orders::AdminOrderRow;
use super::{NavLink, nav_links};
use crate::context::PageContext;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// How many recent orders the dashboard lists.
const RECENT_ORDERS: usize = 5;

/// One stat card.
pub struct StatCard {
    pub label: &'static str,
    pub value: String,
    pub href: &'static str,
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub nav: Vec<NavLink>,
    pub stats: Vec<StatCard>,
    pub recent_orders: Vec<AdminOrderRow>,
}

/// Display the dashboard.
#[instrument(skip(state, admin, ctx), fields(admin_id = %admin.user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let mut stats = state.api().admin_stats(&admin.token).await?;
    sort_orders_desc(&mut stats.recent_orders);

    Ok(DashboardTemplate {
        ctx,
        nav: nav_links("/admin"),
        stats: vec![
            StatCard {
                label: "Total Pendapatan",
                value: stats.total_revenue.to_string(),
                href: "/admin/reports",
            },
            StatCard {
                label: "Total Pesanan",
                value: stats.total_orders.to_string(),
                href: "/admin/orders",
            },
            StatCard {
                label: "Total Produk",
                value: stats.total_products.to_string(),
                href: "/admin/products",
            },
            StatCard {
                label: "Total Pengguna",
                value: stats.total_users.to_string(),
                href: "/admin",
            },
        ],
        recent_orders: stats
            .recent_orders
            .iter()
            .take(RECENT_ORDERS)
            .map(AdminOrderRow::from)
            .collect(),
    })
}
