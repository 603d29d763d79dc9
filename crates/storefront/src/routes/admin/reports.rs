//! Admin sales report.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use holycat_core::OrderStatus;
use holycat_core::listing::sort_orders_desc;
use holycat_core::report::{ReportFilter, daily_revenue};
use holycat_core::types::date::wib_date;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use tracing::instrument;

use super::orders::{AdminOrderRow, StatusOption};
use super::{NavLink, nav_links};
use crate::context::PageContext;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Report query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
}

/// One bar of the daily revenue chart.
pub struct RevenueBar {
    pub date: String,
    pub revenue: String,
    /// Bar width relative to the best day, `0..=100`.
    pub percent: u32,
}

/// Report page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/reports.html")]
pub struct ReportsTemplate {
    pub ctx: PageContext,
    pub nav: Vec<NavLink>,
    pub start_date: String,
    pub end_date: String,
    pub statuses: Vec<StatusOption>,
    pub total_orders: u64,
    pub total_revenue: String,
    pub daily: Vec<RevenueBar>,
    pub orders: Vec<AdminOrderRow>,
}

fn revenue_bars(orders: &[holycat_core::model::Order]) -> Vec<RevenueBar> {
    let days = daily_revenue(orders);
    let best = days
        .iter()
        .map(|d| d.revenue.amount())
        .max()
        .unwrap_or_default();

    days.into_iter()
        .map(|day| {
            let percent = if best.is_zero() {
                0
            } else {
                (day.revenue.amount() * rust_decimal::Decimal::ONE_HUNDRED / best)
                    .round()
                    .to_u32()
                    .unwrap_or(0)
            };
            RevenueBar {
                date: day.date,
                revenue: day.revenue.to_string(),
                percent,
            }
        })
        .collect()
}

/// Display the sales report.
#[instrument(skip(state, admin, ctx))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ctx: PageContext,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse> {
    let filter = ReportFilter::from_query(
        wib_date(&Utc::now()),
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        query.status.as_deref(),
    );
    let mut report = state.api().admin_report(&admin.token, &filter).await?;
    sort_orders_desc(&mut report.orders);

    let mut statuses = vec![StatusOption {
        value: "ALL",
        label: "Semua Status".to_string(),
        selected: filter.status.is_none(),
    }];
    statuses.extend(OrderStatus::ALL.iter().map(|s| StatusOption {
        value: s.as_str(),
        label: s.label(),
        selected: filter.status == Some(*s),
    }));

    Ok(ReportsTemplate {
        ctx,
        nav: nav_links("/admin/reports"),
        start_date: filter.start_date.format("%Y-%m-%d").to_string(),
        end_date: filter.end_date.format("%Y-%m-%d").to_string(),
        statuses,
        total_orders: report.summary.total_orders,
        total_revenue: report.summary.total_revenue.to_string(),
        daily: revenue_bars(&report.orders),
        orders: report.orders.iter().map(AdminOrderRow::from).collect(),
    })
}
