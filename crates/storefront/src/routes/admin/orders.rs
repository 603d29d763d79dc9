//! Admin orders table and status changes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use holycat_core::listing::{DEFAULT_PER_PAGE, OrderFilter, Page, StatusFilter};
use holycat_core::model::Order;
use holycat_core::order::StatusUpdate;
use holycat_core::types::date::format_long;
use holycat_core::{OrderId, OrderStatus, PaymentMethod};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{NavLink, Pager, nav_links};
use crate::context::PageContext;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::middleware::auth::local_redirect;
use crate::models::Flash;
use crate::routes::flash_api_failure;
use crate::state::AppState;

/// Orders table query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
    pub q: Option<String>,
    pub page: Option<usize>,
}

/// Status change form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
    /// Table URL to return to, keeping filter and page.
    pub back: Option<String>,
}

/// One order row in admin tables.
pub struct AdminOrderRow {
    pub id: OrderId,
    pub created_at: String,
    pub customer: String,
    pub email: String,
    pub total: String,
    pub status: &'static str,
    pub status_label: String,
    pub badge_class: &'static str,
    pub payment_label: &'static str,
    pub courier: String,
    pub tracking_number: String,
    pub proof_url: Option<String>,
    pub item_summary: String,
}

impl From<&Order> for AdminOrderRow {
    fn from(order: &Order) -> Self {
        let item_summary = order
            .items
            .iter()
            .map(|item| format!("{} x{}", item.title(), item.quantity))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            id: order.id,
            created_at: format_long(&order.created_at),
            customer: order.customer_name().to_string(),
            email: order
                .user
                .as_ref()
                .and_then(|u| u.email.clone())
                .unwrap_or_default(),
            total: order.total.to_string(),
            status: order.status.as_str(),
            status_label: order.status.label(),
            badge_class: order.status.badge_class(),
            payment_label: PaymentMethod::label_or_unset(order.payment_method),
            courier: order.courier.clone().unwrap_or_default(),
            tracking_number: order.tracking_number.clone().unwrap_or_default(),
            proof_url: order
                .payment_proof_url
                .clone()
                .filter(|url| !url.is_empty()),
            item_summary,
        }
    }
}

/// Status filter or picker option.
pub struct StatusOption {
    pub value: &'static str,
    pub label: String,
    pub selected: bool,
}

/// Admin orders page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct AdminOrdersTemplate {
    pub ctx: PageContext,
    pub nav: Vec<NavLink>,
    pub orders: Vec<AdminOrderRow>,
    pub status_filters: Vec<StatusOption>,
    pub statuses: Vec<OrderStatus>,
    pub query: String,
    pub back: String,
    pub pager: Pager,
}

impl OrdersQuery {
    fn filter(&self) -> OrderFilter {
        OrderFilter {
            status: StatusFilter::parse(self.status.as_deref()),
            query: self.q.clone().unwrap_or_default(),
        }
    }
}

/// Table URL for a filter, without the page parameter.
fn table_url(filter: &OrderFilter) -> String {
    format!(
        "/admin/orders?status={}&q={}",
        filter.status.as_str(),
        urlencoding::encode(filter.query.trim())
    )
}

/// Display the orders table.
#[instrument(skip(state, admin, ctx))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ctx: PageContext,
    Query(query): Query<OrdersQuery>,
) -> Result<impl IntoResponse> {
    let orders = state.api().admin_orders(&admin.token).await?;

    let filter = query.filter();
    let matched = filter.apply(&orders);
    let page = Page::new(matched.len(), query.page.unwrap_or(1), DEFAULT_PER_PAGE);
    let base = table_url(&filter);

    let mut status_filters = vec![StatusOption {
        value: StatusFilter::All.as_str(),
        label: "Semua Status".to_string(),
        selected: filter.status == StatusFilter::All,
    }];
    status_filters.extend(OrderStatus::ALL.iter().map(|s| StatusOption {
        value: s.as_str(),
        label: s.label(),
        selected: filter.status == StatusFilter::Only(*s),
    }));

    Ok(AdminOrdersTemplate {
        ctx,
        nav: nav_links("/admin/orders"),
        orders: page.slice(&matched).iter().map(AdminOrderRow::from).collect(),
        status_filters,
        statuses: OrderStatus::ALL.to_vec(),
        query: filter.query.clone(),
        back: format!("{base}&page={}", page.current),
        pager: Pager::new(&page, &base),
    })
}

/// Change an order's status.
#[instrument(skip(state, admin, session, form), fields(order_id = %id, status = %form.status))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let back = back_url(form.back.as_deref());

    let Ok(status) = form.status.parse::<OrderStatus>() else {
        Flash::error("Gagal", "Status tidak dikenal.").push(&session).await;
        return Ok(Redirect::to(&back).into_response());
    };

    let update = match StatusUpdate::new(
        status,
        form.courier.as_deref(),
        form.tracking_number.as_deref(),
    ) {
        Ok(update) => update,
        Err(e) => {
            Flash::warning("Data Belum Lengkap", e.to_string())
                .push(&session)
                .await;
            return Ok(Redirect::to(&back).into_response());
        }
    };

    match state
        .api()
        .admin_update_status(&admin.token, id, &update)
        .await
    {
        Ok(()) => {
            tracing::info!(order_id = %id, status = %status, "order status changed");
            add_breadcrumb(
                "admin",
                "Changed order status",
                Some(&[("order_id", id.to_string().as_str()), ("status", status.as_str())]),
            );
            Flash::success(
                "Berhasil!",
                format!("Status pesanan #{id} diubah menjadi {}.", status.label()),
            )
            .push(&session)
            .await;
        }
        Err(e) => {
            flash_api_failure(&session, e, "Gagal", "Gagal memperbarui status pesanan.").await?;
        }
    }

    Ok(Redirect::to(&back).into_response())
}

/// Only admin table URLs are accepted as return targets.
fn back_url(raw: Option<&str>) -> String {
    let target = local_redirect(raw);
    if target.starts_with("/admin/orders") {
        target.to_string()
    } else {
        "/admin/orders".to_string()
    }
}
