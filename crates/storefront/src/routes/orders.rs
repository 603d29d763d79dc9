//! Customer order route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use holycat_core::OrderId;
use holycat_core::PaymentMethod;
use holycat_core::listing::sort_orders_desc;
use holycat_core::model::Order;
use holycat_core::order::OrderActions;
use holycat_core::types::date::{format_long, format_long_opt};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::flash_api_failure;
use crate::api::{ApiError, ProofUpload};
use crate::context::PageContext;
use crate::error::{AppError, ErrorTemplate, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::middleware::auth::local_redirect;
use crate::models::Flash;
use crate::state::AppState;

/// Largest accepted payment proof.
pub const MAX_PROOF_BYTES: usize = 5 * 1024 * 1024;

/// Accepted payment proof image types.
const PROOF_CONTENT_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/gif"];

// =============================================================================
// View Types
// =============================================================================

/// One order in the history list.
pub struct OrderRow {
    pub id: OrderId,
    pub created_at: String,
    pub status_label: String,
    pub badge_class: &'static str,
    pub payment_label: &'static str,
    pub total: String,
    pub item_count: usize,
    pub first_item: String,
    pub can_mark_received: bool,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            created_at: format_long(&order.created_at),
            status_label: order.status.label(),
            badge_class: order.status.badge_class(),
            payment_label: PaymentMethod::label_or_unset(order.payment_method),
            total: order.total.to_string(),
            item_count: order.items.len(),
            first_item: order
                .items
                .first()
                .map(|item| item.title().to_string())
                .unwrap_or_default(),
            can_mark_received: OrderActions::of(order).can_mark_received,
        }
    }
}

/// One line on the order detail page.
pub struct OrderLine {
    pub title: String,
    pub image: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub ctx: PageContext,
    pub orders: Vec<OrderRow>,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub ctx: PageContext,
    pub order: OrderRow,
    pub lines: Vec<OrderLine>,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub recipient_address: String,
    pub recipient_city: String,
    pub courier: String,
    pub tracking_number: String,
    pub shipped_at: String,
    pub proof_url: Option<String>,
    pub actions: OrderActions,
    pub max_proof_mb: usize,
}

// =============================================================================
// Form Types
// =============================================================================

/// Mark-received form data.
#[derive(Debug, Deserialize)]
pub struct ReceiveForm {
    pub next: Option<String>,
}

/// Why a payment proof upload was refused before reaching the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProofError {
    #[error("Pilih file gambar bukti pembayaran.")]
    Missing,
    #[error("Ukuran file maksimal adalah 5MB.")]
    TooLarge,
    #[error("Format file harus PNG, JPG, atau GIF.")]
    UnsupportedType,
}

impl ProofError {
    const fn title(self) -> &'static str {
        match self {
            Self::TooLarge => "File Terlalu Besar",
            Self::Missing | Self::UnsupportedType => "Error",
        }
    }
}

/// Check a proof upload's type and size.
pub fn validate_proof(content_type: &str, len: usize) -> std::result::Result<(), ProofError> {
    if len == 0 {
        return Err(ProofError::Missing);
    }
    if len > MAX_PROOF_BYTES {
        return Err(ProofError::TooLarge);
    }
    if !PROOF_CONTENT_TYPES.contains(&content_type) {
        return Err(ProofError::UnsupportedType);
    }
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the order history.
#[instrument(skip(state, signed_in, ctx))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    ctx: PageContext,
) -> Result<Response> {
    let mut orders = match state.api().list_orders(&signed_in.token).await {
        Ok(orders) => orders,
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::error!(error = %e, "failed to load order history");
            return Ok(ErrorTemplate::page(
                StatusCode::BAD_GATEWAY,
                "Gagal",
                "Gagal memuat riwayat pesanan.",
            ));
        }
    };
    sort_orders_desc(&mut orders);

    Ok(OrdersIndexTemplate {
        ctx,
        orders: orders.iter().map(OrderRow::from).collect(),
    }
    .into_response())
}

/// Display one order with its available actions.
#[instrument(skip(state, signed_in, ctx), fields(order_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    ctx: PageContext,
    Path(id): Path<OrderId>,
) -> Result<Response> {
    let order = match state.api().get_order(&signed_in.token, id).await {
        Ok(order) => order,
        Err(ApiError::NotFound(_)) => {
            return Err(AppError::NotFound("Pesanan tidak ditemukan.".to_string()));
        }
        Err(ApiError::Forbidden(_)) => {
            return Err(AppError::Forbidden(
                "Anda tidak memiliki akses ke pesanan ini.".to_string(),
            ));
        }
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::error!(error = %e, "failed to load order");
            return Ok(ErrorTemplate::page(
                StatusCode::BAD_GATEWAY,
                "Gagal",
                "Gagal memuat detail pesanan.",
            ));
        }
    };

    let user = order.user.clone().unwrap_or_default();
    let template = OrderShowTemplate {
        ctx,
        lines: order
            .items
            .iter()
            .map(|item| OrderLine {
                title: item.title().to_string(),
                image: item.image_url().to_string(),
                quantity: item.quantity,
                unit_price: item.price.to_string(),
                line_total: item.line_total().to_string(),
            })
            .collect(),
        recipient_name: order.customer_name().to_string(),
        recipient_phone: user.phone.unwrap_or_default(),
        recipient_address: user.address.unwrap_or_default(),
        recipient_city: user.city.unwrap_or_default(),
        courier: order.courier.clone().unwrap_or_default(),
        tracking_number: order.tracking_number.clone().unwrap_or_default(),
        shipped_at: format_long_opt(order.shipped_at.as_ref()),
        proof_url: order.payment_proof_url.clone().filter(|u| !u.is_empty()),
        actions: OrderActions::of(&order),
        max_proof_mb: MAX_PROOF_BYTES / (1024 * 1024),
        order: OrderRow::from(&order),
    };

    Ok(template.into_response())
}

/// Confirm an order arrived.
#[instrument(skip(state, signed_in, session, form), fields(order_id = %id))]
pub async fn receive(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    session: Session,
    Path(id): Path<OrderId>,
    Form(form): Form<ReceiveForm>,
) -> Result<Response> {
    match state.api().receive_order(&signed_in.token, id).await {
        Ok(()) => {
            tracing::info!("order received");
            Flash::success("Terima Kasih!", "Pesanan telah diselesaikan.")
                .push(&session)
                .await;
        }
        Err(e) => {
            flash_api_failure(&session, e, "Gagal", "Terjadi kesalahan saat update status.")
                .await?;
        }
    }

    let next = form.next.as_deref().or(Some("/orders"));
    Ok(Redirect::to(local_redirect(next)).into_response())
}

/// Hand the order off to the payment gateway.
#[instrument(skip(state, signed_in, session), fields(order_id = %id))]
pub async fn pay(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    session: Session,
    Path(id): Path<OrderId>,
) -> Result<Response> {
    let back = format!("/order/{id}");

    match state.api().create_payment(&signed_in.token, id).await {
        Ok(payment) => {
            if let Some(target) = payment.redirect_url.as_deref().filter(|u| is_gateway_url(u)) {
                tracing::info!("redirecting to payment gateway");
                return Ok(Redirect::to(target).into_response());
            }
            tracing::warn!("payment session has no usable redirect url");
            Flash::error("Error", "Gagal mendapatkan token pembayaran")
                .push(&session)
                .await;
        }
        Err(e) => {
            flash_api_failure(&session, e, "Error", "Gagal memulai pembayaran.").await?;
        }
    }

    Ok(Redirect::to(&back).into_response())
}

fn is_gateway_url(raw: &str) -> bool {
    url::Url::parse(raw).is_ok_and(|u| matches!(u.scheme(), "https" | "http"))
}

/// Cancel an order.
#[instrument(skip(state, signed_in, session), fields(order_id = %id))]
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    session: Session,
    Path(id): Path<OrderId>,
) -> Result<Response> {
    match state.api().cancel_order(&signed_in.token, id).await {
        Ok(()) => {
            tracing::info!("order cancelled");
            Flash::success("Pesanan Dibatalkan", "Pesanan Anda telah berhasil dibatalkan.")
                .push(&session)
                .await;
        }
        Err(e) => {
            flash_api_failure(&session, e, "Gagal", "Gagal membatalkan pesanan.").await?;
        }
    }

    Ok(Redirect::to(&format!("/order/{id}")).into_response())
}

/// Upload a bank transfer receipt.
#[instrument(skip(state, signed_in, session, multipart), fields(order_id = %id))]
pub async fn upload_proof(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    session: Session,
    Path(id): Path<OrderId>,
    multipart: Multipart,
) -> Result<Response> {
    let back = format!("/order/{id}");

    let upload = match read_proof(multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            Flash::error(e.title(), e.to_string()).push(&session).await;
            return Ok(Redirect::to(&back).into_response());
        }
    };

    match state
        .api()
        .submit_payment_proof(&signed_in.token, id, upload)
        .await
    {
        Ok(()) => {
            tracing::info!("payment proof uploaded");
            Flash::success("Berhasil", "Bukti pembayaran telah diunggah.")
                .push(&session)
                .await;
        }
        Err(e) => {
            flash_api_failure(&session, e, "Gagal", "Gagal mengunggah bukti.").await?;
        }
    }

    Ok(Redirect::to(&back).into_response())
}

/// Pull the `proofImage` field out of the form.
async fn read_proof(mut multipart: Multipart) -> std::result::Result<ProofUpload, ProofError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ProofError::Missing),
            // Body over the route limit
            Err(e) => {
                tracing::debug!(error = %e, "multipart read failed");
                return Err(ProofError::TooLarge);
            }
        };
        if field.name() != Some("proofImage") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("bukti.jpg").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|_| ProofError::TooLarge)?;
        validate_proof(&content_type, bytes.len())?;

        return Ok(ProofUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
}
