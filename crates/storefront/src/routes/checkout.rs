//! Checkout route handlers.
//!
//! The checkout page is driven entirely by its query string
//! (`items`, `courier`, `service`, `payment`). Choosing a courier submits a
//! GET form without `service`, which clears the chosen shipping service.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use holycat_core::PaymentMethod;
use holycat_core::checkout::{
    CheckoutError, CheckoutSummary, Courier, OrderDraft, find_option, parse_item_ids,
    shipping_cost, should_quote,
};
use holycat_core::model::{ShippingOption, User};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use super::flash_api_failure;
use crate::api::{ApiToken, HolycatClient};
use crate::context::PageContext;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::Flash;
use crate::state::AppState;

/// Checkout page parameters, shared by the page and the order form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutParams {
    #[serde(default)]
    pub items: String,
    pub courier: Option<String>,
    pub service: Option<String>,
    pub payment: Option<String>,
}

impl CheckoutParams {
    fn courier(&self) -> Option<Courier> {
        self.courier.as_deref().and_then(|c| c.parse().ok())
    }

    fn payment_method(&self) -> PaymentMethod {
        self.payment
            .as_deref()
            .and_then(|p| p.parse().ok())
            .unwrap_or_default()
    }

    fn service(&self) -> Option<&str> {
        self.service.as_deref().filter(|s| !s.is_empty())
    }

    /// `/checkout?…` carrying these parameters.
    fn url(&self) -> String {
        let mut url = format!("/checkout?items={}", urlencoding::encode(&self.items));
        for (key, value) in [
            ("courier", self.courier.as_deref()),
            ("service", self.service()),
            ("payment", self.payment.as_deref()),
        ] {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                url.push_str(&format!("&{key}={}", urlencoding::encode(value)));
            }
        }
        url
    }
}

/// One line of the order summary.
pub struct CheckoutLine {
    pub title: String,
    pub image: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// One courier choice.
pub struct CourierChoice {
    pub code: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// One quoted shipping service.
pub struct ServiceChoice {
    pub service: String,
    pub description: String,
    pub etd: String,
    pub cost: String,
    pub selected: bool,
}

/// One payment method choice.
pub struct PaymentChoice {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub ctx: PageContext,
    pub items_param: String,
    pub courier_param: String,
    pub service_param: String,
    pub lines: Vec<CheckoutLine>,
    pub subtotal: String,
    pub shipping_cost: String,
    pub grand_total: String,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub address: String,
    pub city: String,
    pub has_address: bool,
    pub couriers: Vec<CourierChoice>,
    pub services: Vec<ServiceChoice>,
    pub shipping_error: Option<String>,
    pub payments: Vec<PaymentChoice>,
    pub can_place_order: bool,
}

/// Everything checkout needs from the backend.
struct CheckoutData {
    user: User,
    summary: CheckoutSummary,
    options: Vec<ShippingOption>,
    shipping_error: Option<String>,
}

/// Outcome of loading checkout.
enum Loaded {
    Ready(CheckoutData),
    /// Nothing to check out; the flash has been set.
    BackToCart,
}

async fn load(
    api: &HolycatClient,
    token: &ApiToken,
    session: &Session,
    params: &CheckoutParams,
) -> Result<Loaded> {
    let cart = api.get_cart(token).await?;
    let user = api.me(token).await?;

    let summary = match CheckoutSummary::build(&cart.items, &parse_item_ids(&params.items)) {
        Ok(summary) => summary,
        Err(CheckoutError::EmptyCart) => {
            Flash::warning("Keranjang Kosong", "Tidak ada item di keranjang.")
                .push(session)
                .await;
            return Ok(Loaded::BackToCart);
        }
        Err(e @ CheckoutError::InvalidSelection) => {
            Flash::error("Gagal", e.to_string()).push(session).await;
            return Ok(Loaded::BackToCart);
        }
    };

    let courier = params.courier();
    let (options, shipping_error) = match courier {
        Some(courier) if should_quote(Some(courier), &user) => {
            let city = user.city.as_deref().unwrap_or_default().trim();
            match api.shipping_cost(courier, city).await {
                Ok(options) => (options, None),
                Err(e) if e.is_unauthorized() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(error = %e, courier = courier.code(), "shipping quote failed");
                    (Vec::new(), Some("Gagal memuat ongkos kirim.".to_string()))
                }
            }
        }
        _ => (Vec::new(), None),
    };

    Ok(Loaded::Ready(CheckoutData {
        user,
        summary,
        options,
        shipping_error,
    }))
}

/// Display the checkout page.
#[instrument(skip(state, signed_in, ctx, session))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    ctx: PageContext,
    session: Session,
    Query(params): Query<CheckoutParams>,
) -> Result<Response> {
    let data = match load(state.api(), &signed_in.token, &session, &params).await? {
        Loaded::Ready(data) => data,
        Loaded::BackToCart => return Ok(Redirect::to("/cart").into_response()),
    };

    let courier = params.courier();
    let chosen = find_option(&data.options, params.service());
    let payment = params.payment_method();
    let has_address = data.user.has_shipping_address();

    let template = CheckoutTemplate {
        items_param: params.items.clone(),
        courier_param: courier.map(|c| c.code()).unwrap_or_default().to_string(),
        service_param: chosen.map(|o| o.service.clone()).unwrap_or_default(),
        lines: data
            .summary
            .items
            .iter()
            .map(|item| CheckoutLine {
                title: item.product.title.clone(),
                image: item.product.image_url().to_string(),
                quantity: item.quantity,
                unit_price: item.product.price.to_string(),
                line_total: item.line_total().to_string(),
            })
            .collect(),
        subtotal: data.summary.subtotal.to_string(),
        shipping_cost: shipping_cost(chosen).to_string(),
        grand_total: data.summary.grand_total(chosen).to_string(),
        recipient_name: data.user.name.clone(),
        recipient_phone: data.user.phone.clone().unwrap_or_default(),
        address: data.user.address.clone().unwrap_or_default(),
        city: data.user.city.clone().unwrap_or_default(),
        has_address,
        couriers: Courier::ALL
            .iter()
            .map(|c| CourierChoice {
                code: c.code(),
                label: c.label(),
                selected: courier == Some(*c),
            })
            .collect(),
        services: data
            .options
            .iter()
            .map(|o| ServiceChoice {
                service: o.service.clone(),
                description: o.description.clone(),
                etd: o.etd.clone(),
                cost: o.cost.to_string(),
                selected: chosen.is_some_and(|c| c.service == o.service),
            })
            .collect(),
        shipping_error: data.shipping_error,
        payments: [PaymentMethod::Cod, PaymentMethod::BankTransfer]
            .into_iter()
            .map(|m| PaymentChoice {
                value: m.as_str(),
                label: m.label(),
                selected: m == payment,
            })
            .collect(),
        can_place_order: !data.summary.items.is_empty() && has_address && chosen.is_some(),
        ctx,
    };

    Ok(template.into_response())
}

/// Place the order.
///
/// Everything is re-read from the backend; the posted form only carries the
/// customer's choices.
#[instrument(skip(state, signed_in, session))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    session: Session,
    Form(params): Form<CheckoutParams>,
) -> Result<Response> {
    let data = match load(state.api(), &signed_in.token, &session, &params).await? {
        Loaded::Ready(data) => data,
        Loaded::BackToCart => return Ok(Redirect::to("/cart").into_response()),
    };

    let draft = OrderDraft {
        summary: &data.summary,
        user: &data.user,
        courier: params.courier(),
        shipping: find_option(&data.options, params.service()),
        payment_method: params.payment_method(),
    };

    let request = match draft.validate() {
        Ok(request) => request,
        Err(e) => {
            Flash::warning("Periksa Pesanan", e.to_string())
                .push(&session)
                .await;
            return Ok(Redirect::to(&params.url()).into_response());
        }
    };

    match state.api().create_order(&signed_in.token, &request).await {
        Ok(order_id) => {
            tracing::info!(order_id = %order_id, items = request.cart_item_ids.len(), "order placed");
            add_breadcrumb(
                "checkout",
                "Placed order",
                Some(&[("order_id", order_id.to_string().as_str())]),
            );
            Flash::success("Pesanan Dibuat", "Pesanan Anda berhasil dibuat.")
                .push(&session)
                .await;
            Ok(Redirect::to(&format!("/order/{order_id}")).into_response())
        }
        Err(e) => {
            flash_api_failure(
                &session,
                e,
                "Gagal Membuat Pesanan",
                "Terjadi kesalahan saat membuat pesanan.",
            )
            .await?;
            Ok(Redirect::to(&params.url()).into_response())
        }
    }
}
