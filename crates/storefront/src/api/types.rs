//! Request and response bodies of the HolyCat backend API.
//!
//! Entity mirrors (products, carts, orders) live in `holycat_core::model`;
//! this module only holds the envelopes specific to individual endpoints.

use holycat_core::{OrderId, ProductId};
use serde::{Deserialize, Serialize};

/// `POST /auth/login` body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /auth/login` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub require_verify: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// `POST /auth/register` body.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub city: String,
    pub address: String,
}

/// `POST /auth/register` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    #[serde(default)]
    pub require_otp: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /auth/verify-register` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest<'a> {
    pub email: &'a str,
    pub otp_code: &'a str,
}

/// `POST /auth/verify-register` response.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyOtpResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// `PUT /user/profile` body. Email cannot be changed.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub phone: String,
    pub city: String,
    pub address: String,
}

/// `POST /cart/add` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// `PUT /cart/update/{id}` body.
#[derive(Debug, Serialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// `POST /api/shipping/cost` body.
#[derive(Debug, Serialize)]
pub struct ShippingCostRequest<'a> {
    pub courier: &'a str,
    pub city: &'a str,
}

/// `POST /orders/create` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub order_id: OrderId,
}

/// `POST /payments/create` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub order_id: OrderId,
}

/// `POST /payments/create` response: a gateway transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSession {
    pub token: String,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One entry of a validation error list.
#[derive(Debug, Default, Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub msg: Option<String>,
}

impl ErrorBody {
    /// The most specific message: `error`, then the first validation
    /// message, then `message`.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        self.error
            .or_else(|| self.errors.into_iter().find_map(|e| e.msg))
            .or(self.message)
            .filter(|m| !m.trim().is_empty())
    }
}
