//! HolyCat backend API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; the backend owns every entity
//! - Authenticated calls carry `Authorization: Bearer <token>`, where the
//!   token is the one the backend issued at login and is kept in the
//!   visitor's session
//! - Product list and detail responses are cached via `moka` and
//!   invalidated whenever the catalog or stock changes (product edits,
//!   placed, cancelled or re-statused orders)
//!
//! # Example
//!
//! ```rust,ignore
//! use holycat_storefront::api::HolycatClient;
//!
//! let client = HolycatClient::new(&config.api, config.product_cache_ttl)?;
//! let products = client.list_products(None, Some("Grooming")).await?;
//! let cart = client.get_cart(&token).await?;
//! ```

mod cache;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use holycat_core::checkout::{CreateOrderRequest, Courier};
use holycat_core::model::{Cart, Order, Product, ShippingOption, User};
use holycat_core::order::StatusUpdate;
use holycat_core::report::{AdminStats, ReportFilter, SalesReport};
use holycat_core::{CartItemId, OrderId, ProductId, ProductInput};
use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, SET_COOKIE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};
use types::{
    AddToCartRequest, CreatePaymentRequest, CreatedOrder, ErrorBody, LoginRequest, LoginResponse,
    PaymentSession, ProfileUpdate, RegisterRequest, RegisterResponse, ShippingCostRequest,
    UpdateQuantityRequest, VerifyOtpRequest, VerifyOtpResponse,
};

/// Name of the cookie the backend sets on login.
const TOKEN_COOKIE: &str = "token";

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// 401: the token is missing, expired, or the credentials are wrong.
    #[error("Unauthorized")]
    Unauthorized(Option<String>),

    /// 403: signed in but not allowed.
    #[error("Forbidden")]
    Forbidden(Option<String>),

    /// 404.
    #[error("Not found")]
    NotFound(Option<String>),

    /// Any other non-success status.
    #[error("Backend returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },

    /// Login or verification succeeded but no token was issued.
    #[error("Backend issued no session token")]
    MissingToken,

    /// The configured base URL cannot be joined with a path.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// The backend's own message, if it sent one.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(m) | Self::Forbidden(m) | Self::NotFound(m) => m.as_deref(),
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// The backend's message, or `fallback` when it sent none.
    #[must_use]
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.backend_message().unwrap_or(fallback)
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// A backend session token.
///
/// Implements `Debug` manually to redact the token.
pub struct ApiToken(SecretString);

impl ApiToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for storing in the visitor's session.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken([REDACTED])")
    }
}

/// Result of `POST /auth/login`.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Signed in.
    SignedIn(ApiToken),
    /// The account is unverified; an OTP was sent to the email.
    VerifyRequired { message: Option<String> },
}

/// An uploaded payment proof image.
#[derive(Debug, Clone)]
pub struct ProofUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

// =============================================================================
// HolycatClient
// =============================================================================

/// Client for the HolyCat backend API.
///
/// Cheaply cloneable; all clones share one connection pool and one
/// product cache.
#[derive(Clone)]
pub struct HolycatClient {
    inner: Arc<HolycatClientInner>,
}

struct HolycatClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl HolycatClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, product_cache_ttl: Duration) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(product_cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("holycat-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(HolycatClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{path}", self.inner.base_url))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        url: Url,
        token: Option<&ApiToken>,
    ) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token.expose())),
            None => builder,
        }
    }

    /// Send a request and map non-success statuses to `ApiError`.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message);

        debug!(status = %status, message = ?message, "Backend returned non-success status");

        Err(match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ => {
                if status.is_server_error() {
                    tracing::error!(
                        status = %status,
                        body = %body.chars().take(500).collect::<String>(),
                        "HolyCat backend error"
                    );
                }
                ApiError::Status {
                    status: status.as_u16(),
                    message,
                }
            }
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse HolyCat backend response"
            );
            ApiError::Parse(e)
        })
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(drop)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List products, optionally filtered by free text and category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        search: Option<&str>,
        category: Option<&str>,
    ) -> Result<Arc<Vec<Product>>, ApiError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let category = category.map(str::trim).filter(|s| !s.is_empty());
        let cache_key = CacheKey::Products {
            search: search.map(str::to_owned),
            category: category.map(str::to_owned),
        };

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut query = Vec::new();
        if let Some(search) = search {
            query.push(("search", search));
        }
        if let Some(category) = category {
            query.push(("category", category));
        }

        let url = self.url("/products", &query)?;
        let products: Arc<Vec<Product>> =
            Arc::new(self.send_json(self.request(Method::GET, url, None)).await?);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist, or another error if
    /// the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id);

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.url(&format!("/products/{id}"), &[])?;
        let product: Product = self.send_json(self.request(Method::GET, url, None)).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Create a product (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, input), fields(title = %input.title))]
    pub async fn create_product(
        &self,
        token: &ApiToken,
        input: &ProductInput,
    ) -> Result<(), ApiError> {
        let url = self.url("/products", &[])?;
        self.send_empty(self.request(Method::POST, url, Some(token)).json(input))
            .await?;
        self.invalidate_products();
        Ok(())
    }

    /// Update a product (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        token: &ApiToken,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/products/{id}"), &[])?;
        self.send_empty(self.request(Method::PUT, url, Some(token)).json(input))
            .await?;
        self.invalidate_products();
        Ok(())
    }

    /// Delete a product (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn delete_product(&self, token: &ApiToken, id: ProductId) -> Result<(), ApiError> {
        let url = self.url(&format!("/products/{id}"), &[])?;
        self.send_empty(self.request(Method::DELETE, url, Some(token)))
            .await?;
        self.invalidate_products();
        Ok(())
    }

    /// Drop every cached product response.
    pub fn invalidate_products(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Get the signed-in user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn get_cart(&self, token: &ApiToken) -> Result<Cart, ApiError> {
        let url = self.url("/cart", &[])?;
        self.send_json(self.request(Method::GET, url, Some(token)))
            .await
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        token: &ApiToken,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let url = self.url("/cart/add", &[])?;
        let body = AddToCartRequest {
            product_id,
            quantity,
        };
        self.send_empty(self.request(Method::POST, url, Some(token)).json(&body))
            .await
    }

    /// Commit a new quantity for a cart item.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(cart_item_id = %id))]
    pub async fn update_cart_item(
        &self,
        token: &ApiToken,
        id: CartItemId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/cart/update/{id}"), &[])?;
        let body = UpdateQuantityRequest { quantity };
        self.send_empty(self.request(Method::PUT, url, Some(token)).json(&body))
            .await
    }

    /// Remove an item from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(cart_item_id = %id))]
    pub async fn remove_cart_item(&self, token: &ApiToken, id: CartItemId) -> Result<(), ApiError> {
        let url = self.url(&format!("/cart/remove/{id}"), &[])?;
        self.send_empty(self.request(Method::DELETE, url, Some(token)))
            .await
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for wrong credentials, `MissingToken` when the
    /// backend accepted the login without issuing a token, or another error
    /// if the API request fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        let url = self.url("/auth/login", &[])?;
        let response = self
            .send(
                self.request(Method::POST, url, None)
                    .json(&LoginRequest { email, password }),
            )
            .await?;

        let cookie_token = token_from_cookies(&response);
        let body: LoginResponse = parse_body(response).await?;

        if body.require_verify {
            return Ok(LoginOutcome::VerifyRequired {
                message: body.message,
            });
        }

        body.token
            .filter(|t| !t.is_empty())
            .or(cookie_token)
            .map(|t| LoginOutcome::SignedIn(ApiToken::new(t)))
            .ok_or(ApiError::MissingToken)
    }

    /// Register a new account. The backend emails an OTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        let url = self.url("/auth/register", &[])?;
        self.send_json(self.request(Method::POST, url, None).json(request))
            .await
    }

    /// Verify the OTP sent at registration (or at an unverified login).
    ///
    /// # Errors
    ///
    /// Returns an error if the code is wrong, no token was issued, or the
    /// API request fails.
    #[instrument(skip(self, otp_code))]
    pub async fn verify_otp(&self, email: &str, otp_code: &str) -> Result<ApiToken, ApiError> {
        let url = self.url("/auth/verify-register", &[])?;
        let response = self
            .send(
                self.request(Method::POST, url, None)
                    .json(&VerifyOtpRequest { email, otp_code }),
            )
            .await?;

        let cookie_token = token_from_cookies(&response);
        let body: VerifyOtpResponse = parse_body(response).await?;

        body.token
            .filter(|t| !t.is_empty())
            .or(cookie_token)
            .map(ApiToken::new)
            .ok_or(ApiError::MissingToken)
    }

    /// Get the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the token is no longer valid.
    #[instrument(skip(self, token))]
    pub async fn me(&self, token: &ApiToken) -> Result<User, ApiError> {
        let url = self.url("/auth/me", &[])?;
        self.send_json(self.request(Method::GET, url, Some(token)))
            .await
    }

    /// End the backend session.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: &ApiToken) -> Result<(), ApiError> {
        let url = self.url("/auth/logout", &[])?;
        self.send_empty(self.request(Method::POST, url, Some(token)))
            .await
    }

    /// Update the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, update))]
    pub async fn update_profile(
        &self,
        token: &ApiToken,
        update: &ProfileUpdate,
    ) -> Result<User, ApiError> {
        let url = self.url("/user/profile", &[])?;
        self.send_json(self.request(Method::PUT, url, Some(token)).json(update))
            .await
    }

    // =========================================================================
    // Checkout & Order Methods
    // =========================================================================

    /// Quote shipping services of a courier to a city.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn shipping_cost(
        &self,
        courier: Courier,
        city: &str,
    ) -> Result<Vec<ShippingOption>, ApiError> {
        let url = self.url("/api/shipping/cost", &[])?;
        let body = ShippingCostRequest {
            courier: courier.code(),
            city,
        };
        self.send_json(self.request(Method::POST, url, None).json(&body))
            .await
    }

    /// Place an order from cart items.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, request), fields(items = request.cart_item_ids.len()))]
    pub async fn create_order(
        &self,
        token: &ApiToken,
        request: &CreateOrderRequest,
    ) -> Result<OrderId, ApiError> {
        let url = self.url("/orders/create", &[])?;
        let created: CreatedOrder = self
            .send_json(self.request(Method::POST, url, Some(token)).json(request))
            .await?;
        // The backend reserves stock for the order
        self.invalidate_products();
        Ok(created.order_id)
    }

    /// List the signed-in user's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn list_orders(&self, token: &ApiToken) -> Result<Vec<Order>, ApiError> {
        let url = self.url("/orders", &[])?;
        self.send_json(self.request(Method::GET, url, Some(token)))
            .await
    }

    /// Get one of the signed-in user's orders.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Forbidden` when the order is missing or
    /// belongs to someone else.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn get_order(&self, token: &ApiToken, id: OrderId) -> Result<Order, ApiError> {
        let url = self.url(&format!("/orders/{id}"), &[])?;
        self.send_json(self.request(Method::GET, url, Some(token)))
            .await
    }

    /// Cancel an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn cancel_order(&self, token: &ApiToken, id: OrderId) -> Result<(), ApiError> {
        let url = self.url(&format!("/orders/{id}/cancel"), &[])?;
        self.send_empty(self.request(Method::PUT, url, Some(token)))
            .await?;
        self.invalidate_products();
        Ok(())
    }

    /// Confirm an order was received.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn receive_order(&self, token: &ApiToken, id: OrderId) -> Result<(), ApiError> {
        let url = self.url(&format!("/orders/{id}/receive"), &[])?;
        self.send_empty(self.request(Method::PUT, url, Some(token)))
            .await
    }

    /// Upload a bank transfer receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, upload), fields(order_id = %id, bytes = upload.bytes.len()))]
    pub async fn submit_payment_proof(
        &self,
        token: &ApiToken,
        id: OrderId,
        upload: ProofUpload,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/orders/{id}/submit-proof"), &[])?;
        let part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;
        let form = reqwest::multipart::Form::new().part("proofImage", part);
        self.send_empty(self.request(Method::PUT, url, Some(token)).multipart(form))
            .await
    }

    /// Open a payment gateway transaction for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn create_payment(
        &self,
        token: &ApiToken,
        id: OrderId,
    ) -> Result<PaymentSession, ApiError> {
        let url = self.url("/payments/create", &[])?;
        let body = CreatePaymentRequest { order_id: id };
        self.send_json(self.request(Method::POST, url, Some(token)).json(&body))
            .await
    }

    // =========================================================================
    // Admin Methods
    // =========================================================================

    /// Dashboard statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_stats(&self, token: &ApiToken) -> Result<AdminStats, ApiError> {
        let url = self.url("/admin/stats", &[])?;
        self.send_json(self.request(Method::GET, url, Some(token)))
            .await
    }

    /// Every order in the shop.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_orders(&self, token: &ApiToken) -> Result<Vec<Order>, ApiError> {
        let url = self.url("/admin/orders", &[])?;
        self.send_json(self.request(Method::GET, url, Some(token)))
            .await
    }

    /// Change an order's status.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, update), fields(order_id = %id, status = %update.status))]
    pub async fn admin_update_status(
        &self,
        token: &ApiToken,
        id: OrderId,
        update: &StatusUpdate,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/admin/orders/{id}/status"), &[])?;
        self.send_empty(self.request(Method::PUT, url, Some(token)).json(update))
            .await?;
        self.invalidate_products();
        Ok(())
    }

    /// Sales report for a date window.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_report(
        &self,
        token: &ApiToken,
        filter: &ReportFilter,
    ) -> Result<SalesReport, ApiError> {
        let pairs = filter.query_pairs();
        let query: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let url = self.url("/admin/reports/orders", &query)?;
        self.send_json(self.request(Method::GET, url, Some(token)))
            .await
    }
}

async fn parse_body<T: DeserializeOwned + Default>(response: Response) -> Result<T, ApiError> {
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(&body)?)
}

/// Extract the `token` cookie from the response's `Set-Cookie` headers.
fn token_from_cookies(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(token_from_set_cookie)
}

fn token_from_set_cookie(header: &str) -> Option<String> {
    let pair = header.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    (name.trim() == TOKEN_COOKIE && !value.is_empty()).then(|| value.trim().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_set_cookie() {
        assert_eq!(
            token_from_set_cookie("token=abc.def; Path=/; HttpOnly; SameSite=Lax").as_deref(),
            Some("abc.def")
        );
        assert_eq!(token_from_set_cookie("other=1; Path=/"), None);
        assert_eq!(token_from_set_cookie("token=; Max-Age=0"), None);
    }

    #[test]
    fn test_api_error_messages() {
        let err = ApiError::Status {
            status: 400,
            message: Some("Stok tidak cukup".to_string()),
        };
        assert_eq!(err.message_or("Gagal"), "Stok tidak cukup");
        assert_eq!(err.to_string(), "Backend returned 400: Stok tidak cukup");
        assert_eq!(ApiError::NotFound(None).message_or("Gagal"), "Gagal");
        assert!(ApiError::Unauthorized(None).is_unauthorized());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = ApiToken::new("super-secret-jwt");
        assert!(!format!("{token:?}").contains("super-secret-jwt"));
        assert_eq!(token.expose(), "super-secret-jwt");
    }

    #[test]
    fn test_url_joins_base_and_query() {
        let config = ApiConfig {
            base_url: "http://localhost:8080/api".to_string(),
            timeout: Duration::from_secs(5),
        };
        let client = HolycatClient::new(&config, Duration::from_secs(60)).unwrap();
        let url = client
            .url("/products", &[("search", "pasir kucing"), ("category", "Obat")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/products?search=pasir+kucing&category=Obat"
        );
    }
}
