//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing (?search, ?category)
//! GET  /products/{id}          - Product detail
//!
//! # Cart (requires auth)
//! GET  /cart                   - Cart page (?items keeps the selection)
//! POST /cart/add               - Add to cart
//! POST /cart/select            - Toggle selection / adjust pending quantity
//! POST /cart/update/{id}       - Commit a quantity
//! POST /cart/remove/{id}       - Remove an item
//! POST /cart/checkout          - Go to checkout with the selected items
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout & Orders (requires auth)
//! GET  /checkout               - Checkout page (?items, ?courier, ?service, ?payment)
//! POST /checkout               - Place the order
//! GET  /orders                 - Order history
//! POST /orders/{id}/receive    - Confirm delivery
//! GET  /order/{id}             - Order detail
//! POST /order/{id}/pay         - Hand off to the payment gateway
//! POST /order/{id}/cancel      - Cancel
//! POST /order/{id}/proof       - Upload a transfer receipt
//!
//! # Auth
//! GET  /login, POST /login     - Login (may continue with an OTP step)
//! POST /login/verify           - OTP verification after login
//! GET  /register, POST /register - Registration
//! POST /register/verify        - OTP verification after registration
//! POST /logout                 - Logout
//! GET  /profile, POST /profile - Profile
//!
//! # Admin (requires ADMIN role)
//! GET  /admin                  - Dashboard
//! GET  /admin/orders           - Orders table
//! POST /admin/orders/{id}/status - Change status
//! GET  /admin/products         - Products table
//! GET  /admin/products/new, POST /admin/products - Create
//! GET  /admin/products/{id}/edit, POST /admin/products/{id} - Update
//! POST /admin/products/{id}/delete - Delete
//! GET  /admin/reports          - Sales report
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod products;
pub mod profile;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::api::ApiError;
use crate::error::Result;
use crate::models::Flash;
use crate::state::AppState;

/// Request body limit for the payment proof upload (file plus form overhead).
const PROOF_BODY_LIMIT: usize = 6 * 1024 * 1024;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/select", post(cart::select))
        .route("/update/{id}", post(cart::update))
        .route("/remove/{id}", post(cart::remove))
        .route("/checkout", post(cart::checkout))
        .route("/count", get(cart::count))
}

/// Create the order routes router (`/order/{id}` detail and actions).
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(orders::show))
        .route("/{id}/pay", post(orders::pay))
        .route("/{id}/cancel", post(orders::cancel))
        .route(
            "/{id}/proof",
            post(orders::upload_proof).layer(DefaultBodyLimit::max(PROOF_BODY_LIMIT)),
        )
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/login/verify", post(auth::verify_login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/register/verify", post(auth::verify_register))
        .route("/logout", post(auth::logout))
        .route("/profile", get(profile::show).post(profile::update))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product routes
        .nest("/products", product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout
        .route("/checkout", get(checkout::show).post(checkout::place_order))
        // Orders
        .route("/orders", get(orders::index))
        .route("/orders/{id}/receive", post(orders::receive))
        .nest("/order", order_routes())
        // Auth & profile
        .merge(auth_routes())
        // Admin console
        .nest("/admin", admin::routes())
}

/// Report a failed backend mutation as an error flash.
///
/// `Unauthorized` is returned as an error instead, so the expired-session
/// layer can send the visitor back to the login page.
pub(crate) async fn flash_api_failure(
    session: &Session,
    err: ApiError,
    title: &str,
    fallback: &str,
) -> Result<()> {
    if err.is_unauthorized() {
        return Err(err.into());
    }
    tracing::warn!(error = %err, "{title}");
    Flash::error(title, err.message_or(fallback)).push(session).await;
    Ok(())
}
