//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with the in-memory store)
//! 5. Expired session (backend 401 → login redirect)
//! 6. Security headers (CSP, frame options, caching)

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    RequireAdmin, RequireAuth, SignedIn, clear_signed_in,
    expired_session_middleware, set_current_user, set_signed_in,
};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
