//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::api::ApiError;
use crate::context::PageContext;
use crate::filters;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API call failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Signed in but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Response marker: the backend rejected the visitor's token.
///
/// Picked up by [`crate::middleware::expired_session_middleware`], which
/// clears the session and sends the visitor to the login page.
#[derive(Debug, Clone, Copy)]
pub struct SessionExpired;

/// Error page template.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub ctx: PageContext,
    pub status_code: u16,
    pub title: String,
    pub message: String,
}

impl ErrorTemplate {
    /// Render an error page with the given status.
    #[must_use]
    pub fn page(status: StatusCode, title: &str, message: &str) -> Response {
        let template = Self {
            ctx: PageContext::default(),
            status_code: status.as_u16(),
            title: title.to_string(),
            message: message.to_string(),
        };
        (status, template).into_response()
    }

    #[must_use]
    pub fn forbidden() -> Response {
        Self::page(
            StatusCode::FORBIDDEN,
            "Akses ditolak",
            "Anda tidak memiliki akses ke halaman ini.",
        )
    }

    #[must_use]
    pub fn not_found() -> Response {
        Self::page(
            StatusCode::NOT_FOUND,
            "Halaman tidak ditemukan",
            "Halaman yang Anda cari tidak ada.",
        )
    }
}

impl AppError {
    /// Whether this error is our fault (or the backend's) rather than the
    /// visitor's.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Api(err) => match err {
                ApiError::Unauthorized(_) | ApiError::Forbidden(_) | ApiError::NotFound(_) => {
                    false
                }
                ApiError::Status { status, .. } => *status >= 500,
                _ => true,
            },
            Self::Session(_) | Self::Internal(_) => true,
            Self::NotFound(_) | Self::Forbidden(_) | Self::BadRequest(_) => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        match &self {
            Self::Api(ApiError::Unauthorized(_)) => {
                let mut response = Redirect::to("/login").into_response();
                response.extensions_mut().insert(SessionExpired);
                response
            }
            Self::Api(ApiError::Forbidden(message)) => ErrorTemplate::page(
                StatusCode::FORBIDDEN,
                "Akses ditolak",
                message
                    .as_deref()
                    .unwrap_or("Anda tidak memiliki akses ke halaman ini."),
            ),
            Self::Forbidden(message) => {
                ErrorTemplate::page(StatusCode::FORBIDDEN, "Akses ditolak", message)
            }
            Self::Api(ApiError::NotFound(message)) => ErrorTemplate::page(
                StatusCode::NOT_FOUND,
                "Tidak ditemukan",
                message
                    .as_deref()
                    .unwrap_or("Data yang Anda cari tidak ditemukan."),
            ),
            Self::NotFound(message) => {
                ErrorTemplate::page(StatusCode::NOT_FOUND, "Tidak ditemukan", message)
            }
            Self::Api(ApiError::Status { status, message }) if *status < 500 => {
                ErrorTemplate::page(
                    StatusCode::BAD_REQUEST,
                    "Permintaan tidak valid",
                    message.as_deref().unwrap_or("Permintaan tidak dapat diproses."),
                )
            }
            Self::BadRequest(message) => {
                ErrorTemplate::page(StatusCode::BAD_REQUEST, "Permintaan tidak valid", message)
            }
            Self::Api(_) => ErrorTemplate::page(
                StatusCode::BAD_GATEWAY,
                "Layanan tidak tersedia",
                "Server Holycat sedang tidak dapat dihubungi. Silakan coba lagi nanti.",
            ),
            Self::Session(_) | Self::Internal(_) => ErrorTemplate::page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Terjadi kesalahan",
                "Terjadi kesalahan pada server. Silakan coba lagi nanti.",
            ),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::header::LOCATION;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order 7".to_string());
        assert_eq!(err.to_string(), "Not found: order 7");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::NotFound(None))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Status {
                status: 422,
                message: Some("Stok tidak cukup".to_string()),
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Status {
                status: 503,
                message: None,
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::MissingToken)),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_unauthorized_marks_session_expired() {
        let response = AppError::Api(ApiError::Unauthorized(None)).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/login");
        assert!(response.extensions().get::<SessionExpired>().is_some());
    }
}
