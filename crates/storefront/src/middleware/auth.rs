//! Authentication middleware and extractors.
//!
//! The backend issues the bearer token; the storefront only remembers it in
//! the visitor's session next to a snapshot of the user.

use axum::{
    extract::{FromRequestParts, OriginalUri, Request},
    http::{Method, StatusCode, Uri, header::REFERER, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::api::ApiToken;
use crate::error::{ErrorTemplate, SessionExpired};
use crate::models::{CurrentUser, Flash, session_keys};

/// A signed-in visitor: who they are and the token to act as them.
#[derive(Debug)]
pub struct SignedIn {
    pub user: CurrentUser,
    pub token: ApiToken,
}

/// Extractor that requires a signed-in user.
///
/// If nobody is signed in, redirects to `/login?redirect=<path+query>`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(signed_in): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", signed_in.user.name)
/// }
/// ```
pub struct RequireAuth(pub SignedIn);

/// Extractor that requires a signed-in user with the `ADMIN` role.
pub struct RequireAdmin(pub SignedIn);

/// Error returned when authentication is required but missing.
pub enum AuthRejection {
    /// Redirect to the login page, coming back to `return_to` afterwards.
    RedirectToLogin { return_to: String },
    /// Signed in, but not an admin.
    Forbidden,
    /// The session layer is not installed.
    NoSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { return_to } => {
                Redirect::to(&login_url(&return_to)).into_response()
            }
            Self::Forbidden => ErrorTemplate::forbidden().into_response(),
            Self::NoSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::NoSession)?;

        signed_in(session)
            .await
            .map(Self)
            .ok_or_else(|| AuthRejection::RedirectToLogin {
                return_to: path_and_query(parts),
            })
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(signed_in) = RequireAuth::from_request_parts(parts, state).await?;
        if !signed_in.user.is_admin() {
            tracing::warn!(user_id = %signed_in.user.id, path = %parts.uri.path(), "non-admin denied");
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(signed_in))
    }
}

/// Read the signed-in user and token from the session.
///
/// Both must be present; a session holding only one of them is treated as
/// signed out.
pub async fn signed_in(session: &Session) -> Option<SignedIn> {
    let user = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()?;
    let token = session
        .get::<String>(session_keys::API_TOKEN)
        .await
        .ok()
        .flatten()?;
    Some(SignedIn {
        user,
        token: ApiToken::new(token),
    })
}

/// Store a fresh sign-in, rotating the session id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_signed_in(
    session: &Session,
    user: &CurrentUser,
    token: &ApiToken,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await?;
    session.insert(session_keys::API_TOKEN, token.expose()).await?;
    session
        .remove::<String>(session_keys::PENDING_OTP_EMAIL)
        .await?;
    Ok(())
}

/// Replace the stored user snapshot (after a profile update).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Forget the signed-in user and token, keeping the rest of the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_signed_in(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    session.remove::<String>(session_keys::API_TOKEN).await?;
    Ok(())
}

/// Middleware that turns a backend 401 into a fresh login.
///
/// Handlers surface `ApiError::Unauthorized` as an `AppError`, which marks
/// the response with [`SessionExpired`]. This layer then drops the stale
/// credentials and sends the visitor to the login page, returning them to
/// the page they were on.
pub async fn expired_session_middleware(request: Request, next: Next) -> Response {
    let session = request.extensions().get::<Session>().cloned();
    let return_to = return_path(&request);

    let response = next.run(request).await;
    if response.extensions().get::<SessionExpired>().is_none() {
        return response;
    }

    if let Some(session) = session {
        if let Err(e) = clear_signed_in(&session).await {
            tracing::warn!(error = %e, "failed to clear expired session");
        }
        Flash::warning(
            "Sesi berakhir",
            "Sesi Anda telah berakhir. Silakan masuk kembali.",
        )
        .push(&session)
        .await;
    }

    Redirect::to(&login_url(&return_to)).into_response()
}

/// `/login?redirect=<target>`, or plain `/login` when the target is home.
#[must_use]
pub fn login_url(return_to: &str) -> String {
    if return_to == "/" || return_to.is_empty() {
        "/login".to_string()
    } else {
        format!("/login?redirect={}", urlencoding::encode(return_to))
    }
}

/// Accept a post-login redirect only when it stays on this site.
#[must_use]
pub fn local_redirect(target: Option<&str>) -> &str {
    match target {
        Some(t) if t.starts_with('/') && !t.starts_with("//") && !t.contains('\\') => t,
        _ => "/",
    }
}

/// The full request target. Nested routers see the URI with their mount
/// prefix stripped, so prefer the one recorded before routing.
fn path_and_query(parts: &Parts) -> String {
    full_target(parts.extensions.get::<OriginalUri>(), &parts.uri)
}

fn full_target(original: Option<&OriginalUri>, uri: &Uri) -> String {
    original
        .map_or(uri, |OriginalUri(original)| original)
        .path_and_query()
        .map_or_else(|| "/".to_string(), ToString::to_string)
}

/// Where to return after re-login. A form POST cannot be replayed, so for
/// anything but GET use the page that submitted it.
fn return_path(request: &Request) -> String {
    if request.method() == Method::GET {
        return full_target(request.extensions().get::<OriginalUri>(), request.uri());
    }

    request
        .headers()
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|referer| url::Url::parse(referer).ok())
        .map_or_else(
            || "/".to_string(),
            |url| match url.query() {
                Some(q) => format!("{}?{q}", url.path()),
                None => url.path().to_string(),
            },
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_local_redirect_rejects_other_hosts() {
        assert_eq!(local_redirect(Some("/orders")), "/orders");
        assert_eq!(local_redirect(Some("/checkout?items=1,2")), "/checkout?items=1,2");
        assert_eq!(local_redirect(Some("//evil.example")), "/");
        assert_eq!(local_redirect(Some("https://evil.example")), "/");
        assert_eq!(local_redirect(Some("/\\evil.example")), "/");
        assert_eq!(local_redirect(None), "/");
    }

    #[test]
    fn test_login_url_encodes_target() {
        assert_eq!(login_url("/"), "/login");
        assert_eq!(
            login_url("/checkout?items=1,3"),
            "/login?redirect=%2Fcheckout%3Fitems%3D1%2C3"
        );
    }

    #[test]
    fn test_return_path_uses_referer_for_posts() {
        let post = Request::builder()
            .method(Method::POST)
            .uri("/cart/add")
            .header(REFERER, "http://localhost:3000/products/4?from=home")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(return_path(&post), "/products/4?from=home");

        let get = Request::builder()
            .uri("/orders")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(return_path(&get), "/orders");
    }

    #[test]
    fn test_full_target_keeps_the_mount_prefix() {
        let nested: Uri = "/orders?status=Dikirim".parse().unwrap();
        let original = OriginalUri("/admin/orders?status=Dikirim".parse().unwrap());
        assert_eq!(
            full_target(Some(&original), &nested),
            "/admin/orders?status=Dikirim"
        );
        assert_eq!(full_target(None, &nested), "/orders?status=Dikirim");
    }
}
