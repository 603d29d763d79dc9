//! Authentication route handlers.
//!
//! The backend owns credentials and OTP codes. Login may answer
//! `requireVerify`, in which case the visitor continues with the OTP step;
//! registration always does.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use holycat_core::Email;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::types::RegisterRequest;
use crate::api::{ApiToken, LoginOutcome};
use crate::context::PageContext;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::auth::{local_redirect, signed_in};
use crate::middleware::set_signed_in;
use crate::models::{CurrentUser, Flash, session_keys};
use crate::state::AppState;

/// Shortest password the registration form accepts.
const MIN_PASSWORD_LEN: usize = 6;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub redirect: Option<String>,
}

/// OTP form data.
#[derive(Deserialize)]
pub struct OtpForm {
    pub otp_code: String,
    pub redirect: Option<String>,
}

/// Registration form data.
#[derive(Default, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
}

/// Auth page query parameters.
#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub redirect: Option<String>,
    pub step: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub redirect: String,
    pub otp_email: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub address: String,
    pub otp_email: Option<String>,
}

// =============================================================================
// Validation
// =============================================================================

/// Check a registration form and build the backend request.
///
/// # Errors
///
/// Returns the message to show next to the form.
pub fn validate_registration(form: &RegisterForm) -> std::result::Result<RegisterRequest, String> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err("Nama wajib diisi.".to_string());
    }
    let email = Email::parse(&form.email).map_err(|e| format!("Email tidak valid: {e}."))?;
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!("Password minimal {MIN_PASSWORD_LEN} karakter."));
    }
    if form.password != form.confirm_password {
        return Err("Konfirmasi password tidak cocok.".to_string());
    }
    let phone = form.phone.trim();
    if phone.is_empty() {
        return Err("Nomor telepon wajib diisi.".to_string());
    }

    Ok(RegisterRequest {
        name: name.to_string(),
        email: email.into_inner(),
        password: form.password.clone(),
        phone: phone.to_string(),
        city: form.city.trim().to_string(),
        address: form.address.trim().to_string(),
    })
}

fn login_step_url(step_verify: bool, redirect: Option<&str>) -> String {
    let target = local_redirect(redirect);
    let mut params = Vec::new();
    if step_verify {
        params.push("step=verify".to_string());
    }
    if target != "/" {
        params.push(format!("redirect={}", urlencoding::encode(target)));
    }
    if params.is_empty() {
        "/login".to_string()
    } else {
        format!("/login?{}", params.join("&"))
    }
}

async fn pending_email(session: &Session) -> Option<String> {
    session
        .get::<String>(session_keys::PENDING_OTP_EMAIL)
        .await
        .ok()
        .flatten()
}

/// Load the user behind a fresh token and remember both.
async fn complete_sign_in(state: &AppState, session: &Session, token: ApiToken) -> Result<()> {
    let user = state.api().me(&token).await?;
    let current = CurrentUser::from(&user);
    set_signed_in(session, &current, &token).await?;
    set_sentry_user(&current.id, Some(&current.email));
    tracing::info!(user_id = %current.id, role = %current.role, "user signed in");
    Ok(())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page (or its OTP step).
#[instrument(skip(ctx, session))]
pub async fn login_page(
    ctx: PageContext,
    session: Session,
    Query(query): Query<AuthQuery>,
) -> impl IntoResponse {
    let otp_email = if query.step.as_deref() == Some("verify") {
        pending_email(&session).await
    } else {
        None
    };

    LoginTemplate {
        ctx,
        redirect: local_redirect(query.redirect.as_deref()).to_string(),
        otp_email,
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let email = form.email.trim();
    let redirect = form.redirect.as_deref();

    match state.api().login(email, &form.password).await {
        Ok(LoginOutcome::SignedIn(token)) => {
            complete_sign_in(&state, &session, token).await?;
            Flash::success("Berhasil!", "Selamat datang kembali di Holycat!")
                .push(&session)
                .await;
            Ok(Redirect::to(local_redirect(redirect)).into_response())
        }
        Ok(LoginOutcome::VerifyRequired { message }) => {
            session
                .insert(session_keys::PENDING_OTP_EMAIL, email)
                .await?;
            Flash::info(
                "Verifikasi Diperlukan",
                message.unwrap_or_else(|| {
                    "Kode OTP telah dikirim ke email Anda.".to_string()
                }),
            )
            .push(&session)
            .await;
            Ok(Redirect::to(&login_step_url(true, redirect)).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "login failed");
            Flash::error("Gagal Login", e.message_or("Email atau password salah."))
                .push(&session)
                .await;
            Ok(Redirect::to(&login_step_url(false, redirect)).into_response())
        }
    }
}

/// Verify the OTP after an unverified login.
#[instrument(skip(state, session, form))]
pub async fn verify_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<OtpForm>,
) -> Result<Response> {
    verify(&state, &session, &form, "Selamat datang kembali di Holycat!", "/login").await
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page (or its OTP step).
#[instrument(skip(ctx, session))]
pub async fn register_page(
    ctx: PageContext,
    session: Session,
    Query(query): Query<AuthQuery>,
) -> impl IntoResponse {
    let otp_email = if query.step.as_deref() == Some("verify") {
        pending_email(&session).await
    } else {
        None
    };

    RegisterTemplate {
        ctx,
        error: None,
        name: String::new(),
        email: String::new(),
        phone: String::new(),
        city: String::new(),
        address: String::new(),
        otp_email,
    }
}

/// Handle registration form submission.
#[instrument(skip(state, ctx, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    ctx: PageContext,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let rerender = |ctx: PageContext, error: String, form: &RegisterForm| RegisterTemplate {
        ctx,
        error: Some(error),
        name: form.name.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),
        city: form.city.clone(),
        address: form.address.clone(),
        otp_email: None,
    };

    let request = match validate_registration(&form) {
        Ok(request) => request,
        Err(message) => return Ok(rerender(ctx, message, &form).into_response()),
    };

    match state.api().register(&request).await {
        Ok(response) => {
            let message = response
                .message
                .unwrap_or_else(|| "Kode OTP telah dikirim ke email Anda.".to_string());
            Flash::success("Registrasi Berhasil", message)
                .push(&session)
                .await;
            if response.require_otp {
                session
                    .insert(session_keys::PENDING_OTP_EMAIL, &request.email)
                    .await?;
                Ok(Redirect::to("/register?step=verify").into_response())
            } else {
                Ok(Redirect::to("/login").into_response())
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "registration failed");
            let message = e.message_or("Registrasi gagal. Silakan coba lagi.").to_string();
            Ok(rerender(ctx, message, &form).into_response())
        }
    }
}

/// Verify the OTP sent at registration.
#[instrument(skip(state, session, form))]
pub async fn verify_register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<OtpForm>,
) -> Result<Response> {
    verify(
        &state,
        &session,
        &form,
        "Akun Anda telah aktif. Selamat datang di Holycat!",
        "/register",
    )
    .await
}

async fn verify(
    state: &AppState,
    session: &Session,
    form: &OtpForm,
    welcome: &str,
    retry_page: &str,
) -> Result<Response> {
    let Some(email) = pending_email(session).await else {
        Flash::error("Gagal Verifikasi", "Sesi verifikasi berakhir. Silakan ulangi.")
            .push(session)
            .await;
        return Ok(Redirect::to(retry_page).into_response());
    };

    let otp = form.otp_code.trim();
    let token = match state.api().verify_otp(&email, otp).await {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(error = %e, "otp verification failed");
            Flash::error("Gagal Verifikasi", e.message_or("Kode OTP tidak valid."))
                .push(session)
                .await;
            let retry = if retry_page == "/login" {
                login_step_url(true, form.redirect.as_deref())
            } else {
                format!("{retry_page}?step=verify")
            };
            return Ok(Redirect::to(&retry).into_response());
        }
    };

    complete_sign_in(state, session, token).await?;
    Flash::success("Berhasil!", welcome).push(session).await;
    Ok(Redirect::to(local_redirect(form.redirect.as_deref())).into_response())
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Response> {
    if let Some(signed_in) = signed_in(&session).await
        && let Err(e) = state.api().logout(&signed_in.token).await
    {
        tracing::warn!(error = %e, "backend logout failed");
    }

    session.flush().await.map_err(AppError::from)?;
    clear_sentry_user();
    Flash::info("Sampai Jumpa", "Anda telah keluar.")
        .push(&session)
        .await;

    Ok(Redirect::to("/").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RegisterForm {
        RegisterForm {
            name: " Budi Santoso ".to_string(),
            email: "budi@example.com".to_string(),
            password: "rahasia1".to_string(),
            confirm_password: "rahasia1".to_string(),
            phone: "08123456789".to_string(),
            city: "Bandung".to_string(),
            address: "Jl. Merdeka 1".to_string(),
        }
    }

    #[test]
    fn test_valid_registration_is_trimmed() {
        let request = validate_registration(&form()).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(request.name, "Budi Santoso");
        assert_eq!(request.city, "Bandung");
    }

    #[test]
    fn test_password_confirmation_must_match() {
        let mut f = form();
        f.confirm_password = "rahasia2".to_string();
        assert_eq!(
            validate_registration(&f).err().as_deref(),
            Some("Konfirmasi password tidak cocok.")
        );
    }

    #[test]
    fn test_short_password_and_bad_email() {
        let mut f = form();
        f.password = "abc".to_string();
        f.confirm_password = "abc".to_string();
        assert_eq!(
            validate_registration(&f).err().as_deref(),
            Some("Password minimal 6 karakter.")
        );

        let mut f = form();
        f.email = "budi at example".to_string();
        assert!(validate_registration(&f).is_err());
    }

    #[test]
    fn test_login_step_url() {
        assert_eq!(login_step_url(false, None), "/login");
        assert_eq!(login_step_url(true, Some("/")), "/login?step=verify");
        assert_eq!(
            login_step_url(true, Some("/orders")),
            "/login?step=verify&redirect=%2Forders"
        );
        assert_eq!(
            login_step_url(false, Some("//evil.example")),
            "/login"
        );
    }
}
