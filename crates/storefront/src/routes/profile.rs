//! Profile route handlers. The email address is shown but never sent back.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::flash_api_failure;
use crate::api::types::ProfileUpdate;
use crate::context::PageContext;
use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::{CurrentUser, Flash};
use crate::state::AppState;

/// Profile form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub ctx: PageContext,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub address: String,
    pub role: String,
}

/// Display the profile page.
#[instrument(skip(state, signed_in, ctx))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let user = state.api().me(&signed_in.token).await?;

    Ok(ProfileTemplate {
        ctx,
        name: user.name,
        email: user.email,
        phone: user.phone.unwrap_or_default(),
        city: user.city.unwrap_or_default(),
        address: user.address.unwrap_or_default(),
        role: user.role.to_string(),
    })
}

/// Save profile changes.
#[instrument(skip(state, signed_in, session, form), fields(user_id = %signed_in.user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let name = form.name.trim();
    if name.is_empty() {
        Flash::error("Gagal", "Nama wajib diisi.").push(&session).await;
        return Ok(Redirect::to("/profile").into_response());
    }

    let update = ProfileUpdate {
        name: name.to_string(),
        phone: form.phone.trim().to_string(),
        city: form.city.trim().to_string(),
        address: form.address.trim().to_string(),
    };

    match state.api().update_profile(&signed_in.token, &update).await {
        Ok(user) => {
            set_current_user(&session, &CurrentUser::from(&user)).await?;
            Flash::success("Berhasil!", "Profil Anda telah diperbarui.")
                .push(&session)
                .await;
        }
        Err(e) => {
            flash_api_failure(&session, e, "Gagal", "Gagal memperbarui profil.").await?;
        }
    }

    Ok(Redirect::to("/profile").into_response())
}
