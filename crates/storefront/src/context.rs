//! Per-page chrome: who is signed in, the pending flash and the cart badge.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use holycat_core::cart::cart_badge_count;
use tower_sessions::Session;

use crate::middleware::auth::signed_in;
use crate::models::{CurrentUser, Flash};
use crate::state::AppState;

/// Everything the base layout needs. Every page template carries one as
/// `ctx`.
///
/// Extracting it consumes the pending flash, so only handlers that render
/// a page should ask for it.
#[derive(Debug, Default)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub cart_count: u32,
}

impl PageContext {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_admin)
    }

    #[must_use]
    pub fn greeting(&self) -> &str {
        self.user.as_ref().map_or("", CurrentUser::first_name)
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Ok(Self::default());
        };

        let flash = Flash::take(&session).await;
        let Some(signed_in) = signed_in(&session).await else {
            return Ok(Self {
                user: None,
                flash,
                cart_count: 0,
            });
        };

        // The badge is decoration; a failing cart call must not break the page.
        let cart_count = match state.api().get_cart(&signed_in.token).await {
            Ok(cart) => cart_badge_count(&cart.items),
            Err(e) => {
                tracing::debug!(error = %e, "cart badge unavailable");
                0
            }
        };

        Ok(Self {
            user: Some(signed_in.user),
            flash,
            cart_count,
        })
    }
}
