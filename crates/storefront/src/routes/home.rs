//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use holycat_core::ProductCategory;
use tracing::instrument;

use super::products::{CategoryLink, ProductCard};
use crate::context::PageContext;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub categories: Vec<CategoryLink>,
    pub products: Vec<ProductCard>,
}

/// Display the home page.
#[instrument(skip(state, ctx))]
pub async fn home(State(state): State<AppState>, ctx: PageContext) -> Result<impl IntoResponse> {
    let products = state.api().list_products(None, None).await?;

    Ok(HomeTemplate {
        ctx,
        categories: ProductCategory::ALL
            .iter()
            .map(|c| CategoryLink {
                value: c.as_str(),
                label: c.label(),
                active: false,
            })
            .collect(),
        products: products.iter().map(ProductCard::from).collect(),
    })
}
