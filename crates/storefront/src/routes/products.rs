//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use holycat_core::model::Product;
use holycat_core::types::catalog::display_category;
use holycat_core::{ProductCategory, ProductId};
use serde::Deserialize;
use tracing::instrument;

use crate::api::ApiError;
use crate::context::PageContext;
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductCard {
    pub id: ProductId,
    pub title: String,
    pub price: String,
    pub image: String,
    pub category: String,
    pub in_stock: bool,
    pub stock_label: &'static str,
    pub stock_class: &'static str,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.price.to_string(),
            image: product.image_url().to_string(),
            category: display_category(product.category.as_deref()),
            in_stock: product.in_stock(),
            stock_label: product.stock_label(),
            stock_class: product.stock_class(),
        }
    }
}

/// A category chip in the listing filter bar.
pub struct CategoryLink {
    pub value: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub ctx: PageContext,
    pub heading: String,
    pub search: String,
    pub categories: Vec<CategoryLink>,
    pub products: Vec<ProductCard>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub ctx: PageContext,
    pub product: ProductCard,
    pub description: String,
    pub stock: i32,
}

/// Listing heading: search wins over category.
#[must_use]
pub fn listing_heading(search: Option<&str>, category: Option<&str>) -> String {
    match (non_empty(search), non_empty(category)) {
        (Some(search), _) => format!("Hasil Pencarian: \"{search}\""),
        (None, Some(category)) => format!("Kategori: {}", display_category(Some(category))),
        (None, None) => "Semua Produk".to_string(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Display product listing page.
#[instrument(skip(state, ctx))]
pub async fn index(
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<ProductsQuery>,
) -> Result<impl IntoResponse> {
    let search = non_empty(query.search.as_deref());
    let category = non_empty(query.category.as_deref());

    let products = state.api().list_products(search, category).await?;

    Ok(ProductsIndexTemplate {
        ctx,
        heading: listing_heading(search, category),
        search: search.unwrap_or_default().to_string(),
        categories: ProductCategory::ALL
            .iter()
            .map(|c| CategoryLink {
                value: c.as_str(),
                label: c.label(),
                active: category == Some(c.as_str()),
            })
            .collect(),
        products: products.iter().map(ProductCard::from).collect(),
    })
}

/// Display product detail page.
#[instrument(skip(state, ctx), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = match state.api().get_product(id).await {
        Ok(product) => product,
        Err(ApiError::NotFound(_)) => {
            return Err(AppError::NotFound("Produk tidak ditemukan.".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(ProductShowTemplate {
        ctx,
        description: product
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| "Tidak ada deskripsi.".to_string()),
        stock: product.stock,
        product: ProductCard::from(&product),
    })
}
