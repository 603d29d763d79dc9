//! Admin product management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use holycat_core::listing::{DEFAULT_PER_PAGE, Page, ProductFilter};
use holycat_core::model::Product;
use holycat_core::types::catalog::{DEFAULT_PRODUCT_IMAGE, display_category};
use holycat_core::{ProductCategory, ProductId, ProductInput};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{NavLink, Pager, nav_links};
use crate::api::ApiError;
use crate::context::PageContext;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::Flash;
use crate::routes::flash_api_failure;
use crate::state::AppState;

/// Products table query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub q: Option<String>,
    pub page: Option<usize>,
}

/// Raw product form fields, kept as typed for re-rendering.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
}

impl ProductForm {
    fn parse(&self) -> std::result::Result<ProductInput, holycat_core::ProductFormError> {
        ProductInput::parse(
            &self.title,
            &self.description,
            &self.price,
            &self.stock,
            &self.category,
            &self.image,
        )
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price.amount().normalize().to_string(),
            stock: product.stock.to_string(),
            category: product.category.clone().unwrap_or_default(),
            image: product.image.clone().unwrap_or_default(),
        }
    }
}

/// One product row in the admin table.
pub struct AdminProductRow {
    pub id: ProductId,
    pub title: String,
    pub image: String,
    pub category: String,
    pub price: String,
    pub stock: i32,
    pub stock_class: &'static str,
}

impl From<&Product> for AdminProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            image: product.image_url().to_string(),
            category: display_category(product.category.as_deref()),
            price: product.price.to_string(),
            stock: product.stock,
            stock_class: product.stock_class(),
        }
    }
}

/// Category picker option.
pub struct CategoryOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn category_options(current: &str) -> Vec<CategoryOption> {
    let current = if current.trim().is_empty() {
        ProductCategory::default().as_str()
    } else {
        current.trim()
    };
    ProductCategory::ALL
        .iter()
        .map(|c| CategoryOption {
            value: c.as_str(),
            label: c.label(),
            selected: c.as_str() == current,
        })
        .collect()
}

/// Products table template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products.html")]
pub struct AdminProductsTemplate {
    pub ctx: PageContext,
    pub nav: Vec<NavLink>,
    pub products: Vec<AdminProductRow>,
    pub query: String,
    pub pager: Pager,
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/product_form.html")]
pub struct ProductFormTemplate {
    pub ctx: PageContext,
    pub nav: Vec<NavLink>,
    pub heading: &'static str,
    pub action: String,
    pub form: ProductForm,
    pub categories: Vec<CategoryOption>,
    pub default_image: &'static str,
    pub error: Option<String>,
}

impl ProductFormTemplate {
    fn new(ctx: PageContext, product_id: Option<ProductId>, form: ProductForm) -> Self {
        let (heading, action) = match product_id {
            Some(id) => ("Edit Produk", format!("/admin/products/{id}")),
            None => ("Tambah Produk", "/admin/products".to_string()),
        };
        Self {
            ctx,
            nav: nav_links("/admin/products"),
            heading,
            action,
            categories: category_options(&form.category),
            form,
            default_image: DEFAULT_PRODUCT_IMAGE,
            error: None,
        }
    }

    fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Display the products table.
#[instrument(skip(state, admin, ctx))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ctx: PageContext,
    Query(query): Query<ProductsQuery>,
) -> Result<impl IntoResponse> {
    tracing::debug!(admin_id = %admin.user.id, "listing products");
    let products = state.api().list_products(None, None).await?;

    let filter = ProductFilter {
        query: query.q.unwrap_or_default(),
    };
    let matched = filter.apply(&products);
    let page = Page::new(matched.len(), query.page.unwrap_or(1), DEFAULT_PER_PAGE);
    let base = format!(
        "/admin/products?q={}",
        urlencoding::encode(filter.query.trim())
    );

    Ok(AdminProductsTemplate {
        ctx,
        nav: nav_links("/admin/products"),
        products: page
            .slice(&matched)
            .iter()
            .map(AdminProductRow::from)
            .collect(),
        pager: Pager::new(&page, &base),
        query: filter.query,
    })
}

/// Display the empty create form.
#[instrument(skip(_admin, ctx))]
pub async fn new_form(RequireAdmin(_admin): RequireAdmin, ctx: PageContext) -> impl IntoResponse {
    ProductFormTemplate::new(
        ctx,
        None,
        ProductForm {
            category: ProductCategory::default().as_str().to_string(),
            ..ProductForm::default()
        },
    )
}

/// Create a product.
#[instrument(skip(state, admin, ctx, session, form), fields(title = %form.title))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ctx: PageContext,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let input = match form.parse() {
        Ok(input) => input,
        Err(e) => {
            return Ok(ProductFormTemplate::new(ctx, None, form)
                .with_error(e.to_string())
                .into_response());
        }
    };

    match state.api().create_product(&admin.token, &input).await {
        Ok(()) => {
            tracing::info!(title = %input.title, "product created");
            Flash::success("Berhasil!", "Produk berhasil ditambahkan.")
                .push(&session)
                .await;
            Ok(Redirect::to("/admin/products").into_response())
        }
        Err(e) => render_failure(ctx, None, form, e, "Gagal menambahkan produk."),
    }
}

/// Display the edit form for an existing product.
#[instrument(skip(state, _admin, ctx), fields(product_id = %id))]
pub async fn edit_form(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ctx: PageContext,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = state.api().get_product(id).await.map_err(|e| match e {
        ApiError::NotFound(_) => AppError::NotFound("Produk tidak ditemukan.".to_string()),
        other => other.into(),
    })?;

    Ok(ProductFormTemplate::new(
        ctx,
        Some(id),
        ProductForm::from(&product),
    ))
}

/// Save changes to a product.
#[instrument(skip(state, admin, ctx, session, form), fields(product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ctx: PageContext,
    session: Session,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let input = match form.parse() {
        Ok(input) => input,
        Err(e) => {
            return Ok(ProductFormTemplate::new(ctx, Some(id), form)
                .with_error(e.to_string())
                .into_response());
        }
    };

    match state.api().update_product(&admin.token, id, &input).await {
        Ok(()) => {
            tracing::info!(product_id = %id, "product updated");
            Flash::success("Berhasil!", "Produk berhasil diperbarui.")
                .push(&session)
                .await;
            Ok(Redirect::to("/admin/products").into_response())
        }
        Err(e) => render_failure(ctx, Some(id), form, e, "Gagal memperbarui produk."),
    }
}

/// Delete a product.
#[instrument(skip(state, admin, session), fields(product_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    match state.api().delete_product(&admin.token, id).await {
        Ok(()) => {
            tracing::info!(product_id = %id, "product deleted");
            Flash::success("Terhapus!", "Produk berhasil dihapus.")
                .push(&session)
                .await;
        }
        Err(e) => {
            flash_api_failure(&session, e, "Gagal", "Gagal menghapus produk.").await?;
        }
    }
    Ok(Redirect::to("/admin/products").into_response())
}

/// Re-render the form with the backend's message, unless the session expired.
fn render_failure(
    ctx: PageContext,
    product_id: Option<ProductId>,
    form: ProductForm,
    err: ApiError,
    fallback: &str,
) -> Result<Response> {
    if err.is_unauthorized() {
        return Err(err.into());
    }
    tracing::warn!(error = %err, "product save failed");
    let message = err.message_or(fallback).to_string();
    Ok(ProductFormTemplate::new(ctx, product_id, form)
        .with_error(message)
        .into_response())
}

#[cfg(test)]
mod tests {
    use holycat_core::Rupiah;

    use super::*;

    #[test]
    fn test_category_options_default_to_other() {
        let options = category_options("");
        let selected: Vec<_> = options.iter().filter(|o| o.selected).map(|o| o.value).collect();
        assert_eq!(selected, ["Produk_Lainnya"]);

        let options = category_options("Grooming");
        assert!(options.iter().any(|o| o.selected && o.value == "Grooming"));
    }

    #[test]
    fn test_form_from_product_round_trips_through_parse() {
        let product = Product {
            id: ProductId::new(4),
            title: "Vitamin Bulu".to_string(),
            description: None,
            price: Rupiah::from_i64(45_000),
            stock: 7,
            category: Some("Suplemen_dan_Vitamin".to_string()),
            image: None,
        };
        let form = ProductForm::from(&product);
        assert_eq!(form.price, "45000");

        let input = form.parse().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(input.price, product.price);
        assert_eq!(input.category, ProductCategory::SuplemenDanVitamin);
        assert_eq!(input.image, DEFAULT_PRODUCT_IMAGE);
    }

    #[test]
    fn test_form_rejects_negative_stock() {
        let form = ProductForm {
            title: "Sisir".to_string(),
            price: "10000".to_string(),
            stock: "-1".to_string(),
            ..ProductForm::default()
        };
        assert!(form.parse().is_err());
    }
}
