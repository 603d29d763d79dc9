//! Cart route handlers.
//!
//! The cart page is a single form. Every button posts the current
//! selection (hidden `selected` fields) and the typed quantities
//! (`qty_<id>` fields) so the page can be re-rendered, or the selection
//! carried through a redirect, without client-side state.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::header::REFERER,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use holycat_core::cart::{CartSelection, cart_badge_count, decrement, increment, parse_quantity};
use holycat_core::checkout::parse_item_ids;
use holycat_core::model::Cart;
use holycat_core::{CartItemId, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::flash_api_failure;
use crate::context::PageContext;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::middleware::auth::{local_redirect, signed_in};
use crate::models::Flash;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// One cart line for the template.
pub struct CartRow {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub title: String,
    pub image: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
    pub selected: bool,
    pub dirty: bool,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub ctx: PageContext,
    pub rows: Vec<CartRow>,
    pub all_selected: bool,
    pub has_selected: bool,
    pub selected_count: usize,
    pub selected_total: String,
}

/// Cart count badge fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

fn render(ctx: PageContext, cart: &Cart, selection: &CartSelection) -> CartTemplate {
    let rows = cart
        .items
        .iter()
        .map(|item| {
            let quantity = selection.display_quantity(item.id).unwrap_or(item.quantity);
            CartRow {
                id: item.id,
                product_id: item.product.id,
                title: item.product.title.clone(),
                image: item.product.image_url().to_string(),
                unit_price: item.product.price.to_string(),
                quantity,
                line_total: (item.product.price * quantity).to_string(),
                selected: selection.is_selected(item.id),
                dirty: selection.is_dirty(item.id),
            }
        })
        .collect();

    CartTemplate {
        ctx,
        rows,
        all_selected: selection.is_all_selected(),
        has_selected: selection.has_selected(),
        selected_count: selection.selected_count(),
        selected_total: selection.selected_total().to_string(),
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<String>,
}

/// Query for the cart page. `items` present (even empty) restores a
/// selection; absent selects everything.
#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub items: Option<String>,
}

/// What the cart form posted.
#[derive(Debug, Default, PartialEq, Eq)]
struct CartForm {
    selected: Vec<CartItemId>,
    quantities: Vec<(CartItemId, String)>,
    action: Option<String>,
}

impl CartForm {
    fn parse(fields: &[(String, String)]) -> Self {
        let mut form = Self::default();
        for (name, value) in fields {
            if name == "selected" {
                if let Ok(id) = value.parse() {
                    form.selected.push(id);
                }
            } else if name == "action" {
                form.action = Some(value.clone());
            } else if let Some(id) = name.strip_prefix("qty_")
                && let Ok(id) = id.parse()
            {
                form.quantities.push((id, value.clone()));
            }
        }
        form
    }

    fn quantity_for(&self, id: CartItemId) -> Option<&str> {
        self.quantities
            .iter()
            .find(|(qid, _)| *qid == id)
            .map(|(_, raw)| raw.as_str())
    }

    /// Rebuild the selection the customer was looking at.
    fn restore(&self, cart: &Cart) -> CartSelection {
        let mut selection = CartSelection::with_selected(&cart.items, &self.selected);
        for (id, raw) in &self.quantities {
            if let Ok(quantity) = parse_quantity(raw) {
                selection.set_pending_quantity(*id, quantity);
            }
        }
        selection
    }
}

/// A re-render button on the cart form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectAction {
    Toggle(CartItemId),
    SelectAll,
    SelectNone,
    Increment(CartItemId),
    Decrement(CartItemId),
}

impl SelectAction {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "all" => return Some(Self::SelectAll),
            "none" => return Some(Self::SelectNone),
            _ => {}
        }
        let (verb, id) = raw.split_once(':')?;
        let id = id.parse().ok()?;
        match verb {
            "toggle" => Some(Self::Toggle(id)),
            "inc" => Some(Self::Increment(id)),
            "dec" => Some(Self::Decrement(id)),
            _ => None,
        }
    }

    fn apply(self, selection: &mut CartSelection) {
        match self {
            Self::Toggle(id) => selection.toggle(id),
            Self::SelectAll => selection.set_all(true),
            Self::SelectNone => selection.set_all(false),
            Self::Increment(id) => {
                if let Some(q) = selection.display_quantity(id) {
                    selection.set_pending_quantity(id, increment(q));
                }
            }
            Self::Decrement(id) => {
                if let Some(q) = selection.display_quantity(id) {
                    selection.set_pending_quantity(id, decrement(q));
                }
            }
        }
    }
}

/// `/cart?items=…` keeping the given selection.
fn cart_url(selected: &[CartItemId]) -> String {
    let ids = selected
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("/cart?items={ids}")
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(state, signed_in, ctx))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    ctx: PageContext,
    Query(query): Query<CartQuery>,
) -> Result<impl IntoResponse> {
    let cart = state.api().get_cart(&signed_in.token).await?;
    let selection = match query.items.as_deref() {
        Some(raw) => CartSelection::with_selected(&cart.items, &parse_item_ids(raw)),
        None => CartSelection::all_selected(&cart.items),
    };
    Ok(render(ctx, &cart, &selection))
}

/// Re-render the cart after a selection or pending-quantity change.
#[instrument(skip(state, signed_in, ctx, fields))]
pub async fn select(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    ctx: PageContext,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<impl IntoResponse> {
    let form = CartForm::parse(&fields);
    let cart = state.api().get_cart(&signed_in.token).await?;
    let mut selection = form.restore(&cart);
    if let Some(action) = form.action.as_deref().and_then(SelectAction::parse) {
        action.apply(&mut selection);
    }
    Ok(render(ctx, &cart, &selection))
}

/// Add a product to the cart.
#[instrument(skip(state, signed_in, session, headers, form), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product_page = format!("/products/{}", form.product_id);
    let back = headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|r| url::Url::parse(r).ok())
        .map_or_else(|| product_page.clone(), |u| local_redirect(Some(u.path())).to_string());

    let quantity = match form.quantity.as_deref().map(parse_quantity) {
        None => 1,
        Some(Ok(q)) => q,
        Some(Err(e)) => {
            Flash::error("Input tidak valid", e.to_string())
                .push(&session)
                .await;
            return Ok(Redirect::to(&back).into_response());
        }
    };

    match state.api().get_product(form.product_id).await {
        Ok(product) if !product.in_stock() => {
            Flash::warning("Stok Habis", "Produk ini sedang tidak tersedia.")
                .push(&session)
                .await;
            return Ok(Redirect::to(&back).into_response());
        }
        Ok(_) => {}
        Err(e) => {
            flash_api_failure(&session, e, "Gagal", "Gagal menambahkan ke keranjang.").await?;
            return Ok(Redirect::to(&back).into_response());
        }
    }

    match state
        .api()
        .add_to_cart(&signed_in.token, form.product_id, quantity)
        .await
    {
        Ok(()) => {
            add_breadcrumb(
                "cart",
                "Added product",
                Some(&[("product_id", form.product_id.to_string().as_str())]),
            );
            Flash::success("Sukses", "Produk berhasil ditambahkan ke keranjang!")
                .push(&session)
                .await;
        }
        Err(e) => {
            flash_api_failure(&session, e, "Gagal", "Gagal menambahkan ke keranjang.").await?;
        }
    }

    Ok(Redirect::to(&back).into_response())
}

/// Commit the typed quantity of one item.
#[instrument(skip(state, signed_in, session, fields), fields(cart_item_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    session: Session,
    Path(id): Path<CartItemId>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let form = CartForm::parse(&fields);

    match parse_quantity(form.quantity_for(id).unwrap_or_default()) {
        Err(e) => {
            Flash::error("Input tidak valid", e.to_string())
                .push(&session)
                .await;
        }
        Ok(quantity) => match state
            .api()
            .update_cart_item(&signed_in.token, id, quantity)
            .await
        {
            Ok(()) => {
                Flash::success("Sukses", "Kuantitas keranjang berhasil diperbarui!")
                    .push(&session)
                    .await;
            }
            Err(e) => {
                flash_api_failure(&session, e, "Gagal", "Gagal memperbarui kuantitas.").await?;
            }
        },
    }

    Ok(Redirect::to(&cart_url(&form.selected)).into_response())
}

/// Remove one item from the cart.
#[instrument(skip(state, signed_in, session, fields), fields(cart_item_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    session: Session,
    Path(id): Path<CartItemId>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let mut form = CartForm::parse(&fields);

    match state.api().remove_cart_item(&signed_in.token, id).await {
        Ok(()) => {
            form.selected.retain(|selected| *selected != id);
            Flash::info("Dihapus", "Item berhasil dihapus dari keranjang.")
                .push(&session)
                .await;
        }
        Err(e) => {
            flash_api_failure(&session, e, "Gagal", "Gagal menghapus item.").await?;
        }
    }

    Ok(Redirect::to(&cart_url(&form.selected)).into_response())
}

/// Continue to checkout with the selected items.
#[instrument(skip(state, signed_in, session, fields))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    session: Session,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let form = CartForm::parse(&fields);
    let cart = state.api().get_cart(&signed_in.token).await?;
    let selection = CartSelection::with_selected(&cart.items, &form.selected);

    let Some(query) = selection.checkout_query() else {
        Flash::warning("Pilih Item", "Pilih setidaknya satu item untuk checkout.")
            .push(&session)
            .await;
        return Ok(Redirect::to(&cart_url(&[])).into_response());
    };

    Ok(Redirect::to(&format!("/checkout?{query}")).into_response())
}

/// Cart count badge fragment.
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let count = match signed_in(&session).await {
        Some(signed_in) => state
            .api()
            .get_cart(&signed_in.token)
            .await
            .map(|cart| cart_badge_count(&cart.items))
            .unwrap_or(0),
        None => 0,
    };
    CartCountTemplate { count }
}
