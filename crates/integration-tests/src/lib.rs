//! Integration test harness for the HolyCat storefront.
//!
//! Each test spawns two servers on ephemeral ports:
//!
//! - a [`FakeBackend`]: an in-memory axum imitation of the HolyCat backend
//!   API with seeded users, products and orders
//! - the real storefront router, configured to talk to that backend
//!
//! and drives the storefront with a [`Browser`]: a `reqwest` client with a
//! cookie store that never follows redirects, so tests can assert on
//! `Location` headers.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p holycat-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::Utc;
use holycat_core::checkout::CreateOrderRequest;
use holycat_core::model::{
    Cart, CartItem, Order, OrderItem, OrderProduct, OrderUser, Product, ShippingOption, User,
};
use holycat_core::order::StatusUpdate;
use holycat_core::report::{AdminStats, ReportSummary, SalesReport};
use holycat_core::{
    CartItemId, OrderId, OrderItemId, OrderStatus, PaymentMethod, ProductId, ProductInput, Rupiah,
    UserId, UserRole,
};
use holycat_storefront::config::StorefrontConfig;
use holycat_storefront::state::AppState;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

/// Seeded customer with a complete shipping address.
pub const CUSTOMER_EMAIL: &str = "budi@example.com";
/// Seeded administrator.
pub const ADMIN_EMAIL: &str = "admin@holycat.id";
/// Seeded account that still has to verify its email.
pub const UNVERIFIED_EMAIL: &str = "sari@example.com";
/// Password of every seeded account.
pub const PASSWORD: &str = "rahasia123";
/// The OTP the fake backend accepts.
pub const OTP_CODE: &str = "123456";

/// Seeded product with plenty of stock.
pub const VITAMIN_ID: i32 = 1;
/// Seeded product with no stock.
pub const SOLD_OUT_ID: i32 = 2;
/// Seeded product with a handful left.
pub const GROOMING_ID: i32 = 3;

/// Where the fake gateway sends customers to pay.
pub const GATEWAY_URL: &str = "https://gateway.example/snap/pay";

// =============================================================================
// Fake Backend State
// =============================================================================

struct Account {
    user: User,
    password: String,
    verified: bool,
}

/// Everything the fake backend stores.
struct BackendState {
    accounts: Vec<Account>,
    tokens: HashMap<String, UserId>,
    products: Vec<Product>,
    carts: HashMap<UserId, Vec<CartItem>>,
    orders: Vec<(UserId, Order)>,
    proofs: HashMap<OrderId, usize>,
    reserved: HashMap<OrderId, Vec<(ProductId, u32)>>,
    next_id: i32,
}

impl BackendState {
    fn seeded() -> Self {
        let account = |id: i32, name: &str, email: &str, role: UserRole, verified: bool| Account {
            user: User {
                id: UserId::new(id),
                name: name.to_string(),
                email: email.to_string(),
                phone: Some("08123456789".to_string()),
                city: Some("Bandung".to_string()),
                address: Some("Jl. Merdeka No. 1".to_string()),
                role,
            },
            password: PASSWORD.to_string(),
            verified,
        };
        let product = |id: i32, title: &str, price: i64, stock: i32, category: &str| Product {
            id: ProductId::new(id),
            title: title.to_string(),
            description: Some(format!("{title} untuk kucing kesayangan.")),
            price: Rupiah::from_i64(price),
            stock,
            category: Some(category.to_string()),
            image: None,
        };

        Self {
            accounts: vec![
                account(1, "Budi Santoso", CUSTOMER_EMAIL, UserRole::User, true),
                account(2, "Admin HolyCat", ADMIN_EMAIL, UserRole::Admin, true),
                account(3, "Sari Dewi", UNVERIFIED_EMAIL, UserRole::User, false),
            ],
            tokens: HashMap::new(),
            products: vec![
                product(VITAMIN_ID, "Vitamin Bulu Kucing", 45_000, 25, "Suplemen_dan_Vitamin"),
                product(SOLD_OUT_ID, "Obat Cacing", 30_000, 0, "Obat"),
                product(GROOMING_ID, "Sisir Grooming", 25_000, 5, "Grooming"),
            ],
            carts: HashMap::new(),
            orders: Vec::new(),
            proofs: HashMap::new(),
            reserved: HashMap::new(),
            next_id: 100,
        }
    }

    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn account(&self, id: UserId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.user.id == id)
    }

    fn issue_token(&mut self, id: UserId) -> String {
        let token = format!("token-{}-{}", id, self.next_id());
        self.tokens.insert(token.clone(), id);
        token
    }

    fn adjust_stock(&mut self, id: ProductId, delta: i64) {
        if let Some(product) = self.products.iter_mut().find(|p| p.id == id) {
            let stock = i64::from(product.stock).saturating_add(delta).max(0);
            product.stock = i32::try_from(stock).unwrap_or(i32::MAX);
        }
    }

    /// Put a cancelled order's units back on the shelf.
    fn restock(&mut self, order: OrderId) {
        for (product, quantity) in self.reserved.remove(&order).unwrap_or_default() {
            self.adjust_stock(product, i64::from(quantity));
        }
    }

    fn order_mut(&mut self, owner: UserId, id: OrderId) -> Result<&mut Order, Response> {
        match self.orders.iter_mut().find(|(_, o)| o.id == id) {
            Some((user, order)) if *user == owner => Ok(order),
            Some(_) => Err(error(StatusCode::FORBIDDEN, "Akses ditolak")),
            None => Err(error(StatusCode::NOT_FOUND, "Pesanan tidak ditemukan")),
        }
    }
}

/// Handle on a running fake backend.
#[derive(Clone)]
pub struct FakeBackend {
    pub url: String,
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    /// Spawn a seeded backend on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        let state = Arc::new(Mutex::new(BackendState::seeded()));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("fake backend address");

        let app = backend_router().with_state(Arc::clone(&state));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed an order for the user with `email` and return its id.
    ///
    /// # Panics
    ///
    /// Panics if no account has that email.
    pub fn seed_order(&self, email: &str, status: OrderStatus, payment: PaymentMethod) -> OrderId {
        let mut state = self.lock();
        let account = state
            .accounts
            .iter()
            .find(|a| a.user.email == email)
            .expect("seeded account");
        let owner = account.user.id;
        let user = order_user(&account.user);
        let id = OrderId::new(state.next_id());
        let item_id = OrderItemId::new(state.next_id());

        state.orders.push((
            owner,
            Order {
                id,
                status,
                payment_method: Some(payment),
                total: Rupiah::from_i64(63_000),
                created_at: Utc::now(),
                user: Some(user),
                items: vec![OrderItem {
                    id: item_id,
                    quantity: 1,
                    price: Rupiah::from_i64(45_000),
                    product: Some(OrderProduct {
                        title: Some("Vitamin Bulu Kucing".to_string()),
                        image: None,
                    }),
                }],
                courier: None,
                tracking_number: None,
                shipped_at: None,
                payment_proof_url: None,
            },
        ));
        id
    }

    /// Current copy of an order.
    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.lock()
            .orders
            .iter()
            .find(|(_, o)| o.id == id)
            .map(|(_, o)| o.clone())
    }

    /// Every order, oldest first.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.lock().orders.iter().map(|(_, o)| o.clone()).collect()
    }

    /// The cart of the user with `email`.
    #[must_use]
    pub fn cart_of(&self, email: &str) -> Vec<CartItem> {
        let state = self.lock();
        state
            .accounts
            .iter()
            .find(|a| a.user.email == email)
            .and_then(|a| state.carts.get(&a.user.id))
            .cloned()
            .unwrap_or_default()
    }

    /// Every product in the catalog.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.lock().products.clone()
    }

    /// Add a product to the catalog and return its id.
    pub fn add_product(&self, title: &str, stock: i32) -> ProductId {
        let mut state = self.lock();
        let id = ProductId::new(state.next_id());
        state.products.push(Product {
            id,
            title: title.to_string(),
            description: None,
            price: Rupiah::from_i64(10_000),
            stock,
            category: Some("Produk_Lainnya".to_string()),
            image: None,
        });
        id
    }

    /// Units of a product the backend still has.
    #[must_use]
    pub fn stock_of(&self, id: ProductId) -> Option<i32> {
        self.lock()
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.stock)
    }

    /// Size of the proof uploaded for an order, if any.
    #[must_use]
    pub fn proof_size(&self, id: OrderId) -> Option<usize> {
        self.lock().proofs.get(&id).copied()
    }

    /// Invalidate every issued token, as if they all expired.
    pub fn expire_tokens(&self) {
        self.lock().tokens.clear();
    }
}

type Shared = Arc<Mutex<BackendState>>;

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn order_user(user: &User) -> OrderUser {
    OrderUser {
        name: user.name.clone(),
        email: Some(user.email.clone()),
        phone: user.phone.clone(),
        address: user.address.clone(),
        city: user.city.clone(),
    }
}

/// The user behind the bearer token.
fn authenticate(state: &BackendState, headers: &HeaderMap) -> Result<UserId, Response> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| state.tokens.get(token).copied())
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Token tidak valid"))
}

fn authenticate_admin(state: &BackendState, headers: &HeaderMap) -> Result<UserId, Response> {
    let id = authenticate(state, headers)?;
    match state.account(id) {
        Some(account) if account.user.is_admin() => Ok(id),
        _ => Err(error(StatusCode::FORBIDDEN, "Khusus admin")),
    }
}

// =============================================================================
// Fake Backend Routes
// =============================================================================

fn backend_router() -> Router<Shared> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/cart", get(get_cart))
        .route("/cart/add", post(add_to_cart))
        .route("/cart/update/{id}", put(update_cart_item))
        .route("/cart/remove/{id}", delete(remove_cart_item))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/verify-register", post(verify_register))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
        .route("/user/profile", put(update_profile))
        .route("/api/shipping/cost", post(shipping_cost))
        .route("/orders", get(list_orders))
        .route("/orders/create", post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/cancel", put(cancel_order))
        .route("/orders/{id}/receive", put(receive_order))
        .route("/orders/{id}/submit-proof", put(submit_proof))
        .route("/payments/create", post(create_payment))
        .route("/admin/stats", get(admin_stats))
        .route("/admin/orders", get(admin_orders))
        .route("/admin/orders/{id}/status", put(admin_update_status))
        .route("/admin/reports/orders", get(admin_report))
}

#[derive(Deserialize)]
struct ProductQuery {
    search: Option<String>,
    category: Option<String>,
}

async fn list_products(
    State(state): State<Shared>,
    Query(query): Query<ProductQuery>,
) -> Json<Vec<Product>> {
    let state = lock(&state);
    let search = query.search.unwrap_or_default().to_lowercase();
    let products = state
        .products
        .iter()
        .filter(|p| search.is_empty() || p.title.to_lowercase().contains(&search))
        .filter(|p| {
            query
                .category
                .as_deref()
                .is_none_or(|c| p.category.as_deref() == Some(c))
        })
        .cloned()
        .collect();
    Json(products)
}

async fn get_product(State(state): State<Shared>, Path(id): Path<ProductId>) -> Response {
    let state = lock(&state);
    match state.products.iter().find(|p| p.id == id) {
        Some(product) => Json(product.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Produk tidak ditemukan"),
    }
}

fn product_from_input(id: ProductId, input: ProductInput) -> Product {
    Product {
        id,
        title: input.title,
        description: Some(input.description),
        price: input.price,
        stock: input.stock,
        category: Some(input.category.as_str().to_string()),
        image: Some(input.image),
    }
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(input): Json<ProductInput>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authenticate_admin(&state, &headers) {
        return response;
    }
    let id = ProductId::new(state.next_id());
    state.products.push(product_from_input(id, input));
    (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
}

async fn update_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authenticate_admin(&state, &headers) {
        return response;
    }
    match state.products.iter_mut().find(|p| p.id == id) {
        Some(product) => {
            *product = product_from_input(id, input);
            Json(json!({ "message": "Produk diperbarui" })).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Produk tidak ditemukan"),
    }
}

async fn delete_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authenticate_admin(&state, &headers) {
        return response;
    }
    state.products.retain(|p| p.id != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    Json(Cart {
        items: state.carts.get(&user).cloned().unwrap_or_default(),
    })
    .into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddToCart {
    product_id: ProductId,
    quantity: u32,
}

async fn add_to_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddToCart>,
) -> Response {
    let mut state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let Some(product) = state.products.iter().find(|p| p.id == body.product_id).cloned() else {
        return error(StatusCode::NOT_FOUND, "Produk tidak ditemukan");
    };
    if product.stock <= 0 {
        return error(StatusCode::BAD_REQUEST, "Stok habis");
    }

    let item_id = CartItemId::new(state.next_id());
    let cart = state.carts.entry(user).or_default();
    if let Some(existing) = cart.iter_mut().find(|i| i.product.id == body.product_id) {
        existing.quantity += body.quantity;
    } else {
        cart.push(CartItem {
            id: item_id,
            quantity: body.quantity,
            product,
        });
    }
    Json(json!({ "message": "Ditambahkan" })).into_response()
}

#[derive(Deserialize)]
struct UpdateQuantity {
    quantity: u32,
}

async fn update_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<CartItemId>,
    Json(body): Json<UpdateQuantity>,
) -> Response {
    let mut state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let item = state
        .carts
        .get_mut(&user)
        .and_then(|cart| cart.iter_mut().find(|i| i.id == id));
    match item {
        Some(item) if i64::from(body.quantity) > i64::from(item.product.stock) => {
            error(StatusCode::BAD_REQUEST, "Stok tidak cukup")
        }
        Some(item) => {
            item.quantity = body.quantity;
            Json(json!({ "message": "Diperbarui" })).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Item tidak ditemukan"),
    }
}

async fn remove_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<CartItemId>,
) -> Response {
    let mut state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Some(cart) = state.carts.get_mut(&user) {
        cart.retain(|i| i.id != id);
    }
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<Credentials>) -> Response {
    let mut state = lock(&state);
    let Some(account) = state
        .accounts
        .iter()
        .find(|a| a.user.email == body.email && a.password == body.password)
    else {
        return error(StatusCode::UNAUTHORIZED, "Email atau password salah");
    };
    if !account.verified {
        return Json(json!({
            "requireVerify": true,
            "message": "Akun belum terverifikasi. Kode OTP telah dikirim."
        }))
        .into_response();
    }
    let id = account.user.id;
    let token = state.issue_token(id);
    (
        [(header::SET_COOKIE, format!("token={token}; HttpOnly; Path=/"))],
        Json(json!({ "message": "Login berhasil" })),
    )
        .into_response()
}

#[derive(Deserialize)]
struct Registration {
    name: String,
    email: String,
    password: String,
    phone: String,
    city: String,
    address: String,
}

async fn register(State(state): State<Shared>, Json(body): Json<Registration>) -> Response {
    let mut state = lock(&state);
    if state.accounts.iter().any(|a| a.user.email == body.email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "errors": [{ "msg": "Email sudah terdaftar", "param": "email" }] })),
        )
            .into_response();
    }
    let id = UserId::new(state.next_id());
    state.accounts.push(Account {
        user: User {
            id,
            name: body.name,
            email: body.email,
            phone: Some(body.phone),
            city: Some(body.city),
            address: Some(body.address),
            role: UserRole::User,
        },
        password: body.password,
        verified: false,
    });
    (
        StatusCode::CREATED,
        Json(json!({ "requireOtp": true, "message": "Kode OTP telah dikirim ke email Anda." })),
    )
        .into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Otp {
    email: String,
    otp_code: String,
}

async fn verify_register(State(state): State<Shared>, Json(body): Json<Otp>) -> Response {
    let mut state = lock(&state);
    if body.otp_code != OTP_CODE {
        return error(StatusCode::BAD_REQUEST, "Kode OTP salah");
    }
    let Some(account) = state.accounts.iter_mut().find(|a| a.user.email == body.email) else {
        return error(StatusCode::NOT_FOUND, "Akun tidak ditemukan");
    };
    account.verified = true;
    let id = account.user.id;
    let token = state.issue_token(id);
    Json(json!({ "token": token })).into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    match authenticate(&state, &headers).map(|id| state.account(id)) {
        Ok(Some(account)) => Json(account.user.clone()).into_response(),
        Ok(None) => error(StatusCode::NOT_FOUND, "Akun tidak ditemukan"),
        Err(response) => response,
    }
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        state.tokens.remove(token);
    }
    Json(json!({ "message": "Logout berhasil" })).into_response()
}

#[derive(Deserialize)]
struct Profile {
    name: String,
    phone: String,
    city: String,
    address: String,
}

async fn update_profile(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Profile>,
) -> Response {
    let mut state = lock(&state);
    let id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Some(account) = state.accounts.iter_mut().find(|a| a.user.id == id) else {
        return error(StatusCode::NOT_FOUND, "Akun tidak ditemukan");
    };
    account.user.name = body.name;
    account.user.phone = Some(body.phone);
    account.user.city = Some(body.city);
    account.user.address = Some(body.address);
    Json(account.user.clone()).into_response()
}

#[derive(Deserialize)]
struct ShippingQuote {
    courier: String,
    city: String,
}

async fn shipping_cost(Json(body): Json<ShippingQuote>) -> Response {
    if body.city.trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, "Kota tujuan wajib diisi");
    }
    let options = match body.courier.as_str() {
        "jne" => vec![
            ShippingOption {
                service: "REG".to_string(),
                description: "Layanan Reguler".to_string(),
                etd: "2-3".to_string(),
                cost: Rupiah::from_i64(18_000),
            },
            ShippingOption {
                service: "YES".to_string(),
                description: "Yakin Esok Sampai".to_string(),
                etd: "1".to_string(),
                cost: Rupiah::from_i64(32_000),
            },
        ],
        "jnt" => vec![ShippingOption {
            service: "EZ".to_string(),
            description: "Regular".to_string(),
            etd: "2-4".to_string(),
            cost: Rupiah::from_i64(16_000),
        }],
        _ => return error(StatusCode::BAD_REQUEST, "Kurir tidak didukung"),
    };
    Json(options).into_response()
}

async fn list_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let orders: Vec<Order> = state
        .orders
        .iter()
        .filter(|(owner, _)| *owner == user)
        .map(|(_, o)| o.clone())
        .collect();
    Json(orders).into_response()
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<CreateOrderRequest>,
) -> Response {
    let mut state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let cart = state.carts.get(&user).cloned().unwrap_or_default();
    let chosen: Vec<CartItem> = cart
        .iter()
        .filter(|i| body.cart_item_ids.contains(&i.id))
        .cloned()
        .collect();
    if chosen.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Tidak ada item yang dipilih");
    }

    let buyer = state.account(user).map(|a| order_user(&a.user));
    let id = OrderId::new(state.next_id());
    let mut items = Vec::new();
    for item in &chosen {
        items.push(OrderItem {
            id: OrderItemId::new(state.next_id()),
            quantity: item.quantity,
            price: item.product.price,
            product: Some(OrderProduct {
                title: Some(item.product.title.clone()),
                image: item.product.image.clone(),
            }),
        });
    }
    let subtotal: Rupiah = chosen.iter().map(CartItem::line_total).sum();
    let status = if body.payment_method == PaymentMethod::Cod {
        OrderStatus::Diproses
    } else {
        OrderStatus::MenungguPembayaran
    };

    state.orders.push((
        user,
        Order {
            id,
            status,
            payment_method: Some(body.payment_method),
            total: subtotal + body.shipping_cost,
            created_at: Utc::now(),
            user: buyer,
            items,
            courier: Some(body.courier_service),
            tracking_number: None,
            shipped_at: None,
            payment_proof_url: None,
        },
    ));
    if let Some(cart) = state.carts.get_mut(&user) {
        cart.retain(|i| !body.cart_item_ids.contains(&i.id));
    }
    let reserved: Vec<(ProductId, u32)> = chosen
        .iter()
        .map(|i| (i.product.id, i.quantity))
        .collect();
    for &(product, quantity) in &reserved {
        state.adjust_stock(product, -i64::from(quantity));
    }
    state.reserved.insert(id, reserved);

    (StatusCode::CREATED, Json(json!({ "orderId": id }))).into_response()
}

async fn get_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
) -> Response {
    let mut state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match state.order_mut(user, id) {
        Ok(order) => Json(order.clone()).into_response(),
        Err(response) => response,
    }
}

async fn cancel_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
) -> Response {
    let response = transition(&state, &headers, id, |order| {
        matches!(
            order.status,
            OrderStatus::MenungguPembayaran | OrderStatus::Diproses
        )
        .then_some(OrderStatus::Dibatalkan)
    });
    if response.status().is_success() {
        lock(&state).restock(id);
    }
    response
}

async fn receive_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
) -> Response {
    transition(&state, &headers, id, |order| {
        (order.status == OrderStatus::Dikirim).then_some(OrderStatus::Selesai)
    })
}

fn transition(
    state: &Shared,
    headers: &HeaderMap,
    id: OrderId,
    next: impl FnOnce(&Order) -> Option<OrderStatus>,
) -> Response {
    let mut state = lock(state);
    let user = match authenticate(&state, headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let order = match state.order_mut(user, id) {
        Ok(order) => order,
        Err(response) => return response,
    };
    match next(order) {
        Some(status) => {
            order.status = status;
            Json(json!({ "message": "Status diperbarui" })).into_response()
        }
        None => error(StatusCode::BAD_REQUEST, "Status pesanan tidak sesuai"),
    }
}

async fn submit_proof(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
    mut multipart: Multipart,
) -> Response {
    let mut size = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("proofImage") {
            size = field.bytes().await.ok().map(|b| b.len());
        }
    }
    let Some(size) = size else {
        return error(StatusCode::BAD_REQUEST, "File bukti wajib diunggah");
    };

    let mut state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match state.order_mut(user, id) {
        Ok(order) => {
            order.payment_proof_url = Some(format!("/uploads/proof-{id}.png"));
        }
        Err(response) => return response,
    }
    state.proofs.insert(id, size);
    Json(json!({ "message": "Bukti diterima" })).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRequest {
    order_id: OrderId,
}

async fn create_payment(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<PaymentRequest>,
) -> Response {
    let mut state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match state.order_mut(user, body.order_id) {
        Ok(order) if order.status == OrderStatus::MenungguPembayaran => Json(json!({
            "token": format!("snap-{}", body.order_id),
            "redirect_url": format!("{GATEWAY_URL}/{}", body.order_id),
        }))
        .into_response(),
        Ok(_) => error(StatusCode::BAD_REQUEST, "Pesanan tidak menunggu pembayaran"),
        Err(response) => response,
    }
}

async fn admin_stats(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if let Err(response) = authenticate_admin(&state, &headers) {
        return response;
    }
    let orders: Vec<Order> = state.orders.iter().map(|(_, o)| o.clone()).collect();
    Json(AdminStats {
        total_users: u64::try_from(state.accounts.len()).unwrap_or_default(),
        total_revenue: orders
            .iter()
            .filter(|o| o.status.counts_as_revenue())
            .map(|o| o.total)
            .sum(),
        total_orders: u64::try_from(orders.len()).unwrap_or_default(),
        total_products: u64::try_from(state.products.len()).unwrap_or_default(),
        recent_orders: orders,
    })
    .into_response()
}

async fn admin_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if let Err(response) = authenticate_admin(&state, &headers) {
        return response;
    }
    let orders: Vec<Order> = state.orders.iter().map(|(_, o)| o.clone()).collect();
    Json(orders).into_response()
}

async fn admin_update_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
    Json(update): Json<StatusUpdate>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authenticate_admin(&state, &headers) {
        return response;
    }
    let Some((_, order)) = state.orders.iter_mut().find(|(_, o)| o.id == id) else {
        return error(StatusCode::NOT_FOUND, "Pesanan tidak ditemukan");
    };
    order.status = update.status;
    if update.status == OrderStatus::Dikirim {
        order.courier = update.courier;
        order.tracking_number = update.tracking_number;
        order.shipped_at = Some(Utc::now());
    }
    if update.status == OrderStatus::Dibatalkan {
        state.restock(id);
    }
    Json(json!({ "message": "Status diperbarui" })).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportParams {
    start_date: String,
    end_date: String,
    status: String,
}

async fn admin_report(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Response {
    let state = lock(&state);
    if let Err(response) = authenticate_admin(&state, &headers) {
        return response;
    }
    let in_window = |order: &Order| {
        let day = order.created_at.format("%Y-%m-%d").to_string();
        day >= params.start_date && day <= params.end_date
    };
    let orders: Vec<Order> = state
        .orders
        .iter()
        .map(|(_, o)| o)
        .filter(|o| in_window(o))
        .filter(|o| params.status == "ALL" || o.status.as_str() == params.status)
        .cloned()
        .collect();
    let total_revenue = orders
        .iter()
        .filter(|o| o.status.counts_as_revenue())
        .map(|o| o.total)
        .sum();

    Json(SalesReport {
        summary: ReportSummary {
            total_orders: u64::try_from(orders.len()).unwrap_or_default(),
            total_revenue,
        },
        orders,
    })
    .into_response()
}

// =============================================================================
// Storefront Under Test
// =============================================================================

/// A running storefront wired to a fake backend.
pub struct TestApp {
    pub url: String,
    pub backend: FakeBackend,
}

impl TestApp {
    /// Spawn a fake backend and a storefront that talks to it.
    ///
    /// # Panics
    ///
    /// Panics if either server cannot start.
    pub async fn spawn() -> Self {
        let backend = FakeBackend::spawn().await;

        let api_url = backend.url.clone();
        let config = StorefrontConfig::from_vars(|key| match key {
            "HOLYCAT_API_URL" => Some(api_url.clone()),
            "HOLYCAT_API_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        })
        .expect("test configuration");

        let state = AppState::new(config).expect("storefront state");
        let app = holycat_storefront::app(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind storefront");
        let addr = listener.local_addr().expect("storefront address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: format!("http://{addr}"),
            backend,
        }
    }

    /// A fresh visitor with an empty cookie jar.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn browser(&self) -> Browser {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("test client");
        Browser {
            client,
            base: self.url.clone(),
        }
    }

    /// A visitor already signed in as `email`.
    pub async fn signed_in(&self, email: &str) -> Browser {
        let browser = self.browser();
        browser.login(email, PASSWORD).await;
        browser
    }
}

/// One visitor's HTTP session against the storefront.
pub struct Browser {
    client: reqwest::Client,
    base: String,
}

/// A fetched response with its body read.
pub struct Page {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl Page {
    async fn read(response: reqwest::Response) -> Self {
        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();
        Self {
            status,
            location,
            body,
        }
    }

    /// Whether this is a 303 to `target`.
    #[must_use]
    pub fn redirects_to(&self, target: &str) -> bool {
        self.status == StatusCode::SEE_OTHER && self.location.as_deref() == Some(target)
    }
}

impl Browser {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// GET a page.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot be reached.
    pub async fn get(&self, path: &str) -> Page {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET storefront");
        Page::read(response).await
    }

    /// POST a urlencoded form.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot be reached.
    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> Page {
        let response = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST storefront");
        Page::read(response).await
    }

    /// POST a urlencoded form with a `Referer` header.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot be reached.
    pub async fn post_from(&self, referer: &str, path: &str, form: &[(&str, &str)]) -> Page {
        let response = self
            .client
            .post(self.url(path))
            .header(reqwest::header::REFERER, self.url(referer))
            .form(form)
            .send()
            .await
            .expect("POST storefront");
        Page::read(response).await
    }

    /// POST a multipart form with one file field.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot be reached.
    pub async fn upload(
        &self,
        path: &str,
        field: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Page {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name("bukti.png")
            .mime_str(content_type)
            .expect("mime type");
        let form = reqwest::multipart::Form::new().part(field.to_string(), part);
        let response = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("POST storefront");
        Page::read(response).await
    }

    /// Sign in through the login form.
    ///
    /// # Panics
    ///
    /// Panics if the login does not redirect.
    pub async fn login(&self, email: &str, password: &str) -> Page {
        let page = self
            .post("/login", &[("email", email), ("password", password)])
            .await;
        assert_eq!(page.status, StatusCode::SEE_OTHER, "login should redirect");
        page
    }
}
