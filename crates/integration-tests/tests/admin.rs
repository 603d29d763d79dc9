//! Integration tests for the admin console.

use axum::http::StatusCode;
use holycat_core::{OrderStatus, PaymentMethod, ProductId, Rupiah};
use holycat_integration_tests::{
    ADMIN_EMAIL, CUSTOMER_EMAIL, GROOMING_ID, TestApp, VITAMIN_ID,
};

// =============================================================================
// Dashboard & Tables
// =============================================================================

#[tokio::test]
async fn test_dashboard_shows_totals_and_recent_orders() {
    let app = TestApp::spawn().await;
    let id = app.backend.seed_order(
        CUSTOMER_EMAIL,
        OrderStatus::Diproses,
        PaymentMethod::Cod,
    );
    let admin = app.signed_in(ADMIN_EMAIL).await;

    let page = admin.get("/admin").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Rp 63.000"));
    assert!(page.body.contains(&format!("#{id}")));
}

#[tokio::test]
async fn test_orders_table_filters_by_status() {
    let app = TestApp::spawn().await;
    let shipped = app.backend.seed_order(
        CUSTOMER_EMAIL,
        OrderStatus::Dikirim,
        PaymentMethod::Cod,
    );
    let pending = app.backend.seed_order(
        CUSTOMER_EMAIL,
        OrderStatus::MenungguPembayaran,
        PaymentMethod::BankTransfer,
    );
    let admin = app.signed_in(ADMIN_EMAIL).await;

    let page = admin.get("/admin/orders?status=Dikirim").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains(&format!("/admin/orders/{shipped}/status")));
    assert!(!page.body.contains(&format!("/admin/orders/{pending}/status")));

    // Search covers the courier and tracking number only
    let page = admin.get("/admin/orders?q=budi").await;
    assert!(!page.body.contains(&format!("/admin/orders/{shipped}/status")));
    assert!(!page.body.contains(&format!("/admin/orders/{pending}/status")));
}

// =============================================================================
// Status Changes
// =============================================================================

#[tokio::test]
async fn test_shipping_requires_courier_and_tracking() {
    let app = TestApp::spawn().await;
    let id = app.backend.seed_order(
        CUSTOMER_EMAIL,
        OrderStatus::Dikemas,
        PaymentMethod::Cod,
    );
    let admin = app.signed_in(ADMIN_EMAIL).await;
    let action = format!("/admin/orders/{id}/status");

    let page = admin
        .post(
            &action,
            &[
                ("status", "Dikirim"),
                ("courier", "JNE"),
                ("tracking_number", "  "),
                ("back", "/admin/orders?status=Dikemas"),
            ],
        )
        .await;
    assert!(page.redirects_to("/admin/orders?status=Dikemas"));
    assert_eq!(
        app.backend.order(id).map(|o| o.status),
        Some(OrderStatus::Dikemas)
    );
    let table = admin.get("/admin/orders").await;
    assert!(table.body.contains("Kurir dan Nomor Resi tidak boleh kosong"));

    let page = admin
        .post(
            &action,
            &[
                ("status", "Dikirim"),
                ("courier", "JNE"),
                ("tracking_number", "JNE0042"),
                ("back", "https://evil.example/admin/orders"),
            ],
        )
        .await;
    assert!(page.redirects_to("/admin/orders"));
    let order = app.backend.order(id);
    assert_eq!(order.as_ref().map(|o| o.status), Some(OrderStatus::Dikirim));
    assert_eq!(
        order.and_then(|o| o.tracking_number).as_deref(),
        Some("JNE0042")
    );
}

#[tokio::test]
async fn test_other_statuses_drop_shipment_fields() {
    let app = TestApp::spawn().await;
    let id = app.backend.seed_order(
        CUSTOMER_EMAIL,
        OrderStatus::Diproses,
        PaymentMethod::Cod,
    );
    let admin = app.signed_in(ADMIN_EMAIL).await;

    let page = admin
        .post(
            &format!("/admin/orders/{id}/status"),
            &[("status", "Dikemas"), ("courier", ""), ("tracking_number", "")],
        )
        .await;
    assert!(page.redirects_to("/admin/orders"));
    let order = app.backend.order(id);
    assert_eq!(order.as_ref().map(|o| o.status), Some(OrderStatus::Dikemas));
    assert_eq!(order.and_then(|o| o.tracking_number), None);
}

#[tokio::test]
async fn test_admin_cancellation_refreshes_product_stock() {
    let app = TestApp::spawn().await;
    let customer = app.signed_in(CUSTOMER_EMAIL).await;
    let product_page = format!("/products/{GROOMING_ID}");
    customer
        .post(
            "/cart/add",
            &[("product_id", GROOMING_ID.to_string().as_str()), ("quantity", "2")],
        )
        .await;
    let Some(item) = app.backend.cart_of(CUSTOMER_EMAIL).first().map(|i| i.id) else {
        panic!("cart item missing");
    };
    let items = item.to_string();
    customer
        .post(
            "/checkout",
            &[
                ("items", items.as_str()),
                ("courier", "jne"),
                ("service", "REG"),
                ("payment", "COD"),
            ],
        )
        .await;
    let page = customer.get(&product_page).await;
    assert!(page.body.contains("(3 tersedia)"));

    let Some(id) = app.backend.orders().first().map(|o| o.id) else {
        panic!("order missing");
    };
    let admin = app.signed_in(ADMIN_EMAIL).await;
    let page = admin
        .post(
            &format!("/admin/orders/{id}/status"),
            &[("status", "Dibatalkan"), ("courier", ""), ("tracking_number", "")],
        )
        .await;
    assert!(page.redirects_to("/admin/orders"));

    let page = customer.get(&product_page).await;
    assert!(page.body.contains("(5 tersedia)"));
}

#[tokio::test]
async fn test_unknown_status_is_rejected() {
    let app = TestApp::spawn().await;
    let id = app.backend.seed_order(
        CUSTOMER_EMAIL,
        OrderStatus::Diproses,
        PaymentMethod::Cod,
    );
    let admin = app.signed_in(ADMIN_EMAIL).await;

    let page = admin
        .post(&format!("/admin/orders/{id}/status"), &[("status", "Hilang")])
        .await;
    assert!(page.redirects_to("/admin/orders"));
    assert_eq!(
        app.backend.order(id).map(|o| o.status),
        Some(OrderStatus::Diproses)
    );
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_product_form_rerenders_on_invalid_input() {
    let app = TestApp::spawn().await;
    let admin = app.signed_in(ADMIN_EMAIL).await;
    let before = app.backend.products().len();

    let page = admin
        .post(
            "/admin/products",
            &[
                ("title", "Kalung Kucing"),
                ("description", "Kalung lonceng"),
                ("price", "murah"),
                ("stock", "4"),
                ("category", "Produk_Lainnya"),
                ("image", ""),
            ],
        )
        .await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Kalung Kucing"));
    assert_eq!(app.backend.products().len(), before);
}

#[tokio::test]
async fn test_create_update_and_delete_product() {
    let app = TestApp::spawn().await;
    let admin = app.signed_in(ADMIN_EMAIL).await;

    let page = admin
        .post(
            "/admin/products",
            &[
                ("title", "Kalung Kucing"),
                ("description", "Kalung lonceng"),
                ("price", "15000"),
                ("stock", "4"),
                ("category", ""),
                ("image", ""),
            ],
        )
        .await;
    assert!(page.redirects_to("/admin/products"));
    let products = app.backend.products();
    let Some(created) = products.iter().find(|p| p.title == "Kalung Kucing") else {
        panic!("product not created");
    };
    assert_eq!(created.price, Rupiah::from_i64(15_000));
    assert_eq!(created.category.as_deref(), Some("Produk_Lainnya"));
    assert_eq!(created.image.as_deref(), Some("/images/product_01.png"));
    let id = created.id;

    let edit = admin.get(&format!("/admin/products/{id}/edit")).await;
    assert_eq!(edit.status, StatusCode::OK);
    assert!(edit.body.contains("Kalung lonceng"));

    let page = admin
        .post(
            &format!("/admin/products/{id}"),
            &[
                ("title", "Kalung Kucing"),
                ("description", "Kalung lonceng"),
                ("price", "17500"),
                ("stock", "9"),
                ("category", "Grooming"),
                ("image", "/images/product_01.png"),
            ],
        )
        .await;
    assert!(page.redirects_to("/admin/products"));
    let updated = app.backend.products().into_iter().find(|p| p.id == id);
    assert_eq!(updated.as_ref().map(|p| p.stock), Some(9));
    assert_eq!(
        updated.map(|p| p.price),
        Some(Rupiah::from_i64(17_500))
    );

    let page = admin
        .post(&format!("/admin/products/{id}/delete"), &[])
        .await;
    assert!(page.redirects_to("/admin/products"));
    assert!(app.backend.products().iter().all(|p| p.id != id));
}

#[tokio::test]
async fn test_editing_missing_product_is_not_found() {
    let app = TestApp::spawn().await;
    let admin = app.signed_in(ADMIN_EMAIL).await;
    let page = admin.get("/admin/products/9999/edit").await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);

    let existing = admin
        .get(&format!("/admin/products/{}/edit", ProductId::new(VITAMIN_ID)))
        .await;
    assert_eq!(existing.status, StatusCode::OK);
}

// =============================================================================
// Reports
// =============================================================================

#[tokio::test]
async fn test_sales_report_for_today() {
    let app = TestApp::spawn().await;
    app.backend.seed_order(
        CUSTOMER_EMAIL,
        OrderStatus::Selesai,
        PaymentMethod::Cod,
    );
    app.backend.seed_order(
        CUSTOMER_EMAIL,
        OrderStatus::Dibatalkan,
        PaymentMethod::Cod,
    );
    let admin = app.signed_in(ADMIN_EMAIL).await;

    let page = admin.get("/admin/reports").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Rp 63.000"));
    assert!(page.body.contains("<meter"));

    let page = admin.get("/admin/reports?status=Dibatalkan").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Rp 0"));
}
