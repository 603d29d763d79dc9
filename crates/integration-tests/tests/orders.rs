//! Integration tests for order history and order actions.

use axum::http::StatusCode;
use holycat_core::{OrderStatus, PaymentMethod};
use holycat_integration_tests::{ADMIN_EMAIL, CUSTOMER_EMAIL, GATEWAY_URL, TestApp};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];

#[tokio::test]
async fn test_order_history_lists_own_orders() {
    let app = TestApp::spawn().await;
    let id = app.backend.seed_order(
        CUSTOMER_EMAIL,
        OrderStatus::Diproses,
        PaymentMethod::Cod,
    );
    let browser = app.signed_in(CUSTOMER_EMAIL).await;

    let page = browser.get("/orders").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains(&format!("/order/{id}")));
    assert!(page.body.contains("Vitamin Bulu Kucing"));
}

#[tokio::test]
async fn test_someone_elses_order_is_forbidden() {
    let app = TestApp::spawn().await;
    let id = app.backend.seed_order(
        CUSTOMER_EMAIL,
        OrderStatus::Diproses,
        PaymentMethod::Cod,
    );
    let other = app.signed_in(ADMIN_EMAIL).await;

    let page = other.get(&format!("/order/{id}")).await;
    assert_eq!(page.status, StatusCode::FORBIDDEN);

    let page = other.get("/order/4040").await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancel_pending_order() {
    let app = TestApp::spawn().await;
    let id = app.backend.seed_order(
        CUSTOMER_EMAIL,
        OrderStatus::MenungguPembayaran,
        PaymentMethod::BankTransfer,
    );
    let browser = app.signed_in(CUSTOMER_EMAIL).await;

    let detail = browser.get(&format!("/order/{id}")).await;
    assert!(detail.body.contains(&format!("/order/{id}/cancel")));

    let page = browser.post(&format!("/order/{id}/cancel"), &[]).await;
    assert!(page.redirects_to(&format!("/order/{id}")));
    assert_eq!(
        app.backend.order(id).map(|o| o.status),
        Some(OrderStatus::Dibatalkan)
    );

    let detail = browser.get(&format!("/order/{id}")).await;
    assert!(detail.body.contains("Pesanan Anda telah berhasil dibatalkan."));
    assert!(!detail.body.contains(&format!("/order/{id}/cancel")));
}

#[tokio::test]
async fn test_cancel_refused_by_backend_is_flashed() {
    let app = TestApp::spawn().await;
    let id = app.backend.seed_order(
        CUSTOMER_EMAIL,
        OrderStatus::Dikirim,
        PaymentMethod::Cod,
    );
    let browser = app.signed_in(CUSTOMER_EMAIL).await;

    let page = browser.post(&format!("/order/{id}/cancel"), &[]).await;
    assert!(page.redirects_to(&format!("/order/{id}")));
    assert_eq!(
        app.backend.order(id).map(|o| o.status),
        Some(OrderStatus::Dikirim)
    );

    let detail = browser.get(&format!("/order/{id}")).await;
    assert!(detail.body.contains("Status pesanan tidak sesuai"));
}

#[tokio::test]
async fn test_receive_shipped_order() {
    let app = TestApp::spawn().await;
    let id = app.backend.seed_order(
        CUSTOMER_EMAIL,
        OrderStatus::Dikirim,
        PaymentMethod::Cod,
    );
    let browser = app.signed_in(CUSTOMER_EMAIL).await;

    let page = browser
        .post(&format!("/orders/{id}/receive"), &[("next", "/orders")])
        .await;
    assert!(page.redirects_to("/orders"));
    assert_eq!(
        app.backend.order(id).map(|o| o.status),
        Some(OrderStatus::Selesai)
    );
}

#[tokio::test]
async fn test_pay_redirects_to_gateway() {
    let app = TestApp::spawn().await;
    let id = app.backend.seed_order(
        CUSTOMER_EMAIL,
        OrderStatus::MenungguPembayaran,
        PaymentMethod::BankTransfer,
    );
    let browser = app.signed_in(CUSTOMER_EMAIL).await;

    let page = browser.post(&format!("/order/{id}/pay"), &[]).await;
    assert!(page.redirects_to(&format!("{GATEWAY_URL}/{id}")));
}

#[tokio::test]
async fn test_proof_upload_rejects_non_images() {
    let app = TestApp::spawn().await;
    let id = app.backend.seed_order(
        CUSTOMER_EMAIL,
        OrderStatus::MenungguPembayaran,
        PaymentMethod::BankTransfer,
    );
    let browser = app.signed_in(CUSTOMER_EMAIL).await;

    let page = browser
        .upload(
            &format!("/order/{id}/proof"),
            "proofImage",
            "text/plain",
            b"bukan gambar".to_vec(),
        )
        .await;
    assert!(page.redirects_to(&format!("/order/{id}")));
    assert_eq!(app.backend.proof_size(id), None);

    let detail = browser.get(&format!("/order/{id}")).await;
    assert!(detail.body.contains("Format file harus PNG, JPG, atau GIF."));
}

#[tokio::test]
async fn test_proof_upload_requires_the_file_field() {
    let app = TestApp::spawn().await;
    let id = app.backend.seed_order(
        CUSTOMER_EMAIL,
        OrderStatus::MenungguPembayaran,
        PaymentMethod::BankTransfer,
    );
    let browser = app.signed_in(CUSTOMER_EMAIL).await;

    let page = browser
        .upload(
            &format!("/order/{id}/proof"),
            "lampiran",
            "image/png",
            PNG_BYTES.to_vec(),
        )
        .await;
    assert!(page.redirects_to(&format!("/order/{id}")));
    assert_eq!(app.backend.proof_size(id), None);
}

#[tokio::test]
async fn test_proof_upload_reaches_backend() {
    let app = TestApp::spawn().await;
    let id = app.backend.seed_order(
        CUSTOMER_EMAIL,
        OrderStatus::MenungguPembayaran,
        PaymentMethod::BankTransfer,
    );
    let browser = app.signed_in(CUSTOMER_EMAIL).await;

    let page = browser
        .upload(
            &format!("/order/{id}/proof"),
            "proofImage",
            "image/png",
            PNG_BYTES.to_vec(),
        )
        .await;
    assert!(page.redirects_to(&format!("/order/{id}")));
    assert_eq!(app.backend.proof_size(id), Some(PNG_BYTES.len()));

    let detail = browser.get(&format!("/order/{id}")).await;
    assert!(detail.body.contains("Bukti pembayaran telah diunggah."));
}
