//! Integration tests for sign-in, registration and session handling.

use axum::http::StatusCode;
use holycat_integration_tests::{
    ADMIN_EMAIL, CUSTOMER_EMAIL, OTP_CODE, PASSWORD, TestApp, UNVERIFIED_EMAIL,
};

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::spawn().await;
    let page = app.browser().get("/health").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body, "ok");
}

#[tokio::test]
async fn test_home_lists_products() {
    let app = TestApp::spawn().await;
    let page = app.browser().get("/").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Vitamin Bulu Kucing"));
}

#[tokio::test]
async fn test_home_lists_every_product() {
    let app = TestApp::spawn().await;
    let titles: Vec<String> = (1..=10).map(|n| format!("Mainan Bulu {n:02}")).collect();
    for title in &titles {
        app.backend.add_product(title, 3);
    }

    let page = app.browser().get("/").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(titles.iter().all(|t| page.body.contains(t.as_str())));
    assert!(page.body.contains("Sisir Grooming"));
}

#[tokio::test]
async fn test_unknown_page_is_not_found() {
    let app = TestApp::spawn().await;
    let page = app.browser().get("/tidak-ada").await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_redirects_home_and_greets() {
    let app = TestApp::spawn().await;
    let browser = app.browser();

    let page = browser.login(CUSTOMER_EMAIL, PASSWORD).await;
    assert!(page.redirects_to("/"));

    let home = browser.get("/").await;
    assert!(home.body.contains("Selamat datang kembali di Holycat!"));
    assert!(home.body.contains("Hai, Budi"));
}

#[tokio::test]
async fn test_login_honours_local_redirect_only() {
    let app = TestApp::spawn().await;

    let page = app
        .browser()
        .post(
            "/login",
            &[
                ("email", CUSTOMER_EMAIL),
                ("password", PASSWORD),
                ("redirect", "/orders"),
            ],
        )
        .await;
    assert!(page.redirects_to("/orders"));

    let page = app
        .browser()
        .post(
            "/login",
            &[
                ("email", CUSTOMER_EMAIL),
                ("password", PASSWORD),
                ("redirect", "//evil.example"),
            ],
        )
        .await;
    assert!(page.redirects_to("/"));
}

#[tokio::test]
async fn test_wrong_password_flashes_error() {
    let app = TestApp::spawn().await;
    let browser = app.browser();

    let page = browser.login(CUSTOMER_EMAIL, "salah").await;
    assert!(page.redirects_to("/login"));

    let login = browser.get("/login").await;
    assert!(login.body.contains("Gagal Login"));
    assert!(login.body.contains("Email atau password salah"));

    let cart = browser.get("/cart").await;
    assert_eq!(cart.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_unverified_login_continues_with_otp() {
    let app = TestApp::spawn().await;
    let browser = app.browser();

    let page = browser.login(UNVERIFIED_EMAIL, PASSWORD).await;
    assert!(page.redirects_to("/login?step=verify"));

    let otp_page = browser.get("/login?step=verify").await;
    assert!(otp_page.body.contains("otp_code"));

    let wrong = browser
        .post("/login/verify", &[("otp_code", "000000")])
        .await;
    assert_eq!(wrong.status, StatusCode::SEE_OTHER);
    assert!(wrong.location.as_deref().is_some_and(|l| l.starts_with("/login")));

    let page = browser.post("/login/verify", &[("otp_code", OTP_CODE)]).await;
    assert!(page.redirects_to("/"));

    let profile = browser.get("/profile").await;
    assert_eq!(profile.status, StatusCode::OK);
    assert!(profile.body.contains("Sari Dewi"));
}

#[tokio::test]
async fn test_registration_requires_matching_passwords() {
    let app = TestApp::spawn().await;
    let browser = app.browser();

    let page = browser
        .post(
            "/register",
            &[
                ("name", "Rina"),
                ("email", "rina@example.com"),
                ("password", "rahasia123"),
                ("confirm_password", "berbeda"),
                ("phone", "0811"),
                ("city", "Bogor"),
                ("address", "Jl. Pajajaran 5"),
            ],
        )
        .await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Rina"));
}

#[tokio::test]
async fn test_registration_then_otp_signs_in() {
    let app = TestApp::spawn().await;
    let browser = app.browser();

    let page = browser
        .post(
            "/register",
            &[
                ("name", "Rina"),
                ("email", "rina@example.com"),
                ("password", "rahasia123"),
                ("confirm_password", "rahasia123"),
                ("phone", "0811"),
                ("city", "Bogor"),
                ("address", "Jl. Pajajaran 5"),
            ],
        )
        .await;
    assert!(page.redirects_to("/register?step=verify"));

    let page = browser
        .post("/register/verify", &[("otp_code", OTP_CODE)])
        .await;
    assert!(page.redirects_to("/"));

    let profile = browser.get("/profile").await;
    assert!(profile.body.contains("rina@example.com"));
}

#[tokio::test]
async fn test_logout_forgets_the_user() {
    let app = TestApp::spawn().await;
    let browser = app.signed_in(CUSTOMER_EMAIL).await;

    let page = browser.post("/logout", &[]).await;
    assert!(page.redirects_to("/"));

    let cart = browser.get("/cart").await;
    assert!(cart.redirects_to("/login?redirect=%2Fcart"));
}

#[tokio::test]
async fn test_protected_page_redirects_to_login() {
    let app = TestApp::spawn().await;
    let page = app.browser().get("/cart").await;
    assert!(page.redirects_to("/login?redirect=%2Fcart"));
}

#[tokio::test]
async fn test_nested_pages_return_to_their_full_path() {
    let app = TestApp::spawn().await;
    let browser = app.browser();

    let page = browser.get("/order/5").await;
    assert!(page.redirects_to("/login?redirect=%2Forder%2F5"));

    let page = browser.get("/admin/orders?status=Dikirim").await;
    assert!(page.redirects_to("/login?redirect=%2Fadmin%2Forders%3Fstatus%3DDikirim"));

    let page = browser
        .post(
            "/login",
            &[
                ("email", ADMIN_EMAIL),
                ("password", PASSWORD),
                ("redirect", "/admin/orders?status=Dikirim"),
            ],
        )
        .await;
    assert!(page.redirects_to("/admin/orders?status=Dikirim"));
}

#[tokio::test]
async fn test_customer_cannot_open_admin() {
    let app = TestApp::spawn().await;
    let browser = app.signed_in(CUSTOMER_EMAIL).await;
    let page = browser.get("/admin").await;
    assert_eq!(page.status, StatusCode::FORBIDDEN);

    let admin = app.signed_in(ADMIN_EMAIL).await;
    let page = admin.get("/admin").await;
    assert_eq!(page.status, StatusCode::OK);
}

#[tokio::test]
async fn test_expired_token_sends_back_to_login() {
    let app = TestApp::spawn().await;
    let browser = app.signed_in(CUSTOMER_EMAIL).await;
    app.backend.expire_tokens();

    let page = browser.get("/cart").await;
    assert!(page.redirects_to("/login?redirect=%2Fcart"));

    let login = browser.get("/login").await;
    assert!(login.body.contains("Sesi Anda telah berakhir"));

    let again = browser.get("/cart").await;
    assert!(again.redirects_to("/login?redirect=%2Fcart"));
}

#[tokio::test]
async fn test_profile_update() {
    let app = TestApp::spawn().await;
    let browser = app.signed_in(CUSTOMER_EMAIL).await;

    let page = browser
        .post(
            "/profile",
            &[
                ("name", "Budi S."),
                ("phone", "0899"),
                ("city", "Surabaya"),
                ("address", "Jl. Pemuda 10"),
            ],
        )
        .await;
    assert!(page.redirects_to("/profile"));

    let profile = browser.get("/profile").await;
    assert!(profile.body.contains("Profil Anda telah diperbarui."));
    assert!(profile.body.contains("Surabaya"));

    let blank = browser
        .post(
            "/profile",
            &[("name", " "), ("phone", ""), ("city", ""), ("address", "")],
        )
        .await;
    assert!(blank.redirects_to("/profile"));
    let profile = browser.get("/profile").await;
    assert!(profile.body.contains("Nama wajib diisi."));
}
