//! Registration, login and bearer-token checks through the public API.

mod support;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use courseware::test_support::TestHarness;
use rstest::rstest;
use serde_json::json;
use support::{bearer, json_of};

#[actix_web::test]
async fn register_login_and_me_agree_on_the_account() {
    let harness = TestHarness::new();
    let app = actix_test::init_service(harness.app()).await;

    let register = actix_test::TestRequest::post().uri("/api/auth/register").set_json(json!({
        "username": "grace",
        "email": "Grace@Example.com",
        "password": "hopper-1906",
    }));
    let (status, registered) = json_of(actix_test::call_service(&app, register.to_request()).await).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered["user"]["email"], "grace@example.com");
    assert_eq!(registered["user"]["role"], "student");

    let login = actix_test::TestRequest::post().uri("/api/auth/login").set_json(json!({
        "email": "grace@example.com",
        "password": "hopper-1906",
    }));
    let (status, session) = json_of(actix_test::call_service(&app, login.to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    let token = session["token"].as_str().expect("token");

    let me = actix_test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(token));
    let (status, user) = json_of(actix_test::call_service(&app, me.to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["id"], registered["user"]["id"]);
    assert!(user.get("passwordHash").is_none());
}

#[actix_web::test]
async fn second_registration_with_the_same_email_conflicts() {
    let harness = TestHarness::new();
    harness.sign_up("grace").await;
    let app = actix_test::init_service(harness.app()).await;

    let again = actix_test::TestRequest::post().uri("/api/auth/register").set_json(json!({
        "username": "grace2",
        "email": "grace@example.com",
        "password": "another-pass",
    }));
    let (status, body) = json_of(actix_test::call_service(&app, again.to_request()).await).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[rstest]
#[case("grace@example.com", "wrong-password")]
#[case("nobody@example.com", "correct-horse")]
#[actix_web::test]
async fn failed_logins_look_the_same(#[case] email: &str, #[case] password: &str) {
    let harness = TestHarness::new();
    harness.sign_up("grace").await;
    let app = actix_test::init_service(harness.app()).await;

    let login = actix_test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": email, "password": password}));
    let (status, body) = json_of(actix_test::call_service(&app, login.to_request()).await).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[rstest]
#[case(None)]
#[case(Some("Bearer not-a-jwt"))]
#[case(Some("Basic Z3JhY2U6cHc="))]
#[actix_web::test]
async fn mutating_endpoints_need_a_valid_token(#[case] header: Option<&str>) {
    let harness = TestHarness::new();
    let app = actix_test::init_service(harness.app()).await;
    let mut request = actix_test::TestRequest::post()
        .uri("/api/products/create")
        .set_json(json!({"name": "Kit", "price": 1, "description": "d"}));
    if let Some(value) = header {
        request = request.insert_header((actix_web::http::header::AUTHORIZATION, value));
    }

    let (status, body) = json_of(actix_test::call_service(&app, request.to_request()).await).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
    let (_, products) = json_of(
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/api/products").to_request()).await,
    )
    .await;
    assert_eq!(products, json!([]));
}
