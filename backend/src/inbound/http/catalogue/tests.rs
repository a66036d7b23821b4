//! Tests for component, product and project handlers.

use super::*;
use crate::test_support::multipart::{self, Part};
use crate::test_support::{FIXTURE_MILLIS, TestHarness};
use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

async fn call(harness: &TestHarness, request: actix_test::TestRequest) -> (StatusCode, Value) {
    let app = actix_test::init_service(harness.app()).await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    (status, serde_json::from_slice(&body).expect("json body"))
}

fn json_post(uri: &str, bearer: &str, body: Value) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri(uri)
        .insert_header((AUTHORIZATION, bearer.to_owned()))
        .set_json(body)
}

fn names(body: &Value, key: &str) -> Vec<String> {
    body.as_array()
        .expect("array")
        .iter()
        .map(|item| item[key].as_str().expect("string field").to_owned())
        .collect()
}

#[actix_web::test]
async fn component_create_uploads_image_and_records_author() {
    let harness = TestHarness::new();
    let session = harness.sign_up("ada").await;
    let request = actix_test::TestRequest::post()
        .uri("/api/components/create")
        .insert_header((AUTHORIZATION, format!("Bearer {}", session.token)))
        .insert_header((CONTENT_TYPE, multipart::content_type()))
        .set_payload(multipart::body(&[
            Part::Text("name", "DHT22"),
            Part::Text("category", "Sensor"),
            Part::File("image", "dht22.jpg", "image/jpeg", b"jpeg"),
        ]));

    let (status, body) = call(&harness, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["category"], "sensor");
    assert_eq!(body["description"], "");
    assert_eq!(body["createdBy"], session.user.id.to_string());
    assert_eq!(
        body["imageUrl"],
        format!("https://storage.test/component_images/{FIXTURE_MILLIS}-dht22.jpg")
    );
}

#[rstest]
#[case(json!({"category": "sensor"}), "name")]
#[case(json!({"name": "DHT22"}), "category")]
#[case(json!({"name": "DHT22", "category": "gizmo"}), "category")]
#[actix_web::test]
async fn component_create_validates(#[case] body: Value, #[case] field: &str) {
    let harness = TestHarness::new();
    let bearer = harness.bearer("ada").await;
    let (status, body) = call(&harness, json_post("/api/components/create", &bearer, body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn components_filter_by_category_and_visibility() {
    let harness = TestHarness::new();
    let bearer = harness.bearer("ada").await;
    for (name, category) in [("DHT22", "sensor"), ("SG90", "actuator"), ("HC-SR04", "sensor")] {
        let (status, _) = call(
            &harness,
            json_post(
                "/api/components/create",
                &bearer,
                json!({"name": name, "category": category}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (_, all) = call(&harness, actix_test::TestRequest::get().uri("/api/components")).await;
    let hidden_id = all[2]["id"].as_str().expect("id").to_owned();
    call(
        &harness,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/components/{hidden_id}"))
            .insert_header((AUTHORIZATION, bearer))
            .set_json(json!({"visibleOnCatalog": false})),
    )
    .await;

    let (_, sensors) = call(
        &harness,
        actix_test::TestRequest::get().uri("/api/components?category=sensor"),
    )
    .await;
    assert_eq!(names(&sensors, "name"), ["DHT22", "HC-SR04"]);

    let (_, listed) = call(
        &harness,
        actix_test::TestRequest::get().uri("/api/components?category=sensor&visibleOnCatalog=true"),
    )
    .await;
    assert_eq!(names(&listed, "name"), ["DHT22"]);
}

#[actix_web::test]
async fn product_create_accepts_an_image_url() {
    let harness = TestHarness::new();
    let bearer = harness.bearer("ada").await;
    let (status, body) = call(
        &harness,
        json_post(
            "/api/products/create",
            &bearer,
            json!({
                "name": "Starter kit",
                "price": "19.99",
                "description": "Everything to get going",
                "imageUrl": "https://cdn.test/kit.png",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["price"], 19.99);
    assert_eq!(body["imageUrl"], "https://cdn.test/kit.png");
    assert!(harness.objects.keys().is_empty());
}

#[actix_web::test]
async fn product_image_upload_wins_over_image_url() {
    let harness = TestHarness::new();
    let bearer = harness.bearer("ada").await;
    let request = actix_test::TestRequest::post()
        .uri("/api/products/create")
        .insert_header((AUTHORIZATION, bearer))
        .insert_header((CONTENT_TYPE, multipart::content_type()))
        .set_payload(multipart::body(&[
            Part::Text("name", "Starter kit"),
            Part::Text("price", "5"),
            Part::Text("description", "Kit"),
            Part::Text("imageUrl", "https://cdn.test/kit.png"),
            Part::File("image", "kit.png", "image/png", b"png"),
        ]));

    let (status, body) = call(&harness, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["imageUrl"],
        format!("https://storage.test/product_images/{FIXTURE_MILLIS}-kit.png")
    );
}

#[rstest]
#[case(json!({"name": "Kit", "price": "-1", "description": "d"}), "price")]
#[case(json!({"name": "Kit", "price": "cheap", "description": "d"}), "price")]
#[case(json!({"name": "Kit", "price": 3}), "description")]
#[actix_web::test]
async fn product_create_validates(#[case] body: Value, #[case] field: &str) {
    let harness = TestHarness::new();
    let bearer = harness.bearer("ada").await;
    let (status, body) = call(&harness, json_post("/api/products/create", &bearer, body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn product_visibility_patch_is_reflected_in_lists() {
    let harness = TestHarness::new();
    let bearer = harness.bearer("ada").await;
    let (_, product) = call(
        &harness,
        json_post(
            "/api/products/create",
            &bearer,
            json!({"name": "Kit", "price": 1, "description": "d"}),
        ),
    )
    .await;
    let id = product["id"].as_str().expect("id");

    let (status, patched) = call(
        &harness,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/products/{id}"))
            .insert_header((AUTHORIZATION, bearer.clone()))
            .set_json(json!({"visibleOnHome": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["visibleOnHome"], true);

    let (_, home) = call(
        &harness,
        actix_test::TestRequest::get().uri("/api/products?visibleOnHome=true"),
    )
    .await;
    assert_eq!(names(&home, "id"), [id]);

    let (status, _) = call(
        &harness,
        actix_test::TestRequest::patch()
            .uri("/api/products/unknown")
            .insert_header((AUTHORIZATION, bearer))
            .set_json(json!({"visibleOnHome": true})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn project_create_parses_steps_and_sets_author() {
    let harness = TestHarness::new();
    let session = harness.sign_up("ada").await;
    let bearer = format!("Bearer {}", session.token);
    let (status, body) = call(
        &harness,
        json_post(
            "/api/projects/create",
            &bearer,
            json!({
                "title": "Weather station",
                "description": "Logs temperature",
                "steps": [{"text": "Wire the sensor"}, {"text": "Flash", "imageUrl": "https://cdn.test/flash.png"}],
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["author"], session.user.id.to_string());
    assert_eq!(body["likes"], 0);
    assert_eq!(body["comments"], json!([]));
    assert_eq!(body["steps"][1]["imageUrl"], "https://cdn.test/flash.png");

    let (_, listed) = call(&harness, actix_test::TestRequest::get().uri("/api/projects")).await;
    assert_eq!(names(&listed, "title"), ["Weather station"]);
}

#[rstest]
#[case(json!({"title": "T", "description": "D", "steps": "not json"}))]
#[case(json!({"title": "T", "description": "D", "steps": [{"text": " "}]}))]
#[case(json!({"description": "D"}))]
#[actix_web::test]
async fn project_create_validates(#[case] body: Value) {
    let harness = TestHarness::new();
    let bearer = harness.bearer("ada").await;
    let (status, body) = call(&harness, json_post("/api/projects/create", &bearer, body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[rstest]
#[case("/api/components/create")]
#[case("/api/products/create")]
#[case("/api/projects/create")]
#[actix_web::test]
async fn creates_require_a_token(#[case] uri: &str) {
    let harness = TestHarness::new();
    let request = actix_test::TestRequest::post()
        .uri(uri)
        .set_json(json!({"name": "x"}));
    let (status, body) = call(&harness, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Access token required");
}
