//! End-to-end course publishing over the in-memory adapters.

mod support;

use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::test as actix_test;
use courseware::test_support::multipart::{self, Part};
use courseware::test_support::{FIXTURE_MILLIS, TestHarness};
use futures::future::join_all;
use rstest::rstest;
use serde_json::{Value, json};
use support::{bearer, json_of};

const SECTIONS: &str = r#"[
    {"title": "Basics", "lessons": [
        {"title": "Hello", "content": "fn main() {}", "videoUrl": "https://cdn.test/hello.mp4"},
        {"title": "Ownership", "content": "moves"}
    ]},
    {"title": "Traits", "lessons": [{"title": "Bounds", "content": "where clauses"}]}
]"#;

fn publish_form(slug: &str, title: &str) -> Vec<u8> {
    multipart::body(&[
        Part::Text("courseId", slug),
        Part::Text("title", title),
        Part::Text("description", "Ownership and borrowing"),
        Part::Text("level", "beginner"),
        Part::Text("duration", "4 weeks"),
        Part::Text("sections", SECTIONS),
        Part::File("image", "cover image.png", "image/png", b"png-bytes"),
    ])
}

fn publish(token: &str, slug: &str, title: &str) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri("/api/courses/create")
        .insert_header(bearer(token))
        .insert_header((CONTENT_TYPE, multipart::content_type()))
        .set_payload(publish_form(slug, title))
}

#[actix_web::test]
async fn published_course_round_trips_through_fetch_and_list() {
    let harness = TestHarness::new();
    let session = harness.sign_up("ada").await;
    let app = actix_test::init_service(harness.app()).await;

    let (status, created) =
        json_of(actix_test::call_service(&app, publish(&session.token, "intro-to-rust", "Intro").to_request()).await)
            .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        created["imageUrl"],
        format!("https://storage.test/course_images/{FIXTURE_MILLIS}-cover_image.png")
    );

    let (status, fetched) = json_of(
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/api/courses/intro-to-rust").to_request())
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
    let expected_sections: Value = serde_json::from_str(SECTIONS).expect("fixture json");
    assert_eq!(fetched["sections"], expected_sections);

    let list = || actix_test::TestRequest::get().uri("/api/courses").to_request();
    let (_, first) = json_of(actix_test::call_service(&app, list()).await).await;
    let (_, second) = json_of(actix_test::call_service(&app, list()).await).await;
    assert_eq!(first, second);
    assert_eq!(first.as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn duplicate_slug_is_rejected_and_first_record_survives() {
    let harness = TestHarness::new();
    let session = harness.sign_up("ada").await;
    let app = actix_test::init_service(harness.app()).await;

    let (status, _) =
        json_of(actix_test::call_service(&app, publish(&session.token, "intro-to-rust", "First").to_request()).await)
            .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) =
        json_of(actix_test::call_service(&app, publish(&session.token, "intro-to-rust", "Second").to_request()).await)
            .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "A course with ID 'intro-to-rust' already exists.");

    let (_, fetched) = json_of(
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/api/courses/intro-to-rust").to_request())
            .await,
    )
    .await;
    assert_eq!(fetched["title"], "First");
}

#[actix_web::test]
async fn concurrent_publishes_of_one_slug_store_exactly_one_course() {
    let harness = TestHarness::new();
    let session = harness.sign_up("ada").await;
    let app = actix_test::init_service(harness.app()).await;

    let responses = join_all((0..4).map(|n| {
        actix_test::call_service(
            &app,
            publish(&session.token, "race", &format!("Attempt {n}")).to_request(),
        )
    }))
    .await;
    let statuses: Vec<StatusCode> = responses.iter().map(|r| r.status()).collect();

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count(), 3);
    let (_, list) =
        json_of(actix_test::call_service(&app, actix_test::TestRequest::get().uri("/api/courses").to_request()).await)
            .await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn missing_fields_change_nothing() {
    let harness = TestHarness::new();
    let session = harness.sign_up("ada").await;
    let app = actix_test::init_service(harness.app()).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/courses/create")
        .insert_header(bearer(&session.token))
        .insert_header((CONTENT_TYPE, multipart::content_type()))
        .set_payload(multipart::body(&[
            Part::Text("title", "No slug"),
            Part::File("image", "cover.png", "image/png", b"png"),
        ]));

    let (status, body) = json_of(actix_test::call_service(&app, request.to_request()).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert!(harness.objects.keys().is_empty());
    let (_, list) =
        json_of(actix_test::call_service(&app, actix_test::TestRequest::get().uri("/api/courses").to_request()).await)
            .await;
    assert_eq!(list, json!([]));
}

#[rstest]
#[case("/api/courses/intro-to-rust", json!({"visibleOnHome": true}))]
#[case("/api/updateVisibility", json!({"id": "intro-to-rust", "type": "courses", "visibleOnHome": true}))]
#[actix_web::test]
async fn visibility_changes_are_reflected_on_fetch(#[case] uri: &str, #[case] patch: Value) {
    let harness = TestHarness::new();
    let session = harness.sign_up("ada").await;
    let app = actix_test::init_service(harness.app()).await;
    actix_test::call_service(&app, publish(&session.token, "intro-to-rust", "Intro").to_request()).await;

    let request = actix_test::TestRequest::patch()
        .uri(uri)
        .insert_header(bearer(&session.token))
        .set_json(patch);
    let (status, updated) = json_of(actix_test::call_service(&app, request.to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["visibleOnHome"], true);

    let (_, home) = json_of(
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/api/courses?visibleOnHome=true").to_request())
            .await,
    )
    .await;
    assert_eq!(home[0]["courseId"], "intro-to-rust");
}

#[actix_web::test]
async fn unknown_visibility_target_is_not_found() {
    let harness = TestHarness::new();
    let session = harness.sign_up("ada").await;
    let app = actix_test::init_service(harness.app()).await;
    let request = actix_test::TestRequest::patch()
        .uri("/api/updateVisibility")
        .insert_header(bearer(&session.token))
        .set_json(json!({"id": "nope", "type": "products", "visibleOnCatalog": false}));

    let (status, body) = json_of(actix_test::call_service(&app, request.to_request()).await).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}
