//! Tests for the course service.

use super::*;
use crate::domain::course::{CourseFields, CourseLevel};
use crate::domain::ports::{MockCourseRepository, MockObjectStore, ObjectStore, ObjectStoreError};
use crate::domain::user::UserId;
use crate::domain::ErrorCode;
use crate::test_support::{MemoryCourseRepository, MemoryObjectStore, fixture_clock};
use rstest::{fixture, rstest};

const SECTIONS: &str = r#"[{"title":"S1","lessons":[{"title":"L1","content":"C1"}]}]"#;

fn submission(slug: &str, title: &str) -> CourseSubmission {
    CourseSubmission::try_from_parts(&CourseFields {
        course_id: Some(slug.to_owned()),
        title: Some(title.to_owned()),
        description: Some("desc".to_owned()),
        level: Some("beginner".to_owned()),
        duration: Some("2h".to_owned()),
        sections: Some(SECTIONS.to_owned()),
        image_url: None,
    })
    .expect("valid submission")
}

fn image() -> MediaUpload {
    MediaUpload {
        bytes: b"jpeg".to_vec(),
        filename: Some("cover.jpg".to_owned()),
        content_type: Some("image/jpeg".to_owned()),
    }
}

#[fixture]
fn author() -> AuthClaims {
    AuthClaims {
        user_id: UserId::random(),
        email: "author@example.com".to_owned(),
    }
}

fn service_with(
    courses: Arc<dyn CourseRepository>,
    store: Arc<dyn ObjectStore>,
    image_upload_required: bool,
) -> CourseService {
    CourseService::new(
        courses,
        MediaService::new(store, fixture_clock()),
        fixture_clock(),
        image_upload_required,
    )
}

fn failing_store() -> MockObjectStore {
    let mut store = MockObjectStore::new();
    store
        .expect_put_public()
        .times(1)
        .returning(|_, _, _| Err(ObjectStoreError::write("bucket exploded")));
    store
}

#[rstest]
#[tokio::test]
async fn publish_applies_defaults_and_author(author: AuthClaims) {
    let repo = Arc::new(MemoryCourseRepository::default());
    let service = service_with(repo.clone(), Arc::new(MemoryObjectStore::default()), true);

    let course = service
        .publish(submission("rust-101", "Rust"), None, &author)
        .await
        .expect("publish");

    assert_eq!(course.visibility, Visibility::default());
    assert_eq!(course.created_by, Some(author.user_id.clone()));
    assert_eq!(course.level, CourseLevel::Beginner);
    assert!(course.image_url.is_none());
    let fetched = service.get("rust-101").await.expect("fetch by slug");
    assert_eq!(fetched, course);
}

#[rstest]
#[tokio::test]
async fn publish_uploads_cover_into_course_images(author: AuthClaims) {
    let store = Arc::new(MemoryObjectStore::default());
    let service = service_with(Arc::new(MemoryCourseRepository::default()), store.clone(), true);

    let course = service
        .publish(submission("rust-101", "Rust"), Some(image()), &author)
        .await
        .expect("publish");

    let url = course.image_url.expect("image url");
    assert!(url.contains("course_images/1700000000000-cover.jpg"), "{url}");
    assert_eq!(store.keys(), vec!["course_images/1700000000000-cover.jpg".to_owned()]);
}

#[rstest]
#[tokio::test]
async fn duplicate_slug_conflicts_and_keeps_first_record(author: AuthClaims) {
    let mut store = MockObjectStore::new();
    store.expect_put_public().never();
    let service = service_with(Arc::new(MemoryCourseRepository::default()), Arc::new(store), true);

    let first = service
        .publish(submission("rust-101", "First"), None, &author)
        .await
        .expect("first publish");
    let err = service
        .publish(submission("rust-101", "Second"), Some(image()), &author)
        .await
        .expect_err("duplicate");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "A course with ID 'rust-101' already exists.");
    assert_eq!(service.get("rust-101").await.expect("fetch"), first);
}

#[rstest]
#[tokio::test]
async fn store_level_duplicate_maps_to_conflict(author: AuthClaims) {
    let mut repo = MockCourseRepository::new();
    repo.expect_find_by_slug().returning(|_| Ok(None));
    repo.expect_insert()
        .returning(|course| Err(CourseRepositoryError::duplicate_slug(course.course_id.as_str())));
    let service = service_with(Arc::new(repo), Arc::new(MemoryObjectStore::default()), true);

    let err = service
        .publish(submission("rust-101", "Racing"), None, &author)
        .await
        .expect_err("race lost");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "A course with ID 'rust-101' already exists.");
}

#[rstest]
#[tokio::test]
async fn required_image_failure_aborts_publish(author: AuthClaims) {
    let repo = Arc::new(MemoryCourseRepository::default());
    let service = service_with(repo.clone(), Arc::new(failing_store()), true);

    let err = service
        .publish(submission("rust-101", "Rust"), Some(image()), &author)
        .await
        .expect_err("upload failure");

    assert_eq!(err.code(), ErrorCode::UploadFailed);
    assert!(service.list(&CourseFilter::default()).await.expect("list").is_empty());
}

#[rstest]
#[tokio::test]
async fn optional_image_failure_publishes_without_image(author: AuthClaims) {
    let service = service_with(
        Arc::new(MemoryCourseRepository::default()),
        Arc::new(failing_store()),
        false,
    );
    let course = service
        .publish(submission("rust-101", "Rust"), Some(image()), &author)
        .await
        .expect("publish proceeds");
    assert!(course.image_url.is_none());
}

#[rstest]
#[tokio::test]
async fn get_falls_back_to_record_id(author: AuthClaims) {
    let service = service_with(
        Arc::new(MemoryCourseRepository::default()),
        Arc::new(MemoryObjectStore::default()),
        true,
    );
    let course = service
        .publish(submission("rust-101", "Rust"), None, &author)
        .await
        .expect("publish");
    assert_eq!(service.get(&course.id).await.expect("by id"), course);
    let err = service.get("missing").await.expect_err("unknown");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn visibility_patch_is_reflected_on_refetch(author: AuthClaims) {
    let service = service_with(
        Arc::new(MemoryCourseRepository::default()),
        Arc::new(MemoryObjectStore::default()),
        true,
    );
    service
        .publish(submission("rust-101", "Rust"), None, &author)
        .await
        .expect("publish");

    let patch = VisibilityPatch {
        visible_on_home: Some(true),
        visible_on_catalog: None,
    };
    let updated = service
        .update_visibility("rust-101", &patch)
        .await
        .expect("patch");
    assert!(updated.visibility.visible_on_home);
    assert!(service.get("rust-101").await.expect("refetch").visibility.visible_on_home);
}

#[rstest]
#[tokio::test]
async fn visibility_patch_rejects_unknown_and_empty() {
    let service = service_with(
        Arc::new(MemoryCourseRepository::default()),
        Arc::new(MemoryObjectStore::default()),
        true,
    );
    let patch = VisibilityPatch {
        visible_on_home: Some(true),
        visible_on_catalog: None,
    };
    let missing = service
        .update_visibility("ghost", &patch)
        .await
        .expect_err("unknown");
    assert_eq!(missing.code(), ErrorCode::NotFound);

    let empty = service
        .update_visibility("ghost", &VisibilityPatch::default())
        .await
        .expect_err("empty");
    assert_eq!(empty.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn listing_is_stable_without_mutation(author: AuthClaims) {
    let service = service_with(
        Arc::new(MemoryCourseRepository::default()),
        Arc::new(MemoryObjectStore::default()),
        true,
    );
    for slug in ["a", "b", "c"] {
        service
            .publish(submission(slug, slug), None, &author)
            .await
            .expect("publish");
    }
    let first = service.list(&CourseFilter::default()).await.expect("list");
    let second = service.list(&CourseFilter::default()).await.expect("list");
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}
