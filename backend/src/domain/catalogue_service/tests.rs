//! Tests for the catalogue service.

use super::*;
use crate::domain::catalogue::{
    ComponentCategory, ComponentFields, ProductFields, ProjectFields,
};
use crate::domain::ports::{MockComponentRepository, MockObjectStore, ObjectStoreError};
use crate::domain::user::UserId;
use crate::domain::ErrorCode;
use crate::test_support::{
    MemoryComponentRepository, MemoryObjectStore, MemoryProductRepository,
    MemoryProjectRepository, fixture_clock,
};
use rstest::{fixture, rstest};

#[fixture]
fn author() -> AuthClaims {
    AuthClaims {
        user_id: UserId::random(),
        email: "maker@example.com".to_owned(),
    }
}

fn repos() -> CatalogueRepositories {
    CatalogueRepositories {
        components: Arc::new(MemoryComponentRepository::default()),
        products: Arc::new(MemoryProductRepository::default()),
        projects: Arc::new(MemoryProjectRepository::default()),
    }
}

fn service() -> CatalogueService {
    CatalogueService::new(
        repos(),
        MediaService::new(Arc::new(MemoryObjectStore::default()), fixture_clock()),
        fixture_clock(),
        true,
    )
}

fn component(name: &str, category: &str) -> ComponentSubmission {
    ComponentSubmission::try_from_parts(&ComponentFields {
        name: Some(name.to_owned()),
        category: Some(category.to_owned()),
        description: Some("part".to_owned()),
    })
    .expect("valid component")
}

fn png() -> MediaUpload {
    MediaUpload {
        bytes: b"png".to_vec(),
        filename: Some("board.png".to_owned()),
        content_type: Some("image/png".to_owned()),
    }
}

#[rstest]
#[tokio::test]
async fn components_filter_by_category(author: AuthClaims) {
    let service = service();
    service
        .create_component(component("DHT22", "sensor"), None, &author)
        .await
        .expect("sensor");
    service
        .create_component(component("SG90", "actuator"), Some(png()), &author)
        .await
        .expect("actuator");

    let sensors = service
        .list_components(&ComponentFilter {
            category: Some(ComponentCategory::Sensor),
            ..ComponentFilter::default()
        })
        .await
        .expect("list");
    assert_eq!(sensors.len(), 1);
    assert_eq!(sensors.first().map(|c| c.name.as_str()), Some("DHT22"));

    let all = service
        .list_components(&ComponentFilter::default())
        .await
        .expect("list");
    let actuator = all.iter().find(|c| c.name == "SG90").expect("actuator listed");
    assert!(
        actuator
            .image_url
            .as_deref()
            .is_some_and(|url| url.contains("component_images/"))
    );
}

#[rstest]
#[tokio::test]
async fn component_image_failure_is_fatal_when_required(author: AuthClaims) {
    let mut store = MockObjectStore::new();
    store
        .expect_put_public()
        .returning(|_, _, _| Err(ObjectStoreError::unavailable("no credentials")));
    let mut components = MockComponentRepository::new();
    components.expect_insert().never();
    let service = CatalogueService::new(
        CatalogueRepositories {
            components: Arc::new(components),
            ..repos()
        },
        MediaService::new(Arc::new(store), fixture_clock()),
        fixture_clock(),
        true,
    );

    let err = service
        .create_component(component("DHT22", "sensor"), Some(png()), &author)
        .await
        .expect_err("storage unavailable");
    assert_eq!(err.code(), ErrorCode::StorageUnavailable);
}

#[rstest]
#[tokio::test]
async fn product_visibility_round_trip(author: AuthClaims) {
    let service = service();
    let product = service
        .create_product(
            ProductSubmission::try_from_parts(&ProductFields {
                name: Some("Starter kit".to_owned()),
                price: Some("19.99".to_owned()),
                description: Some("Everything to begin".to_owned()),
                image_url: Some("https://img.test/kit.png".to_owned()),
            })
            .expect("valid product"),
            None,
            &author,
        )
        .await
        .expect("create");
    assert_eq!(product.image_url.as_deref(), Some("https://img.test/kit.png"));

    let patch = VisibilityPatch {
        visible_on_home: Some(true),
        visible_on_catalog: Some(false),
    };
    service
        .update_product_visibility(&product.id, &patch)
        .await
        .expect("patch");

    let home = service
        .list_products(&VisibilityFilter {
            visible_on_home: Some(true),
            visible_on_catalog: None,
        })
        .await
        .expect("list");
    assert_eq!(home.len(), 1);
    assert!(!home.first().is_some_and(|p| p.visibility.visible_on_catalog));
}

#[rstest]
#[tokio::test]
async fn unknown_ids_are_not_found() {
    let service = service();
    let patch = VisibilityPatch {
        visible_on_home: Some(true),
        visible_on_catalog: None,
    };
    let err = service
        .update_component_visibility("missing", &patch)
        .await
        .expect_err("unknown component");
    assert_eq!(err.code(), ErrorCode::NotFound);
    let err = service
        .update_product_visibility("missing", &patch)
        .await
        .expect_err("unknown product");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn projects_record_author_and_start_unliked(author: AuthClaims) {
    let service = service();
    let project = service
        .create_project(
            ProjectSubmission::try_from_parts(&ProjectFields {
                title: Some("Weather station".to_owned()),
                description: Some("Log the weather".to_owned()),
                steps: Some(r#"[{"text":"Wire the sensor"}]"#.to_owned()),
            })
            .expect("valid project"),
            None,
            &author,
        )
        .await
        .expect("create");
    assert_eq!(project.author, author.user_id);
    assert_eq!(project.likes, 0);
    assert!(project.comments.is_empty());
    assert_eq!(service.list_projects().await.expect("list"), vec![project]);
}
