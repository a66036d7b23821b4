//! Operator actions: call the API and report the outcome.
//!
//! Every action notifies on success and on failure, and returns `None` when
//! the action did not go through.

use serde_json::Value;
use tracing::warn;

use crate::domain::{Component, Course, Product, ResourceKind, VisibilityPatch};

use super::api::{AdminApi, AdminError, ComponentPayload, ProductPayload, VisibilityUpdate};
use super::draft::CourseDraft;
use super::notify::{Notification, Notifier};
use super::session::AdminSession;

fn report<T>(
    notifier: &dyn Notifier,
    outcome: Result<T, AdminError>,
    success: impl FnOnce(&T) -> String,
    failure: &str,
) -> Option<T> {
    match outcome {
        Ok(value) => {
            notifier.notify(Notification::success(success(&value)));
            Some(value)
        }
        Err(err) => {
            warn!(error = %err, "{failure}");
            notifier.notify(Notification::error(format!("{failure}: {err}")));
            None
        }
    }
}

/// Validate `draft` locally, then publish it.
pub async fn publish_course(
    api: &dyn AdminApi,
    session: &AdminSession,
    draft: &CourseDraft,
    notifier: &dyn Notifier,
) -> Option<Course> {
    if let Err(problems) = draft.validate() {
        for problem in problems {
            notifier.notify(Notification::error(format!(
                "{}: {}",
                problem.path, problem.message
            )));
        }
        return None;
    }
    let outcome = api.publish_course(session.token(), &draft.to_payload()).await;
    report(
        notifier,
        outcome,
        |course| format!("Course '{}' published", course.course_id.as_str()),
        "Course publish failed",
    )
}

pub async fn create_component(
    api: &dyn AdminApi,
    session: &AdminSession,
    payload: &ComponentPayload,
    notifier: &dyn Notifier,
) -> Option<Component> {
    let outcome = api.create_component(session.token(), payload).await;
    report(
        notifier,
        outcome,
        |component| format!("Component '{}' added", component.name),
        "Component create failed",
    )
}

pub async fn create_product(
    api: &dyn AdminApi,
    session: &AdminSession,
    payload: &ProductPayload,
    notifier: &dyn Notifier,
) -> Option<Product> {
    let outcome = api.create_product(session.token(), payload).await;
    report(
        notifier,
        outcome,
        |product| format!("Product '{}' added", product.name),
        "Product create failed",
    )
}

/// Toggle visibility of one record.
pub async fn set_visibility(
    api: &dyn AdminApi,
    session: &AdminSession,
    kind: ResourceKind,
    id: &str,
    patch: VisibilityPatch,
    notifier: &dyn Notifier,
) -> Option<Value> {
    if patch.is_empty() {
        notifier.notify(Notification::error("Choose a visibility flag to change"));
        return None;
    }
    let update = VisibilityUpdate {
        id: id.to_owned(),
        kind,
        visible_on_home: patch.visible_on_home,
        visible_on_catalog: patch.visible_on_catalog,
    };
    let outcome = api.update_visibility(session.token(), &update).await;
    report(
        notifier,
        outcome,
        |_| format!("Visibility of {} '{id}' updated", kind.label()),
        "Visibility update failed",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::api::MockAdminApi;
    use crate::admin::notify::{NotificationLevel, RecordingNotifier};
    use crate::domain::{Profile, PublicUser, Role, UserId};
    use rstest::{fixture, rstest};

    #[fixture]
    fn session() -> AdminSession {
        AdminSession::verified(
            "token-1".to_owned(),
            PublicUser {
                id: UserId::random(),
                username: "ada".to_owned(),
                email: "ada@example.com".to_owned(),
                role: Role::Admin,
                points: 0,
                badges: Vec::new(),
                profile: Profile::default(),
                language_preference: "en".to_owned(),
            },
        )
    }

    fn levels(notifier: &RecordingNotifier) -> Vec<NotificationLevel> {
        notifier.notifications().iter().map(|n| n.level).collect()
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_draft_is_never_sent(session: AdminSession) {
        let api = MockAdminApi::new();
        let notifier = RecordingNotifier::default();

        let course = publish_course(&api, &session, &CourseDraft::new(), &notifier).await;

        assert!(course.is_none());
        assert_eq!(levels(&notifier).len(), 5);
        assert!(levels(&notifier).iter().all(|l| *l == NotificationLevel::Error));
    }

    #[rstest]
    #[tokio::test]
    async fn server_rejections_are_surfaced(session: AdminSession) {
        let mut api = MockAdminApi::new();
        api.expect_create_product().times(1).returning(|_, _| {
            Err(AdminError::Rejected {
                status: 400,
                message: "Price must be a non-negative number".to_owned(),
            })
        });
        let notifier = RecordingNotifier::default();
        let payload = ProductPayload {
            name: "Kit".to_owned(),
            price: 1.0,
            description: "d".to_owned(),
            image_url: None,
        };

        assert!(create_product(&api, &session, &payload, &notifier).await.is_none());
        let messages = notifier.notifications();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].message.contains("Price must be a non-negative number"));
    }

    #[rstest]
    #[tokio::test]
    async fn empty_visibility_patch_is_rejected_locally(session: AdminSession) {
        let api = MockAdminApi::new();
        let notifier = RecordingNotifier::default();

        let result = set_visibility(
            &api,
            &session,
            ResourceKind::Products,
            "p1",
            VisibilityPatch::default(),
            &notifier,
        )
        .await;

        assert!(result.is_none());
        assert_eq!(levels(&notifier), [NotificationLevel::Error]);
    }

    #[rstest]
    #[tokio::test]
    async fn visibility_update_reports_success(session: AdminSession) {
        let mut api = MockAdminApi::new();
        api.expect_update_visibility()
            .withf(|token, update| {
                token == "token-1" && update.kind == ResourceKind::Courses && update.id == "intro"
            })
            .times(1)
            .returning(|_, _| Ok(serde_json::json!({"courseId": "intro", "visibleOnHome": true})));
        let notifier = RecordingNotifier::default();

        let record = set_visibility(
            &api,
            &session,
            ResourceKind::Courses,
            "intro",
            VisibilityPatch {
                visible_on_home: Some(true),
                visible_on_catalog: None,
            },
            &notifier,
        )
        .await;

        assert_eq!(record.expect("updated")["visibleOnHome"], true);
        assert_eq!(levels(&notifier), [NotificationLevel::Success]);
    }
}
