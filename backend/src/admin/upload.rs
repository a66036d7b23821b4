//! Upload slots: the state behind one drop zone's hidden URL field.
//!
//! ```text
//! Idle -> Pending -> Uploaded(url)
//!                 -> Failed(reason)
//! ```
//!
//! A slot only exposes a URL while it is `Uploaded`, so starting a new upload
//! or failing one clears whatever URL the slot held before.

use tracing::{info, warn};

use super::api::{AdminApi, AdminError};
use super::draft::DraftId;
use super::drop_zone::DroppedFile;
use super::notify::{Notification, Notifier};
use super::session::AdminSession;

/// What an upload is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UploadTarget {
    /// The course cover image.
    CourseCover,
    /// The video of one lesson.
    LessonVideo(DraftId),
}

impl UploadTarget {
    /// Storage folder the server files the upload under.
    #[must_use]
    pub const fn folder(self) -> &'static str {
        match self {
            Self::CourseCover => "course_images",
            Self::LessonVideo(_) => "lesson_videos",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::CourseCover => "Cover image",
            Self::LessonVideo(_) => "Lesson video",
        }
    }
}

/// Progress of one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadState {
    #[default]
    Idle,
    Pending { file_name: String },
    Uploaded { url: String },
    Failed { reason: String },
}

/// Upload state for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSlot {
    state: UploadState,
}

impl UploadSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// URL to submit with the form; `None` unless the last upload succeeded.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match &self.state {
            UploadState::Uploaded { url } => Some(url),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, UploadState::Pending { .. })
    }

    /// Enter `Pending` for `file_name`.
    pub fn begin(&mut self, target: UploadTarget, file_name: &str, notifier: &dyn Notifier) {
        self.state = UploadState::Pending {
            file_name: file_name.to_owned(),
        };
        notifier.notify(Notification::info(format!(
            "{}: uploading {file_name}...",
            target.label()
        )));
    }

    /// Record the outcome of the upload started by [`Self::begin`].
    pub fn finish(
        &mut self,
        target: UploadTarget,
        outcome: Result<String, AdminError>,
        notifier: &dyn Notifier,
    ) {
        match outcome {
            Ok(url) => {
                info!(?target, %url, "upload stored");
                notifier.notify(Notification::success(format!("{} uploaded", target.label())));
                self.state = UploadState::Uploaded { url };
            }
            Err(err) => {
                warn!(?target, error = %err, "upload failed");
                let reason = err.to_string();
                notifier.notify(Notification::error(format!(
                    "{} upload failed: {reason}",
                    target.label()
                )));
                self.state = UploadState::Failed { reason };
            }
        }
    }

    /// Back to `Idle`, forgetting any URL.
    pub fn clear(&mut self) {
        self.state = UploadState::Idle;
    }
}

/// Upload `file` for `target`, driving `slot` through its states.
///
/// Returns the stored URL on success. Failures are reported through
/// `notifier` and leave the slot `Failed`.
pub async fn upload_to_slot(
    api: &dyn AdminApi,
    session: &AdminSession,
    slot: &mut UploadSlot,
    target: UploadTarget,
    file: &DroppedFile,
    notifier: &dyn Notifier,
) -> Option<String> {
    slot.begin(target, &file.name, notifier);
    let outcome = api.upload(session.token(), file, Some(target.folder())).await;
    slot.finish(target, outcome, notifier);
    slot.url().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::api::MockAdminApi;
    use crate::admin::notify::{NotificationLevel, RecordingNotifier};
    use crate::admin::session::AdminSession;
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

    fn cover() -> DroppedFile {
        DroppedFile::new("cover.png", "image/png", b"png".to_vec())
    }

    #[rstest]
    #[tokio::test]
    async fn successful_upload_fills_the_slot(session: AdminSession) {
        let mut api = MockAdminApi::new();
        api.expect_upload()
            .withf(|token, file, folder| {
                token == "token-1" && file.name == "cover.png" && *folder == Some("course_images")
            })
            .times(1)
            .returning(|_, _, _| Ok("https://storage.test/course_images/cover.png".to_owned()));
        let notifier = RecordingNotifier::default();
        let mut slot = UploadSlot::new();

        let url = upload_to_slot(&api, &session, &mut slot, UploadTarget::CourseCover, &cover(), &notifier)
            .await;

        assert_eq!(url.as_deref(), Some("https://storage.test/course_images/cover.png"));
        assert_eq!(slot.url(), url.as_deref());
        let levels: Vec<_> = notifier.notifications().iter().map(|n| n.level).collect();
        assert_eq!(levels, [NotificationLevel::Info, NotificationLevel::Success]);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_upload_clears_a_previous_url(session: AdminSession) {
        let mut api = MockAdminApi::new();
        api.expect_upload().times(1).returning(|_, _, _| {
            Err(AdminError::Rejected {
                status: 500,
                message: "Storage unavailable".to_owned(),
            })
        });
        let notifier = RecordingNotifier::default();
        let mut slot = UploadSlot::new();
        slot.finish(UploadTarget::CourseCover, Ok("https://old.test/a.png".to_owned()), &notifier);

        let url = upload_to_slot(&api, &session, &mut slot, UploadTarget::CourseCover, &cover(), &notifier)
            .await;

        assert!(url.is_none());
        assert!(slot.url().is_none());
        assert!(matches!(slot.state(), UploadState::Failed { reason } if reason.contains("Storage unavailable")));
        let last = notifier.notifications().pop().expect("notification");
        assert_eq!(last.level, NotificationLevel::Error);
    }

    #[rstest]
    fn pending_slot_has_no_url() {
        let notifier = RecordingNotifier::default();
        let mut slot = UploadSlot::new();
        slot.finish(UploadTarget::CourseCover, Ok("https://old.test/a.png".to_owned()), &notifier);

        slot.begin(UploadTarget::CourseCover, "b.png", &notifier);

        assert!(slot.is_pending());
        assert!(slot.url().is_none());
    }
}
