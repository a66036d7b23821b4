//! Client library for the administration tooling.
//!
//! - [`draft`]: the course tree being authored and its publish payload.
//! - [`drop_zone`]: file drop targets, wired once per zone.
//! - [`upload`]: per-target upload state behind each drop zone.
//! - [`notify`]: operator notifications.
//! - [`session`]: the signed-in session and its cache file.
//! - [`api`]: the HTTP client for the courseware API.
//! - [`actions`]: API calls that report their outcome to a notifier.
//!
//! ```no_run
//! # async fn example() -> Result<(), courseware::admin::AdminError> {
//! use courseware::admin::{HttpAdminApi, SessionStore, restore_session};
//!
//! let api = HttpAdminApi::new(reqwest::Client::new(), "http://localhost:8080");
//! let store = SessionStore::new("/tmp/courseware-admin/session.json");
//! if let Some(session) = restore_session(&api, &store).await? {
//!     println!("signed in as {}", session.user().username);
//! }
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod api;
pub mod draft;
pub mod drop_zone;
pub mod notify;
pub mod session;
pub mod upload;

pub use api::{
    AdminApi, AdminError, ComponentPayload, HttpAdminApi, LoginRequest, ProductPayload,
    VisibilityUpdate,
};
pub use draft::{CourseDraft, CoursePayload, DraftError, DraftId, DraftProblem};
pub use drop_zone::{DropHandler, DropZoneError, DropZoneRegistry, DroppedFile, SyncReport, ZoneId};
pub use notify::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use session::{AdminSession, CachedSession, SessionStore, login, logout, restore_session};
pub use upload::{UploadSlot, UploadState, UploadTarget, upload_to_slot};
