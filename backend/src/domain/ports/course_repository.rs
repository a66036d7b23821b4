//! Port for course persistence.
//!
//! Slugs are unique at the storage level; adapters must report a violated
//! uniqueness constraint as [`CourseRepositoryError::DuplicateSlug`] so that a
//! publish race surfaces the same conflict as the pre-insert check.

use async_trait::async_trait;

use crate::domain::{Course, CourseFilter, CourseSlug, VisibilityPatch};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by course repository adapters.
    pub enum CourseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "course repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "course repository query failed: {message}",
        /// Another course already uses the slug.
        DuplicateSlug { slug: String } => "course slug already exists: {slug}",
    }
}

/// Storage for courses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Insert a new course.
    async fn insert(&self, course: &Course) -> Result<(), CourseRepositoryError>;

    /// Look a course up by slug.
    async fn find_by_slug(&self, slug: &CourseSlug)
    -> Result<Option<Course>, CourseRepositoryError>;

    /// Look a course up by record identifier.
    async fn find_by_id(&self, id: &str) -> Result<Option<Course>, CourseRepositoryError>;

    /// Courses matching `filter`, in insertion order.
    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>, CourseRepositoryError>;

    /// Apply a visibility patch to the record `id`, returning the updated
    /// course or `None` when the id is unknown.
    async fn update_visibility(
        &self,
        id: &str,
        patch: &VisibilityPatch,
    ) -> Result<Option<Course>, CourseRepositoryError>;
}
