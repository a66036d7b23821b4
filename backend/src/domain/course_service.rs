//! Course publishing, lookup and visibility updates.

use std::sync::Arc;

use mockable::Clock;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::auth::AuthClaims;
use super::course::{Course, CourseFilter, CourseSubmission};
use super::media::{COURSE_IMAGES, MediaUpload};
use super::media_service::MediaService;
use super::ports::{CourseRepository, CourseRepositoryError};
use super::slug::CourseSlug;
use super::visibility::{Visibility, VisibilityPatch};
use super::Error;

/// Course use cases.
#[derive(Clone)]
pub struct CourseService {
    courses: Arc<dyn CourseRepository>,
    media: MediaService,
    clock: Arc<dyn Clock>,
    image_upload_required: bool,
}

fn duplicate_slug(slug: &str) -> Error {
    Error::conflict(format!("A course with ID '{slug}' already exists."))
        .with_details(serde_json::json!({ "field": "courseId" }))
}

fn map_course_error(err: CourseRepositoryError) -> Error {
    match err {
        CourseRepositoryError::DuplicateSlug { slug } => duplicate_slug(&slug),
        other => {
            error!(error = %other, kind = other.kind(), "course repository failure");
            Error::internal(other.to_string())
        }
    }
}

impl CourseService {
    /// Create the service.
    ///
    /// When `image_upload_required` is false a failed cover upload is logged
    /// and the course is stored without an image.
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        media: MediaService,
        clock: Arc<dyn Clock>,
        image_upload_required: bool,
    ) -> Self {
        Self {
            courses,
            media,
            clock,
            image_upload_required,
        }
    }

    /// Publish a validated course.
    ///
    /// The slug is checked before the image is uploaded so a duplicate never
    /// leaves an orphaned object behind. A duplicate detected by the store
    /// itself maps to the same conflict.
    pub async fn publish(
        &self,
        submission: CourseSubmission,
        image: Option<MediaUpload>,
        author: &AuthClaims,
    ) -> Result<Course, Error> {
        if self
            .courses
            .find_by_slug(&submission.course_id)
            .await
            .map_err(map_course_error)?
            .is_some()
        {
            return Err(duplicate_slug(submission.course_id.as_str()));
        }

        let image_url = match image {
            None => submission.image_url,
            Some(upload) => match self.media.upload(upload, Some(COURSE_IMAGES)).await {
                Ok(url) => Some(url),
                Err(err) if self.image_upload_required => return Err(err),
                Err(err) => {
                    warn!(
                        error = %err,
                        slug = %submission.course_id,
                        "cover upload failed; publishing without image"
                    );
                    None
                }
            },
        };

        let course = Course {
            id: Uuid::new_v4().to_string(),
            course_id: submission.course_id,
            title: submission.title,
            description: submission.description,
            level: submission.level,
            duration: submission.duration,
            image_url,
            sections: submission.sections,
            visibility: Visibility::default(),
            created_by: Some(author.user_id.clone()),
            created_at: self.clock.utc(),
        };
        self.courses.insert(&course).await.map_err(map_course_error)?;
        info!(slug = %course.course_id, id = %course.id, "published course");
        Ok(course)
    }

    /// Courses matching `filter`.
    pub async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>, Error> {
        self.courses.list(filter).await.map_err(map_course_error)
    }

    async fn resolve(&self, id_or_slug: &str) -> Result<Option<Course>, Error> {
        if let Ok(slug) = CourseSlug::parse(id_or_slug) {
            if let Some(course) = self
                .courses
                .find_by_slug(&slug)
                .await
                .map_err(map_course_error)?
            {
                return Ok(Some(course));
            }
        }
        self.courses
            .find_by_id(id_or_slug)
            .await
            .map_err(map_course_error)
    }

    /// Fetch by slug, falling back to the record id.
    pub async fn get(&self, id_or_slug: &str) -> Result<Course, Error> {
        self.resolve(id_or_slug)
            .await?
            .ok_or_else(|| Error::not_found(format!("Course '{id_or_slug}' not found")))
    }

    /// Apply a visibility patch to the course addressed by slug or id.
    pub async fn update_visibility(
        &self,
        id_or_slug: &str,
        patch: &VisibilityPatch,
    ) -> Result<Course, Error> {
        if patch.is_empty() {
            return Err(Error::invalid_request(
                "provide visibleOnHome and/or visibleOnCatalog",
            ));
        }
        let course = self.get(id_or_slug).await?;
        self.courses
            .update_visibility(&course.id, patch)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found(format!("Course '{id_or_slug}' not found")))
    }
}

#[cfg(test)]
mod tests;
