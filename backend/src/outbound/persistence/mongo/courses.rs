//! MongoDB-backed `CourseRepository`.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::{Document, doc};
use mongodb::options::ReturnDocument;

use crate::domain::ports::{CourseRepository, CourseRepositoryError};
use crate::domain::{Course, CourseFilter, CourseSlug, VisibilityPatch};

use super::catalogue::{visibility_filter, visibility_update};
use super::documents::CourseDocument;
use super::errors::{is_duplicate_key, map_basic_mongo_error};
use super::{COURSES, MongoStore};

/// Courses stored in the `courses` collection, unique on `courseId`.
#[derive(Clone, Debug)]
pub struct MongoCourseRepository {
    courses: Collection<CourseDocument>,
}

impl MongoCourseRepository {
    /// Bind to the `courses` collection of `store`.
    #[must_use]
    pub fn new(store: &MongoStore) -> Self {
        Self {
            courses: store.database().collection(COURSES),
        }
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Course>, CourseRepositoryError> {
        let found = self
            .courses
            .find_one(filter)
            .await
            .map_err(|err| map_err(&err))?;
        found.map(decode).transpose()
    }
}

fn map_err(error: &mongodb::error::Error) -> CourseRepositoryError {
    map_basic_mongo_error(
        error,
        CourseRepositoryError::query,
        CourseRepositoryError::connection,
    )
}

fn decode(doc: CourseDocument) -> Result<Course, CourseRepositoryError> {
    Course::try_from(doc).map_err(|err| CourseRepositoryError::query(err.to_string()))
}

fn course_filter(filter: &CourseFilter) -> Document {
    let mut query = visibility_filter(&filter.visibility);
    if let Some(level) = filter.level {
        query.insert("level", level.as_str());
    }
    query
}

#[async_trait]
impl CourseRepository for MongoCourseRepository {
    async fn insert(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        match self.courses.insert_one(CourseDocument::from(course)).await {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_key(&err) => Err(CourseRepositoryError::duplicate_slug(
                course.course_id.as_str(),
            )),
            Err(err) => Err(map_err(&err)),
        }
    }

    async fn find_by_slug(
        &self,
        slug: &CourseSlug,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        self.find_one(doc! { "courseId": slug.as_str() }).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Course>, CourseRepositoryError> {
        self.find_one(doc! { "_id": id }).await
    }

    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>, CourseRepositoryError> {
        let docs: Vec<CourseDocument> = self
            .courses
            .find(course_filter(filter))
            .sort(doc! { "createdAt": 1 })
            .await
            .map_err(|err| map_err(&err))?
            .try_collect()
            .await
            .map_err(|err| map_err(&err))?;
        docs.into_iter().map(decode).collect()
    }

    async fn update_visibility(
        &self,
        id: &str,
        patch: &VisibilityPatch,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        let updated = self
            .courses
            .find_one_and_update(doc! { "_id": id }, visibility_update(patch))
            .return_document(ReturnDocument::After)
            .await
            .map_err(|err| map_err(&err))?;
        updated.map(decode).transpose()
    }
}
