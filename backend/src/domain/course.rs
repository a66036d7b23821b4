//! Courses: slug-addressed records made of ordered sections and lessons.
//!
//! [`CourseSubmission::try_from_parts`] performs every synchronous check the
//! publish pipeline needs before any upload or write is attempted.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::slug::{CourseSlug, SlugValidationError};
use super::user::UserId;
use super::visibility::{Visibility, VisibilityFilter};
use super::Error;

/// Difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    /// Introductory material.
    Beginner,
    /// Assumes prior exposure.
    Intermediate,
    /// Expert material.
    Advanced,
}

impl CourseLevel {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CourseLevel {
    type Err = CourseValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(CourseValidationError::InvalidLevel(s.to_owned())),
        }
    }
}

/// One lesson inside a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// Non-empty lesson title.
    pub title: String,
    /// Non-empty lesson body.
    pub content: String,
    /// Uploaded lesson video, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// Ordered group of lessons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Non-empty section title.
    pub title: String,
    /// At least one lesson, in display order.
    pub lessons: Vec<Lesson>,
}

/// Stored course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Record identifier assigned by the server.
    pub id: String,
    /// Unique public slug, serialised as `courseId`.
    pub course_id: CourseSlug,
    pub title: String,
    pub description: String,
    pub level: CourseLevel,
    /// Free text such as "6 weeks"; may be empty.
    pub duration: String,
    /// Public cover image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub sections: Vec<Section>,
    /// Home page and catalogue flags, flattened into the record.
    #[serde(flatten)]
    pub visibility: Visibility,
    /// Account that published the course.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// List filter for courses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub level: Option<CourseLevel>,
    pub visibility: VisibilityFilter,
}

impl CourseFilter {
    /// Whether `course` passes every constraint.
    #[must_use]
    pub fn matches(&self, course: &Course) -> bool {
        self.level.is_none_or(|level| level == course.level)
            && self.visibility.matches(&course.visibility)
    }
}

/// Section as submitted, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub lessons: Vec<LessonInput>,
}

/// Lesson as submitted, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

/// Raw publish form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFields {
    pub course_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub level: Option<String>,
    pub duration: Option<String>,
    /// JSON-encoded section array as received.
    pub sections: Option<String>,
    /// Cover URL from an earlier upload.
    pub image_url: Option<String>,
}

/// Validation failures for a course submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CourseValidationError {
    /// One or more required fields were missing or blank.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    /// The level was not one of the known values.
    #[error("level must be beginner, intermediate, or advanced (got '{0}')")]
    InvalidLevel(String),
    /// The slug failed the grammar.
    #[error(transparent)]
    InvalidSlug(#[from] SlugValidationError),
    /// The sections field was not a JSON array of sections.
    #[error("sections must be a JSON array: {0}")]
    MalformedSections(String),
    /// No sections were supplied.
    #[error("at least one section is required")]
    NoSections,
    /// A section title was blank.
    #[error("section {section} needs a title")]
    SectionTitle {
        /// One-based section number.
        section: usize,
    },
    /// A section had no lessons.
    #[error("section {section} needs at least one lesson")]
    EmptySection {
        /// One-based section number.
        section: usize,
    },
    /// A lesson title was blank.
    #[error("lesson {lesson} in section {section} needs a title")]
    LessonTitle {
        /// One-based section number.
        section: usize,
        /// One-based lesson number.
        lesson: usize,
    },
    /// A lesson body was blank.
    #[error("lesson {lesson} in section {section} needs content")]
    LessonContent {
        /// One-based section number.
        section: usize,
        /// One-based lesson number.
        lesson: usize,
    },
}

impl From<CourseValidationError> for Error {
    fn from(value: CourseValidationError) -> Self {
        let details = match &value {
            CourseValidationError::MissingFields(fields) => json!({ "fields": fields }),
            CourseValidationError::InvalidLevel(_) => json!({ "field": "level" }),
            CourseValidationError::InvalidSlug(_) => json!({ "field": "courseId" }),
            _ => json!({ "field": "sections" }),
        };
        Self::invalid_request(value.to_string()).with_details(details)
    }
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Course contents validated and ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSubmission {
    pub course_id: CourseSlug,
    pub title: String,
    pub description: String,
    pub level: CourseLevel,
    pub duration: String,
    pub sections: Vec<Section>,
    /// Previously uploaded cover; an image sent with the request wins.
    pub image_url: Option<String>,
}

impl CourseSubmission {
    /// Validate raw form fields.
    ///
    /// Missing fields are reported together; the slug is checked after the
    /// presence checks and the sections last.
    pub fn try_from_parts(fields: &CourseFields) -> Result<Self, CourseValidationError> {
        let course_id = present(fields.course_id.as_ref());
        let title = present(fields.title.as_ref());
        let description = present(fields.description.as_ref());
        let level = present(fields.level.as_ref());

        let (Some(course_id), Some(title), Some(description), Some(level)) =
            (course_id, title, description, level)
        else {
            let missing = [
                ("courseId", course_id),
                ("title", title),
                ("description", description),
                ("level", level),
            ]
            .into_iter()
            .filter_map(|(name, value)| value.is_none().then_some(name))
            .collect();
            return Err(CourseValidationError::MissingFields(missing));
        };

        let level: CourseLevel = level.parse()?;
        let course_id = CourseSlug::parse(course_id)?;
        let raw_sections = parse_sections(fields.sections.as_deref())?;
        let sections = validate_sections(raw_sections)?;

        Ok(Self {
            course_id,
            title: title.to_owned(),
            description: description.to_owned(),
            level,
            duration: present(fields.duration.as_ref()).unwrap_or_default().to_owned(),
            sections,
            image_url: present(fields.image_url.as_ref()).map(str::to_owned),
        })
    }
}

/// Decode the JSON `sections` field. Absent or blank input is an empty list.
pub fn parse_sections(raw: Option<&str>) -> Result<Vec<SectionInput>, CourseValidationError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Vec::new()),
        Some(text) => serde_json::from_str(text)
            .map_err(|err| CourseValidationError::MalformedSections(err.to_string())),
    }
}

/// Check section and lesson structure, trimming titles.
pub fn validate_sections(raw: Vec<SectionInput>) -> Result<Vec<Section>, CourseValidationError> {
    if raw.is_empty() {
        return Err(CourseValidationError::NoSections);
    }
    raw.into_iter()
        .enumerate()
        .map(|(index, section)| {
            let number = index + 1;
            let title = present(section.title.as_ref())
                .ok_or(CourseValidationError::SectionTitle { section: number })?
                .to_owned();
            if section.lessons.is_empty() {
                return Err(CourseValidationError::EmptySection { section: number });
            }
            let lessons = section
                .lessons
                .into_iter()
                .enumerate()
                .map(|(lesson_index, lesson)| validate_lesson(number, lesson_index + 1, lesson))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Section { title, lessons })
        })
        .collect()
}

fn validate_lesson(
    section: usize,
    lesson: usize,
    input: LessonInput,
) -> Result<Lesson, CourseValidationError> {
    let title = present(input.title.as_ref())
        .ok_or(CourseValidationError::LessonTitle { section, lesson })?
        .to_owned();
    let content = present(input.content.as_ref())
        .ok_or(CourseValidationError::LessonContent { section, lesson })?
        .to_owned();
    Ok(Lesson {
        title,
        content,
        video_url: present(input.video_url.as_ref()).map(str::to_owned),
    })
}

#[cfg(test)]
mod tests;
