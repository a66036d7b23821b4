//! The course being authored: ordered sections, each with ordered lessons.
//!
//! Sections and lessons carry a [`DraftId`] that stays stable while the tree
//! is edited, so upload slots and drop zones can follow them. Display labels
//! ("Section N", "Lesson N") are recomputed after every insertion and
//! removal.

use serde::Serialize;

use crate::domain::slug::is_valid_slug;
use crate::domain::{CourseLevel, LessonInput, SectionInput};

use super::upload::{UploadSlot, UploadTarget};

/// Stable identity of a section or lesson inside one draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DraftId(u64);

/// Edits that name a section or lesson the draft does not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("no section {0:?}")]
    UnknownSection(DraftId),
    #[error("no lesson {0:?}")]
    UnknownLesson(DraftId),
}

/// One problem found by [`CourseDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftProblem {
    /// Field path, e.g. `sections[1].lessons[0].content`.
    pub path: String,
    pub message: String,
}

impl DraftProblem {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonDraft {
    id: DraftId,
    label: String,
    pub title: String,
    pub content: String,
    pub video: UploadSlot,
}

impl LessonDraft {
    #[must_use]
    pub fn id(&self) -> DraftId {
        self.id
    }

    /// "Lesson N", counted within the section.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDraft {
    id: DraftId,
    label: String,
    pub title: String,
    lessons: Vec<LessonDraft>,
}

impl SectionDraft {
    #[must_use]
    pub fn id(&self) -> DraftId {
        self.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn lessons(&self) -> &[LessonDraft] {
        &self.lessons
    }
}

/// Course being authored in the admin client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseDraft {
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub level: String,
    pub duration: String,
    pub cover: UploadSlot,
    sections: Vec<SectionDraft>,
    next_id: u64,
}

/// Body of `POST /api/courses/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePayload {
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub level: String,
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub sections: Vec<SectionInput>,
}

fn trimmed(value: &str) -> String {
    value.trim().to_owned()
}

impl CourseDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&mut self) -> DraftId {
        self.next_id += 1;
        DraftId(self.next_id)
    }

    #[must_use]
    pub fn sections(&self) -> &[SectionDraft] {
        &self.sections
    }

    /// Append an empty section.
    pub fn add_section(&mut self) -> DraftId {
        self.insert_section(self.sections.len())
    }

    /// Insert an empty section at `at`, clamped to the end.
    pub fn insert_section(&mut self, at: usize) -> DraftId {
        let id = self.fresh_id();
        let at = at.min(self.sections.len());
        self.sections.insert(
            at,
            SectionDraft {
                id,
                label: String::new(),
                title: String::new(),
                lessons: Vec::new(),
            },
        );
        self.renumber();
        id
    }

    pub fn remove_section(&mut self, section: DraftId) -> Result<SectionDraft, DraftError> {
        let index = self
            .sections
            .iter()
            .position(|s| s.id == section)
            .ok_or(DraftError::UnknownSection(section))?;
        let removed = self.sections.remove(index);
        self.renumber();
        Ok(removed)
    }

    /// Append an empty lesson to `section`.
    pub fn add_lesson(&mut self, section: DraftId) -> Result<DraftId, DraftError> {
        let len = self.section(section)?.lessons.len();
        self.insert_lesson(section, len)
    }

    /// Insert an empty lesson into `section` at `at`, clamped to the end.
    pub fn insert_lesson(&mut self, section: DraftId, at: usize) -> Result<DraftId, DraftError> {
        let id = self.fresh_id();
        let lessons = &mut self.section_mut(section)?.lessons;
        let at = at.min(lessons.len());
        lessons.insert(
            at,
            LessonDraft {
                id,
                label: String::new(),
                title: String::new(),
                content: String::new(),
                video: UploadSlot::new(),
            },
        );
        self.renumber();
        Ok(id)
    }

    pub fn remove_lesson(&mut self, lesson: DraftId) -> Result<LessonDraft, DraftError> {
        let (section_index, lesson_index) = self
            .locate_lesson(lesson)
            .ok_or(DraftError::UnknownLesson(lesson))?;
        let removed = self.sections[section_index].lessons.remove(lesson_index);
        self.renumber();
        Ok(removed)
    }

    pub fn section(&self, section: DraftId) -> Result<&SectionDraft, DraftError> {
        self.sections
            .iter()
            .find(|s| s.id == section)
            .ok_or(DraftError::UnknownSection(section))
    }

    pub fn section_mut(&mut self, section: DraftId) -> Result<&mut SectionDraft, DraftError> {
        self.sections
            .iter_mut()
            .find(|s| s.id == section)
            .ok_or(DraftError::UnknownSection(section))
    }

    pub fn lesson_mut(&mut self, lesson: DraftId) -> Result<&mut LessonDraft, DraftError> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.lessons.iter_mut())
            .find(|l| l.id == lesson)
            .ok_or(DraftError::UnknownLesson(lesson))
    }

    /// Slot behind `target`.
    pub fn slot_mut(&mut self, target: UploadTarget) -> Result<&mut UploadSlot, DraftError> {
        match target {
            UploadTarget::CourseCover => Ok(&mut self.cover),
            UploadTarget::LessonVideo(lesson) => Ok(&mut self.lesson_mut(lesson)?.video),
        }
    }

    fn locate_lesson(&self, lesson: DraftId) -> Option<(usize, usize)> {
        self.sections.iter().enumerate().find_map(|(si, section)| {
            section
                .lessons
                .iter()
                .position(|l| l.id == lesson)
                .map(|li| (si, li))
        })
    }

    fn renumber(&mut self) {
        for (si, section) in self.sections.iter_mut().enumerate() {
            section.label = format!("Section {}", si + 1);
            for (li, lesson) in section.lessons.iter_mut().enumerate() {
                lesson.label = format!("Lesson {}", li + 1);
            }
        }
    }

    /// Every target that needs a drop zone, in display order.
    #[must_use]
    pub fn upload_targets(&self) -> Vec<UploadTarget> {
        std::iter::once(UploadTarget::CourseCover)
            .chain(
                self.sections
                    .iter()
                    .flat_map(|s| s.lessons.iter())
                    .map(|l| UploadTarget::LessonVideo(l.id)),
            )
            .collect()
    }

    /// Check the draft against the server's publish rules, collecting every
    /// problem instead of stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<DraftProblem>> {
        let mut problems = Vec::new();
        for (path, value) in [
            ("courseId", &self.course_id),
            ("title", &self.title),
            ("description", &self.description),
            ("level", &self.level),
        ] {
            if value.trim().is_empty() {
                problems.push(DraftProblem::new(path, "is required"));
            }
        }
        let course_id = self.course_id.trim();
        if !course_id.is_empty() && !is_valid_slug(course_id) {
            problems.push(DraftProblem::new(
                "courseId",
                "must be lowercase letters and digits separated by single hyphens",
            ));
        }
        let level = self.level.trim();
        if !level.is_empty() && level.parse::<CourseLevel>().is_err() {
            problems.push(DraftProblem::new(
                "level",
                "must be beginner, intermediate or advanced",
            ));
        }
        if self.sections.is_empty() {
            problems.push(DraftProblem::new("sections", "add at least one section"));
        }
        if self.cover.is_pending() {
            problems.push(DraftProblem::new("imageUrl", "cover upload still in progress"));
        }
        for (si, section) in self.sections.iter().enumerate() {
            let base = format!("sections[{si}]");
            if section.title.trim().is_empty() {
                problems.push(DraftProblem::new(format!("{base}.title"), "is required"));
            }
            if section.lessons.is_empty() {
                problems.push(DraftProblem::new(
                    format!("{base}.lessons"),
                    "add at least one lesson",
                ));
            }
            for (li, lesson) in section.lessons.iter().enumerate() {
                let base = format!("{base}.lessons[{li}]");
                if lesson.title.trim().is_empty() {
                    problems.push(DraftProblem::new(format!("{base}.title"), "is required"));
                }
                if lesson.content.trim().is_empty() {
                    problems.push(DraftProblem::new(format!("{base}.content"), "is required"));
                }
                if lesson.video.is_pending() {
                    problems.push(DraftProblem::new(
                        format!("{base}.videoUrl"),
                        "video upload still in progress",
                    ));
                }
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }

    /// Publish body. Only URLs of completed uploads are included.
    #[must_use]
    pub fn to_payload(&self) -> CoursePayload {
        CoursePayload {
            course_id: trimmed(&self.course_id),
            title: trimmed(&self.title),
            description: trimmed(&self.description),
            level: trimmed(&self.level).to_lowercase(),
            duration: trimmed(&self.duration),
            image_url: self.cover.url().map(str::to_owned),
            sections: self
                .sections
                .iter()
                .map(|section| SectionInput {
                    title: Some(trimmed(&section.title)),
                    lessons: section
                        .lessons
                        .iter()
                        .map(|lesson| LessonInput {
                            title: Some(trimmed(&lesson.title)),
                            content: Some(trimmed(&lesson.content)),
                            video_url: lesson.video.url().map(str::to_owned),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::notify::RecordingNotifier;
    use crate::domain::{CourseFields, CourseSubmission};
    use rstest::{fixture, rstest};

    fn labels(draft: &CourseDraft, section: usize) -> Vec<String> {
        draft.sections()[section]
            .lessons()
            .iter()
            .map(|l| l.label().to_owned())
            .collect()
    }

    #[fixture]
    fn complete() -> CourseDraft {
        let mut draft = CourseDraft::new();
        draft.course_id = "intro-to-rust".to_owned();
        draft.title = "Intro to Rust".to_owned();
        draft.description = "Ownership and borrowing".to_owned();
        draft.level = "Beginner".to_owned();
        let section = draft.add_section();
        draft.section_mut(section).expect("section").title = "Basics".to_owned();
        let lesson = draft.add_lesson(section).expect("section");
        let lesson = draft.lesson_mut(lesson).expect("lesson");
        lesson.title = "Hello".to_owned();
        lesson.content = "fn main() {}".to_owned();
        draft
    }

    #[rstest]
    fn labels_are_renumbered_after_removal() {
        let mut draft = CourseDraft::new();
        let section = draft.add_section();
        let first = draft.add_lesson(section).expect("section");
        draft.add_lesson(section).expect("section");
        draft.add_lesson(section).expect("section");

        draft.remove_lesson(first).expect("lesson");

        assert_eq!(labels(&draft, 0), ["Lesson 1", "Lesson 2"]);
    }

    #[rstest]
    fn insertion_renumbers_sections_and_lessons() {
        let mut draft = CourseDraft::new();
        let a = draft.add_section();
        let first = draft.add_lesson(a).expect("section");
        let b = draft.insert_section(0);
        let inserted = draft.insert_lesson(a, 0).expect("section");

        let section_labels: Vec<_> = draft.sections().iter().map(|s| s.label().to_owned()).collect();
        assert_eq!(section_labels, ["Section 1", "Section 2"]);
        assert_eq!(draft.sections()[0].id(), b);
        let lessons = draft.section(a).expect("section").lessons();
        assert_eq!(lessons[0].id(), inserted);
        assert_eq!(lessons[1].id(), first);
        assert_eq!(lessons[1].label(), "Lesson 2");
    }

    #[rstest]
    fn ids_are_never_reused() {
        let mut draft = CourseDraft::new();
        let section = draft.add_section();
        let first = draft.add_lesson(section).expect("section");
        draft.remove_lesson(first).expect("lesson");
        let second = draft.add_lesson(section).expect("section");

        assert_ne!(first, second);
        assert_eq!(draft.remove_lesson(first), Err(DraftError::UnknownLesson(first)));
    }

    #[rstest]
    fn removing_a_section_drops_its_upload_targets() {
        let mut draft = CourseDraft::new();
        let a = draft.add_section();
        let b = draft.add_section();
        let in_a = draft.add_lesson(a).expect("section");
        let in_b = draft.add_lesson(b).expect("section");

        draft.remove_section(a).expect("section");

        assert_eq!(
            draft.upload_targets(),
            [UploadTarget::CourseCover, UploadTarget::LessonVideo(in_b)]
        );
        assert!(!draft.upload_targets().contains(&UploadTarget::LessonVideo(in_a)));
        assert_eq!(draft.sections()[0].label(), "Section 1");
    }

    #[rstest]
    fn empty_draft_reports_every_problem() {
        let problems = CourseDraft::new().validate().expect_err("invalid");
        let paths: Vec<_> = problems.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, ["courseId", "title", "description", "level", "sections"]);
    }

    #[rstest]
    fn nested_problems_carry_their_path(mut complete: CourseDraft) {
        complete.course_id = "Intro To Rust".to_owned();
        let section = complete.sections()[0].id();
        complete.add_lesson(section).expect("section");
        complete.add_section();

        let problems = complete.validate().expect_err("invalid");
        let paths: Vec<_> = problems.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "courseId",
                "sections[0].lessons[1].title",
                "sections[0].lessons[1].content",
                "sections[1].title",
                "sections[1].lessons",
            ]
        );
    }

    #[rstest]
    fn pending_uploads_block_publishing(mut complete: CourseDraft) {
        let notifier = RecordingNotifier::default();
        complete.cover.begin(UploadTarget::CourseCover, "cover.png", &notifier);

        let problems = complete.validate().expect_err("pending");
        assert_eq!(problems[0].path, "imageUrl");
    }

    #[rstest]
    fn payload_passes_server_validation(mut complete: CourseDraft) {
        let notifier = RecordingNotifier::default();
        let lesson = complete.sections()[0].lessons()[0].id();
        complete
            .slot_mut(UploadTarget::LessonVideo(lesson))
            .expect("slot")
            .finish(
                UploadTarget::LessonVideo(lesson),
                Ok("https://storage.test/lesson_videos/hello.mp4".to_owned()),
                &notifier,
            );
        complete.validate().expect("valid draft");

        let payload = complete.to_payload();
        assert_eq!(payload.level, "beginner");
        assert!(payload.image_url.is_none());

        let submission = CourseSubmission::try_from_parts(&CourseFields {
            course_id: Some(payload.course_id.clone()),
            title: Some(payload.title.clone()),
            description: Some(payload.description.clone()),
            level: Some(payload.level.clone()),
            duration: Some(payload.duration.clone()),
            sections: Some(serde_json::to_string(&payload.sections).expect("json")),
            image_url: payload.image_url.clone(),
        })
        .expect("server accepts the payload");
        assert_eq!(
            submission.sections[0].lessons[0].video_url.as_deref(),
            Some("https://storage.test/lesson_videos/hello.mp4")
        );
    }
}
