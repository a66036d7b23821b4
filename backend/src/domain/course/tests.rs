//! Tests for course submission validation.

use super::*;
use rstest::{fixture, rstest};

const ONE_SECTION: &str = r#"[{"title":"S1","lessons":[{"title":"L1","content":"C1"}]}]"#;

#[fixture]
fn fields() -> CourseFields {
    CourseFields {
        course_id: Some("rust-101".to_owned()),
        title: Some("Rust 101".to_owned()),
        description: Some("Ownership and borrowing".to_owned()),
        level: Some("beginner".to_owned()),
        duration: Some("4 weeks".to_owned()),
        sections: Some(ONE_SECTION.to_owned()),
        image_url: None,
    }
}

#[rstest]
fn valid_fields_build_a_submission(fields: CourseFields) {
    let submission = CourseSubmission::try_from_parts(&fields).expect("valid submission");
    assert_eq!(submission.course_id.as_str(), "rust-101");
    assert_eq!(submission.level, CourseLevel::Beginner);
    assert_eq!(
        submission.sections,
        vec![Section {
            title: "S1".to_owned(),
            lessons: vec![Lesson {
                title: "L1".to_owned(),
                content: "C1".to_owned(),
                video_url: None,
            }],
        }]
    );
}

#[rstest]
fn every_missing_field_is_listed(mut fields: CourseFields) {
    fields.course_id = None;
    fields.title = Some("   ".to_owned());
    fields.description = None;
    let err = CourseSubmission::try_from_parts(&fields).expect_err("missing fields");
    assert_eq!(
        err,
        CourseValidationError::MissingFields(vec!["courseId", "title", "description"])
    );
}

#[rstest]
fn malformed_slug_is_rejected(mut fields: CourseFields) {
    fields.course_id = Some("Rust 101".to_owned());
    let err = CourseSubmission::try_from_parts(&fields).expect_err("bad slug");
    assert_eq!(
        err,
        CourseValidationError::InvalidSlug(SlugValidationError::Malformed)
    );
}

#[rstest]
fn unknown_level_is_rejected(mut fields: CourseFields) {
    fields.level = Some("expert".to_owned());
    assert!(matches!(
        CourseSubmission::try_from_parts(&fields),
        Err(CourseValidationError::InvalidLevel(_))
    ));
}

#[rstest]
fn malformed_sections_json_is_rejected(mut fields: CourseFields) {
    fields.sections = Some("[{".to_owned());
    assert!(matches!(
        CourseSubmission::try_from_parts(&fields),
        Err(CourseValidationError::MalformedSections(_))
    ));
}

#[rstest]
#[case(None, CourseValidationError::NoSections)]
#[case(Some("[]"), CourseValidationError::NoSections)]
#[case(
    Some(r#"[{"title":"","lessons":[{"title":"L","content":"C"}]}]"#),
    CourseValidationError::SectionTitle { section: 1 }
)]
#[case(
    Some(r#"[{"title":"S","lessons":[]}]"#),
    CourseValidationError::EmptySection { section: 1 }
)]
#[case(
    Some(r#"[{"title":"S","lessons":[{"title":"L","content":"C"}]},{"title":"T","lessons":[{"title":"L","content":"C"},{"title":" ","content":"C"}]}]"#),
    CourseValidationError::LessonTitle { section: 2, lesson: 2 }
)]
#[case(
    Some(r#"[{"title":"S","lessons":[{"title":"L"}]}]"#),
    CourseValidationError::LessonContent { section: 1, lesson: 1 }
)]
fn section_structure_is_enforced(
    mut fields: CourseFields,
    #[case] sections: Option<&str>,
    #[case] expected: CourseValidationError,
) {
    fields.sections = sections.map(str::to_owned);
    assert_eq!(CourseSubmission::try_from_parts(&fields), Err(expected));
}

#[rstest]
fn validation_errors_map_to_invalid_request(mut fields: CourseFields) {
    fields.title = None;
    let err: Error = CourseSubmission::try_from_parts(&fields)
        .expect_err("missing title")
        .into();
    assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
    assert_eq!(err.details(), Some(&json!({ "fields": ["title"] })));
}

#[rstest]
#[case(" Advanced ", CourseLevel::Advanced)]
#[case("INTERMEDIATE", CourseLevel::Intermediate)]
fn levels_parse_case_insensitively(#[case] raw: &str, #[case] expected: CourseLevel) {
    assert_eq!(raw.parse::<CourseLevel>(), Ok(expected));
}
