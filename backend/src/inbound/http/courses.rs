//! Course handlers.
//!
//! ```text
//! POST  /api/courses/create   multipart or JSON publish form
//! GET   /api/courses          ?level&visibleOnHome&visibleOnCatalog
//! GET   /api/courses/{id}     slug, falling back to record id
//! PATCH /api/courses/{id}     {"visibleOnHome"?, "visibleOnCatalog"?}
//! ```

use actix_web::{HttpRequest, HttpResponse, get, patch, post, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{
    Course, CourseFields, CourseFilter, CourseLevel, CourseSubmission, VisibilityFilter,
    VisibilityPatch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::BearerAuth;
use crate::inbound::http::form::FormData;
use crate::inbound::http::schemas::{CourseSchema, ErrorSchema, VisibilityPatchSchema};
use crate::inbound::http::state::HttpState;

/// Query accepted by `GET /api/courses`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct CourseListQuery {
    /// `beginner`, `intermediate` or `advanced`.
    pub level: Option<String>,
    pub visible_on_home: Option<bool>,
    pub visible_on_catalog: Option<bool>,
}

impl CourseListQuery {
    fn into_filter(self) -> ApiResult<CourseFilter> {
        let level = self
            .level
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(str::parse::<CourseLevel>)
            .transpose()?;
        Ok(CourseFilter {
            level,
            visibility: VisibilityFilter {
                visible_on_home: self.visible_on_home,
                visible_on_catalog: self.visible_on_catalog,
            },
        })
    }
}

fn course_fields(form: &FormData) -> CourseFields {
    CourseFields {
        course_id: form.text("courseId"),
        title: form.text("title"),
        description: form.text("description"),
        level: form.text("level"),
        duration: form.text("duration"),
        sections: form.text("sections"),
        image_url: form.text("imageUrl"),
    }
}

/// Publish a course with an optional cover image.
///
/// Fields are validated before the slug is checked for uniqueness and the
/// image is uploaded only once both pass.
#[utoipa::path(
    post,
    path = "/api/courses/create",
    request_body(
        content_type = "multipart/form-data",
        description = "courseId, title, description, level, duration, sections (JSON array) and either an `image` file or an `imageUrl`"
    ),
    responses(
        (status = 201, description = "Course published", body = CourseSchema),
        (status = 400, description = "Missing or invalid field", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 409, description = "Slug already taken", body = ErrorSchema),
        (status = 413, description = "Body too large", body = ErrorSchema),
        (status = 500, description = "Cover upload failed", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "createCourse"
)]
#[post("/create")]
pub async fn create_course(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    req: HttpRequest,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let mut form = FormData::read(&req, payload, state.options.max_upload_bytes).await?;
    let submission = CourseSubmission::try_from_parts(&course_fields(&form))?;
    let image = form.take_file("image");
    let course = state
        .courses
        .publish(submission, image, auth.claims())
        .await?;
    Ok(HttpResponse::Created().json(course))
}

/// List courses in publication order.
#[utoipa::path(
    get,
    path = "/api/courses",
    params(CourseListQuery),
    responses(
        (status = 200, description = "Matching courses", body = [CourseSchema]),
        (status = 400, description = "Invalid filter", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "listCourses",
    security([])
)]
#[get("")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    query: web::Query<CourseListQuery>,
) -> ApiResult<web::Json<Vec<Course>>> {
    let filter = query.into_inner().into_filter()?;
    state.courses.list(&filter).await.map(web::Json)
}

/// Fetch one course by slug or record id.
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = String, Path, description = "Course slug or record id")),
    responses(
        (status = 200, description = "Course", body = CourseSchema),
        (status = 404, description = "No such course", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "getCourse",
    security([])
)]
#[get("/{id}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Course>> {
    state.courses.get(&path.into_inner()).await.map(web::Json)
}

/// Toggle a course's home and catalogue visibility.
#[utoipa::path(
    patch,
    path = "/api/courses/{id}",
    params(("id" = String, Path, description = "Course slug or record id")),
    request_body = VisibilityPatchSchema,
    responses(
        (status = 200, description = "Updated course", body = CourseSchema),
        (status = 400, description = "Empty patch", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 404, description = "No such course", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "patchCourse"
)]
#[patch("/{id}")]
pub async fn patch_course(
    state: web::Data<HttpState>,
    _auth: BearerAuth,
    path: web::Path<String>,
    patch: web::Json<VisibilityPatch>,
) -> ApiResult<web::Json<Course>> {
    state
        .courses
        .update_visibility(&path.into_inner(), &patch.into_inner())
        .await
        .map(web::Json)
}
