//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api` handler plus the health checks, the
//! schema wrappers from [`crate::inbound::http::schemas`], and a bearer
//! security scheme applied to every operation that does not opt out with
//! `security([])`.
//!
//! The document backs Swagger UI in debug builds and is printed by the
//! `openapi-dump` binary.

use crate::inbound::http::auth::{GoogleSignRequest, LoginRequest, RegisterRequest};
use crate::inbound::http::health::HealthReport;
use crate::inbound::http::orders::{OrderItemRequest, PlaceOrderRequest, ShippingAddressRequest};
use crate::inbound::http::schemas::{
    AuthSessionSchema, CommentSchema, ComponentCategorySchema, ComponentSchema, CourseLevelSchema,
    CourseSchema, ErrorCodeSchema, ErrorSchema, LessonSchema, OrderItemSchema, OrderSchema,
    OrderStatusSchema, ProductSchema, ProfileSchema, ProjectSchema, ProjectStepSchema,
    PublicUserSchema, RoleSchema, SectionSchema, ShippingAddressSchema, VisibilityPatchSchema,
};
use crate::inbound::http::upload::UploadResponse;
use crate::inbound::http::visibility::UpdateVisibilityRequest;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme in the generated document.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Add the JWT bearer scheme to the document's components.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "HS256 token returned by the register, login and googleSign endpoints.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Courseware API",
        description = "Course publishing, hardware catalogue and marketplace backend.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::google_sign,
        crate::inbound::http::auth::current_user,
        crate::inbound::http::upload::upload_file,
        crate::inbound::http::courses::create_course,
        crate::inbound::http::courses::list_courses,
        crate::inbound::http::courses::get_course,
        crate::inbound::http::courses::patch_course,
        crate::inbound::http::catalogue::create_component,
        crate::inbound::http::catalogue::list_components,
        crate::inbound::http::catalogue::patch_component,
        crate::inbound::http::catalogue::create_product,
        crate::inbound::http::catalogue::list_products,
        crate::inbound::http::catalogue::patch_product,
        crate::inbound::http::catalogue::create_project,
        crate::inbound::http::catalogue::list_projects,
        crate::inbound::http::visibility::update_visibility,
        crate::inbound::http::orders::place_order,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RoleSchema,
        ProfileSchema,
        PublicUserSchema,
        AuthSessionSchema,
        LessonSchema,
        SectionSchema,
        CourseLevelSchema,
        CourseSchema,
        ComponentCategorySchema,
        ComponentSchema,
        ProductSchema,
        ProjectStepSchema,
        CommentSchema,
        ProjectSchema,
        VisibilityPatchSchema,
        OrderItemSchema,
        ShippingAddressSchema,
        OrderStatusSchema,
        OrderSchema,
        RegisterRequest,
        LoginRequest,
        GoogleSignRequest,
        UploadResponse,
        UpdateVisibilityRequest,
        OrderItemRequest,
        ShippingAddressRequest,
        PlaceOrderRequest,
        HealthReport,
    )),
    tags(
        (name = "auth", description = "Registration, sign-in and the current account"),
        (name = "media", description = "Direct uploads to object storage"),
        (name = "courses", description = "Course publishing and browsing"),
        (name = "components", description = "Hardware component catalogue"),
        (name = "products", description = "Marketplace products"),
        (name = "projects", description = "Community projects"),
        (name = "visibility", description = "Home page and catalogue visibility"),
        (name = "orders", description = "Marketplace orders"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
