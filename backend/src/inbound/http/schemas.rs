//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the serialised shape of their domain types but
//! live in the inbound adapter layer where framework concerns belong.

#![expect(
    dead_code,
    reason = "Schema wrappers are used only for OpenAPI generation via utoipa"
)]

use utoipa::ToSchema;

/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = ErrorCode, rename_all = "snake_case")]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// A unique key is already taken.
    Conflict,
    /// The request body exceeds the upload limit.
    PayloadTooLarge,
    /// Object storage is not available.
    StorageUnavailable,
    /// Writing to object storage failed.
    UploadFailed,
    /// An unexpected error occurred on the server.
    InternalError,
}

/// API error response payload.
#[derive(ToSchema)]
#[schema(as = Error, rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Human-readable message returned to clients.
    #[schema(example = "A course with ID 'rust-101' already exists.")]
    error: String,
    /// Stable machine-readable error code.
    code: ErrorCodeSchema,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary details such as the offending field.
    details: Option<serde_json::Value>,
}

/// Account role.
#[derive(ToSchema)]
#[schema(as = Role, rename_all = "snake_case")]
pub enum RoleSchema {
    Student,
    ContentCreator,
    Admin,
}

/// Public profile fields.
#[derive(ToSchema)]
#[schema(as = Profile, rename_all = "camelCase")]
pub struct ProfileSchema {
    bio: Option<String>,
    avatar_url: Option<String>,
}

/// Client-facing user projection. Never carries the password hash.
#[derive(ToSchema)]
#[schema(as = PublicUser, rename_all = "camelCase")]
pub struct PublicUserSchema {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    #[schema(example = "ada")]
    username: String,
    #[schema(example = "ada@example.com")]
    email: String,
    role: RoleSchema,
    points: u32,
    badges: Vec<String>,
    profile: ProfileSchema,
    #[schema(example = "en")]
    language_preference: String,
}

/// Token and user returned by every sign-in endpoint.
#[derive(ToSchema)]
#[schema(as = AuthSession)]
pub struct AuthSessionSchema {
    /// HS256 bearer token valid for 24 hours.
    token: String,
    user: PublicUserSchema,
}

/// Course lesson.
#[derive(ToSchema)]
#[schema(as = Lesson, rename_all = "camelCase")]
pub struct LessonSchema {
    title: String,
    content: String,
    video_url: Option<String>,
}

/// Course section.
#[derive(ToSchema)]
#[schema(as = Section)]
pub struct SectionSchema {
    title: String,
    lessons: Vec<LessonSchema>,
}

/// Course difficulty.
#[derive(ToSchema)]
#[schema(as = CourseLevel, rename_all = "lowercase")]
pub enum CourseLevelSchema {
    Beginner,
    Intermediate,
    Advanced,
}

/// Stored course.
#[derive(ToSchema)]
#[schema(as = Course, rename_all = "camelCase")]
pub struct CourseSchema {
    id: String,
    /// URL slug, unique across courses.
    #[schema(example = "rust-101")]
    course_id: String,
    title: String,
    description: String,
    level: CourseLevelSchema,
    duration: String,
    image_url: Option<String>,
    sections: Vec<SectionSchema>,
    visible_on_home: bool,
    visible_on_catalog: bool,
    created_by: Option<String>,
    created_at: String,
}

/// Component category.
#[derive(ToSchema)]
#[schema(as = ComponentCategory, rename_all = "lowercase")]
pub enum ComponentCategorySchema {
    Sensor,
    Actuator,
    Microcontroller,
    Sbc,
}

/// Stored hardware component.
#[derive(ToSchema)]
#[schema(as = Component, rename_all = "camelCase")]
pub struct ComponentSchema {
    id: String,
    name: String,
    category: ComponentCategorySchema,
    description: String,
    image_url: Option<String>,
    visible_on_home: bool,
    visible_on_catalog: bool,
    created_by: Option<String>,
    created_at: String,
}

/// Stored marketplace product.
#[derive(ToSchema)]
#[schema(as = Product, rename_all = "camelCase")]
pub struct ProductSchema {
    id: String,
    name: String,
    #[schema(example = 19.99)]
    price: f64,
    description: String,
    image_url: Option<String>,
    visible_on_home: bool,
    visible_on_catalog: bool,
    created_by: Option<String>,
    created_at: String,
}

/// Project walkthrough step.
#[derive(ToSchema)]
#[schema(as = ProjectStep, rename_all = "camelCase")]
pub struct ProjectStepSchema {
    text: String,
    image_url: Option<String>,
}

/// Project comment.
#[derive(ToSchema)]
#[schema(as = Comment, rename_all = "camelCase")]
pub struct CommentSchema {
    author: String,
    text: String,
    created_at: String,
}

/// Stored community project.
#[derive(ToSchema)]
#[schema(as = Project, rename_all = "camelCase")]
pub struct ProjectSchema {
    id: String,
    title: String,
    description: String,
    steps: Vec<ProjectStepSchema>,
    image_url: Option<String>,
    author: String,
    likes: u32,
    comments: Vec<CommentSchema>,
    created_at: String,
}

/// Partial visibility update; at least one flag is required.
#[derive(ToSchema)]
#[schema(as = VisibilityPatch, rename_all = "camelCase")]
pub struct VisibilityPatchSchema {
    visible_on_home: Option<bool>,
    visible_on_catalog: Option<bool>,
}

/// Order line.
#[derive(ToSchema)]
#[schema(as = OrderItem, rename_all = "camelCase")]
pub struct OrderItemSchema {
    product_id: String,
    name: String,
    quantity: u32,
    unit_price: f64,
}

/// Shipping destination.
#[derive(ToSchema)]
#[schema(as = ShippingAddress, rename_all = "camelCase")]
pub struct ShippingAddressSchema {
    line1: String,
    city: String,
    postal_code: String,
    country: String,
}

/// Order fulfilment status.
#[derive(ToSchema)]
#[schema(as = OrderStatus, rename_all = "lowercase")]
pub enum OrderStatusSchema {
    Pending,
    Shipped,
    Delivered,
}

/// Stored order.
#[derive(ToSchema)]
#[schema(as = Order, rename_all = "camelCase")]
pub struct OrderSchema {
    id: String,
    user: String,
    items: Vec<OrderItemSchema>,
    total_price: f64,
    status: OrderStatusSchema,
    shipping_address: ShippingAddressSchema,
    created_at: String,
}
