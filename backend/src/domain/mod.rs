//! Domain primitives, aggregates and use cases.
//!
//! Purpose: strongly typed records for users, courses and the catalogue,
//! the validation that turns raw submissions into them, and the services
//! that orchestrate ports. Nothing here depends on actix or MongoDB.
//!
//! Public surface:
//! - `Error`/`ErrorCode`: transport-agnostic failures.
//! - `AuthService`, `CourseService`, `CatalogueService`, `OrderService`,
//!   `MediaService`: use cases consumed by inbound adapters.
//! - `ports`: traits implemented by outbound adapters.

pub mod auth;
pub mod auth_service;
pub mod catalogue;
pub mod catalogue_service;
pub mod course;
pub mod course_service;
pub mod error;
pub mod media;
pub mod media_service;
pub mod order;
pub mod order_service;
pub mod ports;
pub mod slug;
pub mod trace_id;
pub mod user;
pub mod visibility;

pub use self::auth::{
    AuthClaims, AuthSession, AuthValidationError, ExternalIdentity, LoginCredentials,
    PASSWORD_MIN_LEN, Registration,
};
pub use self::auth_service::{AuthPorts, AuthService, GOOGLE_BADGE};
pub use self::catalogue::{
    CatalogueValidationError, Comment, Component, ComponentCategory, ComponentFields,
    ComponentFilter, ComponentSubmission, Price, Product, ProductFields, ProductSubmission,
    Project, ProjectFields, ProjectStep, ProjectSubmission,
};
pub use self::catalogue_service::{CatalogueRepositories, CatalogueService};
pub use self::course::{
    Course, CourseFields, CourseFilter, CourseLevel, CourseSubmission, CourseValidationError,
    Lesson, LessonInput, Section, SectionInput,
};
pub use self::course_service::CourseService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::media::{MediaUpload, object_key, sanitise_filename};
pub use self::media_service::MediaService;
pub use self::order::{
    Order, OrderItem, OrderItemInput, OrderStatus, OrderSubmission, OrderValidationError,
    ShippingAddress, ShippingAddressInput,
};
pub use self::order_service::OrderService;
pub use self::slug::{CourseSlug, SlugValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Email, Profile, PublicUser, Role, User, UserId, UserValidationError, Username};
pub use self::visibility::{ResourceKind, Visibility, VisibilityFilter, VisibilityPatch};

/// Convenient result alias for domain operations.
pub type DomainResult<T> = Result<T, Error>;
