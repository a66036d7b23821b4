//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    ComponentRepository, CourseRepository, IdentityProvider, ObjectStore, OrderRepository,
    PasswordHasher, ProductRepository, ProjectRepository, TokenService, UserRepository,
};
use crate::domain::{
    AuthPorts, AuthService, CatalogueRepositories, CatalogueService, CourseService, MediaService,
    OrderService,
};

/// Default ceiling for request bodies: 50 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Parameter object bundling every port implementation the handlers need.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub identity: Arc<dyn IdentityProvider>,
    pub courses: Arc<dyn CourseRepository>,
    pub components: Arc<dyn ComponentRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub objects: Arc<dyn ObjectStore>,
    pub clock: Arc<dyn Clock>,
}

/// Behavioural switches read from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpStateOptions {
    /// Whether a failed image upload aborts the create request.
    pub image_upload_required: bool,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for HttpStateOptions {
    fn default() -> Self {
        Self {
            image_upload_required: true,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: AuthService,
    pub media: MediaService,
    pub courses: CourseService,
    pub catalogue: CatalogueService,
    pub orders: OrderService,
    pub options: HttpStateOptions,
}

impl HttpState {
    /// Wire the domain services over `ports`.
    ///
    /// Courses and the catalogue share one [`MediaService`] so every upload
    /// goes through the same key scheme.
    pub fn new(ports: HttpStatePorts, options: HttpStateOptions) -> Self {
        let HttpStatePorts {
            users,
            hasher,
            tokens,
            identity,
            courses,
            components,
            products,
            projects,
            orders,
            objects,
            clock,
        } = ports;
        let media = MediaService::new(objects, clock.clone());
        Self {
            auth: AuthService::new(AuthPorts {
                users,
                hasher,
                tokens,
                identity,
                clock: clock.clone(),
            }),
            courses: CourseService::new(
                courses,
                media.clone(),
                clock.clone(),
                options.image_upload_required,
            ),
            catalogue: CatalogueService::new(
                CatalogueRepositories {
                    components,
                    products,
                    projects,
                },
                media.clone(),
                clock.clone(),
                options.image_upload_required,
            ),
            orders: OrderService::new(orders, clock),
            media,
            options,
        }
    }
}
