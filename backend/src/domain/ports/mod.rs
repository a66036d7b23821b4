//! Domain ports defining the edges of the hexagon.
//!
//! Driven adapters (document store, object store, token signer, identity
//! provider, password hasher) implement these traits. Each port exposes a
//! typed error enum generated by `define_port_error!`.

mod macros;
pub(crate) use macros::define_port_error;

mod catalogue_repository;
mod course_repository;
mod identity_provider;
mod object_store;
mod order_repository;
mod password_hasher;
mod token_service;
mod user_repository;

pub use catalogue_repository::{
    CatalogueRepositoryError, ComponentRepository, ProductRepository, ProjectRepository,
};
pub use course_repository::{CourseRepository, CourseRepositoryError};
pub use identity_provider::{IdentityProvider, IdentityProviderError};
pub use object_store::{ObjectStore, ObjectStoreError};
pub use order_repository::{OrderRepository, OrderRepositoryError};
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use token_service::{TokenError, TokenService};
pub use user_repository::{UserRepository, UserRepositoryError};

#[cfg(test)]
pub use catalogue_repository::{
    MockComponentRepository, MockProductRepository, MockProjectRepository,
};
#[cfg(test)]
pub use course_repository::MockCourseRepository;
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
#[cfg(test)]
pub use object_store::MockObjectStore;
#[cfg(test)]
pub use order_repository::MockOrderRepository;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
#[cfg(test)]
pub use token_service::MockTokenService;
#[cfg(test)]
pub use user_repository::MockUserRepository;
