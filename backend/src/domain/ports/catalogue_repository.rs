//! Ports for components, products and projects.

use async_trait::async_trait;

use crate::domain::{
    Component, ComponentFilter, Product, Project, VisibilityFilter, VisibilityPatch,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors shared by the catalogue repositories.
    pub enum CatalogueRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "catalogue repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "catalogue repository query failed: {message}",
    }
}

/// Storage for hardware components.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComponentRepository: Send + Sync {
    /// Insert a new component.
    async fn insert(&self, component: &Component) -> Result<(), CatalogueRepositoryError>;

    /// Components matching `filter`, in insertion order.
    async fn list(&self, filter: &ComponentFilter)
    -> Result<Vec<Component>, CatalogueRepositoryError>;

    /// Patch visibility; `None` when `id` is unknown.
    async fn update_visibility(
        &self,
        id: &str,
        patch: &VisibilityPatch,
    ) -> Result<Option<Component>, CatalogueRepositoryError>;
}

/// Storage for marketplace products.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a new product.
    async fn insert(&self, product: &Product) -> Result<(), CatalogueRepositoryError>;

    /// Products matching `filter`, in insertion order.
    async fn list(&self, filter: &VisibilityFilter)
    -> Result<Vec<Product>, CatalogueRepositoryError>;

    /// Patch visibility; `None` when `id` is unknown.
    async fn update_visibility(
        &self,
        id: &str,
        patch: &VisibilityPatch,
    ) -> Result<Option<Product>, CatalogueRepositoryError>;
}

/// Storage for community projects.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert a new project.
    async fn insert(&self, project: &Project) -> Result<(), CatalogueRepositoryError>;

    /// Every project, in insertion order.
    async fn list(&self) -> Result<Vec<Project>, CatalogueRepositoryError>;
}
