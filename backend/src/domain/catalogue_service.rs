//! Components, products and projects.

use std::sync::Arc;

use mockable::Clock;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::auth::AuthClaims;
use super::catalogue::{
    Component, ComponentFilter, ComponentSubmission, Product, ProductSubmission, Project,
    ProjectSubmission,
};
use super::media::{COMPONENT_IMAGES, MediaUpload, PRODUCT_IMAGES, PROJECT_IMAGES};
use super::media_service::MediaService;
use super::ports::{
    CatalogueRepositoryError, ComponentRepository, ProductRepository, ProjectRepository,
};
use super::visibility::{Visibility, VisibilityFilter, VisibilityPatch};
use super::Error;

/// Catalogue repositories.
#[derive(Clone)]
pub struct CatalogueRepositories {
    pub components: Arc<dyn ComponentRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub projects: Arc<dyn ProjectRepository>,
}

/// Catalogue use cases.
#[derive(Clone)]
pub struct CatalogueService {
    repos: CatalogueRepositories,
    media: MediaService,
    clock: Arc<dyn Clock>,
    image_upload_required: bool,
}

fn map_catalogue_error(err: CatalogueRepositoryError) -> Error {
    error!(error = %err, kind = err.kind(), "catalogue repository failure");
    Error::internal(err.to_string())
}

fn require_patch(patch: &VisibilityPatch) -> Result<(), Error> {
    if patch.is_empty() {
        Err(Error::invalid_request(
            "provide visibleOnHome and/or visibleOnCatalog",
        ))
    } else {
        Ok(())
    }
}

impl CatalogueService {
    /// Create the service.
    pub fn new(
        repos: CatalogueRepositories,
        media: MediaService,
        clock: Arc<dyn Clock>,
        image_upload_required: bool,
    ) -> Self {
        Self {
            repos,
            media,
            clock,
            image_upload_required,
        }
    }

    async fn store_image(
        &self,
        image: Option<MediaUpload>,
        folder: &str,
    ) -> Result<Option<String>, Error> {
        let Some(upload) = image else {
            return Ok(None);
        };
        match self.media.upload(upload, Some(folder)).await {
            Ok(url) => Ok(Some(url)),
            Err(err) if self.image_upload_required => Err(err),
            Err(err) => {
                warn!(error = %err, folder, "image upload failed; storing record without image");
                Ok(None)
            }
        }
    }

    /// Create a component, uploading its image first if one was sent.
    pub async fn create_component(
        &self,
        submission: ComponentSubmission,
        image: Option<MediaUpload>,
        author: &AuthClaims,
    ) -> Result<Component, Error> {
        let image_url = self.store_image(image, COMPONENT_IMAGES).await?;
        let component = Component {
            id: Uuid::new_v4().to_string(),
            name: submission.name,
            category: submission.category,
            description: submission.description,
            image_url,
            visibility: Visibility::default(),
            created_by: Some(author.user_id.clone()),
            created_at: self.clock.utc(),
        };
        self.repos
            .components
            .insert(&component)
            .await
            .map_err(map_catalogue_error)?;
        info!(id = %component.id, "created component");
        Ok(component)
    }

    /// Components matching `filter`.
    pub async fn list_components(&self, filter: &ComponentFilter) -> Result<Vec<Component>, Error> {
        self.repos
            .components
            .list(filter)
            .await
            .map_err(map_catalogue_error)
    }

    /// Patch a component's visibility.
    pub async fn update_component_visibility(
        &self,
        id: &str,
        patch: &VisibilityPatch,
    ) -> Result<Component, Error> {
        require_patch(patch)?;
        self.repos
            .components
            .update_visibility(id, patch)
            .await
            .map_err(map_catalogue_error)?
            .ok_or_else(|| Error::not_found(format!("Component '{id}' not found")))
    }

    /// Create a product. An uploaded image wins over a supplied `imageUrl`.
    pub async fn create_product(
        &self,
        submission: ProductSubmission,
        image: Option<MediaUpload>,
        author: &AuthClaims,
    ) -> Result<Product, Error> {
        let uploaded = self.store_image(image, PRODUCT_IMAGES).await?;
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: submission.name,
            price: submission.price,
            description: submission.description,
            image_url: uploaded.or(submission.image_url),
            visibility: Visibility::default(),
            created_by: Some(author.user_id.clone()),
            created_at: self.clock.utc(),
        };
        self.repos
            .products
            .insert(&product)
            .await
            .map_err(map_catalogue_error)?;
        info!(id = %product.id, "created product");
        Ok(product)
    }

    /// Products matching `filter`.
    pub async fn list_products(&self, filter: &VisibilityFilter) -> Result<Vec<Product>, Error> {
        self.repos
            .products
            .list(filter)
            .await
            .map_err(map_catalogue_error)
    }

    /// Patch a product's visibility.
    pub async fn update_product_visibility(
        &self,
        id: &str,
        patch: &VisibilityPatch,
    ) -> Result<Product, Error> {
        require_patch(patch)?;
        self.repos
            .products
            .update_visibility(id, patch)
            .await
            .map_err(map_catalogue_error)?
            .ok_or_else(|| Error::not_found(format!("Product '{id}' not found")))
    }

    /// Create a project authored by the caller.
    pub async fn create_project(
        &self,
        submission: ProjectSubmission,
        image: Option<MediaUpload>,
        author: &AuthClaims,
    ) -> Result<Project, Error> {
        let image_url = self.store_image(image, PROJECT_IMAGES).await?;
        let project = Project {
            id: Uuid::new_v4().to_string(),
            title: submission.title,
            description: submission.description,
            steps: submission.steps,
            image_url,
            author: author.user_id.clone(),
            likes: 0,
            comments: Vec::new(),
            created_at: self.clock.utc(),
        };
        self.repos
            .projects
            .insert(&project)
            .await
            .map_err(map_catalogue_error)?;
        info!(id = %project.id, "created project");
        Ok(project)
    }

    /// Every project.
    pub async fn list_projects(&self) -> Result<Vec<Project>, Error> {
        self.repos
            .projects
            .list()
            .await
            .map_err(map_catalogue_error)
    }
}

#[cfg(test)]
mod tests;
