//! MongoDB-backed component, product and project repositories.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::{Document, doc};
use mongodb::options::ReturnDocument;
use serde::de::DeserializeOwned;

use crate::domain::ports::{
    CatalogueRepositoryError, ComponentRepository, ProductRepository, ProjectRepository,
};
use crate::domain::{
    Component, ComponentFilter, Product, Project, VisibilityFilter, VisibilityPatch,
};

use super::documents::{ComponentDocument, ProductDocument, ProjectDocument};
use super::errors::map_basic_mongo_error;
use super::{COMPONENTS, MongoStore, PRODUCTS, PROJECTS};

/// Equality clauses for the constrained visibility flags.
pub(super) fn visibility_filter(filter: &VisibilityFilter) -> Document {
    let mut query = Document::new();
    if let Some(home) = filter.visible_on_home {
        query.insert("visibleOnHome", home);
    }
    if let Some(catalog) = filter.visible_on_catalog {
        query.insert("visibleOnCatalog", catalog);
    }
    query
}

/// `$set` update touching only the flags present in `patch`.
pub(super) fn visibility_update(patch: &VisibilityPatch) -> Document {
    let mut set = Document::new();
    if let Some(home) = patch.visible_on_home {
        set.insert("visibleOnHome", home);
    }
    if let Some(catalog) = patch.visible_on_catalog {
        set.insert("visibleOnCatalog", catalog);
    }
    doc! { "$set": set }
}

fn map_err(error: &mongodb::error::Error) -> CatalogueRepositoryError {
    map_basic_mongo_error(
        error,
        CatalogueRepositoryError::query,
        CatalogueRepositoryError::connection,
    )
}

async fn find_all<D, T>(
    collection: &Collection<D>,
    filter: Document,
) -> Result<Vec<T>, CatalogueRepositoryError>
where
    D: DeserializeOwned + Send + Sync,
    T: TryFrom<D, Error = super::documents::CorruptDocument>,
{
    let docs: Vec<D> = collection
        .find(filter)
        .sort(doc! { "createdAt": 1 })
        .await
        .map_err(|err| map_err(&err))?
        .try_collect()
        .await
        .map_err(|err| map_err(&err))?;
    docs.into_iter()
        .map(|doc| T::try_from(doc).map_err(|err| CatalogueRepositoryError::query(err.to_string())))
        .collect()
}

async fn patch_visibility<D, T>(
    collection: &Collection<D>,
    id: &str,
    patch: &VisibilityPatch,
) -> Result<Option<T>, CatalogueRepositoryError>
where
    D: DeserializeOwned + Send + Sync,
    T: TryFrom<D, Error = super::documents::CorruptDocument>,
{
    let updated = collection
        .find_one_and_update(doc! { "_id": id }, visibility_update(patch))
        .return_document(ReturnDocument::After)
        .await
        .map_err(|err| map_err(&err))?;
    updated
        .map(|doc| T::try_from(doc).map_err(|err| CatalogueRepositoryError::query(err.to_string())))
        .transpose()
}

/// Components stored in the `components` collection.
#[derive(Clone, Debug)]
pub struct MongoComponentRepository {
    components: Collection<ComponentDocument>,
}

impl MongoComponentRepository {
    /// Bind to the `components` collection of `store`.
    #[must_use]
    pub fn new(store: &MongoStore) -> Self {
        Self {
            components: store.database().collection(COMPONENTS),
        }
    }
}

#[async_trait]
impl ComponentRepository for MongoComponentRepository {
    async fn insert(&self, component: &Component) -> Result<(), CatalogueRepositoryError> {
        self.components
            .insert_one(ComponentDocument::from(component))
            .await
            .map(|_| ())
            .map_err(|err| map_err(&err))
    }

    async fn list(
        &self,
        filter: &ComponentFilter,
    ) -> Result<Vec<Component>, CatalogueRepositoryError> {
        let mut query = visibility_filter(&filter.visibility);
        if let Some(category) = filter.category {
            query.insert("category", category.as_str());
        }
        find_all(&self.components, query).await
    }

    async fn update_visibility(
        &self,
        id: &str,
        patch: &VisibilityPatch,
    ) -> Result<Option<Component>, CatalogueRepositoryError> {
        patch_visibility(&self.components, id, patch).await
    }
}

/// Products stored in the `products` collection.
#[derive(Clone, Debug)]
pub struct MongoProductRepository {
    products: Collection<ProductDocument>,
}

impl MongoProductRepository {
    /// Bind to the `products` collection of `store`.
    #[must_use]
    pub fn new(store: &MongoStore) -> Self {
        Self {
            products: store.database().collection(PRODUCTS),
        }
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    async fn insert(&self, product: &Product) -> Result<(), CatalogueRepositoryError> {
        self.products
            .insert_one(ProductDocument::from(product))
            .await
            .map(|_| ())
            .map_err(|err| map_err(&err))
    }

    async fn list(
        &self,
        filter: &VisibilityFilter,
    ) -> Result<Vec<Product>, CatalogueRepositoryError> {
        find_all(&self.products, visibility_filter(filter)).await
    }

    async fn update_visibility(
        &self,
        id: &str,
        patch: &VisibilityPatch,
    ) -> Result<Option<Product>, CatalogueRepositoryError> {
        patch_visibility(&self.products, id, patch).await
    }
}

/// Projects stored in the `projects` collection.
#[derive(Clone, Debug)]
pub struct MongoProjectRepository {
    projects: Collection<ProjectDocument>,
}

impl MongoProjectRepository {
    /// Bind to the `projects` collection of `store`.
    #[must_use]
    pub fn new(store: &MongoStore) -> Self {
        Self {
            projects: store.database().collection(PROJECTS),
        }
    }
}

#[async_trait]
impl ProjectRepository for MongoProjectRepository {
    async fn insert(&self, project: &Project) -> Result<(), CatalogueRepositoryError> {
        self.projects
            .insert_one(ProjectDocument::from(project))
            .await
            .map(|_| ())
            .map_err(|err| map_err(&err))
    }

    async fn list(&self) -> Result<Vec<Project>, CatalogueRepositoryError> {
        find_all(&self.projects, Document::new()).await
    }
}
