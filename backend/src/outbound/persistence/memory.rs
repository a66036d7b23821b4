//! In-process repositories backed by mutex-guarded vectors.
//!
//! Used when no MongoDB URI is configured and throughout the test suite.
//! Records keep insertion order, matching the document store's natural order.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    CatalogueRepositoryError, ComponentRepository, CourseRepository, CourseRepositoryError,
    OrderRepository, OrderRepositoryError, ProductRepository, ProjectRepository,
    UserRepository, UserRepositoryError,
};
use crate::domain::{
    Component, ComponentFilter, Course, CourseFilter, CourseSlug, Email, Order, Product,
    Project, User, UserId, Username, VisibilityFilter, VisibilityPatch,
};

fn lock<'a, T, E>(
    records: &'a Mutex<Vec<T>>,
    poisoned: impl FnOnce(&'static str) -> E,
) -> Result<MutexGuard<'a, Vec<T>>, E> {
    records
        .lock()
        .map_err(|_| poisoned("in-memory store lock poisoned"))
}

/// In-memory [`UserRepository`].
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut users = lock(&self.users, UserRepositoryError::query)?;
        if users.iter().any(|u| u.username == user.username) {
            return Err(UserRepositoryError::duplicate("username"));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(UserRepositoryError::duplicate("email"));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let users = lock(&self.users, UserRepositoryError::query)?;
        Ok(users.iter().find(|u| &u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserRepositoryError> {
        let users = lock(&self.users, UserRepositoryError::query)?;
        Ok(users.iter().find(|u| &u.email == email).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        let users = lock(&self.users, UserRepositoryError::query)?;
        Ok(users.iter().find(|u| &u.username == username).cloned())
    }
}

/// In-memory [`CourseRepository`] enforcing slug uniqueness on insert.
#[derive(Debug, Default)]
pub struct MemoryCourseRepository {
    courses: Mutex<Vec<Course>>,
}

#[async_trait]
impl CourseRepository for MemoryCourseRepository {
    async fn insert(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        let mut courses = lock(&self.courses, CourseRepositoryError::query)?;
        if courses.iter().any(|c| c.course_id == course.course_id) {
            return Err(CourseRepositoryError::duplicate_slug(course.course_id.as_str()));
        }
        courses.push(course.clone());
        Ok(())
    }

    async fn find_by_slug(
        &self,
        slug: &CourseSlug,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        let courses = lock(&self.courses, CourseRepositoryError::query)?;
        Ok(courses.iter().find(|c| &c.course_id == slug).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Course>, CourseRepositoryError> {
        let courses = lock(&self.courses, CourseRepositoryError::query)?;
        Ok(courses.iter().find(|c| c.id == id).cloned())
    }

    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>, CourseRepositoryError> {
        let courses = lock(&self.courses, CourseRepositoryError::query)?;
        Ok(courses.iter().filter(|c| filter.matches(c)).cloned().collect())
    }

    async fn update_visibility(
        &self,
        id: &str,
        patch: &VisibilityPatch,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        let mut courses = lock(&self.courses, CourseRepositoryError::query)?;
        Ok(courses.iter_mut().find(|c| c.id == id).map(|course| {
            course.visibility = course.visibility.apply(*patch);
            course.clone()
        }))
    }
}

/// In-memory [`ComponentRepository`].
#[derive(Debug, Default)]
pub struct MemoryComponentRepository {
    components: Mutex<Vec<Component>>,
}

#[async_trait]
impl ComponentRepository for MemoryComponentRepository {
    async fn insert(&self, component: &Component) -> Result<(), CatalogueRepositoryError> {
        lock(&self.components, CatalogueRepositoryError::query)?.push(component.clone());
        Ok(())
    }

    async fn list(
        &self,
        filter: &ComponentFilter,
    ) -> Result<Vec<Component>, CatalogueRepositoryError> {
        let components = lock(&self.components, CatalogueRepositoryError::query)?;
        Ok(components.iter().filter(|c| filter.matches(c)).cloned().collect())
    }

    async fn update_visibility(
        &self,
        id: &str,
        patch: &VisibilityPatch,
    ) -> Result<Option<Component>, CatalogueRepositoryError> {
        let mut components = lock(&self.components, CatalogueRepositoryError::query)?;
        Ok(components.iter_mut().find(|c| c.id == id).map(|component| {
            component.visibility = component.visibility.apply(*patch);
            component.clone()
        }))
    }
}

/// In-memory [`ProductRepository`].
#[derive(Debug, Default)]
pub struct MemoryProductRepository {
    products: Mutex<Vec<Product>>,
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn insert(&self, product: &Product) -> Result<(), CatalogueRepositoryError> {
        lock(&self.products, CatalogueRepositoryError::query)?.push(product.clone());
        Ok(())
    }

    async fn list(
        &self,
        filter: &VisibilityFilter,
    ) -> Result<Vec<Product>, CatalogueRepositoryError> {
        let products = lock(&self.products, CatalogueRepositoryError::query)?;
        Ok(products
            .iter()
            .filter(|p| filter.matches(&p.visibility))
            .cloned()
            .collect())
    }

    async fn update_visibility(
        &self,
        id: &str,
        patch: &VisibilityPatch,
    ) -> Result<Option<Product>, CatalogueRepositoryError> {
        let mut products = lock(&self.products, CatalogueRepositoryError::query)?;
        Ok(products.iter_mut().find(|p| p.id == id).map(|product| {
            product.visibility = product.visibility.apply(*patch);
            product.clone()
        }))
    }
}

/// In-memory [`ProjectRepository`].
#[derive(Debug, Default)]
pub struct MemoryProjectRepository {
    projects: Mutex<Vec<Project>>,
}

#[async_trait]
impl ProjectRepository for MemoryProjectRepository {
    async fn insert(&self, project: &Project) -> Result<(), CatalogueRepositoryError> {
        lock(&self.projects, CatalogueRepositoryError::query)?.push(project.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Project>, CatalogueRepositoryError> {
        Ok(lock(&self.projects, CatalogueRepositoryError::query)?.clone())
    }
}

/// In-memory [`OrderRepository`].
#[derive(Debug, Default)]
pub struct MemoryOrderRepository {
    orders: Mutex<Vec<Order>>,
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        lock(&self.orders, OrderRepositoryError::query)?.push(order.clone());
        Ok(())
    }

    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Order>, OrderRepositoryError> {
        let orders = lock(&self.orders, OrderRepositoryError::query)?;
        Ok(orders.iter().filter(|o| &o.user == user).cloned().collect())
    }
}
