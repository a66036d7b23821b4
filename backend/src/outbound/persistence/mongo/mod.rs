//! MongoDB persistence adapters.
//!
//! One collection per aggregate. Unique indexes on `users.username`,
//! `users.email` and `courses.courseId` are created at startup so duplicate
//! inserts fail at the storage layer even when two requests race past the
//! service's existence check.
//!
//! Document structs (`documents.rs`) are internal; repositories translate
//! them to domain types and map driver errors to port errors.

mod catalogue;
mod courses;
mod documents;
mod errors;
mod orders;
mod users;

use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};
use tracing::info;

pub use catalogue::{MongoComponentRepository, MongoProductRepository, MongoProjectRepository};
pub use courses::MongoCourseRepository;
pub use orders::MongoOrderRepository;
pub use users::MongoUserRepository;

pub(crate) const USERS: &str = "users";
pub(crate) const COURSES: &str = "courses";
pub(crate) const COMPONENTS: &str = "components";
pub(crate) const PRODUCTS: &str = "products";
pub(crate) const PROJECTS: &str = "projects";
pub(crate) const ORDERS: &str = "orders";

/// Errors raised while opening the database.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MongoSetupError {
    /// The URI could not be parsed or the client could not be built.
    #[error("failed to build MongoDB client: {message}")]
    Client {
        /// Driver message.
        message: String,
    },
    /// The server did not answer a ping.
    #[error("MongoDB ping failed: {message}")]
    Ping {
        /// Driver message.
        message: String,
    },
    /// A unique index could not be created.
    #[error("failed to create index {index}: {message}")]
    Index {
        /// Collection and key.
        index: String,
        /// Driver message.
        message: String,
    },
}

/// Handle on the application database, shared by every repository.
#[derive(Clone, Debug)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connect, ping and ensure unique indexes.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, MongoSetupError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|err| MongoSetupError::Client {
                message: err.to_string(),
            })?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|err| MongoSetupError::Ping {
                message: err.to_string(),
            })?;
        let store = Self { db };
        store.ensure_indexes().await?;
        info!(database, "connected to MongoDB");
        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<(), MongoSetupError> {
        for (collection, key) in [(USERS, "username"), (USERS, "email"), (COURSES, "courseId")] {
            let model = IndexModel::builder()
                .keys(doc! { key: 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build();
            self.db
                .collection::<mongodb::bson::Document>(collection)
                .create_index(model)
                .await
                .map_err(|err| MongoSetupError::Index {
                    index: format!("{collection}.{key}"),
                    message: err.to_string(),
                })?;
        }
        Ok(())
    }

    /// Database handle for repositories.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }
}
