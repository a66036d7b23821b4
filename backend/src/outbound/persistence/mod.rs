//! Persistence adapters for the repository ports.
//!
//! Two families are provided:
//!
//! - **mongo**: MongoDB collections, one per aggregate, with unique indexes
//!   created at startup.
//! - **memory**: mutex-guarded vectors used when no database is configured
//!   and by tests.
//!
//! Adapters only translate between stored shapes and domain types. No
//! business rules live here.

mod memory;
mod mongo;

pub use memory::{
    MemoryComponentRepository, MemoryCourseRepository, MemoryOrderRepository,
    MemoryProductRepository, MemoryProjectRepository, MemoryUserRepository,
};
pub use mongo::{
    MongoComponentRepository, MongoCourseRepository, MongoOrderRepository,
    MongoProductRepository, MongoProjectRepository, MongoSetupError, MongoStore,
    MongoUserRepository,
};
