//! Port for user account persistence.

use async_trait::async_trait;

use crate::domain::{Email, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique key (`username` or `email`) is already taken.
        Duplicate { field: String } => "a user with this {field} already exists",
    }
}

/// Storage for user accounts. `username` and `email` are unique.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account, failing with [`UserRepositoryError::Duplicate`]
    /// when either unique key is taken.
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch an account by normalised email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch an account by username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError>;
}
