//! Port for order persistence.

use async_trait::async_trait;

use crate::domain::{Order, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by order repository adapters.
    pub enum OrderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "order repository query failed: {message}",
    }
}

/// Storage for orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert a new order.
    async fn insert(&self, order: &Order) -> Result<(), OrderRepositoryError>;

    /// Orders placed by `user`, oldest first.
    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Order>, OrderRepositoryError>;
}
