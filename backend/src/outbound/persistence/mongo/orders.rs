//! MongoDB-backed `OrderRepository`.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::doc;

use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{Order, UserId};

use super::documents::OrderDocument;
use super::errors::map_basic_mongo_error;
use super::{MongoStore, ORDERS};

/// Orders stored in the `orders` collection.
#[derive(Clone, Debug)]
pub struct MongoOrderRepository {
    orders: Collection<OrderDocument>,
}

impl MongoOrderRepository {
    /// Bind to the `orders` collection of `store`.
    #[must_use]
    pub fn new(store: &MongoStore) -> Self {
        Self {
            orders: store.database().collection(ORDERS),
        }
    }
}

fn map_err(error: &mongodb::error::Error) -> OrderRepositoryError {
    map_basic_mongo_error(error, OrderRepositoryError::query, OrderRepositoryError::connection)
}

#[async_trait]
impl OrderRepository for MongoOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        self.orders
            .insert_one(OrderDocument::from(order))
            .await
            .map(|_| ())
            .map_err(|err| map_err(&err))
    }

    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Order>, OrderRepositoryError> {
        let docs: Vec<OrderDocument> = self
            .orders
            .find(doc! { "user": user.as_ref() })
            .sort(doc! { "createdAt": 1 })
            .await
            .map_err(|err| map_err(&err))?
            .try_collect()
            .await
            .map_err(|err| map_err(&err))?;
        docs.into_iter()
            .map(|doc| Order::try_from(doc).map_err(|err| OrderRepositoryError::query(err.to_string())))
            .collect()
    }
}
