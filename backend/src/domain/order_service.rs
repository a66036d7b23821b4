//! Placing and listing orders.

use std::sync::Arc;

use mockable::Clock;
use tracing::{error, info};
use uuid::Uuid;

use super::auth::AuthClaims;
use super::order::{Order, OrderStatus, OrderSubmission};
use super::ports::{OrderRepository, OrderRepositoryError};
use super::Error;

/// Order use cases.
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    clock: Arc<dyn Clock>,
}

fn map_order_error(err: OrderRepositoryError) -> Error {
    error!(error = %err, kind = err.kind(), "order repository failure");
    Error::internal(err.to_string())
}

impl OrderService {
    /// Create the service.
    pub fn new(orders: Arc<dyn OrderRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { orders, clock }
    }

    /// Record a pending order for the caller. The total is computed here,
    /// never taken from the client.
    pub async fn place(&self, submission: OrderSubmission, buyer: &AuthClaims) -> Result<Order, Error> {
        let order = Order {
            id: Uuid::new_v4().to_string(),
            user: buyer.user_id.clone(),
            total_price: submission.total(),
            items: submission.items,
            status: OrderStatus::Pending,
            shipping_address: submission.shipping_address,
            created_at: self.clock.utc(),
        };
        self.orders.insert(&order).await.map_err(map_order_error)?;
        info!(id = %order.id, user = %order.user, "placed order");
        Ok(order)
    }

    /// Orders placed by the caller.
    pub async fn list_mine(&self, buyer: &AuthClaims) -> Result<Vec<Order>, Error> {
        self.orders
            .list_for_user(&buyer.user_id)
            .await
            .map_err(map_order_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::order::{OrderItemInput, ShippingAddressInput};
    use crate::domain::ports::MockOrderRepository;
    use crate::domain::user::UserId;
    use crate::test_support::{MemoryOrderRepository, fixture_clock};
    use rstest::rstest;

    fn buyer() -> AuthClaims {
        AuthClaims {
            user_id: UserId::random(),
            email: "buyer@example.com".to_owned(),
        }
    }

    fn submission() -> OrderSubmission {
        OrderSubmission::try_from_parts(
            &[OrderItemInput {
                product_id: Some("p-1".to_owned()),
                name: Some("Kit".to_owned()),
                quantity: Some(3),
                unit_price: Some(2.0),
            }],
            &ShippingAddressInput {
                line1: Some("1 Main St".to_owned()),
                city: Some("Springfield".to_owned()),
                postal_code: Some("12345".to_owned()),
                country: Some("US".to_owned()),
            },
        )
        .expect("valid order")
    }

    #[rstest]
    #[tokio::test]
    async fn orders_are_scoped_to_the_buyer() {
        let service = OrderService::new(Arc::new(MemoryOrderRepository::default()), fixture_clock());
        let alice = buyer();
        let bob = buyer();

        let placed = service.place(submission(), &alice).await.expect("place");
        assert_eq!(placed.status, OrderStatus::Pending);
        assert!((placed.total_price - 6.0).abs() < f64::EPSILON);

        assert_eq!(service.list_mine(&alice).await.expect("list"), vec![placed]);
        assert!(service.list_mine(&bob).await.expect("list").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn repository_failures_become_internal_errors() {
        let mut repo = MockOrderRepository::new();
        repo.expect_insert()
            .returning(|_| Err(OrderRepositoryError::query("disk full")));
        let service = OrderService::new(Arc::new(repo), fixture_clock());
        let err = service.place(submission(), &buyer()).await.expect_err("fails");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
