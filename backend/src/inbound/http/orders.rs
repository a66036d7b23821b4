//! Order handlers.
//!
//! ```text
//! POST /api/orders   {"items":[{productId,name,quantity,unitPrice}],"shippingAddress":{..}}
//! GET  /api/orders   caller's orders, oldest first
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Order, OrderItemInput, OrderSubmission, ShippingAddressInput};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::BearerAuth;
use crate::inbound::http::schemas::{ErrorSchema, OrderSchema};
use crate::inbound::http::state::HttpState;

/// One order line as submitted.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub quantity: Option<u32>,
    pub unit_price: Option<f64>,
}

/// Shipping address as submitted.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressRequest {
    pub line1: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    #[serde(default)]
    pub shipping_address: ShippingAddressRequest,
}

impl From<OrderItemRequest> for OrderItemInput {
    fn from(value: OrderItemRequest) -> Self {
        Self {
            product_id: value.product_id,
            name: value.name,
            quantity: value.quantity,
            unit_price: value.unit_price,
        }
    }
}

impl From<ShippingAddressRequest> for ShippingAddressInput {
    fn from(value: ShippingAddressRequest) -> Self {
        Self {
            line1: value.line1,
            city: value.city,
            postal_code: value.postal_code,
            country: value.country,
        }
    }
}

/// Place an order. The total is computed server-side.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderSchema),
        (status = 400, description = "Invalid items or address", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "placeOrder"
)]
#[post("/orders")]
pub async fn place_order(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    payload: web::Json<PlaceOrderRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let items: Vec<OrderItemInput> = body.items.into_iter().map(Into::into).collect();
    let submission = OrderSubmission::try_from_parts(&items, &body.shipping_address.into())?;
    let order = state.orders.place(submission, auth.claims()).await?;
    Ok(HttpResponse::Created().json(order))
}

/// Orders placed by the caller.
#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Caller's orders", body = [OrderSchema]),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "listOrders"
)]
#[get("/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    auth: BearerAuth,
) -> ApiResult<web::Json<Vec<Order>>> {
    state.orders.list_mine(auth.claims()).await.map(web::Json)
}
