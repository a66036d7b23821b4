//! Customer orders for marketplace products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::catalogue::Price;
use super::user::UserId;
use super::Error;

/// Fulfilment status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Awaiting shipment.
    #[default]
    Pending,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
}

/// One order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Price,
}

/// Destination address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub line1: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Stored order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user: UserId,
    pub items: Vec<OrderItem>,
    pub total_price: f64,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub created_at: DateTime<Utc>,
}

/// Order line as submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub unit_price: Option<f64>,
}

/// Address as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressInput {
    #[serde(default)]
    pub line1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Validation failures for a new order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderValidationError {
    /// No lines were supplied.
    #[error("an order needs at least one item")]
    NoItems,
    /// A line was incomplete or out of range.
    #[error("item {item}: {reason}")]
    InvalidItem {
        /// One-based line number.
        item: usize,
        /// What was wrong.
        reason: &'static str,
    },
    /// An address field was blank.
    #[error("shipping address {field} is required")]
    MissingAddressField {
        /// Wire name of the field.
        field: &'static str,
    },
}

impl From<OrderValidationError> for Error {
    fn from(value: OrderValidationError) -> Self {
        let field = match value {
            OrderValidationError::NoItems | OrderValidationError::InvalidItem { .. } => "items",
            OrderValidationError::MissingAddressField { .. } => "shippingAddress",
        };
        Self::invalid_request(value.to_string()).with_details(json!({ "field": field }))
    }
}

/// Validated order ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSubmission {
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
}

fn filled(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

impl OrderSubmission {
    /// Validate lines and address.
    pub fn try_from_parts(
        items: &[OrderItemInput],
        address: &ShippingAddressInput,
    ) -> Result<Self, OrderValidationError> {
        if items.is_empty() {
            return Err(OrderValidationError::NoItems);
        }
        let items = items
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                let item = index + 1;
                let invalid = |reason| OrderValidationError::InvalidItem { item, reason };
                let product_id = filled(raw.product_id.as_ref()).ok_or(invalid("productId is required"))?;
                let name = filled(raw.name.as_ref()).ok_or(invalid("name is required"))?;
                let quantity = raw
                    .quantity
                    .filter(|q| *q >= 1)
                    .ok_or(invalid("quantity must be at least 1"))?;
                let unit_price = raw
                    .unit_price
                    .and_then(|p| Price::new(p).ok())
                    .ok_or(invalid("unitPrice must be a non-negative number"))?;
                Ok(OrderItem {
                    product_id,
                    name,
                    quantity,
                    unit_price,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let field = |value: Option<&String>, field| {
            filled(value).ok_or(OrderValidationError::MissingAddressField { field })
        };
        let shipping_address = ShippingAddress {
            line1: field(address.line1.as_ref(), "line1")?,
            city: field(address.city.as_ref(), "city")?,
            postal_code: field(address.postal_code.as_ref(), "postalCode")?,
            country: field(address.country.as_ref(), "country")?,
        };

        Ok(Self {
            items,
            shipping_address,
        })
    }

    /// Sum of quantity times unit price over every line.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|item| f64::from(item.quantity) * item.unit_price.value())
            .sum()
    }
}
