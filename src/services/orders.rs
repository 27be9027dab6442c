use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::errors::ServiceError;
use crate::models::{LineItem, Order};
use crate::store::Datastore;

pub const DEFAULT_ORDER_STATUS: &str = "Pending";

/// One line of a create/update payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LineItemInput {
    pub product_id: Uuid,
    #[validate(length(min = 1, message = "Product name is required"))]
    pub product_name: String,
    pub quantity: u32,
    #[validate(custom = "validate_money")]
    pub price: Decimal,
}

impl From<LineItemInput> for LineItem {
    fn from(input: LineItemInput) -> Self {
        LineItem {
            product_id: input.product_id,
            product_name: input.product_name,
            quantity: input.quantity,
            price: input.price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,
    #[validate]
    pub items: Vec<LineItemInput>,
    /// Defaults to `"Pending"` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Checked against the recomputed items total when supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_money")]
    pub total_amount: Option<Decimal>,
    /// Omitted stamps the order with now. An explicit `null` keeps the order
    /// undated, which is how legacy rows without timestamps are modeled.
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub created_at: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderRequest {
    #[validate(length(min = 1, message = "Customer name cannot be empty"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Replacing the items recomputes the stored total.
    #[validate]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItemInput>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub count: u64,
}

fn validate_money(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() {
        return Err(ValidationError::new("negative_amount"));
    }
    Ok(())
}

// Keeps "field: null" distinguishable from an absent field.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// CRUD over the order ledger.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<Datastore>,
}

impl OrderService {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }

    /// All orders in insertion order.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<OrderListResponse, ServiceError> {
        let orders = self.store.orders.list();
        let count = orders.len() as u64;
        Ok(OrderListResponse { orders, count })
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<Order, ServiceError> {
        self.store
            .orders
            .get(&order_id)
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))
    }

    /// Store a new order. The items total is always recomputed server-side;
    /// a supplied `total_amount` that disagrees with it is rejected.
    #[instrument(skip(self, request), fields(customer_name = %request.customer_name))]
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, ServiceError> {
        request.validate()?;

        let items: Vec<LineItem> = request.items.into_iter().map(LineItem::from).collect();
        let computed_total: Decimal = items.iter().map(LineItem::subtotal).sum();

        if let Some(claimed) = request.total_amount {
            if claimed != computed_total {
                return Err(ServiceError::ValidationError(format!(
                    "total_amount {claimed} does not match the items total {computed_total}"
                )));
            }
        }

        let order = Order {
            id: Uuid::new_v4(),
            customer_name: request.customer_name,
            total_amount: computed_total,
            status: request
                .status
                .unwrap_or_else(|| DEFAULT_ORDER_STATUS.to_string()),
            items,
            created_at: match request.created_at {
                Some(explicit) => explicit,
                None => Some(Utc::now()),
            },
        };

        self.store.orders.insert(order.id, order.clone());
        info!(order_id = %order.id, total = %order.total_amount, "Order created");
        Ok(order)
    }

    /// Apply the supplied fields to an existing order.
    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn update_order(
        &self,
        order_id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<Order, ServiceError> {
        request.validate()?;

        let new_items: Option<Vec<LineItem>> = request
            .items
            .map(|items| items.into_iter().map(LineItem::from).collect());

        let updated = self
            .store
            .orders
            .update(&order_id, |order| {
                if let Some(customer_name) = request.customer_name {
                    order.customer_name = customer_name;
                }
                if let Some(status) = request.status {
                    order.status = status;
                }
                if let Some(items) = new_items {
                    order.total_amount = items.iter().map(LineItem::subtotal).sum();
                    order.items = items;
                }
            })
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        info!(order_id = %order_id, "Order updated");
        Ok(updated)
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        if !self.store.orders.remove(&order_id) {
            return Err(ServiceError::NotFound("Order not found".to_string()));
        }
        info!(order_id = %order_id, "Order deleted");
        Ok(())
    }
}
