use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A single line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LineItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,
    pub price: Decimal,
}

impl LineItem {
    /// Line total (unit price times quantity).
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// An order as stored and served. Status is an open-ended string matched
/// exactly everywhere; `created_at` may be absent on legacy rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub customer_name: String,
    pub total_amount: Decimal,
    pub status: String,
    pub items: Vec<LineItem>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Sum of line subtotals.
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(LineItem::subtotal).sum()
    }
}
