use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{LineItem, Order, Product};
use crate::store::Datastore;

struct SampleProduct {
    name: &'static str,
    price: Decimal,
    category: &'static str,
    description: &'static str,
}

static SAMPLE_PRODUCTS: Lazy<Vec<SampleProduct>> = Lazy::new(|| {
    vec![
        SampleProduct {
            name: "Wireless Bluetooth Headphones",
            price: dec!(79.99),
            category: "Electronics",
            description: "Over-ear wireless headphones with active noise cancellation",
        },
        SampleProduct {
            name: "Smart Fitness Watch",
            price: dec!(199.99),
            category: "Electronics",
            description: "Fitness tracker with heart rate and sleep monitoring",
        },
        SampleProduct {
            name: "Organic Coffee Beans",
            price: dec!(24.99),
            category: "Food & Beverage",
            description: "Single-origin organic arabica beans, 1kg bag",
        },
    ]
});

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SeedReport {
    pub message: String,
    pub products: u64,
    pub orders: u64,
}

/// Loads the demo catalog and order book.
#[derive(Clone)]
pub struct SeedService {
    store: Arc<Datastore>,
}

impl SeedService {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }

    /// Replace the product and order collections with the demo data set.
    /// Re-seeding clears both first, so repeated calls land in the same
    /// state. Users and feedback are left alone.
    #[instrument(skip(self))]
    pub async fn seed(&self) -> Result<SeedReport, ServiceError> {
        self.store.orders.clear();
        self.store.products.clear();

        let catalog: Vec<Product> = SAMPLE_PRODUCTS
            .iter()
            .map(|sample| Product {
                id: Uuid::new_v4(),
                name: sample.name.to_string(),
                price: sample.price,
                category: Some(sample.category.to_string()),
                description: Some(sample.description.to_string()),
                image_url: None,
                in_stock: true,
            })
            .collect();
        for product in &catalog {
            self.store.products.insert(product.id, product.clone());
        }

        let orders = demo_orders(&catalog, Utc::now());
        for order in &orders {
            self.store.orders.insert(order.id, order.clone());
        }

        let report = SeedReport {
            message: "Demo data loaded".to_string(),
            products: catalog.len() as u64,
            orders: orders.len() as u64,
        };
        info!(products = report.products, orders = report.orders, "Store seeded");
        Ok(report)
    }
}

fn demo_orders(catalog: &[Product], now: DateTime<Utc>) -> Vec<Order> {
    let line = |index: usize, quantity: u32| -> LineItem {
        let product = &catalog[index];
        LineItem {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity,
            price: product.price,
        }
    };

    let order = |customer: &str, status: &str, created_at: Option<DateTime<Utc>>, items: Vec<LineItem>| -> Order {
        let total_amount = items.iter().map(LineItem::subtotal).sum();
        Order {
            id: Uuid::new_v4(),
            customer_name: customer.to_string(),
            total_amount,
            status: status.to_string(),
            items,
            created_at,
        }
    };

    vec![
        order("Ava Thompson", "Delivered", Some(now - Duration::days(9)), vec![line(0, 1)]),
        order("Liam Chen", "Delivered", Some(now - Duration::days(7)), vec![line(1, 1), line(2, 2)]),
        order("Ava Thompson", "Shipped", Some(now - Duration::days(5)), vec![line(2, 1)]),
        order("Sofia Reyes", "Shipped", Some(now - Duration::days(4)), vec![line(0, 2)]),
        order("Noah Patel", "Processing", Some(now - Duration::days(2)), vec![line(1, 1)]),
        order("Sofia Reyes", "Processing", Some(now - Duration::days(2)), vec![line(2, 3)]),
        order("Liam Chen", "Pending", Some(now - Duration::days(1)), vec![line(0, 1), line(1, 1)]),
        order("Mia Okafor", "Pending", Some(now), vec![line(2, 1)]),
        // An undated row, the shape legacy imports arrive in.
        order("Walk-in", "Completed", None, vec![line(0, 1)]),
    ]
}
