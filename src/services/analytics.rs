/*!
 * Derived dashboard numbers.
 *
 * Nothing in here is stored: every summary is recomputed from the full order
 * snapshot on each request. The folds are pure and synchronous, so the same
 * snapshot always yields the same report, and they preserve first-encounter
 * order so that ties and groupings come out deterministic.
 */

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::errors::ServiceError;
use crate::models::{Order, Product};
use crate::store::Datastore;

/// How many products the dashboard ranks.
pub const TOP_PRODUCT_LIMIT: usize = 5;

/// One status bucket: how many orders carry this exact status string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

/// Units sold per product name, summed across all orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductSales {
    pub product_name: String,
    pub total_quantity: u64,
}

/// Per-customer rollup derived from the order ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CustomerSummary {
    pub customer_name: String,
    pub total_orders: u64,
    pub total_spent: Decimal,
    pub last_order_date: DateTime<Utc>,
}

/// Revenue for one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailySales {
    pub date: NaiveDate,
    pub total_sales: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_revenue: Decimal,
    pub total_orders: u64,
    pub active_products: u64,
    pub out_of_stock: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardReport {
    pub stats: DashboardStats,
    pub status_breakdown: Vec<StatusCount>,
    pub top_products: Vec<ProductSales>,
    pub sales_trend: Vec<DailySales>,
    pub generated_at: DateTime<Utc>,
}

/// Group-count orders by their exact status string. `"Paid"` and `"paid"`
/// are distinct buckets. Buckets appear in first-encounter order.
pub fn status_breakdown(orders: &[Order]) -> Vec<StatusCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<StatusCount> = Vec::new();

    for order in orders {
        match index.entry(order.status.as_str()) {
            Entry::Occupied(slot) => buckets[*slot.get()].count += 1,
            Entry::Vacant(slot) => {
                slot.insert(buckets.len());
                buckets.push(StatusCount {
                    status: order.status.clone(),
                    count: 1,
                });
            }
        }
    }

    buckets
}

/// Flatten every line item, sum quantity per exact product name, and rank by
/// total quantity descending. The sort is stable, so products tied on
/// quantity keep their first-encounter order.
pub fn top_products(orders: &[Order], limit: usize) -> Vec<ProductSales> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<ProductSales> = Vec::new();

    for order in orders {
        for item in &order.items {
            match index.entry(item.product_name.as_str()) {
                Entry::Occupied(slot) => {
                    totals[*slot.get()].total_quantity += u64::from(item.quantity)
                }
                Entry::Vacant(slot) => {
                    slot.insert(totals.len());
                    totals.push(ProductSales {
                        product_name: item.product_name.clone(),
                        total_quantity: u64::from(item.quantity),
                    });
                }
            }
        }
    }

    totals.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));
    totals.truncate(limit);
    totals
}

/// Roll orders up per exact customer name: order count, cumulative spend,
/// latest order timestamp. Summaries appear in first-encounter order.
///
/// The clock is read once per fold and only seeds customers whose first
/// encountered order has no timestamp; later orders advance
/// `last_order_date` only when they carry a real timestamp strictly greater
/// than the current value.
pub fn customer_summaries(orders: &[Order]) -> Vec<CustomerSummary> {
    let now = Utc::now();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<CustomerSummary> = Vec::new();

    for order in orders {
        match index.entry(order.customer_name.as_str()) {
            Entry::Occupied(slot) => {
                let summary = &mut summaries[*slot.get()];
                summary.total_orders += 1;
                summary.total_spent += order.total_amount;
                if let Some(created_at) = order.created_at {
                    if created_at > summary.last_order_date {
                        summary.last_order_date = created_at;
                    }
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(summaries.len());
                summaries.push(CustomerSummary {
                    customer_name: order.customer_name.clone(),
                    total_orders: 1,
                    total_spent: order.total_amount,
                    last_order_date: order.created_at.unwrap_or(now),
                });
            }
        }
    }

    summaries
}

/// Sum `total_amount` per UTC calendar day. Orders without a timestamp are
/// skipped. The series is sorted by date ascending.
pub fn sales_by_day(orders: &[Order]) -> Vec<DailySales> {
    let mut daily: HashMap<NaiveDate, Decimal> = HashMap::new();

    for order in orders {
        if let Some(created_at) = order.created_at {
            *daily.entry(created_at.date_naive()).or_insert(Decimal::ZERO) += order.total_amount;
        }
    }

    let mut series: Vec<DailySales> = daily
        .into_iter()
        .map(|(date, total_sales)| DailySales { date, total_sales })
        .collect();
    series.sort_by(|a, b| a.date.cmp(&b.date));
    series
}

/// Serves the dashboard and the derived customer directory.
#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<Datastore>,
}

impl AnalyticsService {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }

    /// Assemble the full dashboard report. Both snapshots must be in hand
    /// before any aggregation runs; there is no partial report.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<DashboardReport, ServiceError> {
        let (orders, products) = tokio::join!(self.order_snapshot(), self.product_snapshot());

        let report = assemble_report(&orders, &products);
        info!(
            orders = orders.len(),
            products = products.len(),
            "Dashboard report generated"
        );
        Ok(report)
    }

    /// The customer directory, optionally filtered by a case-insensitive
    /// substring of the customer name.
    #[instrument(skip(self))]
    pub async fn customers(&self, search: Option<&str>) -> Result<Vec<CustomerSummary>, ServiceError> {
        let orders = self.order_snapshot().await;
        let mut summaries = customer_summaries(&orders);

        if let Some(term) = search {
            let needle = term.to_lowercase();
            summaries.retain(|c| c.customer_name.to_lowercase().contains(&needle));
        }

        Ok(summaries)
    }

    async fn order_snapshot(&self) -> Vec<Order> {
        self.store.orders.list()
    }

    async fn product_snapshot(&self) -> Vec<Product> {
        self.store.products.list()
    }
}

fn assemble_report(orders: &[Order], products: &[Product]) -> DashboardReport {
    let total_revenue: Decimal = orders.iter().map(|o| o.total_amount).sum();
    let active_products = products.iter().filter(|p| p.in_stock).count() as u64;
    let out_of_stock = products.len() as u64 - active_products;

    DashboardReport {
        stats: DashboardStats {
            total_revenue,
            total_orders: orders.len() as u64,
            active_products,
            out_of_stock,
        },
        status_breakdown: status_breakdown(orders),
        top_products: top_products(orders, TOP_PRODUCT_LIMIT),
        sales_trend: sales_by_day(orders),
        generated_at: Utc::now(),
    }
}
