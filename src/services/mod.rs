// Catalog and order ledger
pub mod orders;
pub mod products;

// Derived dashboards
pub mod analytics;

// Product feedback
pub mod feedback;

// Demo data
pub mod seed;
