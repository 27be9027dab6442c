pub mod feedback;
pub mod order;
pub mod product;
pub mod user;

pub use feedback::Feedback;
pub use order::{LineItem, Order};
pub use product::Product;
pub use user::{User, UserProfile, UserRole};
