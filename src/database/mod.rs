pub mod analytics;
pub mod answers;
pub mod manager;
pub mod models;
pub mod profiles;
pub mod questions;
pub mod referrals;
pub mod subscriptions;

pub use manager::{DatabaseError, DatabaseManager};
