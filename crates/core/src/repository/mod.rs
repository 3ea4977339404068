//! Typed access to the orders and configuration collections.
//!
//! Every write goes through a [`crate::WriteExecutor`], so these
//! repositories keep working while the remote schema drifts. Deletes and
//! reads are plain store calls.

mod config;
mod orders;

pub use config::{ConfigHandle, ConfigRepository};
pub use orders::OrderRepository;

/// Collection names used by the repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub orders: String,
    pub config: String,
}

impl Default for Collections {
    fn default() -> Self {
        Collections {
            orders: "orders".to_string(),
            config: "config".to_string(),
        }
    }
}
