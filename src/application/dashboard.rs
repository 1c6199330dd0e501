use crate::domain::catalog::{DashboardStats, OrderHistory};
use crate::domain::ports::DynOrderRepository;
use crate::error::Result;
use serde::Serialize;

/// Order history and headline numbers shown to a signed-in bulk buyer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardOverview {
    pub history: OrderHistory,
    pub stats: DashboardStats,
}

pub struct Dashboard {
    orders: DynOrderRepository,
}

impl Dashboard {
    /// Creates a new `Dashboard` instance.
    ///
    /// # Arguments
    ///
    /// * `orders` - The repository holding the buyer's orders.
    pub fn new(orders: DynOrderRepository) -> Self {
        Self { orders }
    }

    /// Lists every order the buyer has placed.
    pub async fn history(&self) -> Result<OrderHistory> {
        self.orders.user_orders().await
    }

    /// Order, code and pending counts for the buyer.
    pub async fn stats(&self) -> Result<DashboardStats> {
        self.orders.dashboard_stats().await
    }

    /// Fetches history and stats concurrently.
    pub async fn overview(&self) -> Result<DashboardOverview> {
        let (history, stats) = tokio::try_join!(self.history(), self.stats())?;
        tracing::debug!(orders = history.orders.len(), "dashboard loaded");
        Ok(DashboardOverview { history, stats })
    }
}
