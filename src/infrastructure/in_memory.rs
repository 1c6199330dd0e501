use crate::domain::catalog::Order;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory list of orders placed during this process.
///
/// Uses `Arc<RwLock<Vec<Order>>>` so clones share the same orders. Nothing is
/// persisted.
#[derive(Debug, Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<Vec<Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn store(&self, order: Order) {
        let mut orders = self.orders.write().await;
        match orders.iter_mut().find(|o| o.id == order.id) {
            Some(existing) => *existing = order,
            None => orders.push(order),
        }
    }

    pub async fn all(&self) -> Vec<Order> {
        self.orders.read().await.clone()
    }
}
