use analytics::Snapshot;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Holds the snapshot the reports are currently computed from.
///
/// Readers take a cheap `Arc` clone and release the lock immediately, so a long report
/// run never blocks a refresh, and a refresh never changes the data under a running report.
#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot as of now.
    pub async fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.current.read().await)
    }

    /// Swaps in a refreshed snapshot and returns the one it replaced.
    pub async fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let mut guard = self.current.write().await;
        let previous = std::mem::replace(&mut *guard, Arc::new(snapshot));
        tracing::info!(
            customers = guard.customers().len(),
            products = guard.products().len(),
            sales = guard.sales().len(),
            "Snapshot replaced"
        );
        previous
    }
}
