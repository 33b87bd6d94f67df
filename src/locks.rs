use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per user. Cart mutations and checkout for the same user
/// hold it for their whole duration so a checkout never races an add.
#[derive(Debug, Default)]
pub struct UserLocks {
    inner: DashMap<i64, Arc<Mutex<()>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, user_id: i64) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is not held across the await.
        let mutex = self
            .inner
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }

    /// Drops the mutex kept for `user_id`. Guards already handed out stay
    /// valid; the next `lock` creates a fresh entry.
    pub fn forget(&self, user_id: i64) {
        self.inner.remove(&user_id);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
