use std::time::Duration;

use anyhow::Result;
use moka::future::Cache;

use crate::store::Store;

/// CPF → user id lookups for the kiosk scan path.
#[derive(Clone)]
pub struct CpfCache {
    inner: Cache<String, u64>,
}

impl Default for CpfCache {
    fn default() -> Self {
        Self::new(50_000, Duration::from_secs(86400))
    }
}

impl CpfCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn remember(&self, cpf: &str, user_id: u64) {
        self.inner.insert(cpf.to_string(), user_id).await;
    }

    pub async fn lookup(&self, cpf: &str) -> Option<u64> {
        self.inner.get(cpf).await
    }

    pub async fn forget(&self, cpf: &str) {
        self.inner.invalidate(cpf).await;
    }

    /// Cached id, else a store lookup that fills the cache on a hit.
    pub async fn resolve(&self, store: &dyn Store, cpf: &str) -> crate::error::StoreResult<Option<u64>> {
        if let Some(id) = self.lookup(cpf).await {
            return Ok(Some(id));
        }

        let found = store.find_user_by_cpf(cpf).await?.map(|u| u.id);
        if let Some(id) = found {
            self.remember(cpf, id).await;
        }
        Ok(found)
    }

    /// Load every registered CPF, inserting in batches.
    pub async fn warmup(&self, store: &dyn Store, batch_size: usize) -> Result<()> {
        let users = store.list_users().await?;
        let total = users.len();

        for batch in users.chunks(batch_size.max(1)) {
            let inserts: Vec<_> = batch
                .iter()
                .map(|u| self.inner.insert(u.cpf.clone(), u.id))
                .collect();
            futures::future::join_all(inserts).await;
        }

        tracing::info!(total, "CPF cache warmup complete");
        Ok(())
    }
}
