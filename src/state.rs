use std::sync::Arc;

use crate::clock::Clock;
use crate::config::Config;
use crate::ledger::AttendanceLedger;
use crate::store::Store;
use crate::utils::cpf_cache::CpfCache;

/// Shared handles injected into every handler.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub ledger: AttendanceLedger,
    pub clock: Arc<dyn Clock>,
    pub cpf_cache: CpfCache,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, config: &Config) -> Self {
        Self {
            ledger: AttendanceLedger::new(store.clone(), config.timezone),
            store,
            clock,
            cpf_cache: CpfCache::default(),
        }
    }
}
