//! Per-module-name mutual exclusion.
//!
//! Upload, delete, promote and demote of the same module name are
//! serialized through [`NameLocks`]; operations on different names do not
//! contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Table of async locks keyed by module name.
#[derive(Debug, Default)]
pub struct NameLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Held while an operation owns a module name.
#[derive(Debug)]
pub struct NameGuard {
    _guard: OwnedMutexGuard<()>,
}

impl NameLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until `name` is free and take it.
    pub async fn lock(&self, name: &str) -> NameGuard {
        let mutex = {
            let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
            // Entries nobody holds or waits on are only referenced by the map.
            locks.retain(|_, m| Arc::strong_count(m) > 1);
            locks.entry(name.to_string()).or_default().clone()
        };

        NameGuard {
            _guard: mutex.lock_owned().await,
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}
