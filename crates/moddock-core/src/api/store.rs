//! Store methods on ModuleManager.

use crate::error::Result;
use crate::naming::validate_module_name;
use crate::store::StoreEntry;
use crate::ModuleManager;

impl ModuleManager {
    // ========================================
    // Store Methods
    // ========================================

    /// All store entries in index order.
    pub fn store_entries(&self) -> Result<Vec<StoreEntry>> {
        self.store.entries()
    }

    /// Promote a registry module into the store.
    ///
    /// Fails with `ModuleNotFound` if the registry has no module `name`.
    pub async fn add_to_store(&self, name: &str) -> Result<StoreEntry> {
        let name = validate_module_name(name)?;
        let _guard = self.locks.lock(name).await;
        self.store.promote(&self.registry, name).await
    }

    /// Remove a module from the store. Idempotent.
    pub async fn remove_from_store(&self, name: &str) -> Result<bool> {
        let name = validate_module_name(name)?;
        let _guard = self.locks.lock(name).await;
        self.store.demote(name).await
    }
}
