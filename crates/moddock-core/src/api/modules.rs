//! Registry methods on ModuleManager.

use crate::error::Result;
use crate::naming::validate_module_name;
use crate::registry::ModuleDetails;
use crate::responses::{ModuleListing, ModuleSummary};
use crate::ModuleManager;

impl ModuleManager {
    // ========================================
    // Registry Methods
    // ========================================

    /// List registry modules with their store membership.
    pub fn list_modules(&self) -> Result<ModuleListing> {
        let index = self.store.load_index()?;
        let in_store = index.names();

        let modules = self
            .registry
            .list()?
            .into_iter()
            .map(|module| ModuleSummary {
                in_store: in_store.contains(module.name.as_str()),
                name: module.name,
                path: module.path,
            })
            .collect();

        Ok(ModuleListing {
            modules,
            store_count: index.len(),
        })
    }

    /// Metadata and file tree of a registry module.
    pub fn view_module(&self, name: &str) -> Result<ModuleDetails> {
        let name = validate_module_name(name)?;
        self.registry.view(name)
    }

    /// Delete a registry module. The store copy, if any, is left alone.
    ///
    /// Returns `false` when there was nothing to delete.
    pub async fn delete_module(&self, name: &str) -> Result<bool> {
        let name = validate_module_name(name)?;
        let _guard = self.locks.lock(name).await;
        self.registry.delete(name)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ModdockError, ModuleManager};
    use std::fs;
    use tempfile::TempDir;

    fn manager_with_modules(temp_dir: &TempDir, names: &[&str]) -> ModuleManager {
        let manager = ModuleManager::builder(temp_dir.path())
            .auto_create_dirs(true)
            .build()
            .unwrap();
        for name in names {
            fs::create_dir_all(manager.registry().module_path(name)).unwrap();
        }
        manager
    }

    #[tokio::test]
    async fn test_list_reports_store_membership() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_with_modules(&temp_dir, &["alpha", "beta"]);
        manager.add_to_store("beta").await.unwrap();

        let listing = manager.list_modules().unwrap();
        assert_eq!(listing.store_count, 1);
        let flags: Vec<(&str, bool)> = listing
            .modules
            .iter()
            .map(|m| (m.name.as_str(), m.in_store))
            .collect();
        assert_eq!(flags, vec![("alpha", false), ("beta", true)]);
    }

    #[tokio::test]
    async fn test_list_counts_store_entries_without_registry_module() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_with_modules(&temp_dir, &["alpha"]);
        manager.add_to_store("alpha").await.unwrap();
        manager.delete_module("alpha").await.unwrap();

        let listing = manager.list_modules().unwrap();
        assert!(listing.modules.is_empty());
        assert_eq!(listing.store_count, 1);
    }

    #[tokio::test]
    async fn test_list_with_corrupt_index_fails() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_with_modules(&temp_dir, &["alpha"]);
        fs::write(manager.store().index().path(), "nope").unwrap();

        assert!(matches!(
            manager.list_modules(),
            Err(ModdockError::CorruptIndex { .. })
        ));
    }

    #[tokio::test]
    async fn test_route_names_are_validated() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_with_modules(&temp_dir, &[]);

        assert!(matches!(
            manager.view_module("../store"),
            Err(ModdockError::InvalidModuleName { .. })
        ));
        assert!(matches!(
            manager.delete_module("..").await,
            Err(ModdockError::InvalidModuleName { .. })
        ));
        assert!(manager.data_root().is_dir());
    }

    #[tokio::test]
    async fn test_delete_absent_module_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_with_modules(&temp_dir, &[]);
        assert!(!manager.delete_module("ghost").await.unwrap());
    }
}
