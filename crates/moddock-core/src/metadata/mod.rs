//! Metadata persistence.
//!
//! This module provides:
//! - Atomic JSON file operations
//! - The per-module metadata record written next to every module
//! - Advisory file locks for shared documents

mod atomic;
mod lock;
mod module;

pub use atomic::{atomic_read_json, atomic_write_json};
pub use lock::FileLockGuard;
pub use module::{load_module_metadata, write_module_metadata, ModuleMetadata};
