//! API implementation submodules.
//!
//! Each submodule contains `impl ModuleManager` blocks that extend the public
//! API with domain-specific methods. The struct definition remains in
//! `lib.rs`.

mod builder;
mod modules;
mod store;
mod upload;

pub use builder::ModuleManagerBuilder;
