//! Core traits, settings, and module lifecycle for the bookstore service.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Migration, Module};
pub use registry::ModuleRegistry;
