//! Read-only access to interface database directories.
//!
//! This crate provides:
//! - [`paths`]: file naming rules (`.idb` records, `$` private files, builtin module names)
//! - [`RecordDecoder`]: decoding one record file into a `serde_json::Value` tree
//! - [`ModuleRecordStore`]: the loader's view of a database, with
//!   [`FsModuleStore`] (a directory on disk) and [`MemoryModuleStore`] (records held in memory)

pub mod decoder;
pub mod modules;
pub mod paths;

pub use decoder::{JsonRecordDecoder, RecordDecoder};
pub use modules::{FsModuleStore, MemoryModuleStore, ModuleRecordStore};
pub use paths::{builtin_module_name, BUILTIN_MODULE_3X, BUILTIN_MODULE_LEGACY};
