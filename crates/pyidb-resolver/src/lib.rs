//! Interface database resolver.
//!
//! Loads a directory of per-module records into an immutable graph of
//! modules, types and members, resolving cross-module references along the way.
//!
//! This crate provides:
//! - [`TypeDatabase`]: loading, overlays and the query API
//! - [`ModuleView`] / [`TypeView`]: borrowed views over the graph
//! - [`Member`]: resolved members, with function signatures expanded on demand
//! - [`ModuleAliases`]: legacy module names retried under their 3.x names
//! - [`LoadMetrics`]: counters describing what a load recovered from
//!
//! # Loading
//!
//! A load registers every decodable module and creates empty types for
//! top-level type records first, then builds members. References that cannot
//! be resolved yet are queued and retried once everything is built;
//! references that never resolve fall back to the root `object` type (for
//! types) or are dropped (for member references). A database that loads
//! successfully is always fully resolved.
//!
//! ```no_run
//! use pyidb_resolver::{DatabaseOptions, TypeDatabase};
//! use pyidb_types::LanguageVersion;
//!
//! # fn main() -> Result<(), pyidb_resolver::LoadError> {
//! let db = TypeDatabase::open("/path/to/db", DatabaseOptions::pinned(LanguageVersion::new(3, 6)))?;
//! if let Some(os) = db.get_module("os") {
//!     println!("{} has {} members", os.name(), os.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod aliases;
mod builder;
pub mod constants;
pub mod database;
pub mod error;
mod fixups;
pub mod graph;
mod loader;
pub mod members;
pub mod metrics;
mod namespace;
pub mod options;
pub mod views;

pub use aliases::ModuleAliases;
pub use database::TypeDatabase;
pub use error::LoadError;
pub use graph::{Container, DatabaseId, ModuleHandle, MultipleHandle, TypeHandle};
pub use members::{Constant, Function, Member, MemberKind, Overload, Parameter, ParameterKind, Property};
pub use metrics::{LoadMetrics, MetricsSnapshot};
pub use namespace::{ModuleLookup, ResolvedType};
pub use options::DatabaseOptions;
pub use views::{ModuleView, TypeView};
