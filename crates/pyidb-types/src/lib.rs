//! Shared types for the pyidb workspace.
//!
//! This crate holds the boundary vocabulary every other crate speaks:
//!
//! - [`version`]: `major.minor` target versions and the version gate
//! - [`builtin`]: abstract builtin type identifiers and their per-model names
//! - [`record`]: the closed sum type member records decode into
//! - [`env_utils`]: environment-variable configuration helpers

pub mod builtin;
pub mod env_utils;
pub mod record;
pub mod version;

pub use builtin::BuiltinTypeId;
pub use record::{
    DataRecord, FunctionRecord, MemberRecord, ModuleRecord, OverloadRecord, ParameterRecord,
    PropertyRecord, RecordError, TypeName, TypeRecord, TypeRefList,
};
pub use version::{version_applies, LanguageVersion, VersionParseError};
