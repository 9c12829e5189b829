//! File naming rules for interface database directories.
//!
//! A database directory holds one `<module>.idb` file per module. Files whose
//! name contains `$` are private sub-records and never register as modules.
//! The builtin module lives in `builtins.idb` for the 3.x object model and in
//! `__builtin__.idb` otherwise.

use std::path::{Path, PathBuf};

/// Extension of interface database record files (compared case-insensitively).
pub const DATABASE_EXTENSION: &str = "idb";

/// Builtin module name under the 3.x object model.
pub const BUILTIN_MODULE_3X: &str = "builtins";

/// Builtin module name under the legacy object model.
pub const BUILTIN_MODULE_LEGACY: &str = "__builtin__";

/// Marker character reserved for private sub-record files.
pub const PRIVATE_MARKER: char = '$';

/// Name of the builtin module for the given object model.
pub fn builtin_module_name(python3: bool) -> &'static str {
    if python3 {
        BUILTIN_MODULE_3X
    } else {
        BUILTIN_MODULE_LEGACY
    }
}

/// Whether `name` denotes the builtin module of the given object model.
pub fn is_builtin_module_name(name: &str, python3: bool) -> bool {
    name.eq_ignore_ascii_case(builtin_module_name(python3))
}

/// Whether `path` has the database extension.
pub fn is_database_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DATABASE_EXTENSION))
}

/// Whether a file or module name is reserved for private sub-records.
pub fn is_private(name: &str) -> bool {
    name.contains(PRIVATE_MARKER)
}

/// Module name for a database file, or `None` if the file does not register a module.
pub fn module_name_for(path: &Path) -> Option<String> {
    if !is_database_file(path) {
        return None;
    }
    let file_name = path.file_name()?.to_str()?;
    if is_private(file_name) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() {
        return None;
    }
    Some(stem.to_string())
}

/// Path of a module's record file inside a database directory.
pub fn module_path(root: &Path, module: &str) -> PathBuf {
    root.join(format!("{}.{}", module, DATABASE_EXTENSION))
}
