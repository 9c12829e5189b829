//! Load errors.
//!
//! Only conditions that make the whole database unusable are errors. A module
//! that fails to decode, a malformed member record or an unresolvable reference
//! is recovered from during the load and shows up in the database's failure
//! table and metrics instead.

use std::fmt;

/// Fatal error while loading a type database.
#[derive(Debug)]
pub enum LoadError {
    /// The database has no record for the builtin module.
    MissingBuiltinModule { module: String, location: String },
    /// The builtin module record could not be decoded.
    InvalidBuiltinModule { module: String, reason: String },
    /// A `moduleref` record without a string module name.
    MalformedModuleRef { member: String, reason: String },
    /// The record store itself failed (unreadable directory, listing failure).
    Store(anyhow::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::MissingBuiltinModule { module, location } => {
                write!(f, "Builtin module {} not found in {}", module, location)
            }
            LoadError::InvalidBuiltinModule { module, reason } => {
                write!(f, "Builtin module {} could not be decoded: {}", module, reason)
            }
            LoadError::MalformedModuleRef { member, reason } => {
                write!(f, "Malformed module reference at {}: {}", member, reason)
            }
            LoadError::Store(e) => write!(f, "Record store error: {}", e),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Store(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for LoadError {
    fn from(e: anyhow::Error) -> Self {
        LoadError::Store(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = LoadError::MissingBuiltinModule {
            module: "builtins".into(),
            location: "/db".into(),
        };
        assert_eq!(err.to_string(), "Builtin module builtins not found in /db");

        let err = LoadError::MalformedModuleRef {
            member: "os.path".into(),
            reason: "moduleref record has a number where a module name string is required".into(),
        };
        assert!(err.to_string().starts_with("Malformed module reference at os.path"));
    }

    #[test]
    fn test_store_error_has_source() {
        use std::error::Error;
        let err = LoadError::from(anyhow::anyhow!("Failed to read database directory /db"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/db"));
    }
}
