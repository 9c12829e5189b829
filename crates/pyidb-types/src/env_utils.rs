//! Environment variable parsing utilities.
//!
//! Database options and the inspector's defaults can be supplied through the
//! environment. These helpers replace the usual boilerplate:
//!
//! ```ignore
//! std::env::var("PYIDB_TARGET_VERSION")
//!     .ok()
//!     .and_then(|v| v.parse::<LanguageVersion>().ok())
//! ```
//!
//! # Example
//!
//! ```
//! use pyidb_types::env_utils::{env_bool_or, env_var};
//! use pyidb_types::LanguageVersion;
//!
//! let pinned: Option<LanguageVersion> = env_var("PYIDB_TARGET_VERSION");
//! let legacy = env_bool_or("PYIDB_PYTHON2", false);
//! ```

use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable naming the target version (`major.minor`).
pub const TARGET_VERSION_VAR: &str = "PYIDB_TARGET_VERSION";

/// Environment variable selecting the 2.x object model when no version is pinned.
pub const PYTHON2_VAR: &str = "PYIDB_PYTHON2";

/// Environment variable naming the database directory.
pub const DB_DIR_VAR: &str = "PYIDB_DB_DIR";

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Check if an environment variable is set to a truthy value, with a default.
///
/// A set variable is truthy when it is "1", "true", "yes", or "on" (case-insensitive).
pub fn env_bool_or(key: &str, default: bool) -> bool {
    match std::env::var(key).ok() {
        Some(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

/// Read a non-empty path from the environment.
pub fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LanguageVersion;

    #[test]
    fn test_env_var_parsing() {
        std::env::set_var("PYIDB_TEST_VERSION", " 3.6 ");
        let val: Option<LanguageVersion> = env_var("PYIDB_TEST_VERSION");
        assert_eq!(val, Some(LanguageVersion::new(3, 6)));

        std::env::set_var("PYIDB_TEST_VERSION", "three");
        let bad: Option<LanguageVersion> = env_var("PYIDB_TEST_VERSION");
        assert_eq!(bad, None);

        let missing: Option<u64> = env_var("PYIDB_NONEXISTENT_12345");
        assert_eq!(missing, None);

        std::env::remove_var("PYIDB_TEST_VERSION");
    }

    #[test]
    fn test_env_bool_or() {
        std::env::set_var("PYIDB_TEST_BOOL_TRUE", "true");
        std::env::set_var("PYIDB_TEST_BOOL_YES", "YES");
        std::env::set_var("PYIDB_TEST_BOOL_FALSE", "false");

        assert!(env_bool_or("PYIDB_TEST_BOOL_TRUE", false));
        assert!(env_bool_or("PYIDB_TEST_BOOL_YES", false));
        assert!(!env_bool_or("PYIDB_TEST_BOOL_FALSE", true));
        assert!(!env_bool_or("PYIDB_NONEXISTENT_12347", false));
        assert!(env_bool_or("PYIDB_NONEXISTENT_12347", true));

        std::env::remove_var("PYIDB_TEST_BOOL_TRUE");
        std::env::remove_var("PYIDB_TEST_BOOL_YES");
        std::env::remove_var("PYIDB_TEST_BOOL_FALSE");
    }

    #[test]
    fn test_env_path() {
        std::env::set_var("PYIDB_TEST_PATH", "/tmp/db");
        assert_eq!(env_path("PYIDB_TEST_PATH"), Some(PathBuf::from("/tmp/db")));
        std::env::set_var("PYIDB_TEST_PATH", "");
        assert_eq!(env_path("PYIDB_TEST_PATH"), None);
        std::env::remove_var("PYIDB_TEST_PATH");
    }
}
