//! Module aliases - legacy module names mapped to their current names.
//!
//! Several 2.x modules were renamed in 3.x:
//! - `cPickle` became `_pickle`
//! - `thread` became `_thread`
//!
//! Records written against the old names still reference them. When a database
//! is pinned to a 3.x target, a lookup that misses on a legacy name retries
//! under the current name.

use std::collections::HashMap;

use crate::options::DatabaseOptions;

const PYTHON3_RENAMES: &[(&str, &str)] = &[("cPickle", "_pickle"), ("thread", "_thread")];

/// Fallback table consulted when a module lookup misses.
#[derive(Debug, Default, Clone)]
pub struct ModuleAliases {
    /// Maps legacy name -> current name
    legacy_to_current: HashMap<String, String>,
}

impl ModuleAliases {
    /// Create an empty alias table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The 2.x to 3.x renames.
    pub fn python3_renames() -> Self {
        let mut aliases = Self::new();
        for (legacy, current) in PYTHON3_RENAMES {
            aliases.register(legacy, current);
        }
        aliases
    }

    /// Aliases active for a database loaded with `options`.
    ///
    /// Only databases pinned to a 3.x target consult the renames; an unpinned
    /// database gets an empty table.
    pub fn for_options(options: &DatabaseOptions) -> Self {
        if options.is_pinned() && options.python3 {
            Self::python3_renames()
        } else {
            Self::new()
        }
    }

    /// Register a rename from `legacy` to `current`.
    pub fn register(&mut self, legacy: &str, current: &str) {
        self.legacy_to_current
            .insert(legacy.to_string(), current.to_string());
    }

    /// The current name for a legacy module name, if one is registered.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.legacy_to_current.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.legacy_to_current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legacy_to_current.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyidb_types::LanguageVersion;

    #[test]
    fn test_register_and_resolve() {
        let mut aliases = ModuleAliases::new();
        aliases.register("Queue", "queue");

        assert_eq!(aliases.resolve("Queue"), Some("queue"));
        assert_eq!(aliases.resolve("queue"), None);
        assert_eq!(aliases.len(), 1);
    }

    #[test]
    fn test_unknown_name() {
        let aliases = ModuleAliases::python3_renames();
        assert_eq!(aliases.resolve("os"), None);
        assert_eq!(aliases.resolve("cPickle"), Some("_pickle"));
        assert_eq!(aliases.resolve("thread"), Some("_thread"));
        assert_eq!(aliases.len(), 2);
    }

    #[test]
    fn test_only_pinned_3x_databases_alias() {
        let pinned3 = DatabaseOptions::pinned(LanguageVersion::new(3, 6));
        let pinned2 = DatabaseOptions::pinned(LanguageVersion::new(2, 7));

        assert_eq!(ModuleAliases::for_options(&pinned3).len(), 2);
        assert!(ModuleAliases::for_options(&pinned2).is_empty());
        assert!(ModuleAliases::for_options(&DatabaseOptions::unpinned(true)).is_empty());
    }
}
