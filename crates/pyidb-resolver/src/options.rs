//! Load options.

use pyidb_types::env_utils::{env_bool_or, env_var, PYTHON2_VAR, TARGET_VERSION_VAR};
use pyidb_types::{version_applies, LanguageVersion};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How a database is loaded.
///
/// `target_version` drives the version gate. When it is `None` every record
/// applies. `python3` selects the builtin module file and the names builtin
/// type ids map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseOptions {
    pub target_version: Option<LanguageVersion>,
    pub python3: bool,
}

impl DatabaseOptions {
    /// Options pinned to a target version. The object model follows the major version.
    pub fn pinned(version: LanguageVersion) -> Self {
        Self {
            target_version: Some(version),
            python3: version.is_3x(),
        }
    }

    /// Options with no target version: every record applies and no module aliases are used.
    pub fn unpinned(python3: bool) -> Self {
        Self {
            target_version: None,
            python3,
        }
    }

    /// Read options from `PYIDB_TARGET_VERSION` and `PYIDB_PYTHON2`.
    ///
    /// An unparsable target version is ignored with a warning.
    pub fn from_env() -> Self {
        let python3 = !env_bool_or(PYTHON2_VAR, false);
        match env_var::<String>(TARGET_VERSION_VAR).map(|raw| raw.parse::<LanguageVersion>()) {
            Some(Ok(version)) => Self::pinned(version),
            Some(Err(e)) => {
                warn!(var = TARGET_VERSION_VAR, error = %e, "ignoring target version");
                Self::unpinned(python3)
            }
            None => Self::unpinned(python3),
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.target_version.is_some()
    }

    /// Whether a record carrying `expr` is included under these options.
    pub fn applies(&self, expr: Option<&str>) -> bool {
        version_applies(expr, self.target_version)
    }

    /// Name of the builtin module under these options.
    pub fn builtin_module_name(&self) -> &'static str {
        pyidb_store::builtin_module_name(self.python3)
    }
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self::unpinned(true)
    }
}
