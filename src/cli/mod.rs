//! Command-line plumbing: database selection and the view commands.

pub mod output;
pub mod view;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use pyidb_resolver::{DatabaseOptions, TypeDatabase};
use pyidb_types::env_utils::{env_path, DB_DIR_VAR};
use pyidb_types::LanguageVersion;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Which database to load and how.
#[derive(Args, Debug)]
pub struct DbArgs {
    /// Database directory (default: $PYIDB_DB_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub db: Option<PathBuf>,

    /// Overlay directory loaded on top of the database
    #[arg(long, global = true, value_name = "DIR")]
    pub overlay: Option<PathBuf>,

    /// Target language version, e.g. 3.6 (default: $PYIDB_TARGET_VERSION)
    #[arg(long, global = true, value_name = "MAJOR.MINOR")]
    pub target_version: Option<LanguageVersion>,

    /// Use the 2.x object model when no target version is given
    #[arg(long, global = true)]
    pub python2: bool,
}

impl DbArgs {
    pub fn options(&self) -> DatabaseOptions {
        match self.target_version {
            Some(version) => DatabaseOptions::pinned(version),
            None if self.python2 => DatabaseOptions::unpinned(false),
            None => DatabaseOptions::from_env(),
        }
    }

    /// Load the database, and the overlay on top of it when one is given.
    pub fn open(&self) -> Result<TypeDatabase> {
        let dir = self.db.clone().or_else(|| env_path(DB_DIR_VAR)).ok_or_else(|| {
            anyhow!(
                "No database directory given: pass --db or set {}",
                DB_DIR_VAR
            )
        })?;
        let options = self.options();
        info!(db = %dir.display(), ?options, "loading database");

        let base = TypeDatabase::open(&dir, options)
            .with_context(|| format!("Failed to load database {}", dir.display()))?;

        match &self.overlay {
            Some(overlay) => TypeDatabase::open_overlay(Arc::new(base), overlay)
                .with_context(|| format!("Failed to load overlay {}", overlay.display())),
            None => Ok(base),
        }
    }
}
