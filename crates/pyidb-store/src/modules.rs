//! Module record stores.
//!
//! A store answers three questions for the loader: where is the builtin
//! module, which other modules exist, and what does a module's record look
//! like. Stores are read-only; nothing here ever writes to a database directory.

use anyhow::{anyhow, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::decoder::{JsonRecordDecoder, RecordDecoder};
use crate::paths::{builtin_module_name, is_builtin_module_name, is_private, module_name_for};

/// Trait for module record stores.
pub trait ModuleRecordStore: Send + Sync {
    /// Decode the builtin module for the given object model.
    ///
    /// Returns `Ok(None)` when the store has no builtin module record.
    fn builtin(&self, python3: bool) -> Result<Option<Value>>;

    /// Names of every registrable module except the builtin one, sorted.
    fn module_names(&self, python3: bool) -> Result<Vec<String>>;

    /// Decode one module's root record.
    fn load(&self, module: &str) -> Result<Value>;

    /// Human-readable location, for diagnostics.
    fn describe(&self) -> String;
}

/// Filesystem-backed store over one database directory.
pub struct FsModuleStore {
    root: Arc<Path>,
    files: BTreeMap<String, PathBuf>,
    decoder: Arc<dyn RecordDecoder>,
}

impl FsModuleStore {
    /// Open a database directory, decoding records as JSON.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::with_decoder(root, Arc::new(JsonRecordDecoder))
    }

    /// Open a database directory with a custom record decoder.
    pub fn with_decoder<P: AsRef<Path>>(root: P, decoder: Arc<dyn RecordDecoder>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(anyhow!(
                "Database directory {} does not exist or is not a directory",
                root.display()
            ));
        }

        let entries = std::fs::read_dir(&root)
            .map_err(|e| anyhow!("Failed to read database directory {}: {}", root.display(), e))?;
        let mut files = BTreeMap::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match module_name_for(&path) {
                Some(name) => {
                    files.insert(name, path);
                }
                None => debug!(path = %path.display(), "skipping non-module file"),
            }
        }

        Ok(Self {
            root: Arc::from(root),
            files,
            decoder,
        })
    }

    /// Get the database directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a registered module's record file.
    pub fn module_file(&self, module: &str) -> Option<&Path> {
        self.files.get(module).map(PathBuf::as_path)
    }

    fn builtin_file(&self, python3: bool) -> Option<&Path> {
        self.files
            .iter()
            .find(|(name, _)| is_builtin_module_name(name, python3))
            .map(|(_, path)| path.as_path())
    }
}

impl ModuleRecordStore for FsModuleStore {
    fn builtin(&self, python3: bool) -> Result<Option<Value>> {
        match self.builtin_file(python3) {
            Some(path) => self.decoder.decode(path).map(Some),
            None => Ok(None),
        }
    }

    fn module_names(&self, python3: bool) -> Result<Vec<String>> {
        Ok(self
            .files
            .keys()
            .filter(|name| !is_builtin_module_name(name, python3))
            .cloned()
            .collect())
    }

    fn load(&self, module: &str) -> Result<Value> {
        let path = self
            .files
            .get(module)
            .ok_or_else(|| anyhow!("Module {} not found in {}", module, self.root.display()))?;
        self.decoder.decode(path)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// In-memory store, for databases assembled by code and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryModuleStore {
    modules: BTreeMap<String, Value>,
    broken: BTreeMap<String, String>,
}

impl MemoryModuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module record (builder style).
    pub fn with_module(mut self, name: impl Into<String>, record: Value) -> Self {
        self.insert(name, record);
        self
    }

    /// Add a module record.
    pub fn insert(&mut self, name: impl Into<String>, record: Value) {
        let name = name.into();
        self.broken.remove(&name);
        self.modules.insert(name, record);
    }

    /// Register a module whose record fails to decode with `error`.
    pub fn insert_broken(&mut self, name: impl Into<String>, error: impl Into<String>) {
        let name = name.into();
        self.modules.remove(&name);
        self.broken.insert(name, error.into());
    }

    pub fn len(&self) -> usize {
        self.modules.len() + self.broken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ModuleRecordStore for MemoryModuleStore {
    fn builtin(&self, python3: bool) -> Result<Option<Value>> {
        let name = builtin_module_name(python3);
        if let Some((_, error)) = self.broken.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            return Err(anyhow!("Failed to decode module {}: {}", name, error));
        }
        Ok(self
            .modules
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, record)| record.clone()))
    }

    fn module_names(&self, python3: bool) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .modules
            .keys()
            .chain(self.broken.keys())
            .filter(|name| !is_private(name) && !is_builtin_module_name(name, python3))
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }

    fn load(&self, module: &str) -> Result<Value> {
        if let Some(error) = self.broken.get(module) {
            return Err(anyhow!("Failed to decode module {}: {}", module, error));
        }
        self.modules
            .get(module)
            .cloned()
            .ok_or_else(|| anyhow!("Module {} not found in memory store", module))
    }

    fn describe(&self) -> String {
        format!("<memory: {} modules>", self.len())
    }
}
