//! The loaded type database.

use pyidb_store::{FsModuleStore, ModuleRecordStore};
use pyidb_types::{BuiltinTypeId, LanguageVersion, TypeName};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::constants::ConstantCache;
use crate::error::LoadError;
use crate::graph::{DatabaseId, ModuleHandle, MultipleHandle, TypeHandle};
use crate::loader::Loader;
use crate::members::{Constant, Member};
use crate::metrics::{LoadMetrics, MetricsSnapshot};
use crate::namespace::{ModuleLookup, Namespace, ResolvedType};
use crate::options::DatabaseOptions;
use crate::views::{ModuleView, TypeView};

/// An immutable, fully resolved view of one interface database.
///
/// A database is either standalone, with its own builtin module, or an
/// overlay over a shared database. Overlays look names up in their own
/// tables first and fall back to the shared database; they reuse its
/// builtin module and root type.
pub struct TypeDatabase {
    pub(crate) ns: Namespace,
    options: DatabaseOptions,
    builtin: ModuleHandle,
    object_type: TypeHandle,
    constants: ConstantCache,
    failures: BTreeMap<String, String>,
    metrics: LoadMetrics,
}

impl TypeDatabase {
    /// Load a standalone database from a record store.
    pub fn load(store: &dyn ModuleRecordStore, options: DatabaseOptions) -> Result<Self, LoadError> {
        Loader::new(options, None).run(store)
    }

    /// Load a standalone database from a directory.
    pub fn open<P: AsRef<Path>>(dir: P, options: DatabaseOptions) -> Result<Self, LoadError> {
        let store = FsModuleStore::open(dir)?;
        Self::load(&store, options)
    }

    /// Load an overlay over `shared` from a record store.
    ///
    /// The overlay uses the shared database's options. Its store does not
    /// need a builtin module.
    pub fn load_overlay(shared: Arc<TypeDatabase>, store: &dyn ModuleRecordStore) -> Result<Self, LoadError> {
        let options = shared.options;
        Loader::new(options, Some(shared)).run(store)
    }

    /// Load an overlay over `shared` from a directory.
    pub fn open_overlay<P: AsRef<Path>>(shared: Arc<TypeDatabase>, dir: P) -> Result<Self, LoadError> {
        let store = FsModuleStore::open(dir)?;
        Self::load_overlay(shared, &store)
    }

    pub(crate) fn from_parts(
        ns: Namespace,
        options: DatabaseOptions,
        builtin: ModuleHandle,
        object_type: TypeHandle,
        constants: ConstantCache,
        failures: BTreeMap<String, String>,
        metrics: LoadMetrics,
    ) -> Self {
        Self {
            ns,
            options,
            builtin,
            object_type,
            constants,
            failures,
            metrics,
        }
    }

    pub fn id(&self) -> DatabaseId {
        self.ns.id()
    }

    pub fn options(&self) -> &DatabaseOptions {
        &self.options
    }

    pub fn target_version(&self) -> Option<LanguageVersion> {
        self.options.target_version
    }

    pub fn is_python3(&self) -> bool {
        self.options.python3
    }

    pub fn is_overlay(&self) -> bool {
        self.ns.is_overlay()
    }

    /// The database this one overlays.
    pub fn shared(&self) -> Option<&Arc<TypeDatabase>> {
        self.ns.shared.as_ref()
    }

    /// Find a module by name: own tables, then the shared database, then
    /// under its alias.
    pub fn lookup_module(&self, name: &str) -> Option<ModuleLookup> {
        self.ns.lookup_module(name)
    }

    pub fn get_module(&self, name: &str) -> Option<ModuleView<'_>> {
        let found = self.lookup_module(name)?;
        self.module_view(found.handle)
    }

    /// Member `name` of module `module`.
    pub fn get_member(&self, module: &str, name: &str) -> Option<&Member> {
        let found = self.lookup_module(module)?;
        self.ns.module_member(found.handle, name)
    }

    pub fn builtin_module(&self) -> ModuleView<'_> {
        match self.ns.shared.as_ref() {
            Some(shared) => shared.builtin_module(),
            None => ModuleView::new(self, self.builtin, self.ns.arena.module_at(self.builtin)),
        }
    }

    pub(crate) fn builtin_handle(&self) -> ModuleHandle {
        self.builtin
    }

    /// The name `id` has in this database's builtin module.
    pub fn builtin_type_name(&self, id: BuiltinTypeId) -> Option<&'static str> {
        id.name(self.options.python3)
    }

    /// The builtin type declared for `id`, if the builtin module has one.
    pub fn builtin_type(&self, id: BuiltinTypeId) -> Option<TypeView<'_>> {
        let name = self.builtin_type_name(id)?;
        let handle = self.builtin_module().member(name)?.as_type()?;
        self.type_view(handle)
    }

    /// The universal root type every unresolved reference falls back to.
    pub fn object_type(&self) -> TypeHandle {
        self.object_type
    }

    pub fn module_view(&self, handle: ModuleHandle) -> Option<ModuleView<'_>> {
        let owner = self.owner_of(handle.database())?;
        let data = owner.ns.arena.module(handle)?;
        Some(ModuleView::new(owner, handle, data))
    }

    pub fn type_view(&self, handle: TypeHandle) -> Option<TypeView<'_>> {
        let owner = self.owner_of(handle.database())?;
        let data = owner.ns.arena.ty(handle)?;
        Some(TypeView::new(owner, handle, data))
    }

    /// The alternatives of a multi-member, skipping slots that never resolved.
    pub fn multiple_members(&self, handle: MultipleHandle) -> Vec<&Member> {
        self.ns
            .multiple(handle)
            .map(|slots| slots.iter().flatten().collect())
            .unwrap_or_default()
    }

    /// The shared constant for values of type `ty`.
    ///
    /// Constants live in the cache of the database owning `ty`, so two data
    /// members of the same type always share one constant.
    pub fn constant(&self, ty: TypeHandle) -> Arc<Constant> {
        let owner = self.owner_of(ty.database()).unwrap_or(self);
        let (constant, hit) = owner.constants.get_or_insert(ty);
        owner.metrics.record_constant_lookup(hit);
        constant
    }

    /// Resolve a type reference; anything unresolvable is the root type.
    pub fn resolve_type(&self, name: Option<&TypeName>) -> ResolvedType {
        name.and_then(|name| self.ns.try_resolve(name))
            .unwrap_or(ResolvedType {
                handle: self.object_type,
                instance_owned: self.ns.instance_owned(self.object_type.database()),
            })
    }

    /// Every module name visible from this database, sorted.
    pub fn module_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.ns.modules.keys().map(String::as_str).collect();
        if let Some(shared) = self.ns.shared.as_ref() {
            names.extend(shared.module_names());
        }
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Modules whose records failed to decode, with the decode error.
    pub fn failed_modules(&self) -> &BTreeMap<String, String> {
        &self.failures
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// The database (this one or one it overlays) with identity `id`.
    pub fn owner_of(&self, id: DatabaseId) -> Option<&TypeDatabase> {
        if id == self.id() {
            return Some(self);
        }
        self.ns.shared.as_ref()?.owner_of(id)
    }
}

impl fmt::Debug for TypeDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDatabase")
            .field("id", &self.id())
            .field("options", &self.options)
            .field("modules", &self.ns.modules.len())
            .field("overlay", &self.is_overlay())
            .finish_non_exhaustive()
    }
}
