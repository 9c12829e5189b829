//! Name lookup shared by the loader and the finished database.
//!
//! A namespace is one database's own tables plus an optional shared database
//! it overlays. Lookups try the own tables first, then the shared database,
//! and finally retry under a module alias.

use pyidb_types::TypeName;
use std::collections::HashMap;
use std::sync::Arc;

use crate::aliases::ModuleAliases;
use crate::database::TypeDatabase;
use crate::graph::{Arena, DatabaseId, ModuleData, ModuleHandle, MultipleHandle, TypeData, TypeHandle};
use crate::members::Member;

/// A module found by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleLookup {
    pub handle: ModuleHandle,
    /// `true` when the module came from an overlay's own tables rather than
    /// from the database it overlays.
    pub instance_owned: bool,
}

/// A type reference after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedType {
    pub handle: TypeHandle,
    /// Same meaning as [`ModuleLookup::instance_owned`].
    pub instance_owned: bool,
}

#[derive(Debug)]
pub(crate) struct Namespace {
    pub arena: Arena,
    pub modules: HashMap<String, ModuleHandle>,
    pub shared: Option<Arc<TypeDatabase>>,
    pub aliases: ModuleAliases,
}

impl Namespace {
    pub fn new(shared: Option<Arc<TypeDatabase>>, aliases: ModuleAliases) -> Self {
        Self {
            arena: Arena::new(DatabaseId::next()),
            modules: HashMap::new(),
            shared,
            aliases,
        }
    }

    pub fn id(&self) -> DatabaseId {
        self.arena.id()
    }

    pub fn is_overlay(&self) -> bool {
        self.shared.is_some()
    }

    pub fn instance_owned(&self, db: DatabaseId) -> bool {
        self.is_overlay() && db == self.id()
    }

    pub fn register_module(&mut self, name: &str, doc: Option<String>) -> ModuleHandle {
        let handle = self.arena.add_module(ModuleData::new(name, doc));
        self.modules.insert(name.to_string(), handle);
        handle
    }

    /// Aliases apply once, after the literal name missed on every level. The
    /// alias target is then looked up through every level again.
    pub fn lookup_module(&self, name: &str) -> Option<ModuleLookup> {
        self.lookup_direct(name).or_else(|| {
            self.aliases
                .resolve(name)
                .and_then(|target| self.lookup_direct(target))
        })
    }

    /// Literal-name lookup through this table and every shared level, without aliases.
    pub fn lookup_direct(&self, name: &str) -> Option<ModuleLookup> {
        if let Some(&handle) = self.modules.get(name) {
            return Some(ModuleLookup {
                handle,
                instance_owned: self.is_overlay(),
            });
        }
        let shared = self.shared.as_ref()?;
        shared.ns.lookup_direct(name).map(|found| ModuleLookup {
            handle: found.handle,
            instance_owned: false,
        })
    }

    /// Resolve `(module, name)` to a type if both parts exist now.
    pub fn try_resolve(&self, name: &TypeName) -> Option<ResolvedType> {
        let module = self.lookup_module(&name.module)?;
        let handle = self.module_member(module.handle, &name.name)?.as_type()?;
        Some(ResolvedType {
            handle,
            instance_owned: self.instance_owned(handle.database()),
        })
    }

    pub fn module(&self, h: ModuleHandle) -> Option<&ModuleData> {
        if h.database() == self.id() {
            self.arena.module(h)
        } else {
            self.shared.as_ref()?.ns.module(h)
        }
    }

    pub fn ty(&self, h: TypeHandle) -> Option<&TypeData> {
        if h.database() == self.id() {
            self.arena.ty(h)
        } else {
            self.shared.as_ref()?.ns.ty(h)
        }
    }

    pub fn multiple(&self, h: MultipleHandle) -> Option<&[Option<Member>]> {
        if h.database() == self.id() {
            self.arena.multiple(h)
        } else {
            self.shared.as_ref()?.ns.multiple(h)
        }
    }

    pub fn module_member(&self, h: ModuleHandle, name: &str) -> Option<&Member> {
        self.module(h)?.members.get(name)
    }

    pub fn type_member(&self, h: TypeHandle, name: &str) -> Option<&Member> {
        self.ty(h)?.members.get(name)
    }
}
