//! Borrowed views over modules and types.

use pyidb_types::BuiltinTypeId;
use std::collections::HashSet;

use crate::database::TypeDatabase;
use crate::graph::{Container, ModuleData, ModuleHandle, TypeData, TypeHandle};
use crate::members::Member;

/// A module, borrowed from the database that owns it.
#[derive(Debug, Clone, Copy)]
pub struct ModuleView<'a> {
    db: &'a TypeDatabase,
    handle: ModuleHandle,
    data: &'a ModuleData,
}

impl<'a> ModuleView<'a> {
    pub(crate) fn new(db: &'a TypeDatabase, handle: ModuleHandle, data: &'a ModuleData) -> Self {
        Self { db, handle, data }
    }

    pub fn handle(&self) -> ModuleHandle {
        self.handle
    }

    /// The database that owns this module.
    pub fn database(&self) -> &'a TypeDatabase {
        self.db
    }

    pub fn name(&self) -> &'a str {
        &self.data.name
    }

    pub fn doc(&self) -> Option<&'a str> {
        self.data.doc.as_deref()
    }

    pub fn member(&self, name: &str) -> Option<&'a Member> {
        self.data.members.get(name)
    }

    /// Members in name order.
    pub fn members(&self) -> impl Iterator<Item = (&'a str, &'a Member)> + 'a {
        self.data.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.data.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.members.is_empty()
    }
}

/// A type, borrowed from the database that owns it.
#[derive(Debug, Clone, Copy)]
pub struct TypeView<'a> {
    db: &'a TypeDatabase,
    handle: TypeHandle,
    data: &'a TypeData,
}

impl<'a> TypeView<'a> {
    pub(crate) fn new(db: &'a TypeDatabase, handle: TypeHandle, data: &'a TypeData) -> Self {
        Self { db, handle, data }
    }

    pub fn handle(&self) -> TypeHandle {
        self.handle
    }

    pub fn database(&self) -> &'a TypeDatabase {
        self.db
    }

    pub fn name(&self) -> &'a str {
        &self.data.name
    }

    pub fn doc(&self) -> Option<&'a str> {
        self.data.doc.as_deref()
    }

    pub fn container(&self) -> Container {
        self.data.container
    }

    /// Builtin identifier; `Unknown` for types outside the builtin module.
    pub fn builtin_type_id(&self) -> BuiltinTypeId {
        self.data.builtin_id
    }

    pub fn is_builtin(&self) -> bool {
        self.data.is_builtin
    }

    pub fn is_hidden(&self) -> bool {
        self.data.is_hidden
    }

    pub fn member(&self, name: &str) -> Option<&'a Member> {
        self.data.members.get(name)
    }

    pub fn members(&self) -> impl Iterator<Item = (&'a str, &'a Member)> + 'a {
        self.data.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn bases(&self) -> Vec<TypeView<'a>> {
        self.resolve_all(&self.data.bases)
    }

    pub fn mro(&self) -> Vec<TypeView<'a>> {
        self.resolve_all(&self.data.mro)
    }

    /// Find `name` on this type or, failing that, along its MRO.
    pub fn lookup_member(&self, name: &str) -> Option<&'a Member> {
        if let Some(member) = self.member(name) {
            return Some(member);
        }
        let mut seen = HashSet::from([self.handle]);
        self.mro()
            .into_iter()
            .filter(|ty| seen.insert(ty.handle))
            .find_map(|ty| ty.member(name))
    }

    fn resolve_all(&self, handles: &[Option<TypeHandle>]) -> Vec<TypeView<'a>> {
        let db: &'a TypeDatabase = self.db;
        handles
            .iter()
            .flatten()
            .filter_map(|h| db.type_view(*h))
            .collect()
    }
}
