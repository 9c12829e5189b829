//! Arena-backed object graph.
//!
//! Modules, types and multi-member groups live in per-database tables and are
//! addressed by handles. A handle records the database that owns it, so a
//! handle from a shared database stays meaningful inside an overlay that
//! refers to it. There are no back-pointers: a type knows its container by
//! handle, and forward references are resolved by the fixup worklist instead
//! of placeholder objects.

use pyidb_types::BuiltinTypeId;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::members::Member;

static NEXT_DATABASE_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique identity of one loaded database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatabaseId(u32);

impl DatabaseId {
    pub(crate) fn next() -> Self {
        Self(NEXT_DATABASE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "db#{}", self.0)
    }
}

macro_rules! handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            db: DatabaseId,
            index: u32,
        }

        impl $name {
            /// The database whose tables this handle indexes.
            pub fn database(&self) -> DatabaseId {
                self.db
            }

            pub(crate) fn index(&self) -> usize {
                self.index as usize
            }
        }
    };
}

handle!(
    /// Handle to a module.
    ModuleHandle
);
handle!(
    /// Handle to a type. Type identity is handle identity.
    TypeHandle
);
handle!(
    /// Handle to the alternatives of a multi-member.
    MultipleHandle
);

/// The member container a function, property or type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Module(ModuleHandle),
    Type(TypeHandle),
}

impl Container {
    pub fn database(&self) -> DatabaseId {
        match self {
            Container::Module(h) => h.database(),
            Container::Type(h) => h.database(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct ModuleData {
    pub name: String,
    pub doc: Option<String>,
    pub members: BTreeMap<String, Member>,
}

impl ModuleData {
    pub fn new(name: impl Into<String>, doc: Option<String>) -> Self {
        Self {
            name: name.into(),
            doc,
            members: BTreeMap::new(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct TypeData {
    pub name: String,
    pub container: Container,
    pub builtin_id: BuiltinTypeId,
    pub doc: Option<String>,
    pub is_builtin: bool,
    pub is_hidden: bool,
    pub members: BTreeMap<String, Member>,
    /// Filled by type resolution; every slot is `Some` once fixups drain.
    pub bases: Vec<Option<TypeHandle>>,
    pub mro: Vec<Option<TypeHandle>>,
}

impl TypeData {
    /// A type with a name and container but no details yet.
    pub fn shell(name: impl Into<String>, container: Container, builtin_id: BuiltinTypeId) -> Self {
        Self {
            name: name.into(),
            container,
            builtin_id,
            doc: None,
            is_builtin: false,
            is_hidden: false,
            members: BTreeMap::new(),
            bases: Vec::new(),
            mro: Vec::new(),
        }
    }
}

/// Tables of one database.
#[derive(Debug)]
pub(crate) struct Arena {
    db: DatabaseId,
    modules: Vec<ModuleData>,
    types: Vec<TypeData>,
    multiples: Vec<Vec<Option<Member>>>,
}

impl Arena {
    pub fn new(db: DatabaseId) -> Self {
        Self {
            db,
            modules: Vec::new(),
            types: Vec::new(),
            multiples: Vec::new(),
        }
    }

    pub fn id(&self) -> DatabaseId {
        self.db
    }

    pub fn add_module(&mut self, data: ModuleData) -> ModuleHandle {
        self.modules.push(data);
        ModuleHandle {
            db: self.db,
            index: (self.modules.len() - 1) as u32,
        }
    }

    pub fn add_type(&mut self, data: TypeData) -> TypeHandle {
        self.types.push(data);
        TypeHandle {
            db: self.db,
            index: (self.types.len() - 1) as u32,
        }
    }

    pub fn add_multiple(&mut self, len: usize) -> MultipleHandle {
        self.multiples.push(vec![None; len]);
        MultipleHandle {
            db: self.db,
            index: (self.multiples.len() - 1) as u32,
        }
    }

    pub fn module(&self, h: ModuleHandle) -> Option<&ModuleData> {
        (h.db == self.db).then(|| self.modules.get(h.index())).flatten()
    }

    /// Module data for a handle this arena issued.
    pub fn module_at(&self, h: ModuleHandle) -> &ModuleData {
        &self.modules[h.index()]
    }

    pub fn module_mut(&mut self, h: ModuleHandle) -> Option<&mut ModuleData> {
        if h.db != self.db {
            return None;
        }
        self.modules.get_mut(h.index())
    }

    pub fn ty(&self, h: TypeHandle) -> Option<&TypeData> {
        (h.db == self.db).then(|| self.types.get(h.index())).flatten()
    }

    pub fn ty_mut(&mut self, h: TypeHandle) -> Option<&mut TypeData> {
        if h.db != self.db {
            return None;
        }
        self.types.get_mut(h.index())
    }

    pub fn multiple(&self, h: MultipleHandle) -> Option<&[Option<Member>]> {
        (h.db == self.db)
            .then(|| self.multiples.get(h.index()))
            .flatten()
            .map(Vec::as_slice)
    }

    pub fn multiple_mut(&mut self, h: MultipleHandle) -> Option<&mut Vec<Option<Member>>> {
        if h.db != self.db {
            return None;
        }
        self.multiples.get_mut(h.index())
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}
