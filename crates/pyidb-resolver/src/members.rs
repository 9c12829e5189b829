//! Members of modules and types.

use pyidb_types::{FunctionRecord, OverloadRecord, ParameterRecord, PropertyRecord, TypeRefList};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::database::TypeDatabase;
use crate::graph::{Container, DatabaseId, ModuleHandle, MultipleHandle, TypeHandle};

/// Kind of a resolved member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Function,
    Method,
    Property,
    Constant,
    Type,
    Module,
    Multiple,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemberKind::Function => "function",
            MemberKind::Method => "method",
            MemberKind::Property => "property",
            MemberKind::Constant => "constant",
            MemberKind::Type => "type",
            MemberKind::Module => "module",
            MemberKind::Multiple => "multiple",
        };
        f.write_str(name)
    }
}

/// A resolved member.
///
/// Functions, properties and constants are shared by `Arc`; types, modules
/// and multi-members are arena handles owned by a database.
#[derive(Debug, Clone)]
pub enum Member {
    Function(Arc<Function>),
    Method(Arc<Function>),
    Property(Arc<Property>),
    Constant(Arc<Constant>),
    Type(TypeHandle),
    Module(ModuleHandle),
    Multiple(MultipleHandle),
}

impl Member {
    pub fn kind(&self) -> MemberKind {
        match self {
            Member::Function(_) => MemberKind::Function,
            Member::Method(_) => MemberKind::Method,
            Member::Property(_) => MemberKind::Property,
            Member::Constant(_) => MemberKind::Constant,
            Member::Type(_) => MemberKind::Type,
            Member::Module(_) => MemberKind::Module,
            Member::Multiple(_) => MemberKind::Multiple,
        }
    }

    pub fn as_type(&self) -> Option<TypeHandle> {
        match self {
            Member::Type(h) => Some(*h),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<ModuleHandle> {
        match self {
            Member::Module(h) => Some(*h),
            _ => None,
        }
    }

    /// The function behind a `Function` or `Method` member.
    pub fn as_function(&self) -> Option<&Arc<Function>> {
        match self {
            Member::Function(f) | Member::Method(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Arc<Constant>> {
        match self {
            Member::Constant(c) => Some(c),
            _ => None,
        }
    }
}

/// A function or method.
///
/// Overload records are kept raw and expanded on first access. Expansion
/// resolves parameter and return types against the database that owns the
/// function, so it is only valid after that database has finished loading.
#[derive(Debug)]
pub struct Function {
    name: String,
    container: Container,
    doc: Option<String>,
    is_builtin: bool,
    is_static: bool,
    overload_records: Vec<Value>,
    overloads: OnceLock<Vec<Overload>>,
}

impl Function {
    pub(crate) fn new(name: &str, container: Container, record: FunctionRecord) -> Self {
        Self {
            name: name.to_string(),
            container,
            doc: record.doc,
            is_builtin: record.builtin,
            is_static: record.is_static,
            overload_records: record.overloads.unwrap_or_default(),
            overloads: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container(&self) -> Container {
        self.container
    }

    /// The database the function was loaded into.
    pub fn database(&self) -> DatabaseId {
        self.container.database()
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn is_builtin(&self) -> bool {
        self.is_builtin
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Number of overload records, without expanding them.
    pub fn overload_count(&self) -> usize {
        self.overload_records.len()
    }

    /// Whether the signatures have been expanded yet.
    pub fn is_expanded(&self) -> bool {
        self.overloads.get().is_some()
    }

    /// Expanded overloads.
    ///
    /// `db` must be the owning database or an overlay over it; any other
    /// database yields no overloads and leaves the function unexpanded.
    /// Overload records that do not decode are skipped.
    pub fn overloads(&self, db: &TypeDatabase) -> &[Overload] {
        if let Some(expanded) = self.overloads.get() {
            return expanded;
        }
        let Some(owner) = db.owner_of(self.database()) else {
            return &[];
        };
        self.overloads.get_or_init(|| {
            self.overload_records
                .iter()
                .filter_map(|raw| OverloadRecord::deserialize(raw).ok())
                .map(|record| Overload::expand(record, owner))
                .collect()
        })
    }
}

/// One expanded signature of a function.
#[derive(Debug, Clone)]
pub struct Overload {
    pub doc: Option<String>,
    pub parameters: Vec<Parameter>,
    pub return_types: Vec<TypeHandle>,
}

impl Overload {
    fn expand(record: OverloadRecord, db: &TypeDatabase) -> Self {
        Self {
            doc: record.doc,
            parameters: record
                .args
                .into_iter()
                .map(|arg| Parameter::expand(arg, db))
                .collect(),
            return_types: resolve_list(record.ret_type, db),
        }
    }
}

/// How a parameter binds arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Normal,
    /// `*args`
    List,
    /// `**kwargs`
    Dict,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub types: Vec<TypeHandle>,
    pub default_value: Option<String>,
    pub kind: ParameterKind,
}

impl Parameter {
    fn expand(record: ParameterRecord, db: &TypeDatabase) -> Self {
        let kind = match record.arg_format.as_deref() {
            Some("*") => ParameterKind::List,
            Some("**") => ParameterKind::Dict,
            _ => ParameterKind::Normal,
        };
        Self {
            name: record.name,
            types: resolve_list(record.ty, db),
            default_value: record.default_value,
            kind,
        }
    }
}

fn resolve_list(list: Option<TypeRefList>, db: &TypeDatabase) -> Vec<TypeHandle> {
    list.map(TypeRefList::into_vec)
        .unwrap_or_default()
        .iter()
        .map(|name| db.resolve_type(name.as_ref()).handle)
        .collect()
}

/// A property. Its type is set once the type reference resolves.
#[derive(Debug)]
pub struct Property {
    name: String,
    container: Container,
    doc: Option<String>,
    is_static: bool,
    ty: OnceLock<TypeHandle>,
}

impl Property {
    pub(crate) fn new(name: &str, container: Container, record: &PropertyRecord) -> Self {
        Self {
            name: name.to_string(),
            container,
            doc: record.doc.clone(),
            is_static: record.is_static,
            ty: OnceLock::new(),
        }
    }

    pub(crate) fn set_type(&self, ty: TypeHandle) {
        let _ = self.ty.set(ty);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container(&self) -> Container {
        self.container
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// The property's type. `None` when the record declares no type.
    pub fn ty(&self) -> Option<TypeHandle> {
        self.ty.get().copied()
    }
}

/// A value of a known type. Shared per type through the constant cache.
#[derive(Debug, PartialEq, Eq)]
pub struct Constant {
    ty: TypeHandle,
}

impl Constant {
    pub(crate) fn new(ty: TypeHandle) -> Self {
        Self { ty }
    }

    pub fn ty(&self) -> TypeHandle {
        self.ty
    }
}
