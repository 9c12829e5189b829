//! Abstract builtin type identifiers.
//!
//! The analyzer refers to builtin types by a version-independent tag rather
//! than by name, since the concrete names differ between the 2.x and 3.x object
//! models (`str` is the text type in 3.x but the byte-string type in 2.x).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version-independent tag for a builtin type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuiltinTypeId {
    Bool,
    Complex,
    Dict,
    Float,
    Int,
    List,
    Long,
    Object,
    Set,
    Str,
    Bytes,
    Tuple,
    Type,
    BuiltinFunction,
    BuiltinMethodDescriptor,
    DictKeys,
    DictValues,
    Function,
    Generator,
    NoneType,
    Ellipsis,
    Module,
    Unknown,
}

impl BuiltinTypeId {
    /// Every identifier, in declaration order.
    pub const ALL: [BuiltinTypeId; 23] = [
        BuiltinTypeId::Bool,
        BuiltinTypeId::Complex,
        BuiltinTypeId::Dict,
        BuiltinTypeId::Float,
        BuiltinTypeId::Int,
        BuiltinTypeId::List,
        BuiltinTypeId::Long,
        BuiltinTypeId::Object,
        BuiltinTypeId::Set,
        BuiltinTypeId::Str,
        BuiltinTypeId::Bytes,
        BuiltinTypeId::Tuple,
        BuiltinTypeId::Type,
        BuiltinTypeId::BuiltinFunction,
        BuiltinTypeId::BuiltinMethodDescriptor,
        BuiltinTypeId::DictKeys,
        BuiltinTypeId::DictValues,
        BuiltinTypeId::Function,
        BuiltinTypeId::Generator,
        BuiltinTypeId::NoneType,
        BuiltinTypeId::Ellipsis,
        BuiltinTypeId::Module,
        BuiltinTypeId::Unknown,
    ];

    /// Map a type name declared in the builtin module to its identifier.
    ///
    /// `str` is the text type under the 3.x object model and the byte-string
    /// type otherwise; `unicode` and `bytes` are fixed. Unrecognized names map
    /// to [`BuiltinTypeId::Unknown`].
    pub fn from_name(name: &str, python3: bool) -> Self {
        match name {
            "list" => BuiltinTypeId::List,
            "tuple" => BuiltinTypeId::Tuple,
            "float" => BuiltinTypeId::Float,
            "int" => BuiltinTypeId::Int,
            "complex" => BuiltinTypeId::Complex,
            "dict" => BuiltinTypeId::Dict,
            "bool" => BuiltinTypeId::Bool,
            "generator" => BuiltinTypeId::Generator,
            "function" => BuiltinTypeId::Function,
            "set" => BuiltinTypeId::Set,
            "type" => BuiltinTypeId::Type,
            "object" => BuiltinTypeId::Object,
            "long" => BuiltinTypeId::Long,
            "builtin_function" => BuiltinTypeId::BuiltinFunction,
            "builtin_method_descriptor" => BuiltinTypeId::BuiltinMethodDescriptor,
            "NoneType" => BuiltinTypeId::NoneType,
            "ellipsis" => BuiltinTypeId::Ellipsis,
            "dict_keys" => BuiltinTypeId::DictKeys,
            "dict_values" => BuiltinTypeId::DictValues,
            "str" if python3 => BuiltinTypeId::Str,
            "str" => BuiltinTypeId::Bytes,
            "unicode" => BuiltinTypeId::Str,
            "bytes" => BuiltinTypeId::Bytes,
            _ => BuiltinTypeId::Unknown,
        }
    }

    /// The name this identifier has in the builtin module of the given object model.
    ///
    /// Returns `None` for identifiers without a builtin name.
    pub fn name(self, python3: bool) -> Option<&'static str> {
        let name = match self {
            BuiltinTypeId::Bool => "bool",
            BuiltinTypeId::Complex => "complex",
            BuiltinTypeId::Dict => "dict",
            BuiltinTypeId::Float => "float",
            BuiltinTypeId::Int => "int",
            BuiltinTypeId::List => "list",
            BuiltinTypeId::Long => "long",
            BuiltinTypeId::Object => "object",
            BuiltinTypeId::Set => "set",
            BuiltinTypeId::Str if python3 => "str",
            BuiltinTypeId::Str => "unicode",
            BuiltinTypeId::Bytes if python3 => "bytes",
            BuiltinTypeId::Bytes => "str",
            BuiltinTypeId::Tuple => "tuple",
            BuiltinTypeId::Type => "type",
            BuiltinTypeId::BuiltinFunction => "builtin_function",
            BuiltinTypeId::BuiltinMethodDescriptor => "builtin_method_descriptor",
            BuiltinTypeId::DictKeys => "dict_keys",
            BuiltinTypeId::DictValues => "dict_values",
            BuiltinTypeId::Function => "function",
            BuiltinTypeId::Generator => "generator",
            BuiltinTypeId::NoneType => "NoneType",
            BuiltinTypeId::Ellipsis => "ellipsis",
            BuiltinTypeId::Module | BuiltinTypeId::Unknown => return None,
        };
        Some(name)
    }
}

impl fmt::Display for BuiltinTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Error returned when parsing an unknown identifier name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBuiltinTypeId(pub String);

impl fmt::Display for UnknownBuiltinTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown builtin type identifier '{}'", self.0)
    }
}

impl std::error::Error for UnknownBuiltinTypeId {}

impl FromStr for BuiltinTypeId {
    type Err = UnknownBuiltinTypeId;

    /// Parse the identifier's own name (`"DictKeys"`, case-insensitive), not a builtin type name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuiltinTypeId::ALL
            .into_iter()
            .find(|id| id.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownBuiltinTypeId(s.to_string()))
    }
}
