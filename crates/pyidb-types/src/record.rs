//! Member records as stored in an interface database.
//!
//! Every member of a module or type is stored as `{ "kind": ..., "value": { ... } }`.
//! [`MemberRecord::decode`] turns that dynamic shape into a closed sum type once,
//! at the boundary, so the loader never walks untyped mappings.
//!
//! Decoding is deliberately forgiving: unknown kinds, missing fields and
//! wrong-shaped payloads decode to `Ok(None)` and the member is simply omitted.
//! The single exception is a `moduleref` without a string `module_name`, which
//! means the database itself is corrupt and is reported as
//! [`RecordError::MalformedModuleRef`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Reference to a type by `(module, name)`.
///
/// Stored on disk as a two-element array `["module", "name"]`. A reference
/// field holding `null` denotes the universal root type and is modelled as
/// `Option<TypeName>::None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct TypeName {
    pub module: String,
    pub name: String,
}

impl TypeName {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl From<(String, String)> for TypeName {
    fn from((module, name): (String, String)) -> Self {
        Self { module, name }
    }
}

impl From<TypeName> for (String, String) {
    fn from(name: TypeName) -> Self {
        (name.module, name.name)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

/// A single type reference or a list of them.
///
/// Signatures use both shapes interchangeably for parameter and return types.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TypeRefList {
    One(Option<TypeName>),
    Many(Vec<Option<TypeName>>),
}

impl TypeRefList {
    pub fn into_vec(self) -> Vec<Option<TypeName>> {
        match self {
            TypeRefList::One(name) => vec![name],
            TypeRefList::Many(names) => names,
        }
    }
}

/// Payload shared by `function` and `method` records.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunctionRecord {
    pub doc: Option<String>,
    /// Raw overload records, expanded lazily by the loader.
    pub overloads: Option<Vec<Value>>,
    #[serde(default)]
    pub builtin: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    pub version: Option<String>,
}

/// One overload of a function signature.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverloadRecord {
    pub doc: Option<String>,
    #[serde(default)]
    pub args: Vec<ParameterRecord>,
    pub ret_type: Option<TypeRefList>,
}

/// One parameter of an overload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParameterRecord {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Option<TypeRefList>,
    pub default_value: Option<String>,
    /// `"*"` for a star-args list, `"**"` for a keyword dictionary.
    pub arg_format: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyRecord {
    pub doc: Option<String>,
    #[serde(rename = "type")]
    pub ty: Option<TypeRefList>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataRecord {
    #[serde(rename = "type")]
    pub ty: Option<TypeName>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeRecord {
    pub doc: Option<String>,
    #[serde(default)]
    pub members: Map<String, Value>,
    #[serde(default)]
    pub bases: Vec<Option<TypeName>>,
    #[serde(default)]
    pub mro: Vec<Option<TypeName>>,
    #[serde(default)]
    pub builtin: bool,
    #[serde(default)]
    pub is_hidden: bool,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct FuncRefPayload {
    func_name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TypeRefPayload {
    type_name: Option<TypeName>,
}

#[derive(Debug, Clone, Deserialize)]
struct MultiplePayload {
    members: Vec<Value>,
}

/// A decoded member record, one variant per on-disk kind.
#[derive(Debug, Clone)]
pub enum MemberRecord {
    Function(FunctionRecord),
    Method(FunctionRecord),
    Property(PropertyRecord),
    Data(DataRecord),
    Type(TypeRecord),
    /// Dotted path `module.member` or `module.type.member`.
    FuncRef(String),
    /// Alternatives in their original order; malformed entries are `None`.
    Multiple(Vec<Option<MemberRecord>>),
    TypeRef(Option<TypeName>),
    ModuleRef(String),
}

impl MemberRecord {
    /// Decode one `{kind, value}` record.
    ///
    /// Returns `Ok(None)` for anything malformed or unknown and an error only
    /// for a `moduleref` whose `module_name` is missing or not a string.
    pub fn decode(record: &Value) -> Result<Option<MemberRecord>, RecordError> {
        let Some(obj) = record.as_object() else {
            return Ok(None);
        };
        let (Some(kind), Some(value)) = (obj.get("kind").and_then(Value::as_str), obj.get("value"))
        else {
            return Ok(None);
        };
        if !value.is_object() {
            return Ok(None);
        }

        let decoded = match kind {
            "function" => payload(value).map(MemberRecord::Function),
            "method" => payload(value).map(MemberRecord::Method),
            "property" => payload(value).map(MemberRecord::Property),
            "data" if value.get("type").is_some() => payload(value).map(MemberRecord::Data),
            "type" => payload(value).map(MemberRecord::Type),
            "func_ref" => payload::<FuncRefPayload>(value).map(|p| MemberRecord::FuncRef(p.func_name)),
            "typeref" if value.get("type_name").is_some() => {
                payload::<TypeRefPayload>(value).map(|p| MemberRecord::TypeRef(p.type_name))
            }
            "multiple" => match payload::<MultiplePayload>(value) {
                Some(p) => {
                    let mut members = Vec::with_capacity(p.members.len());
                    for member in &p.members {
                        members.push(MemberRecord::decode(member)?);
                    }
                    Some(MemberRecord::Multiple(members))
                }
                None => None,
            },
            "moduleref" => match value.get("module_name") {
                Some(Value::String(name)) => Some(MemberRecord::ModuleRef(name.clone())),
                other => {
                    return Err(RecordError::MalformedModuleRef {
                        found: other.map(describe).unwrap_or("nothing").to_string(),
                    })
                }
            },
            _ => None,
        };
        Ok(decoded)
    }

    /// The on-disk kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            MemberRecord::Function(_) => "function",
            MemberRecord::Method(_) => "method",
            MemberRecord::Property(_) => "property",
            MemberRecord::Data(_) => "data",
            MemberRecord::Type(_) => "type",
            MemberRecord::FuncRef(_) => "func_ref",
            MemberRecord::Multiple(_) => "multiple",
            MemberRecord::TypeRef(_) => "typeref",
            MemberRecord::ModuleRef(_) => "moduleref",
        }
    }

    /// The version expression gating this record, for the kinds that carry one.
    pub fn version(&self) -> Option<&str> {
        match self {
            MemberRecord::Function(r) | MemberRecord::Method(r) => r.version.as_deref(),
            MemberRecord::Property(r) => r.version.as_deref(),
            MemberRecord::Data(r) => r.version.as_deref(),
            MemberRecord::Type(r) => r.version.as_deref(),
            _ => None,
        }
    }
}

fn payload<'de, T: Deserialize<'de>>(value: &'de Value) -> Option<T> {
    T::deserialize(value).ok()
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

/// Root record of one module file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleRecord {
    pub doc: Option<String>,
    #[serde(default)]
    pub members: Map<String, Value>,
}

impl ModuleRecord {
    /// Decode a module root. The root must be a mapping.
    pub fn from_value(root: &Value) -> Result<Self, RecordError> {
        if !root.is_object() {
            return Err(RecordError::NotAMapping {
                found: describe(root).to_string(),
            });
        }
        ModuleRecord::deserialize(root).map_err(|e| RecordError::Invalid(e.to_string()))
    }
}

/// Errors raised while decoding records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A `moduleref` record whose `module_name` is missing or not a string.
    MalformedModuleRef { found: String },
    /// A module root that is not a mapping.
    NotAMapping { found: String },
    /// A module root with wrong-shaped fields.
    Invalid(String),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::MalformedModuleRef { found } => {
                write!(f, "moduleref record has {} where a module name string is required", found)
            }
            RecordError::NotAMapping { found } => {
                write!(f, "module record root is {}, expected a mapping", found)
            }
            RecordError::Invalid(msg) => write!(f, "invalid module record: {}", msg),
        }
    }
}

impl std::error::Error for RecordError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> Option<MemberRecord> {
        MemberRecord::decode(&value).unwrap()
    }

    #[test]
    fn test_decode_function() {
        let record = decode(json!({
            "kind": "function",
            "value": {"doc": "Return the length.", "builtin": true, "overloads": [{"args": []}]}
        }))
        .unwrap();
        let MemberRecord::Function(f) = record else {
            panic!("expected function");
        };
        assert_eq!(f.doc.as_deref(), Some("Return the length."));
        assert!(f.builtin);
        assert_eq!(f.overloads.map(|o| o.len()), Some(1));
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        assert!(decode(json!("function")).is_none());
        assert!(decode(json!({"kind": "function"})).is_none());
        assert!(decode(json!({"value": {}})).is_none());
        assert!(decode(json!({"kind": "function", "value": [1, 2]})).is_none());
        assert!(decode(json!({"kind": "mystery", "value": {}})).is_none());
        assert!(decode(json!({"kind": "func_ref", "value": {"func_name": 3}})).is_none());
    }

    #[test]
    fn test_data_requires_type_key() {
        assert!(decode(json!({"kind": "data", "value": {}})).is_none());
        let record = decode(json!({"kind": "data", "value": {"type": null}})).unwrap();
        assert!(matches!(record, MemberRecord::Data(DataRecord { ty: None, .. })));
        let record = decode(json!({"kind": "data", "value": {"type": ["os", "stat_result"]}})).unwrap();
        let MemberRecord::Data(data) = record else {
            panic!("expected data");
        };
        assert_eq!(data.ty, Some(TypeName::new("os", "stat_result")));
    }

    #[test]
    fn test_typeref_requires_type_name_key() {
        assert!(decode(json!({"kind": "typeref", "value": {}})).is_none());
        let record = decode(json!({"kind": "typeref", "value": {"type_name": ["builtins", "int"]}}));
        assert!(matches!(record, Some(MemberRecord::TypeRef(Some(_)))));
    }

    #[test]
    fn test_moduleref_without_name_is_an_error() {
        let err = MemberRecord::decode(&json!({"kind": "moduleref", "value": {}})).unwrap_err();
        assert_eq!(err, RecordError::MalformedModuleRef { found: "nothing".into() });

        let err = MemberRecord::decode(&json!({"kind": "moduleref", "value": {"module_name": 7}}))
            .unwrap_err();
        assert_eq!(err, RecordError::MalformedModuleRef { found: "a number".into() });

        let ok = decode(json!({"kind": "moduleref", "value": {"module_name": "os.path"}}));
        assert!(matches!(ok, Some(MemberRecord::ModuleRef(name)) if name == "os.path"));
    }

    #[test]
    fn test_multiple_keeps_slot_positions() {
        let record = decode(json!({
            "kind": "multiple",
            "value": {"members": [
                {"kind": "function", "value": {}},
                {"kind": "bogus", "value": {}},
                {"kind": "data", "value": {"type": null}}
            ]}
        }))
        .unwrap();
        let MemberRecord::Multiple(members) = record else {
            panic!("expected multiple");
        };
        assert_eq!(members.len(), 3);
        assert!(members[0].is_some());
        assert!(members[1].is_none());
        assert_eq!(members[2].as_ref().map(MemberRecord::kind), Some("data"));
    }

    #[test]
    fn test_moduleref_error_inside_multiple_propagates() {
        let result = MemberRecord::decode(&json!({
            "kind": "multiple",
            "value": {"members": [{"kind": "moduleref", "value": {"module_name": null}}]}
        }));
        assert!(matches!(result, Err(RecordError::MalformedModuleRef { .. })));
    }

    #[test]
    fn test_type_ref_list_shapes() {
        let one: TypeRefList = serde_json::from_value(json!(["builtins", "int"])).unwrap();
        assert_eq!(one.into_vec(), vec![Some(TypeName::new("builtins", "int"))]);

        let many: TypeRefList =
            serde_json::from_value(json!([["builtins", "int"], null])).unwrap();
        assert_eq!(
            many.into_vec(),
            vec![Some(TypeName::new("builtins", "int")), None]
        );

        let root: TypeRefList = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(root.into_vec(), vec![None]);
    }

    #[test]
    fn test_version_is_exposed() {
        let record = decode(json!({"kind": "type", "value": {"version": ">=3.0"}})).unwrap();
        assert_eq!(record.version(), Some(">=3.0"));
        let record = decode(json!({"kind": "func_ref", "value": {"func_name": "os.getcwd"}})).unwrap();
        assert_eq!(record.version(), None);
    }

    #[test]
    fn test_module_record_root() {
        let module = ModuleRecord::from_value(&json!({"doc": "OS routines", "members": {}})).unwrap();
        assert_eq!(module.doc.as_deref(), Some("OS routines"));
        assert!(ModuleRecord::from_value(&json!({})).unwrap().members.is_empty());
        assert!(ModuleRecord::from_value(&json!([])).is_err());
        assert!(ModuleRecord::from_value(&json!({"members": 3})).is_err());
    }
}
