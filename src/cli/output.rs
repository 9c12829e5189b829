//! Output formatting for the pyidb CLI
//!
//! Builds serializable summaries of modules and members, and renders them
//! either as text or as JSON.

use pyidb_resolver::{
    Container, Function, Member, MemberKind, ParameterKind, TypeDatabase, TypeHandle,
};
use serde::Serialize;

/// Qualified `module.Type` (or `module.Outer.Inner`) name of a type.
pub fn type_name(db: &TypeDatabase, handle: TypeHandle) -> String {
    let Some(view) = db.type_view(handle) else {
        return "<unknown>".to_string();
    };
    let owner = match view.container() {
        Container::Module(module) => db
            .module_view(module)
            .map(|m| m.name().to_string())
            .unwrap_or_default(),
        Container::Type(outer) => type_name(db, outer),
    };
    format!("{}.{}", owner, view.name())
}

#[derive(Debug, Serialize)]
pub struct ParameterInfo {
    pub name: String,
    pub kind: ParameterKind,
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OverloadInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    pub parameters: Vec<ParameterInfo>,
    pub return_types: Vec<String>,
}

/// Everything the CLI reports about one member.
#[derive(Debug, Serialize)]
pub struct MemberInfo {
    pub name: String,
    pub kind: MemberKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Constant or property type, type name, or module name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overloads: Vec<OverloadInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mro: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<MemberInfo>,
}

impl MemberInfo {
    pub fn describe(db: &TypeDatabase, name: &str, member: &Member) -> Self {
        let mut info = MemberInfo {
            name: name.to_string(),
            kind: member.kind(),
            doc: None,
            target: None,
            overloads: Vec::new(),
            bases: Vec::new(),
            mro: Vec::new(),
            members: Vec::new(),
            alternatives: Vec::new(),
        };
        match member {
            Member::Function(f) | Member::Method(f) => {
                info.doc = f.doc().map(str::to_string);
                info.overloads = describe_overloads(db, f);
            }
            Member::Property(p) => {
                info.doc = p.doc().map(str::to_string);
                info.target = p.ty().map(|ty| type_name(db, ty));
            }
            Member::Constant(c) => info.target = Some(type_name(db, c.ty())),
            Member::Type(handle) => {
                info.target = Some(type_name(db, *handle));
                if let Some(view) = db.type_view(*handle) {
                    info.doc = view.doc().map(str::to_string);
                    info.bases = view.bases().iter().map(|t| type_name(db, t.handle())).collect();
                    info.mro = view.mro().iter().map(|t| type_name(db, t.handle())).collect();
                    info.members = view.members().map(|(n, _)| n.to_string()).collect();
                }
            }
            Member::Module(handle) => {
                if let Some(view) = db.module_view(*handle) {
                    info.target = Some(view.name().to_string());
                    info.doc = view.doc().map(str::to_string);
                }
            }
            Member::Multiple(handle) => {
                info.alternatives = db
                    .multiple_members(*handle)
                    .into_iter()
                    .map(|alt| MemberInfo::describe(db, name, alt))
                    .collect();
            }
        }
        info
    }
}

fn describe_overloads(db: &TypeDatabase, function: &Function) -> Vec<OverloadInfo> {
    function
        .overloads(db)
        .iter()
        .map(|overload| OverloadInfo {
            doc: overload.doc.clone(),
            parameters: overload
                .parameters
                .iter()
                .map(|p| ParameterInfo {
                    name: p.name.clone(),
                    kind: p.kind,
                    types: p.types.iter().map(|t| type_name(db, *t)).collect(),
                    default_value: p.default_value.clone(),
                })
                .collect(),
            return_types: overload
                .return_types
                .iter()
                .map(|t| type_name(db, *t))
                .collect(),
        })
        .collect()
}

/// One-line signature, e.g. `len(obj: builtins.object, *args) -> builtins.int`.
pub fn format_signature(name: &str, overload: &OverloadInfo) -> String {
    let params: Vec<String> = overload
        .parameters
        .iter()
        .map(|p| {
            let prefix = match p.kind {
                ParameterKind::Normal => "",
                ParameterKind::List => "*",
                ParameterKind::Dict => "**",
            };
            let mut out = format!("{}{}", prefix, p.name);
            if !p.types.is_empty() {
                out.push_str(&format!(": {}", p.types.join(" | ")));
            }
            if let Some(default) = &p.default_value {
                out.push_str(&format!(" = {}", default));
            }
            out
        })
        .collect();
    let mut signature = format!("{}({})", name, params.join(", "));
    if !overload.return_types.is_empty() {
        signature.push_str(&format!(" -> {}", overload.return_types.join(" | ")));
    }
    signature
}

/// Format a member for display
pub fn format_member(info: &MemberInfo) -> String {
    let mut out = String::new();
    out.push_str(&format!("\x1b[1m{}\x1b[0m ({})\n", info.name, info.kind));
    append_member_details(&mut out, info, "  ");
    out
}

fn append_member_details(out: &mut String, info: &MemberInfo, indent: &str) {
    if let Some(target) = &info.target {
        let label = match info.kind {
            MemberKind::Module => "Module",
            _ => "Type",
        };
        out.push_str(&format!("{}{}: {}\n", indent, label, target));
    }
    if let Some(doc) = &info.doc {
        out.push_str(&format!("{}Doc: {}\n", indent, doc));
    }
    for overload in &info.overloads {
        out.push_str(&format!("{}{}\n", indent, format_signature(&info.name, overload)));
    }
    if !info.bases.is_empty() {
        out.push_str(&format!("{}Bases: {}\n", indent, info.bases.join(", ")));
    }
    if !info.mro.is_empty() {
        out.push_str(&format!("{}MRO: {}\n", indent, info.mro.join(" -> ")));
    }
    if !info.members.is_empty() {
        out.push_str(&format!("{}Members: {}\n", indent, info.members.join(", ")));
    }
    for (i, alt) in info.alternatives.iter().enumerate() {
        out.push_str(&format!("{}[{}] {}\n", indent, i, alt.kind));
        append_member_details(out, alt, &format!("{}    ", indent));
    }
}
