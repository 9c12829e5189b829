//! View commands - inspect modules, members, builtin names and load statistics

use anyhow::{anyhow, Result};
use clap::Subcommand;
use pyidb_resolver::{MemberKind, TypeDatabase};
use pyidb_types::BuiltinTypeId;
use serde::Serialize;

use super::output::{format_member, type_name, MemberInfo};

#[derive(Subcommand, Debug)]
pub enum ViewTarget {
    /// List every module visible from the database
    Modules,
    /// List a module's members
    Module {
        /// Module name, e.g. "os" or an alias such as "cPickle"
        name: String,
    },
    /// Show one member of a module in detail
    Member {
        /// Module name
        module: String,
        /// Member name
        name: String,
    },
    /// Show the name a builtin type identifier has under the loaded object model
    BuiltinName {
        /// Identifier, e.g. "Str", "Bytes" or "DictKeys"
        id: BuiltinTypeId,
    },
    /// Load statistics and modules that failed to decode
    Stats,
}

impl ViewTarget {
    pub fn execute(&self, db: &TypeDatabase, json_output: bool) -> Result<()> {
        match self {
            ViewTarget::Modules => view_modules(db, json_output),
            ViewTarget::Module { name } => view_module(db, name, json_output),
            ViewTarget::Member { module, name } => view_member(db, module, name, json_output),
            ViewTarget::BuiltinName { id } => view_builtin_name(db, *id, json_output),
            ViewTarget::Stats => view_stats(db, json_output),
        }
    }
}

fn view_modules(db: &TypeDatabase, json_output: bool) -> Result<()> {
    #[derive(Serialize)]
    struct ModuleEntry<'a> {
        name: &'a str,
        overlay: bool,
        members: usize,
    }

    let entries: Vec<ModuleEntry> = db
        .module_names()
        .into_iter()
        .filter_map(|name| {
            let found = db.lookup_module(name)?;
            let view = db.module_view(found.handle)?;
            Some(ModuleEntry {
                name,
                overlay: found.instance_owned,
                members: view.len(),
            })
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("\x1b[1mModules ({}):\x1b[0m", entries.len());
        for entry in &entries {
            let side = if entry.overlay { "overlay" } else { "base" };
            println!("  {} [{}] {} members", entry.name, side, entry.members);
        }
    }
    Ok(())
}

fn view_module(db: &TypeDatabase, name: &str, json_output: bool) -> Result<()> {
    #[derive(Serialize)]
    struct ModuleInfo<'a> {
        name: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        doc: Option<&'a str>,
        members: Vec<MemberEntry<'a>>,
    }

    #[derive(Serialize)]
    struct MemberEntry<'a> {
        name: &'a str,
        kind: MemberKind,
    }

    let module = db
        .get_module(name)
        .ok_or_else(|| anyhow!("Module {} not found", name))?;

    let info = ModuleInfo {
        name: module.name(),
        doc: module.doc(),
        members: module
            .members()
            .map(|(name, member)| MemberEntry {
                name,
                kind: member.kind(),
            })
            .collect(),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("\x1b[1mModule:\x1b[0m {}", info.name);
        if info.name != name {
            println!("\x1b[1mRequested as:\x1b[0m {}", name);
        }
        if let Some(doc) = info.doc {
            println!("\x1b[1mDoc:\x1b[0m {}", doc);
        }
        println!("\x1b[1mMembers ({}):\x1b[0m", info.members.len());
        for entry in &info.members {
            println!("  {} ({})", entry.name, entry.kind);
        }
    }
    Ok(())
}

fn view_member(db: &TypeDatabase, module: &str, name: &str, json_output: bool) -> Result<()> {
    if db.get_module(module).is_none() {
        return Err(anyhow!("Module {} not found", module));
    }
    let member = db
        .get_member(module, name)
        .ok_or_else(|| anyhow!("Member {} not found in module {}", name, module))?;

    let info = MemberInfo::describe(db, name, member);
    if json_output {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print!("{}", format_member(&info));
    }
    Ok(())
}

fn view_builtin_name(db: &TypeDatabase, id: BuiltinTypeId, json_output: bool) -> Result<()> {
    #[derive(Serialize)]
    struct BuiltinInfo {
        id: BuiltinTypeId,
        python3: bool,
        name: Option<&'static str>,
        /// Qualified name when the builtin module declares the type.
        declared: Option<String>,
    }

    let info = BuiltinInfo {
        id,
        python3: db.is_python3(),
        name: db.builtin_type_name(id),
        declared: db.builtin_type(id).map(|ty| type_name(db, ty.handle())),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        let model = if info.python3 { "3.x" } else { "2.x" };
        match info.name {
            Some(name) => println!("{} -> {} ({} object model)", id, name, model),
            None => println!("{} has no builtin name ({} object model)", id, model),
        }
        match &info.declared {
            Some(declared) => println!("  declared as {}", declared),
            None => println!("  not declared in {}", db.builtin_module().name()),
        }
    }
    Ok(())
}

fn view_stats(db: &TypeDatabase, json_output: bool) -> Result<()> {
    let metrics = db.metrics();
    let failures = db.failed_modules();

    if json_output {
        #[derive(Serialize)]
        struct Stats<'a> {
            modules: usize,
            overlay: bool,
            metrics: &'a pyidb_resolver::MetricsSnapshot,
            failed_modules: &'a std::collections::BTreeMap<String, String>,
        }

        let stats = Stats {
            modules: db.module_names().len(),
            overlay: db.is_overlay(),
            metrics: &metrics,
            failed_modules: failures,
        };
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", metrics.format_report());
        if !failures.is_empty() {
            println!("\x1b[1mFailed modules ({}):\x1b[0m", failures.len());
            for (module, reason) in failures {
                println!("  {}: {}", module, reason);
            }
        }
    }
    Ok(())
}
