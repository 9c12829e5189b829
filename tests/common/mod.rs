#![allow(dead_code)]
//! Shared test utilities for the CLI integration tests.
//!
//! Fixtures are small interface databases written as `.idb` JSON files into a
//! temporary directory.

use assert_cmd::Command;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

/// Environment variables that would otherwise leak into the command under test.
const ENV_VARS: [&str; 3] = ["PYIDB_DB_DIR", "PYIDB_TARGET_VERSION", "PYIDB_PYTHON2"];

/// `pyidb` with a clean environment.
pub fn pyidb() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("pyidb").unwrap();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd
}

pub fn module(members: Value) -> Value {
    json!({ "members": members })
}

pub fn type_record(value: Value) -> Value {
    json!({ "kind": "type", "value": value })
}

pub fn function(value: Value) -> Value {
    json!({ "kind": "function", "value": value })
}

pub fn data(ty: Value) -> Value {
    json!({ "kind": "data", "value": { "type": ty } })
}

pub fn typeref(module: &str, name: &str) -> Value {
    json!({ "kind": "typeref", "value": { "type_name": [module, name] } })
}

pub fn write_module(root: &Path, name: &str, record: &Value) {
    std::fs::write(
        root.join(format!("{}.idb", name)),
        serde_json::to_vec_pretty(record).unwrap(),
    )
    .unwrap();
}

/// A 3.x builtin module with a few types and `len`.
pub fn builtins() -> Value {
    module(json!({
        "object": type_record(json!({ "doc": "The most base type" })),
        "int": type_record(json!({
            "bases": [["builtins", "object"]],
            "mro": [["builtins", "int"], ["builtins", "object"]]
        })),
        "str": type_record(json!({ "bases": [["builtins", "object"]] })),
        "bytes": type_record(json!({})),
        "len": function(json!({
            "doc": "Return the number of items in a container.",
            "overloads": [{
                "args": [{ "name": "obj", "type": ["builtins", "object"] }],
                "ret_type": ["builtins", "int"]
            }]
        }))
    }))
}

/// Base database: builtins, `os`, `_pickle`, a module gated to 3.x, and a broken file.
pub fn base_db() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_module(root, "builtins", &builtins());
    write_module(
        root,
        "os",
        &module(json!({
            "sep": data(json!(["builtins", "str"])),
            "PathLike": type_record(json!({
                "doc": "Abstract base class for path objects",
                "bases": [["builtins", "object"]]
            })),
            "getcwd": function(json!({
                "overloads": [{ "ret_type": ["builtins", "str"] }]
            })),
            "either": {
                "kind": "multiple",
                "value": { "members": [
                    function(json!({})),
                    data(json!(["builtins", "int"]))
                ]}
            },
            "scandir": function(json!({ "version": ">=3.5" })),
            "Missing": typeref("nowhere", "Nothing")
        })),
    );
    write_module(
        root,
        "_pickle",
        &module(json!({ "dumps": function(json!({})) })),
    );
    std::fs::write(root.join("broken.idb"), b"{ not json").unwrap();
    temp_dir
}

/// Overlay database: replaces `os` and adds `site_pkg`.
pub fn overlay_db() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_module(
        root,
        "os",
        &module(json!({ "overlaid": data(json!(["builtins", "int"])) })),
    );
    write_module(
        root,
        "site_pkg",
        &module(json!({ "Thing": type_record(json!({ "bases": [["builtins", "int"]] })) })),
    );
    temp_dir
}
