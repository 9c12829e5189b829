//! Member construction.
//!
//! Turns one decoded member record into a member stored in its slot, or
//! queues the fixups needed to store it later.

use pyidb_types::{MemberRecord, TypeName, TypeRecord};
use std::sync::Arc;
use tracing::debug;

use crate::error::LoadError;
use crate::fixups::{Continuation, Fixup};
use crate::graph::{Container, TypeHandle};
use crate::loader::{Loader, Slot};
use crate::members::{Function, Member, Property};

impl Loader {
    /// Build `record` as member `name` of `container` and store it into `slot`.
    ///
    /// `context` is the dotted path of `container`. Records excluded by the
    /// version gate are skipped before anything is resolved or cached.
    pub(crate) fn build_member(
        &mut self,
        name: &str,
        record: MemberRecord,
        container: Container,
        slot: Slot,
        context: &str,
    ) -> Result<(), LoadError> {
        if !self.options.applies(record.version()) {
            debug!(member = %format!("{}.{}", context, name), "member excluded by version gate");
            self.metrics.record_version_gated();
            return Ok(());
        }

        match record {
            MemberRecord::Function(record) => {
                let function = Function::new(name, container, record);
                self.assign(&slot, Member::Function(Arc::new(function)));
            }
            MemberRecord::Method(record) => {
                let function = Function::new(name, container, record);
                self.assign(&slot, Member::Method(Arc::new(function)));
            }
            MemberRecord::Property(record) => {
                let property = Arc::new(Property::new(name, container, &record));
                let declared = record
                    .ty
                    .map(|list| list.into_vec())
                    .and_then(|names| names.into_iter().next());
                if let Some(type_name) = declared {
                    let target = Arc::clone(&property);
                    self.resolve_type(
                        type_name,
                        Box::new(move |_, resolved| target.set_type(resolved.handle)),
                    );
                }
                self.assign(&slot, Member::Property(property));
            }
            MemberRecord::Data(record) => {
                self.resolve_type(
                    record.ty,
                    Box::new(move |loader, resolved| {
                        let constant = loader.constant_for(resolved.handle);
                        loader.assign(&slot, Member::Constant(constant));
                    }),
                );
            }
            MemberRecord::Type(record) => {
                let shell = match (&slot, container) {
                    (Slot::Member { .. }, Container::Module(module)) => {
                        self.shells.remove(&(module, name.to_string()))
                    }
                    _ => None,
                };
                let handle = match shell {
                    Some(handle) => handle,
                    None => {
                        let handle = self.new_type_shell(name, container);
                        self.assign(&slot, Member::Type(handle));
                        handle
                    }
                };
                self.fill_type(handle, record, &format!("{}.{}", context, name))?;
            }
            MemberRecord::FuncRef(path) => self.build_func_ref(&path, slot),
            MemberRecord::Multiple(records) => {
                let multiple = self.ns.arena.add_multiple(records.len());
                for (index, record) in records.into_iter().enumerate() {
                    let Some(record) = record else {
                        self.metrics.record_malformed();
                        continue;
                    };
                    let alternative = Slot::Alternative { multiple, index };
                    self.build_member(name, record, container, alternative, context)?;
                }
                self.assign(&slot, Member::Multiple(multiple));
            }
            MemberRecord::TypeRef(type_name) => {
                self.resolve_type(
                    type_name,
                    Box::new(move |loader, resolved| {
                        loader.assign(&slot, Member::Type(resolved.handle))
                    }),
                );
            }
            MemberRecord::ModuleRef(module) => match self.ns.lookup_module(&module) {
                Some(found) => self.assign(&slot, Member::Module(found.handle)),
                None => {
                    debug!(member = %format!("{}.{}", context, name), module = %module, "module reference to unknown module dropped");
                    self.metrics.record_dropped_reference();
                }
            },
        }
        Ok(())
    }

    /// Fill in a type created as a shell: details, base and MRO references, members.
    fn fill_type(&mut self, handle: TypeHandle, record: TypeRecord, path: &str) -> Result<(), LoadError> {
        let TypeRecord {
            doc,
            members,
            bases,
            mro,
            builtin,
            is_hidden,
            ..
        } = record;

        if let Some(data) = self.ns.arena.ty_mut(handle) {
            data.doc = doc;
            data.is_builtin = builtin;
            data.is_hidden = is_hidden;
            data.bases = vec![None; bases.len()];
            data.mro = vec![None; mro.len()];
        }

        for (index, base) in bases.into_iter().enumerate() {
            self.resolve_type(
                base,
                Box::new(move |loader, resolved| {
                    if let Some(data) = loader.ns.arena.ty_mut(handle) {
                        data.bases[index] = Some(resolved.handle);
                    }
                }),
            );
        }
        for (index, entry) in mro.into_iter().enumerate() {
            self.resolve_type(
                entry,
                Box::new(move |loader, resolved| {
                    if let Some(data) = loader.ns.arena.ty_mut(handle) {
                        data.mro[index] = Some(resolved.handle);
                    }
                }),
            );
        }

        let container = Container::Type(handle);
        for (name, member) in self.decode_members(path, &members)? {
            let slot = Slot::member(container, &name);
            self.build_member(&name, member, container, slot, path)?;
        }
        Ok(())
    }

    /// Resolve a type reference now if possible, otherwise queue it.
    ///
    /// A `None` reference is the root type.
    pub(crate) fn resolve_type(&mut self, name: Option<TypeName>, then: Continuation) {
        let Some(name) = name else {
            let root = self.root_type();
            then(self, root);
            return;
        };
        match self.ns.try_resolve(&name) {
            Some(resolved) => then(self, resolved),
            None => self.add_fixup(Fixup::ResolveType { name, then }),
        }
    }

    /// `module.member` or `module.type.member`.
    fn build_func_ref(&mut self, path: &str, slot: Slot) {
        let parts: Vec<&str> = path.split('.').collect();
        match parts.as_slice() {
            [module, member] => {
                let found = self
                    .ns
                    .lookup_module(module)
                    .and_then(|m| self.ns.module_member(m.handle, member))
                    .cloned();
                match found {
                    Some(found) => self.assign(&slot, found),
                    None => self.add_fixup(Fixup::ModuleMember {
                        module: module.to_string(),
                        member: member.to_string(),
                        slot,
                    }),
                }
            }
            [module, ty, member] => {
                let member = member.to_string();
                self.resolve_type(
                    Some(TypeName::new(*module, *ty)),
                    Box::new(move |loader, resolved| {
                        loader.assign_type_member(resolved.handle, member, slot)
                    }),
                );
            }
            _ => {
                debug!(func_name = path, "skipping func_ref with unexpected path shape");
                self.metrics.record_malformed();
            }
        }
    }

    fn assign_type_member(&mut self, ty: TypeHandle, member: String, slot: Slot) {
        match self.ns.type_member(ty, &member).cloned() {
            Some(found) => self.assign(&slot, found),
            None => self.add_fixup(Fixup::TypeMember { ty, member, slot }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DatabaseOptions;
    use pyidb_types::LanguageVersion;
    use serde_json::json;

    fn loader(options: DatabaseOptions) -> Loader {
        Loader::new(options, None)
    }

    fn record(value: serde_json::Value) -> MemberRecord {
        MemberRecord::decode(&value).unwrap().unwrap()
    }

    fn build(loader: &mut Loader, module: crate::graph::ModuleHandle, name: &str, value: serde_json::Value) {
        let container = Container::Module(module);
        loader
            .build_member(name, record(value), container, Slot::member(container, name), "m")
            .unwrap();
    }

    #[test]
    fn test_version_gated_data_is_not_cached() {
        let mut loader = loader(DatabaseOptions::pinned(LanguageVersion::new(3, 6)));
        let m = loader.ns.register_module("m", None);
        build(
            &mut loader,
            m,
            "old",
            json!({"kind": "data", "value": {"type": null, "version": "<=2.7"}}),
        );

        assert!(loader.ns.module_member(m, "old").is_none());
        assert!(loader.constants.is_empty());
        assert!(loader.fixups.is_empty());
        assert_eq!(loader.metrics.snapshot().members_version_gated, 1);
    }

    #[test]
    fn test_root_data_resolves_immediately() {
        let mut loader = loader(DatabaseOptions::unpinned(true));
        let m = loader.ns.register_module("m", None);
        build(&mut loader, m, "x", json!({"kind": "data", "value": {"type": null}}));

        let constant = loader
            .ns
            .module_member(m, "x")
            .and_then(Member::as_constant)
            .cloned()
            .unwrap();
        assert_eq!(constant.ty(), loader.object_type);
    }

    #[test]
    fn test_forward_type_reference_is_queued() {
        let mut loader = loader(DatabaseOptions::unpinned(true));
        let m = loader.ns.register_module("m", None);
        build(
            &mut loader,
            m,
            "alias",
            json!({"kind": "typeref", "value": {"type_name": ["m", "Later"]}}),
        );
        assert_eq!(loader.fixups.len(), 1);
        assert!(loader.ns.module_member(m, "alias").is_none());

        build(&mut loader, m, "Later", json!({"kind": "type", "value": {}}));
        loader.drain_fixups();

        let later = loader.ns.module_member(m, "Later").and_then(Member::as_type);
        let alias = loader.ns.module_member(m, "alias").and_then(Member::as_type);
        assert!(later.is_some());
        assert_eq!(alias, later);
    }

    #[test]
    fn test_malformed_func_ref_is_skipped() {
        let mut loader = loader(DatabaseOptions::unpinned(true));
        let m = loader.ns.register_module("m", None);
        build(
            &mut loader,
            m,
            "f",
            json!({"kind": "func_ref", "value": {"func_name": "a.b.c.d"}}),
        );
        assert!(loader.ns.module_member(m, "f").is_none());
        assert!(loader.fixups.is_empty());
        assert_eq!(loader.metrics.snapshot().malformed_records, 1);
    }

    #[test]
    fn test_multiple_keeps_positions() {
        let mut loader = loader(DatabaseOptions::unpinned(true));
        let m = loader.ns.register_module("m", None);
        build(
            &mut loader,
            m,
            "f",
            json!({"kind": "multiple", "value": {"members": [
                {"kind": "function", "value": {}},
                {"kind": "nonsense", "value": {}},
                {"kind": "data", "value": {"type": null}}
            ]}}),
        );

        let Some(Member::Multiple(h)) = loader.ns.module_member(m, "f").cloned() else {
            panic!("expected multiple");
        };
        let slots = loader.ns.multiple(h).unwrap();
        assert_eq!(slots.len(), 3);
        assert!(matches!(slots[0], Some(Member::Function(_))));
        assert!(slots[1].is_none());
        assert!(matches!(slots[2], Some(Member::Constant(_))));
    }
}
