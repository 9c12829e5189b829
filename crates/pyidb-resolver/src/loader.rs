//! Two-phase database construction.
//!
//! Phase one decodes every module record, registers a module per decodable
//! file and creates an empty type for every top-level `type` record, so that
//! any type reference has something to point at. Phase two builds all
//! members, then drains the fixup worklist once.

use pyidb_store::ModuleRecordStore;
use pyidb_types::{BuiltinTypeId, MemberRecord, ModuleRecord};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::aliases::ModuleAliases;
use crate::constants::ConstantCache;
use crate::database::TypeDatabase;
use crate::error::LoadError;
use crate::fixups::FixupQueue;
use crate::graph::{Container, ModuleHandle, MultipleHandle, TypeData, TypeHandle};
use crate::members::{Constant, Member};
use crate::metrics::LoadMetrics;
use crate::namespace::{Namespace, ResolvedType};
use crate::options::DatabaseOptions;

/// Where a built member is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot {
    /// A named member of a module or type.
    Member { container: Container, name: String },
    /// One alternative of a multi-member.
    Alternative { multiple: MultipleHandle, index: usize },
}

impl Slot {
    pub fn member(container: Container, name: &str) -> Self {
        Slot::Member {
            container,
            name: name.to_string(),
        }
    }
}

/// A module whose shell is registered and whose members are still to be built.
struct PendingModule {
    handle: ModuleHandle,
    name: String,
    members: Vec<(String, MemberRecord)>,
}

pub(crate) struct Loader {
    pub(crate) ns: Namespace,
    pub(crate) options: DatabaseOptions,
    pub(crate) builtin: ModuleHandle,
    pub(crate) object_type: TypeHandle,
    pub(crate) constants: ConstantCache,
    pub(crate) metrics: LoadMetrics,
    pub(crate) fixups: FixupQueue,
    /// Top-level types created in phase one, claimed by the builder in phase two.
    pub(crate) shells: HashMap<(ModuleHandle, String), TypeHandle>,
    failures: BTreeMap<String, String>,
}

impl Loader {
    pub(crate) fn new(options: DatabaseOptions, shared: Option<Arc<TypeDatabase>>) -> Self {
        let mut ns = Namespace::new(shared, ModuleAliases::for_options(&options));
        let (builtin, object_type) = match ns.shared.as_ref() {
            Some(shared) => (shared.builtin_handle(), shared.object_type()),
            None => {
                let builtin = ns.register_module(options.builtin_module_name(), None);
                let object_type = ns.arena.add_type(TypeData::shell(
                    "object",
                    Container::Module(builtin),
                    BuiltinTypeId::Object,
                ));
                (builtin, object_type)
            }
        };
        Self {
            ns,
            options,
            builtin,
            object_type,
            constants: ConstantCache::new(),
            metrics: LoadMetrics::default(),
            fixups: FixupQueue::default(),
            shells: HashMap::new(),
            failures: BTreeMap::new(),
        }
    }

    /// Load every module from `store` and resolve all references.
    pub(crate) fn run(mut self, store: &dyn ModuleRecordStore) -> Result<TypeDatabase, LoadError> {
        let mut pending = Vec::new();

        if !self.ns.is_overlay() {
            pending.push(self.register_builtin(store)?);
        }

        for name in store.module_names(self.options.python3)? {
            if self.ns.modules.contains_key(&name) {
                continue;
            }
            let record = store
                .load(&name)
                .map_err(|e| e.to_string())
                .and_then(|root| ModuleRecord::from_value(&root).map_err(|e| e.to_string()));
            match record {
                Ok(record) => {
                    let handle = self.ns.register_module(&name, record.doc.clone());
                    self.metrics.record_module_registered();
                    let members = self.decode_members(&name, &record.members)?;
                    self.register_shells(handle, &members);
                    pending.push(PendingModule {
                        handle,
                        name,
                        members,
                    });
                }
                Err(error) => {
                    warn!(module = %name, %error, "skipping module that failed to decode");
                    self.metrics.record_decode_failure();
                    self.failures.insert(name, error);
                }
            }
        }

        for module in pending {
            let container = Container::Module(module.handle);
            for (name, record) in module.members {
                let slot = Slot::member(container, &name);
                self.build_member(&name, record, container, slot, &module.name)?;
            }
        }

        self.drain_fixups();
        Ok(self.finish())
    }

    fn register_builtin(&mut self, store: &dyn ModuleRecordStore) -> Result<PendingModule, LoadError> {
        let name = self.options.builtin_module_name();
        let root = store
            .builtin(self.options.python3)
            .map_err(|e| LoadError::InvalidBuiltinModule {
                module: name.to_string(),
                reason: format!("{:#}", e),
            })?
            .ok_or_else(|| LoadError::MissingBuiltinModule {
                module: name.to_string(),
                location: store.describe(),
            })?;
        let record = ModuleRecord::from_value(&root).map_err(|e| LoadError::InvalidBuiltinModule {
            module: name.to_string(),
            reason: e.to_string(),
        })?;

        if let Some(module) = self.ns.arena.module_mut(self.builtin) {
            module.doc = record.doc.clone();
        }
        self.metrics.record_module_registered();

        let members = self.decode_members(name, &record.members)?;
        self.register_shells(self.builtin, &members);

        let has_object = self
            .ns
            .module_member(self.builtin, "object")
            .is_some();
        if !has_object {
            warn!(module = name, "builtin module declares no object type, synthesizing one");
            self.assign(
                &Slot::member(Container::Module(self.builtin), "object"),
                Member::Type(self.object_type),
            );
        }

        Ok(PendingModule {
            handle: self.builtin,
            name: name.to_string(),
            members,
        })
    }

    /// Decode a member mapping, skipping malformed records.
    ///
    /// `context` is the dotted path of the container, used in diagnostics.
    pub(crate) fn decode_members(
        &self,
        context: &str,
        members: &Map<String, Value>,
    ) -> Result<Vec<(String, MemberRecord)>, LoadError> {
        let mut decoded = Vec::with_capacity(members.len());
        for (name, raw) in members {
            match MemberRecord::decode(raw) {
                Ok(Some(record)) => decoded.push((name.clone(), record)),
                Ok(None) => {
                    debug!(member = %format!("{}.{}", context, name), "skipping malformed member record");
                    self.metrics.record_malformed();
                }
                Err(e) => {
                    return Err(LoadError::MalformedModuleRef {
                        member: format!("{}.{}", context, name),
                        reason: e.to_string(),
                    })
                }
            }
        }
        Ok(decoded)
    }

    /// Create an empty type for every applicable top-level `type` record.
    fn register_shells(&mut self, module: ModuleHandle, members: &[(String, MemberRecord)]) {
        let container = Container::Module(module);
        for (name, record) in members {
            let MemberRecord::Type(ty) = record else {
                continue;
            };
            if !self.options.applies(ty.version.as_deref()) {
                continue;
            }
            let handle = if module == self.builtin && name == "object" {
                self.object_type
            } else {
                self.new_type_shell(name, container)
            };
            self.shells.insert((module, name.clone()), handle);
            self.assign(&Slot::member(container, name), Member::Type(handle));
        }
    }

    pub(crate) fn new_type_shell(&mut self, name: &str, container: Container) -> TypeHandle {
        let builtin_id = if container == Container::Module(self.builtin) && !self.ns.is_overlay() {
            BuiltinTypeId::from_name(name, self.options.python3)
        } else {
            BuiltinTypeId::Unknown
        };
        self.ns.arena.add_type(TypeData::shell(name, container, builtin_id))
    }

    /// Store `member` into `slot`.
    pub(crate) fn assign(&mut self, slot: &Slot, member: Member) {
        let stored = match slot {
            Slot::Member {
                container: Container::Module(h),
                name,
            } => self
                .ns
                .arena
                .module_mut(*h)
                .map(|m| m.members.insert(name.clone(), member))
                .is_some(),
            Slot::Member {
                container: Container::Type(h),
                name,
            } => self
                .ns
                .arena
                .ty_mut(*h)
                .map(|t| t.members.insert(name.clone(), member))
                .is_some(),
            Slot::Alternative { multiple, index } => {
                match self.ns.arena.multiple_mut(*multiple).and_then(|s| s.get_mut(*index)) {
                    Some(entry) => {
                        *entry = Some(member);
                        true
                    }
                    None => false,
                }
            }
        };
        if stored {
            self.metrics.record_member_assigned();
        } else {
            debug!(?slot, "member slot outside this database, dropping member");
        }
    }

    /// The universal root type, as a resolution result.
    pub(crate) fn root_type(&self) -> ResolvedType {
        ResolvedType {
            handle: self.object_type,
            instance_owned: self.ns.instance_owned(self.object_type.database()),
        }
    }

    /// The shared constant for values of type `ty`.
    ///
    /// Types owned by a shared database use that database's cache.
    pub(crate) fn constant_for(&self, ty: TypeHandle) -> Arc<Constant> {
        if ty.database() != self.ns.id() {
            if let Some(shared) = self.ns.shared.as_ref() {
                return shared.constant(ty);
            }
        }
        let (constant, hit) = self.constants.get_or_insert(ty);
        self.metrics.record_constant_lookup(hit);
        constant
    }

    fn finish(self) -> TypeDatabase {
        let snapshot = self.metrics.snapshot();
        info!(
            db = %self.ns.id(),
            modules = self.ns.modules.len(),
            types = self.ns.arena.type_count(),
            failed = self.failures.len(),
            fallbacks = snapshot.type_fallbacks,
            dropped = snapshot.dropped_references,
            "type database loaded"
        );
        TypeDatabase::from_parts(
            self.ns,
            self.options,
            self.builtin,
            self.object_type,
            self.constants,
            self.failures,
            self.metrics,
        )
    }
}
