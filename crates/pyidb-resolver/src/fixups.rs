//! Deferred resolution worklist.
//!
//! A reference that cannot be resolved while members are being built becomes
//! a [`Fixup`]. After every module has been built, the queue is drained: each
//! fixup is retried in FIFO order and either resolves or goes back to the end
//! of the queue. Fixups may enqueue further fixups, which are drained in the
//! same pass.
//!
//! Once a full rotation of the queue makes no progress, the remaining fixups
//! run in final mode: type references fall back to the root type and member
//! references are dropped. This lets chains of forward references resolve in
//! one drain regardless of queue order while guaranteeing termination.

use pyidb_types::TypeName;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, trace};

use crate::graph::TypeHandle;
use crate::loader::{Loader, Slot};
use crate::namespace::ResolvedType;

/// Work to run once a type reference resolves.
pub(crate) type Continuation = Box<dyn FnOnce(&mut Loader, ResolvedType)>;

pub(crate) enum Fixup {
    /// Resolve `name`, then run the continuation with the result.
    ResolveType { name: TypeName, then: Continuation },
    /// Assign `module.member` into `slot`.
    ModuleMember {
        module: String,
        member: String,
        slot: Slot,
    },
    /// Assign `member` of an already resolved type into `slot`.
    TypeMember {
        ty: TypeHandle,
        member: String,
        slot: Slot,
    },
}

impl fmt::Debug for Fixup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fixup::ResolveType { name, .. } => f
                .debug_struct("ResolveType")
                .field("name", name)
                .finish_non_exhaustive(),
            Fixup::ModuleMember {
                module,
                member,
                slot,
            } => f
                .debug_struct("ModuleMember")
                .field("module", module)
                .field("member", member)
                .field("slot", slot)
                .finish(),
            Fixup::TypeMember { ty, member, slot } => f
                .debug_struct("TypeMember")
                .field("ty", ty)
                .field("member", member)
                .field("slot", slot)
                .finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FixupMode {
    /// Put the fixup back if its target is not there yet.
    Retry,
    /// Fall back or drop; nothing else will make progress.
    Final,
}

pub(crate) enum FixupStatus {
    Resolved,
    Deferred(Fixup),
}

#[derive(Debug, Default)]
pub(crate) struct FixupQueue {
    queue: VecDeque<Fixup>,
}

impl FixupQueue {
    pub fn push(&mut self, fixup: Fixup) {
        self.queue.push_back(fixup);
    }

    pub fn pop(&mut self) -> Option<Fixup> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Loader {
    pub(crate) fn add_fixup(&mut self, fixup: Fixup) {
        trace!(?fixup, "fixup queued");
        self.metrics.record_fixup_queued();
        self.fixups.push(fixup);
    }

    /// Run fixups until the queue is empty.
    pub(crate) fn drain_fixups(&mut self) {
        // Consecutive deferrals; reset whenever a fixup resolves.
        let mut stalled = 0usize;
        while let Some(fixup) = self.fixups.pop() {
            let mode = if stalled > self.fixups.len() {
                FixupMode::Final
            } else {
                FixupMode::Retry
            };
            match self.run_fixup(fixup, mode) {
                FixupStatus::Resolved => stalled = 0,
                FixupStatus::Deferred(fixup) => {
                    stalled += 1;
                    self.metrics.record_fixup_deferred();
                    self.fixups.push(fixup);
                }
            }
        }
    }

    fn run_fixup(&mut self, fixup: Fixup, mode: FixupMode) -> FixupStatus {
        match fixup {
            Fixup::ResolveType { name, then } => {
                if let Some(resolved) = self.ns.try_resolve(&name) {
                    then(self, resolved);
                    return FixupStatus::Resolved;
                }
                // Module tables are complete after registration, so a missing
                // module can never appear later.
                if mode == FixupMode::Retry && self.ns.lookup_module(&name.module).is_some() {
                    return FixupStatus::Deferred(Fixup::ResolveType { name, then });
                }
                debug!(type_name = %name, "unresolved type reference, using the root type");
                self.metrics.record_type_fallback();
                let root = self.root_type();
                then(self, root);
                FixupStatus::Resolved
            }
            Fixup::ModuleMember {
                module,
                member,
                slot,
            } => {
                let Some(found) = self.ns.lookup_module(&module) else {
                    self.drop_reference(&module, &member);
                    return FixupStatus::Resolved;
                };
                match self.ns.module_member(found.handle, &member).cloned() {
                    Some(resolved) => {
                        self.assign(&slot, resolved);
                        FixupStatus::Resolved
                    }
                    None if mode == FixupMode::Retry => FixupStatus::Deferred(Fixup::ModuleMember {
                        module,
                        member,
                        slot,
                    }),
                    None => {
                        self.drop_reference(&module, &member);
                        FixupStatus::Resolved
                    }
                }
            }
            Fixup::TypeMember { ty, member, slot } => {
                match self.ns.type_member(ty, &member).cloned() {
                    Some(resolved) => {
                        self.assign(&slot, resolved);
                        FixupStatus::Resolved
                    }
                    None if mode == FixupMode::Retry => {
                        FixupStatus::Deferred(Fixup::TypeMember { ty, member, slot })
                    }
                    None => {
                        let owner = self
                            .ns
                            .ty(ty)
                            .map(|data| data.name.clone())
                            .unwrap_or_default();
                        self.drop_reference(&owner, &member);
                        FixupStatus::Resolved
                    }
                }
            }
        }
    }

    fn drop_reference(&self, owner: &str, member: &str) {
        debug!(owner, member, "unresolved member reference dropped");
        self.metrics.record_dropped_reference();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Container;
    use crate::members::Member;
    use crate::options::DatabaseOptions;
    use std::cell::Cell;
    use std::rc::Rc;

    fn loader() -> Loader {
        Loader::new(DatabaseOptions::unpinned(true), None)
    }

    #[test]
    fn test_chain_resolves_in_reverse_queue_order() {
        let mut loader = loader();
        let m = loader.ns.register_module("m", None);
        let target = loader.new_type_shell("Target", Container::Module(m));

        // a -> b -> Target, queued so that `a` is retried before `b` can succeed.
        loader.add_fixup(Fixup::ModuleMember {
            module: "m".into(),
            member: "b".into(),
            slot: Slot::member(Container::Module(m), "a"),
        });
        loader.add_fixup(Fixup::ModuleMember {
            module: "m".into(),
            member: "Target".into(),
            slot: Slot::member(Container::Module(m), "b"),
        });
        loader.assign(
            &Slot::member(Container::Module(m), "Target"),
            Member::Type(target),
        );
        loader.drain_fixups();

        assert!(loader.fixups.is_empty());
        let a = loader.ns.module_member(m, "a").and_then(Member::as_type);
        assert_eq!(a, Some(target));
    }

    #[test]
    fn test_cycle_terminates_and_drops() {
        let mut loader = loader();
        let m = loader.ns.register_module("m", None);
        loader.add_fixup(Fixup::ModuleMember {
            module: "m".into(),
            member: "y".into(),
            slot: Slot::member(Container::Module(m), "x"),
        });
        loader.add_fixup(Fixup::ModuleMember {
            module: "m".into(),
            member: "x".into(),
            slot: Slot::member(Container::Module(m), "y"),
        });
        loader.drain_fixups();

        assert!(loader.fixups.is_empty());
        assert!(loader.ns.module_member(m, "x").is_none());
        assert_eq!(loader.metrics.snapshot().dropped_references, 2);
    }

    #[test]
    fn test_missing_module_falls_back_immediately() {
        let mut loader = loader();
        let seen = Rc::new(Cell::new(None));
        let sink = Rc::clone(&seen);
        loader.add_fixup(Fixup::ResolveType {
            name: TypeName::new("nowhere", "Thing"),
            then: Box::new(move |_, resolved| sink.set(Some(resolved.handle))),
        });
        loader.drain_fixups();

        assert_eq!(seen.get(), Some(loader.object_type));
        let metrics = loader.metrics.snapshot();
        assert_eq!(metrics.type_fallbacks, 1);
        assert_eq!(metrics.fixups_deferred, 0);
    }

    #[test]
    fn test_fixups_added_while_draining_are_drained() {
        let mut loader = loader();
        let m = loader.ns.register_module("m", None);
        let late = loader.new_type_shell("Late", Container::Module(m));
        let seen = Rc::new(Cell::new(None));
        let sink = Rc::clone(&seen);

        loader.add_fixup(Fixup::ResolveType {
            name: TypeName::new("m", "Missing"),
            then: Box::new(move |loader, _| {
                loader.assign(&Slot::member(Container::Module(m), "Late"), Member::Type(late));
                loader.add_fixup(Fixup::ResolveType {
                    name: TypeName::new("m", "Late"),
                    then: Box::new(move |_, resolved| sink.set(Some(resolved.handle))),
                });
            }),
        });
        loader.drain_fixups();

        assert!(loader.fixups.is_empty());
        assert_eq!(seen.get(), Some(late));
    }
}
