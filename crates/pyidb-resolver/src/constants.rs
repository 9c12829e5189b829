//! Constant identity cache.
//!
//! A `data` record describes a value of some type. All data members whose
//! type resolves to the same type handle share one [`Constant`], so identity
//! comparison can stand in for type comparison downstream.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::graph::TypeHandle;
use crate::members::Constant;

/// Per-database map from type handle to its shared constant.
#[derive(Debug, Default)]
pub struct ConstantCache {
    entries: Mutex<HashMap<TypeHandle, Arc<Constant>>>,
}

impl ConstantCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the constant for `ty`, creating it on first use.
    ///
    /// The flag is `true` when the constant already existed.
    pub fn get_or_insert(&self, ty: TypeHandle) -> (Arc<Constant>, bool) {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(&ty) {
            return (Arc::clone(existing), true);
        }
        let constant = Arc::new(Constant::new(ty));
        entries.insert(ty, Arc::clone(&constant));
        (constant, false)
    }

    pub fn get(&self, ty: TypeHandle) -> Option<Arc<Constant>> {
        self.entries.lock().get(&ty).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
