//! Thread-safe handle over a concept store.

use crate::error::{StoreError, StoreResult};
use crate::store::{Admission, ConceptStore};
use cadre_core::{Concept, Origin};
use std::sync::{Arc, RwLock, RwLockReadGuard};

/// A concept store shared between producers on several threads.
///
/// Admission takes the write lock, so it is atomic: when several threads
/// admit structurally identical concepts, exactly one sees `Admitted`.
#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<RwLock<ConceptStore>>,
}

impl SharedStore {
    pub fn new(store: ConceptStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Admit a concept under the write lock.
    pub fn admit(&self, concept: Concept, origin: Origin) -> StoreResult<Admission> {
        let mut store = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        store.admit(concept, origin)
    }

    /// Read access to the current contents.
    pub fn read(&self) -> StoreResult<RwLockReadGuard<'_, ConceptStore>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    /// Take the store back once every other handle is gone.
    pub fn into_inner(self) -> StoreResult<ConceptStore> {
        let lock = Arc::try_unwrap(self.inner).map_err(|inner| StoreError::StillShared {
            handles: Arc::strong_count(&inner),
        })?;
        lock.into_inner().map_err(|_| StoreError::Poisoned)
    }
}
