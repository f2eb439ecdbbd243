use parking_lot::Mutex;
use std::sync::Arc;

use crate::models::LibraryRecord;
use crate::store::LibraryStore;

/// Cloneable handle for callers on more than one thread.
///
/// Every call holds the one lock for the whole operation, so a uniqueness
/// check and the mutation it guards cannot interleave with another caller.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<LibraryStore>>,
}

impl SharedStore {
    pub fn new(store: LibraryStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run `f` with exclusive access to the store.
    pub fn with<R>(&self, f: impl FnOnce(&mut LibraryStore) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    pub fn list_libraries(&self) -> Vec<LibraryRecord> {
        self.inner.lock().list_libraries()
    }
}

impl From<LibraryStore> for SharedStore {
    fn from(store: LibraryStore) -> Self {
        Self::new(store)
    }
}
