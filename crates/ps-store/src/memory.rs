//! In-memory transactional store.
//!
//! The committed state is an ordered map behind an `Arc`. Readers clone the
//! `Arc` and keep a stable snapshot for as long as the transaction lives.
//! Writers take the writer lock, buffer their changes, and on commit build a
//! new map and swap it in. Values are shared between snapshots as `Arc<[u8]>`
//! so a commit only copies keys and pointers.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock};
use ps_core::Result;

use crate::{prefix_upper_bound, Entry, KvStore, ReadTxn, WriteTxn};

type Snapshot = BTreeMap<Vec<u8>, Arc<[u8]>>;

/// In-memory [`KvStore`] with snapshot reads and serialized writes.
pub struct MemoryStore {
    committed: RwLock<Arc<Snapshot>>,
    writer: Mutex<()>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            committed: RwLock::new(Arc::new(BTreeMap::new())),
            writer: Mutex::new(()),
        }
    }

    /// Number of committed keys.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns `true` if nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.committed.read())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("key_count", &self.len())
            .finish()
    }
}

impl KvStore for MemoryStore {
    fn begin_read(&self) -> Result<Box<dyn ReadTxn + '_>> {
        Ok(Box::new(MemoryReadTxn {
            snapshot: self.snapshot(),
        }))
    }

    fn begin_write(&self) -> Result<Box<dyn WriteTxn + '_>> {
        let guard = self.writer.lock();
        // Taken after the writer lock so no other commit can land in between.
        let base = self.snapshot();
        Ok(Box::new(MemoryWriteTxn {
            store: self,
            _guard: guard,
            base,
            pending: BTreeMap::new(),
        }))
    }
}

fn scan<'s>(
    snapshot: &'s Snapshot,
    prefix: &[u8],
) -> impl Iterator<Item = (Vec<u8>, Arc<[u8]>)> + 's {
    let upper = match prefix_upper_bound(prefix) {
        Some(upper) => Bound::Excluded(upper),
        None => Bound::Unbounded,
    };
    snapshot
        .range::<Vec<u8>, _>((Bound::Included(prefix.to_vec()), upper))
        .map(|(k, v)| (k.clone(), Arc::clone(v)))
}

struct MemoryReadTxn {
    snapshot: Arc<Snapshot>,
}

impl ReadTxn for MemoryReadTxn {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.snapshot.get(key).map(|v| v.to_vec()))
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<Entry>> {
        Ok(scan(&self.snapshot, prefix)
            .map(|(k, v)| (k, v.to_vec()))
            .collect())
    }
}

struct MemoryWriteTxn<'a> {
    store: &'a MemoryStore,
    _guard: MutexGuard<'a, ()>,
    base: Arc<Snapshot>,
    /// `None` marks a pending delete.
    pending: BTreeMap<Vec<u8>, Option<Arc<[u8]>>>,
}

impl ReadTxn for MemoryWriteTxn<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let value = match self.pending.get(key) {
            Some(pending) => pending.as_ref().map(|v| v.to_vec()),
            None => self.base.get(key).map(|v| v.to_vec()),
        };
        Ok(value)
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<Entry>> {
        let mut merged: BTreeMap<Vec<u8>, Arc<[u8]>> = scan(&self.base, prefix).collect();
        for (key, change) in self.pending.iter().filter(|(k, _)| k.starts_with(prefix)) {
            match change {
                Some(value) => {
                    merged.insert(key.clone(), Arc::clone(value));
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged.into_iter().map(|(k, v)| (k, v.to_vec())).collect())
    }
}

impl WriteTxn for MemoryWriteTxn<'_> {
    fn put(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.pending.insert(key.to_vec(), Some(Arc::from(value)));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<bool> {
        let existed = self.contains(key)?;
        self.pending.insert(key.to_vec(), None);
        Ok(existed)
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        if this.pending.is_empty() {
            return Ok(());
        }

        let mut next = (*this.base).clone();
        let changes = this.pending.len();
        for (key, change) in this.pending {
            match change {
                Some(value) => {
                    next.insert(key, value);
                }
                None => {
                    next.remove(&key);
                }
            }
        }

        *this.store.committed.write() = Arc::new(next);
        tracing::trace!(changes, "memory store commit");
        Ok(())
    }
}
