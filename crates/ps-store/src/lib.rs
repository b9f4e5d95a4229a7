//! ps-store: transactional key-value storage.
//!
//! The image repository only needs a small contract from its storage:
//! begin a read or write transaction, get, put, delete, prefix-scan, and
//! commit or abort. This crate defines that contract ([`KvStore`],
//! [`ReadTxn`], [`WriteTxn`]) and ships two engines:
//!
//! - [`MemoryStore`]: an ordered map published as immutable snapshots.
//! - [`SqliteStore`]: a single `kv` table in a SQLite file.
//!
//! Both give snapshot-isolated readers and serialized writers. A write
//! transaction that is dropped without [`WriteTxn::commit`] is aborted.
//!
//! # Examples
//!
//! ```
//! use ps_store::{KvStoreExt, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store
//!     .update(|txn| {
//!         txn.put(b"a", b"1".to_vec())?;
//!         txn.put(b"b", b"2".to_vec())
//!     })
//!     .unwrap();
//!
//! let value = store.view(|txn| txn.get(b"a")).unwrap();
//! assert_eq!(value.as_deref(), Some(&b"1"[..]));
//! ```

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use ps_core::Result;

/// A key/value pair returned by prefix scans.
pub type Entry = (Vec<u8>, Vec<u8>);

/// Read access inside a transaction.
pub trait ReadTxn {
    /// Fetch a private copy of the value stored under `key`.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// All entries whose key starts with `prefix`, in ascending key order.
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<Entry>>;

    /// Whether a value is stored under `key`.
    fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Read/write access inside a transaction.
///
/// Reads observe the transaction's own pending writes. Nothing becomes
/// visible to other transactions until [`commit`](WriteTxn::commit).
pub trait WriteTxn: ReadTxn {
    /// Insert or replace the value under `key`.
    fn put(&mut self, key: &[u8], value: Vec<u8>) -> Result<()>;

    /// Remove `key`. Returns `true` if a value was present.
    fn delete(&mut self, key: &[u8]) -> Result<bool>;

    /// Atomically publish every pending write.
    fn commit(self: Box<Self>) -> Result<()>;
}

/// A transactional key-value engine shared by the whole process.
pub trait KvStore: Send + Sync {
    /// Start a read-only transaction over a consistent snapshot.
    fn begin_read(&self) -> Result<Box<dyn ReadTxn + '_>>;

    /// Start a write transaction. Blocks while another writer is active.
    fn begin_write(&self) -> Result<Box<dyn WriteTxn + '_>>;
}

/// Closure-style helpers over [`KvStore`].
pub trait KvStoreExt: KvStore {
    /// Run `f` inside a read transaction.
    fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn ReadTxn) -> Result<T>,
    {
        let txn = self.begin_read()?;
        f(&*txn)
    }

    /// Run `f` inside a write transaction, committing only if it succeeds.
    ///
    /// When `f` returns an error the transaction is dropped, which aborts it.
    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn WriteTxn) -> Result<T>,
    {
        let mut txn = self.begin_write()?;
        let out = f(&mut *txn)?;
        txn.commit()?;
        Ok(out)
    }
}

impl<S: KvStore + ?Sized> KvStoreExt for S {}

/// Smallest key strictly greater than every key starting with `prefix`.
///
/// Returns `None` when no such bound exists (empty prefix or all `0xFF`).
pub(crate) fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut upper = prefix.to_vec();
    while let Some(last) = upper.pop() {
        if last < u8::MAX {
            upper.push(last + 1);
            return Some(upper);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_bound_increments_last_byte() {
        assert_eq!(prefix_upper_bound(b"thumbs/"), Some(b"thumbs0".to_vec()));
    }

    #[test]
    fn upper_bound_skips_trailing_max_bytes() {
        assert_eq!(prefix_upper_bound(&[0x01, 0xFF, 0xFF]), Some(vec![0x02]));
    }

    #[test]
    fn upper_bound_unbounded() {
        assert_eq!(prefix_upper_bound(b""), None);
        assert_eq!(prefix_upper_bound(&[0xFF, 0xFF]), None);
    }

    #[test]
    fn update_aborts_on_error() {
        let store = MemoryStore::new();
        let result: Result<()> = store.update(|txn| {
            txn.put(b"k", b"v".to_vec())?;
            Err(ps_core::Error::Internal("boom".into()))
        });
        assert!(result.is_err());
        assert!(!store.view(|txn| txn.contains(b"k")).unwrap());
    }

    #[test]
    fn works_through_trait_object() {
        let store: std::sync::Arc<dyn KvStore> = std::sync::Arc::new(MemoryStore::new());
        store.update(|txn| txn.put(b"k", b"v".to_vec())).unwrap();
        let got = store.view(|txn| txn.get(b"k")).unwrap();
        assert_eq!(got, Some(b"v".to_vec()));
    }
}
