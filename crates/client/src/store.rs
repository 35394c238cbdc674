//! Persistent local store: durable key-value storage for the client.
//!
//! The Rust analog of the browser's local storage. Data survives restarts
//! but is never the system of record - the backend is authoritative, and
//! every value here is a mirror that can be rebuilt from a fetch.
//!
//! Reads and writes fail soft by design: a malformed or missing value yields
//! the caller-supplied default, and write failures are logged rather than
//! propagated. The worst case is a stale badge, never a crashed client.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use agrichain_core::StoreKey;

/// Durable key-value store backed by one JSON file per [`StoreKey`].
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    dir: PathBuf,
    watchers: Mutex<Vec<Watcher>>,
    next_watch_id: AtomicU64,
}

struct Watcher {
    id: u64,
    key: StoreKey,
    callback: Arc<dyn Fn() + Send + Sync>,
}

impl LocalStore {
    /// Open (or create) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Fails only when the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            inner: Arc::new(StoreInner {
                dir,
                watchers: Mutex::new(Vec::new()),
                next_watch_id: AtomicU64::new(0),
            }),
        })
    }

    fn path_for(&self, key: &StoreKey) -> PathBuf {
        self.inner.dir.join(format!("{}.json", key.as_key()))
    }

    /// Read the value under `key`, falling back to `default` when the key is
    /// absent or its contents are malformed. Never fails.
    ///
    /// A malformed value is also cleared from disk, so a corrupt session or
    /// token entry cannot wedge every subsequent read.
    pub fn read<T: DeserializeOwned>(&self, key: &StoreKey, default: T) -> T {
        let path = self.path_for(key);
        let Ok(bytes) = std::fs::read(&path) else {
            return default;
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "malformed local data, clearing and using default");
                if let Err(e) = std::fs::remove_file(&path) {
                    warn!(key = %key, error = %e, "failed to clear malformed local data");
                }
                default
            }
        }
    }

    /// Persist `value` under `key`. Never fails: serialization or I/O
    /// problems are logged and the previous value (if any) is left in place.
    /// Watchers registered for `key` are notified after a successful write.
    pub fn write<T: Serialize>(&self, key: &StoreKey, value: &T) {
        let path = self.path_for(key);
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key = %key, error = %e, "failed to serialize local data");
                return;
            }
        };
        if let Err(e) = std::fs::write(&path, bytes) {
            warn!(key = %key, error = %e, "failed to persist local data");
            return;
        }
        debug!(key = %key, "local store updated");
        self.notify(key);
    }

    /// Remove the value under `key`. Idempotent: an absent key is not an
    /// error. Watchers are notified when a value was actually removed.
    pub fn remove(&self, key: &StoreKey) {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => self.notify(key),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(key = %key, error = %e, "failed to remove local data"),
        }
    }

    /// Register a change callback for `key`, fired after every successful
    /// `write` or effective `remove` through any clone of this store.
    ///
    /// The returned guard unregisters the callback when dropped. Callbacks
    /// run synchronously on the mutating caller's thread and must be cheap.
    #[must_use]
    pub fn watch(&self, key: StoreKey, callback: impl Fn() + Send + Sync + 'static) -> StoreWatch {
        let id = self.inner.next_watch_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut watchers) = self.inner.watchers.lock() {
            watchers.push(Watcher {
                id,
                key,
                callback: Arc::new(callback),
            });
        }
        StoreWatch {
            store: Arc::downgrade(&self.inner),
            id,
        }
    }

    fn notify(&self, key: &StoreKey) {
        // Snapshot matching callbacks so a callback may read or write the
        // store without deadlocking on the watcher lock.
        let matching: Vec<Arc<dyn Fn() + Send + Sync>> = match self.inner.watchers.lock() {
            Ok(watchers) => watchers
                .iter()
                .filter(|w| w.key == *key)
                .map(|w| Arc::clone(&w.callback))
                .collect(),
            Err(_) => return,
        };
        for callback in matching {
            callback();
        }
    }
}

/// Guard for a registered change callback; unregisters on drop.
pub struct StoreWatch {
    store: Weak<StoreInner>,
    id: u64,
}

impl StoreWatch {
    /// Unregister the callback now instead of at drop time.
    pub fn unwatch(self) {
        drop(self);
    }
}

impl Drop for StoreWatch {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade()
            && let Ok(mut watchers) = inner.watchers.lock()
        {
            watchers.retain(|w| w.id != self.id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use agrichain_core::{CartLine, CartSnapshot, ProductId, UserId};
    use rust_decimal::Decimal;

    fn store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn snapshot(lines: usize) -> CartSnapshot {
        CartSnapshot {
            lines: (0..lines)
                .map(|i| CartLine {
                    product_id: ProductId::new(i as i64 + 1),
                    quantity: (i as u32 % 5) + 1,
                    unit_price: Decimal::new(100 + i as i64, 2),
                    sale_price: (i % 2 == 0).then(|| Decimal::new(90 + i as i64, 2)),
                })
                .collect(),
        }
    }

    #[test]
    fn test_missing_key_yields_default() {
        let (_dir, store) = store();
        let cart: CartSnapshot = store.read(&StoreKey::Cart, CartSnapshot::empty());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_malformed_json_yields_default_without_panicking() {
        let (dir, store) = store();
        for garbage in ["{not json", "", "null garbage", "[1,2,", "\u{0}\u{1}"] {
            std::fs::write(dir.path().join("cart.json"), garbage).unwrap();
            let cart: CartSnapshot = store.read(&StoreKey::Cart, CartSnapshot::empty());
            assert!(cart.is_empty(), "garbage {garbage:?} must fall back");
        }
    }

    #[test]
    fn test_malformed_value_is_cleared_after_failed_read() {
        let (dir, store) = store();
        let path = dir.path().join("user.json");
        std::fs::write(&path, "{corrupt json").unwrap();

        let session: Option<String> = store.read(&StoreKey::User, None);
        assert!(session.is_none());
        // The corrupt entry must not survive to poison every later read.
        assert!(!path.exists(), "corrupt value left on disk");

        // Subsequent reads see a plainly absent key.
        let session: Option<String> = store.read(&StoreKey::User, None);
        assert!(session.is_none());
    }

    #[test]
    fn test_round_trip_snapshots_up_to_fifty_lines() {
        let (_dir, store) = store();
        for n in [0, 1, 3, 17, 50] {
            let original = snapshot(n);
            store.write(&StoreKey::Cart, &original);
            let back: CartSnapshot = store.read(&StoreKey::Cart, CartSnapshot::empty());
            assert_eq!(back, original, "round trip failed for {n} lines");
        }
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_dir, store) = store();
        store.write(&StoreKey::Token, &"abc".to_string());
        store.remove(&StoreKey::Token);
        store.remove(&StoreKey::Token);
        let token: Option<String> = store.read(&StoreKey::Token, None);
        assert_eq!(token, None);
    }

    #[test]
    fn test_per_user_chat_keys_do_not_collide() {
        let (_dir, store) = store();
        let alice = StoreKey::ChatHistory(UserId::new(1));
        let bob = StoreKey::ChatHistory(UserId::new(2));
        store.write(&alice, &vec!["hi".to_string()]);
        store.write(&bob, &vec!["yo".to_string()]);
        let a: Vec<String> = store.read(&alice, Vec::new());
        let b: Vec<String> = store.read(&bob, Vec::new());
        assert_eq!(a, vec!["hi"]);
        assert_eq!(b, vec!["yo"]);
    }

    #[test]
    fn test_watch_fires_on_write_and_remove() {
        let (_dir, store) = store();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let _watch = store.watch(StoreKey::Cart, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.write(&StoreKey::Cart, &snapshot(1));
        store.remove(&StoreKey::Cart);
        // Removing an absent key is a no-op and must not fire.
        store.remove(&StoreKey::Cart);
        // Writes to other keys must not fire either.
        store.write(&StoreKey::Token, &"t".to_string());

        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dropped_watch_stops_firing() {
        let (_dir, store) = store();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let watch = store.watch(StoreKey::Cart, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        store.write(&StoreKey::Cart, &snapshot(1));
        watch.unwatch();
        store.write(&StoreKey::Cart, &snapshot(2));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
