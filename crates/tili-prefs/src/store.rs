//! Preference store
//!
//! The single writer of [`Configuration`]. Every mutation runs the same
//! pipeline: persist, project onto the document root, notify listeners.
//! Listeners are invoked on a snapshot of the listener list with no lock
//! held, so they may read from or write back into the store.

use crate::config::{Configuration, Flag, Value};
use crate::document::{self, DocumentRoot, NullDocumentRoot};
use crate::error::{PrefsError, StorageError};
use crate::resolver::NeedsResolver;
use crate::storage::{MemoryStorage, PreferenceStorage};
use parking_lot::{Mutex, RwLock};
use std::convert::Infallible;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Storage key used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "tili_accessibility_preferences";

/// Change listener
pub type Listener = Arc<dyn Fn(&Configuration) + Send + Sync>;

/// Handle returned by [`PreferenceStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Holds the current configuration and fans out changes
pub struct PreferenceStore {
    key: String,
    storage: Arc<dyn PreferenceStorage>,
    root: Arc<dyn DocumentRoot>,
    resolver: NeedsResolver,
    config: RwLock<Configuration>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("key", &self.key)
            .field("config", &*self.config.read())
            .field("listeners", &self.listeners.lock().len())
            .finish_non_exhaustive()
    }
}

impl PreferenceStore {
    /// Open the store, loading any configuration saved under `key`
    ///
    /// Missing data yields defaults. Corrupt data or a failing backend also
    /// yields defaults, with a warning; opening never fails. The loaded
    /// configuration is projected onto `root` immediately.
    pub fn open(
        storage: Arc<dyn PreferenceStorage>,
        root: Arc<dyn DocumentRoot>,
        key: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let config = load_or_default(storage.as_ref(), &key);
        document::project(&config, root.as_ref());
        tracing::info!(
            key = %key,
            configured = config.has_configured,
            needs = config.accessibility_needs.len(),
            "preference store opened"
        );

        Self {
            key,
            storage,
            root,
            resolver: NeedsResolver::default(),
            config: RwLock::new(config),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    /// Store over fresh in-memory storage and a null document root
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(
            Arc::new(MemoryStorage::new()),
            Arc::new(NullDocumentRoot),
            DEFAULT_STORAGE_KEY,
        )
    }

    /// Use a custom resolver
    #[must_use]
    pub fn with_resolver(mut self, resolver: NeedsResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Storage key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Snapshot of the current configuration
    #[must_use]
    pub fn get(&self) -> Configuration {
        self.config.read().clone()
    }

    /// Read through the current configuration without cloning
    pub fn read<R>(&self, f: impl FnOnce(&Configuration) -> R) -> R {
        f(&self.config.read())
    }

    /// Update a single field
    ///
    /// # Errors
    /// `TypeMismatch` or `InvalidValue` from [`Configuration::set`]; the
    /// stored configuration is left untouched.
    pub fn set(&self, flag: Flag, value: Value) -> Result<(), PrefsError> {
        self.update(|config| config.set(flag, value))?;
        tracing::debug!(%flag, "preference updated");
        Ok(())
    }

    /// Update several fields as one change
    ///
    /// Listeners see a single notification.
    ///
    /// # Errors
    /// The first refused value; nothing is written in that case.
    pub fn set_many<I>(&self, changes: I) -> Result<(), PrefsError>
    where
        I: IntoIterator<Item = (Flag, Value)>,
    {
        self.update(|config| {
            changes
                .into_iter()
                .try_for_each(|(flag, value)| config.set(flag, value))
        })?;
        tracing::debug!("preferences updated");
        Ok(())
    }

    /// Edit the configuration in place
    ///
    /// `f` returns `None` to leave everything untouched; nothing is
    /// persisted or notified in that case.
    pub fn modify<R>(&self, f: impl FnOnce(&mut Configuration) -> Option<R>) -> Option<R> {
        self.update(|config| f(config).ok_or(()))
            .ok()
            .map(|(out, _)| out)
    }

    /// Register a change listener
    pub fn subscribe(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, listener));
        id
    }

    /// Remove a listener; returns whether it was registered
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Replace every derived field from `needs`
    ///
    /// Returns the committed configuration.
    pub fn apply_accessibility_needs<I, S>(&self, needs: I) -> Configuration
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let next = self.commit_with(|config| {
            *config = self.resolver.resolve(needs, config);
        });
        let ids: Vec<&str> = next.accessibility_needs.iter().map(|n| n.as_str()).collect();
        tracing::info!(needs = ?ids, "accessibility needs applied");
        next
    }

    /// Resolve `needs` and mark first-time setup as done
    ///
    /// # Errors
    /// `PrefsError::EmptySelection` if no catalog need is selected.
    pub fn complete_setup<I, S>(&self, needs: I) -> Result<Configuration, PrefsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ((), next) = self.update(|config| {
            let mut resolved = self.resolver.resolve(needs, config);
            if resolved.accessibility_needs.is_empty() {
                return Err(PrefsError::EmptySelection);
            }
            resolved.has_configured = true;
            *config = resolved;
            Ok(())
        })?;
        tracing::info!(needs = next.accessibility_needs.len(), "first-time setup complete");
        Ok(next)
    }

    /// Set the `hasConfigured` gate
    pub fn set_has_configured(&self, configured: bool) {
        self.commit_with(|config| config.has_configured = configured);
    }

    /// Set the `showWelcome` gate
    pub fn set_show_welcome(&self, show: bool) {
        self.commit_with(|config| config.show_welcome = show);
    }

    /// Re-arm the pre-auth selector; every other field is kept
    pub fn reset_for_logout(&self) {
        tracing::info!("resetting setup gate for logout");
        self.set_has_configured(false);
    }

    fn commit_with(&self, f: impl FnOnce(&mut Configuration)) -> Configuration {
        let result = self.update(|config| {
            f(config);
            Ok::<(), Infallible>(())
        });
        match result {
            Ok(((), next)) => next,
            Err(never) => match never {},
        }
    }

    /// Mutate a copy of the configuration under the write lock
    ///
    /// The copy replaces the current configuration and is persisted and
    /// projected before the lock is released; the document root must not
    /// call back into the store. Listeners run afterwards with no lock held.
    /// On error nothing changes.
    fn update<R, E>(
        &self,
        f: impl FnOnce(&mut Configuration) -> Result<R, E>,
    ) -> Result<(R, Configuration), E> {
        let (out, next) = {
            let mut config = self.config.write();
            let mut next = config.clone();
            let out = f(&mut next)?;
            *config = next.clone();

            if let Err(e) = self.persist(&next) {
                tracing::error!(key = %self.key, error = %e, "failed to persist preferences");
            }
            document::project(&next, self.root.as_ref());
            (out, next)
        };

        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&next);
        }
        Ok((out, next))
    }

    fn persist(&self, config: &Configuration) -> Result<(), StorageError> {
        let json = serde_json::to_string(config)?;
        self.storage.save(&self.key, &json)
    }
}

fn load_or_default(storage: &dyn PreferenceStorage, key: &str) -> Configuration {
    match storage.load(key) {
        Ok(None) => Configuration::default(),
        Ok(Some(text)) => match serde_json::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(key, error = %e, "stored preferences are corrupt, using defaults");
                Configuration::default()
            }
        },
        Err(e) => {
            tracing::warn!(key, error = %e, "cannot load preferences, using defaults");
            Configuration::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FontSize;
    use crate::storage::MockPreferenceStorage;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CapturingRoot {
        writes: Mutex<Vec<(String, String)>>,
    }

    impl DocumentRoot for CapturingRoot {
        fn set_attribute(&self, name: &str, value: &str) {
            self.writes.lock().push((name.to_string(), value.to_string()));
        }

        fn set_style_property(&self, name: &str, value: &str) {
            self.writes.lock().push((name.to_string(), value.to_string()));
        }
    }

    #[test]
    fn corrupt_storage_falls_back_to_defaults() {
        let storage = Arc::new(MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, "{not json"));
        let store = PreferenceStore::open(storage, Arc::new(NullDocumentRoot), DEFAULT_STORAGE_KEY);
        assert_eq!(store.get(), Configuration::default());
    }

    #[test]
    fn failing_load_falls_back_to_defaults() {
        let mut storage = MockPreferenceStorage::new();
        storage
            .expect_load()
            .returning(|_| Err(StorageError::InvalidKey("x".to_string())));
        let store = PreferenceStore::open(Arc::new(storage), Arc::new(NullDocumentRoot), "x");
        assert!(!store.get().has_configured);
    }

    #[test]
    fn failing_save_still_applies_and_notifies() {
        let mut storage = MockPreferenceStorage::new();
        storage.expect_load().returning(|_| Ok(None));
        storage.expect_save().times(1).returning(|_, _| {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        });
        let store = PreferenceStore::open(
            Arc::new(storage),
            Arc::new(NullDocumentRoot),
            DEFAULT_STORAGE_KEY,
        );

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        store.subscribe(Arc::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        store.set(Flag::FocusMode, Value::Bool(true)).unwrap();
        assert!(store.get().focus_mode);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn mutation_persists_json() {
        let storage = Arc::new(MemoryStorage::new());
        let store = PreferenceStore::open(
            Arc::clone(&storage) as Arc<dyn PreferenceStorage>,
            Arc::new(NullDocumentRoot),
            DEFAULT_STORAGE_KEY,
        );
        store.set(Flag::FontSize, Value::FontSize(FontSize::Large)).unwrap();

        let raw = storage.raw(DEFAULT_STORAGE_KEY).unwrap();
        assert!(raw.contains(r#""fontSize":"large""#));
    }

    #[test]
    fn projection_runs_on_open_and_mutation() {
        let root = Arc::new(CapturingRoot::default());
        let store = PreferenceStore::open(
            Arc::new(MemoryStorage::new()),
            Arc::clone(&root) as Arc<dyn DocumentRoot>,
            DEFAULT_STORAGE_KEY,
        );
        assert!(root
            .writes
            .lock()
            .contains(&("data-font-size".to_string(), "medium".to_string())));

        store.set(Flag::ReducedMotion, Value::Bool(true)).unwrap();
        let writes = root.writes.lock();
        assert_eq!(
            writes.last(),
            Some(&("--transition-speed".to_string(), "0s".to_string()))
        );
    }

    #[test]
    fn rejected_set_leaves_config_untouched() {
        let store = PreferenceStore::in_memory();
        let before = store.get();
        assert!(store.set(Flag::Contrast, Value::Number(1.0)).is_err());
        assert_eq!(store.get(), before);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = PreferenceStore::in_memory();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let id = store.subscribe(Arc::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        store.set_has_configured(true);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set_has_configured(false);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listener_may_read_store() {
        let store = Arc::new(PreferenceStore::in_memory());
        let inner = Arc::downgrade(&store);
        let observed = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&observed);
        store.subscribe(Arc::new(move |_| {
            if let Some(store) = inner.upgrade() {
                *sink.lock() = Some(store.get().focus_mode);
            }
        }));

        store.set(Flag::FocusMode, Value::Bool(true)).unwrap();
        assert_eq!(*observed.lock(), Some(true));
    }

    #[test]
    fn concurrent_writers_keep_every_update() {
        let storage = Arc::new(MemoryStorage::new());
        let store = Arc::new(PreferenceStore::open(
            Arc::clone(&storage) as Arc<dyn PreferenceStorage>,
            Arc::new(NullDocumentRoot),
            DEFAULT_STORAGE_KEY,
        ));
        let flags = [
            Flag::ReducedMotion,
            Flag::FocusMode,
            Flag::AudioFeedback,
            Flag::VisualConfirmations,
            Flag::SpatialGuidance,
            Flag::KeyboardShortcuts,
            Flag::AutoReadContent,
            Flag::HapticFeedback,
        ];

        let handles: Vec<_> = flags
            .into_iter()
            .map(|flag| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store.set(flag, Value::Bool(true)).unwrap();
                        store.set_has_configured(true);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let config = store.get();
        for flag in flags {
            assert_eq!(config.get(flag), Value::Bool(true), "{flag} was lost");
        }
        let saved: Configuration =
            serde_json::from_str(&storage.raw(DEFAULT_STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(saved, config);
    }

    #[test]
    fn set_many_is_all_or_nothing() {
        let store = PreferenceStore::in_memory();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        store.subscribe(Arc::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        let err = store.set_many([
            (Flag::FocusMode, Value::Bool(true)),
            (Flag::Contrast, Value::Bool(true)),
        ]);
        assert!(err.is_err());
        assert!(!store.get().focus_mode);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        store
            .set_many([
                (Flag::FocusMode, Value::Bool(true)),
                (Flag::FontSize, Value::FontSize(FontSize::Small)),
            ])
            .unwrap();
        assert!(store.get().focus_mode);
        assert_eq!(store.get().font_size, FontSize::Small);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn modify_returning_none_commits_nothing() {
        let storage = Arc::new(MemoryStorage::new());
        let store = PreferenceStore::open(
            Arc::clone(&storage) as Arc<dyn PreferenceStorage>,
            Arc::new(NullDocumentRoot),
            DEFAULT_STORAGE_KEY,
        );

        let untouched: Option<()> = store.modify(|config| {
            config.focus_mode = true;
            None
        });
        assert!(untouched.is_none());
        assert!(!store.get().focus_mode);
        assert!(storage.raw(DEFAULT_STORAGE_KEY).is_none());

        let size = store.modify(|config| {
            config.font_size = config.font_size.larger();
            Some(config.font_size)
        });
        assert_eq!(size, Some(FontSize::Large));
        assert!(storage.raw(DEFAULT_STORAGE_KEY).is_some());
    }

    #[test]
    fn complete_setup_requires_a_need() {
        let store = PreferenceStore::in_memory();
        let err = store.complete_setup(["cant-fly"]).unwrap_err();
        assert!(matches!(err, PrefsError::EmptySelection));
        assert!(!store.get().has_configured);

        let config = store.complete_setup(["no-needs"]).unwrap();
        assert!(config.has_configured);
    }

    #[test]
    fn logout_only_clears_setup_gate() {
        let store = PreferenceStore::in_memory();
        store.complete_setup(["low-vision"]).unwrap();
        store.reset_for_logout();

        let config = store.get();
        assert!(!config.has_configured);
        assert_eq!(config.font_size, FontSize::XLarge);
        assert_eq!(config.accessibility_needs.len(), 1);
    }
}
