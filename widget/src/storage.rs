//! Durable key-value storage for widget placement state.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser build persists through `localStorage` ([`LocalStore`], hydrate
//! only). Native builds and tests use [`MemoryStore`]. Both speak plain
//! strings; typed helpers here own the encoding of the visibility token and
//! the saved position so the placement logic never touches raw values.
//!
//! ERROR HANDLING
//! ==============
//! A missing or malformed saved position is an expected input, reported as a
//! [`RestoreOutcome`] variant instead of an error.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::RefCell;
use std::collections::HashMap;

use serde::Deserialize;

use crate::consts::{POSITION_KEY, VISIBLE_KEY};
use crate::geometry::Position;

/// Failure writing to the backing store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// No storage area is reachable (private mode, no window, etc.).
    #[error("storage unavailable")]
    Unavailable,

    /// The store refused the write, typically a quota error.
    #[error("storage write rejected: {0}")]
    WriteRejected(String),
}

/// String-valued key-value store.
pub trait KeyValueStore {
    /// Read the value for `key`, `None` when absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Overwrite the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing store rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// In-process store used off the browser and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// A preferred store, or an in-memory one when the preferred store could
/// not be opened. Placement keeps working for the page's lifetime either way.
#[derive(Debug)]
pub enum FallbackStore<S> {
    Primary(S),
    Memory(MemoryStore),
}

impl<S> FallbackStore<S> {
    /// Use the opened store, or fall back to memory and log why.
    pub fn from_open(opened: Result<S, StorageError>) -> Self {
        match opened {
            Ok(store) => Self::Primary(store),
            Err(e) => {
                log::warn!("[chatbot] {e}; placement will not survive a reload");
                Self::Memory(MemoryStore::new())
            }
        }
    }

    #[must_use]
    pub fn is_primary(&self) -> bool {
        matches!(self, Self::Primary(_))
    }
}

impl<S: KeyValueStore> KeyValueStore for FallbackStore<S> {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            Self::Primary(store) => store.get(key),
            Self::Memory(store) => store.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Self::Primary(store) => store.set(key, value),
            Self::Memory(store) => store.set(key, value),
        }
    }
}

/// Browser `localStorage`.
#[cfg(feature = "hydrate")]
#[derive(Debug, Clone)]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(feature = "hydrate")]
impl LocalStore {
    /// Open the window's `localStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when there is no window or the
    /// browser denies storage access.
    pub fn open() -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { storage })
    }
}

#[cfg(feature = "hydrate")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::WriteRejected(format!("{e:?}")))
    }
}

// =============================================================================
// VISIBILITY
// =============================================================================

/// Whether the chat panel is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    Visible,
    #[default]
    Hidden,
}

impl Visibility {
    /// Persisted token for this state.
    #[must_use]
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Visible => "true",
            Self::Hidden => "false",
        }
    }

    /// Decode a persisted token. Anything but `"true"` reads as hidden.
    #[must_use]
    pub fn from_token(token: Option<&str>) -> Self {
        if token == Some("true") { Self::Visible } else { Self::Hidden }
    }

    #[must_use]
    pub fn is_visible(self) -> bool {
        self == Self::Visible
    }
}

/// Read the persisted visibility flag.
pub fn load_visibility(store: &impl KeyValueStore) -> Visibility {
    Visibility::from_token(store.get(VISIBLE_KEY).as_deref())
}

/// Persist the visibility flag.
///
/// # Errors
///
/// Propagates the store's write failure.
pub fn save_visibility(store: &impl KeyValueStore, visibility: Visibility) -> Result<(), StorageError> {
    store.set(VISIBLE_KEY, visibility.as_token())
}

// =============================================================================
// SAVED POSITION
// =============================================================================

/// Result of reading the saved position.
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    /// A position was read (and, from the placement manager, applied).
    Restored(Position),
    /// Nothing was saved yet.
    Missing,
    /// Something was saved but it does not decode as a position.
    Unparsable(String),
}

impl RestoreOutcome {
    #[must_use]
    pub fn is_restored(&self) -> bool {
        matches!(self, Self::Restored(_))
    }
}

#[derive(Deserialize)]
struct SavedPosition {
    left: Option<f64>,
    top: Option<f64>,
}

/// Decode a raw saved value. Missing coordinates default to zero.
#[must_use]
pub fn decode_position(raw: Option<&str>) -> RestoreOutcome {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return RestoreOutcome::Missing;
    };
    match serde_json::from_str::<SavedPosition>(raw) {
        Ok(saved) => RestoreOutcome::Restored(Position::new(saved.left.unwrap_or(0.0), saved.top.unwrap_or(0.0))),
        Err(e) => RestoreOutcome::Unparsable(e.to_string()),
    }
}

/// Read the saved position without applying it.
pub fn load_position(store: &impl KeyValueStore) -> RestoreOutcome {
    decode_position(store.get(POSITION_KEY).as_deref())
}

/// Overwrite the saved position.
///
/// # Errors
///
/// Propagates the store's write failure.
pub fn save_position(store: &impl KeyValueStore, position: Position) -> Result<(), StorageError> {
    let raw = serde_json::to_string(&position).map_err(|e| StorageError::WriteRejected(e.to_string()))?;
    store.set(POSITION_KEY, &raw)
}
