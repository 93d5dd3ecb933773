//! Checklist store: in-memory state backed by one persisted record.
//!
//! Every mutation updates memory first and then writes the whole record
//! synchronously. The first backend failure detaches the backend for the
//! rest of the session; from then on the store is memory-only and a single
//! warning is held for the UI to pick up.

use log::{debug, info, warn};

use floorcheck_logic::selector::DaySelector;
use floorcheck_logic::state::{ChecklistState, CompletionLookup, CompletionState, ItemKey};

use crate::backend::StorageBackend;
use crate::error::StorageError;
use crate::persistence::{decode, encode, ChecklistRecord, RecordFormat};

#[derive(Debug)]
pub struct ChecklistStore {
    namespace: String,
    format: RecordFormat,
    /// `None` once degraded to memory-only.
    backend: Option<Box<dyn StorageBackend>>,
    state: ChecklistState,
    warning: Option<String>,
}

impl ChecklistStore {
    /// Load this namespace from `backend`. A read or decode failure opens
    /// the store degraded instead of failing.
    pub fn open(
        namespace: impl Into<String>,
        format: RecordFormat,
        backend: Box<dyn StorageBackend>,
    ) -> Self {
        let namespace = namespace.into();
        let loaded = backend
            .read(&namespace)
            .and_then(|bytes| match bytes {
                Some(bytes) => decode(&bytes, format, &namespace).map(ChecklistRecord::into_state),
                None => Ok(ChecklistState::new()),
            });

        match loaded {
            Ok(state) => {
                info!("loaded {} checklist entries from `{namespace}`", state.len());
                Self {
                    namespace,
                    format,
                    backend: Some(backend),
                    state,
                    warning: None,
                }
            }
            Err(err) => Self::unavailable(namespace, format, &err),
        }
    }

    /// Memory-only store that never warns.
    pub fn in_memory(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            format: RecordFormat::default(),
            backend: None,
            state: ChecklistState::new(),
            warning: None,
        }
    }

    /// Memory-only store opened because storage could not be reached.
    pub fn unavailable(namespace: impl Into<String>, format: RecordFormat, err: &StorageError) -> Self {
        let namespace = namespace.into();
        warn!("checklist storage for `{namespace}` unavailable: {err}");
        Self {
            warning: Some(degraded_message(err)),
            namespace,
            format,
            backend: None,
            state: ChecklistState::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn state(&self) -> &ChecklistState {
        &self.state
    }

    /// True when changes no longer reach the backend.
    pub fn is_degraded(&self) -> bool {
        self.backend.is_none()
    }

    /// The degradation warning, returned once.
    pub fn take_warning(&mut self) -> Option<String> {
        self.warning.take()
    }

    pub fn get(&self, room_id: &str, day: &DaySelector, item_name: &str) -> CompletionState {
        self.state.get(&ItemKey::new(room_id, day.clone(), item_name))
    }

    /// Overwrite one slot and persist. On a storage failure the value is
    /// still kept in memory.
    pub fn set(
        &mut self,
        room_id: &str,
        day: &DaySelector,
        item_name: &str,
        value: CompletionState,
    ) -> Result<(), StorageError> {
        self.set_many(std::iter::once((ItemKey::new(room_id, day.clone(), item_name), value)))
    }

    /// Overwrite several slots with a single persist.
    pub fn set_many(
        &mut self,
        entries: impl IntoIterator<Item = (ItemKey, CompletionState)>,
    ) -> Result<(), StorageError> {
        let mut changed = false;
        for (key, value) in entries {
            if self.state.get(&key) != value {
                debug!("{}/{}/{} -> {:?}", key.room_id, key.day, key.item, value);
                self.state.set(key, value);
                changed = true;
            }
        }
        if changed {
            self.persist()
        } else {
            Ok(())
        }
    }

    /// Remove every slot for a room. Clearing an empty room does not write.
    pub fn clear_room(&mut self, room_id: &str) -> Result<(), StorageError> {
        let removed = self.state.clear_room(room_id);
        if removed == 0 {
            return Ok(());
        }
        info!("cleared {removed} entries for room `{room_id}`");
        self.persist()
    }

    /// Drop this namespace's record. Other namespaces are untouched.
    pub fn clear_all(&mut self) -> Result<(), StorageError> {
        self.state.clear_all();
        info!("cleared checklist `{}`", self.namespace);
        self.persist()
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        let Some(backend) = self.backend.as_mut() else {
            return Ok(());
        };

        let result = if self.state.is_empty() {
            backend.remove(&self.namespace)
        } else {
            let record = ChecklistRecord::from_state(&self.namespace, &self.state);
            encode(&record, self.format).and_then(|bytes| backend.write(&self.namespace, &bytes))
        };

        if let Err(err) = &result {
            warn!("checklist storage for `{}` failed, continuing in memory: {err}", self.namespace);
            self.warning = Some(degraded_message(err));
            self.backend = None;
        }
        result
    }
}

fn degraded_message(err: &StorageError) -> String {
    format!("Checklist changes will not be saved ({err}). They are kept until this session ends.")
}

impl CompletionLookup for ChecklistStore {
    fn completion(&self, room_id: &str, day: &DaySelector, item_name: &str) -> CompletionState {
        self.get(room_id, day, item_name)
    }
}
