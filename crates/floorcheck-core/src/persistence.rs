//! Persisted checklist record.
//!
//! One record per event namespace. Entries are written sorted so the JSON
//! form diffs cleanly between saves.

use serde::{Deserialize, Serialize};

use floorcheck_logic::selector::DaySelector;
use floorcheck_logic::state::{ChecklistState, CompletionState, ItemKey};

use crate::error::StorageError;

/// Version number for the record format (increment when format changes)
pub const RECORD_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    #[default]
    Json,
    Bincode,
}

impl RecordFormat {
    /// File extension used by the file backend.
    pub fn extension(self) -> &'static str {
        match self {
            RecordFormat::Json => "json",
            RecordFormat::Bincode => "bin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub room: String,
    pub day: String,
    /// Already normalized.
    pub item: String,
    pub set: bool,
    pub test: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistRecord {
    pub version: u32,
    pub namespace: String,
    pub entries: Vec<StoredEntry>,
}

/// Leading fields only, read before committing to the full layout.
#[derive(Deserialize)]
struct RecordHeader {
    version: u32,
}

impl ChecklistRecord {
    pub fn from_state(namespace: &str, state: &ChecklistState) -> Self {
        let mut pairs: Vec<_> = state
            .iter()
            .filter(|(_, s)| **s != CompletionState::default())
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));

        let entries = pairs
            .into_iter()
            .map(|(key, s)| StoredEntry {
                room: key.room_id.clone(),
                day: key.day.as_str().to_string(),
                item: key.item.clone(),
                set: s.set,
                test: s.test,
            })
            .collect();

        Self {
            version: RECORD_VERSION,
            namespace: namespace.to_string(),
            entries,
        }
    }

    pub fn into_state(self) -> ChecklistState {
        self.entries
            .into_iter()
            .map(|e| {
                let key = ItemKey::new(e.room, DaySelector::parse(&e.day), &e.item);
                (key, CompletionState::new(e.set, e.test))
            })
            .collect()
    }
}

pub fn encode(record: &ChecklistRecord, format: RecordFormat) -> Result<Vec<u8>, StorageError> {
    let bytes = match format {
        RecordFormat::Json => serde_json::to_vec_pretty(record)?,
        RecordFormat::Bincode => bincode::serialize(record)?,
    };
    Ok(bytes)
}

/// Decode and check version and namespace. A record written under an older
/// layout is rejected rather than guessed at.
pub fn decode(
    bytes: &[u8],
    format: RecordFormat,
    namespace: &str,
) -> Result<ChecklistRecord, StorageError> {
    let header: RecordHeader = match format {
        RecordFormat::Json => serde_json::from_slice(bytes)?,
        RecordFormat::Bincode => bincode::deserialize(bytes)?,
    };
    if header.version != RECORD_VERSION {
        return Err(StorageError::VersionMismatch {
            expected: RECORD_VERSION,
            found: header.version,
        });
    }

    let record: ChecklistRecord = match format {
        RecordFormat::Json => serde_json::from_slice(bytes)?,
        RecordFormat::Bincode => bincode::deserialize(bytes)?,
    };
    if record.namespace != namespace {
        return Err(StorageError::NamespaceMismatch {
            expected: namespace.to_string(),
            found: record.namespace,
        });
    }
    Ok(record)
}
