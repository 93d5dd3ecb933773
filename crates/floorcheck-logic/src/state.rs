//! Checklist completion state: composite keys and the `{set, test}` pair.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::selector::DaySelector;

/// Collapse whitespace runs to a single `_` so keys survive minor label
/// reformatting ("Microphone  HH" and "Microphone HH" share state).
pub fn normalize_item_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Identity of one checklist slot: room × day × item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub room_id: String,
    pub day: DaySelector,
    /// Normalized item name.
    pub item: String,
}

impl ItemKey {
    pub fn new(room_id: impl Into<String>, day: DaySelector, item_name: &str) -> Self {
        Self {
            room_id: room_id.into(),
            day,
            item: normalize_item_name(item_name),
        }
    }
}

/// The two checklist flags for an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionState {
    /// Physically placed.
    pub set: bool,
    /// Functionally verified.
    pub test: bool,
}

impl CompletionState {
    pub const fn new(set: bool, test: bool) -> Self {
        Self { set, test }
    }

    /// Both set and tested.
    pub fn is_ready(self) -> bool {
        self.set && self.test
    }

    pub fn get(self, metric: Metric) -> bool {
        match metric {
            Metric::Set => self.set,
            Metric::Test => self.test,
        }
    }

    pub fn with(mut self, metric: Metric, value: bool) -> Self {
        match metric {
            Metric::Set => self.set = value,
            Metric::Test => self.test = value,
        }
        self
    }

    pub fn toggled(self, metric: Metric) -> Self {
        self.with(metric, !self.get(metric))
    }
}

/// Which flag a progress figure counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Set,
    Test,
}

/// Read access to completion flags, as the aggregator sees them.
pub trait CompletionLookup {
    fn completion(&self, room_id: &str, day: &DaySelector, item_name: &str) -> CompletionState;
}

/// In-memory completion map for one event.
///
/// Absent keys read as `{false, false}`; writing that default removes the
/// entry, so the map only holds slots that carry information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecklistState {
    entries: HashMap<ItemKey, CompletionState>,
}

impl ChecklistState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ItemKey) -> CompletionState {
        self.entries.get(key).copied().unwrap_or_default()
    }

    pub fn set(&mut self, key: ItemKey, state: CompletionState) {
        if state == CompletionState::default() {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, state);
        }
    }

    /// Drop every slot for a room, across all days. Returns how many went.
    pub fn clear_room(&mut self, room_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.room_id != room_id);
        before - self.entries.len()
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemKey, &CompletionState)> {
        self.entries.iter()
    }
}

impl FromIterator<(ItemKey, CompletionState)> for ChecklistState {
    fn from_iter<I: IntoIterator<Item = (ItemKey, CompletionState)>>(iter: I) -> Self {
        let mut state = Self::new();
        for (key, value) in iter {
            state.set(key, value);
        }
        state
    }
}

impl CompletionLookup for ChecklistState {
    fn completion(&self, room_id: &str, day: &DaySelector, item_name: &str) -> CompletionState {
        self.get(&ItemKey::new(room_id, day.clone(), item_name))
    }
}
