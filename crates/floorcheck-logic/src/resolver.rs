//! Room resolution: turn a room id + day selector into the gear list in effect.
//!
//! Rules, in order:
//! 1. Concrete day: exact schedule key, else the `default` key, else the
//!    room is not in use that day (absence, distinct from "zero items").
//! 2. Items for a matched entry: the entry's own `items` when the key is
//!    present (even if empty), else the room's `defaultItems`, else nothing.
//! 3. All days: union over every event day on which the room carries gear.
//!    Categories keep first-seen order; items are de-duplicated by name
//!    within a category.

use crate::catalog::{CategoryItems, EntrySource, EventCatalog, Item, Room};
use crate::selector::DaySelector;
use crate::state::normalize_item_name;

/// One category of the resolved list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveCategory {
    pub key: String,
    pub label: String,
    pub items: Vec<Item>,
}

/// A room as seen for one day selector.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveRoom<'a> {
    pub room_id: &'a str,
    pub room: &'a Room,
    pub selector: DaySelector,
    /// Day notes. `None` under the all-days view.
    pub notes: Option<&'a str>,
    /// Which schedule key matched. `None` under the all-days view.
    pub source: Option<EntrySource>,
    /// Event days on which this room carries at least one item.
    pub active_days: Vec<String>,
    pub categories: Vec<EffectiveCategory>,
}

impl<'a> EffectiveRoom<'a> {
    /// Every item with its category, in display order.
    pub fn items(&self) -> impl Iterator<Item = (&EffectiveCategory, &Item)> {
        self.categories
            .iter()
            .flat_map(|cat| cat.items.iter().map(move |item| (cat, item)))
    }

    pub fn item_list(&self) -> impl Iterator<Item = &Item> {
        self.categories.iter().flat_map(|cat| cat.items.iter())
    }

    pub fn item_len(&self) -> usize {
        self.categories.iter().map(|cat| cat.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.item_len() == 0
    }

    pub fn contains_item(&self, item_name: &str) -> bool {
        let wanted = normalize_item_name(item_name);
        self.item_list()
            .any(|item| normalize_item_name(&item.name) == wanted)
    }
}

/// Resolve a room for a day selector. `None` means unknown room, unknown
/// day, or not in use.
pub fn resolve<'a>(
    catalog: &'a EventCatalog,
    room_id: &str,
    selector: &DaySelector,
) -> Option<EffectiveRoom<'a>> {
    let (room_id, room) = catalog.room_entry(room_id)?;
    match selector {
        DaySelector::Day(day) => resolve_day(catalog, room_id, room, day),
        DaySelector::All => resolve_all(catalog, room_id, room),
    }
}

/// Every resolvable room for a selector, in catalog order.
pub fn resolve_all_rooms<'a>(
    catalog: &'a EventCatalog,
    selector: &DaySelector,
) -> Vec<EffectiveRoom<'a>> {
    catalog
        .rooms()
        .filter_map(|(id, _)| resolve(catalog, id, selector))
        .collect()
}

fn resolve_day<'a>(
    catalog: &'a EventCatalog,
    room_id: &'a str,
    room: &'a Room,
    day: &str,
) -> Option<EffectiveRoom<'a>> {
    if !catalog.has_day(day) {
        return None;
    }
    let (entry, source) = room.entry_for(day)?;
    let categories = room
        .items_for(entry)
        .map(|items| categories_from(catalog, items))
        .unwrap_or_default();
    let active = categories.iter().any(|cat| !cat.items.is_empty());

    Some(EffectiveRoom {
        room_id,
        room,
        selector: DaySelector::day(day),
        notes: entry.notes.as_deref(),
        source: Some(source),
        active_days: if active { vec![day.to_string()] } else { Vec::new() },
        categories,
    })
}

fn resolve_all<'a>(
    catalog: &'a EventCatalog,
    room_id: &'a str,
    room: &'a Room,
) -> Option<EffectiveRoom<'a>> {
    if room.schedule.is_empty() {
        return None;
    }

    let mut merged: Vec<EffectiveCategory> = Vec::new();
    let mut active_days = Vec::new();
    for day in catalog.days() {
        let Some(items) = day_items(room, day) else {
            continue;
        };
        if items.values().all(Vec::is_empty) {
            continue;
        }
        active_days.push(day.clone());
        merge_into(&mut merged, catalog, items);
    }

    Some(EffectiveRoom {
        room_id,
        room,
        selector: DaySelector::All,
        notes: None,
        source: None,
        active_days,
        categories: merged,
    })
}

fn day_items<'a>(room: &'a Room, day: &str) -> Option<&'a CategoryItems> {
    let (entry, _) = room.entry_for(day)?;
    room.items_for(entry)
}

fn categories_from(catalog: &EventCatalog, items: &CategoryItems) -> Vec<EffectiveCategory> {
    items
        .iter()
        .map(|(key, list)| EffectiveCategory {
            key: key.to_string(),
            label: catalog.category_label(key),
            items: list.clone(),
        })
        .collect()
}

fn merge_into(merged: &mut Vec<EffectiveCategory>, catalog: &EventCatalog, items: &CategoryItems) {
    for (key, list) in items.iter() {
        let idx = match merged.iter().position(|cat| cat.key == *key) {
            Some(idx) => idx,
            None => {
                merged.push(EffectiveCategory {
                    key: key.to_string(),
                    label: catalog.category_label(key),
                    items: Vec::new(),
                });
                merged.len() - 1
            }
        };
        let target = &mut merged[idx].items;
        for item in list {
            let name = normalize_item_name(&item.name);
            if !target.iter().any(|t| normalize_item_name(&t.name) == name) {
                target.push(item.clone());
            }
        }
    }
}

/// Concrete days on which the room's effective list includes the item.
/// These are the slots an all-days projection reads from and writes to.
pub fn days_carrying_item(catalog: &EventCatalog, room_id: &str, item_name: &str) -> Vec<String> {
    let Some(room) = catalog.room(room_id) else {
        return Vec::new();
    };
    let wanted = normalize_item_name(item_name);
    catalog
        .days()
        .iter()
        .filter(|day| {
            day_items(room, day).is_some_and(|items| {
                items
                    .values()
                    .flatten()
                    .any(|item| normalize_item_name(&item.name) == wanted)
            })
        })
        .cloned()
        .collect()
}
