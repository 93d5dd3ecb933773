//! Renderer-facing views: map cells and room detail.

use serde::{Deserialize, Serialize};

use crate::catalog::{EventCatalog, Item, RoomType, Tag};
use crate::progress::{intensity_of, item_count, status_of, ItemCount, IntensityMode, RoomStatus};
use crate::resolver::resolve;
use crate::selector::DaySelector;
use crate::state::{CompletionLookup, CompletionState};

/// What the floor plan needs for one room shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomMapCell {
    pub room_id: String,
    /// Fill bucket 0–4.
    pub intensity: u8,
    /// "N items" label; `None` hides it.
    pub item_count: Option<u32>,
    /// Mini status bars; `None` hides them.
    pub status: Option<RoomStatus>,
}

/// Map cells for every room, in catalog order.
pub fn map_overview<L: CompletionLookup + ?Sized>(
    catalog: &EventCatalog,
    lookup: &L,
    selector: &DaySelector,
    mode: IntensityMode,
) -> Vec<RoomMapCell> {
    catalog
        .rooms()
        .map(|(room_id, _)| match resolve(catalog, room_id, selector) {
            None => RoomMapCell {
                room_id: room_id.to_string(),
                intensity: 0,
                item_count: None,
                status: None,
            },
            Some(room) => {
                let count = item_count(&room).distinct;
                RoomMapCell {
                    room_id: room_id.to_string(),
                    intensity: intensity_of(&room, lookup, mode),
                    item_count: (count > 0).then_some(count),
                    status: (count > 0).then(|| status_of(&room, lookup)),
                }
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistRow {
    pub item: Item,
    pub state: CompletionState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistSection {
    pub key: String,
    pub label: String,
    pub rows: Vec<ChecklistRow>,
}

/// Everything the room panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetail {
    pub room_id: String,
    pub name: String,
    pub room_type: RoomType,
    pub tags: Vec<Tag>,
    pub crew: Option<String>,
    pub notes: Option<String>,
    pub day_label: String,
    pub count: ItemCount,
    pub set_percent: u8,
    pub test_percent: u8,
    pub sections: Vec<ChecklistSection>,
}

pub fn room_detail<L: CompletionLookup + ?Sized>(
    catalog: &EventCatalog,
    lookup: &L,
    room_id: &str,
    selector: &DaySelector,
) -> Option<RoomDetail> {
    let room = resolve(catalog, room_id, selector)?;
    let status = status_of(&room, lookup);
    let sections = room
        .categories
        .iter()
        .map(|cat| ChecklistSection {
            key: cat.key.clone(),
            label: cat.label.clone(),
            rows: cat
                .items
                .iter()
                .map(|item| ChecklistRow {
                    state: lookup.completion(room.room_id, selector, &item.name),
                    item: item.clone(),
                })
                .collect(),
        })
        .collect();

    Some(RoomDetail {
        room_id: room.room_id.to_string(),
        name: room.room.name.clone(),
        room_type: room.room.room_type,
        tags: room.room.tags.clone(),
        crew: room.room.crew.clone(),
        notes: room.notes.map(str::to_string),
        day_label: catalog.day_label(selector),
        count: item_count(&room),
        set_percent: status.set.percent(),
        test_percent: status.test.percent(),
        sections,
    })
}
