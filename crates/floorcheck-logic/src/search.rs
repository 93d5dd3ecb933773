//! Gear search across rooms.
//!
//! Case-insensitive substring match over item name, model, note and flag.
//! A blank query matches nothing. Rooms come back in catalog order and only
//! when at least one item matched.

use crate::catalog::{EventCatalog, Item};
use crate::resolver::resolve_all_rooms;
use crate::selector::DaySelector;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit<'a> {
    pub room_id: &'a str,
    pub matches: Vec<Item>,
}

struct IndexedItem {
    item: Item,
    /// Lowercased searchable fields.
    fields: Vec<String>,
}

struct IndexedRoom<'a> {
    room_id: &'a str,
    items: Vec<IndexedItem>,
}

/// Searchable snapshot of every room resolved for one selector.
pub struct SearchIndex<'a> {
    selector: DaySelector,
    rooms: Vec<IndexedRoom<'a>>,
}

impl<'a> SearchIndex<'a> {
    pub fn build(catalog: &'a EventCatalog, selector: &DaySelector) -> Self {
        let rooms = resolve_all_rooms(catalog, selector)
            .into_iter()
            .map(|room| IndexedRoom {
                room_id: room.room_id,
                items: room
                    .item_list()
                    .map(|item| IndexedItem {
                        fields: [
                            Some(&item.name),
                            item.model.as_ref(),
                            item.note.as_ref(),
                            item.flag.as_ref(),
                        ]
                        .into_iter()
                        .flatten()
                        .map(|s| s.to_lowercase())
                        .collect(),
                        item: item.clone(),
                    })
                    .collect(),
            })
            .collect();
        Self {
            selector: selector.clone(),
            rooms,
        }
    }

    pub fn selector(&self) -> &DaySelector {
        &self.selector
    }

    pub fn search(&self, query: &str) -> Vec<SearchHit<'a>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.rooms
            .iter()
            .filter_map(|room| {
                let matches: Vec<Item> = room
                    .items
                    .iter()
                    .filter(|entry| entry.fields.iter().any(|f| f.contains(&needle)))
                    .map(|entry| entry.item.clone())
                    .collect();
                (!matches.is_empty()).then_some(SearchHit {
                    room_id: room.room_id,
                    matches,
                })
            })
            .collect()
    }
}

/// One-shot search without keeping the index.
pub fn search<'a>(catalog: &'a EventCatalog, query: &str, selector: &DaySelector) -> Vec<SearchHit<'a>> {
    SearchIndex::build(catalog, selector).search(query)
}

/// Matched items across all hits (the "N found" badge).
pub fn total_matches(hits: &[SearchHit]) -> usize {
    hits.iter().map(|hit| hit.matches.len()).sum()
}
