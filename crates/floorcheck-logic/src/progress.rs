//! Progress aggregation: gear load, completion percentages, pull sheet.
//!
//! Every figure here is total: empty inputs give 0 / 0%, never a division
//! by zero. Percentages count items, not quantities (six mics on one line
//! are one checkbox).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::EventCatalog;
use crate::resolver::{resolve, resolve_all_rooms, EffectiveRoom};
use crate::selector::DaySelector;
use crate::state::{CompletionLookup, Metric};

/// Gear-load thresholds on total quantity: upper bound of levels 1..=3.
const GEAR_LEVELS: [u32; 3] = [5, 12, 25];

/// Completion thresholds on percent: upper bound of levels 1..=3.
const PROGRESS_LEVELS: [u8; 3] = [25, 50, 75];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCount {
    /// Item lines.
    pub distinct: u32,
    /// Sum of quantities, saturating at `u32::MAX`.
    pub total_quantity: u32,
}

pub fn item_count(room: &EffectiveRoom) -> ItemCount {
    room.item_list().fold(ItemCount::default(), |acc, item| ItemCount {
        distinct: acc.distinct + 1,
        total_quantity: acc.total_quantity.saturating_add(item.qty),
    })
}

/// Map-fill bucket for gear load: 0, 1–5, 6–12, 13–25, >25.
pub fn intensity_level(total_quantity: u32) -> u8 {
    if total_quantity == 0 {
        return 0;
    }
    1 + GEAR_LEVELS.iter().filter(|&&t| total_quantity > t).count() as u8
}

/// Map-fill bucket for completion: 0, 1–25, 26–50, 51–75, 76–100.
pub fn progress_intensity(percent: u8) -> u8 {
    if percent == 0 {
        return 0;
    }
    1 + PROGRESS_LEVELS.iter().filter(|&&t| percent > t).count() as u8
}

/// `round(done / total * 100)`, halves rounding up; 0 when total is 0.
pub fn percent(done: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = u64::from(done.min(total));
    let total = u64::from(total);
    ((200 * done + total) / (2 * total)) as u8
}

/// Done-of-total for one flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub done: u32,
    pub total: u32,
}

impl Progress {
    pub fn percent(self) -> u8 {
        percent(self.done, self.total)
    }

    /// Unrounded 0.0–1.0, for bar widths.
    pub fn fraction(self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f32 / self.total as f32
        }
    }

    pub fn intensity(self) -> u8 {
        progress_intensity(self.percent())
    }
}

/// Set and test progress of one room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomStatus {
    pub set: Progress,
    pub test: Progress,
}

impl RoomStatus {
    pub fn get(self, metric: Metric) -> Progress {
        match metric {
            Metric::Set => self.set,
            Metric::Test => self.test,
        }
    }
}

/// Set/test counts over an already-resolved room.
pub fn status_of<L: CompletionLookup + ?Sized>(room: &EffectiveRoom, lookup: &L) -> RoomStatus {
    let mut status = RoomStatus::default();
    for item in room.item_list() {
        let state = lookup.completion(room.room_id, &room.selector, &item.name);
        status.set.total += 1;
        status.test.total += 1;
        status.set.done += u32::from(state.set);
        status.test.done += u32::from(state.test);
    }
    status
}

pub fn room_status<L: CompletionLookup + ?Sized>(
    catalog: &EventCatalog,
    lookup: &L,
    room_id: &str,
    selector: &DaySelector,
) -> Option<RoomStatus> {
    resolve(catalog, room_id, selector).map(|room| status_of(&room, lookup))
}

/// Progress of one flag for one room. `None` when the room does not resolve.
pub fn room_progress<L: CompletionLookup + ?Sized>(
    catalog: &EventCatalog,
    lookup: &L,
    room_id: &str,
    selector: &DaySelector,
    metric: Metric,
) -> Option<Progress> {
    room_status(catalog, lookup, room_id, selector).map(|s| s.get(metric))
}

/// What the map fill encodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityMode {
    /// Gear load by total quantity.
    #[default]
    Gear,
    /// Set completion.
    Setup,
    /// Test completion.
    Test,
}

/// Map-fill level for a room; unresolved rooms are 0.
pub fn room_intensity<L: CompletionLookup + ?Sized>(
    catalog: &EventCatalog,
    lookup: &L,
    room_id: &str,
    selector: &DaySelector,
    mode: IntensityMode,
) -> u8 {
    resolve(catalog, room_id, selector)
        .map(|room| intensity_of(&room, lookup, mode))
        .unwrap_or(0)
}

pub fn intensity_of<L: CompletionLookup + ?Sized>(
    room: &EffectiveRoom,
    lookup: &L,
    mode: IntensityMode,
) -> u8 {
    match mode {
        IntensityMode::Gear => intensity_level(item_count(room).total_quantity),
        IntensityMode::Setup => status_of(room, lookup).set.intensity(),
        IntensityMode::Test => status_of(room, lookup).test.intensity(),
    }
}

/// Event-wide progress rings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalProgress {
    pub total_items: u32,
    pub set_done: u32,
    pub test_done: u32,
    /// Both set and tested.
    pub ready_done: u32,
}

impl GlobalProgress {
    pub fn set_percent(&self) -> u8 {
        percent(self.set_done, self.total_items)
    }

    pub fn test_percent(&self) -> u8 {
        percent(self.test_done, self.total_items)
    }

    pub fn ready_percent(&self) -> u8 {
        percent(self.ready_done, self.total_items)
    }
}

pub fn global_progress<L: CompletionLookup + ?Sized>(
    catalog: &EventCatalog,
    lookup: &L,
    selector: &DaySelector,
) -> GlobalProgress {
    let mut totals = GlobalProgress::default();
    for room in resolve_all_rooms(catalog, selector) {
        for item in room.item_list() {
            let state = lookup.completion(room.room_id, selector, &item.name);
            totals.total_items += 1;
            totals.set_done += u32::from(state.set);
            totals.test_done += u32::from(state.test);
            totals.ready_done += u32::from(state.is_ready());
        }
    }
    totals
}

/// One distinct piece of gear across all rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullSheetRow {
    pub name: String,
    pub model: Option<String>,
    /// Rooms needing this item, in catalog order.
    pub rooms: Vec<String>,
    pub total_quantity: u32,
    /// Every room instance is set.
    pub all_set: bool,
    /// Every room instance is tested.
    pub all_tested: bool,
}

/// Distinct gear rows keyed by (name, model). Rows sort by lowercased name,
/// then exact name, then model; plain code-point order, not locale collation.
pub fn pull_sheet<L: CompletionLookup + ?Sized>(
    catalog: &EventCatalog,
    lookup: &L,
    selector: &DaySelector,
) -> Vec<PullSheetRow> {
    let mut rows: Vec<PullSheetRow> = Vec::new();
    let mut index: HashMap<(String, Option<String>), usize> = HashMap::new();

    for room in resolve_all_rooms(catalog, selector) {
        for item in room.item_list() {
            let state = lookup.completion(room.room_id, selector, &item.name);
            let key = (item.name.clone(), item.model.clone());
            let idx = *index.entry(key).or_insert_with(|| {
                rows.push(PullSheetRow {
                    name: item.name.clone(),
                    model: item.model.clone(),
                    rooms: Vec::new(),
                    total_quantity: 0,
                    all_set: true,
                    all_tested: true,
                });
                rows.len() - 1
            });
            let row = &mut rows[idx];
            if row.rooms.last().map(String::as_str) != Some(room.room_id) {
                row.rooms.push(room.room_id.to_string());
            }
            row.total_quantity = row.total_quantity.saturating_add(item.qty);
            row.all_set &= state.set;
            row.all_tested &= state.test;
        }
    }

    rows.sort_by_cached_key(|row| (row.name.to_lowercase(), row.name.clone(), row.model.clone()));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::state::{ChecklistState, CompletionState, ItemKey};

    fn day(d: &str) -> DaySelector {
        DaySelector::day(d)
    }

    #[test]
    fn gear_level_boundaries() {
        let cases = [(0, 0), (5, 1), (6, 2), (12, 2), (13, 3), (25, 3), (26, 4)];
        for (qty, level) in cases {
            assert_eq!(intensity_level(qty), level, "qty {qty}");
        }
        assert_eq!(intensity_level(1), 1);
        assert_eq!(intensity_level(500), 4);
    }

    #[test]
    fn huge_quantities_saturate() {
        let json = r#"{
          "event": { "name": "E", "venue": "V", "address": "A", "days": ["d1"], "defaultDay": "d1" },
          "rooms": {
            "dock": { "name": "Dock", "type": "service",
                      "schedule": { "d1": { "items": { "cables": [
                        { "name": "Zip Tie", "qty": 4294967295 },
                        { "name": "Gaff Tape", "qty": 1 } ] } } } },
            "stage": { "name": "Stage", "type": "studio",
                       "schedule": { "d1": { "items": { "cables": [
                        { "name": "Zip Tie", "qty": 10 } ] } } } }
          }
        }"#;
        let catalog = EventCatalog::from_json(json).unwrap();
        let dock = resolve(&catalog, "dock", &day("d1")).unwrap();
        let count = item_count(&dock);
        assert_eq!(count.distinct, 2);
        assert_eq!(count.total_quantity, u32::MAX);
        assert_eq!(intensity_level(count.total_quantity), 4);

        let rows = pull_sheet(&catalog, &ChecklistState::new(), &day("d1"));
        let zip = rows.iter().find(|r| r.name == "Zip Tie").unwrap();
        assert_eq!(zip.total_quantity, u32::MAX);
        assert_eq!(zip.rooms, vec!["dock", "stage"]);
    }

    #[test]
    fn gear_level_is_monotonic() {
        let mut prev = 0;
        for qty in 0..100 {
            let level = intensity_level(qty);
            assert!(level >= prev);
            prev = level;
        }
    }

    #[test]
    fn progress_level_boundaries() {
        let cases = [
            (0, 0),
            (25, 1),
            (26, 2),
            (50, 2),
            (51, 3),
            (75, 3),
            (76, 4),
            (100, 4),
        ];
        for (pct, level) in cases {
            assert_eq!(progress_intensity(pct), level, "pct {pct}");
        }
    }

    #[test]
    fn percent_rounds_half_up_and_is_total() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13); // 12.5 rounds up
        assert_eq!(percent(3, 3), 100);
        assert_eq!(Progress::default().fraction(), 0.0);
    }

    #[test]
    fn empty_override_counts_zero() {
        let catalog = fixtures::g2();
        let room = resolve(&catalog, "hall-s", &day("2/9")).unwrap();
        let count = item_count(&room);
        assert_eq!(count, ItemCount::default());
        assert_eq!(intensity_level(count.total_quantity), 0);
    }

    #[test]
    fn hall_gear_load() {
        let catalog = fixtures::g2();
        let room = resolve(&catalog, "hall", &day("2/10")).unwrap();
        let count = item_count(&room);
        assert_eq!(count.distinct, 17);
        assert_eq!(count.total_quantity, 25);
        let state = ChecklistState::new();
        assert_eq!(
            room_intensity(&catalog, &state, "hall", &day("2/10"), IntensityMode::Gear),
            3
        );
    }

    #[test]
    fn room_progress_counts_lines_not_quantity() {
        let catalog = fixtures::g2();
        let mut state = ChecklistState::new();
        // hub 2/11: five lines
        state.set(
            ItemKey::new("hub", day("2/11"), "Mixer"),
            CompletionState::new(true, false),
        );
        state.set(
            ItemKey::new("hub", day("2/11"), "Zoom Laptop"),
            CompletionState::new(true, true),
        );
        let set = room_progress(&catalog, &state, "hub", &day("2/11"), Metric::Set).unwrap();
        assert_eq!(set, Progress { done: 2, total: 5 });
        assert_eq!(set.percent(), 40);
        assert_eq!(set.intensity(), 2);
        let test = room_progress(&catalog, &state, "hub", &day("2/11"), Metric::Test).unwrap();
        assert_eq!(test.percent(), 20);
        assert_eq!(
            room_intensity(&catalog, &state, "hub", &day("2/11"), IntensityMode::Test),
            1
        );
    }

    #[test]
    fn unresolved_room_has_no_progress() {
        let catalog = fixtures::g2();
        let state = ChecklistState::new();
        assert!(room_progress(&catalog, &state, "ballroom", &day("2/10"), Metric::Set).is_none());
        assert_eq!(
            room_intensity(&catalog, &state, "ballroom", &day("2/10"), IntensityMode::Setup),
            0
        );
    }

    #[test]
    fn empty_room_progress_is_zero() {
        let catalog = fixtures::g2();
        let state = ChecklistState::new();
        let p = room_progress(&catalog, &state, "khan", &day("2/10"), Metric::Set).unwrap();
        assert_eq!(p.percent(), 0);
        assert_eq!(p.intensity(), 0);
    }

    #[test]
    fn global_rings_are_independent() {
        let catalog = fixtures::g2();
        let mut state = ChecklistState::new();
        state.set(
            ItemKey::new("elev", day("2/10"), "Extension Cord"),
            CompletionState::new(true, true),
        );
        state.set(
            ItemKey::new("elev", day("2/10"), "Power Strip"),
            CompletionState::new(true, false),
        );
        let g = global_progress(&catalog, &state, &day("2/10"));
        assert_eq!(g.set_done, 2);
        assert_eq!(g.test_done, 1);
        assert_eq!(g.ready_done, 1);
        assert!(g.total_items > 2);
        assert!(g.set_percent() >= g.ready_percent());
    }

    #[test]
    fn global_progress_on_empty_day_is_zero() {
        let json = r#"{
          "event": { "name": "E", "venue": "V", "address": "A", "days": ["d1"], "defaultDay": "d1" },
          "rooms": { "r": { "name": "R", "type": "gallery", "schedule": { "default": { "items": {} } } } }
        }"#;
        let catalog = EventCatalog::from_json(json).unwrap();
        let g = global_progress(&catalog, &ChecklistState::new(), &day("d1"));
        assert_eq!(g, GlobalProgress::default());
        assert_eq!(g.set_percent(), 0);
        assert_eq!(g.ready_percent(), 0);
    }

    #[test]
    fn pull_sheet_needs_every_instance_set() {
        let catalog = fixtures::g2();
        let sel = day("2/12");
        let mut state = ChecklistState::new();
        let rows = pull_sheet(&catalog, &state, &sel);
        let mixer = rows.iter().find(|r| r.name == "Mixer").unwrap();
        assert!(mixer.rooms.len() >= 3);

        let rooms = mixer.rooms.clone();
        for (i, room) in rooms.iter().enumerate() {
            let set = i + 1 < rooms.len();
            state.set(
                ItemKey::new(room.as_str(), sel.clone(), "Mixer"),
                CompletionState::new(set, false),
            );
        }
        let rows = pull_sheet(&catalog, &state, &sel);
        let mixer = rows.iter().find(|r| r.name == "Mixer").unwrap();
        assert!(!mixer.all_set);

        state.set(
            ItemKey::new(rooms.last().unwrap().as_str(), sel.clone(), "Mixer"),
            CompletionState::new(true, false),
        );
        let rows = pull_sheet(&catalog, &state, &sel);
        let mixer = rows.iter().find(|r| r.name == "Mixer").unwrap();
        assert!(mixer.all_set);
        assert!(!mixer.all_tested);
    }

    #[test]
    fn pull_sheet_sorted_case_insensitively() {
        let catalog = fixtures::g2();
        let rows = pull_sheet(&catalog, &ChecklistState::new(), &day("2/11"));
        let names: Vec<_> = rows.iter().map(|r| r.name.to_lowercase()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        // each (name, model) appears once
        let mut keys: Vec<_> = rows.iter().map(|r| (&r.name, &r.model)).collect();
        keys.dedup();
        assert_eq!(keys.len(), rows.len());
    }

    #[test]
    fn pull_sheet_ties_break_on_name_then_model() {
        let json = r#"{
          "event": { "name": "E", "venue": "V", "address": "A", "days": ["d1"], "defaultDay": "d1" },
          "rooms": {
            "r": { "name": "R", "type": "studio",
                   "schedule": { "d1": { "items": { "audio": [
                     { "name": "écran" },
                     { "name": "mic" },
                     { "name": "Zoom Bar" },
                     { "name": "Mic", "model": "SM58" },
                     { "name": "Mic" } ] } } } }
          }
        }"#;
        let catalog = EventCatalog::from_json(json).unwrap();
        let rows = pull_sheet(&catalog, &ChecklistState::new(), &day("d1"));
        let order: Vec<_> = rows.iter().map(|r| (r.name.as_str(), r.model.as_deref())).collect();
        assert_eq!(
            order,
            vec![
                ("Mic", None),
                ("Mic", Some("SM58")),
                ("mic", None),
                ("Zoom Bar", None),
                ("écran", None),
            ]
        );
    }

    #[test]
    fn pull_sheet_sums_quantity() {
        let catalog = fixtures::g2();
        let rows = pull_sheet(&catalog, &ChecklistState::new(), &day("2/11"));
        // wacker-st and adams-st each carry 4 boundary mics
        let boundary = rows.iter().find(|r| r.name == "Boundary Mic").unwrap();
        assert_eq!(boundary.rooms, vec!["wacker-st", "adams-st"]);
        assert_eq!(boundary.total_quantity, 8);
    }

    #[test]
    fn pull_sheet_splits_models() {
        let json = r#"{
          "event": { "name": "E", "venue": "V", "address": "A", "days": ["d1"], "defaultDay": "d1" },
          "rooms": {
            "a": { "name": "A", "type": "meeting",
                   "schedule": { "d1": { "items": { "video": [ { "name": "Camera", "model": "PTZ" } ] } } } },
            "b": { "name": "B", "type": "meeting",
                   "schedule": { "d1": { "items": { "video": [ { "name": "Camera" }, { "name": "adapter" } ] } } } }
          }
        }"#;
        let catalog = EventCatalog::from_json(json).unwrap();
        let rows = pull_sheet(&catalog, &ChecklistState::new(), &day("d1"));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name, "adapter");
        assert_eq!(rows[1].model, None);
        assert_eq!(rows[2].model.as_deref(), Some("PTZ"));
    }
}
