//! Event catalog: rooms, per-day schedules, gear items, tags.
//!
//! The catalog is loaded once from JSON and never mutated. Loading runs
//! [`validate_catalog`] and refuses the whole document if any entry breaks
//! the resolver's contract, so lookups never have to re-check structure.
//!
//! ```
//! use floorcheck_logic::catalog::EventCatalog;
//!
//! let json = r#"{
//!   "event": { "name": "Demo", "venue": "Hall", "address": "1 Main St",
//!              "days": ["d1"], "defaultDay": "d1" },
//!   "rooms": { "r1": { "name": "Room 1", "type": "meeting",
//!                      "schedule": { "default": { "items": {} } } } }
//! }"#;
//! let catalog = EventCatalog::from_json(json).unwrap();
//! assert!(catalog.room("r1").is_some());
//! assert!(catalog.room("nope").is_none());
//! ```

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::selector::{DaySelector, ALL_DAYS, DEFAULT_ENTRY};

/// Gear grouped by category key, in authoring order.
pub type CategoryItems = IndexMap<String, Vec<Item>>;

/// Top-level event description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    pub name: String,
    pub venue: String,
    pub address: String,
    /// Ordered day ids.
    pub days: Vec<String>,
    #[serde(default)]
    pub day_labels: HashMap<String, String>,
    pub default_day: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Meeting,
    Studio,
    Gallery,
    Service,
}

impl RoomType {
    pub fn as_str(self) -> &'static str {
        match self {
            RoomType::Meeting => "meeting",
            RoomType::Studio => "studio",
            RoomType::Gallery => "gallery",
            RoomType::Service => "service",
        }
    }
}

/// Room badge. Authored as a `[kind, label]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "(String, String)", into = "(String, String)")]
pub enum Tag {
    Crew(String),
    Zoom(String),
    Vendor(String),
    /// Room only runs on some days (e.g. "2/12 only").
    DayRestriction(String),
}

impl Tag {
    pub fn kind(&self) -> &'static str {
        match self {
            Tag::Crew(_) => "crew",
            Tag::Zoom(_) => "zoom",
            Tag::Vendor(_) => "vendor",
            Tag::DayRestriction(_) => "day",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Tag::Crew(l) | Tag::Zoom(l) | Tag::Vendor(l) | Tag::DayRestriction(l) => l,
        }
    }
}

impl TryFrom<(String, String)> for Tag {
    type Error = String;

    fn try_from((kind, label): (String, String)) -> Result<Self, Self::Error> {
        match kind.as_str() {
            "crew" => Ok(Tag::Crew(label)),
            "zoom" => Ok(Tag::Zoom(label)),
            "vendor" => Ok(Tag::Vendor(label)),
            "day" => Ok(Tag::DayRestriction(label)),
            other => Err(format!("unknown tag kind `{other}` (label `{label}`)")),
        }
    }
}

impl From<Tag> for (String, String) {
    fn from(tag: Tag) -> Self {
        let kind = tag.kind().to_string();
        match tag {
            Tag::Crew(l) | Tag::Zoom(l) | Tag::Vendor(l) | Tag::DayRestriction(l) => (kind, l),
        }
    }
}

fn default_qty() -> u32 {
    1
}

/// A single line of gear. Static: items only ever come from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Display name; also the identity used for checklist state.
    pub name: String,
    #[serde(default = "default_qty")]
    pub qty: u32,
    #[serde(rename = "loc", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "src", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Urgent note (shown in red).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    /// Model or variant; separates pull-sheet rows that share a name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Item {
    pub fn new(name: impl Into<String>, qty: u32) -> Self {
        Self {
            name: name.into(),
            qty,
            location: None,
            source: None,
            note: None,
            flag: None,
            model: None,
        }
    }
}

/// One schedule slot.
///
/// `items: None` inherits the room's `defaultItems`; `items: Some(empty)`
/// means "explicitly no gear" and must not fall back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<CategoryItems>,
}

/// Which schedule key matched a concrete day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntrySource {
    Exact,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crew: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_items: Option<CategoryItems>,
    #[serde(default)]
    pub schedule: IndexMap<String, DayEntry>,
}

impl Room {
    /// Schedule entry for a concrete day: exact key first, then `default`.
    pub fn entry_for(&self, day: &str) -> Option<(&DayEntry, EntrySource)> {
        if let Some(entry) = self.schedule.get(day) {
            return Some((entry, EntrySource::Exact));
        }
        self.schedule
            .get(DEFAULT_ENTRY)
            .map(|entry| (entry, EntrySource::Default))
    }

    /// Items in effect for a schedule entry, applying the override rule.
    pub fn items_for<'a>(&'a self, entry: &'a DayEntry) -> Option<&'a CategoryItems> {
        entry.items.as_ref().or(self.default_items.as_ref())
    }
}

/// Built-in display labels for the usual gear categories.
const CATEGORY_LABELS: &[(&str, &str)] = &[
    ("audio", "Audio"),
    ("video", "Video"),
    ("control", "Control"),
    ("presentation", "Presentation"),
    ("cables", "Cables"),
];

/// The full, validated event description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCatalog {
    event: EventInfo,
    rooms: IndexMap<String, Room>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    category_labels: HashMap<String, String>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed catalog ({} issue(s)): {}", .0.len(), join_issues(.0))]
    Malformed(Vec<CatalogIssue>),
}

fn join_issues(issues: &[CatalogIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A single structural problem found at load time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogIssue {
    #[error("room `{room}` day `{day}` has no items and the room has no defaultItems")]
    MissingItems { room: String, day: String },
    #[error("room `{room}` schedules unknown day `{day}`")]
    UnknownScheduleDay { room: String, day: String },
    #[error("room `{room}` ({scope}) item `{item}` has quantity 0")]
    ZeroQuantity {
        room: String,
        scope: String,
        item: String,
    },
    #[error("room `{room}` ({scope}) has an item with an empty name")]
    EmptyItemName { room: String, scope: String },
    #[error("room `{0}` has an empty name")]
    EmptyRoomName(String),
    #[error("default day `{0}` is not an event day")]
    UnknownDefaultDay(String),
    #[error("day id `{0}` is reserved")]
    ReservedDayId(String),
    #[error("day id `{0}` is listed more than once")]
    DuplicateDay(String),
}

impl EventCatalog {
    /// Parse and validate. Any structural issue rejects the whole catalog.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: EventCatalog = serde_json::from_str(json)?;
        let issues = validate_catalog(&catalog);
        if !issues.is_empty() {
            return Err(CatalogError::Malformed(issues));
        }
        Ok(catalog)
    }

    pub fn event(&self) -> &EventInfo {
        &self.event
    }

    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// Room lookup that also hands back the catalog-owned id.
    pub fn room_entry(&self, id: &str) -> Option<(&str, &Room)> {
        self.rooms
            .get_key_value(id)
            .map(|(k, room)| (k.as_str(), room))
    }

    /// Rooms in catalog order.
    pub fn rooms(&self) -> impl Iterator<Item = (&str, &Room)> {
        self.rooms.iter().map(|(k, room)| (k.as_str(), room))
    }

    pub fn all_room_ids(&self) -> Vec<&str> {
        self.rooms.keys().map(String::as_str).collect()
    }

    pub fn days(&self) -> &[String] {
        &self.event.days
    }

    pub fn has_day(&self, day: &str) -> bool {
        self.event.days.iter().any(|d| d == day)
    }

    /// True for `All` and for any listed day.
    pub fn knows(&self, selector: &DaySelector) -> bool {
        match selector {
            DaySelector::All => true,
            DaySelector::Day(id) => self.has_day(id),
        }
    }

    pub fn default_selector(&self) -> DaySelector {
        DaySelector::day(self.event.default_day.clone())
    }

    pub fn day_label(&self, selector: &DaySelector) -> String {
        match selector {
            DaySelector::All => "All Days".to_string(),
            DaySelector::Day(id) => self
                .event
                .day_labels
                .get(id)
                .cloned()
                .unwrap_or_else(|| id.clone()),
        }
    }

    pub fn category_label(&self, key: &str) -> String {
        if let Some(label) = self.category_labels.get(key) {
            return label.clone();
        }
        if let Some((_, label)) = CATEGORY_LABELS.iter().find(|(k, _)| *k == key) {
            return label.to_string();
        }
        title_case(key)
    }
}

fn title_case(key: &str) -> String {
    key.split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check every structural rule, returning all issues found.
pub fn validate_catalog(catalog: &EventCatalog) -> Vec<CatalogIssue> {
    let mut issues = Vec::new();
    let days = &catalog.event.days;

    let mut duplicates: Vec<&String> = Vec::new();
    for (i, day) in days.iter().enumerate() {
        if day == ALL_DAYS || day == DEFAULT_ENTRY {
            issues.push(CatalogIssue::ReservedDayId(day.clone()));
        }
        if days[..i].contains(day) && !duplicates.contains(&day) {
            duplicates.push(day);
            issues.push(CatalogIssue::DuplicateDay(day.clone()));
        }
    }
    if !days.contains(&catalog.event.default_day) {
        issues.push(CatalogIssue::UnknownDefaultDay(
            catalog.event.default_day.clone(),
        ));
    }

    for (room_id, room) in catalog.rooms() {
        if room.name.trim().is_empty() {
            issues.push(CatalogIssue::EmptyRoomName(room_id.to_string()));
        }
        if let Some(items) = &room.default_items {
            check_items(room_id, "defaultItems", items, &mut issues);
        }
        for (day, entry) in room.schedule.iter() {
            if day != DEFAULT_ENTRY && !days.iter().any(|d| d == day) {
                issues.push(CatalogIssue::UnknownScheduleDay {
                    room: room_id.to_string(),
                    day: day.to_string(),
                });
            }
            match &entry.items {
                Some(items) => check_items(room_id, day, items, &mut issues),
                None if room.default_items.is_none() => {
                    issues.push(CatalogIssue::MissingItems {
                        room: room_id.to_string(),
                        day: day.to_string(),
                    });
                }
                None => {}
            }
        }
    }

    issues
}

fn check_items(room_id: &str, scope: &str, items: &CategoryItems, issues: &mut Vec<CatalogIssue>) {
    for item in items.values().flatten() {
        if item.name.trim().is_empty() {
            issues.push(CatalogIssue::EmptyItemName {
                room: room_id.to_string(),
                scope: scope.to_string(),
            });
        } else if item.qty == 0 {
            issues.push(CatalogIssue::ZeroQuantity {
                room: room_id.to_string(),
                scope: scope.to_string(),
                item: item.name.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn minimal(rooms: &str) -> String {
        format!(
            r#"{{
              "event": {{ "name": "E", "venue": "V", "address": "A",
                          "days": ["d1", "d2"], "defaultDay": "d1" }},
              "rooms": {rooms}
            }}"#
        )
    }

    #[test]
    fn g2_catalog_loads() {
        let catalog = fixtures::g2();
        assert_eq!(catalog.event().name, "G2 Conference");
        assert_eq!(catalog.days(), &["2/9", "2/10", "2/11", "2/12"]);
        assert_eq!(catalog.all_room_ids().len(), 17);
        assert_eq!(catalog.all_room_ids()[0], "hall");
        assert_eq!(catalog.default_selector(), DaySelector::day("2/10"));
    }

    #[test]
    fn missing_room_is_absent() {
        let catalog = fixtures::g2();
        assert!(catalog.room("ballroom").is_none());
        assert!(catalog.room_entry("hub").is_some());
    }

    #[test]
    fn document_key_order_survives_load_and_save() {
        let json = minimal(
            r#"{ "zeta": { "name": "Z", "type": "studio",
                           "defaultItems": { "video": [ { "name": "Monitor" } ],
                                             "audio": [ { "name": "Mic" } ],
                                             "cables": [ { "name": "XLR" } ] },
                           "schedule": { "default": {}, "d1": {} } },
                 "alpha": { "name": "A", "type": "meeting",
                            "schedule": { "d1": { "items": {} } } } }"#,
        );
        let catalog = EventCatalog::from_json(&json).unwrap();
        assert_eq!(catalog.all_room_ids(), vec!["zeta", "alpha"]);

        let zeta = catalog.room("zeta").unwrap();
        let keys: Vec<_> = zeta.default_items.as_ref().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["video", "audio", "cables"]);
        let days: Vec<_> = zeta.schedule.keys().map(String::as_str).collect();
        assert_eq!(days, vec!["default", "d1"]);

        let again = EventCatalog::from_json(&serde_json::to_string(&catalog).unwrap()).unwrap();
        assert_eq!(again, catalog);
        assert_eq!(again.all_room_ids(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn tags_decode_into_enum() {
        let catalog = fixtures::g2();
        let hall = catalog.room("hall").unwrap();
        assert_eq!(hall.tags[0], Tag::Crew("V1: Emmett".into()));
        assert_eq!(hall.tags[2], Tag::Zoom("Zoom".into()));
        assert_eq!(hall.tags[3], Tag::Vendor("Hartford".into()));
        let hall_s = catalog.room("hall-s").unwrap();
        assert_eq!(hall_s.tags[0], Tag::DayRestriction("2/12 only".into()));
        assert_eq!(hall_s.tags[0].kind(), "day");
    }

    #[test]
    fn unknown_tag_kind_rejected() {
        let json = minimal(
            r#"{ "r": { "name": "R", "type": "studio", "tags": [["laser", "x"]],
                        "schedule": { "default": { "items": {} } } } }"#,
        );
        assert!(matches!(
            EventCatalog::from_json(&json),
            Err(CatalogError::Json(_))
        ));
    }

    #[test]
    fn qty_defaults_to_one() {
        let item: Item = serde_json::from_str(r#"{ "name": "HDMI" }"#).unwrap();
        assert_eq!(item.qty, 1);
        assert!(item.location.is_none());
    }

    #[test]
    fn entry_without_items_needs_defaults() {
        let json = minimal(
            r#"{ "r": { "name": "R", "type": "meeting",
                        "schedule": { "d1": { "notes": "oops" } } } }"#,
        );
        match EventCatalog::from_json(&json) {
            Err(CatalogError::Malformed(issues)) => {
                assert_eq!(
                    issues,
                    vec![CatalogIssue::MissingItems {
                        room: "r".into(),
                        day: "d1".into()
                    }]
                );
            }
            other => panic!("expected malformed catalog, got {other:?}"),
        }
    }

    #[test]
    fn collects_every_issue() {
        let json = r#"{
          "event": { "name": "E", "venue": "V", "address": "A",
                     "days": ["d1", "all", "d1"], "defaultDay": "d9" },
          "rooms": {
            "r": { "name": " ", "type": "gallery",
                   "defaultItems": { "audio": [ { "name": "Mixer", "qty": 0 } ] },
                   "schedule": { "d7": {}, "d1": { "items": { "video": [ { "name": "" } ] } } } }
          }
        }"#;
        let Err(CatalogError::Malformed(issues)) = EventCatalog::from_json(json) else {
            panic!("expected malformed catalog");
        };
        assert!(issues.contains(&CatalogIssue::ReservedDayId("all".into())));
        assert!(issues.contains(&CatalogIssue::DuplicateDay("d1".into())));
        assert!(issues.contains(&CatalogIssue::UnknownDefaultDay("d9".into())));
        assert!(issues.contains(&CatalogIssue::EmptyRoomName("r".into())));
        assert!(issues.contains(&CatalogIssue::UnknownScheduleDay {
            room: "r".into(),
            day: "d7".into()
        }));
        assert!(issues.iter().any(|i| matches!(i, CatalogIssue::ZeroQuantity { .. })));
        assert!(issues.iter().any(|i| matches!(i, CatalogIssue::EmptyItemName { .. })));
        assert_eq!(issues.len(), 7);
    }

    #[test]
    fn category_labels() {
        let catalog = fixtures::g2();
        assert_eq!(catalog.category_label("audio"), "Audio");
        assert_eq!(catalog.category_label("lighting_rig"), "Lighting Rig");
        assert_eq!(catalog.category_label("power-dist"), "Power Dist");
    }

    #[test]
    fn day_labels_fall_back_to_id() {
        let catalog = fixtures::g2();
        assert_eq!(catalog.day_label(&DaySelector::day("2/9")), "Sun · Load-In");
        assert_eq!(catalog.day_label(&DaySelector::All), "All Days");
        assert_eq!(catalog.day_label(&DaySelector::day("3/1")), "3/1");
    }

    #[test]
    fn entry_for_falls_back_to_default() {
        let catalog = fixtures::g2();
        let forum_s = catalog.room("forum-s").unwrap();
        let (entry, source) = forum_s.entry_for("2/12").unwrap();
        assert_eq!(source, EntrySource::Default);
        assert_eq!(entry.notes.as_deref(), Some("No gear assigned."));
        let (_, source) = forum_s.entry_for("2/10").unwrap();
        assert_eq!(source, EntrySource::Exact);
    }

    #[test]
    fn catalog_round_trips_through_json() {
        let catalog = fixtures::g2();
        let json = serde_json::to_string(&catalog).unwrap();
        let again = EventCatalog::from_json(&json).unwrap();
        assert_eq!(catalog, again);
    }
}
