//! Flat TSV tables for spreadsheet seeding.
//!
//! Four tables: `event` (one row), `rooms`, `items` (default items use day
//! `*`), `schedule` (one row per room × schedule key with derived
//! use-default / active flags).

use crate::catalog::{CategoryItems, EventCatalog};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn file_name(&self) -> String {
        format!("{}.tsv", self.name)
    }

    pub fn to_tsv(&self) -> String {
        let mut out = self.headers.join("\t");
        out.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| clean_cell(c)).collect();
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
        out
    }
}

/// Tabs and newlines would break the row structure.
fn clean_cell(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

fn yn(flag: bool) -> String {
    let s = if flag { "Y" } else { "N" };
    s.to_string()
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

pub fn export_tables(catalog: &EventCatalog) -> Vec<Table> {
    vec![
        event_table(catalog),
        rooms_table(catalog),
        items_table(catalog),
        schedule_table(catalog),
    ]
}

pub fn event_table(catalog: &EventCatalog) -> Table {
    let ev = catalog.event();
    let labels = ev
        .days
        .iter()
        .filter_map(|d| ev.day_labels.get(d).map(|l| format!("{d}:{l}")))
        .collect::<Vec<_>>()
        .join("|");
    Table {
        name: "event",
        headers: vec!["event_name", "venue", "address", "days", "day_labels", "default_day"],
        rows: vec![vec![
            ev.name.clone(),
            ev.venue.clone(),
            ev.address.clone(),
            ev.days.join("|"),
            labels,
            ev.default_day.clone(),
        ]],
    }
}

pub fn rooms_table(catalog: &EventCatalog) -> Table {
    let rows = catalog
        .rooms()
        .map(|(id, room)| {
            let tags = room
                .tags
                .iter()
                .map(|t| format!("{}:{}", t.kind(), t.label()))
                .collect::<Vec<_>>()
                .join("|");
            vec![
                id.to_string(),
                room.name.clone(),
                room.room_type.as_str().to_string(),
                opt(&room.crew),
                tags,
            ]
        })
        .collect();
    Table {
        name: "rooms",
        headers: vec!["room_id", "name", "type", "crew", "tags"],
        rows,
    }
}

pub fn items_table(catalog: &EventCatalog) -> Table {
    let mut rows = Vec::new();
    for (room_id, room) in catalog.rooms() {
        if let Some(items) = &room.default_items {
            push_item_rows(&mut rows, room_id, "*", items);
        }
        for (day, entry) in room.schedule.iter() {
            // inheriting entries and explicit-empty overrides add no rows
            if let Some(items) = &entry.items {
                push_item_rows(&mut rows, room_id, day, items);
            }
        }
    }
    Table {
        name: "items",
        headers: vec![
            "room_id",
            "day",
            "category",
            "name",
            "qty",
            "location",
            "source",
            "note",
            "flag",
            "sort_order",
        ],
        rows,
    }
}

fn push_item_rows(rows: &mut Vec<Vec<String>>, room_id: &str, day: &str, items: &CategoryItems) {
    let flat = items
        .iter()
        .flat_map(|(cat, list)| list.iter().map(move |item| (cat, item)));
    for (sort, (cat, item)) in flat.enumerate() {
        rows.push(vec![
            room_id.to_string(),
            day.to_string(),
            cat.to_string(),
            item.name.clone(),
            item.qty.to_string(),
            opt(&item.location),
            opt(&item.source),
            opt(&item.note),
            opt(&item.flag),
            sort.to_string(),
        ]);
    }
}

pub fn schedule_table(catalog: &EventCatalog) -> Table {
    let mut rows = Vec::new();
    for (room_id, room) in catalog.rooms() {
        let has_defaults = room.default_items.as_ref().is_some_and(|d| !d.is_empty());
        for (day, entry) in room.schedule.iter() {
            let use_defaults = entry.items.is_none() && has_defaults;
            let explicit_gear = entry.items.as_ref().is_some_and(|i| !i.is_empty());
            rows.push(vec![
                room_id.to_string(),
                day.to_string(),
                opt(&entry.notes),
                yn(use_defaults),
                yn(use_defaults || explicit_gear),
            ]);
        }
    }
    Table {
        name: "schedule",
        headers: vec!["room_id", "day", "notes", "use_default_items", "active"],
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn event_row() {
        let catalog = fixtures::g2();
        let table = event_table(&catalog);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][3], "2/9|2/10|2/11|2/12");
        assert!(table.rows[0][4].starts_with("2/9:Sun · Load-In|2/10:"));
        assert_eq!(table.rows[0][5], "2/10");
    }

    #[test]
    fn room_tags_flatten() {
        let catalog = fixtures::g2();
        let table = rooms_table(&catalog);
        assert_eq!(table.rows.len(), 17);
        assert_eq!(
            table.rows[0][4],
            "crew:V1: Emmett|crew:A1: Danny|zoom:Zoom|vendor:Hartford"
        );
        assert_eq!(table.rows[0][3], "V1 Emmett, A1 Danny");
    }

    #[test]
    fn items_use_star_for_defaults() {
        let catalog = fixtures::g2();
        let table = items_table(&catalog);
        let hall: Vec<_> = table.rows.iter().filter(|r| r[0] == "hall").collect();
        assert_eq!(hall.len(), 17);
        assert!(hall.iter().all(|r| r[1] == "*"));
        assert_eq!(hall[16][9], "16");

        let hall_s: Vec<_> = table.rows.iter().filter(|r| r[0] == "hall-s").collect();
        assert_eq!(hall_s.len(), 5);
        assert!(hall_s.iter().all(|r| r[1] == "2/12"));
        assert_eq!(hall_s[0][9], "0");
    }

    #[test]
    fn schedule_flags() {
        let catalog = fixtures::g2();
        let table = schedule_table(&catalog);
        let row = |room: &str, day: &str| {
            table
                .rows
                .iter()
                .find(|r| r[0] == room && r[1] == day)
                .cloned()
                .unwrap()
        };
        assert_eq!(row("hub", "2/9")[3..], ["N", "N"]);
        assert_eq!(row("hub", "2/11")[3..], ["Y", "Y"]);
        assert_eq!(row("hall-s", "2/12")[3..], ["N", "Y"]);
        assert_eq!(row("forum-s", "default")[3..], ["N", "N"]);
    }

    #[test]
    fn tsv_has_header_and_clean_cells() {
        let table = Table {
            name: "t",
            headers: vec!["a", "b"],
            rows: vec![vec!["x\ty".into(), "line\nbreak".into()]],
        };
        assert_eq!(table.to_tsv(), "a\tb\nx y\tline break\n");
        assert_eq!(table.file_name(), "t.tsv");
    }
}
