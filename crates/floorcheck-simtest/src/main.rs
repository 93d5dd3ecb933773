//! Floorcheck Headless Harness
//!
//! Loads an event catalog and sweeps every checklist rule over it: resolver
//! contract, thresholds, progress, pull sheet, search, storage and export.
//! Runs entirely in-process, no renderer.
//!
//! Usage:
//!   cargo run -p floorcheck-simtest
//!   cargo run -p floorcheck-simtest -- --verbose
//!   cargo run -p floorcheck-simtest -- --data event.json --export out/

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use floorcheck_core::prelude::*;
use floorcheck_logic::catalog::CatalogError;
use floorcheck_logic::export::export_tables;
use floorcheck_logic::progress::{
    global_progress, intensity_level, item_count, percent, progress_intensity, pull_sheet,
};
use floorcheck_logic::resolver::{resolve, resolve_all_rooms};
use floorcheck_logic::search::{search, total_matches};
use floorcheck_logic::selector::DEFAULT_ENTRY;
use floorcheck_logic::state::{ChecklistState, ItemKey};
use log::{error, info};

// ── Reference event (same JSON the tests use) ───────────────────────────
const EVENT_JSON: &str = include_str!("../../../data/g2-conference.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn check(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

struct Args {
    verbose: bool,
    data: Option<PathBuf>,
    export: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut args = Args {
        verbose: false,
        data: None,
        export: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--verbose" => args.verbose = true,
            "--data" => args.data = iter.next().map(PathBuf::from),
            "--export" => args.export = iter.next().map(PathBuf::from),
            other => eprintln!("ignoring unknown argument `{other}`"),
        }
    }
    args
}

fn main() {
    let args = parse_args();
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    println!("=== Floorcheck Harness ===\n");

    let json = match &args.data {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                error!("cannot read {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => EVENT_JSON.to_string(),
    };

    let mut results = Vec::new();

    // 1. Catalog load + validation
    let catalog = match load_catalog(&json, &mut results) {
        Some(c) => c,
        None => finish(results, args.verbose),
    };

    // 2. Resolver contract
    results.extend(validate_resolver(&catalog, args.verbose));

    // 3. Threshold tables
    results.extend(validate_thresholds(args.verbose));

    // 4. Progress rings
    results.extend(validate_progress(&catalog, args.verbose));

    // 5. Pull sheet
    results.extend(validate_pull_sheet(&catalog, args.verbose));

    // 6. Search
    results.extend(validate_search(&catalog, args.verbose));

    // 7. Storage
    results.extend(validate_storage(&json, args.verbose));

    // 8. Export
    results.extend(validate_export(&catalog, args.export.as_deref()));

    finish(results, args.verbose)
}

fn finish(results: Vec<TestResult>, verbose: bool) -> ! {
    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!("\n=== RESULT: {}/{} passed, {} failed ===", passed, total, failed);

    std::process::exit(if failed > 0 { 1 } else { 0 })
}

// ── 1. Catalog ──────────────────────────────────────────────────────────

fn load_catalog(json: &str, results: &mut Vec<TestResult>) -> Option<EventCatalog> {
    println!("--- Catalog ---");
    let catalog = match EventCatalog::from_json(json) {
        Ok(c) => c,
        Err(CatalogError::Malformed(issues)) => {
            for issue in &issues {
                error!("catalog issue: {issue}");
            }
            results.push(TestResult::check(
                "catalog_valid",
                false,
                format!("{} issue(s), first: {}", issues.len(), issues[0]),
            ));
            return None;
        }
        Err(e) => {
            results.push(TestResult::check("catalog_parse", false, e.to_string()));
            return None;
        }
    };

    let event = catalog.event();
    let rooms = catalog.all_room_ids().len();
    println!("  {} @ {}: {} rooms, {} days", event.name, event.venue, rooms, event.days.len());
    results.push(TestResult::check("catalog_valid", true, format!("{rooms} rooms")));
    results.push(TestResult::check(
        "catalog_has_rooms",
        rooms > 0,
        format!("{rooms} rooms"),
    ));
    results.push(TestResult::check(
        "default_day_known",
        catalog.has_day(&event.default_day),
        event.default_day.clone(),
    ));
    let unlabeled: Vec<_> = event
        .days
        .iter()
        .filter(|d| !event.day_labels.contains_key(d.as_str()))
        .cloned()
        .collect();
    results.push(TestResult::check(
        "day_labels_complete",
        unlabeled.is_empty(),
        format!("unlabeled: {unlabeled:?}"),
    ));
    Some(catalog)
}

// ── 2. Resolver ─────────────────────────────────────────────────────────

fn validate_resolver(catalog: &EventCatalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Resolver ---");
    let mut results = Vec::new();

    // absent iff no entry for the day and no default entry
    let mut mismatches = Vec::new();
    let mut in_use = 0;
    for (room_id, room) in catalog.rooms() {
        for day in catalog.days() {
            let expected = room.schedule.contains_key(day) || room.schedule.contains_key(DEFAULT_ENTRY);
            let resolved = resolve(catalog, room_id, &DaySelector::day(day.as_str()));
            if resolved.is_some() != expected {
                mismatches.push(format!("{room_id}@{day}"));
            }
            if resolved.is_some_and(|r| !r.is_empty()) {
                in_use += 1;
            }
        }
    }
    results.push(TestResult::check(
        "resolve_absent_iff_unscheduled",
        mismatches.is_empty(),
        format!("{} room-days with gear, mismatches: {mismatches:?}", in_use),
    ));

    // all-days resolves everything with a schedule, items deduplicated
    let all = resolve_all_rooms(catalog, &DaySelector::All);
    let scheduled = catalog.rooms().filter(|(_, r)| !r.schedule.is_empty()).count();
    results.push(TestResult::check(
        "all_days_resolves_scheduled_rooms",
        all.len() == scheduled,
        format!("{} of {scheduled}", all.len()),
    ));

    let mut dupes = Vec::new();
    for room in &all {
        let mut seen = HashSet::new();
        for item in room.item_list() {
            if !seen.insert(ItemKey::new(room.room_id, DaySelector::All, &item.name).item) {
                dupes.push(format!("{}:{}", room.room_id, item.name));
            }
        }
        if verbose {
            println!("  {:<12} {:>3} items", room.room_id, room.item_len());
        }
    }
    results.push(TestResult::check(
        "all_days_union_has_no_duplicates",
        dupes.is_empty(),
        format!("{dupes:?}"),
    ));

    results.push(TestResult::check(
        "unknown_day_is_absent",
        catalog
            .all_room_ids()
            .iter()
            .all(|id| resolve(catalog, id, &DaySelector::day("no-such-day")).is_none()),
        "every room",
    ));

    results
}

// ── 3. Thresholds ───────────────────────────────────────────────────────

fn validate_thresholds(_verbose: bool) -> Vec<TestResult> {
    println!("--- Thresholds ---");
    let mut results = Vec::new();

    let gear: Vec<u8> = [0, 5, 6, 12, 13, 25, 26].into_iter().map(intensity_level).collect();
    results.push(TestResult::check(
        "gear_intensity_boundaries",
        gear == [0, 1, 2, 3, 3, 4, 4],
        format!("{gear:?}"),
    ));

    let monotonic = (0..200u32)
        .map(intensity_level)
        .collect::<Vec<_>>()
        .windows(2)
        .all(|w| w[0] <= w[1]);
    results.push(TestResult::check("gear_intensity_monotonic", monotonic, "0..200"));

    let prog: Vec<u8> = [0, 25, 26, 50, 51, 75, 76, 100]
        .into_iter()
        .map(progress_intensity)
        .collect();
    results.push(TestResult::check(
        "progress_intensity_boundaries",
        prog == [0, 1, 2, 2, 3, 3, 4, 4],
        format!("{prog:?}"),
    ));

    results.push(TestResult::check(
        "percent_is_total",
        percent(0, 0) == 0 && percent(1, 3) == 33 && percent(2, 3) == 67 && percent(1, 2) == 50,
        format!("0/0={} 1/3={} 2/3={}", percent(0, 0), percent(1, 3), percent(2, 3)),
    ));

    results
}

// ── 4. Progress ─────────────────────────────────────────────────────────

fn check_everything(catalog: &EventCatalog, day: &DaySelector) -> ChecklistState {
    let mut state = ChecklistState::new();
    for room in resolve_all_rooms(catalog, day) {
        for item in room.item_list() {
            state.set(
                ItemKey::new(room.room_id, day.clone(), &item.name),
                CompletionState::new(true, true),
            );
        }
    }
    state
}

fn validate_progress(catalog: &EventCatalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Progress ---");
    let mut results = Vec::new();
    let empty = ChecklistState::new();

    for day in catalog.days() {
        let sel = DaySelector::day(day.as_str());
        let blank = global_progress(catalog, &empty, &sel);
        let full = global_progress(catalog, &check_everything(catalog, &sel), &sel);
        let label = catalog.day_label(&sel);
        if verbose {
            println!("  {label:<28} {:>4} items", full.total_items);
        }
        results.push(TestResult::check(
            &format!("progress_blank_{day}"),
            blank.set_percent() == 0 && blank.ready_percent() == 0,
            format!("{} items", blank.total_items),
        ));
        let expect_full = if full.total_items == 0 { 0 } else { 100 };
        results.push(TestResult::check(
            &format!("progress_full_{day}"),
            full.set_percent() == expect_full
                && full.test_percent() == expect_full
                && full.ready_percent() == expect_full,
            format!(
                "{}/{}/{}% of {}",
                full.set_percent(),
                full.test_percent(),
                full.ready_percent(),
                full.total_items
            ),
        ));
    }

    // gear load stays inside 0..=4 for every room-day
    let mut out_of_range = Vec::new();
    for day in catalog.days() {
        for room in resolve_all_rooms(catalog, &DaySelector::day(day.as_str())) {
            let level = intensity_level(item_count(&room).total_quantity);
            if level > 4 {
                out_of_range.push(format!("{}@{day}", room.room_id));
            }
        }
    }
    results.push(TestResult::check(
        "gear_levels_in_range",
        out_of_range.is_empty(),
        format!("{out_of_range:?}"),
    ));

    results
}

// ── 5. Pull sheet ───────────────────────────────────────────────────────

fn validate_pull_sheet(catalog: &EventCatalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Pull Sheet ---");
    let mut results = Vec::new();
    let sel = catalog.default_selector();
    let rows = pull_sheet(catalog, &ChecklistState::new(), &sel);

    let sorted = rows
        .windows(2)
        .all(|w| w[0].name.to_lowercase() <= w[1].name.to_lowercase());
    results.push(TestResult::check(
        "pull_sheet_sorted",
        sorted,
        format!("{} rows", rows.len()),
    ));

    let mut keys = HashSet::new();
    let unique = rows.iter().all(|r| keys.insert((r.name.clone(), r.model.clone())));
    results.push(TestResult::check("pull_sheet_unique_keys", unique, ""));

    let rooms_unique = rows.iter().all(|r| {
        let set: HashSet<_> = r.rooms.iter().collect();
        set.len() == r.rooms.len()
    });
    results.push(TestResult::check("pull_sheet_rooms_deduplicated", rooms_unique, ""));

    let sheet_qty: u64 = rows.iter().map(|r| u64::from(r.total_quantity)).sum();
    let room_qty: u64 = resolve_all_rooms(catalog, &sel)
        .iter()
        .map(|r| u64::from(item_count(r).total_quantity))
        .sum();
    results.push(TestResult::check(
        "pull_sheet_quantity_matches_rooms",
        sheet_qty == room_qty,
        format!("{sheet_qty} vs {room_qty}"),
    ));

    let none_set = rows.iter().all(|r| !r.all_set && !r.all_tested);
    let full = pull_sheet(catalog, &check_everything(catalog, &sel), &sel);
    let all_set = full.iter().all(|r| r.all_set && r.all_tested);
    results.push(TestResult::check(
        "pull_sheet_flags_follow_state",
        none_set && all_set,
        format!("blank={none_set} full={all_set}"),
    ));

    if verbose {
        for r in rows.iter().take(10) {
            println!("  {:<32} x{:<3} {}", r.name, r.total_quantity, r.rooms.join(", "));
        }
    }
    results
}

// ── 6. Search ───────────────────────────────────────────────────────────

fn validate_search(catalog: &EventCatalog, _verbose: bool) -> Vec<TestResult> {
    println!("--- Search ---");
    let mut results = Vec::new();

    let blank = ["", "   ", "\t"]
        .iter()
        .all(|q| search(catalog, q, &DaySelector::All).is_empty());
    results.push(TestResult::check("blank_query_matches_nothing", blank, ""));

    // every item is findable by its own name, in its own room
    let mut missing = Vec::new();
    let mut queries = 0;
    for room in resolve_all_rooms(catalog, &DaySelector::All) {
        for item in room.item_list() {
            queries += 1;
            let hits = search(catalog, &item.name.to_uppercase(), &DaySelector::All);
            if !hits.iter().any(|h| h.room_id == room.room_id) {
                missing.push(format!("{}:{}", room.room_id, item.name));
            }
        }
    }
    results.push(TestResult::check(
        "every_item_findable",
        missing.is_empty(),
        format!("{queries} queries, missing: {missing:?}"),
    ));

    let order: Vec<&str> = catalog.all_room_ids();
    let hits = search(catalog, "a", &DaySelector::All);
    let positions: Vec<usize> = hits
        .iter()
        .filter_map(|h| order.iter().position(|id| *id == h.room_id))
        .collect();
    results.push(TestResult::check(
        "search_keeps_catalog_order",
        positions.windows(2).all(|w| w[0] < w[1]),
        format!("{} rooms, {} matches", hits.len(), total_matches(&hits)),
    ));

    results
}

// ── 7. Storage ──────────────────────────────────────────────────────────

fn validate_storage(json: &str, _verbose: bool) -> Vec<TestResult> {
    println!("--- Storage ---");
    let mut results = Vec::new();
    match tempfile::tempdir() {
        Ok(dir) => {
            for format in [RecordFormat::Json, RecordFormat::Bincode] {
                let outcome = storage_round_trip(json, dir.path(), format);
                results.push(TestResult::check(
                    &format!("storage_round_trip_{:?}", format).to_lowercase(),
                    outcome.is_ok(),
                    outcome.err().unwrap_or_default(),
                ));
            }
            let cleanup = dir.close();
            results.push(TestResult::check(
                "storage_dir_cleaned_up",
                cleanup.is_ok(),
                cleanup.err().map(|e| e.to_string()).unwrap_or_default(),
            ));
        }
        Err(e) => {
            results.push(TestResult::check("storage_dir_created", false, e.to_string()));
        }
    }

    // a full store degrades with exactly one warning
    let degraded = match EventCatalog::from_json(json) {
        Ok(catalog) => {
            let store = ChecklistStore::open("tight", RecordFormat::Json, Box::new(MemoryBackend::with_quota(8)));
            let mut s = ChecklistSession::with_store(catalog, store, AllDaysPolicy::Projection);
            let first = first_item(&s);
            match first {
                Some((room, item)) => {
                    let failed = s.toggle(&room, &item, Metric::Set).is_err();
                    let kept = s.item_state(&room, &item).set;
                    let warned = s.take_storage_warning().is_some() && s.take_storage_warning().is_none();
                    failed && kept && warned && s.store().is_degraded()
                }
                None => true,
            }
        }
        Err(_) => false,
    };
    results.push(TestResult::check("full_store_degrades_once", degraded, ""));

    results
}

/// First item of the first room in use on the session's current day.
fn first_item(session: &ChecklistSession) -> Option<(String, String)> {
    resolve_all_rooms(session.catalog(), &session.view().day)
        .into_iter()
        .find_map(|room| {
            room.item_list()
                .next()
                .map(|item| (room.room_id.to_string(), item.name.clone()))
        })
}

fn storage_round_trip(json: &str, dir: &Path, format: RecordFormat) -> Result<(), String> {
    let catalog = EventCatalog::from_json(json).map_err(|e| e.to_string())?;
    let config = SessionConfig {
        storage: StorageKind::File {
            dir: dir.to_path_buf(),
        },
        format,
        ..SessionConfig::for_event(&catalog)
    };

    let mut s = ChecklistSession::open(catalog.clone(), &config).map_err(|e| e.to_string())?;
    let (room, item) = first_item(&s).ok_or("no items on default day")?;
    s.toggle(&room, &item, Metric::Set).map_err(|e| e.to_string())?;
    s.toggle(&room, &item, Metric::Test).map_err(|e| e.to_string())?;
    drop(s);

    let mut s = ChecklistSession::open(catalog, &config).map_err(|e| e.to_string())?;
    let state = s.item_state(&room, &item);
    if state != CompletionState::new(true, true) {
        return Err(format!("reloaded {room}/{item} as {state:?}"));
    }
    s.clear_room(&room).map_err(|e| e.to_string())?;
    s.clear_room(&room).map_err(|e| e.to_string())?;
    s.clear_all().map_err(|e| e.to_string())?;
    if s.take_storage_warning().is_some() {
        return Err("unexpected storage warning".into());
    }
    info!("{format:?} round trip ok for {room}/{item}");
    Ok(())
}

// ── 8. Export ───────────────────────────────────────────────────────────

fn validate_export(catalog: &EventCatalog, out: Option<&Path>) -> Vec<TestResult> {
    println!("--- Export ---");
    let mut results = Vec::new();
    let tables = export_tables(catalog);

    let names: Vec<&str> = tables.iter().map(|t| t.name).collect();
    results.push(TestResult::check(
        "export_has_four_tables",
        names == ["event", "rooms", "items", "schedule"],
        format!("{names:?}"),
    ));

    for table in &tables {
        let ragged = table.rows.iter().filter(|r| r.len() != table.headers.len()).count();
        results.push(TestResult::check(
            &format!("export_{}_rectangular", table.name),
            ragged == 0,
            format!("{} rows, {ragged} ragged", table.rows.len()),
        ));
    }

    if let Some(dir) = out {
        let written = std::fs::create_dir_all(dir).and_then(|_| {
            for table in &tables {
                std::fs::write(dir.join(table.file_name()), table.to_tsv())?;
            }
            Ok(())
        });
        results.push(TestResult::check(
            "export_written",
            written.is_ok(),
            match &written {
                Ok(()) => format!("{} files in {}", tables.len(), dir.display()),
                Err(e) => e.to_string(),
            },
        ));
    }

    results
}
