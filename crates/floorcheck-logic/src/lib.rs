//! Pure checklist logic for floorcheck.
//!
//! This crate holds every rule that turns a static event catalog plus a
//! set of completion flags into what the floor plan shows. Nothing here
//! touches storage, clocks, or a renderer: functions take plain data and
//! return plain data, so the same code backs the session engine, the
//! headless harness, and unit tests.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | Event, rooms, schedules, items, tags; load-time validation |
//! | [`export`] | Flat TSV tables for spreadsheet seeding |
//! | [`progress`] | Gear load, completion percentages, map buckets, pull sheet |
//! | [`projection`] | All-days view computed from per-day flags |
//! | [`report`] | Map cells and room detail for the renderer |
//! | [`resolver`] | Room + day selector → effective item list |
//! | [`search`] | Case-insensitive gear search across rooms |
//! | [`selector`] | Concrete day vs. all-days selector |
//! | [`state`] | Composite item keys and `{set, test}` flags |
//! | [`view`] | Explicit UI state record (day, selection, panel, query) |

pub mod catalog;
pub mod export;
pub mod progress;
pub mod projection;
pub mod report;
pub mod resolver;
pub mod search;
pub mod selector;
pub mod state;
pub mod view;
