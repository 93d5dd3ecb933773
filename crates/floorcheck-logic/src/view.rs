//! Explicit UI state record.
//!
//! The renderer owns nothing global: the current day, selection, map mode,
//! side panel and search text live here and are passed into queries.

use serde::{Deserialize, Serialize};

use crate::catalog::EventCatalog;
use crate::progress::IntensityMode;
use crate::selector::DaySelector;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    #[default]
    Room,
    PullSheet,
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub day: DaySelector,
    pub selected_room: Option<String>,
    pub intensity_mode: IntensityMode,
    pub panel: Panel,
    pub search_query: String,
}

impl ViewState {
    /// Opens on the catalog's default day with nothing selected.
    pub fn new(catalog: &EventCatalog) -> Self {
        Self {
            day: catalog.default_selector(),
            selected_room: None,
            intensity_mode: IntensityMode::default(),
            panel: Panel::default(),
            search_query: String::new(),
        }
    }

    pub fn set_day(&mut self, day: DaySelector) {
        self.day = day;
    }

    pub fn select_room(&mut self, room_id: impl Into<String>) {
        self.selected_room = Some(room_id.into());
    }

    pub fn clear_selection(&mut self) {
        self.selected_room = None;
    }

    pub fn set_intensity_mode(&mut self, mode: IntensityMode) {
        self.intensity_mode = mode;
    }

    pub fn set_panel(&mut self, panel: Panel) {
        self.panel = panel;
    }

    /// Non-blank text opens the search panel; clearing it returns to the
    /// room panel.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        if self.search_query.trim().is_empty() {
            if self.panel == Panel::Search {
                self.panel = Panel::Room;
            }
        } else {
            self.panel = Panel::Search;
        }
    }
}
