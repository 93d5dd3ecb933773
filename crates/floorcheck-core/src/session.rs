//! The checklist session: catalog, store and view state in one place.
//!
//! The session is what a renderer drives. It validates ids coming from the
//! UI, routes all-days writes through the configured policy, and answers
//! every view query against the current [`ViewState`].

use log::{debug, info};

use floorcheck_logic::catalog::EventCatalog;
use floorcheck_logic::progress::{
    global_progress, pull_sheet, room_progress, GlobalProgress, IntensityMode, Progress,
    PullSheetRow,
};
use floorcheck_logic::projection::AllDaysProjection;
use floorcheck_logic::report::{map_overview, room_detail, RoomDetail, RoomMapCell};
use floorcheck_logic::resolver::{days_carrying_item, resolve};
use floorcheck_logic::search::{search, SearchHit};
use floorcheck_logic::selector::DaySelector;
use floorcheck_logic::state::{CompletionLookup, CompletionState, ItemKey, Metric};
use floorcheck_logic::view::{Panel, ViewState};

use crate::backend::{FileBackend, MemoryBackend, StorageBackend};
use crate::config::{validate_config, AllDaysPolicy, SessionConfig, StorageKind};
use crate::error::{SessionError, StorageError};
use crate::store::ChecklistStore;

pub struct ChecklistSession {
    catalog: EventCatalog,
    store: ChecklistStore,
    view: ViewState,
    all_days: AllDaysPolicy,
}

impl ChecklistSession {
    /// Open a session with the backend named in `config`. Storage that
    /// cannot be reached does not fail the open; the session runs degraded.
    pub fn open(catalog: EventCatalog, config: &SessionConfig) -> Result<Self, SessionError> {
        let errors = validate_config(config);
        if !errors.is_empty() {
            return Err(SessionError::InvalidConfig(errors));
        }

        let backend: Result<Box<dyn StorageBackend>, StorageError> = match &config.storage {
            StorageKind::Memory => Ok(Box::new(MemoryBackend::new())),
            StorageKind::File { dir } => FileBackend::new(dir, config.format.extension())
                .map(|b| Box::new(b) as Box<dyn StorageBackend>),
        };
        let store = match backend {
            Ok(backend) => ChecklistStore::open(config.namespace.as_str(), config.format, backend),
            Err(err) => ChecklistStore::unavailable(config.namespace.as_str(), config.format, &err),
        };

        info!(
            "session for `{}`: {} rooms, {} days, storage {:?}, all-days {:?}",
            catalog.event().name,
            catalog.all_room_ids().len(),
            catalog.days().len(),
            config.storage,
            config.all_days
        );
        Ok(Self::with_store(catalog, store, config.all_days))
    }

    /// Open over an already-built store.
    pub fn with_store(catalog: EventCatalog, store: ChecklistStore, all_days: AllDaysPolicy) -> Self {
        let view = ViewState::new(&catalog);
        Self {
            catalog,
            store,
            view,
            all_days,
        }
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &ChecklistStore {
        &self.store
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn all_days_policy(&self) -> AllDaysPolicy {
        self.all_days
    }

    // ── View state ────────────────────────────────────────────────────

    pub fn set_day(&mut self, day: DaySelector) -> Result<(), SessionError> {
        if !self.catalog.knows(&day) {
            return Err(SessionError::UnknownDay(day.to_string()));
        }
        debug!("day -> {day}");
        self.view.set_day(day);
        Ok(())
    }

    pub fn select_room(&mut self, room_id: &str) -> Result<(), SessionError> {
        if self.catalog.room(room_id).is_none() {
            return Err(SessionError::UnknownRoom(room_id.to_string()));
        }
        self.view.select_room(room_id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.view.clear_selection();
    }

    pub fn set_intensity_mode(&mut self, mode: IntensityMode) {
        self.view.set_intensity_mode(mode);
    }

    pub fn set_panel(&mut self, panel: Panel) {
        self.view.set_panel(panel);
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.view.set_search_query(query);
    }

    // ── Completion ────────────────────────────────────────────────────

    fn with_lookup<R>(&self, f: impl FnOnce(&dyn CompletionLookup) -> R) -> R {
        match self.all_days {
            AllDaysPolicy::Projection => f(&AllDaysProjection::new(&self.catalog, &self.store)),
            AllDaysPolicy::SeparateSlot => f(&self.store),
        }
    }

    /// Flags for an item in a room on the current day, as the UI shows them.
    pub fn item_state(&self, room_id: &str, item_name: &str) -> CompletionState {
        let day = &self.view.day;
        self.with_lookup(|lookup| lookup.completion(room_id, day, item_name))
    }

    /// The concrete slots a write on the current day lands in.
    fn target_days(&self, room_id: &str, item_name: &str) -> Result<Vec<DaySelector>, SessionError> {
        if self.catalog.room(room_id).is_none() {
            return Err(SessionError::UnknownRoom(room_id.to_string()));
        }
        let day = &self.view.day;
        let carried = resolve(&self.catalog, room_id, day).is_some_and(|r| r.contains_item(item_name));
        if !carried {
            return Err(SessionError::UnknownItem {
                room: room_id.to_string(),
                day: day.to_string(),
                item: item_name.to_string(),
            });
        }

        if day.is_all() && self.all_days == AllDaysPolicy::Projection {
            Ok(days_carrying_item(&self.catalog, room_id, item_name)
                .into_iter()
                .map(DaySelector::Day)
                .collect())
        } else {
            Ok(vec![day.clone()])
        }
    }

    /// Overwrite both flags. Under the projection an all-days write lands on
    /// every day carrying the item.
    pub fn set_item(
        &mut self,
        room_id: &str,
        item_name: &str,
        value: CompletionState,
    ) -> Result<(), SessionError> {
        let days = self.target_days(room_id, item_name)?;
        let entries = days
            .into_iter()
            .map(|d| (ItemKey::new(room_id, d, item_name), value));
        self.store.set_many(entries)?;
        Ok(())
    }

    /// Flip one flag and return the resulting state. Only the toggled flag
    /// is fanned out; the other keeps its per-day value.
    pub fn toggle(
        &mut self,
        room_id: &str,
        item_name: &str,
        metric: Metric,
    ) -> Result<CompletionState, SessionError> {
        let days = self.target_days(room_id, item_name)?;
        let next = !self.item_state(room_id, item_name).get(metric);
        let entries: Vec<_> = days
            .into_iter()
            .map(|d| {
                let current = self.store.get(room_id, &d, item_name);
                (ItemKey::new(room_id, d, item_name), current.with(metric, next))
            })
            .collect();
        self.store.set_many(entries)?;
        Ok(self.item_state(room_id, item_name))
    }

    pub fn clear_room(&mut self, room_id: &str) -> Result<(), SessionError> {
        if self.catalog.room(room_id).is_none() {
            return Err(SessionError::UnknownRoom(room_id.to_string()));
        }
        self.store.clear_room(room_id)?;
        Ok(())
    }

    pub fn clear_all(&mut self) -> Result<(), SessionError> {
        self.store.clear_all()?;
        Ok(())
    }

    /// The storage warning, if any, exactly once.
    pub fn take_storage_warning(&mut self) -> Option<String> {
        self.store.take_warning()
    }

    // ── Queries ───────────────────────────────────────────────────────

    pub fn map_overview(&self) -> Vec<RoomMapCell> {
        let day = &self.view.day;
        let mode = self.view.intensity_mode;
        self.with_lookup(|lookup| map_overview(&self.catalog, lookup, day, mode))
    }

    pub fn room_detail(&self, room_id: &str) -> Option<RoomDetail> {
        let day = &self.view.day;
        self.with_lookup(|lookup| room_detail(&self.catalog, lookup, room_id, day))
    }

    /// Detail for the selected room; `None` with no selection or when the
    /// room is not in use on the current day.
    pub fn selected_room_detail(&self) -> Option<RoomDetail> {
        self.room_detail(self.view.selected_room.as_deref()?)
    }

    pub fn room_progress(&self, room_id: &str, metric: Metric) -> Option<Progress> {
        let day = &self.view.day;
        self.with_lookup(|lookup| room_progress(&self.catalog, lookup, room_id, day, metric))
    }

    pub fn global_progress(&self) -> GlobalProgress {
        let day = &self.view.day;
        self.with_lookup(|lookup| global_progress(&self.catalog, lookup, day))
    }

    pub fn pull_sheet(&self) -> Vec<PullSheetRow> {
        let day = &self.view.day;
        self.with_lookup(|lookup| pull_sheet(&self.catalog, lookup, day))
    }

    /// Results for the current query on the current day.
    pub fn search_results(&self) -> Vec<SearchHit<'_>> {
        search(&self.catalog, &self.view.search_query, &self.view.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::persistence::RecordFormat;

    const G2_JSON: &str = include_str!("../../../data/g2-conference.json");

    fn session(policy: AllDaysPolicy) -> ChecklistSession {
        let catalog = EventCatalog::from_json(G2_JSON).unwrap();
        let config = SessionConfig {
            all_days: policy,
            ..SessionConfig::for_event(&catalog)
        };
        ChecklistSession::open(catalog, &config).unwrap()
    }

    #[test]
    fn opens_on_default_day() {
        let s = session(AllDaysPolicy::Projection);
        assert_eq!(s.view().day, DaySelector::day("2/10"));
        assert_eq!(s.store().namespace(), "convene_floor_g2_conference");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let catalog = EventCatalog::from_json(G2_JSON).unwrap();
        let config = SessionConfig {
            namespace: String::new(),
            ..SessionConfig::default()
        };
        assert!(matches!(
            ChecklistSession::open(catalog, &config),
            Err(SessionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn unknown_ids_are_errors() {
        let mut s = session(AllDaysPolicy::Projection);
        assert!(matches!(s.set_day(DaySelector::day("3/1")), Err(SessionError::UnknownDay(_))));
        assert!(matches!(s.select_room("attic"), Err(SessionError::UnknownRoom(_))));
        assert!(matches!(
            s.set_item("elev", "Grand Piano", CompletionState::new(true, false)),
            Err(SessionError::UnknownItem { .. })
        ));
        assert_eq!(s.view().day, DaySelector::day("2/10"));
    }

    #[test]
    fn toggle_flips_one_flag() {
        let mut s = session(AllDaysPolicy::Projection);
        let after = s.toggle("elev", "Power Strip", Metric::Set).unwrap();
        assert_eq!(after, CompletionState::new(true, false));
        let after = s.toggle("elev", "Power Strip", Metric::Test).unwrap();
        assert_eq!(after, CompletionState::new(true, true));
        let after = s.toggle("elev", "Power Strip", Metric::Set).unwrap();
        assert_eq!(after, CompletionState::new(false, true));
    }

    #[test]
    fn projection_fans_out_all_days_writes() {
        let mut s = session(AllDaysPolicy::Projection);
        s.set_day(DaySelector::All).unwrap();
        s.toggle("elev", "Power Strip", Metric::Set).unwrap();

        for d in days_carrying_item(s.catalog(), "elev", "Power Strip") {
            assert!(s.store().get("elev", &DaySelector::Day(d), "Power Strip").set);
        }
        assert!(s.item_state("elev", "Power Strip").set);
        // nothing lands in the `all` slot itself
        assert_eq!(s.store().get("elev", &DaySelector::All, "Power Strip"), CompletionState::default());

        // unsetting one day breaks the all-days reading
        s.set_day(DaySelector::day("2/11")).unwrap();
        s.toggle("elev", "Power Strip", Metric::Set).unwrap();
        s.set_day(DaySelector::All).unwrap();
        assert!(!s.item_state("elev", "Power Strip").set);
    }

    #[test]
    fn all_days_toggle_keeps_other_flag_per_day() {
        let mut s = session(AllDaysPolicy::Projection);
        s.toggle("elev", "Power Strip", Metric::Test).unwrap();
        s.set_day(DaySelector::All).unwrap();
        s.toggle("elev", "Power Strip", Metric::Set).unwrap();
        let on_default = s.store().get("elev", &DaySelector::day("2/10"), "Power Strip");
        let on_other = s.store().get("elev", &DaySelector::day("2/11"), "Power Strip");
        assert_eq!(on_default, CompletionState::new(true, true));
        assert_eq!(on_other, CompletionState::new(true, false));
    }

    #[test]
    fn separate_slot_keeps_all_independent() {
        let mut s = session(AllDaysPolicy::SeparateSlot);
        s.set_day(DaySelector::All).unwrap();
        s.toggle("elev", "Power Strip", Metric::Set).unwrap();
        assert!(s.store().get("elev", &DaySelector::All, "Power Strip").set);
        assert!(!s.store().get("elev", &DaySelector::day("2/10"), "Power Strip").set);
    }

    #[test]
    fn search_query_drives_panel_and_results() {
        let mut s = session(AllDaysPolicy::Projection);
        s.set_day(DaySelector::day("2/12")).unwrap();
        s.set_search_query("hdmi");
        assert_eq!(s.view().panel, Panel::Search);
        assert_eq!(s.search_results().len(), 3);
        s.set_search_query("   ");
        assert_eq!(s.view().panel, Panel::Room);
        assert!(s.search_results().is_empty());
    }

    #[test]
    fn selected_room_detail_follows_day() {
        let mut s = session(AllDaysPolicy::Projection);
        assert!(s.selected_room_detail().is_none());
        s.select_room("hub").unwrap();
        // hub is explicitly empty on 2/10
        let detail = s.selected_room_detail().unwrap();
        assert!(detail.sections.is_empty());
        assert_eq!(detail.notes.as_deref(), Some("Not in use."));
        s.set_day(DaySelector::day("2/11")).unwrap();
        let detail = s.selected_room_detail().unwrap();
        assert_eq!(detail.room_id, "hub");
        assert!(!detail.sections.is_empty());
    }

    #[test]
    fn degraded_session_keeps_working() {
        let catalog = EventCatalog::from_json(G2_JSON).unwrap();
        let store = ChecklistStore::open("ev", RecordFormat::Json, Box::new(MemoryBackend::with_quota(4)));
        let mut s = ChecklistSession::with_store(catalog, store, AllDaysPolicy::Projection);

        let err = s.set_item("elev", "Power Strip", CompletionState::new(true, true)).unwrap_err();
        assert!(matches!(err, SessionError::Storage(StorageError::QuotaExceeded { .. })));
        assert!(s.take_storage_warning().is_some());
        assert!(s.take_storage_warning().is_none());

        s.set_item("elev", "Extension Cord", CompletionState::new(true, true)).unwrap();
        assert_eq!(s.room_progress("elev", Metric::Set).unwrap().percent(), 100);
    }
}
