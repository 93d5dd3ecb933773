//! All-days projection over per-day completion state.
//!
//! Under the projection, the all-days view owns no state of its own: an
//! item reads as set only when it is set on every day the room carries it
//! (likewise for test). Concrete days pass straight through.

use crate::catalog::EventCatalog;
use crate::resolver::days_carrying_item;
use crate::selector::DaySelector;
use crate::state::{CompletionLookup, CompletionState};

pub struct AllDaysProjection<'a, L: ?Sized> {
    catalog: &'a EventCatalog,
    inner: &'a L,
}

impl<'a, L: CompletionLookup + ?Sized> AllDaysProjection<'a, L> {
    pub fn new(catalog: &'a EventCatalog, inner: &'a L) -> Self {
        Self { catalog, inner }
    }
}

impl<L: CompletionLookup + ?Sized> CompletionLookup for AllDaysProjection<'_, L> {
    fn completion(&self, room_id: &str, day: &DaySelector, item_name: &str) -> CompletionState {
        if !day.is_all() {
            return self.inner.completion(room_id, day, item_name);
        }
        let days = days_carrying_item(self.catalog, room_id, item_name);
        if days.is_empty() {
            return CompletionState::default();
        }
        days.into_iter()
            .map(|d| self.inner.completion(room_id, &DaySelector::Day(d), item_name))
            .fold(CompletionState::new(true, true), |acc, s| {
                CompletionState::new(acc.set && s.set, acc.test && s.test)
            })
    }
}
