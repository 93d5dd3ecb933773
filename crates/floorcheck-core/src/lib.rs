//! Stateful side of floorcheck: storage, persistence and the session engine.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`backend`] | Namespaced byte storage (memory, file) |
//! | [`config`] | Session configuration and validation |
//! | [`error`] | Storage and session errors |
//! | [`persistence`] | Versioned checklist record, JSON or bincode |
//! | [`session`] | Catalog + store + view state behind one API |
//! | [`store`] | Checklist store with degrade-to-memory |

pub mod backend;
pub mod config;
pub mod error;
pub mod persistence;
pub mod session;
pub mod store;

pub use floorcheck_logic as logic;

/// Common imports
pub mod prelude {
    pub use crate::backend::{FileBackend, MemoryBackend, StorageBackend};
    pub use crate::config::{validate_config, AllDaysPolicy, SessionConfig, StorageKind};
    pub use crate::error::{SessionError, StorageError};
    pub use crate::persistence::RecordFormat;
    pub use crate::session::ChecklistSession;
    pub use crate::store::ChecklistStore;
    pub use floorcheck_logic::catalog::EventCatalog;
    pub use floorcheck_logic::progress::IntensityMode;
    pub use floorcheck_logic::selector::DaySelector;
    pub use floorcheck_logic::state::{CompletionState, Metric};
    pub use floorcheck_logic::view::Panel;
}
