//! Routebook core: route model, validation, and search-history ranking.

pub mod error;
pub mod history;
pub mod models;
pub mod validation;

pub use error::{HistoryError, Issue, ValidationError};
pub use history::{
    history_key, HistoryEntry, HistoryLine, HistoryStore, HistoryTracker, JsonFileHistoryStore,
    MemoryHistoryStore, Render, EMPTY_HISTORY_PLACEHOLDER, MAX_HISTORY_ENTRIES,
};
pub use models::{Pagination, Place, Route, RouteInput, RoutePage, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
pub use validation::{parse_route_input, validate_route_input};
