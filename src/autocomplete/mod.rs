//! Autocomplete for the search input
//!
//! Debounces keystrokes into suggestion lookups and keeps the visible list
//! tied to the most recent lookup.

mod controller;

pub use controller::{PanelMetrics, SuggestionController, SuggestionState, Submissions};
