//! Search session coordination
//!
//! Owns the authoritative search state (derived from the navigable location)
//! and the results fetch for each revision of it.

mod controller;
mod outcome;

pub use controller::SearchSession;
pub use outcome::{FetchOutcome, SessionSnapshot};
