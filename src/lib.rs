//! Nexus Search: search session coordination for a product storefront
//!
//! Two controllers keep a product search consistent while the user types
//! and clicks:
//! - [`autocomplete::SuggestionController`] debounces keystrokes into
//!   suggestion lookups and only ever shows the newest answer.
//! - [`session::SearchSession`] derives the active search from the
//!   navigable location and commits exactly one outcome per revision.

pub mod autocomplete;
pub mod backend;
pub mod cancel;
pub mod config;
pub mod error;
pub mod metrics;
pub mod network;
pub mod products;
pub mod query;
pub mod session;

pub use config::Settings;
pub use error::{FetchError, LocationError};
pub use products::Product;
pub use query::{CategorySet, Location, SearchState};
pub use session::{FetchOutcome, SearchSession};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
