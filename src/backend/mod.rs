//! Search backend boundary
//!
//! The suggestion (`/associate`) and results (`/search`) services are
//! opaque; only their request/response contract is modelled here.

mod http;
mod traits;

pub use http::HttpBackend;
pub use traits::{AssociateRequest, AutocompleteBackend, ProductBackend, SearchRequest};
