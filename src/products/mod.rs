//! Product records and the built-in fixture catalogue

mod fixtures;
mod types;

pub use fixtures::fixture_products;
pub use types::{Product, ProductId};
