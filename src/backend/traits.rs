//! Backend traits and request payloads

use crate::error::FetchError;
use crate::products::Product;
use crate::query::SearchState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of a suggestion lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociateRequest {
    pub query: String,
}

/// Body of a results lookup; the category set is sent as a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchRequest {
    pub query: String,
    pub classes: Vec<String>,
}

impl From<&SearchState> for SearchRequest {
    fn from(state: &SearchState) -> Self {
        Self {
            query: state.query.clone(),
            classes: state.categories.to_vec(),
        }
    }
}

/// Source of autocomplete suggestions
#[async_trait]
pub trait AutocompleteBackend: Send + Sync {
    /// Ordered suggestions for a partial query; possibly empty
    async fn suggest(&self, query: &str) -> Result<Vec<String>, FetchError>;
}

/// Source of product results
#[async_trait]
pub trait ProductBackend: Send + Sync {
    /// Ordered products matching the request; possibly empty
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Product>, FetchError>;
}
