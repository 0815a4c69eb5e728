//! Fetch outcome of one search revision

use crate::error::FetchError;
use crate::products::Product;
use crate::query::SearchState;

/// Result of the results lookup for one revision
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchOutcome {
    #[default]
    Idle,
    Loading,
    Success(Vec<Product>),
    Failure(String),
}

impl FetchOutcome {
    pub fn from_result(result: Result<Vec<Product>, FetchError>) -> Self {
        match result {
            Ok(products) => Self::Success(products),
            Err(e) => Self::Failure(format!("Failed to fetch results: {}", e)),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Success or Failure
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Failure(_))
    }

    /// Products to show; empty unless the lookup succeeded
    pub fn results(&self) -> &[Product] {
        match self {
            Self::Success(products) => products,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure(message) => Some(message),
            _ => None,
        }
    }
}

/// Search state and outcome of the current revision, published together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub revision: u64,
    pub state: SearchState,
    pub outcome: FetchOutcome,
}
