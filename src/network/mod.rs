//! HTTP networking module
//!
//! Provides the HTTP client used by the backend implementation.

mod client;

pub use client::{HttpClient, HttpResponse};
