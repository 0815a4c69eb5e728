//! HTTP implementation of both backends

use super::traits::{AssociateRequest, AutocompleteBackend, ProductBackend, SearchRequest};
use crate::config::{BackendSettings, Settings};
use crate::error::FetchError;
use crate::network::{HttpClient, HttpResponse};
use crate::products::Product;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Talks to the `/associate` and `/search` endpoints
#[derive(Clone)]
pub struct HttpBackend {
    client: HttpClient,
    associate_url: String,
    search_url: String,
}

impl HttpBackend {
    pub fn new(client: HttpClient, settings: &BackendSettings) -> Self {
        Self {
            client,
            associate_url: settings.associate_url(),
            search_url: settings.search_url(),
        }
    }

    /// Build the client and backend from full settings
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let client = HttpClient::with_settings(&settings.outgoing)?;
        Ok(Self::new(client, &settings.backend))
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    pub fn associate_url(&self) -> &str {
        &self.associate_url
    }
}

/// Decode a JSON array body; an empty or `null` body is an empty list
fn decode_list<T: DeserializeOwned>(response: HttpResponse) -> Result<Vec<T>, FetchError> {
    let response = response.error_for_status()?;
    if response.text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let items: Option<Vec<T>> = response.json()?;
    Ok(items.unwrap_or_default())
}

#[async_trait]
impl AutocompleteBackend for HttpBackend {
    async fn suggest(&self, query: &str) -> Result<Vec<String>, FetchError> {
        let body = AssociateRequest {
            query: query.to_string(),
        };
        let response = self.client.post_json(&self.associate_url, &body).await?;
        let suggestions = decode_list(response)?;
        debug!("{} suggestions for '{}'", suggestions.len(), query);
        Ok(suggestions)
    }
}

#[async_trait]
impl ProductBackend for HttpBackend {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Product>, FetchError> {
        let response = self.client.post_json(&self.search_url, request).await?;
        let products = decode_list(response)?;
        debug!(
            "{} products for '{}' in {:?}",
            products.len(),
            request.query,
            request.classes
        );
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> HttpBackend {
        let settings = BackendSettings {
            base_url: server.uri(),
            ..Default::default()
        };
        HttpBackend::new(HttpClient::new().unwrap(), &settings)
    }

    fn request(query: &str, classes: &[&str]) -> SearchRequest {
        SearchRequest {
            query: query.to_string(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_suggest_posts_query_and_keeps_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/associate"))
            .and(body_json(json!({ "query": "wal" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!(["wallet", "walnut", "wall art"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let suggestions = assert_ok!(backend_for(&server).suggest("wal").await);
        assert_eq!(suggestions, vec!["wallet", "walnut", "wall art"]);
    }

    #[tokio::test]
    async fn test_suggest_non_success_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/associate"))
            .respond_with(ResponseTemplate::new(503).set_body_string("trie offline"))
            .mount(&server)
            .await;

        let err = assert_err!(backend_for(&server).suggest("wal").await);
        assert!(err.is_server());
    }

    #[tokio::test]
    async fn test_search_sends_query_and_classes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "Query": "watch", "Classes": ["Watches"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "Id": "5", "Name": "Elegant Wrist Watch", "DiscountPrice": 250.0 },
                { "Id": "9" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let products = assert_ok!(backend_for(&server).search(&request("watch", &["Watches"])).await);
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].display_name(), "Elegant Wrist Watch");
        assert_eq!(products[1].display_name(), "No Title");
    }

    #[tokio::test]
    async fn test_search_empty_or_null_body_is_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_json(json!({ "Query": "nothing", "Classes": [] })))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_json(json!({ "Query": "null", "Classes": [] })))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        assert!(assert_ok!(backend.search(&request("nothing", &[])).await).is_empty());
        assert!(assert_ok!(backend.search(&request("null", &[])).await).is_empty());
    }

    #[tokio::test]
    async fn test_search_server_error_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string("Query must be non-empty and contain valid keywords"),
            )
            .mount(&server)
            .await;

        let err = assert_err!(backend_for(&server).search(&request("the", &[])).await);
        assert_eq!(
            err,
            FetchError::Server {
                status: 400,
                body: "Query must be non-empty and contain valid keywords".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_search_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"a list\"}"))
            .mount(&server)
            .await;

        let err = assert_err!(backend_for(&server).search(&request("x", &[])).await);
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let settings = BackendSettings {
            base_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let backend = HttpBackend::new(HttpClient::new().unwrap(), &settings);
        assert_eq!(backend.search_url(), "http://127.0.0.1:1/search");

        let err = assert_err!(backend.search(&request("x", &[])).await);
        assert!(matches!(err, FetchError::Network(_)));
    }
}
