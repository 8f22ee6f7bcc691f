// src/services/categories.rs

//! Category source.
//!
//! Fetches the live category list on every run; the list is never cached.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};

/// Source of category slugs to probe.
#[async_trait]
pub trait CategorySource: Send + Sync {
    /// Return category slugs in endpoint order.
    async fn fetch_categories(&self) -> Result<Vec<String>>;
}

/// Category record as returned by the endpoint; other fields are ignored.
#[derive(Debug, Deserialize)]
struct CategoryRecord {
    slug: String,
}

/// Category source backed by the marketplace JSON endpoint.
pub struct HttpCategorySource {
    client: Client,
    url: String,
}

impl HttpCategorySource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl CategorySource for HttpCategorySource {
    async fn fetch_categories(&self) -> Result<Vec<String>> {
        log::debug!("Fetching categories from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::fetch(&self.url, e))?;

        let records: Vec<CategoryRecord> = response
            .json()
            .await
            .map_err(|e| AppError::fetch(&self.url, e))?;

        Ok(records.into_iter().map(|r| r.slug).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn source_for(server: &MockServer) -> HttpCategorySource {
        HttpCategorySource::new(
            Client::new(),
            format!("{}/api/pl_PL/categories", server.uri()),
        )
    }

    #[tokio::test]
    async fn test_returns_slugs_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pl_PL/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "Fryzjer", "slug": "fryzjer"},
                {"id": 2, "name": "Barber", "slug": "barber-shop"},
                {"id": 3, "name": "Masaż", "slug": "masaz"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let categories = source_for(&server).await.fetch_categories().await.unwrap();
        assert_eq!(categories, vec!["fryzjer", "barber-shop", "masaz"]);

        server.verify().await;
    }

    #[tokio::test]
    async fn test_server_error_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = source_for(&server)
            .await
            .fetch_categories()
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_unexpected_body_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = source_for(&server)
            .await
            .fetch_categories()
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_fetch_error() {
        let source = HttpCategorySource::new(Client::new(), "http://127.0.0.1:1/categories");
        let err = source.fetch_categories().await.unwrap_err();
        assert!(matches!(err, AppError::Fetch { .. }));
    }
}
