// src/services/probe.rs

//! Listing page prober.
//!
//! A combination is live when its listing page answers with a success status
//! and the body mentions the brand token (case-insensitive). Page structure is
//! not parsed. Any failure along the way means "absent".

use async_trait::async_trait;
use reqwest::Client;

use crate::models::{Combination, Liveness};

/// Capability to classify a combination as live or absent.
#[async_trait]
pub trait Prober: Send + Sync {
    /// URL that gets probed (and reported) for a combination.
    fn listing_url(&self, combination: &Combination) -> String;

    /// Probe the combination once. Never fails; errors mean absent.
    async fn classify(&self, combination: &Combination) -> Liveness;
}

/// Decide liveness from a response status and body.
pub fn classify_response(success: bool, body: &str, brand_token: &str) -> Liveness {
    if success && body.to_lowercase().contains(&brand_token.to_lowercase()) {
        Liveness::Live
    } else {
        Liveness::Absent
    }
}

/// HTTP prober issuing one GET per combination.
pub struct HttpProber {
    client: Client,
    base_url: String,
    brand_token: String,
}

impl HttpProber {
    pub fn new(client: Client, base_url: impl Into<String>, brand_token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            brand_token: brand_token.into(),
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    fn listing_url(&self, combination: &Combination) -> String {
        combination.listing_url(&self.base_url)
    }

    async fn classify(&self, combination: &Combination) -> Liveness {
        let url = self.listing_url(combination);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                log::debug!("Probe {} failed: {}", url, e);
                return Liveness::Absent;
            }
        };

        let status = response.status();
        if !status.is_success() {
            log::debug!("Probe {} -> {}", url, status);
            return Liveness::Absent;
        }

        match response.text().await {
            Ok(body) => {
                let liveness = classify_response(true, &body, &self.brand_token);
                log::debug!("Probe {} -> {} ({:?})", url, status, liveness);
                liveness
            }
            Err(e) => {
                log::debug!("Probe {} body unreadable: {}", url, e);
                Liveness::Absent
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prober_for(server: &MockServer) -> HttpProber {
        HttpProber::new(Client::new(), format!("{}/pl-pl", server.uri()), "booksy")
    }

    #[test]
    fn test_classify_response_rules() {
        assert_eq!(
            classify_response(true, "<title>Fryzjer Warszawa | Booksy</title>", "booksy"),
            Liveness::Live
        );
        assert_eq!(
            classify_response(true, "<title>BOOKSY</title>", "Booksy"),
            Liveness::Live
        );
        assert_eq!(
            classify_response(true, "<title>Not found</title>", "booksy"),
            Liveness::Absent
        );
        assert_eq!(
            classify_response(false, "Booksy error page", "booksy"),
            Liveness::Absent
        );
    }

    #[tokio::test]
    async fn test_live_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pl-pl/fryzjer/warszawa/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Najlepsi fryzjerzy - Booksy"))
            .expect(1)
            .mount(&server)
            .await;

        let prober = prober_for(&server);
        let combo = Combination::new("warszawa", "fryzjer");
        assert_eq!(prober.classify(&combo).await, Liveness::Live);

        server.verify().await;
    }

    #[tokio::test]
    async fn test_not_found_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Booksy: page not found"))
            .mount(&server)
            .await;

        let prober = prober_for(&server);
        let combo = Combination::new("opole", "tatuaz");
        assert_eq!(prober.classify(&combo).await, Liveness::Absent);
    }

    #[tokio::test]
    async fn test_success_without_brand_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("parked domain"))
            .mount(&server)
            .await;

        let prober = prober_for(&server);
        let combo = Combination::new("opole", "tatuaz");
        assert_eq!(prober.classify(&combo).await, Liveness::Absent);
    }

    #[tokio::test]
    async fn test_connection_error_is_absent() {
        let prober = HttpProber::new(Client::new(), "http://127.0.0.1:1/pl-pl", "booksy");
        let combo = Combination::new("radom", "fryzjer");
        assert_eq!(prober.classify(&combo).await, Liveness::Absent);
    }
}
