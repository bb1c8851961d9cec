//! HTTP client for the recommendation backend.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use sound_dna_core::model::ErrorBody;
use sound_dna_core::{RecommendRequest, RecommendationResponse, ViewError};

#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend rejected the request with an error document.
    #[error("{message} (HTTP {status})")]
    Backend { status: u16, message: String },

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Response(#[from] ViewError),
}

/// Builds the shared HTTP client.
pub fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(60))
        .tcp_keepalive(Duration::from_secs(30))
        .build()
}

#[derive(Debug, Clone)]
pub struct RecommendClient {
    http: reqwest::Client,
    base_url: String,
}

impl RecommendClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/recommend", self.base_url)
    }

    /// Sends one `POST /recommend`; no retries.
    pub async fn recommend(
        &self,
        request: &RecommendRequest,
    ) -> Result<RecommendationResponse, ApiError> {
        let endpoint = self.endpoint();
        log::debug!("POST {endpoint} song_name={:?}", request.song_name);

        let response = self.http.post(&endpoint).json(request).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        let parsed = RecommendationResponse::from_json(&body)?;
        log::debug!(
            "received {} features and {} recommendations",
            parsed.input_song.len(),
            parsed.recommendations.len()
        );
        Ok(parsed)
    }
}

fn error_from_body(status: StatusCode, body: &[u8]) -> ApiError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody { error }) => ApiError::Backend {
            status: status.as_u16(),
            message: error,
        },
        Err(_) => ApiError::Status(status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_url() {
        let client = RecommendClient::new(reqwest::Client::new(), "http://localhost:5000/");
        assert_eq!(client.endpoint(), "http://localhost:5000/recommend");
    }

    #[test]
    fn backend_error_document_becomes_backend_error() {
        let error = error_from_body(StatusCode::NOT_FOUND, br#"{"error": "No match found"}"#);
        assert!(matches!(
            &error,
            ApiError::Backend { status: 404, message } if message == "No match found"
        ));
        assert_eq!(error.to_string(), "No match found (HTTP 404)");
    }

    #[test]
    fn opaque_error_body_keeps_status() {
        let error = error_from_body(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        assert!(matches!(error, ApiError::Status(502)));
    }
}
