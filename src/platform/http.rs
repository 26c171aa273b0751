//! Browser HTTP transport for the AI services
//!
//! Each service is a JSON POST to `<endpoint>/level`, `/similarity` or
//! `/commentary` on a proxy that owns the model credentials. Without an
//! endpoint every call reports `Unavailable` and the fallbacks apply.

use gloo_net::http::Request;
use serde_json::json;

use crate::services::{CommentarySource, LevelSource, ServiceError, SimilaritySource};
use crate::sim::Difficulty;

#[derive(Debug, Clone, Default)]
pub struct HttpService {
    endpoint: Option<String>,
}

fn transport(err: gloo_net::Error) -> ServiceError {
    ServiceError::Transport(err.to_string())
}

impl HttpService {
    pub fn new(endpoint: Option<&str>) -> Self {
        let endpoint = endpoint
            .map(|e| e.trim().trim_end_matches('/'))
            .filter(|e| !e.is_empty())
            .map(str::to_string);
        if endpoint.is_none() {
            log::info!("No service endpoint configured, running offline");
        }
        Self { endpoint }
    }

    async fn post_json(&self, path: &str, body: serde_json::Value) -> Result<String, ServiceError> {
        let endpoint = self.endpoint.as_deref().ok_or(ServiceError::Unavailable)?;
        let url = format!("{endpoint}/{path}");

        log::debug!("POST {}", url);
        let response = Request::post(&url)
            .json(&body)
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        if !response.ok() {
            return Err(ServiceError::Status(response.status()));
        }
        response.text().await.map_err(transport)
    }
}

impl LevelSource for HttpService {
    async fn fetch_level(&self, difficulty: Difficulty) -> Result<String, ServiceError> {
        self.post_json("level", json!({ "difficulty": difficulty.as_str() }))
            .await
    }
}

impl SimilaritySource for HttpService {
    async fn fetch_similarity(&self, image_base64: &str) -> Result<String, ServiceError> {
        self.post_json("similarity", json!({ "image": image_base64 }))
            .await
    }
}

impl CommentarySource for HttpService {
    async fn fetch_commentary(&self, won: bool, score: u64) -> Result<String, ServiceError> {
        let body = self
            .post_json("commentary", json!({ "won": won, "score": score }))
            .await?;
        // Proxy may wrap the text as a JSON string
        Ok(serde_json::from_str::<String>(&body).unwrap_or(body))
    }
}
