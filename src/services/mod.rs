//! External generative-AI services
//!
//! Each service is split into a transport trait (fetches the raw JSON body)
//! and a `request_*` function that parses the body and substitutes a
//! deterministic fallback on any failure. Callers never see an error: the
//! game stays playable and the face panel always has something to show.

pub mod commentary;
pub mod fallback;
pub mod level;
pub mod similarity;

use thiserror::Error;

pub use commentary::{CommentarySource, request_commentary};
pub use fallback::fallback_level;
pub use level::{LevelSource, parse_level, request_level};
pub use similarity::{ScoreBand, SimilarityResult, SimilaritySource, parse_similarity, request_similarity};

/// Why a service call produced no usable answer
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service not configured")]
    Unavailable,
    #[error("transport failed: {0}")]
    Transport(String),
    #[error("service returned HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("empty response")]
    Empty,
}

/// Transport that always fails; used when no endpoint is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl LevelSource for Offline {
    async fn fetch_level(&self, _difficulty: crate::sim::Difficulty) -> Result<String, ServiceError> {
        Err(ServiceError::Unavailable)
    }
}

impl SimilaritySource for Offline {
    async fn fetch_similarity(&self, _image_base64: &str) -> Result<String, ServiceError> {
        Err(ServiceError::Unavailable)
    }
}

impl CommentarySource for Offline {
    async fn fetch_commentary(&self, _won: bool, _score: u64) -> Result<String, ServiceError> {
        Err(ServiceError::Unavailable)
    }
}
