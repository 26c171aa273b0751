//! End-of-run commentary
//!
//! A one- or two-line quip about the run shown on the result screen.

use super::ServiceError;

/// Transport for run commentary
#[allow(async_fn_in_trait)]
pub trait CommentarySource {
    /// Plain-text commentary for a finished run
    async fn fetch_commentary(&self, won: bool, score: u64) -> Result<String, ServiceError>;
}

/// Commentary for a finished run, never failing
pub async fn request_commentary<S: CommentarySource>(source: &S, won: bool, score: u64) -> String {
    match source.fetch_commentary(won, score).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => if won { "Mission Accomplished!" } else { "Fish food." }.to_string(),
        Err(e) => {
            log::warn!("Commentary unavailable: {}", e);
            if won { "Great job!" } else { "Game Over." }.to_string()
        }
    }
}
