//! Similarity judge contract
//!
//! Wire format (JSON): `{ score, comment, features: [..] }`

use serde::{Deserialize, Serialize};

use super::ServiceError;

const UNCLEAR_COMMENT: &str = "Analysis unclear.";
const FAILED_COMMENT: &str = "Could not analyze faces. Try better lighting!";

/// Transport for the two-face similarity judgement
#[allow(async_fn_in_trait)]
pub trait SimilaritySource {
    /// Raw JSON body for a base64-encoded PNG (no data-URL prefix)
    async fn fetch_similarity(&self, image_base64: &str) -> Result<String, ServiceError>;
}

/// Outcome of one analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityResult {
    /// 0-100
    pub score: u8,
    pub comment: String,
    /// Short observations, in the judge's order
    pub features: Vec<String>,
}

/// Display bucket for a score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Low,
    Medium,
    High,
}

impl SimilarityResult {
    /// Result shown when the judge could not be reached or understood
    pub fn fallback() -> Self {
        Self {
            score: 0,
            comment: FAILED_COMMENT.to_string(),
            features: Vec::new(),
        }
    }

    pub fn band(&self) -> ScoreBand {
        match self.score {
            71.. => ScoreBand::High,
            41..=70 => ScoreBand::Medium,
            _ => ScoreBand::Low,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSimilarity {
    score: Option<f64>,
    comment: Option<String>,
    #[serde(default)]
    features: Vec<String>,
}

/// Parse a judge response; the score is rounded and clamped to 0-100
pub fn parse_similarity(body: &str) -> Result<SimilarityResult, ServiceError> {
    if body.trim().is_empty() {
        return Err(ServiceError::Empty);
    }
    let raw: RawSimilarity = serde_json::from_str(body)?;
    let score = raw
        .score
        .filter(|s| s.is_finite())
        .map_or(0, |s| s.round().clamp(0.0, 100.0) as u8);

    Ok(SimilarityResult {
        score,
        comment: raw
            .comment
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| UNCLEAR_COMMENT.to_string()),
        features: raw.features,
    })
}

/// Remove a `data:image/{png,jpeg,webp};base64,` prefix if present
pub fn strip_data_url(image: &str) -> &str {
    ["png", "jpeg", "webp"]
        .iter()
        .find_map(|format| {
            image
                .strip_prefix("data:image/")
                .and_then(|rest| rest.strip_prefix(format))
                .and_then(|rest| rest.strip_prefix(";base64,"))
        })
        .unwrap_or(image)
}

/// Judge a captured frame, never failing
pub async fn request_similarity<S: SimilaritySource>(source: &S, image: &str) -> SimilarityResult {
    let payload = strip_data_url(image);
    let result = match source.fetch_similarity(payload).await {
        Ok(body) => parse_similarity(&body),
        Err(e) => Err(e),
    };
    result.unwrap_or_else(|e| {
        log::warn!("Face analysis failed: {}", e);
        SimilarityResult::fallback()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::RefCell;

    /// Records the payload it was sent
    struct Recording {
        reply: Result<&'static str, u16>,
        seen: RefCell<Option<String>>,
    }

    impl SimilaritySource for Recording {
        async fn fetch_similarity(&self, image_base64: &str) -> Result<String, ServiceError> {
            *self.seen.borrow_mut() = Some(image_base64.to_string());
            self.reply
                .map(str::to_string)
                .map_err(ServiceError::Status)
        }
    }

    #[test]
    fn test_parse_full_response() {
        let result = parse_similarity(
            r#"{ "score": 72.6, "comment": "Practically twins.", "features": ["eyes", "smile", "jaw"] }"#,
        )
        .unwrap();
        assert_eq!(result.score, 73);
        assert_eq!(result.comment, "Practically twins.");
        assert_eq!(result.features, vec!["eyes", "smile", "jaw"]);
        assert_eq!(result.band(), ScoreBand::High);
    }

    #[test]
    fn test_parse_defaults_and_clamps() {
        let result = parse_similarity("{}").unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(result.comment, UNCLEAR_COMMENT);
        assert!(result.features.is_empty());

        assert_eq!(parse_similarity(r#"{ "score": 250 }"#).unwrap().score, 100);
        assert_eq!(parse_similarity(r#"{ "score": -3 }"#).unwrap().score, 0);
        assert!(parse_similarity("").is_err());
        assert!(parse_similarity(r#"{ "score": "high" }"#).is_err());
    }

    #[test]
    fn test_bands() {
        let band = |score| {
            SimilarityResult {
                score,
                ..SimilarityResult::fallback()
            }
            .band()
        };
        assert_eq!(band(0), ScoreBand::Low);
        assert_eq!(band(40), ScoreBand::Low);
        assert_eq!(band(41), ScoreBand::Medium);
        assert_eq!(band(70), ScoreBand::Medium);
        assert_eq!(band(71), ScoreBand::High);
    }

    #[test]
    fn test_strip_data_url() {
        assert_eq!(strip_data_url("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_url("data:image/webp;base64,BBBB"), "BBBB");
        assert_eq!(strip_data_url("data:image/gif;base64,CCCC"), "data:image/gif;base64,CCCC");
        assert_eq!(strip_data_url("DDDD"), "DDDD");
    }

    #[test]
    fn test_request_sends_stripped_payload() {
        let source = Recording {
            reply: Ok(r#"{ "score": 55, "comment": "Cousins?", "features": [] }"#),
            seen: RefCell::new(None),
        };
        let result = block_on(request_similarity(&source, "data:image/jpeg;base64,QUJD"));
        assert_eq!(result.score, 55);
        assert_eq!(source.seen.borrow().as_deref(), Some("QUJD"));
    }

    #[test]
    fn test_request_falls_back() {
        let source = Recording {
            reply: Err(500),
            seen: RefCell::new(None),
        };
        let result = block_on(request_similarity(&source, "QUJD"));
        assert_eq!(result, SimilarityResult::fallback());

        let source = Recording {
            reply: Ok("<html>"),
            seen: RefCell::new(None),
        };
        assert_eq!(
            block_on(request_similarity(&source, "QUJD")),
            SimilarityResult::fallback()
        );
    }
}
