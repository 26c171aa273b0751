//! Level provider contract
//!
//! Wire format (JSON):
//! `{ name, description, difficulty, obstacles: [{ type, yPercent, speedMulti, entryTime }] }`
//!
//! The provider does not assign obstacle ids; each accepted obstacle gets
//! its index in the response as id.

use serde::Deserialize;

use super::ServiceError;
use super::fallback::fallback_level;
use crate::sim::{Difficulty, LevelData, ObstacleKind, ObstacleSpec};

const DEFAULT_NAME: &str = "Unknown Depths";
const DEFAULT_DESCRIPTION: &str = "A mysterious trench.";

/// Transport for level generation
#[allow(async_fn_in_trait)]
pub trait LevelSource {
    /// Raw JSON body for a freshly generated level
    async fn fetch_level(&self, difficulty: Difficulty) -> Result<String, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct RawLevel {
    name: Option<String>,
    description: Option<String>,
    difficulty: Option<String>,
    #[serde(default)]
    obstacles: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawObstacle {
    #[serde(rename = "type")]
    kind: ObstacleKind,
    y_percent: f32,
    speed_multi: f32,
    entry_time: f64,
}

/// Parse a provider response body.
///
/// Individual obstacles that fail to parse or carry unusable numbers are
/// dropped with a warning; only a body that is not a JSON object fails.
pub fn parse_level(body: &str, requested: Difficulty) -> Result<LevelData, ServiceError> {
    if body.trim().is_empty() {
        return Err(ServiceError::Empty);
    }
    let raw: RawLevel = serde_json::from_str(body)?;

    let mut obstacles = Vec::with_capacity(raw.obstacles.len());
    for (index, value) in raw.obstacles.into_iter().enumerate() {
        let obstacle = match serde_json::from_value::<RawObstacle>(value) {
            Ok(obstacle) => obstacle,
            Err(e) => {
                log::warn!("Dropping obstacle #{}: {}", index, e);
                continue;
            }
        };
        let spec = ObstacleSpec {
            id: index as u32,
            kind: obstacle.kind,
            y_percent: obstacle.y_percent.clamp(0.0, 100.0),
            speed_multi: obstacle.speed_multi,
            entry_time_ms: obstacle.entry_time,
        };
        if !spec.is_well_formed() {
            log::warn!("Dropping obstacle #{}: out of range ({:?})", index, spec);
            continue;
        }
        obstacles.push(spec);
    }

    Ok(LevelData {
        name: non_blank(raw.name).unwrap_or_else(|| DEFAULT_NAME.to_string()),
        description: non_blank(raw.description).unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        difficulty: non_blank(raw.difficulty).unwrap_or_else(|| requested.as_str().to_string()),
        obstacles,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Ask the provider for a level, falling back to the built-in generator.
///
/// `seed` drives the fallback level's placement.
pub async fn request_level<S: LevelSource>(
    source: &S,
    difficulty: Difficulty,
    seed: u64,
) -> LevelData {
    let result = match source.fetch_level(difficulty).await {
        Ok(body) => parse_level(&body, difficulty),
        Err(e) => Err(e),
    };
    match result {
        Ok(level) => level,
        Err(e) => {
            log::warn!("Level generation failed ({}), using fallback level", e);
            fallback_level(seed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    struct Canned(&'static str);

    impl LevelSource for Canned {
        async fn fetch_level(&self, _difficulty: Difficulty) -> Result<String, ServiceError> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    impl LevelSource for Failing {
        async fn fetch_level(&self, _difficulty: Difficulty) -> Result<String, ServiceError> {
            Err(ServiceError::Status(503))
        }
    }

    const BODY: &str = r#"{
        "name": "Abyssal Gauntlet",
        "description": "Sharks everywhere.",
        "difficulty": "hard",
        "obstacles": [
            { "type": "shark", "yPercent": 20, "speedMulti": 2.0, "entryTime": 3000 },
            { "type": "jellyfish", "yPercent": 70, "speedMulti": 1.0, "entryTime": 1000 },
            { "type": "mine", "yPercent": 130, "speedMulti": 1.0, "entryTime": 5000 }
        ]
    }"#;

    #[test]
    fn test_parse_assigns_ids_and_keeps_storage_order() {
        let level = parse_level(BODY, Difficulty::Hard).unwrap();
        assert_eq!(level.name, "Abyssal Gauntlet");
        assert_eq!(level.difficulty, "hard");
        let ids: Vec<u32> = level.obstacles.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(level.obstacles[1].kind, ObstacleKind::Jellyfish);
        assert_eq!(level.obstacles[1].entry_time_ms, 1000.0);
        // Clamped into the field
        assert_eq!(level.obstacles[2].y_percent, 100.0);
        assert!(level.check_invariants().is_ok());
    }

    #[test]
    fn test_parse_defaults_missing_fields() {
        let level = parse_level(r#"{ "obstacles": [] }"#, Difficulty::Extreme).unwrap();
        assert_eq!(level.name, DEFAULT_NAME);
        assert_eq!(level.description, DEFAULT_DESCRIPTION);
        assert_eq!(level.difficulty, "extreme");
        assert!(level.obstacles.is_empty());

        let level = parse_level(r#"{ "name": "  " }"#, Difficulty::Normal).unwrap();
        assert_eq!(level.name, DEFAULT_NAME);
    }

    #[test]
    fn test_parse_skips_malformed_obstacles() {
        let body = r#"{
            "name": "Mixed",
            "obstacles": [
                { "type": "whale", "yPercent": 20, "speedMulti": 1.0, "entryTime": 0 },
                { "type": "puffer", "yPercent": "high", "speedMulti": 1.0, "entryTime": 0 },
                { "type": "puffer", "yPercent": 10, "speedMulti": 0, "entryTime": 0 },
                { "type": "puffer", "yPercent": 10, "speedMulti": 1.2, "entryTime": -5 },
                { "type": "mine", "yPercent": 40, "speedMulti": 1.0, "entryTime": 800 }
            ]
        }"#;
        let level = parse_level(body, Difficulty::Normal).unwrap();
        assert_eq!(level.obstacles.len(), 1);
        assert_eq!(level.obstacles[0].id, 4);
        assert_eq!(level.obstacles[0].kind, ObstacleKind::Mine);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_level("", Difficulty::Normal),
            Err(ServiceError::Empty)
        ));
        assert!(matches!(
            parse_level("not json", Difficulty::Normal),
            Err(ServiceError::Parse(_))
        ));
        assert!(matches!(
            parse_level("[1, 2]", Difficulty::Normal),
            Err(ServiceError::Parse(_))
        ));
    }

    #[test]
    fn test_request_level_uses_provider() {
        let level = block_on(request_level(&Canned(BODY), Difficulty::Hard, 1));
        assert_eq!(level.name, "Abyssal Gauntlet");
    }

    #[test]
    fn test_request_level_falls_back() {
        let level = block_on(request_level(&Failing, Difficulty::Extreme, 42));
        assert_eq!(level, fallback_level(42));

        let level = block_on(request_level(&Canned("{oops"), Difficulty::Normal, 42));
        assert_eq!(level, fallback_level(42));

        let level = block_on(request_level(&crate::services::Offline, Difficulty::Normal, 7));
        assert_eq!(level.obstacles.len(), 20);
    }
}
