//! Player settings and preferences
//!
//! Persisted in LocalStorage on web; defaults on native.

use serde::{Deserialize, Serialize};

use crate::sim::Difficulty;
use crate::tuning::Tuning;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Difficulty sent with level requests
    pub difficulty: Difficulty,

    // === HUD ===
    /// Draw padded collision boxes over sprites
    pub show_hitboxes: bool,
    /// Show FPS counter
    pub show_fps: bool,

    // === Services ===
    /// Base URL of the AI proxy; offline fallbacks when unset
    pub service_endpoint: Option<String>,

    /// Simulation balance
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            show_hitboxes: false,
            show_fps: true,
            service_endpoint: None,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "deep_dodge_settings";

    /// Parse stored settings, rejecting tuning that fails validation
    pub fn from_json(json: &str) -> Option<Self> {
        let settings: Self = match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring stored settings: {}", e);
                return None;
            }
        };
        if let Err(e) = settings.tuning.validate() {
            log::warn!("Ignoring stored settings: {}", e);
            return None;
        }
        Some(settings)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No settings store on native ({})", Self::STORAGE_KEY);
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
