//! Face-presence signal and similarity analysis state
//!
//! The vision model lives outside the crate and reports one face count per
//! video frame. `FacePresence` turns that stream into a capture trigger:
//! two faces held steady for a run of frames, rate-limited by a cooldown.
//! This pipeline never touches the game session.

use serde::{Deserialize, Serialize};

use crate::services::SimilarityResult;

/// Faces the analysis needs in frame
pub const REQUIRED_FACES: usize = 2;

/// Capture trigger thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacePresenceConfig {
    /// Consecutive two-face frames that must be exceeded before capture
    pub stable_frames: u32,
    /// Minimum time between captures (ms)
    pub cooldown_ms: f64,
}

impl Default for FacePresenceConfig {
    fn default() -> Self {
        Self {
            stable_frames: 30,
            cooldown_ms: 5000.0,
        }
    }
}

/// What the camera currently sees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceStatus {
    NoSubjects,
    WaitingForSecond,
    Ready,
    TooMany,
}

impl FaceStatus {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => FaceStatus::NoSubjects,
            1 => FaceStatus::WaitingForSecond,
            REQUIRED_FACES => FaceStatus::Ready,
            _ => FaceStatus::TooMany,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FaceStatus::NoSubjects => "NO SUBJECTS DETECTED",
            FaceStatus::WaitingForSecond => "WAITING FOR SECOND SUBJECT...",
            FaceStatus::Ready => "READY FOR ANALYSIS",
            FaceStatus::TooMany => "TOO MANY SUBJECTS",
        }
    }
}

/// Per-frame result of [`FacePresence::observe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceFrame {
    pub status: FaceStatus,
    /// Take a still now
    pub capture: bool,
}

/// Stability tracker over the face-count stream
#[derive(Debug, Clone, Default)]
pub struct FacePresence {
    config: FacePresenceConfig,
    stable_frames: u32,
    last_capture_ms: Option<f64>,
}

impl FacePresence {
    pub fn new(config: FacePresenceConfig) -> Self {
        Self {
            config,
            stable_frames: 0,
            last_capture_ms: None,
        }
    }

    /// Consecutive two-face frames seen so far
    pub fn stable_frames(&self) -> u32 {
        self.stable_frames
    }

    /// Feed one detection frame
    pub fn observe(&mut self, face_count: usize, now_ms: f64) -> FaceFrame {
        let status = FaceStatus::from_count(face_count);
        if status != FaceStatus::Ready {
            self.stable_frames = 0;
            return FaceFrame {
                status,
                capture: false,
            };
        }

        self.stable_frames += 1;
        let cooled_down = self
            .last_capture_ms
            .is_none_or(|last| now_ms - last > self.config.cooldown_ms);
        let capture = self.stable_frames > self.config.stable_frames && cooled_down;
        if capture {
            log::info!("Two faces stable for {} frames, capturing", self.stable_frames);
            self.last_capture_ms = Some(now_ms);
            self.stable_frames = 0;
        }

        FaceFrame { status, capture }
    }
}

/// Similarity panel state
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Analysis {
    #[default]
    Idle,
    Analyzing,
    Ready(SimilarityResult),
}

impl Analysis {
    /// Begin a new analysis. Returns false (and changes nothing) while one
    /// is already in flight; otherwise the previous result is cleared.
    pub fn begin(&mut self) -> bool {
        if self.is_analyzing() {
            return false;
        }
        *self = Analysis::Analyzing;
        true
    }

    /// Store the judge's answer
    pub fn finish(&mut self, result: SimilarityResult) {
        *self = Analysis::Ready(result);
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self, Analysis::Analyzing)
    }

    pub fn result(&self) -> Option<&SimilarityResult> {
        match self {
            Analysis::Ready(result) => Some(result),
            _ => None,
        }
    }
}

/// Camera/vision availability for the face panel
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FacePanel {
    /// Model or camera still starting
    #[default]
    Initializing,
    Live,
    /// Permanent failure; face features stay off until reload
    Error(String),
}

impl FacePanel {
    /// Record a device or model failure. Once failed, the panel stays failed.
    pub fn fail(&mut self, message: impl Into<String>) {
        if !matches!(self, FacePanel::Error(_)) {
            let message = message.into();
            log::error!("Face detection unavailable: {}", message);
            *self = FacePanel::Error(message);
        }
    }

    /// Model and camera reported ready
    pub fn mark_live(&mut self) {
        if matches!(self, FacePanel::Initializing) {
            *self = FacePanel::Live;
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, FacePanel::Live)
    }
}
