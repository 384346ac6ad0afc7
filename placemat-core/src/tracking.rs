//! Tracking quality reported by the capture session.

use serde::{Deserialize, Serialize};

/// How well the session can currently track device motion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "quality", content = "reason", rename_all = "snake_case")]
pub enum TrackingQuality {
    /// Tracking is working normally.
    Normal,
    /// Tracking is unavailable on this device or in this environment.
    NotAvailable,
    /// Tracking works but quality is degraded.
    Limited(TrackingLimitation),
}

/// Why tracking quality is degraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingLimitation {
    /// The device is moving too fast for tracking to keep up.
    ExcessiveMotion,
    /// The camera sees too little detail to track against.
    InsufficientFeatures,
    /// The session is still starting up.
    Initializing,
    /// The session is re-establishing tracking after an interruption.
    Relocalizing,
    /// A reason this build does not recognize, carried verbatim.
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_round_trips_through_json() {
        let quality = TrackingQuality::Limited(TrackingLimitation::ExcessiveMotion);
        let json = serde_json::to_string(&quality).unwrap();
        let back: TrackingQuality = serde_json::from_str(&json).unwrap();
        assert_eq!(back, quality);
    }

    #[test]
    fn unknown_reasons_carry_their_label() {
        let quality = TrackingQuality::Limited(TrackingLimitation::Other("thermal".to_string()));
        let json = serde_json::to_string(&quality).unwrap();
        assert!(json.contains("thermal"));
        let back: TrackingQuality = serde_json::from_str(&json).unwrap();
        assert_eq!(back, quality);
    }
}
