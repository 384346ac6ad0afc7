//! Rotation actions that animate scene nodes over time.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Duration of the standard half-turn spin, in seconds.
const HALF_TURN_SECS: u64 = 3;

/// A principal rotation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

/// A timed rotation around a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spin {
    /// Axis to rotate around.
    pub axis: Axis,
    /// Total angle to sweep, in radians. May be negative.
    pub angle: f32,
    /// Time the sweep takes. A zero duration applies the whole angle
    /// on the first advance.
    pub duration: Duration,
}

impl Spin {
    /// Create a new spin.
    #[must_use]
    pub const fn new(axis: Axis, angle: f32, duration: Duration) -> Self {
        Self {
            axis,
            angle,
            duration,
        }
    }

    /// The standard demo spin: half a turn over three seconds.
    #[must_use]
    pub const fn half_turn(axis: Axis) -> Self {
        Self::new(axis, std::f32::consts::PI, Duration::from_secs(HALF_TURN_SECS))
    }
}

/// A [`Spin`] in flight on some node.
///
/// Progress is tracked as a fraction so the accumulated rotation lands on
/// the requested angle when the action completes, independent of tick size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveSpin {
    spin: Spin,
    progress: f32,
}

impl ActiveSpin {
    /// Start running a spin.
    #[must_use]
    pub fn new(spin: Spin) -> Self {
        Self {
            spin,
            progress: 0.0,
        }
    }

    /// The axis this action rotates around.
    #[must_use]
    pub fn axis(&self) -> Axis {
        self.spin.axis
    }

    /// Advance by `dt` and return the rotation delta (radians) to apply.
    /// Returns zero once the action has completed.
    pub fn advance(&mut self, dt: Duration) -> f32 {
        let step = if self.spin.duration.is_zero() {
            1.0 - self.progress
        } else {
            let fraction = dt.as_secs_f32() / self.spin.duration.as_secs_f32();
            fraction.min(1.0 - self.progress)
        };
        self.progress += step;
        step * self.spin.angle
    }

    /// Whether the full angle has been applied.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }
}
