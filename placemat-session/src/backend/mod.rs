//! Tracking backend implementations.

pub mod simulated;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use placemat_core::{RestartOptions, SessionEvent, SurfaceHit};

use crate::{SessionConfig, SessionResult};

/// A point in normalized view coordinates, `(0, 0)` top-left to `(1, 1)`
/// bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewPoint {
    /// Horizontal coordinate, `0.0..=1.0`.
    pub x: f32,
    /// Vertical coordinate, `0.0..=1.0`.
    pub y: f32,
}

impl ViewPoint {
    /// Create a new view point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Trait for AR tracking backends.
///
/// Platform runtimes deliver their callbacks on arbitrary threads; an
/// implementation must queue whatever it observes internally and only
/// surface it through [`Self::poll_events`], which the owner calls from its
/// own single context. Nothing here blocks.
pub trait TrackingBackend {
    /// Whether world tracking is available on this platform.
    fn is_supported(&self) -> bool;

    /// Start the capture session with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot start. Starting an already
    /// running session is an error; use [`Self::restart`] to reconfigure.
    fn start(&mut self, config: &SessionConfig) -> SessionResult<()>;

    /// Pause the capture session. Time stops for a paused session.
    fn pause(&mut self);

    /// Rerun the capture session, optionally resetting tracking and
    /// discarding detected anchors.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be rerun.
    fn restart(&mut self, config: &SessionConfig, options: RestartOptions) -> SessionResult<()>;

    /// Advance the backend by one frame of wall-clock time.
    fn update(&mut self, dt: Duration);

    /// Drain events observed since the last poll, in arrival order.
    fn poll_events(&mut self) -> Vec<SessionEvent>;

    /// Test a view point against detected horizontal surfaces.
    fn hit_test(&self, point: ViewPoint) -> Option<SurfaceHit>;
}
