//! # Placemat Session
//!
//! The boundary between the placement core and whatever AR runtime drives
//! it. [`Session`] wraps a [`TrackingBackend`] with lifecycle management,
//! ordered event polling, the per-frame viewport scan, and frame
//! statistics.
//!
//! ## Backends
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            TrackingBackend Trait            │
//! ├──────────────────────┬──────────────────────┤
//! │ Simulated            │ Platform runtimes    │
//! │ (scripted, offline)  │ (native AR sessions) │
//! └──────────────────────┴──────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod error;

pub use backend::simulated::{CoverageRect, SimScript, SimStep, SimulatedBackend, WorldStep};
pub use backend::{TrackingBackend, ViewPoint};
pub use error::{SessionError, SessionResult};

use std::time::Duration;

use serde::{Deserialize, Serialize};

use placemat_core::{RestartOptions, SessionEvent, SurfaceAlignment, SurfaceHit};

/// Number of divisions along each viewport axis for the visibility scan.
/// The scan samples `(SCAN_DIVISIONS + 1)²` points.
const SCAN_DIVISIONS: u32 = 4;

/// How the session's world coordinate frame is aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldAlignment {
    /// Y opposes gravity; origin and heading fixed at session start.
    Gravity,
    /// Like [`Self::Gravity`], with axes aligned to compass heading.
    GravityAndHeading,
    /// Locked to the initial camera orientation.
    Camera,
}

/// Which surface orientations the session should detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaneDetection {
    /// Detect floor- and table-like surfaces.
    pub horizontal: bool,
    /// Detect wall-like surfaces.
    pub vertical: bool,
}

impl PlaneDetection {
    /// Detect horizontal surfaces only.
    #[must_use]
    pub const fn horizontal() -> Self {
        Self {
            horizontal: true,
            vertical: false,
        }
    }

    /// Whether surfaces with `alignment` should be detected.
    #[must_use]
    pub fn detects(self, alignment: SurfaceAlignment) -> bool {
        match alignment {
            SurfaceAlignment::Horizontal => self.horizontal,
            SurfaceAlignment::Vertical => self.vertical,
        }
    }
}

impl Default for PlaneDetection {
    fn default() -> Self {
        Self::horizontal()
    }
}

/// Configuration for a world-tracking session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// World coordinate frame alignment.
    pub world_alignment: WorldAlignment,
    /// Surface orientations to detect.
    pub plane_detection: PlaneDetection,
    /// Estimate ambient light from camera frames.
    pub light_estimation: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            world_alignment: WorldAlignment::Gravity,
            plane_detection: PlaneDetection::horizontal(),
            light_estimation: true,
        }
    }
}

/// Rolling frame statistics for a running session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameStats {
    /// Frames processed since the last reset.
    pub frames: u64,
    /// Exponential moving average of the frame time, in milliseconds.
    pub avg_frame_time_ms: f64,
    /// Worst frame time seen, in milliseconds.
    pub peak_frame_time_ms: f64,
}

impl FrameStats {
    /// Fold one frame's duration into the statistics.
    pub fn record(&mut self, dt: Duration) {
        let ms = dt.as_secs_f64() * 1000.0;
        self.frames += 1;
        if self.frames == 1 {
            self.avg_frame_time_ms = ms;
        } else {
            let alpha = 0.1;
            self.avg_frame_time_ms = alpha * ms + (1.0 - alpha) * self.avg_frame_time_ms;
        }
        if ms > self.peak_frame_time_ms {
            self.peak_frame_time_ms = ms;
        }
    }

    /// Clear the statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A world-tracking session over some backend.
pub struct Session {
    config: SessionConfig,
    backend: Box<dyn TrackingBackend>,
    running: bool,
    stats: FrameStats,
}

impl Session {
    /// Create a session over the given backend. Nothing runs until
    /// [`Self::start`] is called.
    #[must_use]
    pub fn new(backend: Box<dyn TrackingBackend>, config: SessionConfig) -> Self {
        Self {
            config,
            backend,
            running: false,
            stats: FrameStats::default(),
        }
    }

    /// Start the capture session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Unsupported`] if the platform cannot track,
    /// or the backend's error if the session fails to start.
    pub fn start(&mut self) -> SessionResult<()> {
        if !self.backend.is_supported() {
            tracing::error!("World tracking not supported; session unavailable");
            return Err(SessionError::Unsupported);
        }
        self.backend.start(&self.config)?;
        self.running = true;
        tracing::info!("Tracking session started: {:?}", self.config);
        Ok(())
    }

    /// Pause the capture session.
    pub fn pause(&mut self) {
        if !self.running {
            return;
        }
        self.backend.pause();
        self.running = false;
        tracing::info!("Tracking session paused");
    }

    /// Rerun the capture session with the current configuration.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the session cannot be rerun.
    pub fn restart(&mut self, options: RestartOptions) -> SessionResult<()> {
        self.backend.restart(&self.config, options)?;
        self.running = true;
        tracing::info!(
            "Tracking session restarted (reset_tracking: {}, remove_existing_anchors: {})",
            options.reset_tracking,
            options.remove_existing_anchors
        );
        Ok(())
    }

    /// Advance the session by one frame. Does nothing while not running.
    pub fn update(&mut self, dt: Duration) {
        if !self.running {
            return;
        }
        self.backend.update(dt);
        self.stats.record(dt);
    }

    /// Drain events observed since the last poll, in arrival order.
    pub fn poll_events(&mut self) -> Vec<SessionEvent> {
        self.backend.poll_events()
    }

    /// Test a view point against detected horizontal surfaces.
    #[must_use]
    pub fn hit_test(&self, point: ViewPoint) -> Option<SurfaceHit> {
        self.backend.hit_test(point)
    }

    /// Whether any detected surface is currently in view.
    ///
    /// Samples a fixed grid across the viewport and returns on the first
    /// point that hits a surface.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn surface_in_view(&self) -> bool {
        for y in 0..=SCAN_DIVISIONS {
            let y_coord = y as f32 / SCAN_DIVISIONS as f32;
            for x in 0..=SCAN_DIVISIONS {
                let x_coord = x as f32 / SCAN_DIVISIONS as f32;
                if self.backend.hit_test(ViewPoint::new(x_coord, y_coord)).is_some() {
                    return true;
                }
            }
        }
        false
    }

    /// Whether the session is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Frame statistics since the session started.
    #[must_use]
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn default_config_matches_the_demo_profile() {
        let config = SessionConfig::default();
        assert_eq!(config.world_alignment, WorldAlignment::Gravity);
        assert!(config.plane_detection.horizontal);
        assert!(!config.plane_detection.vertical);
        assert!(config.light_estimation);
    }

    #[test]
    fn plane_detection_filters_alignments() {
        let detection = PlaneDetection::horizontal();
        assert!(detection.detects(SurfaceAlignment::Horizontal));
        assert!(!detection.detects(SurfaceAlignment::Vertical));
    }

    #[test]
    fn frame_stats_track_average_and_peak() {
        let mut stats = FrameStats::default();
        stats.record(Duration::from_millis(16));
        assert_eq!(stats.frames, 1);
        assert!((stats.avg_frame_time_ms - 16.0).abs() < 1e-9);

        stats.record(Duration::from_millis(32));
        assert_eq!(stats.frames, 2);
        assert!(stats.avg_frame_time_ms > 16.0);
        assert!(stats.avg_frame_time_ms < 32.0);
        assert!((stats.peak_frame_time_ms - 32.0).abs() < 1e-9);

        stats.reset();
        assert_eq!(stats.frames, 0);
    }

    #[test]
    fn session_refuses_an_unsupported_backend() {
        let backend = Box::new(SimulatedBackend::unsupported());
        let mut session = Session::new(backend, SessionConfig::default());

        assert!(matches!(session.start(), Err(SessionError::Unsupported)));
        assert!(!session.is_running());
    }

    #[test]
    fn update_only_counts_while_running() {
        let backend = Box::new(SimulatedBackend::new(SimScript::default()));
        let mut session = Session::new(backend, SessionConfig::default());

        session.update(Duration::from_millis(16));
        assert_eq!(session.stats().frames, 0);

        session.start().expect("start succeeds");
        session.update(Duration::from_millis(16));
        assert_eq!(session.stats().frames, 1);

        session.pause();
        session.update(Duration::from_millis(16));
        assert_eq!(session.stats().frames, 1);
    }

    /// Backend that counts hit tests and can be told whether to hit.
    struct CountingBackend {
        hits: bool,
        calls: Rc<Cell<usize>>,
    }

    impl TrackingBackend for CountingBackend {
        fn is_supported(&self) -> bool {
            true
        }
        fn start(&mut self, _config: &SessionConfig) -> SessionResult<()> {
            Ok(())
        }
        fn pause(&mut self) {}
        fn restart(
            &mut self,
            _config: &SessionConfig,
            _options: RestartOptions,
        ) -> SessionResult<()> {
            Ok(())
        }
        fn update(&mut self, _dt: Duration) {}
        fn poll_events(&mut self) -> Vec<SessionEvent> {
            Vec::new()
        }
        fn hit_test(&self, _point: ViewPoint) -> Option<SurfaceHit> {
            self.calls.set(self.calls.get() + 1);
            if self.hits {
                Some(SurfaceHit {
                    anchor: placemat_core::AnchorId::new(),
                    world_position: placemat_core::Vec3::zero(),
                })
            } else {
                None
            }
        }
    }

    #[test]
    fn visibility_scan_samples_the_full_grid_when_nothing_hits() {
        let calls = Rc::new(Cell::new(0));
        let backend = Box::new(CountingBackend {
            hits: false,
            calls: Rc::clone(&calls),
        });
        let session = Session::new(backend, SessionConfig::default());

        assert!(!session.surface_in_view());
        // 5 x 5 sample points.
        assert_eq!(calls.get(), 25);
    }

    #[test]
    fn visibility_scan_short_circuits_on_the_first_hit() {
        let calls = Rc::new(Cell::new(0));
        let backend = Box::new(CountingBackend {
            hits: true,
            calls: Rc::clone(&calls),
        });
        let session = Session::new(backend, SessionConfig::default());

        assert!(session.surface_in_view());
        assert_eq!(calls.get(), 1);
    }
}
