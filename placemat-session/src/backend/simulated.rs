//! Deterministic simulated tracking backend.
//!
//! Stands in for a platform AR runtime: planes appear, drift in and out of
//! view, and tracking degrades exactly when a frame-indexed script says so.
//! One `update` call advances one simulated frame, so identical scripts
//! always produce identical runs.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use placemat_core::{
    AnchorId, RestartOptions, SessionEvent, SurfaceAlignment, SurfaceAnchor, SurfaceHit,
    TrackingLimitation, TrackingQuality, Vec3,
};

use crate::backend::{TrackingBackend, ViewPoint};
use crate::{SessionConfig, SessionError, SessionResult};

/// Frames between anchor removal and the simulator re-detecting a plane.
const REDETECT_DELAY_FRAMES: u64 = 30;
/// Frames a tracking reset spends initializing before returning to normal.
const TRACKING_SETTLE_FRAMES: u64 = 15;

/// Normalized view region a simulated plane currently covers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageRect {
    /// Left edge, `0.0..=1.0`.
    pub min_x: f32,
    /// Top edge, `0.0..=1.0`.
    pub min_y: f32,
    /// Right edge, `0.0..=1.0`.
    pub max_x: f32,
    /// Bottom edge, `0.0..=1.0`.
    pub max_y: f32,
}

impl CoverageRect {
    /// Create a new coverage region.
    #[must_use]
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// A region covering the whole view.
    #[must_use]
    pub const fn full() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Whether a view point falls inside this region.
    #[must_use]
    pub fn contains(&self, point: ViewPoint) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

/// A world mutation or signal the simulator performs when scripted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", content = "data", rename_all = "snake_case")]
pub enum WorldStep {
    /// Introduce a physical plane. It is detected (and announced) only if
    /// the active configuration wants its alignment.
    AddPlane {
        /// Center of the plane in world space.
        center: Vec3,
        /// Extent along the plane's local X axis, in meters.
        extent_x: f32,
        /// Extent along the plane's local Z axis, in meters.
        extent_z: f32,
        /// Orientation of the plane.
        alignment: SurfaceAlignment,
        /// View region the plane initially covers.
        coverage: CoverageRect,
    },

    /// Move a plane's view coverage; `None` takes it out of view.
    SetCoverage {
        /// Index of the plane, in `AddPlane` order.
        plane: usize,
        /// New coverage, or `None` when the camera looks away.
        coverage: Option<CoverageRect>,
    },

    /// Change the reported tracking quality.
    SetTracking {
        /// The new quality.
        quality: TrackingQuality,
    },

    /// Interrupt the session, as when the platform takes the camera away.
    Interrupt,

    /// End a previous interruption.
    EndInterruption,

    /// Fail the session outright.
    Fail {
        /// Failure description delivered with the event.
        message: String,
    },
}

/// A scripted step bound to the frame it fires on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimStep {
    /// Frame number the step fires on, starting at 1 for the first update.
    pub at_frame: u64,
    /// What happens.
    pub step: WorldStep,
}

/// Frame-indexed script for the simulated backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimScript {
    /// Steps to perform. Order within a frame is preserved.
    pub steps: Vec<SimStep>,
}

impl SimScript {
    /// Create a script from a list of steps.
    #[must_use]
    pub fn new(steps: Vec<SimStep>) -> Self {
        Self { steps }
    }
}

/// A physical plane living in the simulated world.
#[derive(Debug, Clone)]
struct SimulatedPlane {
    center: Vec3,
    extent_x: f32,
    extent_z: f32,
    alignment: SurfaceAlignment,
    coverage: Option<CoverageRect>,
    anchor: Option<AnchorId>,
    redetect_at: Option<u64>,
}

/// A scripted, fully deterministic [`TrackingBackend`].
pub struct SimulatedBackend {
    steps: Vec<SimStep>,
    next_step: usize,
    frame: u64,
    running: bool,
    interrupted: bool,
    supported: bool,
    config: SessionConfig,
    planes: Vec<SimulatedPlane>,
    events: VecDeque<SessionEvent>,
    tracking_normal_at: Option<u64>,
}

impl SimulatedBackend {
    /// Create a backend that plays back the given script.
    #[must_use]
    pub fn new(script: SimScript) -> Self {
        let mut steps = script.steps;
        steps.sort_by_key(|step| step.at_frame);
        Self {
            steps,
            next_step: 0,
            frame: 0,
            running: false,
            interrupted: false,
            supported: true,
            config: SessionConfig::default(),
            planes: Vec::new(),
            events: VecDeque::new(),
            tracking_normal_at: None,
        }
    }

    /// A backend for a platform without world tracking.
    #[must_use]
    pub fn unsupported() -> Self {
        let mut backend = Self::new(SimScript::default());
        backend.supported = false;
        backend
    }

    /// Current simulated frame number.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    fn apply_due_steps(&mut self) {
        while let Some(next) = self.steps.get(self.next_step) {
            if next.at_frame > self.frame {
                break;
            }
            let step = next.step.clone();
            self.next_step += 1;
            self.apply(step);
        }
    }

    fn apply(&mut self, step: WorldStep) {
        match step {
            WorldStep::AddPlane {
                center,
                extent_x,
                extent_z,
                alignment,
                coverage,
            } => {
                self.planes.push(SimulatedPlane {
                    center,
                    extent_x,
                    extent_z,
                    alignment,
                    coverage: Some(coverage),
                    anchor: None,
                    redetect_at: None,
                });
                self.try_detect(self.planes.len() - 1);
            }
            WorldStep::SetCoverage { plane, coverage } => {
                if let Some(entry) = self.planes.get_mut(plane) {
                    entry.coverage = coverage;
                } else {
                    tracing::warn!("Scripted coverage change for unknown plane {plane}");
                }
            }
            WorldStep::SetTracking { quality } => {
                self.events.push_back(SessionEvent::TrackingChanged(quality));
            }
            WorldStep::Interrupt => {
                self.interrupted = true;
                self.events.push_back(SessionEvent::Interrupted);
            }
            WorldStep::EndInterruption => {
                self.interrupted = false;
                self.events.push_back(SessionEvent::InterruptionEnded);
            }
            WorldStep::Fail { message } => {
                self.events.push_back(SessionEvent::Failed { message });
            }
        }
    }

    /// Mint an anchor for a plane if the active configuration wants its
    /// alignment. Planes that already carry an anchor are left alone.
    fn try_detect(&mut self, index: usize) {
        let Some(plane) = self.planes.get_mut(index) else {
            return;
        };
        if plane.anchor.is_some() {
            return;
        }
        if !self.config.plane_detection.detects(plane.alignment) {
            tracing::debug!("Plane {index} present but {} detection is off", plane.alignment);
            return;
        }
        let anchor =
            SurfaceAnchor::new(plane.center, plane.extent_x, plane.extent_z, plane.alignment);
        plane.anchor = Some(anchor.id);
        plane.redetect_at = None;
        self.events.push_back(SessionEvent::AnchorAdded(anchor));
    }

    fn process_pending(&mut self) {
        for index in 0..self.planes.len() {
            let due = self.planes[index]
                .redetect_at
                .is_some_and(|at| at <= self.frame);
            if due {
                self.try_detect(index);
            }
        }
        if self.tracking_normal_at.is_some_and(|at| at <= self.frame) {
            self.tracking_normal_at = None;
            self.events
                .push_back(SessionEvent::TrackingChanged(TrackingQuality::Normal));
        }
    }
}

impl TrackingBackend for SimulatedBackend {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn start(&mut self, config: &SessionConfig) -> SessionResult<()> {
        if !self.supported {
            return Err(SessionError::Unsupported);
        }
        if self.running {
            return Err(SessionError::Start("session already running".to_string()));
        }
        self.config = config.clone();
        self.running = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.running = false;
    }

    fn restart(&mut self, config: &SessionConfig, options: RestartOptions) -> SessionResult<()> {
        if !self.supported {
            return Err(SessionError::Unsupported);
        }
        self.config = config.clone();
        self.running = true;
        self.interrupted = false;
        if options.remove_existing_anchors {
            for plane in &mut self.planes {
                if plane.anchor.take().is_some() {
                    plane.redetect_at = Some(self.frame + REDETECT_DELAY_FRAMES);
                }
            }
        }
        if options.reset_tracking {
            self.events.push_back(SessionEvent::TrackingChanged(TrackingQuality::Limited(
                TrackingLimitation::Initializing,
            )));
            self.tracking_normal_at = Some(self.frame + TRACKING_SETTLE_FRAMES);
        }
        Ok(())
    }

    fn update(&mut self, _dt: Duration) {
        // One scripted frame per update; wall-clock dt is irrelevant here.
        if !self.running {
            return;
        }
        self.frame += 1;
        self.apply_due_steps();
        self.process_pending();
    }

    fn poll_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    fn hit_test(&self, point: ViewPoint) -> Option<SurfaceHit> {
        if !self.running || self.interrupted {
            return None;
        }
        self.planes.iter().find_map(|plane| {
            if plane.alignment != SurfaceAlignment::Horizontal {
                return None;
            }
            let anchor = plane.anchor?;
            let coverage = plane.coverage?;
            if !coverage.contains(point) {
                return None;
            }
            let offset = Vec3::new(
                span_fraction(point.x, coverage.min_x, coverage.max_x) * plane.extent_x,
                0.0,
                span_fraction(point.y, coverage.min_y, coverage.max_y) * plane.extent_z,
            );
            Some(SurfaceHit {
                anchor,
                world_position: plane.center.add(&offset),
            })
        })
    }
}

/// Where `value` sits within `min..=max`, as a centered fraction in
/// `-0.5..=0.5`. Degenerate spans map to the center.
fn span_fraction(value: f32, min: f32, max: f32) -> f32 {
    let span = max - min;
    if span <= f32::EPSILON {
        0.0
    } else {
        (value - min) / span - 0.5
    }
}
