//! Scenario files describing a demo run.
//!
//! A scenario is a single frame-indexed list mixing world steps (played by
//! the simulated backend) with user actions (played by the app loop), so a
//! whole demo reads top to bottom in one place.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use placemat_core::{Axis, SurfaceAlignment, TrackingLimitation, TrackingQuality, Vec3};
use placemat_session::{CoverageRect, SimScript, SimStep, WorldStep};

/// One scripted occurrence: the world changes, or the user acts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "snake_case")]
pub enum ScenarioAction {
    /// The simulated world does something.
    World(WorldStep),

    /// The user taps the view at normalized coordinates.
    Tap {
        /// Horizontal coordinate, `0.0..=1.0`.
        x: f32,
        /// Vertical coordinate, `0.0..=1.0`.
        y: f32,
    },

    /// The user presses one of the spin buttons.
    SpinSphere {
        /// Axis to spin the sphere around.
        axis: Axis,
    },
}

/// A scenario action bound to the frame it happens on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// Frame number the action happens on, starting at 1.
    pub at_frame: u64,
    /// What happens.
    pub action: ScenarioAction,
}

/// A user action extracted from a scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserStep {
    /// Frame number the action happens on.
    pub at_frame: u64,
    /// What the user does.
    pub action: UserAction,
}

/// Things the user can do during a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserAction {
    /// Tap the view at normalized coordinates.
    Tap {
        /// Horizontal coordinate, `0.0..=1.0`.
        x: f32,
        /// Vertical coordinate, `0.0..=1.0`.
        y: f32,
    },
    /// Spin the placed sphere around an axis.
    SpinSphere {
        /// Axis to spin around.
        axis: Axis,
    },
}

/// A complete demo scenario: world script plus user actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Whether the simulated platform supports world tracking at all.
    #[serde(default = "default_true")]
    pub tracking_supported: bool,
    /// Scripted steps; frame order is established when the scenario runs.
    pub steps: Vec<ScenarioStep>,
}

fn default_true() -> bool {
    true
}

impl Scenario {
    /// Load a scenario from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading scenario file {}", path.display()))?;
        let scenario = serde_json::from_str(&raw)
            .with_context(|| format!("parsing scenario file {}", path.display()))?;
        Ok(scenario)
    }

    /// The scripted demo played when no scenario file is given.
    ///
    /// Walks the whole flow at 60 fps: tracking settles, a floor appears,
    /// the user places and spins objects, the camera drifts away and back,
    /// tracking degrades, and an interruption forces a full reset before
    /// one final placement.
    #[must_use]
    pub fn builtin() -> Self {
        let floor_coverage = CoverageRect::new(0.1, 0.45, 0.9, 0.95);
        let steps = vec![
            world(
                15,
                WorldStep::SetTracking {
                    quality: TrackingQuality::Limited(TrackingLimitation::Initializing),
                },
            ),
            world(
                45,
                WorldStep::SetTracking {
                    quality: TrackingQuality::Normal,
                },
            ),
            world(
                90,
                WorldStep::AddPlane {
                    center: Vec3::new(0.0, -0.4, -1.0),
                    extent_x: 1.2,
                    extent_z: 0.8,
                    alignment: SurfaceAlignment::Horizontal,
                    coverage: floor_coverage,
                },
            ),
            tap(120, 0.5, 0.7),
            spin(150, Axis::X),
            spin(210, Axis::Y),
            spin(270, Axis::Z),
            tap(300, 0.55, 0.8),
            world(
                330,
                WorldStep::SetCoverage {
                    plane: 0,
                    coverage: None,
                },
            ),
            world(
                360,
                WorldStep::SetCoverage {
                    plane: 0,
                    coverage: Some(floor_coverage),
                },
            ),
            world(
                390,
                WorldStep::SetTracking {
                    quality: TrackingQuality::Limited(TrackingLimitation::ExcessiveMotion),
                },
            ),
            world(
                405,
                WorldStep::SetTracking {
                    quality: TrackingQuality::Normal,
                },
            ),
            world(420, WorldStep::Interrupt),
            world(450, WorldStep::EndInterruption),
            tap(510, 0.5, 0.7),
        ];
        Self {
            tracking_supported: true,
            steps,
        }
    }

    /// Split into the backend's world script and the app's ordered user
    /// steps.
    #[must_use]
    pub fn split(self) -> (SimScript, Vec<UserStep>) {
        let mut world_steps = Vec::new();
        let mut user_steps = Vec::new();
        for step in self.steps {
            match step.action {
                ScenarioAction::World(world_step) => world_steps.push(SimStep {
                    at_frame: step.at_frame,
                    step: world_step,
                }),
                ScenarioAction::Tap { x, y } => user_steps.push(UserStep {
                    at_frame: step.at_frame,
                    action: UserAction::Tap { x, y },
                }),
                ScenarioAction::SpinSphere { axis } => user_steps.push(UserStep {
                    at_frame: step.at_frame,
                    action: UserAction::SpinSphere { axis },
                }),
            }
        }
        user_steps.sort_by_key(|step| step.at_frame);
        (SimScript::new(world_steps), user_steps)
    }
}

fn world(at_frame: u64, step: WorldStep) -> ScenarioStep {
    ScenarioStep {
        at_frame,
        action: ScenarioAction::World(step),
    }
}

fn tap(at_frame: u64, x: f32, y: f32) -> ScenarioStep {
    ScenarioStep {
        at_frame,
        action: ScenarioAction::Tap { x, y },
    }
}

fn spin(at_frame: u64, axis: Axis) -> ScenarioStep {
    ScenarioStep {
        at_frame,
        action: ScenarioAction::SpinSphere { axis },
    }
}
