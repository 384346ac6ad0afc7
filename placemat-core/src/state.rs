//! Placement state management.
//!
//! [`PlacementState`] owns the surface-acquisition flow: it consumes
//! tracking-session signals, keeps the scene graph in sync with detected
//! surfaces and placed objects, and projects a single status line for the
//! user. All mutation happens on the caller's context; events arriving from
//! other threads must be handed over through the session's polling queue
//! first.

use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    AnchorId, Axis, Color, Geometry, Material, MaterialSource, Node, NodeId, Scene, Spin,
    SurfaceAnchor, SurfaceHit, TrackingLimitation, TrackingQuality, Vec3,
};

/// Radius of the placeable sphere, in meters.
const SPHERE_RADIUS: f32 = 0.07;
/// Edge length of the placeable cube, in meters.
const CUBE_EDGE: f32 = 0.07;
/// Offset of the cube from the sphere along the surface's X axis.
const CUBE_OFFSET_X: f32 = 0.15;
/// Texture drawn on detected-surface markers.
const GRID_TEXTURE: &str = "grid";
/// Texture drawn on the placeable sphere.
const SPHERE_TEXTURE: &str = "earth";

/// Where the app is in the surface-acquisition flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    /// No surface has been detected yet.
    LookingForSurface,
    /// At least one surface is known, but none is currently in view.
    PointingAtSurface,
    /// A surface is in view and objects can be placed on it.
    ReadyToPlace,
}

/// Debug drawing toggles derived from the app state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugOverlay {
    /// Draw the raw feature points the tracker sees.
    pub feature_points: bool,
    /// Draw the world-origin axes.
    pub world_origin: bool,
}

impl DebugOverlay {
    /// The overlay shown before the session delivers its first frame.
    #[must_use]
    pub const fn startup() -> Self {
        Self {
            feature_points: true,
            world_origin: true,
        }
    }
}

/// How the capture session should be restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartOptions {
    /// Discard the current device pose and start tracking from scratch.
    pub reset_tracking: bool,
    /// Forget every anchor detected so far.
    pub remove_existing_anchors: bool,
}

impl RestartOptions {
    /// Reset tracking and remove all anchors.
    #[must_use]
    pub const fn reset_all() -> Self {
        Self {
            reset_tracking: true,
            remove_existing_anchors: true,
        }
    }
}

/// Scene nodes backing one detected surface.
#[derive(Debug, Clone, Copy)]
struct SurfaceNodes {
    anchor: NodeId,
    marker: NodeId,
}

/// The complete placement state: app state, tracking status, and the scene.
#[derive(Debug, Clone)]
pub struct PlacementState {
    /// Current position in the acquisition flow.
    app_state: AppState,
    /// Transient tracking trouble, displayed instead of the state message.
    tracking_status: Option<String>,
    /// The scene graph holding markers and placed objects.
    scene: Scene,
    /// Scene nodes per detected anchor.
    surfaces: HashMap<AnchorId, SurfaceNodes>,
    /// Marker of the most recently detected surface.
    current_grid: Option<NodeId>,
    /// The most recently placed sphere, target of spin requests.
    sphere: Option<NodeId>,
    /// Every object placed by taps, in placement order.
    placed: Vec<NodeId>,
}

impl PlacementState {
    /// Create a fresh state, looking for a surface with an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self {
            app_state: AppState::LookingForSurface,
            tracking_status: None,
            scene: Scene::new(),
            surfaces: HashMap::new(),
            current_grid: None,
            sphere: None,
            placed: Vec::new(),
        }
    }

    /// Re-evaluate the state from the per-frame visibility signal.
    ///
    /// Does nothing while no surface has been detected: visibility polling
    /// only becomes meaningful once [`Self::on_surface_detected`] has fired.
    pub fn on_frame_tick(&mut self, surface_in_view: bool) {
        match self.app_state {
            AppState::LookingForSurface => {}
            AppState::PointingAtSurface | AppState::ReadyToPlace => {
                let next = if surface_in_view {
                    AppState::ReadyToPlace
                } else {
                    AppState::PointingAtSurface
                };
                if next != self.app_state {
                    tracing::debug!("App state changed to {next:?}");
                    self.app_state = next;
                }
            }
        }
    }

    /// React to a newly detected surface anchor.
    ///
    /// Builds the surface's marker (a grid-textured plane matching the
    /// anchor's extent, laid flat) and moves the state out of
    /// `LookingForSurface` if it was still there. A repeated event for a
    /// live anchor replaces the surface's whole subtree.
    pub fn on_surface_detected(&mut self, anchor: &SurfaceAnchor) {
        let anchor_node = if let Some(nodes) = self.surfaces.get(&anchor.id) {
            let node_id = nodes.anchor;
            if let Err(err) = self.scene.remove_children(node_id) {
                tracing::error!("Stale bookkeeping for anchor {}: {err}", anchor.id);
                return;
            }
            self.prune_dropped_placements();
            node_id
        } else {
            self.scene.add_node(Node::new())
        };

        let marker = Node::new()
            .with_name(&anchor.alignment.to_string())
            .with_geometry(Geometry::Plane {
                width: anchor.extent_x,
                height: anchor.extent_z,
            })
            .with_material(Material::textured(GRID_TEXTURE).double_sided())
            .with_position(anchor.center)
            .with_rotation(Vec3::new(-FRAC_PI_2, 0.0, 0.0));

        let marker_id = match self.scene.attach_child(anchor_node, marker) {
            Ok(id) => id,
            Err(err) => {
                tracing::error!("Failed to attach surface marker: {err}");
                return;
            }
        };

        self.surfaces.insert(
            anchor.id,
            SurfaceNodes {
                anchor: anchor_node,
                marker: marker_id,
            },
        );
        self.current_grid = Some(marker_id);

        if self.app_state == AppState::LookingForSurface {
            tracing::info!("First surface detected: {}", anchor.id);
            self.app_state = AppState::PointingAtSurface;
        } else {
            tracing::debug!("Surface detected: {}", anchor.id);
        }
    }

    /// Record a tracking quality change.
    ///
    /// Degraded quality sets a human-readable status that overrides the
    /// state message; a return to normal clears it. Never fatal.
    pub fn on_tracking_quality_changed(&mut self, quality: &TrackingQuality) {
        self.tracking_status = match quality {
            TrackingQuality::Normal => None,
            TrackingQuality::NotAvailable => {
                Some("For some reason, augmented reality tracking isn't available.".to_string())
            }
            TrackingQuality::Limited(limitation) => Some(limitation_message(limitation)),
        };
        tracing::debug!("Tracking quality changed: {quality:?}");
    }

    /// React to the session being interrupted.
    pub fn on_session_interrupted(&mut self) {
        tracing::info!("Session interrupted");
        self.tracking_status = Some("Session interrupted".to_string());
    }

    /// React to the end of a session interruption.
    ///
    /// Resets the whole flow: state back to `LookingForSurface`, scene
    /// emptied, placed objects forgotten, tracking status cleared. Returns
    /// the options the capture session should be restarted with.
    pub fn on_session_interruption_ended(&mut self) -> RestartOptions {
        tracing::info!("Interruption ended; restarting surface acquisition");
        self.app_state = AppState::LookingForSurface;
        self.tracking_status = None;
        self.scene.clear();
        self.surfaces.clear();
        self.current_grid = None;
        self.sphere = None;
        self.placed.clear();
        RestartOptions::reset_all()
    }

    /// Record an unrecoverable session failure.
    pub fn on_session_failed(&mut self, message: &str) {
        tracing::error!("Session failed: {message}");
        self.tracking_status = Some(format!("Session failed: {message}"));
    }

    /// Place the demo objects at a tapped surface hit.
    ///
    /// Only meaningful in `ReadyToPlace`; ignored otherwise. Every tap
    /// creates a fresh sphere-and-cube pair under the hit surface's marker,
    /// deliberately leaving earlier pairs in the scene.
    pub fn on_placement_tap(&mut self, hit: &SurfaceHit) {
        if self.app_state != AppState::ReadyToPlace {
            tracing::debug!("Tap ignored in {:?}", self.app_state);
            return;
        }
        let Some(parent) = self
            .surfaces
            .get(&hit.anchor)
            .map(|nodes| nodes.marker)
            .or(self.current_grid)
        else {
            tracing::debug!("Tap hit anchor {} with no marker", hit.anchor);
            return;
        };

        let sphere = Node::new()
            .with_geometry(Geometry::Sphere {
                radius: SPHERE_RADIUS,
            })
            .with_material(
                Material::textured(SPHERE_TEXTURE)
                    .with_specular(MaterialSource::Color(Color::YELLOW)),
            );
        let sphere_id = match self.scene.attach_child(parent, sphere) {
            Ok(id) => id,
            Err(err) => {
                tracing::error!("Failed to place sphere: {err}");
                return;
            }
        };

        let cube = Node::new()
            .with_geometry(Geometry::Box {
                width: CUBE_EDGE,
                height: CUBE_EDGE,
                length: CUBE_EDGE,
                chamfer_radius: 0.0,
            })
            .with_material(Material::colored(Color::RED).with_specular(MaterialSource::Color(
                Color::WHITE,
            )))
            .with_position(Vec3::new(CUBE_OFFSET_X, 0.0, 0.0));
        let cube_id = match self.scene.attach_child(parent, cube) {
            Ok(id) => id,
            Err(err) => {
                tracing::error!("Failed to place cube: {err}");
                return;
            }
        };

        self.sphere = Some(sphere_id);
        self.placed.push(sphere_id);
        self.placed.push(cube_id);
        tracing::info!("Placed sphere and cube ({} objects total)", self.placed.len());
    }

    /// Start a half-turn spin of the most recently placed sphere around
    /// `axis`. Silently does nothing when no sphere has been placed.
    pub fn spin_sphere(&mut self, axis: Axis) {
        if let Some(id) = self.sphere {
            if let Some(node) = self.scene.get_node_mut(id) {
                node.start_spin(Spin::half_turn(axis));
                tracing::debug!("Spinning sphere around {axis:?}");
            }
        }
    }

    /// Advance time-based actions in the scene by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.scene.advance(dt);
    }

    /// The status line to display.
    ///
    /// Tracking trouble takes precedence; otherwise the message derives
    /// from the current app state. Pure projection, callable at any time.
    #[must_use]
    pub fn status_text(&self) -> &str {
        match &self.tracking_status {
            Some(status) => status,
            None => state_message(self.app_state),
        }
    }

    /// Debug drawing toggles for the current app state.
    #[must_use]
    pub fn debug_overlay(&self) -> DebugOverlay {
        DebugOverlay {
            feature_points: self.app_state == AppState::LookingForSurface,
            world_origin: false,
        }
    }

    /// Current position in the acquisition flow.
    #[must_use]
    pub fn app_state(&self) -> AppState {
        self.app_state
    }

    /// The transient tracking status, if any.
    #[must_use]
    pub fn tracking_status(&self) -> Option<&str> {
        self.tracking_status.as_deref()
    }

    /// The scene graph holding markers and placed objects.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Marker node of the most recently detected surface.
    #[must_use]
    pub fn current_grid(&self) -> Option<NodeId> {
        self.current_grid
    }

    /// Marker node for a specific anchor.
    #[must_use]
    pub fn marker_for(&self, anchor: AnchorId) -> Option<NodeId> {
        self.surfaces.get(&anchor).map(|nodes| nodes.marker)
    }

    /// The most recently placed sphere, if any.
    #[must_use]
    pub fn sphere(&self) -> Option<NodeId> {
        self.sphere
    }

    /// Every placed object, in placement order.
    #[must_use]
    pub fn placed_objects(&self) -> &[NodeId] {
        &self.placed
    }

    /// Drop handles to placed objects that no longer exist in the scene.
    fn prune_dropped_placements(&mut self) {
        let scene = &self.scene;
        self.placed.retain(|id| scene.get_node(*id).is_some());
        if let Some(id) = self.sphere {
            if self.scene.get_node(id).is_none() {
                self.sphere = None;
            }
        }
    }
}

impl Default for PlacementState {
    fn default() -> Self {
        Self::new()
    }
}

/// The status message shown for a state when tracking is healthy.
fn state_message(state: AppState) -> &'static str {
    match state {
        AppState::LookingForSurface => "Scan the room",
        AppState::PointingAtSurface => "Point your device towards surfaces.",
        AppState::ReadyToPlace => "Tap on the floor grid to place object.",
    }
}

/// The status message for a degraded-tracking reason. Unrecognized reasons
/// degrade to a generic message and a log line, never a failure.
fn limitation_message(limitation: &TrackingLimitation) -> String {
    match limitation {
        TrackingLimitation::ExcessiveMotion => {
            "You're moving the device quickly. Slow down.".to_string()
        }
        TrackingLimitation::InsufficientFeatures => {
            "I can't get a sense of the room. Is something blocking the rear camera?".to_string()
        }
        TrackingLimitation::Initializing => "Initializing — please wait a moment...".to_string(),
        TrackingLimitation::Relocalizing => "Relocalizing — please wait a moment...".to_string(),
        TrackingLimitation::Other(reason) => {
            tracing::warn!("Unrecognized tracking limitation: {reason}");
            "Tracking is limited for an unknown reason.".to_string()
        }
    }
}
