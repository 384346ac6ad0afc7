//! Surface anchors reported by the tracking session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::math::Vec3;

/// Unique identifier for a detected surface anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorId(Uuid);

impl AnchorId {
    /// Create a new unique anchor ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for AnchorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Orientation of a detected surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceAlignment {
    /// A floor- or table-like surface.
    Horizontal,
    /// A wall-like surface.
    Vertical,
}

impl std::fmt::Display for SurfaceAlignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Horizontal => write!(f, "horizontal"),
            Self::Vertical => write!(f, "vertical"),
        }
    }
}

/// A flat surface the tracking session has detected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceAnchor {
    /// Unique identifier, stable for the lifetime of the anchor.
    pub id: AnchorId,
    /// Center of the detected surface in world space.
    pub center: Vec3,
    /// Extent of the surface along its local X axis, in meters.
    pub extent_x: f32,
    /// Extent of the surface along its local Z axis, in meters.
    pub extent_z: f32,
    /// Orientation of the surface.
    pub alignment: SurfaceAlignment,
}

impl SurfaceAnchor {
    /// Create a new anchor with a fresh ID.
    #[must_use]
    pub fn new(center: Vec3, extent_x: f32, extent_z: f32, alignment: SurfaceAlignment) -> Self {
        Self {
            id: AnchorId::new(),
            center,
            extent_x,
            extent_z,
            alignment,
        }
    }
}

/// Result of a hit test against detected surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceHit {
    /// The anchor whose surface was hit.
    pub anchor: AnchorId,
    /// Where the hit landed in world space.
    pub world_position: Vec3,
}
