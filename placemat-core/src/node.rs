//! Scene nodes - the building blocks of the placement world.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::{ActiveSpin, Spin};
use crate::math::Vec3;

/// Unique identifier for a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Create a new unique node ID.
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

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The shape a node renders with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Geometry {
    /// A sphere.
    Sphere {
        /// Radius in meters.
        radius: f32,
    },

    /// A box.
    Box {
        /// Extent along X in meters.
        width: f32,
        /// Extent along Y in meters.
        height: f32,
        /// Extent along Z in meters.
        length: f32,
        /// Edge rounding radius in meters.
        chamfer_radius: f32,
    },

    /// A flat rectangle, used for surface markers.
    Plane {
        /// Extent along X in meters.
        width: f32,
        /// Extent along Y in meters.
        height: f32,
    },
}

/// An RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component.
    pub r: f32,
    /// Green component.
    pub g: f32,
    /// Blue component.
    pub b: f32,
    /// Alpha component.
    pub a: f32,
}

impl Color {
    /// Opaque red.
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque yellow.
    pub const YELLOW: Self = Self::new(1.0, 1.0, 0.0, 1.0);

    /// Create a new color.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Where a material channel gets its contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum MaterialSource {
    /// A flat color.
    Color(Color),
    /// A named texture asset.
    Texture(String),
}

/// Surface appearance of a node's geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Diffuse channel contents.
    pub diffuse: MaterialSource,
    /// Optional specular channel contents.
    pub specular: Option<MaterialSource>,
    /// Whether both faces of the geometry are rendered.
    pub double_sided: bool,
}

impl Material {
    /// A material with a flat diffuse color.
    #[must_use]
    pub fn colored(color: Color) -> Self {
        Self {
            diffuse: MaterialSource::Color(color),
            specular: None,
            double_sided: false,
        }
    }

    /// A material with a named diffuse texture.
    #[must_use]
    pub fn textured(name: &str) -> Self {
        Self {
            diffuse: MaterialSource::Texture(name.to_string()),
            specular: None,
            double_sided: false,
        }
    }

    /// Set the specular channel.
    #[must_use]
    pub fn with_specular(mut self, source: MaterialSource) -> Self {
        self.specular = Some(source);
        self
    }

    /// Render both faces of the geometry.
    #[must_use]
    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }
}

/// A node in the placement scene graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Optional human-readable name.
    pub name: Option<String>,
    /// Shape to render, if any. Container nodes carry none.
    pub geometry: Option<Geometry>,
    /// Surface appearance, if any.
    pub material: Option<Material>,
    /// Position relative to the parent node.
    pub position: Vec3,
    /// Euler rotation in radians, applied X then Y then Z.
    pub rotation: Vec3,
    /// Optional parent node ID.
    pub parent: Option<NodeId>,
    /// Child node IDs.
    pub children: Vec<NodeId>,
    /// Rotation actions currently running on this node.
    spins: Vec<ActiveSpin>,
}

impl Node {
    /// Create an empty container node at the parent's origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            name: None,
            geometry: None,
            material: None,
            position: Vec3::zero(),
            rotation: Vec3::zero(),
            parent: None,
            children: Vec::new(),
            spins: Vec::new(),
        }
    }

    /// Set the name.
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Set the geometry.
    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Set the material.
    #[must_use]
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set the euler rotation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Begin a rotation action on this node. Concurrent spins compose.
    pub fn start_spin(&mut self, spin: Spin) {
        self.spins.push(ActiveSpin::new(spin));
    }

    /// Number of rotation actions still running.
    #[must_use]
    pub fn active_spin_count(&self) -> usize {
        self.spins.len()
    }

    /// Advance running rotation actions by `dt`, applying their deltas to
    /// this node's euler rotation. Completed actions are dropped.
    pub fn advance_spins(&mut self, dt: std::time::Duration) {
        for active in &mut self.spins {
            let delta = active.advance(dt);
            match active.axis() {
                crate::action::Axis::X => self.rotation.x += delta,
                crate::action::Axis::Y => self.rotation.y += delta,
                crate::action::Axis::Z => self.rotation.z += delta,
            }
        }
        self.spins.retain(|active| !active.is_complete());
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Axis;
    use std::time::Duration;

    #[test]
    fn node_ids_are_unique() {
        assert_ne!(NodeId::new(), NodeId::new());
    }

    #[test]
    fn builders_set_fields() {
        let node = Node::new()
            .with_name("marker")
            .with_geometry(Geometry::Plane {
                width: 1.0,
                height: 0.5,
            })
            .with_material(Material::textured("grid").double_sided())
            .with_position(Vec3::new(0.0, 0.0, -0.5));

        assert_eq!(node.name.as_deref(), Some("marker"));
        assert!(matches!(node.geometry, Some(Geometry::Plane { .. })));
        let material = node.material.as_ref().unwrap();
        assert!(material.double_sided);
        assert!(matches!(material.diffuse, MaterialSource::Texture(_)));
        assert!(node.children.is_empty());
        assert!(node.parent.is_none());
    }

    #[test]
    fn spin_rotates_node_on_its_axis() {
        let mut node = Node::new();
        node.start_spin(Spin::new(Axis::Y, 1.0, Duration::from_secs(1)));
        node.advance_spins(Duration::from_millis(500));

        assert!((node.rotation.y - 0.5).abs() < 1e-4);
        assert!((node.rotation.x).abs() < 1e-6);
        assert_eq!(node.active_spin_count(), 1);
    }

    #[test]
    fn completed_spins_are_dropped() {
        let mut node = Node::new();
        node.start_spin(Spin::new(Axis::X, 2.0, Duration::from_secs(1)));
        node.advance_spins(Duration::from_secs(5));

        assert!((node.rotation.x - 2.0).abs() < 1e-4);
        assert_eq!(node.active_spin_count(), 0);
    }

    #[test]
    fn concurrent_spins_compose() {
        let mut node = Node::new();
        node.start_spin(Spin::new(Axis::Y, 1.0, Duration::from_secs(2)));
        node.start_spin(Spin::new(Axis::Z, 1.0, Duration::from_secs(2)));
        node.advance_spins(Duration::from_secs(1));

        assert!((node.rotation.y - 0.5).abs() < 1e-4);
        assert!((node.rotation.z - 0.5).abs() < 1e-4);
        assert_eq!(node.active_spin_count(), 2);
    }

    #[test]
    fn node_round_trips_through_json() {
        let node = Node::new()
            .with_geometry(Geometry::Sphere { radius: 0.07 })
            .with_material(
                Material::textured("earth").with_specular(MaterialSource::Color(Color::YELLOW)),
            );
        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, node.id);
        assert_eq!(back.geometry, node.geometry);
        assert_eq!(back.material, node.material);
    }
}
