//! # Placemat Core
//!
//! Core logic for the tap-to-place AR demo: a scene graph of markers and
//! placed objects, tracking-session types, and the placement state machine
//! that ties them together.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               placemat-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Scene Graph     │  Tracking Types          │
//! │  - Nodes         │  - Surface anchors       │
//! │  - Materials     │  - Quality / limitations │
//! │  - Spin actions  │  - Session events        │
//! ├─────────────────────────────────────────────┤
//! │  Placement State Machine                    │
//! │  - Surface acquisition flow                 │
//! │  - Status-line projection                   │
//! │  - Tap-to-place and sphere spins            │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod anchor;
pub mod error;
pub mod event;
pub mod math;
pub mod node;
pub mod scene;
pub mod state;
pub mod tracking;

pub use action::{ActiveSpin, Axis, Spin};
pub use anchor::{AnchorId, SurfaceAlignment, SurfaceAnchor, SurfaceHit};
pub use error::{SceneError, SceneResult};
pub use event::SessionEvent;
pub use math::Vec3;
pub use node::{Color, Geometry, Material, MaterialSource, Node, NodeId};
pub use scene::Scene;
pub use state::{AppState, DebugOverlay, PlacementState, RestartOptions};
pub use tracking::{TrackingLimitation, TrackingQuality};

/// Placemat core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
