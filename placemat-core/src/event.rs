//! Events emitted by the tracking session.

use serde::{Deserialize, Serialize};

use crate::anchor::SurfaceAnchor;
use crate::tracking::TrackingQuality;

/// Something the tracking session observed.
///
/// Backends queue these internally and hand them over in order through
/// polling, so consumers always observe them on their own context no matter
/// which thread the underlying platform delivered them on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A new flat surface was detected. Fires once per anchor.
    AnchorAdded(SurfaceAnchor),
    /// Tracking quality changed.
    TrackingChanged(TrackingQuality),
    /// The session was interrupted (for example, the capture device was
    /// taken away by the platform).
    Interrupted,
    /// A previous interruption ended and the session may be restarted.
    InterruptionEnded,
    /// The session failed and will deliver no further events.
    Failed {
        /// Human-readable description of the failure.
        message: String,
    },
}
