//! VRX Markers - Waypoint markers for the VRX simulation scene
//!
//! This crate draws labeled cylinder markers at navigation waypoints:
//! - Marker message types sent to the simulator's `/marker` topic
//! - Marker configuration (material, scaling, height, initial id) from SDF or TOML
//! - Publish sinks for delivering markers (in-process topic, JSON lines)
//! - `WaypointMarkers`, which styles markers and assigns their ids

pub mod config;
pub mod emitter;
pub mod msgs;
pub mod sdf;
pub mod transport;

pub use config::{MarkerConfig, MarkerParams};
pub use emitter::WaypointMarkers;
pub use msgs::{Marker, MarkerAction, MarkerType, Material, Pose, Quaternion, Vector3d, Visibility, MARKER_TOPIC};
pub use sdf::{find_markers_element, load_markers_file, parse_markers_element, SdfError};
pub use transport::{BroadcastPublisher, JsonLinesPublisher, MarkerPublisher, PublishError};
