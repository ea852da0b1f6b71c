//! Marker message types sent to the simulator
//!
//! These mirror the fields of the simulator's marker request. The exact wire
//! encoding belongs to the transport; here they serialize to JSON via serde.

use glam::DQuat;
use serde::{Deserialize, Serialize};

/// Topic the simulator listens on for marker requests
pub const MARKER_TOPIC: &str = "/marker";

/// 3D vector in meters (or a unitless scale factor)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3d {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Orientation as a unit quaternion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub const IDENTITY: Self = Self { w: 1.0, x: 0.0, y: 0.0, z: 0.0 };

    /// Rotation about the vertical axis only (roll and pitch are zero)
    pub fn from_yaw(yaw: f64) -> Self {
        DQuat::from_rotation_z(yaw).into()
    }

    /// Heading in radians, in (-pi, pi]
    pub fn yaw(&self) -> f64 {
        let siny_cosp = 2.0 * (self.w * self.z + self.x * self.y);
        let cosy_cosp = 1.0 - 2.0 * (self.y * self.y + self.z * self.z);
        siny_cosp.atan2(cosy_cosp)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<DQuat> for Quaternion {
    fn from(q: DQuat) -> Self {
        Self { w: q.w, x: q.x, y: q.y, z: q.z }
    }
}

/// Position and orientation of a marker in the world frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3d,
    pub orientation: Quaternion,
}

impl Pose {
    /// Pose at (x, y, z) facing `yaw` radians
    pub fn from_xyz_yaw(x: f64, y: f64, z: f64, yaw: f64) -> Self {
        Self {
            position: Vector3d::new(x, y, z),
            orientation: Quaternion::from_yaw(yaw),
        }
    }
}

/// Geometry drawn for a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerType {
    Cylinder,
}

/// What the simulator should do with the marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerAction {
    /// Create the marker, or replace an existing one with the same ns/id
    #[default]
    AddModify,
}

/// Who can see the marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Only the GUI renders it; sensors in the world do not see it
    #[default]
    Gui,
}

/// Surface material, referenced by script name (e.g. "Gazebo/Green")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub script_name: String,
}

/// Marker request for a single waypoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Namespace; ids only need to be unique within it
    pub ns: String,
    pub id: u64,
    pub action: MarkerAction,
    #[serde(rename = "type")]
    pub marker_type: MarkerType,
    pub visibility: Visibility,
    pub scale: Vector3d,
    pub material: Material,
    pub pose: Pose,
    /// Label rendered above the cylinder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}
