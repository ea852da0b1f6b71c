//! Marker styling configuration

use serde::{Deserialize, Serialize};

use crate::msgs::Vector3d;

/// Resolved marker configuration applied to every drawn marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Material script name for the cylinder
    pub material: String,
    /// Cylinder scale (x, y, z)
    pub scaling: Vector3d,
    /// Height of the marker above the water plane
    pub height: f64,
    /// First id handed out to markers drawn without an explicit id
    pub initial_id: u64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            material: default_material(),
            scaling: default_scaling(),
            height: 0.0,
            initial_id: 0,
        }
    }
}

fn default_material() -> String {
    "Gazebo/Green".to_string()
}

fn default_scaling() -> Vector3d {
    Vector3d::new(0.2, 0.2, 1.5)
}

impl MarkerConfig {
    /// Overwrite the fields present in `params`, keeping the rest
    pub fn apply(&mut self, params: &MarkerParams) {
        if let Some(ref material) = params.material {
            self.material = material.clone();
        }
        if let Some(scaling) = params.scaling {
            self.scaling = Vector3d::from_array(scaling);
        }
        if let Some(height) = params.height {
            self.height = height;
        }
        if let Some(initial_id) = params.initial_id {
            self.initial_id = initial_id;
        }
    }
}

/// Marker parameters as read from a configuration node.
///
/// `None` means "not given, keep the current value", so an explicit
/// `height = 0.0` is distinguishable from an absent one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerParams {
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub scaling: Option<[f64; 3]>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub initial_id: Option<u64>,
}

impl MarkerParams {
    /// Parse a TOML table with the marker keys
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// True when no recognized key is present
    pub fn is_empty(&self) -> bool {
        self.material.is_none()
            && self.scaling.is_none()
            && self.height.is_none()
            && self.initial_id.is_none()
    }
}
