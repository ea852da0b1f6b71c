//! Waypoint plan loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use vrx_markers::{MarkerParams, MarkerPublisher, PublishError, WaypointMarkers};

/// Waypoints to draw and how to style them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Marker namespace
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Marker styling; absent keys keep the defaults
    #[serde(default)]
    pub markers: Option<MarkerParams>,
    #[serde(default, rename = "waypoint")]
    pub waypoints: Vec<Waypoint>,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            markers: None,
            waypoints: Vec::new(),
        }
    }
}

impl Plan {
    /// Channel capacity that holds every marker of the plan, so a slow
    /// subscriber never has markers overwritten
    pub fn topic_capacity(&self) -> usize {
        self.waypoints.len().max(1)
    }
}

fn default_namespace() -> String {
    "vrx/wp".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    /// Heading in radians
    #[serde(default)]
    pub yaw: f64,
    /// Label drawn above the marker
    #[serde(default)]
    pub text: String,
    /// Explicit marker id; assigned automatically when absent
    #[serde(default)]
    pub id: Option<u64>,
}

impl Waypoint {
    /// Draw this waypoint with `markers`
    pub fn draw<P: MarkerPublisher>(
        &self,
        markers: &mut WaypointMarkers<P>,
    ) -> Result<(), PublishError> {
        match self.id {
            Some(id) => markers.draw_marker_with_id(id, self.x, self.y, self.yaw, &self.text),
            None => markers.draw_marker(self.x, self.y, self.yaw, &self.text),
        }
    }
}

/// Load a plan from a TOML file
pub fn load_plan(path: &Path) -> Result<Plan> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan {}", path.display()))?;
    let plan: Plan = toml::from_str(&content)
        .with_context(|| format!("Failed to parse plan {}", path.display()))?;
    info!(
        path = %path.display(),
        namespace = %plan.namespace,
        waypoints = plan.waypoints.len(),
        "Loaded waypoint plan"
    );
    Ok(plan)
}
