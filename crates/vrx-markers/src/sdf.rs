//! Reading marker parameters from SDF
//!
//! The markers are configured with a `<markers>` element, usually nested
//! inside a world plugin:
//!
//! ```xml
//! <markers>
//!   <material>Gazebo/Green</material>
//!   <scaling>0.2 0.2 2.0</scaling>
//!   <height>0.5</height>
//!   <initial_id>10</initial_id>
//! </markers>
//! ```

use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::config::MarkerParams;

#[derive(Error, Debug)]
pub enum SdfError {
    #[error("Failed to parse markers element: {0}")]
    ParseError(String),
    #[error("Invalid scaling '{0}': expected three numbers")]
    InvalidScaling(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Raw `<markers>` element; unknown children are skipped by serde
#[derive(Debug, Default, Deserialize)]
struct MarkersElement {
    #[serde(default)]
    material: Option<String>,
    /// "x y z"
    #[serde(default)]
    scaling: Option<String>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default)]
    initial_id: Option<u64>,
}

/// Parse a `<markers>` element into marker parameters
pub fn parse_markers_element(xml: &str) -> Result<MarkerParams, SdfError> {
    let element: MarkersElement =
        from_str(xml).map_err(|e| SdfError::ParseError(e.to_string()))?;

    let scaling = element
        .scaling
        .as_deref()
        .map(parse_scaling_string)
        .transpose()?;

    Ok(MarkerParams {
        material: element.material.map(|m| m.trim().to_string()),
        scaling,
        height: element.height,
        initial_id: element.initial_id,
    })
}

/// Parse a scaling string "x y z" into its three components
pub fn parse_scaling_string(s: &str) -> Result<[f64; 3], SdfError> {
    let parts = s
        .split_whitespace()
        .map(|p| p.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| SdfError::InvalidScaling(s.to_string()))?;

    match parts.as_slice() {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(SdfError::InvalidScaling(s.to_string())),
    }
}

/// Find the first `<markers>` element in an SDF document and parse it.
///
/// Returns `Ok(None)` when the document has no such element.
pub fn find_markers_element(xml: &str) -> Result<Option<MarkerParams>, SdfError> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"markers" => {
                let end = e.to_end().into_owned();
                let span = reader
                    .read_to_end(end.name())
                    .map_err(|e| SdfError::ParseError(e.to_string()))?;
                let inner = &xml[span.start as usize..span.end as usize];
                let params = parse_markers_element(&format!("<markers>{}</markers>", inner))?;
                debug!(?params, "Found markers element");
                return Ok(Some(params));
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"markers" => {
                return Ok(Some(MarkerParams::default()));
            }
            Ok(Event::Eof) => return Ok(None),
            Ok(_) => {}
            Err(e) => return Err(SdfError::ParseError(e.to_string())),
        }
    }
}

/// Read an SDF file and extract its `<markers>` element
pub fn load_markers_file(path: &Path) -> Result<Option<MarkerParams>, SdfError> {
    let content = std::fs::read_to_string(path)?;
    find_markers_element(&content)
}
