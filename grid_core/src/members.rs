//! # Structural Members
//!
//! Dimension records for the three member kinds the grid carries.
//! All lengths are millimeters; column rotation is degrees.
//!
//! ## JSON Example
//!
//! ```json
//! { "width": 300.0, "height": 300.0, "rotation": 45.0 }
//! ```

use serde::{Deserialize, Serialize};

/// Which map of the snapshot a key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    /// Two-way slab panel, keyed by its top-left grid point
    Panel,
    /// Vertical member centered at a grid point
    Column,
    /// Representative beam of a row line or column line
    Beam,
}

impl MemberKind {
    pub const ALL: [MemberKind; 3] = [MemberKind::Panel, MemberKind::Column, MemberKind::Beam];

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            MemberKind::Panel => "Slab Panel",
            MemberKind::Column => "Column",
            MemberKind::Beam => "Beam",
        }
    }

    /// Dimension fields this kind stores, in editing order
    pub fn fields(&self) -> &'static [DimensionField] {
        match self {
            MemberKind::Panel => &[DimensionField::Width, DimensionField::Height],
            MemberKind::Column => &[
                DimensionField::Width,
                DimensionField::Height,
                DimensionField::Rotation,
            ],
            MemberKind::Beam => &[
                DimensionField::Width,
                DimensionField::Depth,
                DimensionField::Breadth,
            ],
        }
    }
}

impl std::fmt::Display for MemberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberKind::Panel => write!(f, "panel"),
            MemberKind::Column => write!(f, "column"),
            MemberKind::Beam => write!(f, "beam"),
        }
    }
}

impl std::str::FromStr for MemberKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "panel" | "slab" => Ok(MemberKind::Panel),
            "column" => Ok(MemberKind::Column),
            "beam" => Ok(MemberKind::Beam),
            other => Err(format!("unknown member kind '{}'", other)),
        }
    }
}

/// A single editable dimension field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionField {
    Width,
    Height,
    Depth,
    Breadth,
    Rotation,
}

impl DimensionField {
    pub fn label(&self) -> &'static str {
        match self {
            DimensionField::Width => "Width (mm)",
            DimensionField::Height => "Height (mm)",
            DimensionField::Depth => "Depth (mm)",
            DimensionField::Breadth => "Breadth (mm)",
            DimensionField::Rotation => "Rotation (deg)",
        }
    }
}

/// Slab panel spanning grid points `(row,col)`..`(row+1,col+1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    /// Panel width in mm
    pub width: f64,
    /// Panel height in mm
    pub height: f64,
}

impl Default for Panel {
    fn default() -> Self {
        Panel {
            width: 7200.0,
            height: 6000.0,
        }
    }
}

/// Column centered at a grid point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Section width in mm
    pub width: f64,
    /// Section height in mm
    pub height: f64,
    /// Plan rotation about the centroid, degrees
    pub rotation: f64,
}

impl Default for Column {
    fn default() -> Self {
        Column {
            width: 300.0,
            height: 300.0,
            rotation: 0.0,
        }
    }
}

/// Beam standing in for an entire row or column line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    /// Span length in mm
    pub width: f64,
    /// Section depth in mm
    pub depth: f64,
    /// Section breadth in mm
    pub breadth: f64,
}

impl Default for Beam {
    fn default() -> Self {
        Beam {
            width: 7200.0,
            depth: 500.0,
            breadth: 300.0,
        }
    }
}

/// Partial dimension record, as sent by an edit.
///
/// Fields a member kind does not store are ignored when the patch is
/// merged (a `depth` in a panel patch does nothing).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breadth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl DimensionPatch {
    /// Patch that sets a single field
    pub fn single(field: DimensionField, value: f64) -> Self {
        DimensionPatch::default().with(field, value)
    }

    /// Builder-style setter
    pub fn with(mut self, field: DimensionField, value: f64) -> Self {
        let slot = match field {
            DimensionField::Width => &mut self.width,
            DimensionField::Height => &mut self.height,
            DimensionField::Depth => &mut self.depth,
            DimensionField::Breadth => &mut self.breadth,
            DimensionField::Rotation => &mut self.rotation,
        };
        *slot = Some(value);
        self
    }

    pub fn get(&self, field: DimensionField) -> Option<f64> {
        match field {
            DimensionField::Width => self.width,
            DimensionField::Height => self.height,
            DimensionField::Depth => self.depth,
            DimensionField::Breadth => self.breadth,
            DimensionField::Rotation => self.rotation,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == DimensionPatch::default()
    }
}

impl Panel {
    pub fn merged(mut self, patch: &DimensionPatch) -> Self {
        if let Some(w) = patch.width {
            self.width = w;
        }
        if let Some(h) = patch.height {
            self.height = h;
        }
        self
    }
}

impl Column {
    pub fn merged(mut self, patch: &DimensionPatch) -> Self {
        if let Some(w) = patch.width {
            self.width = w;
        }
        if let Some(h) = patch.height {
            self.height = h;
        }
        if let Some(r) = patch.rotation {
            self.rotation = r;
        }
        self
    }
}

impl Beam {
    pub fn merged(mut self, patch: &DimensionPatch) -> Self {
        if let Some(w) = patch.width {
            self.width = w;
        }
        if let Some(d) = patch.depth {
            self.depth = d;
        }
        if let Some(b) = patch.breadth {
            self.breadth = b;
        }
        self
    }
}

/// Loose dimension bag handed to the load estimator.
///
/// Mirrors what an edit form holds: any field may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberDimensions {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub depth: Option<f64>,
    pub breadth: Option<f64>,
}

impl From<&Panel> for MemberDimensions {
    fn from(p: &Panel) -> Self {
        MemberDimensions {
            width: Some(p.width),
            height: Some(p.height),
            ..Default::default()
        }
    }
}

impl From<&Column> for MemberDimensions {
    fn from(c: &Column) -> Self {
        MemberDimensions {
            width: Some(c.width),
            height: Some(c.height),
            ..Default::default()
        }
    }
}

impl From<&Beam> for MemberDimensions {
    fn from(b: &Beam) -> Self {
        MemberDimensions {
            width: Some(b.width),
            depth: Some(b.depth),
            breadth: Some(b.breadth),
            ..Default::default()
        }
    }
}

impl From<&DimensionPatch> for MemberDimensions {
    fn from(p: &DimensionPatch) -> Self {
        MemberDimensions {
            width: p.width,
            height: p.height,
            depth: p.depth,
            breadth: p.breadth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(Panel::default(), Panel { width: 7200.0, height: 6000.0 });
        assert_eq!(
            Column::default(),
            Column { width: 300.0, height: 300.0, rotation: 0.0 }
        );
    }

    #[test]
    fn test_merge_only_touches_own_fields() {
        let patch = DimensionPatch::single(DimensionField::Depth, 650.0)
            .with(DimensionField::Width, 400.0);

        let panel = Panel::default().merged(&patch);
        assert_eq!(panel, Panel { width: 400.0, height: 6000.0 });

        let beam = Beam::default().merged(&patch);
        assert_eq!(beam.depth, 650.0);
        assert_eq!(beam.width, 400.0);
        assert_eq!(beam.breadth, 300.0);
    }

    #[test]
    fn test_patch_json_is_partial() {
        let patch: DimensionPatch = serde_json::from_str(r#"{"rotation": 45}"#).unwrap();
        assert_eq!(patch.rotation, Some(45.0));
        assert!(patch.width.is_none());
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"rotation":45.0}"#);
        assert!(DimensionPatch::default().is_empty());
    }

    #[test]
    fn test_member_kind_parsing() {
        assert_eq!("Panel".parse::<MemberKind>().unwrap(), MemberKind::Panel);
        assert_eq!("slab".parse::<MemberKind>().unwrap(), MemberKind::Panel);
        assert_eq!("beam".parse::<MemberKind>().unwrap(), MemberKind::Beam);
        assert!("wall".parse::<MemberKind>().is_err());
        assert_eq!(serde_json::to_string(&MemberKind::Column).unwrap(), "\"column\"");
    }
}
