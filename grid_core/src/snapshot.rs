//! # Grid Snapshot
//!
//! The `GridSnapshot` is the complete state of a grid: topology plus the
//! three dimension maps. It is the unit handed to persistence and to every
//! other collaborator.
//!
//! ## Structure
//!
//! ```text
//! GridSnapshot
//! ├── rows, cols                          (topology, both >= 1)
//! ├── panelDimensions:  PositionKey -> Panel
//! ├── columnDimensions: PositionKey -> Column
//! └── beamDimensions:   BeamKey     -> Beam
//! ```
//!
//! ## Example
//!
//! ```rust
//! use grid_core::snapshot::GridSnapshot;
//!
//! let snapshot = GridSnapshot::new();
//! assert_eq!((snapshot.rows, snapshot.cols), (3, 3));
//! assert_eq!(snapshot.panel_dimensions.len(), 9);
//!
//! let json = serde_json::to_string(&snapshot).unwrap();
//! assert!(json.contains("\"panelDimensions\""));
//! assert!(json.contains("\"beam1A\""));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::addressing::{
    col_beam_key, parse_beam, parse_slab_label, position_key, row_beam_key, BeamKey, PositionKey,
};
use crate::errors::{GridError, GridResult};
use crate::members::{Beam, Column, DimensionField, MemberDimensions, MemberKind, Panel};

/// Rows and columns of a freshly created grid
pub const DEFAULT_GRID_SIZE: u32 = 3;

/// Complete serializable state of the grid.
///
/// Maps are ordered so serialized snapshots are stable across saves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSnapshot {
    /// Number of row lines (>= 1)
    pub rows: u32,

    /// Number of column lines (>= 1)
    pub cols: u32,

    /// Slab panels keyed by their top-left grid point
    pub panel_dimensions: BTreeMap<PositionKey, Panel>,

    /// Columns keyed by the grid point they sit on
    pub column_dimensions: BTreeMap<PositionKey, Column>,

    /// Representative beams keyed by row/column line
    pub beam_dimensions: BTreeMap<BeamKey, Beam>,
}

impl GridSnapshot {
    /// Create the default 3x3 grid with every member seeded.
    pub fn new() -> Self {
        GridSnapshot::with_size(DEFAULT_GRID_SIZE, DEFAULT_GRID_SIZE)
    }

    /// Create a `rows x cols` grid with every member seeded from defaults.
    ///
    /// Sizes are clamped to at least one line each.
    pub fn with_size(rows: u32, cols: u32) -> Self {
        let mut snapshot = GridSnapshot {
            rows: rows.max(1),
            cols: cols.clamp(1, crate::addressing::MAX_COLS),
            panel_dimensions: BTreeMap::new(),
            column_dimensions: BTreeMap::new(),
            beam_dimensions: BTreeMap::new(),
        };
        snapshot.seed_missing();
        snapshot
    }

    /// Fill every in-range position and beam line that has no record yet.
    ///
    /// Existing records are never touched.
    pub(crate) fn seed_missing(&mut self) {
        for row in 1..=self.rows {
            for col in 0..self.cols {
                let key = position_key(row, col);
                self.panel_dimensions.entry(key).or_default();
                self.column_dimensions.entry(key).or_default();
            }
        }
        for row in 1..self.rows {
            self.beam_dimensions.entry(row_beam_key(row)).or_default();
        }
        for col in 0..self.cols.saturating_sub(1) {
            self.beam_dimensions.entry(col_beam_key(col)).or_default();
        }
    }

    /// Drop every record whose key is outside the current topology.
    pub(crate) fn retain_in_range(&mut self) {
        let (rows, cols) = (self.rows, self.cols);
        self.panel_dimensions.retain(|key, _| key.in_range(rows, cols));
        self.column_dimensions.retain(|key, _| key.in_range(rows, cols));
        self.beam_dimensions.retain(|key, _| key.in_range(rows, cols));
    }

    /// Check the topology and the key-validity invariant.
    ///
    /// Used when a snapshot arrives from outside (file, collaborator).
    pub fn validate(&self) -> GridResult<()> {
        if self.rows < 1 || self.cols < 1 || self.cols > crate::addressing::MAX_COLS {
            return Err(GridError::serialization(format!(
                "Invalid grid size {}x{}",
                self.rows, self.cols
            )));
        }

        let (rows, cols) = (self.rows, self.cols);
        let out_of_range = |key: String| GridError::out_of_range(key, rows, cols);

        if let Some(key) = self.panel_dimensions.keys().find(|k| !k.in_range(rows, cols)) {
            return Err(out_of_range(key.to_string()));
        }
        if let Some(key) = self.column_dimensions.keys().find(|k| !k.in_range(rows, cols)) {
            return Err(out_of_range(key.to_string()));
        }
        if let Some(key) = self.beam_dimensions.keys().find(|k| !k.in_range(rows, cols)) {
            return Err(out_of_range(key.to_string()));
        }
        Ok(())
    }

    /// Dimensions of a member, if it exists
    pub fn dimensions_of(&self, element: &ElementRef) -> Option<MemberDimensions> {
        match element {
            ElementRef::Panel(key) => self.panel_dimensions.get(key).map(MemberDimensions::from),
            ElementRef::Column(key) => self.column_dimensions.get(key).map(MemberDimensions::from),
            ElementRef::Beam(key) => self.beam_dimensions.get(key).map(MemberDimensions::from),
        }
    }

    /// One stored field of a member; `None` if the member or field is absent
    pub fn dimension(&self, element: &ElementRef, field: DimensionField) -> Option<f64> {
        match (element, field) {
            (ElementRef::Column(key), DimensionField::Rotation) => {
                self.column_dimensions.get(key).map(|c| c.rotation)
            }
            (_, DimensionField::Rotation) => None,
            (_, DimensionField::Width) => self.dimensions_of(element)?.width,
            (_, DimensionField::Height) => self.dimensions_of(element)?.height,
            (_, DimensionField::Depth) => self.dimensions_of(element)?.depth,
            (_, DimensionField::Breadth) => self.dimensions_of(element)?.breadth,
        }
    }

    /// True if the element's key addresses something inside this grid
    pub fn contains_key(&self, element: &ElementRef) -> bool {
        match element {
            ElementRef::Panel(key) | ElementRef::Column(key) => key.in_range(self.rows, self.cols),
            ElementRef::Beam(key) => key.in_range(self.rows, self.cols),
        }
    }

    /// Total number of member records
    pub fn member_count(&self) -> usize {
        self.panel_dimensions.len() + self.column_dimensions.len() + self.beam_dimensions.len()
    }
}

impl Default for GridSnapshot {
    fn default() -> Self {
        GridSnapshot::new()
    }
}

/// A typed reference to one member: which map, which key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "lowercase")]
pub enum ElementRef {
    Panel(PositionKey),
    Column(PositionKey),
    Beam(BeamKey),
}

impl ElementRef {
    /// Resolve a raw key for the given member kind.
    ///
    /// Panel keys may be compound slab labels (`"1A-2B"`).
    pub fn parse(key: &str, kind: MemberKind) -> GridResult<Self> {
        match kind {
            MemberKind::Panel => parse_slab_label(key).map(ElementRef::Panel),
            MemberKind::Column => key.parse().map(ElementRef::Column),
            MemberKind::Beam => parse_beam(key).map(ElementRef::Beam),
        }
    }

    pub fn kind(&self) -> MemberKind {
        match self {
            ElementRef::Panel(_) => MemberKind::Panel,
            ElementRef::Column(_) => MemberKind::Column,
            ElementRef::Beam(_) => MemberKind::Beam,
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementRef::Panel(key) | ElementRef::Column(key) => write!(f, "{}", key),
            ElementRef::Beam(key) => write!(f, "{}", key),
        }
    }
}
