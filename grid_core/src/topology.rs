//! # Grid Topology & Resize Engine
//!
//! Every operation here is a pure transform: it borrows a snapshot and
//! returns a new one. Callers swap the result in wholesale, so anything
//! still holding the old snapshot keeps a consistent view.
//!
//! ## Resize semantics
//!
//! - **Grow** seeds defaults for newly exposed positions and beam lines
//!   and leaves every existing record alone.
//! - **Shrink** is a filter: records whose key left the grid are dropped,
//!   nothing is renumbered. Shrinking below one line is ignored.
//!
//! ## Example
//!
//! ```rust
//! use grid_core::snapshot::GridSnapshot;
//! use grid_core::topology::{grow_rows, shrink_rows};
//!
//! let base = GridSnapshot::new();
//! let grown = grow_rows(&base, 2);
//! assert_eq!(grown.rows, 5);
//! assert_eq!(shrink_rows(&grown, 2), base);
//! ```

use tracing::debug;

use crate::addressing::{distance_to_column_key, parse_beam, PositionKey, MAX_COLS};
use crate::errors::{GridError, GridResult};
use crate::members::{DimensionPatch, MemberKind};
use crate::snapshot::{ElementRef, GridSnapshot};

/// Add `delta` row lines.
pub fn grow_rows(snapshot: &GridSnapshot, delta: u32) -> GridSnapshot {
    let mut next = snapshot.clone();
    next.rows = snapshot.rows.saturating_add(delta);
    next.seed_missing();
    next
}

/// Add `delta` column lines, stopping at column `Z`.
pub fn grow_cols(snapshot: &GridSnapshot, delta: u32) -> GridSnapshot {
    let mut next = snapshot.clone();
    next.cols = snapshot.cols.saturating_add(delta).min(MAX_COLS);
    if next.cols < snapshot.cols.saturating_add(delta) {
        debug!(requested = delta, cols = next.cols, "column growth capped at last letter");
    }
    next.seed_missing();
    next
}

/// Remove `delta` row lines; ignored if fewer than one row would remain.
pub fn shrink_rows(snapshot: &GridSnapshot, delta: u32) -> GridSnapshot {
    if delta >= snapshot.rows {
        debug!(rows = snapshot.rows, delta, "shrink below one row ignored");
        return snapshot.clone();
    }
    let mut next = snapshot.clone();
    next.rows = snapshot.rows - delta;
    next.retain_in_range();
    next
}

/// Remove `delta` column lines; ignored if fewer than one column would remain.
pub fn shrink_cols(snapshot: &GridSnapshot, delta: u32) -> GridSnapshot {
    if delta >= snapshot.cols {
        debug!(cols = snapshot.cols, delta, "shrink below one column ignored");
        return snapshot.clone();
    }
    let mut next = snapshot.clone();
    next.cols = snapshot.cols - delta;
    next.retain_in_range();
    next
}

/// Merge `patch` into the record named by `key` in the map selected by `kind`.
///
/// A missing record is created from the kind's default first. Panel keys
/// may be compound slab labels (`"1A-2B"`); the leading position is used.
///
/// # Errors
///
/// * `MalformedKey` - `key` does not parse for `kind`
/// * `OutOfRange` - `key` parses but is outside the grid
pub fn set_dimension(
    snapshot: &GridSnapshot,
    key: &str,
    kind: MemberKind,
    patch: &DimensionPatch,
) -> GridResult<GridSnapshot> {
    let element = ElementRef::parse(key, kind)?;
    apply_patch(snapshot, &element, patch)
}

/// Typed form of [`set_dimension`].
pub fn apply_patch(
    snapshot: &GridSnapshot,
    element: &ElementRef,
    patch: &DimensionPatch,
) -> GridResult<GridSnapshot> {
    if !snapshot.contains_key(element) {
        return Err(GridError::out_of_range(element.to_string(), snapshot.rows, snapshot.cols));
    }

    let mut next = snapshot.clone();
    match element {
        ElementRef::Panel(key) => {
            let record = next.panel_dimensions.entry(*key).or_default();
            *record = record.merged(patch);
        }
        ElementRef::Column(key) => {
            let record = next.column_dimensions.entry(*key).or_default();
            *record = record.merged(patch);
        }
        ElementRef::Beam(key) => {
            let record = next.beam_dimensions.entry(*key).or_default();
            *record = record.merged(patch);
        }
    }
    Ok(next)
}

/// Column position a beam insertion resolves to, checked against the grid.
pub fn resolve_column_on_beam(
    snapshot: &GridSnapshot,
    beam_id: &str,
    distance_mm: f64,
) -> GridResult<PositionKey> {
    let beam = parse_beam(beam_id)?;
    let key = distance_to_column_key(&beam, distance_mm)?;
    if !key.in_range(snapshot.rows, snapshot.cols) {
        return Err(GridError::out_of_range(key.to_string(), snapshot.rows, snapshot.cols));
    }
    Ok(key)
}

/// Place a default column at the position `distance_mm` along `beam_id`.
///
/// Idempotent: if a column already sits at the resolved key the snapshot
/// is returned unchanged.
pub fn insert_column_on_beam(
    snapshot: &GridSnapshot,
    beam_id: &str,
    distance_mm: f64,
) -> GridResult<GridSnapshot> {
    let key = resolve_column_on_beam(snapshot, beam_id, distance_mm)?;

    let mut next = snapshot.clone();
    next.column_dimensions.entry(key).or_default();
    Ok(next)
}
