//! # Edit Session
//!
//! The controller between a front end and the pure grid functions. An
//! [`EditSession`] holds the current snapshot, the selection, the open
//! dialog and the view state, and turns UI events into calls on
//! [`topology`](crate::topology). It owns no structural rules of its own.
//!
//! The snapshot lives behind an `Arc`. A mutation builds a new snapshot and
//! swaps the `Arc`, so anything still holding the previous one (a renderer,
//! a pending save) keeps a consistent view. After every accepted mutation
//! the new snapshot goes to the session's [`SnapshotSink`]; the session
//! never waits on it.
//!
//! Rejected edits return the error and leave the session untouched.
//!
//! ## Example
//!
//! ```rust
//! use grid_core::members::{DimensionField, DimensionPatch, MemberKind};
//! use grid_core::projection::ScreenPoint;
//! use grid_core::session::{EditSession, NullSink};
//!
//! let mut session = EditSession::new(Default::default(), Box::new(NullSink));
//! session.on_element_selected("2B", MemberKind::Column, ScreenPoint::new(100.0, 200.0)).unwrap();
//! assert_eq!(session.selected_load().unwrap().factored_kn, 10.17);
//!
//! let patch = DimensionPatch::single(DimensionField::Width, 400.0);
//! session.on_dimension_changed("2B", MemberKind::Column, &patch).unwrap();
//! assert!(session.selected_load().unwrap().factored_kn > 10.17);
//! ```

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::addressing::{BeamKey, PositionKey};
use crate::errors::{GridError, GridResult};
use crate::loads::{load_breakdown, LoadBreakdown};
use crate::members::{DimensionPatch, MemberKind};
use crate::projection::{ScreenPoint, ViewState};
use crate::snapshot::{ElementRef, GridSnapshot};
use crate::topology;

/// Receives every snapshot the session commits.
///
/// `persist` must not block on slow work; stage the snapshot and return.
pub trait SnapshotSink {
    fn persist(&mut self, snapshot: Arc<GridSnapshot>);

    /// Report any failure from earlier `persist` calls
    fn flush(&mut self) -> GridResult<()> {
        Ok(())
    }
}

/// Sink that drops every snapshot (autosave off)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn persist(&mut self, _snapshot: Arc<GridSnapshot>) {}
}

/// Sink that keeps only the latest snapshot for someone else to write.
///
/// Clones share one slot: hand one clone to the session, keep the other
/// and call [`StagedSink::take`] from the event loop.
#[derive(Debug, Clone, Default)]
pub struct StagedSink {
    slot: Arc<Mutex<Option<Arc<GridSnapshot>>>>,
}

impl StagedSink {
    pub fn new() -> Self {
        StagedSink::default()
    }

    /// Take the most recent staged snapshot, if any
    pub fn take(&self) -> Option<Arc<GridSnapshot>> {
        match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

impl SnapshotSink for StagedSink {
    fn persist(&mut self, snapshot: Arc<GridSnapshot>) {
        match self.slot.lock() {
            Ok(mut slot) => *slot = Some(snapshot),
            Err(poisoned) => *poisoned.into_inner() = Some(snapshot),
        }
    }
}

/// The selected member and where on screen it was picked
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub element: ElementRef,
    pub point: ScreenPoint,
}

/// Dialog currently open over the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Dialog {
    /// Dimension editor for a member
    EditDimensions { element: ElementRef, anchor: ScreenPoint },
    /// Distance prompt for placing a column on a beam
    InsertColumn { beam: BeamKey, anchor: ScreenPoint },
}

/// Per-editor state plus the current snapshot.
pub struct EditSession {
    snapshot: Arc<GridSnapshot>,
    selection: Option<Selection>,
    dialog: Option<Dialog>,
    view: ViewState,
    sink: Box<dyn SnapshotSink>,
}

impl EditSession {
    pub fn new(snapshot: GridSnapshot, sink: Box<dyn SnapshotSink>) -> Self {
        EditSession {
            snapshot: Arc::new(snapshot),
            selection: None,
            dialog: None,
            view: ViewState::default(),
            sink,
        }
    }

    /// Shared handle to the current snapshot
    pub fn snapshot(&self) -> Arc<GridSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Borrow the current snapshot
    pub fn current(&self) -> &GridSnapshot {
        &self.snapshot
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Swap in a snapshot from outside (file open). Not persisted.
    pub fn replace_snapshot(&mut self, snapshot: GridSnapshot) -> GridResult<()> {
        snapshot.validate()?;
        info!(rows = snapshot.rows, cols = snapshot.cols, "snapshot replaced");
        self.snapshot = Arc::new(snapshot);
        self.selection = None;
        self.dialog = None;
        Ok(())
    }

    /// Report pending sink failures
    pub fn flush(&mut self) -> GridResult<()> {
        self.sink.flush()
    }

    fn commit(&mut self, next: GridSnapshot) {
        self.snapshot = Arc::new(next);
        if let Some(sel) = self.selection {
            if !self.snapshot.contains_key(&sel.element) {
                debug!(element = %sel.element, "selection dropped by resize");
                self.selection = None;
                self.dialog = None;
            }
        }
        self.sink.persist(Arc::clone(&self.snapshot));
    }

    fn rejected<T>(&self, action: &str, err: GridError) -> GridResult<T> {
        warn!(action = action, code = err.error_code(), "{}", err);
        Err(err)
    }

    // ========================================================================
    // Selection and dialogs
    // ========================================================================

    /// Select the member `key` of `kind`, picked at `point`, and open its
    /// dimension editor.
    pub fn on_element_selected(
        &mut self,
        key: &str,
        kind: MemberKind,
        point: ScreenPoint,
    ) -> GridResult<ElementRef> {
        let element = match ElementRef::parse(key, kind) {
            Ok(element) => element,
            Err(err) => return self.rejected("select", err),
        };
        self.select(element, point)?;
        Ok(element)
    }

    /// [`on_element_selected`](Self::on_element_selected) for an already typed reference
    pub fn select(&mut self, element: ElementRef, point: ScreenPoint) -> GridResult<()> {
        if !self.snapshot.contains_key(&element) {
            let (rows, cols) = (self.snapshot.rows, self.snapshot.cols);
            let err = GridError::out_of_range(element.to_string(), rows, cols);
            return self.rejected("select", err);
        }
        debug!(element = %element, kind = %element.kind(), "selected");
        self.selection = Some(Selection { element, point });
        self.dialog = Some(Dialog::EditDimensions { element, anchor: point });
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.dialog = None;
    }

    /// Open the column insertion prompt for the selected beam.
    ///
    /// Returns `false` if the selection is not a beam.
    pub fn open_insert_dialog(&mut self) -> bool {
        match self.selection {
            Some(Selection { element: ElementRef::Beam(beam), point }) => {
                self.dialog = Some(Dialog::InsertColumn { beam, anchor: point });
                true
            }
            _ => false,
        }
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    /// Load breakdown of the selected member
    pub fn selected_load(&self) -> Option<LoadBreakdown> {
        let element = self.selection?.element;
        self.snapshot
            .dimensions_of(&element)
            .map(|dims| load_breakdown(element.kind(), &dims))
    }

    // ========================================================================
    // Edits
    // ========================================================================

    /// Merge `patch` into the member `key` of `kind`.
    pub fn on_dimension_changed(
        &mut self,
        key: &str,
        kind: MemberKind,
        patch: &DimensionPatch,
    ) -> GridResult<()> {
        match topology::set_dimension(&self.snapshot, key, kind, patch) {
            Ok(next) => {
                debug!(key = key, kind = %kind, "dimensions changed");
                self.commit(next);
                Ok(())
            }
            Err(err) => self.rejected("set dimension", err),
        }
    }

    /// Put a column on beam `beam_id` at `distance_mm` along it.
    ///
    /// Returns the key of the (new or existing) column.
    pub fn on_column_insert_requested(
        &mut self,
        beam_id: &str,
        distance_mm: f64,
    ) -> GridResult<PositionKey> {
        let key = match topology::resolve_column_on_beam(&self.snapshot, beam_id, distance_mm) {
            Ok(key) => key,
            Err(err) => return self.rejected("insert column", err),
        };
        match topology::insert_column_on_beam(&self.snapshot, beam_id, distance_mm) {
            Ok(next) => {
                info!(
                    beam_id = beam_id,
                    distance_mm = distance_mm,
                    column = %key,
                    "column inserted on beam"
                );
                if matches!(self.dialog, Some(Dialog::InsertColumn { .. })) {
                    self.dialog = None;
                }
                self.commit(next);
                Ok(key)
            }
            Err(err) => self.rejected("insert column", err),
        }
    }

    fn resize(&mut self, next: GridSnapshot) {
        if next.rows == self.snapshot.rows && next.cols == self.snapshot.cols {
            return;
        }
        info!(rows = next.rows, cols = next.cols, "grid resized");
        self.commit(next);
    }

    pub fn grow_rows(&mut self, delta: u32) {
        let next = topology::grow_rows(&self.snapshot, delta);
        self.resize(next);
    }

    pub fn grow_cols(&mut self, delta: u32) {
        let next = topology::grow_cols(&self.snapshot, delta);
        self.resize(next);
    }

    pub fn shrink_rows(&mut self, delta: u32) {
        let next = topology::shrink_rows(&self.snapshot, delta);
        self.resize(next);
    }

    pub fn shrink_cols(&mut self, delta: u32) {
        let next = topology::shrink_cols(&self.snapshot, delta);
        self.resize(next);
    }

    // ========================================================================
    // View
    // ========================================================================

    pub fn zoom_in(&mut self) {
        self.view = self.view.zoomed_in();
    }

    pub fn zoom_out(&mut self) {
        self.view = self.view.zoomed_out();
    }

    pub fn scroll_by(&mut self, dx: f32, dy: f32) {
        self.view = self.view.scrolled_by(dx, dy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::{col_beam_key, position_key, row_beam_key};
    use crate::members::DimensionField;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingSink {
        seen: Rc<RefCell<Vec<Arc<GridSnapshot>>>>,
    }

    impl SnapshotSink for RecordingSink {
        fn persist(&mut self, snapshot: Arc<GridSnapshot>) {
            self.seen.borrow_mut().push(snapshot);
        }
    }

    fn session() -> (EditSession, RecordingSink) {
        let sink = RecordingSink::default();
        (EditSession::new(GridSnapshot::new(), Box::new(sink.clone())), sink)
    }

    const HERE: ScreenPoint = ScreenPoint { x: 10.0, y: 20.0 };

    #[test]
    fn test_select_opens_editor() {
        let (mut s, _) = session();
        let element = s.on_element_selected("1A-2B", MemberKind::Panel, HERE).unwrap();
        assert_eq!(element, ElementRef::Panel(position_key(1, 0)));
        assert_eq!(s.selection().unwrap().point, HERE);
        assert_eq!(s.dialog(), Some(&Dialog::EditDimensions { element, anchor: HERE }));
    }

    #[test]
    fn test_select_rejects_bad_keys() {
        let (mut s, _) = session();
        assert!(s.on_element_selected("B2", MemberKind::Column, HERE).is_err());
        assert!(s.on_element_selected("9A", MemberKind::Column, HERE).is_err());
        assert!(s.selection().is_none());
    }

    #[test]
    fn test_dimension_change_persists_new_snapshot() {
        let (mut s, sink) = session();
        let before = s.snapshot();
        let patch = DimensionPatch::single(DimensionField::Depth, 650.0);
        s.on_dimension_changed("beam1A", MemberKind::Beam, &patch).unwrap();

        let after = s.snapshot();
        assert_eq!(before.beam_dimensions[&row_beam_key(1)].depth, 500.0);
        assert_eq!(after.beam_dimensions[&row_beam_key(1)].depth, 650.0);
        assert_eq!(sink.seen.borrow().len(), 1);
        assert!(Arc::ptr_eq(&sink.seen.borrow()[0], &after));
    }

    #[test]
    fn test_rejected_edit_changes_nothing() {
        let (mut s, sink) = session();
        let before = s.snapshot();
        let patch = DimensionPatch::single(DimensionField::Width, 1.0);
        assert!(s.on_dimension_changed("Z9", MemberKind::Panel, &patch).is_err());
        assert!(Arc::ptr_eq(&before, &s.snapshot()));
        assert!(sink.seen.borrow().is_empty());
    }

    #[test]
    fn test_live_load_follows_edits() {
        let (mut s, _) = session();
        s.on_element_selected("2B", MemberKind::Column, HERE).unwrap();
        assert_eq!(s.selected_load().unwrap().factored_kn, 10.17);

        let patch = DimensionPatch::single(DimensionField::Width, 600.0)
            .with(DimensionField::Height, 600.0);
        s.on_dimension_changed("2B", MemberKind::Column, &patch).unwrap();
        // V = 0.6 x 0.6 x 3 = 1.08; D = 27; L = 0.36 x 5 = 1.8
        assert_eq!(s.selected_load().unwrap().factored_kn, 40.68);
    }

    #[test]
    fn test_insert_column_closes_prompt() {
        let (mut s, sink) = session();
        s.select(ElementRef::Beam(row_beam_key(2)), HERE).unwrap();
        assert!(s.open_insert_dialog());
        assert!(matches!(s.dialog(), Some(Dialog::InsertColumn { .. })));

        let key = s.on_column_insert_requested("beam2A", 150.0).unwrap();
        assert_eq!(key, position_key(2, 1));
        assert!(s.dialog().is_none());
        assert_eq!(sink.seen.borrow().len(), 1);
    }

    #[test]
    fn test_insert_dialog_needs_a_beam() {
        let (mut s, _) = session();
        assert!(!s.open_insert_dialog());
        s.select(ElementRef::Column(position_key(1, 0)), HERE).unwrap();
        assert!(!s.open_insert_dialog());
    }

    #[test]
    fn test_bad_distance_is_rejected() {
        let (mut s, sink) = session();
        assert!(matches!(
            s.on_column_insert_requested("beamAA", -1.0),
            Err(GridError::InvalidDistance { .. })
        ));
        assert!(sink.seen.borrow().is_empty());
    }

    #[test]
    fn test_shrink_drops_stale_selection() {
        let (mut s, sink) = session();
        s.select(ElementRef::Beam(col_beam_key(1)), HERE).unwrap();
        s.shrink_cols(1);
        assert_eq!(s.snapshot().cols, 2);
        assert!(s.selection().is_none());
        assert!(s.dialog().is_none());
        assert_eq!(sink.seen.borrow().len(), 1);
    }

    #[test]
    fn test_noop_resize_is_not_persisted() {
        let (mut s, sink) = session();
        s.shrink_rows(3);
        s.grow_cols(0);
        assert_eq!(s.snapshot().rows, 3);
        assert!(sink.seen.borrow().is_empty());
    }

    #[test]
    fn test_view_controls() {
        let (mut s, _) = session();
        s.zoom_in();
        s.zoom_out();
        assert!((s.view().zoom - 1.0).abs() < 1e-6);
        s.scroll_by(30.0, -10.0);
        assert_eq!((s.view().scroll_x, s.view().scroll_y), (30.0, -10.0));
    }

    #[test]
    fn test_staged_sink_keeps_latest() {
        let staged = StagedSink::new();
        let mut s = EditSession::new(GridSnapshot::new(), Box::new(staged.clone()));
        s.grow_rows(1);
        s.grow_rows(1);
        let latest = staged.take().unwrap();
        assert_eq!(latest.rows, 5);
        assert!(staged.take().is_none());
    }

    #[test]
    fn test_replace_snapshot_validates() {
        let (mut s, sink) = session();
        s.select(ElementRef::Column(position_key(1, 0)), HERE).unwrap();
        s.replace_snapshot(GridSnapshot::with_size(2, 2)).unwrap();
        assert_eq!(s.snapshot().rows, 2);
        assert!(s.selection().is_none());
        assert!(sink.seen.borrow().is_empty());

        let mut bad = GridSnapshot::with_size(2, 2);
        bad.rows = 1;
        assert!(s.replace_snapshot(bad).is_err());
        assert_eq!(s.snapshot().rows, 2);
    }
}
