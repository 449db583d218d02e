//! # Baygrid GUI Application
//!
//! Graphical editor for the parametric building grid. Built with Iced;
//! everything structural lives in `grid_core`; this crate only turns
//! widget events into [`EditSession`] calls and draws the session's scene.
//!
//! ## Persistence
//!
//! The session commits into a [`StagedSink`]. After each update the newest
//! staged snapshot (if any) is written by a background [`Task`], so editing
//! never waits on the disk. One save runs at a time; edits made meanwhile
//! stay staged and the newest goes out when it finishes. Saves only happen
//! while this window holds the snapshot's file lock.

mod ui;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use iced::widget::{column, row, rule, stack};
use iced::{Element, Length, Task};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grid_core::addressing::{BeamKey, MAX_COLS};
use grid_core::config::EditorConfig;
use grid_core::errors::{GridError, GridResult};
use grid_core::file_io::{load_or_default, save_snapshot, FileLock};
use grid_core::members::{DimensionField, DimensionPatch, MemberKind};
use grid_core::projection::{project, unproject, GridPoint, ScreenPoint, ViewState};
use grid_core::render::Scene;
use grid_core::session::{Dialog, EditSession, StagedSink};
use grid_core::snapshot::{ElementRef, GridSnapshot};

/// Initial scroll so the left and top index labels are on screen
const INITIAL_SCROLL: (f32, f32) = (90.0, 10.0);

fn main() -> iced::Result {
    let config = EditorConfig::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(path = %config.snapshot_path.display(), autosave = config.autosave, "starting Baygrid");

    iced::application(move || App::boot(config.clone()), App::update, App::view)
        .title(App::title)
        .window_size((1280.0, 800.0))
        .run()
}

#[derive(Debug, Clone)]
pub enum Message {
    // Toolbar
    OpenSnapshot,
    SaveSnapshotAs,
    ZoomIn,
    ZoomOut,
    AddRow,
    RemoveRow,
    AddColumn,
    RemoveColumn,

    // Canvas
    CanvasClicked(ScreenPoint),
    CanvasScrolled(f32, f32),
    CursorMoved(Option<ScreenPoint>),

    // Members list
    ToggleSection(MemberKind),
    SelectElement(ElementRef),

    // Dimension editor
    EditSelected,
    FieldChanged(DimensionField, String),
    ApplyDimensions,

    // Column insertion
    OpenInsertDialog,
    InsertDistanceChanged(String),
    ConfirmInsert,

    ModalCancel,

    SnapshotSaved(Result<PathBuf, GridError>),
}

pub struct App {
    session: EditSession,
    staged: StagedSink,
    scene: Scene,
    scene_source: Option<(Arc<GridSnapshot>, ViewState)>,

    current_file: PathBuf,
    lock: Option<FileLock>,
    lock_holder: Option<String>,
    user_id: String,
    autosave: bool,
    saves_in_flight: usize,

    collapsed_sections: HashSet<MemberKind>,
    field_inputs: Vec<(DimensionField, String)>,
    insert_distance: String,
    cursor_grid: Option<GridPoint>,
    status: String,
}

impl App {
    fn boot(config: EditorConfig) -> (Self, Task<Message>) {
        let staged = StagedSink::new();
        let mut session = EditSession::new(GridSnapshot::new(), Box::new(staged.clone()));
        session.scroll_by(INITIAL_SCROLL.0, INITIAL_SCROLL.1);

        let mut app = App {
            session,
            staged,
            scene: Scene::default(),
            scene_source: None,
            current_file: config.snapshot_path.clone(),
            lock: None,
            lock_holder: None,
            user_id: config.user_id.clone(),
            autosave: config.autosave,
            saves_in_flight: 0,
            collapsed_sections: HashSet::new(),
            field_inputs: Vec::new(),
            insert_distance: String::new(),
            cursor_grid: None,
            status: String::from("Ready"),
        };
        app.open_file(config.snapshot_path);
        app.refresh_scene();
        (app, Task::none())
    }

    fn title(&self) -> String {
        let file = self
            .current_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.current_file.display().to_string());
        if self.lock.is_some() {
            format!("Baygrid - {}", file)
        } else {
            format!("Baygrid - {} (read-only)", file)
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        let task = self.handle(message);
        let persist = self.drain_staged();
        self.refresh_scene();
        Task::batch([task, persist])
    }

    fn handle(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenSnapshot => {
                let picked = rfd::FileDialog::new()
                    .add_filter("Baygrid snapshot", &["json"])
                    .pick_file();
                if let Some(path) = picked {
                    self.open_file(path);
                }
            }
            Message::SaveSnapshotAs => {
                let picked = rfd::FileDialog::new()
                    .add_filter("Baygrid snapshot", &["json"])
                    .set_file_name("baygrid.json")
                    .save_file();
                if let Some(path) = picked {
                    return self.save_as(path);
                }
            }
            Message::ZoomIn => self.session.zoom_in(),
            Message::ZoomOut => self.session.zoom_out(),
            Message::AddRow => self.session.grow_rows(1),
            Message::RemoveRow => {
                if self.session.current().rows <= 1 {
                    self.status = "The grid needs at least one row".to_string();
                } else {
                    self.session.shrink_rows(1);
                }
            }
            Message::AddColumn => {
                if self.session.current().cols >= MAX_COLS {
                    self.status = format!("Column lines stop at {}", MAX_COLS);
                } else {
                    self.session.grow_cols(1);
                }
            }
            Message::RemoveColumn => {
                if self.session.current().cols <= 1 {
                    self.status = "The grid needs at least one column".to_string();
                } else {
                    self.session.shrink_cols(1);
                }
            }

            Message::CanvasClicked(point) => match self.scene.pick(point) {
                Some(element) => self.select(element, point),
                None => {
                    self.session.clear_selection();
                    self.field_inputs.clear();
                }
            },
            Message::CanvasScrolled(dx, dy) => self.session.scroll_by(dx, dy),
            Message::CursorMoved(point) => {
                let view = self.session.view();
                self.cursor_grid = point.map(|p| unproject(p, &view));
            }

            Message::ToggleSection(kind) => {
                if !self.collapsed_sections.remove(&kind) {
                    self.collapsed_sections.insert(kind);
                }
            }
            Message::SelectElement(element) => {
                let anchor = self.anchor_of(&element);
                self.select(element, anchor);
            }

            Message::EditSelected => {
                if let Some(sel) = self.session.selection().copied() {
                    self.select(sel.element, sel.point);
                }
            }
            Message::FieldChanged(field, value) => {
                if let Some(slot) = self.field_inputs.iter_mut().find(|(f, _)| *f == field) {
                    slot.1 = value;
                }
            }
            Message::ApplyDimensions => self.apply_dimensions(),

            Message::OpenInsertDialog => {
                if self.session.open_insert_dialog() {
                    self.insert_distance.clear();
                }
            }
            Message::InsertDistanceChanged(value) => self.insert_distance = value,
            Message::ConfirmInsert => self.confirm_insert(),

            Message::ModalCancel => self.session.close_dialog(),

            Message::SnapshotSaved(Ok(path)) => {
                self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
                self.status = format!("Saved {}", path.display());
            }
            Message::SnapshotSaved(Err(err)) => {
                self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
                warn!(error = %serde_json::to_string(&err).unwrap_or_default(), "save failed");
                self.status = format!("Save failed: {}", err);
            }
        }
        Task::none()
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Select `element` and load its fields into the editor inputs
    fn select(&mut self, element: ElementRef, point: ScreenPoint) {
        match self.session.select(element, point) {
            Ok(()) => {
                let snapshot = self.session.current();
                self.field_inputs = element
                    .kind()
                    .fields()
                    .iter()
                    .map(|field| {
                        let value = snapshot.dimension(&element, *field).unwrap_or(0.0);
                        (*field, format!("{}", value))
                    })
                    .collect();
                self.status = format!("{} {}", element.kind().display_name(), element);
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    /// Screen anchor for an element picked from the list rather than the canvas
    fn anchor_of(&self, element: &ElementRef) -> ScreenPoint {
        let view = self.session.view();
        match element {
            ElementRef::Panel(key) | ElementRef::Column(key) => project(key.row, key.col, &view),
            ElementRef::Beam(BeamKey::Row(row)) => project(*row, 0, &view),
            ElementRef::Beam(BeamKey::Column(col)) => project(1, *col, &view),
        }
    }

    fn apply_dimensions(&mut self) {
        let Some(Dialog::EditDimensions { element, .. }) = self.session.dialog().copied() else {
            return;
        };

        let mut patch = DimensionPatch::default();
        for (field, raw) in &self.field_inputs {
            match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => patch = patch.with(*field, value),
                _ => {
                    self.status = format!("{}: '{}' is not a number", field.label(), raw);
                    return;
                }
            }
        }

        match self
            .session
            .on_dimension_changed(&element.to_string(), element.kind(), &patch)
        {
            Ok(()) => {
                self.session.close_dialog();
                self.status = format!("Updated {} {}", element.kind().display_name(), element);
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn confirm_insert(&mut self) {
        let Some(Dialog::InsertColumn { beam, .. }) = self.session.dialog().copied() else {
            return;
        };
        let distance = match self.insert_distance.trim().parse::<f64>() {
            Ok(d) => d,
            Err(_) => {
                self.status = format!("Distance '{}' is not a number", self.insert_distance);
                return;
            }
        };
        match self.session.on_column_insert_requested(&beam.to_string(), distance) {
            Ok(key) => self.status = format!("Column {} placed on {}", key, beam),
            Err(err) => self.status = err.to_string(),
        }
    }

    /// Load `path`, then lock it. A file that fails to load leaves the
    /// current file, its snapshot and its lock in place.
    fn open_file(&mut self, path: PathBuf) {
        let loaded =
            load_or_default(&path).and_then(|snapshot| self.session.replace_snapshot(snapshot));
        if let Err(err) = loaded {
            warn!(path = %path.display(), code = err.error_code(), "could not open snapshot");
            self.status = format!("Could not open {}: {}", path.display(), err);
            return;
        }

        match self.acquire_lock(&path) {
            Ok(lock) => {
                self.lock = Some(lock);
                self.lock_holder = None;
            }
            Err(GridError::FileLocked { locked_by, .. }) => {
                warn!(
                    path = %path.display(),
                    holder = %locked_by,
                    "snapshot is locked, opening read-only"
                );
                self.lock = None;
                self.lock_holder = Some(locked_by);
            }
            Err(err) => {
                warn!(path = %path.display(), "{}", err);
                self.lock = None;
                self.lock_holder = None;
            }
        }
        self.status = format!("Opened {}", path.display());
        self.current_file = path;
        self.field_inputs.clear();
        // Whatever was staged belonged to the previous file
        let _ = self.staged.take();
    }

    /// Write the current snapshot to `path` and keep editing there.
    ///
    /// The window only moves once it holds `path`'s lock; otherwise the
    /// current file and lock are kept and nothing is written.
    fn save_as(&mut self, path: PathBuf) -> Task<Message> {
        match self.acquire_lock(&path) {
            Ok(lock) => {
                self.lock = Some(lock);
                self.lock_holder = None;
                self.current_file = path.clone();
                let _ = self.staged.take();
                self.saves_in_flight += 1;
                Task::perform(write_snapshot(path, self.session.snapshot()), Message::SnapshotSaved)
            }
            Err(GridError::FileLocked { locked_by, .. }) => {
                self.status = format!("{} is being edited by {}", path.display(), locked_by);
                Task::none()
            }
            Err(err) => {
                self.status = format!("Could not save to {}: {}", path.display(), err);
                Task::none()
            }
        }
    }

    /// Lock for `path`, reusing the one this window already holds
    fn acquire_lock(&mut self, path: &Path) -> GridResult<FileLock> {
        if self.lock.as_ref().is_some_and(|lock| lock.snapshot_path() == path) {
            if let Some(lock) = self.lock.take() {
                return Ok(lock);
            }
        }
        FileLock::acquire(path, self.user_id.clone())
    }

    /// Turn the newest staged snapshot into a background save
    fn drain_staged(&mut self) -> Task<Message> {
        if !self.autosave || self.lock.is_none() {
            let _ = self.staged.take();
            return Task::none();
        }
        if self.saves_in_flight > 0 {
            return Task::none();
        }
        let Some(snapshot) = self.staged.take() else {
            return Task::none();
        };
        self.saves_in_flight += 1;
        Task::perform(write_snapshot(self.current_file.clone(), snapshot), Message::SnapshotSaved)
    }

    /// Rebuild the scene when the snapshot or the view changed
    fn refresh_scene(&mut self) {
        let snapshot = self.session.snapshot();
        let view = self.session.view();
        let unchanged = self
            .scene_source
            .as_ref()
            .is_some_and(|(s, v)| Arc::ptr_eq(s, &snapshot) && *v == view);
        if !unchanged {
            self.scene = Scene::build(&snapshot, &view);
            self.scene_source = Some((snapshot, view));
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let snapshot = self.session.current();
        let selected = self.session.selection().map(|s| s.element);

        let body = row![
            ui::items_panel::view_items_panel(snapshot, &self.collapsed_sections, selected),
            ui::grid_canvas::view_grid_canvas(&self.scene, selected),
            ui::inspector::view_inspector(
                snapshot,
                self.session.selection(),
                self.session.selected_load(),
            ),
        ]
        .spacing(6)
        .height(Length::Fill);

        let base = column![
            ui::toolbar::view_toolbar(self.session.view().zoom),
            rule::horizontal(1),
            body,
            rule::horizontal(1),
            ui::status_bar::view_status_bar(
                &self.current_file,
                self.lock_holder.as_deref(),
                self.cursor_grid,
                &self.status,
            ),
        ]
        .padding(8)
        .spacing(4);

        match self.session.dialog() {
            Some(dialog) => stack![
                base,
                ui::modal::view_backdrop(),
                ui::modal::view_modal(dialog, &self.field_inputs, &self.insert_distance),
            ]
            .into(),
            None => base.into(),
        }
    }
}

async fn write_snapshot(path: PathBuf, snapshot: Arc<GridSnapshot>) -> Result<PathBuf, GridError> {
    save_snapshot(&snapshot, &path).map(|()| path)
}
