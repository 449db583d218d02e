//! # grid_core - Parametric Building Grid Engine
//!
//! `grid_core` is the model behind Baygrid: a rectangular structural grid of
//! slab panels, columns and beams addressed by row number and column letter,
//! with a resize engine, rough load estimates, and a screen projection and
//! renderer that front ends draw through. All inputs and outputs are
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Immutable snapshots**: every edit returns a new [`GridSnapshot`]
//! - **Typed keys**: `"2C"` and `"beam1A"` are parsed once into [`PositionKey`] / [`BeamKey`]
//! - **Rich Errors**: structured [`GridError`] values, never panics on user input
//! - **Pure rendering**: the renderer draws onto a [`DrawSurface`] trait
//!
//! ## Quick Start
//!
//! ```rust
//! use grid_core::loads::load_schedule;
//! use grid_core::members::{DimensionField, DimensionPatch, MemberKind};
//! use grid_core::snapshot::GridSnapshot;
//! use grid_core::topology::{grow_cols, set_dimension};
//!
//! let grid = grow_cols(&GridSnapshot::new(), 1);
//! let patch = DimensionPatch::single(DimensionField::Depth, 600.0);
//! let grid = set_dimension(&grid, "beam1A", MemberKind::Beam, &patch).unwrap();
//!
//! let schedule = load_schedule(&grid);
//! assert_eq!(schedule.entries_of(MemberKind::Column).count(), 12);
//!
//! let json = serde_json::to_string_pretty(&grid).unwrap();
//! assert!(json.contains("\"beamAC\""));
//! ```
//!
//! ## Modules
//!
//! - [`addressing`] - Position and beam keys and their string encoding
//! - [`members`] - Panel, column and beam dimension records
//! - [`snapshot`] - The complete grid state
//! - [`topology`] - Grow, shrink, dimension edits, columns on beams
//! - [`loads`] - Factored load estimates and schedules
//! - [`projection`] - Grid to screen mapping, zoom and scroll
//! - [`render`] - Renderer, recording scene and picking
//! - [`session`] - Edit controller and persistence sinks
//! - [`file_io`] - Atomic saves, validated loads, file locking
//! - [`config`] - Environment configuration
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod addressing;
pub mod config;
pub mod errors;
pub mod file_io;
pub mod loads;
pub mod members;
pub mod projection;
pub mod render;
pub mod session;
pub mod snapshot;
pub mod topology;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use addressing::{BeamKey, PositionKey};
pub use errors::{GridError, GridResult};
pub use file_io::{load_snapshot, save_snapshot, FileLock, SnapshotFileStore};
pub use members::{DimensionPatch, MemberKind};
pub use render::{DrawSurface, Scene};
pub use session::{EditSession, SnapshotSink};
pub use snapshot::{ElementRef, GridSnapshot};
