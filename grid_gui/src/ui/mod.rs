//! UI module for the Baygrid GUI
//!
//! # Panel Structure
//! - `toolbar` - File operations (Open, Save As), resize, zoom
//! - `items_panel` - Left sidebar: members grouped by kind, with loads
//! - `grid_canvas` - Center: the rendered grid, picking and scrolling
//! - `inspector` - Right panel: selected member, load readout, actions
//! - `status_bar` - Bottom: file, lock holder, cursor position, messages
//! - `modal` - Dimension editor and column insertion dialogs

pub mod grid_canvas;
pub mod inspector;
pub mod items_panel;
pub mod modal;
pub mod status_bar;
pub mod toolbar;
