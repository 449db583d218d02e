//! Status Bar (Bottom)
//!
//! Displays:
//! - Current snapshot file
//! - Lock holder (if read-only)
//! - Grid position under the cursor
//! - Status messages

use std::path::Path;

use iced::widget::{row, text, Space};
use iced::{Element, Length, Padding};

use grid_core::addressing::{column_letter, MAX_COLS};
use grid_core::projection::GridPoint;

use crate::Message;

/// `row 2.35 / col B+0.40`, or empty when the cursor is off the grid
fn cursor_label(cursor: Option<GridPoint>) -> String {
    match cursor {
        Some(p) if p.col >= 0.0 && p.col < MAX_COLS as f32 => {
            let base = p.col.floor();
            format!("row {:.2} / col {}+{:.2}", p.row, column_letter(base as u32), p.col - base)
        }
        Some(p) => format!("row {:.2} / col {:.2}", p.row, p.col),
        None => String::new(),
    }
}

/// Render the status bar
pub fn view_status_bar<'a>(
    current_file: &'a Path,
    lock_holder: Option<&'a str>,
    cursor: Option<GridPoint>,
    status: &'a str,
) -> Element<'a, Message> {
    let lock_info = match lock_holder {
        Some(holder) => format!(" [Read-only, locked by: {}]", holder),
        None => String::new(),
    };

    row![
        text(current_file.display().to_string()).size(10),
        text(lock_info).size(10).color([0.6, 0.3, 0.0]),
        Space::new().width(Length::Fill),
        text(cursor_label(cursor)).size(10).color([0.5, 0.5, 0.5]),
        Space::new().width(16),
        text(status).size(10),
    ]
    .padding(Padding::from([4, 0]))
    .into()
}
