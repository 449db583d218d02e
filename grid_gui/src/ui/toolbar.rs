//! Toolbar component
//!
//! File operations (Open, Save As), zoom, and grid resize buttons.

use iced::widget::{button, row, text, Space};
use iced::{Alignment, Element, Length, Padding};

use crate::Message;

fn tool_button(label: &str, message: Message) -> button::Button<'_, Message> {
    button(text(label).size(11))
        .on_press(message)
        .padding(Padding::from([4, 8]))
        .style(button::secondary)
}

/// Render the toolbar
pub fn view_toolbar(zoom: f32) -> Element<'static, Message> {
    let file_buttons = row![
        tool_button("Open", Message::OpenSnapshot),
        tool_button("Save As", Message::SaveSnapshotAs),
    ]
    .spacing(4);

    let zoom_buttons = row![
        tool_button("-", Message::ZoomOut),
        text(format!("{:.0}%", zoom * 100.0)).size(11).width(Length::Fixed(44.0)),
        tool_button("+", Message::ZoomIn),
    ]
    .spacing(4)
    .align_y(Alignment::Center);

    let grid_buttons = row![
        text("Rows").size(11),
        tool_button("-", Message::RemoveRow),
        tool_button("+", Message::AddRow),
        Space::new().width(12),
        text("Columns").size(11),
        tool_button("-", Message::RemoveColumn),
        tool_button("+", Message::AddColumn),
    ]
    .spacing(4)
    .align_y(Alignment::Center);

    row![
        text("Baygrid").size(20),
        Space::new().width(16),
        file_buttons,
        Space::new().width(Length::Fill),
        grid_buttons,
        Space::new().width(24),
        zoom_buttons,
    ]
    .padding(Padding::from([4, 0]))
    .align_y(Alignment::Center)
    .into()
}
