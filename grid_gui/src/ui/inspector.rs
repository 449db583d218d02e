//! Inspector (Right Side)
//!
//! Shows the selected member: its stored dimensions, the live load
//! readout, and the actions available for it.

use iced::widget::{button, column, container, row, rule, text, Column, Space};
use iced::{Element, Length, Padding};

use grid_core::loads::LoadBreakdown;
use grid_core::session::Selection;
use grid_core::snapshot::{ElementRef, GridSnapshot};

use crate::Message;

const PANEL_WIDTH: f32 = 240.0;

fn readout_row(label: &str, value: String) -> Element<'static, Message> {
    row![
        text(label.to_string()).size(11).width(Length::Fixed(110.0)),
        text(value).size(11),
    ]
    .into()
}

/// Render the inspector for the current selection
pub fn view_inspector<'a>(
    snapshot: &'a GridSnapshot,
    selection: Option<&'a Selection>,
    load: Option<LoadBreakdown>,
) -> Element<'a, Message> {
    let content: Column<'_, Message> = match selection {
        None => column![text("Click a member on the grid or pick one from the list")
            .size(12)
            .color([0.5, 0.5, 0.5])],
        Some(sel) => {
            let element = sel.element;
            let kind = element.kind();

            let mut dims: Column<'_, Message> = column![].spacing(2);
            for field in kind.fields() {
                let value = snapshot
                    .dimension(&element, *field)
                    .map(|v| format!("{}", v))
                    .unwrap_or_else(|| "-".to_string());
                dims = dims.push(readout_row(field.label(), value));
            }

            let loads: Element<'_, Message> = match load {
                Some(b) => column![
                    readout_row("Dead (kN)", format!("{:.2}", b.dead_kn)),
                    readout_row("Live (kN)", format!("{:.2}", b.live_kn)),
                    readout_row("Factored", b.factored().to_string()),
                    text("1.4 D + 1.6 L").size(9).color([0.5, 0.5, 0.5]),
                ]
                .spacing(2)
                .into(),
                None => text("No load").size(11).into(),
            };

            let mut actions = row![button(text("Edit dimensions").size(11))
                .on_press(Message::EditSelected)
                .padding(Padding::from([4, 8]))
                .style(button::primary)]
            .spacing(6);
            if matches!(element, ElementRef::Beam(_)) {
                actions = actions.push(
                    button(text("Insert column").size(11))
                        .on_press(Message::OpenInsertDialog)
                        .padding(Padding::from([4, 8]))
                        .style(button::secondary),
                );
            }

            column![
                text(format!("{} {}", kind.display_name(), element)).size(14),
                Space::new().height(8),
                dims,
                Space::new().height(8),
                rule::horizontal(1),
                text("Estimated load").size(12),
                loads,
                Space::new().height(12),
                actions,
            ]
            .spacing(4)
        }
    };

    container(content.padding(8))
        .width(Length::Fixed(PANEL_WIDTH))
        .height(Length::Fill)
        .style(container::bordered_box)
        .padding(5)
        .into()
}
