//! Members Panel (Left Sidebar)
//!
//! Collapsible lists of every panel, beam and column in the grid with its
//! factored load. Clicking an entry selects it, which is the easy way to
//! reach members too small to hit on the canvas.

use std::collections::HashSet;

use iced::widget::{button, column, container, row, rule, scrollable, text, Column, Space};
use iced::{Alignment, Element, Length, Padding};

use grid_core::loads::load_schedule;
use grid_core::members::MemberKind;
use grid_core::snapshot::{ElementRef, GridSnapshot};

use crate::Message;

const PANEL_WIDTH: f32 = 200.0;

/// Render the members panel
pub fn view_items_panel<'a>(
    snapshot: &'a GridSnapshot,
    collapsed_sections: &'a HashSet<MemberKind>,
    selected: Option<ElementRef>,
) -> Element<'a, Message> {
    let schedule = load_schedule(snapshot);
    let mut panel_content: Column<'_, Message> = column![
        text(format!("Grid {} x {}", snapshot.rows, snapshot.cols)).size(12),
        text(format!("Total {:.2} kN", schedule.total_kn())).size(10).color([0.4, 0.4, 0.4]),
        rule::horizontal(1),
    ]
    .spacing(4);

    // Listed in schedule order: panels, beams, columns
    for kind in [MemberKind::Panel, MemberKind::Beam, MemberKind::Column] {
        let expanded = !collapsed_sections.contains(&kind);
        let count = schedule.entries_of(kind).count();
        panel_content = panel_content.push(view_section_header(kind, count, expanded));

        if expanded {
            let mut list: Column<'_, Message> = column![].spacing(2).padding(Padding::from([4, 8]));
            for entry in schedule.entries_of(kind) {
                let style = if selected == Some(entry.element) {
                    button::primary
                } else {
                    button::secondary
                };
                let label = row![
                    text(entry.element.to_string()).size(10),
                    Space::new().width(Length::Fill),
                    text(format!("{:.2} kN", entry.load.factored_kn)).size(10),
                ];
                list = list.push(
                    button(label)
                        .on_press(Message::SelectElement(entry.element))
                        .padding(Padding::from([3, 6]))
                        .style(style)
                        .width(Length::Fill),
                );
            }
            if count == 0 {
                list = list.push(text("(none)").size(10).color([0.5, 0.5, 0.5]));
            }
            panel_content = panel_content.push(list);
        }

        panel_content = panel_content.push(rule::horizontal(1));
    }

    container(scrollable(panel_content.padding(4)))
        .width(Length::Fixed(PANEL_WIDTH))
        .height(Length::Fill)
        .style(container::bordered_box)
        .padding(4)
        .into()
}

/// Collapsible section header with expand/collapse indicator
fn view_section_header(
    kind: MemberKind,
    count: usize,
    expanded: bool,
) -> Element<'static, Message> {
    let indicator = if expanded { "▼" } else { "▶" };

    button(
        row![
            text(indicator).size(10),
            Space::new().width(4),
            text(format!("{}s ({})", kind.display_name(), count)).size(11),
        ]
        .align_y(Alignment::Center),
    )
    .on_press(Message::ToggleSection(kind))
    .padding(Padding::from([4, 6]))
    .style(button::text)
    .width(Length::Fill)
    .into()
}
