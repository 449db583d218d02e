//! Modal dialog component
//!
//! Overlays for the session's open [`Dialog`]: the dimension editor and
//! the column-on-beam prompt.

use iced::widget::{button, column, container, row, text, text_input, Column, Space};
use iced::{Alignment, Element, Length, Padding};

use grid_core::addressing::MM_PER_LETTER_STEP;
use grid_core::members::DimensionField;
use grid_core::session::Dialog;

use crate::Message;

/// Render a modal backdrop (semi-transparent overlay that catches clicks)
pub fn view_backdrop() -> Element<'static, Message> {
    button(Space::new())
        .on_press(Message::ModalCancel)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(|_, _| {
            iced::widget::button::Style::default()
                .with_background(iced::Color::from_rgba(0.0, 0.0, 0.0, 0.5))
        })
        .into()
}

/// Render the modal for the open dialog
pub fn view_modal<'a>(
    dialog: &Dialog,
    field_inputs: &'a [(DimensionField, String)],
    insert_distance: &'a str,
) -> Element<'a, Message> {
    match dialog {
        Dialog::EditDimensions { element, .. } => {
            let mut fields: Column<'_, Message> = column![].spacing(6);
            for (field, value) in field_inputs {
                let field = *field;
                fields = fields.push(labeled_input(field.label(), value, move |v| {
                    Message::FieldChanged(field, v)
                }));
            }
            view_dialog(
                format!("Edit {} {}", element.kind().display_name(), element),
                fields.into(),
                "Apply",
                Message::ApplyDimensions,
            )
        }
        Dialog::InsertColumn { beam, .. } => {
            let body = column![
                labeled_input("Distance (mm):", insert_distance, Message::InsertDistanceChanged),
                text(format!(
                    "Every {} mm along the beam moves one column letter.",
                    MM_PER_LETTER_STEP
                ))
                .size(10)
                .color([0.5, 0.5, 0.5]),
            ]
            .spacing(6);
            view_dialog(
                format!("Insert column on {}", beam),
                body.into(),
                "Insert",
                Message::ConfirmInsert,
            )
        }
    }
}

fn view_dialog<'a>(
    title: String,
    body: Element<'a, Message>,
    confirm_label: &'static str,
    confirm: Message,
) -> Element<'a, Message> {
    let buttons = row![
        Space::new().width(Length::Fill),
        button(text("Cancel").size(11))
            .on_press(Message::ModalCancel)
            .padding(Padding::from([6, 16]))
            .style(button::secondary),
        Space::new().width(8),
        button(text(confirm_label).size(11))
            .on_press(confirm)
            .padding(Padding::from([6, 16]))
            .style(button::primary),
    ]
    .align_y(Alignment::Center);

    let content = column![
        text(title).size(18),
        Space::new().height(12),
        body,
        Space::new().height(20),
        buttons,
    ]
    .width(Length::Fixed(360.0));

    let modal_box = container(content)
        .padding(20)
        .style(container::bordered_box);

    // Center the modal in the screen
    container(modal_box)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(iced::alignment::Horizontal::Center)
        .align_y(iced::alignment::Vertical::Center)
        .into()
}

fn labeled_input<'a>(
    label: &'a str,
    value: &'a str,
    on_change: impl Fn(String) -> Message + 'a,
) -> Element<'a, Message> {
    row![
        text(label).size(11).width(Length::Fixed(110.0)),
        text_input("", value)
            .on_input(on_change)
            .width(Length::Fill)
            .padding(4)
            .size(11),
    ]
    .align_y(Alignment::Center)
    .into()
}
