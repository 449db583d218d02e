//! Grid canvas
//!
//! Replays a [`Scene`] onto an Iced canvas frame and turns mouse input into
//! messages: left click picks, the wheel scrolls, cursor motion feeds the
//! status bar.

use iced::alignment::{Horizontal, Vertical};
use iced::mouse;
use iced::widget::canvas::{self, Canvas, Frame, Geometry, LineDash, Path, Stroke, Text};
use iced::{Color, Element, Length, Point, Rectangle, Renderer, Size, Theme, Vector};

use grid_core::projection::ScreenPoint;
use grid_core::render::{Layer, LineStyle, Scene, Shape, TextAnchor, TextRole, LABEL_SIZE_PX};
use grid_core::snapshot::ElementRef;

use crate::Message;

/// Pixels scrolled per wheel line
const LINE_SCROLL_PX: f32 = 40.0;

const REFERENCE_DASH: &[f32] = &[6.0, 4.0];

/// Canvas program drawing one scene
pub struct GridCanvas<'a> {
    scene: &'a Scene,
    selected: Option<ElementRef>,
}

pub fn view_grid_canvas(scene: &Scene, selected: Option<ElementRef>) -> Element<'_, Message> {
    Canvas::new(GridCanvas { scene, selected })
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn layer_color(layer: Layer) -> Color {
    match layer {
        Layer::Panel => Color::from_rgb(0.2, 0.5, 0.8),
        Layer::Beam => Color::from_rgb(0.8, 0.4, 0.2),
        Layer::Column => Color::from_rgb(0.3, 0.3, 0.3),
    }
}

fn point(p: ScreenPoint) -> Point {
    Point::new(p.x, p.y)
}

impl GridCanvas<'_> {
    fn is_selected(&self, tag: &Option<ElementRef>) -> bool {
        tag.is_some() && *tag == self.selected
    }

    fn draw_shape(&self, frame: &mut Frame, shape: &Shape) {
        let selected_color = Color::from_rgb(0.85, 0.15, 0.15);

        match shape {
            Shape::Line { from, to, style } => {
                let base = Stroke::default()
                    .with_color(Color::from_rgb(0.7, 0.7, 0.7))
                    .with_width(1.0);
                let stroke = match style {
                    LineStyle::Dashed => Stroke {
                        line_dash: LineDash {
                            segments: REFERENCE_DASH,
                            offset: 0,
                        },
                        ..base
                    },
                    LineStyle::Solid => base,
                };
                frame.stroke(&Path::line(point(*from), point(*to)), stroke);
            }
            Shape::Rect {
                rect,
                rotation_deg,
                layer,
                tag,
            } => {
                let color = if self.is_selected(tag) {
                    selected_color
                } else {
                    layer_color(*layer)
                };
                let center = rect.center();
                let size = Size::new(rect.width, rect.height);

                // Draw about the centroid so rotation turns the rect in place
                frame.with_save(|frame| {
                    frame.translate(Vector::new(center.x, center.y));
                    frame.rotate(rotation_deg.to_radians());
                    let top_left = Point::new(-rect.width / 2.0, -rect.height / 2.0);
                    frame.fill_rectangle(top_left, size, Color { a: 0.35, ..color });
                    frame.stroke(
                        &Path::rectangle(top_left, size),
                        Stroke::default().with_color(color).with_width(1.0),
                    );
                });
            }
            Shape::Text {
                at,
                content,
                anchor,
                role,
                tag,
            } => {
                let color = match role {
                    _ if self.is_selected(tag) => selected_color,
                    TextRole::MemberLabel => Color::from_rgb(0.2, 0.2, 0.2),
                    TextRole::IndexLabel => Color::from_rgb(0.45, 0.45, 0.45),
                };
                let (align_x, align_y) = match anchor {
                    TextAnchor::TopLeft => (Horizontal::Left, Vertical::Top),
                    TextAnchor::Center => (Horizontal::Center, Vertical::Center),
                };
                frame.fill_text(Text {
                    content: content.clone(),
                    position: point(*at),
                    color,
                    size: iced::Pixels(LABEL_SIZE_PX),
                    align_x: align_x.into(),
                    align_y,
                    ..Text::default()
                });
            }
        }
    }
}

impl canvas::Program<Message> for GridCanvas<'_> {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let p = cursor.position_in(bounds)?;
                let clicked = Message::CanvasClicked(ScreenPoint::new(p.x, p.y));
                Some(canvas::Action::publish(clicked).and_capture())
            }
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                cursor.position_in(bounds)?;
                let (dx, dy) = match delta {
                    mouse::ScrollDelta::Lines { x, y } => (x * LINE_SCROLL_PX, y * LINE_SCROLL_PX),
                    mouse::ScrollDelta::Pixels { x, y } => (*x, *y),
                };
                Some(canvas::Action::publish(Message::CanvasScrolled(dx, dy)).and_capture())
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                let p = cursor.position_in(bounds).map(|p| ScreenPoint::new(p.x, p.y));
                Some(canvas::Action::publish(Message::CursorMoved(p)))
            }
            canvas::Event::Mouse(mouse::Event::CursorLeft) => {
                Some(canvas::Action::publish(Message::CursorMoved(None)))
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::WHITE);

        for shape in &self.scene.shapes {
            self.draw_shape(&mut frame, shape);
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        let over_member = cursor
            .position_in(bounds)
            .is_some_and(|p| self.scene.pick(ScreenPoint::new(p.x, p.y)).is_some());
        if over_member {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }
}
