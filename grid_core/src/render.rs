//! # Renderer
//!
//! Draws a snapshot through the [`projection`](crate::projection) onto any
//! [`DrawSurface`]. The renderer holds no state: the same snapshot and view
//! always produce the same calls, so it can run on every view change.
//!
//! ## Draw order
//!
//! 1. Dashed reference lines on every row and column line, running a
//!    fixed margin past the grid
//! 2. Panels: rectangle anchored at the panel's top-left grid point, labelled
//! 3. Beams: row beams `width x breadth`, column beams `breadth x depth`
//! 4. Columns: rectangle rotated about its centroid, labelled
//! 5. Row numbers and column letters on all four sides
//!
//! Every member shape carries an [`ElementRef`] tag so a pick on the
//! surface resolves back to its key.
//!
//! [`Scene`] is a recording surface with picking; front ends replay it
//! onto their own canvas.

use serde::{Deserialize, Serialize};

use crate::addressing::{column_letter, BeamKey};
use crate::projection::{project, project_f, silhouette_px, ScreenPoint, ScreenRect, ViewState};
use crate::snapshot::{ElementRef, GridSnapshot};

/// Reference lines run this many grid spacings past the outer lines
pub const REFERENCE_MARGIN: f32 = 0.5;

/// Index labels sit this many grid spacings outside the outer lines
pub const INDEX_LABEL_OFFSET: f32 = 0.75;

/// Label text height in pixels
pub const LABEL_SIZE_PX: f32 = 10.0;

/// Offset of member labels from their anchor, in pixels
const MEMBER_LABEL_OFFSET_PX: f32 = 4.0;

/// Approximate advance of one label glyph, for pick boxes
const LABEL_CHAR_PX: f32 = LABEL_SIZE_PX * 0.6;

/// Tag identifying the member a shape was drawn for
pub type ShapeTag = ElementRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    /// Grid reference line
    Dashed,
    Solid,
}

/// What a shape depicts; surfaces pick colors from this
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    Panel,
    Beam,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextRole {
    /// Key label next to a member
    MemberLabel,
    /// Row number / column letter around the grid
    IndexLabel,
}

/// Where a text position sits relative to the text box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAnchor {
    TopLeft,
    Center,
}

/// The drawing primitives the renderer needs.
pub trait DrawSurface {
    fn line(&mut self, from: ScreenPoint, to: ScreenPoint, style: LineStyle);

    /// Rectangle rotated by `rotation_deg` about its own center
    fn rect(&mut self, rect: ScreenRect, rotation_deg: f32, layer: Layer, tag: Option<ShapeTag>);

    fn text(
        &mut self,
        at: ScreenPoint,
        content: &str,
        anchor: TextAnchor,
        role: TextRole,
        tag: Option<ShapeTag>,
    );
}

/// Draw `snapshot` as seen through `view`.
pub fn render<S: DrawSurface + ?Sized>(snapshot: &GridSnapshot, view: &ViewState, surface: &mut S) {
    draw_reference_lines(snapshot, view, surface);
    draw_panels(snapshot, view, surface);
    draw_beams(snapshot, view, surface);
    draw_columns(snapshot, view, surface);
    draw_index_labels(snapshot, view, surface);
}

fn draw_reference_lines<S>(s: &GridSnapshot, view: &ViewState, surface: &mut S)
where
    S: DrawSurface + ?Sized,
{
    let last_col = (s.cols - 1) as f32;
    let last_row = s.rows as f32;

    for row in 1..=s.rows {
        let row = row as f32;
        surface.line(
            project_f(row, -REFERENCE_MARGIN, view),
            project_f(row, last_col + REFERENCE_MARGIN, view),
            LineStyle::Dashed,
        );
    }
    for col in 0..s.cols {
        let col = col as f32;
        surface.line(
            project_f(1.0 - REFERENCE_MARGIN, col, view),
            project_f(last_row + REFERENCE_MARGIN, col, view),
            LineStyle::Dashed,
        );
    }
}

fn draw_panels<S: DrawSurface + ?Sized>(s: &GridSnapshot, view: &ViewState, surface: &mut S) {
    for (key, panel) in &s.panel_dimensions {
        let tag = ElementRef::Panel(*key);
        let anchor = project(key.row, key.col, view);
        let rect = ScreenRect::new(
            anchor.x,
            anchor.y,
            silhouette_px(panel.width, view.zoom),
            silhouette_px(panel.height, view.zoom),
        );
        surface.rect(rect, 0.0, Layer::Panel, Some(tag));

        let label_at = ScreenPoint::new(
            anchor.x + MEMBER_LABEL_OFFSET_PX,
            anchor.y + MEMBER_LABEL_OFFSET_PX,
        );
        let label = format!("S{}", key);
        surface.text(label_at, &label, TextAnchor::TopLeft, TextRole::MemberLabel, Some(tag));
    }
}

fn draw_beams<S: DrawSurface + ?Sized>(s: &GridSnapshot, view: &ViewState, surface: &mut S) {
    for (key, beam) in &s.beam_dimensions {
        let (anchor, width_px, height_px) = match *key {
            BeamKey::Row(row) => (
                project(row, 0, view),
                silhouette_px(beam.width, view.zoom),
                silhouette_px(beam.breadth, view.zoom),
            ),
            BeamKey::Column(col) => (
                project(1, col, view),
                silhouette_px(beam.breadth, view.zoom),
                silhouette_px(beam.depth, view.zoom),
            ),
        };
        let rect = ScreenRect::new(anchor.x, anchor.y, width_px, height_px);
        surface.rect(rect, 0.0, Layer::Beam, Some(ElementRef::Beam(*key)));
    }
}

fn draw_columns<S: DrawSurface + ?Sized>(s: &GridSnapshot, view: &ViewState, surface: &mut S) {
    for (key, column) in &s.column_dimensions {
        let tag = ElementRef::Column(*key);
        let center = project(key.row, key.col, view);
        let rect = ScreenRect::centered(
            center,
            silhouette_px(column.width, view.zoom),
            silhouette_px(column.height, view.zoom),
        );
        surface.rect(rect, column.rotation as f32, Layer::Column, Some(tag));

        let label_at = ScreenPoint::new(
            center.x + MEMBER_LABEL_OFFSET_PX,
            center.y + MEMBER_LABEL_OFFSET_PX,
        );
        let label = format!("C{}", key);
        surface.text(label_at, &label, TextAnchor::TopLeft, TextRole::MemberLabel, Some(tag));
    }
}

fn draw_index_labels<S>(s: &GridSnapshot, view: &ViewState, surface: &mut S)
where
    S: DrawSurface + ?Sized,
{
    let last_col = (s.cols - 1) as f32;
    let last_row = s.rows as f32;

    for row in 1..=s.rows {
        let label = row.to_string();
        let r = row as f32;
        for col in [-INDEX_LABEL_OFFSET, last_col + INDEX_LABEL_OFFSET] {
            let at = project_f(r, col, view);
            surface.text(at, &label, TextAnchor::Center, TextRole::IndexLabel, None);
        }
    }
    for col in 0..s.cols {
        let label = column_letter(col).to_string();
        let c = col as f32;
        for row in [1.0 - INDEX_LABEL_OFFSET, last_row + INDEX_LABEL_OFFSET] {
            let at = project_f(row, c, view);
            surface.text(at, &label, TextAnchor::Center, TextRole::IndexLabel, None);
        }
    }
}

// ============================================================================
// Recording surface
// ============================================================================

/// One recorded draw call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Line {
        from: ScreenPoint,
        to: ScreenPoint,
        style: LineStyle,
    },
    Rect {
        rect: ScreenRect,
        rotation_deg: f32,
        layer: Layer,
        tag: Option<ShapeTag>,
    },
    Text {
        at: ScreenPoint,
        content: String,
        anchor: TextAnchor,
        role: TextRole,
        tag: Option<ShapeTag>,
    },
}

impl Shape {
    pub fn tag(&self) -> Option<ShapeTag> {
        match self {
            Shape::Line { .. } => None,
            Shape::Rect { tag, .. } | Shape::Text { tag, .. } => *tag,
        }
    }

    /// True if `p` falls on this shape
    fn hit(&self, p: ScreenPoint) -> bool {
        match self {
            Shape::Line { .. } => false,
            Shape::Rect { rect, rotation_deg, .. } => {
                // Undo the rotation about the rect's center, then test the box
                let c = rect.center();
                let (sin, cos) = (-rotation_deg.to_radians()).sin_cos();
                let (dx, dy) = (p.x - c.x, p.y - c.y);
                let local = ScreenPoint::new(c.x + dx * cos - dy * sin, c.y + dx * sin + dy * cos);
                rect.contains(local)
            }
            Shape::Text { at, content, anchor, .. } => text_box(*at, content, *anchor).contains(p),
        }
    }
}

/// Approximate box covered by a label
pub fn text_box(at: ScreenPoint, content: &str, anchor: TextAnchor) -> ScreenRect {
    let width = content.chars().count() as f32 * LABEL_CHAR_PX;
    match anchor {
        TextAnchor::TopLeft => ScreenRect::new(at.x, at.y, width, LABEL_SIZE_PX),
        TextAnchor::Center => ScreenRect::centered(at, width, LABEL_SIZE_PX),
    }
}

/// Recording [`DrawSurface`] with shape picking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub shapes: Vec<Shape>,
}

impl Scene {
    /// Render a snapshot into a fresh scene
    pub fn build(snapshot: &GridSnapshot, view: &ViewState) -> Self {
        let mut scene = Scene::default();
        render(snapshot, view, &mut scene);
        scene
    }

    /// Topmost tagged shape under `p`
    pub fn pick(&self, p: ScreenPoint) -> Option<ShapeTag> {
        self.shapes
            .iter()
            .rev()
            .filter(|shape| shape.tag().is_some())
            .find(|shape| shape.hit(p))
            .and_then(Shape::tag)
    }
}

impl DrawSurface for Scene {
    fn line(&mut self, from: ScreenPoint, to: ScreenPoint, style: LineStyle) {
        self.shapes.push(Shape::Line { from, to, style });
    }

    fn rect(&mut self, rect: ScreenRect, rotation_deg: f32, layer: Layer, tag: Option<ShapeTag>) {
        self.shapes.push(Shape::Rect {
            rect,
            rotation_deg,
            layer,
            tag,
        });
    }

    fn text(
        &mut self,
        at: ScreenPoint,
        content: &str,
        anchor: TextAnchor,
        role: TextRole,
        tag: Option<ShapeTag>,
    ) {
        self.shapes.push(Shape::Text {
            at,
            content: content.to_string(),
            anchor,
            role,
            tag,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::{col_beam_key, position_key, row_beam_key};
    use crate::members::{DimensionField, DimensionPatch, MemberKind};
    use crate::topology::set_dimension;

    fn kinds_in_order(scene: &Scene) -> Vec<&'static str> {
        let mut order: Vec<&'static str> = Vec::new();
        for shape in &scene.shapes {
            let kind = match shape {
                Shape::Line { .. } => "line",
                Shape::Rect { layer: Layer::Panel, .. } => "panel",
                Shape::Rect { layer: Layer::Beam, .. } => "beam",
                Shape::Rect { layer: Layer::Column, .. } => "column",
                Shape::Text { role: TextRole::IndexLabel, .. } => "index",
                Shape::Text { role: TextRole::MemberLabel, tag, .. } => match tag {
                    Some(ElementRef::Panel(_)) => "panel",
                    _ => "column",
                },
            };
            if order.last() != Some(&kind) {
                order.push(kind);
            }
        }
        order
    }

    #[test]
    fn test_draw_order() {
        let scene = Scene::build(&GridSnapshot::new(), &ViewState::default());
        assert_eq!(kinds_in_order(&scene), vec!["line", "panel", "beam", "column", "index"]);
    }

    #[test]
    fn test_shape_counts() {
        let scene = Scene::build(&GridSnapshot::new(), &ViewState::default());
        let lines = scene.shapes.iter().filter(|s| matches!(s, Shape::Line { .. })).count();
        let rects = scene.shapes.iter().filter(|s| matches!(s, Shape::Rect { .. })).count();
        let index = scene
            .shapes
            .iter()
            .filter(|s| matches!(s, Shape::Text { role: TextRole::IndexLabel, .. }))
            .count();
        assert_eq!(lines, 3 + 3);
        assert_eq!(rects, 9 + 4 + 9);
        assert_eq!(index, 2 * 3 + 2 * 3);
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let snapshot = GridSnapshot::new();
        let view = ViewState { zoom: 1.2, scroll_x: 5.0, scroll_y: -3.0 };
        let mut scene = Scene::default();
        render(&snapshot, &view, &mut scene);
        let first = scene.clone();
        assert_eq!(Scene::build(&snapshot, &view), first);
    }

    #[test]
    fn test_reference_lines_extend_past_grid() {
        let scene = Scene::build(&GridSnapshot::new(), &ViewState::default());
        match &scene.shapes[0] {
            Shape::Line { from, to, style } => {
                assert_eq!(*style, LineStyle::Dashed);
                // row 1: from col -0.5 to col 2.5
                assert_eq!(*from, ScreenPoint::new(-50.0, 100.0));
                assert_eq!(*to, ScreenPoint::new(250.0, 100.0));
            }
            other => panic!("expected a line, got {:?}", other),
        }
    }

    #[test]
    fn test_beam_silhouettes_follow_orientation() {
        let scene = Scene::build(&GridSnapshot::new(), &ViewState::default());
        let rect_of = |target: ElementRef| {
            scene.shapes.iter().find_map(|s| match s {
                Shape::Rect { rect, tag: Some(t), .. } if *t == target => Some(*rect),
                _ => None,
            })
        };
        // default beam: width 7200, depth 500, breadth 300
        let row = rect_of(ElementRef::Beam(row_beam_key(2))).unwrap();
        assert_eq!(row, ScreenRect::new(0.0, 200.0, 3.6, 0.15));
        let col = rect_of(ElementRef::Beam(col_beam_key(1))).unwrap();
        assert_eq!(col, ScreenRect::new(100.0, 100.0, 0.15, 0.25));
    }

    #[test]
    fn test_pick_resolves_labels_to_keys() {
        let scene = Scene::build(&GridSnapshot::new(), &ViewState::default());
        // Column 2B sits at (100, 200); its label starts 4 px right/below
        let hit = scene.pick(ScreenPoint::new(108.0, 208.0));
        assert_eq!(hit, Some(ElementRef::Column(position_key(2, 1))));
        // Index labels are untagged
        assert_eq!(scene.pick(ScreenPoint::new(-75.0, 100.0)), None);
    }

    #[test]
    fn test_pick_honors_rotation() {
        let s = GridSnapshot::new();
        let patch = DimensionPatch::single(DimensionField::Width, 40000.0)
            .with(DimensionField::Height, 2000.0);
        let s = set_dimension(&s, "1A", MemberKind::Column, &patch).unwrap();
        let tag = Some(ElementRef::Column(position_key(1, 0)));

        // 20 x 1 px column centered on (0, 100)
        let flat = Scene::build(&s, &ViewState::default());
        assert_eq!(flat.pick(ScreenPoint::new(-9.0, 100.0)), tag);
        assert_eq!(flat.pick(ScreenPoint::new(0.0, 91.0)), None);

        let patch = DimensionPatch::single(DimensionField::Rotation, 90.0);
        let s = set_dimension(&s, "1A", MemberKind::Column, &patch).unwrap();
        let turned = Scene::build(&s, &ViewState::default());
        assert_eq!(turned.pick(ScreenPoint::new(0.0, 91.0)), tag);
        assert_eq!(turned.pick(ScreenPoint::new(-9.0, 100.0)), None);
    }
}
