use std::f32::consts::FRAC_PI_2;

use egui::epaint::TextShape;
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, StrokeKind, Vec2};
use furnish_scene::{PlanCanvas, PlanLabelOrientation, PlanLine, PlanRect};

const BACKGROUND: Color32 = Color32::from_rgb(0xf5, 0xf5, 0xf5);
const MINOR_GRID: Color32 = Color32::from_rgb(0xe0, 0xe0, 0xe0);
const MAJOR_GRID: Color32 = Color32::from_rgb(0xbd, 0xbd, 0xbd);
const ROOM_OUTLINE: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);
const LABEL: Color32 = Color32::from_rgb(0x44, 0x44, 0x44);
const HIGHLIGHT: Color32 = Color32::from_rgb(0x8b, 0x5c, 0xf6);
const HEADING: Color32 = Color32::from_rgb(0xdc, 0x26, 0x26);
const FOOTPRINT_OPACITY: f32 = 0.85;

/// Uniform fit of plan canvas pixels into a screen rect, centered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanTransform {
    pub origin: Pos2,
    pub scale: f32,
}

impl PlanTransform {
    pub fn fit(canvas_size: [f32; 2], rect: Rect) -> Self {
        let width = canvas_size[0].max(1.0);
        let height = canvas_size[1].max(1.0);
        let scale = (rect.width() / width).min(rect.height() / height).min(1.0).max(1.0e-3);
        let used = Vec2::new(width * scale, height * scale);
        Self {
            origin: rect.center() - used * 0.5,
            scale,
        }
    }

    pub fn to_screen(&self, point: [f32; 2]) -> Pos2 {
        self.origin + Vec2::new(point[0], point[1]) * self.scale
    }

    pub fn to_plan(&self, pos: Pos2) -> [f32; 2] {
        let local = (pos - self.origin) / self.scale;
        [local.x, local.y]
    }

    pub fn rect_to_screen(&self, rect: &PlanRect) -> Rect {
        Rect::from_min_max(self.to_screen(rect.min), self.to_screen(rect.max))
    }
}

fn color(rgb: [f32; 3], opacity: f32) -> Color32 {
    let channel = |value: f32| (value * 255.0).round().clamp(0.0, 255.0) as u8;
    Color32::from_rgba_unmultiplied(
        channel(rgb[0]),
        channel(rgb[1]),
        channel(rgb[2]),
        channel(opacity),
    )
}

fn paint_lines(painter: &Painter, transform: &PlanTransform, lines: &[PlanLine], stroke: Stroke) {
    for line in lines {
        painter.line_segment([transform.to_screen(line.from), transform.to_screen(line.to)], stroke);
    }
}

/// Paints the plan canvas into `rect` and returns the mapping used, for picking.
pub fn paint_plan(painter: &Painter, rect: Rect, canvas: &PlanCanvas) -> PlanTransform {
    let transform = PlanTransform::fit(canvas.size, rect);
    let canvas_rect = transform.rect_to_screen(&PlanRect {
        min: [0.0, 0.0],
        max: canvas.size,
    });
    painter.rect_filled(canvas_rect, 0.0, BACKGROUND);
    let room_rect = transform.rect_to_screen(&canvas.room);
    painter.rect_filled(room_rect, 0.0, color(canvas.floor_color, 1.0));
    paint_lines(painter, &transform, &canvas.minor_grid, Stroke::new(0.5, MINOR_GRID));
    paint_lines(painter, &transform, &canvas.major_grid, Stroke::new(1.0, MAJOR_GRID));
    painter.rect_stroke(room_rect, 0.0, Stroke::new(2.0, ROOM_OUTLINE), StrokeKind::Middle);

    let font = FontId::proportional(12.0);
    for label in &canvas.labels {
        let anchor = transform.to_screen(label.anchor);
        match label.orientation {
            PlanLabelOrientation::Horizontal => {
                painter.text(anchor, Align2::CENTER_CENTER, &label.text, font.clone(), LABEL);
            }
            PlanLabelOrientation::Vertical => {
                let galley = painter.layout_no_wrap(label.text.clone(), font.clone(), LABEL);
                let size = galley.size();
                let pos = anchor + Vec2::new(-size.y * 0.5, size.x * 0.5);
                painter.add(Shape::Text(
                    TextShape::new(pos, galley, LABEL).with_angle(-FRAC_PI_2),
                ));
            }
        }
    }

    for footprint in &canvas.footprints {
        let area = transform.rect_to_screen(&footprint.rect);
        painter.rect_filled(area, 2.0, color(footprint.color, FOOTPRINT_OPACITY));
        if let Some(opacity) = footprint.shade_opacity {
            painter.rect_filled(area, 2.0, color([0.0; 3], opacity));
        }
        painter.rect_stroke(area, 2.0, Stroke::new(1.0, ROOM_OUTLINE), StrokeKind::Inside);
        painter.line_segment(
            [
                transform.to_screen(footprint.heading.from),
                transform.to_screen(footprint.heading.to),
            ],
            Stroke::new(2.0, HEADING),
        );
        if let Some(highlight) = &footprint.highlight {
            painter.rect_stroke(
                transform.rect_to_screen(highlight),
                3.0,
                Stroke::new(2.0, HIGHLIGHT),
                StrokeKind::Outside,
            );
        }
    }
    transform
}

/// Centered notice for when the plan cannot be shown.
pub fn paint_plan_unavailable(painter: &Painter, rect: Rect, message: &str) {
    painter.rect_filled(rect, 0.0, BACKGROUND);
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        message,
        FontId::proportional(14.0),
        LABEL,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_canvas_is_scaled_down_and_centered() {
        let rect = Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(200.0, 400.0));
        let transform = PlanTransform::fit([400.0, 400.0], rect);
        assert_eq!(transform.scale, 0.5);
        assert_eq!(transform.to_screen([0.0, 0.0]), Pos2::new(0.0, 100.0));
        assert_eq!(transform.to_screen([400.0, 400.0]), Pos2::new(200.0, 300.0));
    }

    #[test]
    fn small_canvas_keeps_pixel_scale() {
        let rect = Rect::from_min_size(Pos2::new(10.0, 10.0), Vec2::new(800.0, 600.0));
        let transform = PlanTransform::fit([350.0, 350.0], rect);
        assert_eq!(transform.scale, 1.0);
        let back = transform.to_plan(transform.to_screen([125.0, 60.0]));
        assert!((back[0] - 125.0).abs() < 1.0e-4);
        assert!((back[1] - 60.0).abs() < 1.0e-4);
    }
}
