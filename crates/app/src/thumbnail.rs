use furnish_scene::{PlanCanvas, PlanLine, PlanRect};
use image::{Rgba, RgbaImage};

const BACKGROUND: Rgba<u8> = Rgba([0xf5, 0xf5, 0xf5, 0xff]);
const MAJOR_GRID: Rgba<u8> = Rgba([0xbd, 0xbd, 0xbd, 0xff]);
const OUTLINE: Rgba<u8> = Rgba([0x33, 0x33, 0x33, 0xff]);
const HEADING: Rgba<u8> = Rgba([0xdc, 0x26, 0x26, 0xff]);

fn rgba(rgb: [f32; 3]) -> Rgba<u8> {
    let channel = |value: f32| (value * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba([channel(rgb[0]), channel(rgb[1]), channel(rgb[2]), 0xff])
}

fn blend(base: Rgba<u8>, over: Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let mix = |a: u8, b: u8| (a as f32 * (1.0 - alpha) + b as f32 * alpha).round() as u8;
    Rgba([
        mix(base[0], over[0]),
        mix(base[1], over[1]),
        mix(base[2], over[2]),
        0xff,
    ])
}

struct Raster {
    image: RgbaImage,
    scale: f32,
}

impl Raster {
    fn pixel_bounds(&self, rect: &PlanRect) -> Option<(u32, u32, u32, u32)> {
        let (width, height) = self.image.dimensions();
        let clamp_x = |v: f32| (v * self.scale).round().clamp(0.0, width as f32) as u32;
        let clamp_y = |v: f32| (v * self.scale).round().clamp(0.0, height as f32) as u32;
        let bounds = (
            clamp_x(rect.min[0]),
            clamp_y(rect.min[1]),
            clamp_x(rect.max[0]),
            clamp_y(rect.max[1]),
        );
        (bounds.0 < bounds.2 && bounds.1 < bounds.3).then_some(bounds)
    }

    fn fill(&mut self, rect: &PlanRect, color: Rgba<u8>, alpha: f32) {
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let base = *self.image.get_pixel(x, y);
                self.image.put_pixel(x, y, blend(base, color, alpha));
            }
        }
    }

    fn outline(&mut self, rect: &PlanRect, color: Rgba<u8>) {
        let corners = [
            [rect.min[0], rect.min[1]],
            [rect.max[0], rect.min[1]],
            [rect.max[0], rect.max[1]],
            [rect.min[0], rect.max[1]],
        ];
        for edge in 0..4 {
            self.line(
                &PlanLine {
                    from: corners[edge],
                    to: corners[(edge + 1) % 4],
                },
                color,
            );
        }
    }

    fn line(&mut self, line: &PlanLine, color: Rgba<u8>) {
        let (width, height) = self.image.dimensions();
        let from = [line.from[0] * self.scale, line.from[1] * self.scale];
        let to = [line.to[0] * self.scale, line.to[1] * self.scale];
        let steps = (to[0] - from[0]).abs().max((to[1] - from[1]).abs()).ceil().max(1.0) as u32;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = (from[0] + (to[0] - from[0]) * t).floor();
            let y = (from[1] + (to[1] - from[1]) * t).floor();
            if x >= 0.0 && y >= 0.0 && (x as u32) < width && (y as u32) < height {
                self.image.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// Rasterizes the plan at `scale` image pixels per canvas pixel.
pub(crate) fn render_plan_thumbnail(canvas: &PlanCanvas, scale: f32) -> RgbaImage {
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let width = (canvas.size[0] * scale).ceil().max(1.0) as u32;
    let height = (canvas.size[1] * scale).ceil().max(1.0) as u32;
    let mut raster = Raster {
        image: RgbaImage::from_pixel(width, height, BACKGROUND),
        scale,
    };
    raster.fill(&canvas.room, rgba(canvas.floor_color), 1.0);
    for line in &canvas.major_grid {
        raster.line(line, MAJOR_GRID);
    }
    raster.outline(&canvas.room, OUTLINE);
    for footprint in &canvas.footprints {
        raster.fill(&footprint.rect, rgba(footprint.color), 0.85);
        if let Some(opacity) = footprint.shade_opacity {
            raster.fill(&footprint.rect, Rgba([0, 0, 0, 0xff]), opacity);
        }
        raster.outline(&footprint.rect, OUTLINE);
        raster.line(&footprint.heading, HEADING);
    }
    raster.image
}
