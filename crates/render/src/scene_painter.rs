use std::cmp::Ordering;

use egui::epaint::Mesh;
use egui::{Color32, Painter, Pos2, Rect, Shape, Stroke};
use furnish_scene::{SceneGrid, SceneItem, SceneItemVisual, ScenePresentation, SceneSlab};
use glam::{Mat3, Mat4, Vec3};

use crate::camera::{project_world_to_screen, project_world_to_screen_with_depth};
use crate::mesh_cache::MeshCache;

const AMBIENT: f32 = 0.45;
const DIFFUSE: f32 = 0.55;
const ITEM_SHADE_OPACITY: f32 = 0.18;
const GRID_LIFT: f32 = 0.002;

/// A projected, lit triangle ready for back-to-front painting.
#[derive(Debug, Clone, Copy)]
pub struct ScreenFace {
    pub points: [Pos2; 3],
    pub depth: f32,
    pub color: Color32,
}

#[derive(Debug, Default)]
pub struct SceneFaces {
    pub floor: Vec<ScreenFace>,
    pub opaque: Vec<ScreenFace>,
    pub translucent: Vec<ScreenFace>,
    pub culled: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScenePaintStats {
    pub faces: usize,
    pub culled: usize,
    pub items: usize,
}

struct FaceBuilder {
    view_proj: Mat4,
    rect: Rect,
    eye: Vec3,
    light: Vec3,
}

impl FaceBuilder {
    fn push(
        &self,
        out: &mut Vec<ScreenFace>,
        culled: &mut usize,
        world: [Vec3; 3],
        normal: Vec3,
        color: [f32; 3],
        opacity: f32,
        two_sided: bool,
    ) {
        let centroid = (world[0] + world[1] + world[2]) / 3.0;
        let facing = normal.dot(self.eye - centroid);
        if !two_sided && facing <= 0.0 {
            *culled += 1;
            return;
        }
        let normal = if facing < 0.0 { -normal } else { normal };
        let lambert = normal.dot(self.light).max(0.0);
        let mut points = [Pos2::ZERO; 3];
        let mut depth = 0.0;
        for (slot, vertex) in points.iter_mut().zip(world) {
            let Some((pos, z)) = project_world_to_screen_with_depth(self.view_proj, self.rect, vertex)
            else {
                *culled += 1;
                return;
            };
            *slot = pos;
            depth += z;
        }
        out.push(ScreenFace {
            points,
            depth: depth / 3.0,
            color: shade_color(color, AMBIENT + DIFFUSE * lambert, opacity),
        });
    }

    fn push_box(
        &self,
        out: &mut Vec<ScreenFace>,
        culled: &mut usize,
        transform: Mat4,
        min: Vec3,
        max: Vec3,
        color: [f32; 3],
        opacity: f32,
    ) {
        let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();
        for (corners, normal) in box_faces(min, max) {
            let world = corners.map(|corner| transform.transform_point3(corner));
            let normal = (normal_matrix * normal).normalize_or_zero();
            self.push(out, culled, [world[0], world[1], world[2]], normal, color, opacity, false);
            self.push(out, culled, [world[0], world[2], world[3]], normal, color, opacity, false);
        }
    }

    fn push_slab(&self, out: &mut Vec<ScreenFace>, culled: &mut usize, slab: &SceneSlab) {
        let center = Vec3::from(slab.center);
        let half = Vec3::from(slab.size) * 0.5;
        self.push_box(
            out,
            culled,
            Mat4::IDENTITY,
            center - half,
            center + half,
            slab.color,
            slab.opacity,
        );
    }

    fn push_item(
        &self,
        out: &mut Vec<ScreenFace>,
        culled: &mut usize,
        item: &SceneItem,
        cache: &mut MeshCache,
    ) {
        let transform = item.transform();
        let color = if item.shaded {
            item.color.map(|channel| channel * (1.0 - ITEM_SHADE_OPACITY))
        } else {
            item.color
        };
        match &item.visual {
            SceneItemVisual::Placeholder => {
                let (min, max) = item.local_bounds();
                self.push_box(out, culled, transform, min, max, color, 1.0);
            }
            SceneItemVisual::Mesh(mesh) => {
                let prepared = cache.prepare(mesh);
                let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();
                for (tri, normal) in prepared.triangles.iter().zip(&prepared.normals) {
                    let world = (*tri).map(|index| {
                        transform.transform_point3(Vec3::from(mesh.positions[index as usize]))
                    });
                    let normal = (normal_matrix * *normal).normalize_or_zero();
                    self.push(out, culled, world, normal, color, 1.0, true);
                }
            }
        }
    }
}

fn shade_color(color: [f32; 3], shade: f32, opacity: f32) -> Color32 {
    let channel = |value: f32| (value * shade * 255.0).round().clamp(0.0, 255.0) as u8;
    let alpha = (opacity * 255.0).round().clamp(0.0, 255.0) as u8;
    Color32::from_rgba_unmultiplied(channel(color[0]), channel(color[1]), channel(color[2]), alpha)
}

fn box_faces(min: Vec3, max: Vec3) -> [([Vec3; 4], Vec3); 6] {
    let corner = |x: bool, y: bool, z: bool| {
        Vec3::new(
            if x { max.x } else { min.x },
            if y { max.y } else { min.y },
            if z { max.z } else { min.z },
        )
    };
    [
        (
            [corner(true, false, false), corner(true, true, false), corner(true, true, true), corner(true, false, true)],
            Vec3::X,
        ),
        (
            [corner(false, false, false), corner(false, false, true), corner(false, true, true), corner(false, true, false)],
            Vec3::NEG_X,
        ),
        (
            [corner(false, true, false), corner(false, true, true), corner(true, true, true), corner(true, true, false)],
            Vec3::Y,
        ),
        (
            [corner(false, false, false), corner(true, false, false), corner(true, false, true), corner(false, false, true)],
            Vec3::NEG_Y,
        ),
        (
            [corner(false, false, true), corner(true, false, true), corner(true, true, true), corner(false, true, true)],
            Vec3::Z,
        ),
        (
            [corner(false, false, false), corner(false, true, false), corner(true, true, false), corner(true, false, false)],
            Vec3::NEG_Z,
        ),
    ]
}

/// Projects and lights every surface of `scene`. Faces come back in paint
/// order within each layer (far to near).
pub fn collect_scene_faces(
    scene: &ScenePresentation,
    view_proj: Mat4,
    eye: Vec3,
    rect: Rect,
    cache: &mut MeshCache,
) -> SceneFaces {
    let builder = FaceBuilder {
        view_proj,
        rect,
        eye,
        light: Vec3::new(0.35, 1.0, 0.25).normalize(),
    };
    let mut faces = SceneFaces::default();
    if let Some(floor) = &scene.floor {
        builder.push_slab(&mut faces.floor, &mut faces.culled, floor);
    }
    for wall in &scene.walls {
        builder.push_slab(&mut faces.opaque, &mut faces.culled, wall);
    }
    for item in &scene.items {
        builder.push_item(&mut faces.opaque, &mut faces.culled, item, cache);
    }
    if let Some(shade) = &scene.room_shade {
        builder.push_slab(&mut faces.translucent, &mut faces.culled, shade);
    }
    for layer in [&mut faces.floor, &mut faces.opaque, &mut faces.translucent] {
        layer.sort_by(|a, b| b.depth.partial_cmp(&a.depth).unwrap_or(Ordering::Equal));
    }
    faces
}

fn paint_faces(painter: &Painter, faces: &[ScreenFace]) {
    if faces.is_empty() {
        return;
    }
    let mut mesh = Mesh::default();
    for face in faces {
        let base = mesh.vertices.len() as u32;
        for point in face.points {
            mesh.colored_vertex(point, face.color);
        }
        mesh.add_triangle(base, base + 1, base + 2);
    }
    painter.add(Shape::mesh(mesh));
}

fn grid_color(color: [f32; 3]) -> Color32 {
    shade_color(color, 1.0, 1.0)
}

fn paint_grid(painter: &Painter, rect: Rect, view_proj: Mat4, grid: &SceneGrid) {
    if grid.cell_size <= 0.0 {
        return;
    }
    let half_w = grid.size[0] * 0.5;
    let half_l = grid.size[1] * 0.5;
    let section_every = (grid.section_size / grid.cell_size).round().max(1.0) as usize;
    let cell_stroke = Stroke::new(1.0, grid_color(grid.cell_color));
    let section_stroke = Stroke::new(1.5, grid_color(grid.section_color));
    let segment = |from: Vec3, to: Vec3, stroke: Stroke| {
        if let (Some(a), Some(b)) = (
            project_world_to_screen(view_proj, rect, from),
            project_world_to_screen(view_proj, rect, to),
        ) {
            painter.line_segment([a, b], stroke);
        }
    };
    let columns = (grid.size[0] / grid.cell_size).floor() as usize;
    for k in 0..=columns {
        let x = -half_w + k as f32 * grid.cell_size;
        let stroke = if k % section_every == 0 { section_stroke } else { cell_stroke };
        segment(Vec3::new(x, GRID_LIFT, -half_l), Vec3::new(x, GRID_LIFT, half_l), stroke);
    }
    let rows = (grid.size[1] / grid.cell_size).floor() as usize;
    for k in 0..=rows {
        let z = -half_l + k as f32 * grid.cell_size;
        let stroke = if k % section_every == 0 { section_stroke } else { cell_stroke };
        segment(Vec3::new(-half_w, GRID_LIFT, z), Vec3::new(half_w, GRID_LIFT, z), stroke);
    }
}

/// Paints the scene with the painter's algorithm: floor, grid, walls and
/// items, then translucent volumes and the selection marker.
pub fn paint_scene(
    painter: &Painter,
    rect: Rect,
    view_proj: Mat4,
    eye: Vec3,
    scene: &ScenePresentation,
    cache: &mut MeshCache,
) -> ScenePaintStats {
    let faces = collect_scene_faces(scene, view_proj, eye, rect, cache);
    paint_faces(painter, &faces.floor);
    if let Some(grid) = &scene.grid {
        paint_grid(painter, rect, view_proj, grid);
    }
    paint_faces(painter, &faces.opaque);
    paint_faces(painter, &faces.translucent);

    if let Some(marker) = &scene.selection_marker {
        let center = Vec3::from(marker.center);
        if let (Some(middle), Some(top)) = (
            project_world_to_screen(view_proj, rect, center),
            project_world_to_screen(view_proj, rect, center + Vec3::Y * marker.radius),
        ) {
            let radius = middle.distance(top).max(2.0);
            painter.circle_filled(middle, radius, shade_color(marker.color, 1.0, marker.opacity));
        }
    }

    ScenePaintStats {
        faces: faces.floor.len() + faces.opaque.len() + faces.translucent.len(),
        culled: faces.culled,
        items: scene.items.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top_down() -> (Mat4, Vec3, Rect) {
        let eye = Vec3::new(0.0, 8.0, 0.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::NEG_Z);
        let proj = Mat4::perspective_rh(50_f32.to_radians(), 1.0, 0.1, 100.0);
        let rect = Rect::from_min_size(Pos2::ZERO, egui::vec2(400.0, 400.0));
        (proj * view, eye, rect)
    }

    fn placeholder(index: usize, x: f32) -> SceneItem {
        SceneItem {
            index,
            id: format!("item-{index}"),
            translation: [x, 0.0, 0.0],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            color: [0.5, 0.25, 0.1],
            visual: SceneItemVisual::Placeholder,
            selected: false,
            shaded: false,
        }
    }

    #[test]
    fn boxes_seen_from_above_show_only_their_top() {
        let (view_proj, eye, rect) = top_down();
        let scene = ScenePresentation {
            items: vec![placeholder(0, 0.0)],
            ..ScenePresentation::default()
        };
        let mut cache = MeshCache::new();
        let faces = collect_scene_faces(&scene, view_proj, eye, rect, &mut cache);
        assert_eq!(faces.opaque.len(), 2);
        assert_eq!(faces.culled, 10);
        assert!(faces.opaque.iter().all(|face| rect.contains(face.points[0])));
    }

    #[test]
    fn faces_are_ordered_far_to_near() {
        let (view_proj, eye, rect) = top_down();
        let scene = ScenePresentation {
            floor: Some(SceneSlab {
                center: [0.0, -0.05, 0.0],
                size: [5.0, 0.1, 5.0],
                color: [0.4, 0.26, 0.13],
                opacity: 1.0,
            }),
            items: vec![placeholder(0, -1.0), placeholder(1, 1.0)],
            ..ScenePresentation::default()
        };
        let mut cache = MeshCache::new();
        let faces = collect_scene_faces(&scene, view_proj, eye, rect, &mut cache);
        assert_eq!(faces.floor.len(), 2);
        assert!(faces
            .opaque
            .windows(2)
            .all(|pair| pair[0].depth >= pair[1].depth));
    }

    #[test]
    fn shaded_items_are_darker() {
        let lit = shade_color([1.0, 1.0, 1.0], 1.0, 1.0);
        let darkened = shade_color([1.0 - ITEM_SHADE_OPACITY; 3], 1.0, 1.0);
        assert!(darkened.r() < lit.r());
        assert_eq!(shade_color([1.0; 3], 1.0, 0.5).a(), 128);
    }
}
