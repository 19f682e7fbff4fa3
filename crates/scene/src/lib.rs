use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

#[derive(Debug, Clone)]
pub struct SceneMesh {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
}

impl SceneMesh {
    pub fn new(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        let (bounds_min, bounds_max) = bounds_of(&positions);
        Self {
            positions,
            indices,
            bounds_min,
            bounds_max,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn size(&self) -> [f32; 3] {
        [
            self.bounds_max[0] - self.bounds_min[0],
            self.bounds_max[1] - self.bounds_min[1],
            self.bounds_max[2] - self.bounds_min[2],
        ]
    }
}

fn bounds_of(positions: &[[f32; 3]]) -> ([f32; 3], [f32; 3]) {
    if positions.is_empty() {
        return ([0.0; 3], [0.0; 3]);
    }
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for p in positions {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    (min, max)
}

/// Axis-aligned box used for walls, the floor and the room shade volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSlab {
    pub center: [f32; 3],
    pub size: [f32; 3],
    pub color: [f32; 3],
    pub opacity: f32,
}

#[derive(Debug, Clone)]
pub enum SceneItemVisual {
    Mesh(Arc<SceneMesh>),
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct SceneItem {
    pub index: usize,
    pub id: String,
    pub translation: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub color: [f32; 3],
    pub visual: SceneItemVisual,
    pub selected: bool,
    pub shaded: bool,
}

impl SceneItem {
    pub fn transform(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            glam::EulerRot::XYZ,
            self.rotation[0],
            self.rotation[1],
            self.rotation[2],
        );
        Mat4::from_scale_rotation_translation(
            Vec3::from(self.scale),
            rotation,
            Vec3::from(self.translation),
        )
    }

    /// Local-space bounds; placeholders are unit cubes resting on the item origin.
    pub fn local_bounds(&self) -> (Vec3, Vec3) {
        match &self.visual {
            SceneItemVisual::Mesh(mesh) => (Vec3::from(mesh.bounds_min), Vec3::from(mesh.bounds_max)),
            SceneItemVisual::Placeholder => (Vec3::new(-0.5, 0.0, -0.5), Vec3::new(0.5, 1.0, 0.5)),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.visual, SceneItemVisual::Placeholder)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneGrid {
    pub size: [f32; 2],
    pub cell_size: f32,
    pub section_size: f32,
    pub cell_color: [f32; 3],
    pub section_color: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneMarker {
    pub center: [f32; 3],
    pub radius: f32,
    pub color: [f32; 3],
    pub opacity: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ScenePresentation {
    pub walls: Vec<SceneSlab>,
    pub floor: Option<SceneSlab>,
    pub grid: Option<SceneGrid>,
    pub room_shade: Option<SceneSlab>,
    pub items: Vec<SceneItem>,
    pub selection_marker: Option<SceneMarker>,
}

impl ScenePresentation {
    pub fn selected_item(&self) -> Option<&SceneItem> {
        self.items.iter().find(|item| item.selected)
    }

    pub fn placeholder_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_placeholder()).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanRect {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl PlanRect {
    pub fn from_center_size(center: [f32; 2], size: [f32; 2]) -> Self {
        Self {
            min: [center[0] - size[0] * 0.5, center[1] - size[1] * 0.5],
            max: [center[0] + size[0] * 0.5, center[1] + size[1] * 0.5],
        }
    }

    pub fn expand(&self, amount: f32) -> Self {
        Self {
            min: [self.min[0] - amount, self.min[1] - amount],
            max: [self.max[0] + amount, self.max[1] + amount],
        }
    }

    pub fn contains(&self, point: [f32; 2]) -> bool {
        point[0] >= self.min[0]
            && point[0] <= self.max[0]
            && point[1] >= self.min[1]
            && point[1] <= self.max[1]
    }

    pub fn width(&self) -> f32 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f32 {
        self.max[1] - self.min[1]
    }

    pub fn center(&self) -> [f32; 2] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanLine {
    pub from: [f32; 2],
    pub to: [f32; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanLabelOrientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanLabel {
    pub text: String,
    pub anchor: [f32; 2],
    pub orientation: PlanLabelOrientation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanFootprint {
    pub index: usize,
    pub id: String,
    pub center: [f32; 2],
    pub rect: PlanRect,
    pub color: [f32; 3],
    pub heading: PlanLine,
    pub highlight: Option<PlanRect>,
    pub shade_opacity: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanCanvas {
    pub size: [f32; 2],
    pub room: PlanRect,
    pub floor_color: [f32; 3],
    pub minor_grid: Vec<PlanLine>,
    pub major_grid: Vec<PlanLine>,
    pub labels: Vec<PlanLabel>,
    pub footprints: Vec<PlanFootprint>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanView {
    Unavailable { message: String },
    Ready(PlanCanvas),
}

impl PlanView {
    pub fn canvas(&self) -> Option<&PlanCanvas> {
        match self {
            PlanView::Ready(canvas) => Some(canvas),
            PlanView::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, PlanView::Ready(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_bounds_cover_positions() {
        let mesh = SceneMesh::new(vec![[1.0, 0.0, -2.0], [-1.0, 2.0, 3.0]], vec![0, 1, 0]);
        assert_eq!(mesh.bounds_min, [-1.0, 0.0, -2.0]);
        assert_eq!(mesh.bounds_max, [1.0, 2.0, 3.0]);
        assert_eq!(mesh.size(), [2.0, 2.0, 5.0]);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn plan_rect_contains_and_expands() {
        let rect = PlanRect::from_center_size([125.0, 125.0], [100.0, 40.0]);
        assert_eq!(rect.min, [75.0, 105.0]);
        assert!(rect.contains([125.0, 125.0]));
        assert!(!rect.contains([74.0, 125.0]));
        let grown = rect.expand(4.0);
        assert_eq!(grown.width(), 108.0);
        assert_eq!(grown.center(), [125.0, 125.0]);
    }

    #[test]
    fn placeholder_bounds_rest_on_origin() {
        let item = SceneItem {
            index: 0,
            id: "a".to_string(),
            translation: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            color: [1.0; 3],
            visual: SceneItemVisual::Placeholder,
            selected: false,
            shaded: false,
        };
        let (min, max) = item.local_bounds();
        assert_eq!(min.y, 0.0);
        assert_eq!(max.y, 1.0);
    }
}
