use furnish_scene::{
    PlanCanvas, PlanFootprint, PlanLabel, PlanLabelOrientation, PlanLine, PlanRect, PlanView,
    SceneGrid, SceneItem, SceneMarker, ScenePresentation, SceneSlab,
};

use crate::assets::AssetTracker;
use crate::camera::CameraAngle;
use crate::catalog::footprint_for;
use crate::color::{color_or_placeholder, parse_hex_color};
use crate::room::{room_floor, room_shade_volume, visible_walls, RoomSpecs, Slab};
use crate::session::EditorSession;

pub const PLAN_PIXELS_PER_METER: f32 = 50.0;
pub const PLAN_PADDING: f32 = 100.0;
pub const PLAN_UNAVAILABLE_MESSAGE: &str = "2D view is only available in Top angle.";
const PLAN_HIGHLIGHT_INSET: f32 = 4.0;
const PLAN_LABEL_MARGIN: f32 = 6.0;
const SHADE_OPACITY: f32 = 0.18;

const GRID_CELL: f32 = 0.5;
const GRID_SECTION: f32 = 1.0;
const GRID_CELL_COLOR: [f32; 3] = [0.435, 0.435, 0.435];
const GRID_SECTION_COLOR: [f32; 3] = [0.616, 0.294, 0.294];
const SHADE_COLOR: [f32; 3] = [0.0, 0.0, 0.0];
const MARKER_COLOR: [f32; 3] = [0.545, 0.361, 0.965];
const MARKER_HEIGHT: f32 = 1.2;
const MARKER_RADIUS: f32 = 0.15;
const MARKER_OPACITY: f32 = 0.5;
const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

fn slab(slab: Slab, color: [f32; 3], opacity: f32) -> SceneSlab {
    SceneSlab {
        center: slab.center.to_array(),
        size: slab.size.to_array(),
        color,
        opacity,
    }
}

/// 3D presentation of the session, resolving item visuals through `assets`.
pub fn build_scene(session: &EditorSession, assets: &AssetTracker) -> ScenePresentation {
    let room = session.room();
    let preset = session.camera().preset(room);
    let wall_color = parse_hex_color(&room.wall_color).unwrap_or(WHITE);
    let floor_color = color_or_placeholder(&room.floor_color);

    let walls = visible_walls(room, &preset.hidden_walls)
        .into_iter()
        .map(|wall| SceneSlab {
            center: wall.center.to_array(),
            size: wall.size.to_array(),
            color: wall_color,
            opacity: 1.0,
        })
        .collect();

    let grid = session.grid_visible().then(|| SceneGrid {
        size: [room.width, room.length],
        cell_size: GRID_CELL,
        section_size: GRID_SECTION,
        cell_color: GRID_CELL_COLOR,
        section_color: GRID_SECTION_COLOR,
    });

    let room_shade = session
        .room_shaded()
        .then(|| slab(room_shade_volume(room), SHADE_COLOR, SHADE_OPACITY));

    let selected = session.selected_index();
    let items: Vec<SceneItem> = session
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| SceneItem {
            index,
            id: item.id.clone(),
            translation: item.position.to_array(),
            rotation: item.rotation.to_array(),
            scale: item.scale.to_array(),
            color: color_or_placeholder(&item.color),
            visual: assets.visual_for(&item.model_id),
            selected: selected == Some(index),
            shaded: item.shaded,
        })
        .collect();

    let selection_marker = session.selected_item().map(|item| SceneMarker {
        center: [
            item.position.x,
            item.position.y + MARKER_HEIGHT,
            item.position.z,
        ],
        radius: MARKER_RADIUS,
        color: MARKER_COLOR,
        opacity: MARKER_OPACITY,
    });

    ScenePresentation {
        walls,
        floor: Some(slab(room_floor(room), floor_color, 1.0)),
        grid,
        room_shade,
        items,
        selection_marker,
    }
}

/// Maps a room-space `(x, z)` to plan pixels.
pub fn plan_point(room: &RoomSpecs, x: f32, z: f32) -> [f32; 2] {
    [
        (x + room.width * 0.5) * PLAN_PIXELS_PER_METER,
        (z + room.length * 0.5) * PLAN_PIXELS_PER_METER,
    ]
}

/// Per-axis cap; denser grids are unreadable and are left out.
const MAX_GRID_LINES: f32 = 4096.0;

fn grid_lines(size: [f32; 2], step: f32) -> Vec<PlanLine> {
    let mut lines = Vec::new();
    if !step.is_finite() || step <= 0.0 || !size.iter().all(|v| v.is_finite() && *v >= 0.0) {
        return lines;
    }
    let columns = (size[0] / step).floor();
    let rows = (size[1] / step).floor();
    if columns > MAX_GRID_LINES || rows > MAX_GRID_LINES {
        tracing::debug!("plan grid skipped: {} x {} lines", columns, rows);
        return lines;
    }
    let (columns, rows) = (columns as usize, rows as usize);
    lines.reserve(columns + rows + 2);
    for i in 0..=columns {
        let x = i as f32 * step;
        lines.push(PlanLine {
            from: [x, 0.0],
            to: [x, size[1]],
        });
    }
    for i in 0..=rows {
        let y = i as f32 * step;
        lines.push(PlanLine {
            from: [0.0, y],
            to: [size[0], y],
        });
    }
    lines
}

fn format_meters(value: f32) -> String {
    format!("{value} m")
}

fn room_labels(room: &RoomSpecs, size: [f32; 2]) -> Vec<PlanLabel> {
    let width = format_meters(room.width);
    let length = format_meters(room.length);
    vec![
        PlanLabel {
            text: width.clone(),
            anchor: [size[0] * 0.5, PLAN_LABEL_MARGIN],
            orientation: PlanLabelOrientation::Horizontal,
        },
        PlanLabel {
            text: width,
            anchor: [size[0] * 0.5, size[1] - PLAN_LABEL_MARGIN],
            orientation: PlanLabelOrientation::Horizontal,
        },
        PlanLabel {
            text: length.clone(),
            anchor: [PLAN_LABEL_MARGIN, size[1] * 0.5],
            orientation: PlanLabelOrientation::Vertical,
        },
        PlanLabel {
            text: length,
            anchor: [size[0] - PLAN_LABEL_MARGIN, size[1] * 0.5],
            orientation: PlanLabelOrientation::Vertical,
        },
    ]
}

/// Top-down presentation; only meaningful for the top camera angle.
pub fn build_plan(session: &EditorSession) -> PlanView {
    if session.camera_angle() != CameraAngle::Top {
        return PlanView::Unavailable {
            message: PLAN_UNAVAILABLE_MESSAGE.to_string(),
        };
    }
    let room = session.room();
    let room_px = [
        room.width * PLAN_PIXELS_PER_METER,
        room.length * PLAN_PIXELS_PER_METER,
    ];
    let size = [
        (room_px[0] + PLAN_PADDING).max(0.0),
        (room_px[1] + PLAN_PADDING).max(0.0),
    ];
    let selected = session.selected_index();
    let footprints = session
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let footprint = footprint_for(&item.kind);
            let extent = [
                footprint.width * PLAN_PIXELS_PER_METER,
                footprint.depth * PLAN_PIXELS_PER_METER,
            ];
            let center = plan_point(room, item.position.x, item.position.z);
            let rect = PlanRect::from_center_size(center, extent);
            let heading = PlanLine {
                from: center,
                to: [
                    center[0] + item.rotation.y.sin() * extent[0] * 0.5,
                    center[1] + item.rotation.y.cos() * extent[1] * 0.5,
                ],
            };
            PlanFootprint {
                index,
                id: item.id.clone(),
                center,
                rect,
                color: color_or_placeholder(&item.color),
                heading,
                highlight: (selected == Some(index)).then(|| rect.expand(PLAN_HIGHLIGHT_INSET)),
                shade_opacity: item.shaded.then_some(SHADE_OPACITY),
            }
        })
        .collect();

    PlanView::Ready(PlanCanvas {
        size,
        room: PlanRect {
            min: [0.0, 0.0],
            max: room_px,
        },
        floor_color: color_or_placeholder(&room.floor_color),
        minor_grid: grid_lines(size, PLAN_PIXELS_PER_METER / 4.0),
        major_grid: grid_lines(size, PLAN_PIXELS_PER_METER),
        labels: room_labels(room, size),
        footprints,
    })
}

/// Index of the top-most footprint under a canvas-space point.
pub fn plan_pick(canvas: &PlanCanvas, point: [f32; 2]) -> Option<usize> {
    canvas
        .footprints
        .iter()
        .rev()
        .find(|footprint| footprint.rect.contains(point))
        .map(|footprint| footprint.index)
}

/// Holds both presentations and rebuilds them together whenever the session
/// or the resolved assets change, so they can never disagree.
#[derive(Debug, Default)]
pub struct ViewportSynchronizer {
    scene: ScenePresentation,
    plan: Option<PlanView>,
    synced: Option<(u64, u64)>,
    rebuilds: u64,
}

impl ViewportSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes when stale. Returns true when the presentations changed.
    pub fn sync(&mut self, session: &EditorSession, assets: &AssetTracker) -> bool {
        let stamp = (session.revision(), assets.generation());
        if self.synced == Some(stamp) {
            return false;
        }
        self.scene = build_scene(session, assets);
        self.plan = Some(build_plan(session));
        self.synced = Some(stamp);
        self.rebuilds += 1;
        true
    }

    pub fn scene(&self) -> &ScenePresentation {
        &self.scene
    }

    pub fn plan(&self) -> Option<&PlanView> {
        self.plan.as_ref()
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::furniture::{TransformPatch, Xyz};
    use crate::interaction::InteractionController;
    use furnish_scene::SceneItemVisual;

    fn top_controller() -> InteractionController {
        let mut controller = InteractionController::new(EditorSession::new(RoomSpecs::default()));
        controller.set_camera_angle(CameraAngle::Top);
        controller
    }

    #[test]
    fn grid_lines_land_on_exact_steps() {
        let lines = grid_lines([100.0, 50.0], 12.5);
        assert_eq!(lines.len(), 9 + 5);
        assert_eq!(lines[8].from, [100.0, 0.0]);
        assert_eq!(lines[13].to, [100.0, 50.0]);
    }

    #[test]
    fn oversized_grid_is_left_out() {
        assert!(grid_lines([1.0e9, 50.0], 12.5).is_empty());
        assert!(grid_lines([f32::MAX, f32::MAX], 0.5).is_empty());
        assert!(grid_lines([10.0, 10.0], 0.0).is_empty());
    }

    #[test]
    fn sofa_footprint_maps_to_plan_pixels() {
        let mut controller = top_controller();
        controller.add_furniture("sofa");
        let plan = build_plan(controller.session());
        let canvas = plan.canvas().expect("top view");
        assert_eq!(canvas.size, [350.0, 350.0]);
        let footprint = &canvas.footprints[0];
        assert_eq!(footprint.center, [125.0, 125.0]);
        assert_eq!(footprint.rect.width(), 100.0);
        assert_eq!(footprint.rect.height(), 40.0);
        let highlight = footprint.highlight.expect("selected");
        assert_eq!(highlight.width(), 108.0);
        // heading tick points towards +z at zero rotation
        assert_eq!(footprint.heading.to, [125.0, 145.0]);
    }

    #[test]
    fn plan_is_unavailable_off_top() {
        let mut controller = top_controller();
        for angle in CameraAngle::ALL {
            controller.set_camera_angle(angle);
            let plan = build_plan(controller.session());
            assert_eq!(plan.is_available(), angle == CameraAngle::Top);
            if let PlanView::Unavailable { message } = plan {
                assert_eq!(message, PLAN_UNAVAILABLE_MESSAGE);
            }
        }
    }

    #[test]
    fn grid_line_spacing_matches_scale() {
        let controller = top_controller();
        let plan = build_plan(controller.session());
        let canvas = plan.canvas().expect("top view");
        // 350 px canvas: 8 major lines per axis, 29 minor lines per axis
        assert_eq!(canvas.major_grid.len(), 16);
        assert_eq!(canvas.minor_grid.len(), 58);
        assert_eq!(canvas.labels[0].text, "5 m");
    }

    #[test]
    fn both_presentations_share_order_and_selection() {
        let mut controller = top_controller();
        controller.add_furniture("chair");
        let b = controller.add_furniture("lamp");
        controller.update_furniture(&b, &TransformPatch::position(Xyz::new(1.0, 0.0, 1.0)));
        controller.set_shaded(&b, true);
        let assets = AssetTracker::default();
        let mut sync = ViewportSynchronizer::new();
        assert!(sync.sync(controller.session(), &assets));
        assert!(!sync.sync(controller.session(), &assets));
        let scene_ids: Vec<&str> = sync.scene().items.iter().map(|i| i.id.as_str()).collect();
        let canvas = sync.plan().and_then(PlanView::canvas).expect("plan");
        let plan_ids: Vec<&str> = canvas.footprints.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(scene_ids, plan_ids);
        assert_eq!(sync.scene().selected_item().map(|i| i.index), Some(1));
        assert!(canvas.footprints[1].highlight.is_some());
        assert_eq!(canvas.footprints[1].shade_opacity, Some(0.18));
        assert_eq!(sync.scene().placeholder_count(), 2);
        assert!(matches!(sync.scene().items[0].visual, SceneItemVisual::Placeholder));
        let marker = sync.scene().selection_marker.expect("marker");
        assert_eq!(marker.center, [1.0, 1.2, 1.0]);
    }

    #[test]
    fn plan_pick_prefers_last_drawn() {
        let mut controller = top_controller();
        controller.add_furniture("rug");
        controller.add_furniture("chair");
        let plan = build_plan(controller.session());
        let canvas = plan.canvas().expect("plan");
        assert_eq!(plan_pick(canvas, [125.0, 125.0]), Some(1));
        assert_eq!(plan_pick(canvas, [80.0, 125.0]), Some(0));
        assert_eq!(plan_pick(canvas, [5.0, 5.0]), None);
    }

    #[test]
    fn hidden_walls_follow_the_camera() {
        let mut controller = top_controller();
        controller.set_camera_angle(CameraAngle::Corner);
        let scene = build_scene(controller.session(), &AssetTracker::default());
        assert_eq!(scene.walls.len(), 2);
        assert!(scene.grid.is_some());
        controller.toggle_grid();
        controller.toggle_room_shade();
        let scene = build_scene(controller.session(), &AssetTracker::default());
        assert!(scene.grid.is_none());
        let shade = scene.room_shade.expect("shade");
        assert!((shade.size[0] - 5.05).abs() < 1.0e-5);
    }
}
