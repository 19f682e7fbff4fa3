mod camera;
mod mesh_cache;
mod plan_painter;
mod scene_painter;

pub use camera::{
    ndc_from_screen, orbit_position, project_world_to_screen, project_world_to_screen_with_depth,
    viewport_aspect, zoom_position,
};
pub use mesh_cache::{MeshCache, MeshCacheStats, PreparedMesh, MAX_PAINTED_TRIANGLES};
pub use plan_painter::{paint_plan, paint_plan_unavailable, PlanTransform};
pub use scene_painter::{collect_scene_faces, paint_scene, SceneFaces, ScenePaintStats, ScreenFace};
