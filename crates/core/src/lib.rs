mod assets;
mod camera;
mod catalog;
mod color;
mod design;
mod furniture;
mod gltf_io;
mod inspector;
mod interaction;
mod ray;
mod room;
mod session;
mod settings;
mod sync;

pub use assets::{AssetTracker, InlineModelService, ModelResolution, ModelResponse, ModelService};
pub use camera::{
    preset, presets_for, CameraAngle, CameraAnimator, CameraPose, CameraPreset, CameraRig,
    CAMERA_FOV_DEGREES,
};
pub use catalog::{
    catalog_categories, catalog_entries, catalog_entry, display_name, footprint_for, CatalogEntry,
    Footprint, FurnitureCategory, DEFAULT_FOOTPRINT,
};
pub use color::{
    color_or_placeholder, parse_hex_color, to_hex_color, DEFAULT_ITEM_COLOR, DEFAULT_ITEM_MATERIAL,
    PLACEHOLDER_COLOR,
};
#[cfg(not(target_arch = "wasm32"))]
pub use design::HttpDesignStore;
pub use design::{
    document_from_session, iso_timestamp, normalize_document, normalize_record, read_design_file,
    save_request, DesignDocument, DesignError, DesignRecord, DesignStore, DesignSummary,
    DirectoryDesignStore, FurnitureRecord, MemoryDesignStore, PartialXyz, SaveRequest,
    DEFAULT_DESIGN_NAME,
};
pub use furniture::{generate_item_id, FurnitureItem, FurnitureStore, RemovedItem, TransformPatch, Xyz};
pub use gltf_io::load_model_file;
pub use inspector::{
    apply as apply_inspector_edit, inspect, InspectorEdit, InspectorFields, RotateDirection,
    HEIGHT_RANGE, SCALE_RANGE,
};
pub use interaction::{
    pick_scene_item, shortcut_for, GlobalPointerListeners, InteractionController, KeyCommand,
    KeyFocus, KeyOutcome, PointerCapture, PointerInput, ROTATION_STEP,
};
pub use ray::{intersect_horizontal_plane, ray_hits_obb, Ray};
pub use room::{
    room_floor, room_shade_volume, room_walls, visible_walls, RoomShape, RoomSpecs, Slab, WallId,
    WallSlab, FLOOR_THICKNESS, WALL_THICKNESS,
};
pub use session::{DesignMeta, EditorSession, SelectionState};
pub use settings::{
    EditorSettings, DEFAULT_CONFIG_FILE, ENV_API_URL, ENV_DESIGNS_DIR, ENV_MODEL_ROOT,
};
pub use sync::{
    build_plan, build_scene, plan_pick, plan_point, ViewportSynchronizer, PLAN_PADDING,
    PLAN_PIXELS_PER_METER, PLAN_UNAVAILABLE_MESSAGE,
};
