use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use furnish_core::{
    AssetTracker, DesignStore, DesignSummary, EditorSession, EditorSettings,
    InteractionController, ModelService, ViewportSynchronizer,
};
use render::{MeshCache, ScenePaintStats};
use tracing_subscriber::filter::LevelFilter;

mod catalog_panel;
mod io;
mod logging;
mod model_service;
mod notifications;
mod plan_view;
mod ui;
mod ui_central;
mod ui_side_panels;
mod ui_top_bar;
mod viewport;

pub(crate) use io::design_store;
pub(crate) use logging::{level_filter_from_name, ConsoleBuffer};

use logging::level_filter_to_u8;
use model_service::default_model_service;
use notifications::Notifications;

/// Longest frame step fed to the camera animation.
const MAX_TICK: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ViewLayout {
    Split,
    Scene,
    Plan,
}

impl ViewLayout {
    const ALL: [ViewLayout; 3] = [ViewLayout::Split, ViewLayout::Scene, ViewLayout::Plan];

    fn label(self) -> &'static str {
        match self {
            ViewLayout::Split => "Split",
            ViewLayout::Scene => "3D",
            ViewLayout::Plan => "2D",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum LoadState {
    Ready,
    Failed { design_id: String, message: String },
}

#[derive(Default)]
struct SaveDialog {
    open: bool,
    name: String,
}

#[derive(Default)]
struct DesignBrowser {
    open: bool,
    entries: Option<Result<Vec<DesignSummary>, String>>,
    pending_delete: Option<DesignSummary>,
}

#[derive(Default)]
struct PointerState {
    /// A press started inside the 3D viewport and has not been released.
    viewport_press: bool,
    orbiting: bool,
    last_ndc: Option<glam::Vec2>,
}

pub(crate) struct FurnishApp {
    settings: EditorSettings,
    controller: InteractionController,
    sync: ViewportSynchronizer,
    assets: AssetTracker,
    models: Box<dyn ModelService>,
    store: Box<dyn DesignStore>,
    mesh_cache: MeshCache,
    console: ConsoleBuffer,
    log_level: LevelFilter,
    log_level_state: Arc<AtomicU8>,
    notifications: Notifications,
    load_state: LoadState,
    layout: ViewLayout,
    show_console: bool,
    save_dialog: SaveDialog,
    designs: DesignBrowser,
    pointer: PointerState,
    last_tick: Option<Instant>,
    last_paint_stats: ScenePaintStats,
}

pub(crate) fn setup_tracing(level: LevelFilter) -> (ConsoleBuffer, Arc<AtomicU8>) {
    logging::setup_tracing(level)
}

impl FurnishApp {
    pub(crate) fn new(
        settings: EditorSettings,
        store: Box<dyn DesignStore>,
        console: ConsoleBuffer,
        log_level_state: Arc<AtomicU8>,
    ) -> Self {
        let session = EditorSession::new(settings.default_room.clone());
        Self {
            assets: AssetTracker::new(settings.model_root.clone()),
            log_level: level_filter_from_name(settings.log_level()),
            settings,
            controller: InteractionController::new(session),
            sync: ViewportSynchronizer::new(),
            models: default_model_service(),
            store,
            mesh_cache: MeshCache::new(),
            console,
            log_level_state,
            notifications: Notifications::default(),
            load_state: LoadState::Ready,
            layout: ViewLayout::Split,
            show_console: false,
            save_dialog: SaveDialog::default(),
            designs: DesignBrowser::default(),
            pointer: PointerState::default(),
            last_tick: None,
            last_paint_stats: ScenePaintStats::default(),
        }
    }

    fn set_log_level(&mut self, new_level: LevelFilter) {
        if new_level == self.log_level {
            return;
        }
        self.log_level_state
            .store(level_filter_to_u8(new_level), Ordering::Relaxed);
        self.log_level = new_level;
    }

    /// Seconds since the previous frame, clamped for the camera animation.
    fn frame_dt(&mut self) -> f32 {
        let now = Instant::now();
        let dt = self
            .last_tick
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_tick = Some(now);
        dt.min(MAX_TICK)
    }

    /// Brings model loading and both presentations up to date with the
    /// session. Returns true while work is still outstanding.
    fn refresh_presentations(&mut self) -> bool {
        let items = self.controller.session().items();
        let evicted = self.assets.evict_unused(items);
        if evicted > 0 {
            tracing::debug!("evicted {} unused models", evicted);
        }
        self.assets.ensure_requested(self.models.as_mut(), items);
        self.assets.pump(self.models.as_mut(), items);
        if self.sync.sync(self.controller.session(), &self.assets) {
            self.mesh_cache.evict_unused();
        }
        self.assets.pending_count() > 0
    }
}
