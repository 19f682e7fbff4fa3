use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use furnish_scene::{SceneItemVisual, SceneMesh};

use crate::catalog::catalog_entry;
use crate::furniture::FurnitureItem;
use crate::gltf_io::load_model_file;

/// Outcome of resolving a model id to renderable geometry.
#[derive(Debug, Clone)]
pub enum ModelResolution {
    Resolved(Arc<SceneMesh>),
    Unresolved(String),
}

impl ModelResolution {
    pub fn visual(&self) -> SceneItemVisual {
        match self {
            ModelResolution::Resolved(mesh) => SceneItemVisual::Mesh(Arc::clone(mesh)),
            ModelResolution::Unresolved(_) => SceneItemVisual::Placeholder,
        }
    }
}

#[derive(Debug)]
pub struct ModelResponse {
    pub ticket: u64,
    pub model_id: String,
    pub result: Result<SceneMesh, String>,
}

/// Asynchronous model loader. Requests return immediately; finished loads are
/// collected with `poll`.
pub trait ModelService {
    fn request(&mut self, ticket: u64, model_id: &str, path: &Path);
    fn poll(&mut self) -> Vec<ModelResponse>;
}

/// Loads on request and hands the result out on the next poll.
#[derive(Debug, Default)]
pub struct InlineModelService {
    finished: VecDeque<ModelResponse>,
}

impl ModelService for InlineModelService {
    fn request(&mut self, ticket: u64, model_id: &str, path: &Path) {
        self.finished.push_back(ModelResponse {
            ticket,
            model_id: model_id.to_string(),
            result: load_model_file(path),
        });
    }

    fn poll(&mut self) -> Vec<ModelResponse> {
        self.finished.drain(..).collect()
    }
}

#[derive(Debug, Clone)]
enum ModelState {
    Pending { ticket: u64 },
    Ready(ModelResolution),
}

/// Per-model resolution cache shared by every item that uses the same model.
#[derive(Debug, Default)]
pub struct AssetTracker {
    model_root: PathBuf,
    models: HashMap<String, ModelState>,
    next_ticket: u64,
    generation: u64,
}

fn live_models(items: &[FurnitureItem]) -> HashSet<&str> {
    items.iter().map(|item| item.model_id.as_str()).collect()
}

impl AssetTracker {
    pub fn new(model_root: impl Into<PathBuf>) -> Self {
        Self {
            model_root: model_root.into(),
            ..Self::default()
        }
    }

    pub fn model_root(&self) -> &Path {
        &self.model_root
    }

    /// Changes whenever a resolution lands, so presentations know to rebuild.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn resolution(&self, model_id: &str) -> Option<&ModelResolution> {
        match self.models.get(model_id)? {
            ModelState::Ready(resolution) => Some(resolution),
            ModelState::Pending { .. } => None,
        }
    }

    pub fn is_pending(&self, model_id: &str) -> bool {
        matches!(self.models.get(model_id), Some(ModelState::Pending { .. }))
    }

    pub fn pending_count(&self) -> usize {
        self.models
            .values()
            .filter(|state| matches!(state, ModelState::Pending { .. }))
            .count()
    }

    /// Mesh when resolved, otherwise the placeholder used while pending or failed.
    pub fn visual_for(&self, model_id: &str) -> SceneItemVisual {
        self.resolution(model_id)
            .map(ModelResolution::visual)
            .unwrap_or(SceneItemVisual::Placeholder)
    }

    pub fn ensure_requested(&mut self, service: &mut dyn ModelService, items: &[FurnitureItem]) {
        for model_id in live_models(items) {
            if self.models.contains_key(model_id) {
                continue;
            }
            let Some(entry) = catalog_entry(model_id) else {
                tracing::warn!("no catalog model for '{}', using placeholder", model_id);
                self.models.insert(
                    model_id.to_string(),
                    ModelState::Ready(ModelResolution::Unresolved(format!(
                        "unknown model '{model_id}'"
                    ))),
                );
                continue;
            };
            self.next_ticket += 1;
            let ticket = self.next_ticket;
            let path = self.model_root.join(entry.model_path);
            tracing::debug!("requesting model {} from {}", model_id, path.display());
            service.request(ticket, model_id, &path);
            self.models
                .insert(model_id.to_string(), ModelState::Pending { ticket });
        }
    }

    /// Applies finished loads. A response is used at most once, and only while
    /// its request is still the live one for a model some item uses. Returns the
    /// number of resolutions applied.
    pub fn pump(&mut self, service: &mut dyn ModelService, items: &[FurnitureItem]) -> usize {
        let live = live_models(items);
        let mut applied = 0;
        for response in service.poll() {
            let current = match self.models.get(&response.model_id) {
                Some(ModelState::Pending { ticket }) => *ticket == response.ticket,
                _ => false,
            };
            if !current {
                tracing::debug!("discarding stale model response for {}", response.model_id);
                continue;
            }
            if !live.contains(response.model_id.as_str()) {
                tracing::debug!("model {} is no longer used", response.model_id);
                self.models.remove(&response.model_id);
                continue;
            }
            let resolution = match response.result {
                Ok(mesh) => {
                    tracing::info!(
                        "model {} loaded ({} triangles)",
                        response.model_id,
                        mesh.triangle_count()
                    );
                    ModelResolution::Resolved(Arc::new(mesh))
                }
                Err(err) => {
                    tracing::warn!("model {} unavailable: {}", response.model_id, err);
                    ModelResolution::Unresolved(err)
                }
            };
            self.models
                .insert(response.model_id, ModelState::Ready(resolution));
            self.generation += 1;
            applied += 1;
        }
        applied
    }

    /// Forgets models no live item references, including requests still in flight.
    pub fn evict_unused(&mut self, items: &[FurnitureItem]) -> usize {
        let live = live_models(items);
        let before = self.models.len();
        self.models.retain(|model_id, _| live.contains(model_id.as_str()));
        before - self.models.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct ScriptedService {
        requests: Vec<(u64, String, PathBuf)>,
        replies: Vec<ModelResponse>,
    }

    impl ModelService for ScriptedService {
        fn request(&mut self, ticket: u64, model_id: &str, path: &Path) {
            self.requests.push((ticket, model_id.to_string(), path.to_path_buf()));
        }

        fn poll(&mut self) -> Vec<ModelResponse> {
            std::mem::take(&mut self.replies)
        }
    }

    fn item(model_id: &str) -> FurnitureItem {
        FurnitureItem::new(format!("{model_id}-1"), model_id)
    }

    fn triangle() -> SceneMesh {
        SceneMesh::new(vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], vec![0, 1, 2])
    }

    #[test]
    fn requests_once_per_model_with_catalog_path() {
        let mut tracker = AssetTracker::new("assets");
        let mut service = ScriptedService::default();
        let items = vec![item("sofa1"), item("sofa1")];
        tracker.ensure_requested(&mut service, &items);
        tracker.ensure_requested(&mut service, &items);
        assert_eq!(service.requests.len(), 1);
        assert_eq!(service.requests[0].2, PathBuf::from("assets/models/sofa/sofa1.glb"));
        assert!(tracker.is_pending("sofa1"));
        assert!(matches!(tracker.visual_for("sofa1"), SceneItemVisual::Placeholder));
    }

    #[test]
    fn unknown_models_resolve_to_placeholder_without_request() {
        let mut tracker = AssetTracker::default();
        let mut service = ScriptedService::default();
        tracker.ensure_requested(&mut service, &[item("sofa")]);
        assert!(service.requests.is_empty());
        assert!(matches!(
            tracker.resolution("sofa"),
            Some(ModelResolution::Unresolved(_))
        ));
    }

    #[test]
    fn responses_apply_once_and_bump_generation() {
        let mut tracker = AssetTracker::default();
        let mut service = ScriptedService::default();
        let items = vec![item("lamp1")];
        tracker.ensure_requested(&mut service, &items);
        let ticket = service.requests[0].0;
        service.replies.push(ModelResponse {
            ticket,
            model_id: "lamp1".to_string(),
            result: Ok(triangle()),
        });
        service.replies.push(ModelResponse {
            ticket,
            model_id: "lamp1".to_string(),
            result: Err("late duplicate".to_string()),
        });
        assert_eq!(tracker.pump(&mut service, &items), 1);
        assert_eq!(tracker.generation(), 1);
        assert!(matches!(tracker.visual_for("lamp1"), SceneItemVisual::Mesh(_)));
    }

    #[test]
    fn response_after_removal_is_ignored() {
        let mut tracker = AssetTracker::default();
        let mut service = ScriptedService::default();
        tracker.ensure_requested(&mut service, &[item("bed1")]);
        let ticket = service.requests[0].0;
        tracker.evict_unused(&[]);
        service.replies.push(ModelResponse {
            ticket,
            model_id: "bed1".to_string(),
            result: Ok(triangle()),
        });
        assert_eq!(tracker.pump(&mut service, &[]), 0);
        assert!(tracker.resolution("bed1").is_none());
        assert_eq!(tracker.generation(), 0);
    }

    #[test]
    fn failures_degrade_to_placeholder() {
        let mut tracker = AssetTracker::new("missing-root");
        let mut service = InlineModelService::default();
        let items = vec![item("coffee1")];
        tracker.ensure_requested(&mut service, &items);
        assert_eq!(tracker.pump(&mut service, &items), 1);
        assert!(matches!(
            tracker.resolution("coffee1"),
            Some(ModelResolution::Unresolved(_))
        ));
        assert!(matches!(tracker.visual_for("coffee1"), SceneItemVisual::Placeholder));
    }
}
