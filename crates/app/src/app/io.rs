#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

#[cfg(not(target_arch = "wasm32"))]
use rfd::FileDialog;

#[cfg(not(target_arch = "wasm32"))]
use furnish_core::{document_from_session, read_design_file, DirectoryDesignStore, HttpDesignStore};
use furnish_core::{save_request, DesignDocument, DesignError, DesignStore, EditorSettings, SaveRequest};

use super::{FurnishApp, LoadState};

/// Picks the design store for these settings: the HTTP API when configured,
/// otherwise the designs directory. Web builds keep designs in memory.
pub(crate) fn design_store(settings: &EditorSettings) -> Box<dyn DesignStore> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Some(url) = settings.api_base_url() {
            tracing::info!("using design API at {}", url);
            return Box::new(HttpDesignStore::new(url, settings.api_token.clone()));
        }
        tracing::info!("using design directory {}", settings.designs_dir.display());
        Box::new(DirectoryDesignStore::new(settings.designs_dir.clone()))
    }
    #[cfg(target_arch = "wasm32")]
    {
        let _ = settings;
        Box::new(furnish_core::MemoryDesignStore::new())
    }
}

impl FurnishApp {
    pub(crate) fn open_design(&mut self, id: &str) {
        match self.store.fetch(id) {
            Ok(document) => {
                let name = document.name.clone();
                self.adopt_document(document);
                self.notifications.success(format!("Loaded \"{name}\""));
            }
            Err(err) => {
                tracing::error!("failed to load design {}: {}", id, err);
                self.load_state = LoadState::Failed {
                    design_id: id.to_string(),
                    message: err.to_string(),
                };
            }
        }
    }

    fn adopt_document(&mut self, document: DesignDocument) {
        self.controller.load_document(document);
        self.load_state = LoadState::Ready;
        self.pointer = Default::default();
        self.designs.pending_delete = None;
    }

    pub(super) fn start_new_design(&mut self) {
        self.controller.new_design(self.settings.default_room.clone());
        self.load_state = LoadState::Ready;
        self.pointer = Default::default();
        self.save_dialog.open = false;
        tracing::info!("new design started");
    }

    /// Save entry point for the button and the keyboard shortcut.
    pub(super) fn request_save(&mut self) {
        match save_request(self.controller.session(), None) {
            SaveRequest::NeedsName => {
                self.save_dialog.name = self.controller.session().design_name().to_string();
                self.save_dialog.open = true;
            }
            request => self.perform_save(request),
        }
    }

    pub(super) fn save_with_name(&mut self, name: &str) {
        self.save_dialog.open = false;
        let request = save_request(self.controller.session(), Some(name));
        self.perform_save(request);
    }

    fn perform_save(&mut self, request: SaveRequest) {
        let result = match request {
            SaveRequest::NeedsName => return,
            SaveRequest::Create(document) => self.store.create(&document).and_then(|created| {
                created
                    .id
                    .clone()
                    .map(|id| (id, created.name.clone()))
                    .ok_or_else(|| {
                        DesignError::Parse("store returned no design id".to_string())
                    })
            }),
            SaveRequest::Update(id, document) => self
                .store
                .update(&id, &document)
                .map(|()| (id, document.name)),
        };
        match result {
            Ok((id, name)) => {
                tracing::info!("design {} saved as {:?}", id, name);
                self.controller.adopt_saved(id, name);
                self.notifications.success("Design saved");
                self.designs.entries = None;
            }
            Err(err) => {
                tracing::error!("failed to save design: {}", err);
                self.notifications.error(format!("Failed to save design: {err}"));
            }
        }
    }

    pub(super) fn refresh_design_list(&mut self) {
        self.designs.entries = Some(self.store.list().map_err(|err| {
            tracing::error!("failed to list designs: {}", err);
            err.to_string()
        }));
    }

    pub(super) fn delete_design(&mut self, id: &str) {
        match self.store.delete(id) {
            Ok(()) => {
                tracing::info!("design {} deleted", id);
                self.notifications.success("Design deleted");
                if self.controller.session().design_id() == Some(id) {
                    self.start_new_design();
                }
            }
            Err(err) => {
                tracing::error!("failed to delete design {}: {}", id, err);
                self.notifications.error(format!("Failed to delete design: {err}"));
            }
        }
        self.refresh_design_list();
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub(super) fn import_design_dialog(&mut self) {
        let Some(path) = FileDialog::new()
            .add_filter("Furnish design", &["json"])
            .pick_file()
        else {
            return;
        };
        self.import_design_file(&path);
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn import_design_file(&mut self, path: &Path) {
        match read_design_file(path) {
            Ok(mut document) => {
                // Imported files are unsaved copies until named and stored.
                document.id = None;
                let name = document.name.clone();
                self.adopt_document(document);
                self.notifications.success(format!("Imported \"{name}\""));
            }
            Err(err) => {
                tracing::error!("failed to import {}: {}", path.display(), err);
                self.notifications.error(format!("Failed to import design: {err}"));
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub(super) fn export_design_dialog(&mut self) {
        let session = self.controller.session();
        let name = session.design_name().to_string();
        let Some(path) = FileDialog::new()
            .add_filter("Furnish design", &["json"])
            .set_file_name(format!("{}.json", file_stem_for(&name)))
            .save_file()
        else {
            return;
        };
        let document = document_from_session(session, &name);
        let result = serde_json::to_vec_pretty(&document)
            .map_err(|err| err.to_string())
            .and_then(|data| std::fs::write(&path, data).map_err(|err| err.to_string()));
        match result {
            Ok(()) => {
                tracing::info!("design exported to {}", path.display());
                self.notifications.success("Design exported");
            }
            Err(err) => {
                tracing::error!("failed to export {}: {}", path.display(), err);
                self.notifications.error(format!("Failed to export design: {err}"));
            }
        }
    }
}

/// File-system friendly version of a design name.
pub(crate) fn file_stem_for(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        "design".to_string()
    } else {
        stem.to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stems_are_portable() {
        assert_eq!(file_stem_for("Living Room #2"), "living-room--2");
        assert_eq!(file_stem_for("  "), "design");
        assert_eq!(file_stem_for("Büro"), "b-ro");
    }
}
