use crate::camera::{CameraAngle, CameraRig};
use crate::design::DesignDocument;
use crate::furniture::{FurnitureItem, FurnitureStore};
use crate::room::RoomSpecs;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesignMeta {
    /// `None` until the design has been stored once.
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected_index: Option<usize>,
    pub drag_mode: bool,
}

/// Everything an open editor owns. Created when a design is opened and dropped
/// when it is closed; the interaction controller is the only writer.
#[derive(Debug, Clone)]
pub struct EditorSession {
    pub(crate) meta: DesignMeta,
    pub(crate) room: RoomSpecs,
    pub(crate) store: FurnitureStore,
    pub(crate) selection: SelectionState,
    pub(crate) grid_visible: bool,
    pub(crate) room_shaded: bool,
    pub(crate) camera: CameraRig,
    pub(crate) revision: u64,
}

impl EditorSession {
    pub fn new(room: RoomSpecs) -> Self {
        if room.is_degenerate() {
            tracing::warn!("room has non-positive dimensions: {:?}", room);
        }
        let camera = CameraRig::new(CameraAngle::default(), &room);
        Self {
            meta: DesignMeta::default(),
            room,
            store: FurnitureStore::new(),
            selection: SelectionState::default(),
            grid_visible: true,
            room_shaded: false,
            camera,
            revision: 0,
        }
    }

    pub fn from_document(document: DesignDocument) -> Self {
        let mut session = Self::new(document.room_specs);
        session.meta = DesignMeta {
            id: document.id,
            name: document.name,
        };
        session.store = FurnitureStore::from_items(document.furniture);
        session
    }

    pub fn meta(&self) -> &DesignMeta {
        &self.meta
    }

    pub fn design_id(&self) -> Option<&str> {
        self.meta.id.as_deref()
    }

    pub fn design_name(&self) -> &str {
        &self.meta.name
    }

    pub fn is_new_design(&self) -> bool {
        self.meta.id.is_none()
    }

    pub fn room(&self) -> &RoomSpecs {
        &self.room
    }

    pub fn furniture(&self) -> &FurnitureStore {
        &self.store
    }

    pub fn items(&self) -> &[FurnitureItem] {
        self.store.list()
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selection.selected_index
    }

    pub fn selected_item(&self) -> Option<&FurnitureItem> {
        self.selection
            .selected_index
            .and_then(|index| self.store.get_index(index))
    }

    pub fn drag_mode(&self) -> bool {
        self.selection.drag_mode
    }

    pub fn grid_visible(&self) -> bool {
        self.grid_visible
    }

    pub fn room_shaded(&self) -> bool {
        self.room_shaded
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn camera_angle(&self) -> CameraAngle {
        self.camera.angle()
    }

    /// Changes after every committed mutation; presentations compare against it.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Clears a selection that no longer points at an item. Returns true when
    /// something had to be repaired.
    pub fn heal_selection(&mut self) -> bool {
        let valid = match self.selection.selected_index {
            Some(index) => index < self.store.len(),
            None => !self.selection.drag_mode,
        };
        if valid {
            return false;
        }
        tracing::debug!("clearing stale selection {:?}", self.selection);
        self.selection = SelectionState::default();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_selection_heals_to_idle() {
        let mut session = EditorSession::new(RoomSpecs::default());
        session.store.add("chair");
        session.selection = SelectionState {
            selected_index: Some(3),
            drag_mode: true,
        };
        assert!(session.heal_selection());
        assert_eq!(session.selection(), SelectionState::default());
        assert!(!session.heal_selection());
    }

    #[test]
    fn opening_a_document_keeps_order_and_meta() {
        let mut a = FurnitureItem::new("a".to_string(), "sofa1");
        a.position.x = 1.0;
        let b = FurnitureItem::new("b".to_string(), "lamp1");
        let session = EditorSession::from_document(DesignDocument {
            id: Some("d1".to_string()),
            name: "Living".to_string(),
            room_specs: RoomSpecs::default(),
            furniture: vec![a, b],
            last_modified: None,
        });
        assert_eq!(session.design_id(), Some("d1"));
        assert!(!session.is_new_design());
        let ids: Vec<&str> = session.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(session.grid_visible());
        assert_eq!(session.selected_item(), None);
    }
}
