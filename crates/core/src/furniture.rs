use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

use crate::color::{DEFAULT_ITEM_COLOR, DEFAULT_ITEM_MATERIAL};

const ID_SUFFIX_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Xyz {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Xyz {
    pub const ZERO: Xyz = Xyz {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const ONE: Xyz = Xyz {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<Vec3> for Xyz {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Xyz> for Vec3 {
    fn from(v: Xyz) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FurnitureItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub model_id: String,
    pub position: Xyz,
    pub rotation: Xyz,
    pub scale: Xyz,
    pub color: String,
    pub material: String,
    pub shaded: bool,
}

impl FurnitureItem {
    /// Fresh item at the room origin with unit scale and default appearance.
    pub fn new(id: String, catalog_key: &str) -> Self {
        Self {
            id,
            kind: catalog_key.to_string(),
            model_id: catalog_key.to_string(),
            position: Xyz::ZERO,
            rotation: Xyz::ZERO,
            scale: Xyz::ONE,
            color: DEFAULT_ITEM_COLOR.to_string(),
            material: DEFAULT_ITEM_MATERIAL.to_string(),
            shaded: false,
        }
    }
}

/// Shallow merge into an item's transform; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformPatch {
    pub position: Option<Xyz>,
    pub rotation: Option<Xyz>,
    pub scale: Option<Xyz>,
}

impl TransformPatch {
    pub fn position(position: Xyz) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn rotation(rotation: Xyz) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    pub fn scale(scale: Xyz) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.rotation.is_none() && self.scale.is_none()
    }

    fn apply(&self, item: &mut FurnitureItem) {
        if let Some(position) = self.position {
            item.position = position;
        }
        if let Some(rotation) = self.rotation {
            item.rotation = rotation;
        }
        if let Some(scale) = self.scale {
            item.scale = scale;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemovedItem {
    pub index: usize,
    pub item: FurnitureItem,
}

#[derive(Debug, Clone, Default)]
pub struct FurnitureStore {
    items: Vec<FurnitureItem>,
}

impl FurnitureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<FurnitureItem>) -> Self {
        let mut store = Self::new();
        store.replace_all(items);
        store
    }

    /// Appends a new item for `catalog_key` and returns its generated id.
    pub fn add(&mut self, catalog_key: &str) -> String {
        let id = generate_item_id(catalog_key, |candidate| self.contains(candidate));
        self.items.push(FurnitureItem::new(id.clone(), catalog_key));
        id
    }

    /// Appends an already-built item, re-keying it if its id is empty or taken.
    pub fn insert(&mut self, mut item: FurnitureItem) -> String {
        if item.id.is_empty() || self.contains(&item.id) {
            let previous = std::mem::take(&mut item.id);
            item.id = generate_item_id(&item.kind, |candidate| self.contains(candidate));
            if !previous.is_empty() {
                tracing::warn!("duplicate furniture id {} re-keyed to {}", previous, item.id);
            }
        }
        let id = item.id.clone();
        self.items.push(item);
        id
    }

    pub fn replace_all(&mut self, items: Vec<FurnitureItem>) {
        self.items.clear();
        for item in items {
            self.insert(item);
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<RemovedItem> {
        let index = self.index_of(id)?;
        let item = self.items.remove(index);
        Some(RemovedItem { index, item })
    }

    pub fn update(&mut self, id: &str, patch: &TransformPatch) -> bool {
        self.replace_with(id, |item| patch.apply(item))
    }

    pub fn set_shaded(&mut self, id: &str, shaded: bool) -> bool {
        self.replace_with(id, |item| item.shaded = shaded)
    }

    pub fn list(&self) -> &[FurnitureItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&FurnitureItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_index(&self, index: usize) -> Option<&FurnitureItem> {
        self.items.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // Edits a copy and swaps it in, so no reader ever sees a half-applied change.
    fn replace_with(&mut self, id: &str, edit: impl FnOnce(&mut FurnitureItem)) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let mut next = self.items[index].clone();
        edit(&mut next);
        self.items[index] = next;
        true
    }
}

pub(crate) fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// `<key>-<unix millis>-<random base36>`, re-rolled while `is_taken` reports a clash.
pub fn generate_item_id(key: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| std::char::from_digit(rng.gen_range(0..36), 36).unwrap_or('0'))
            .collect();
        let id = format!("{key}-{}-{suffix}", unix_millis());
        if !is_taken(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_places_item_at_origin_with_unit_scale() {
        let mut store = FurnitureStore::new();
        let id = store.add("sofa1");
        let item = store.get(&id).expect("item");
        assert_eq!(item.kind, "sofa1");
        assert_eq!(item.model_id, "sofa1");
        assert_eq!(item.position, Xyz::ZERO);
        assert_eq!(item.scale, Xyz::ONE);
        assert_eq!(item.color, DEFAULT_ITEM_COLOR);
        assert!(id.starts_with("sofa1-"));
    }

    #[test]
    fn ids_stay_unique_across_mutations() {
        let mut store = FurnitureStore::new();
        let mut ids = Vec::new();
        for i in 0..50 {
            ids.push(store.add("chair"));
            if i % 7 == 0 {
                let victim = ids.remove(0);
                assert!(store.remove(&victim).is_some());
            }
        }
        let mut seen = std::collections::HashSet::new();
        for item in store.list() {
            assert!(seen.insert(item.id.clone()), "duplicate id {}", item.id);
        }
        assert_eq!(store.len(), ids.len());
    }

    #[test]
    fn update_preserves_unspecified_fields() {
        let mut store = FurnitureStore::new();
        let id = store.add("lamp1");
        assert!(store.update(&id, &TransformPatch::rotation(Xyz::new(0.0, 1.0, 0.0))));
        assert!(store.update(&id, &TransformPatch::position(Xyz::new(1.0, 0.0, 2.0))));
        let item = store.get(&id).expect("item");
        assert_eq!(item.rotation.y, 1.0);
        assert_eq!(item.position, Xyz::new(1.0, 0.0, 2.0));
        assert_eq!(item.scale, Xyz::ONE);
        assert!(!store.update("missing", &TransformPatch::scale(Xyz::splat(2.0))));
    }

    #[test]
    fn remove_reports_index_and_keeps_order() {
        let mut store = FurnitureStore::new();
        let a = store.add("a");
        let b = store.add("b");
        let c = store.add("c");
        let removed = store.remove(&b).expect("removed");
        assert_eq!(removed.index, 1);
        let order: Vec<&str> = store.list().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, vec![a.as_str(), c.as_str()]);
        assert!(store.remove(&b).is_none());
    }

    #[test]
    fn insert_rekeys_duplicates() {
        let mut store = FurnitureStore::new();
        let first = store.insert(FurnitureItem::new("same".to_string(), "chair"));
        let second = store.insert(FurnitureItem::new("same".to_string(), "chair"));
        assert_eq!(first, "same");
        assert_ne!(second, "same");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn set_shaded_toggles_flag() {
        let mut store = FurnitureStore::new();
        let id = store.add("bed1");
        assert!(store.set_shaded(&id, true));
        assert!(store.get(&id).expect("item").shaded);
    }

    #[test]
    fn item_serializes_with_wire_names() {
        let item = FurnitureItem::new("x-1".to_string(), "sofa2");
        let json = serde_json::to_value(&item).expect("json");
        assert_eq!(json["type"], "sofa2");
        assert_eq!(json["modelId"], "sofa2");
        assert_eq!(json["position"]["x"], 0.0);
    }
}
