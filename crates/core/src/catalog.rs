#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FurnitureCategory {
    Chair,
    Sofa,
    Cupboard,
    DiningTable,
    CoffeeTable,
    TableLamp,
    Bed,
}

impl FurnitureCategory {
    pub fn label(self) -> &'static str {
        match self {
            FurnitureCategory::Chair => "Chair",
            FurnitureCategory::Sofa => "Sofa",
            FurnitureCategory::Cupboard => "Cupboard",
            FurnitureCategory::DiningTable => "Dining Table",
            FurnitureCategory::CoffeeTable => "Coffee Table",
            FurnitureCategory::TableLamp => "Table Lamp",
            FurnitureCategory::Bed => "Bed",
        }
    }

    fn footprint_key(self) -> Option<&'static str> {
        match self {
            FurnitureCategory::Chair => Some("chair"),
            FurnitureCategory::Sofa => Some("sofa"),
            FurnitureCategory::DiningTable => Some("dining-table"),
            FurnitureCategory::CoffeeTable => Some("coffee-table"),
            FurnitureCategory::TableLamp => Some("lamp"),
            FurnitureCategory::Cupboard | FurnitureCategory::Bed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub key: &'static str,
    pub display_name: &'static str,
    pub category: FurnitureCategory,
    pub model_path: &'static str,
    pub image_path: &'static str,
}

const fn entry(
    key: &'static str,
    display_name: &'static str,
    category: FurnitureCategory,
    model_path: &'static str,
    image_path: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        key,
        display_name,
        category,
        model_path,
        image_path,
    }
}

use FurnitureCategory::*;

static CATALOG: [CatalogEntry; 23] = [
    entry("egg-chair", "Egg Chair", Chair, "models/chairs/eggchair.glb", "models/chairs/eggchair.png"),
    entry("modern-chair", "Modern Chair", Chair, "models/chairs/modernchair.glb", "models/chairs/modernchair.png"),
    entry("wooden-chair", "Wooden Chair", Chair, "models/chairs/woodenchair.glb", "models/chairs/woodenchair.png"),
    entry("office-chair", "Office Chair", Chair, "models/chairs/officechair.glb", "models/chairs/officechair.png"),
    entry("beam", "Beam Chair", Chair, "models/chairs/beam.glb", "models/chairs/beam.png"),
    entry("sofa1", "Classic Sofa", Sofa, "models/sofa/sofa1.glb", "models/sofa/sofa1.png"),
    entry("sofa2", "Modern Sofa", Sofa, "models/sofa/sofa2.glb", "models/sofa/sofa2.png"),
    entry("sofa3", "Sectional Sofa", Sofa, "models/sofa/sofa3.glb", "models/sofa/sofa3.png"),
    entry("cupboard1", "Tall Cupboard", Cupboard, "models/cupboard/cupboard1.glb", "models/cupboard/cupboard1.png"),
    entry("cupboard2", "Wide Cupboard", Cupboard, "models/cupboard/cupboard2.glb", "models/cupboard/cupboard2.png"),
    entry("dining1", "4-Seater Dining Table", DiningTable, "models/dinning/dining1.glb", "models/dinning/dining1.png"),
    entry("dining2", "6-Seater Dining Table", DiningTable, "models/dinning/dining2.glb", "models/dinning/dining2.png"),
    entry("dining3", "8-Seater Dining Table", DiningTable, "models/dinning/dining3.glb", "models/dinning/dining3.png"),
    entry("coffee1", "Wooden Coffee Table", CoffeeTable, "models/coffee/coffee1.glb", "models/coffee/coffee1.png"),
    entry("coffee2", "Glass Coffee Table", CoffeeTable, "models/coffee/coffee2.glb", "models/coffee/coffee2.png"),
    entry("lamp1", "Classic Table Lamp", TableLamp, "models/lamp/lamp1.glb", "models/lamp/lamp1.png"),
    entry("lamp2", "Modern Table Lamp", TableLamp, "models/lamp/lamp2.glb", "models/lamp/lamp2.png"),
    entry("lamp3", "Decorative Table Lamp", TableLamp, "models/lamp/lamp3.glb", "models/lamp/lamp3.png"),
    entry("bed1", "Single Bed", Bed, "models/bed/bed1.glb", "models/bed/bed1.png"),
    entry("bed2", "Double Bed", Bed, "models/bed/bed2.glb", "models/bed/bed2.png"),
    entry("bed3", "Bunk Bed", Bed, "models/bed/bed3.glb", "models/bed/bed3.png"),
    entry("bed4", "King Bed", Bed, "models/bed/bed4.glb", "models/bed/bed4.png"),
    entry("bed5", "Queen Bed", Bed, "models/bed/bed5.glb", "models/bed/bed5.png"),
];

pub fn catalog_entries() -> &'static [CatalogEntry] {
    &CATALOG
}

pub fn catalog_entry(key: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.key == key)
}

/// Categories in first-seen catalog order.
pub fn catalog_categories() -> Vec<FurnitureCategory> {
    let mut categories = Vec::new();
    for entry in CATALOG.iter() {
        if !categories.contains(&entry.category) {
            categories.push(entry.category);
        }
    }
    categories
}

pub fn display_name(key: &str) -> &str {
    catalog_entry(key).map(|entry| entry.display_name).unwrap_or(key)
}

/// Rectangular extent of a furniture category on the floor plan, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub width: f32,
    pub depth: f32,
}

pub const DEFAULT_FOOTPRINT: Footprint = Footprint {
    width: 1.0,
    depth: 1.0,
};

fn category_footprint(key: &str) -> Option<Footprint> {
    let (width, depth) = match key {
        "chair" => (0.5, 0.5),
        "dining-table" => (1.5, 0.8),
        "side-table" => (0.4, 0.4),
        "coffee-table" => (1.0, 0.6),
        "sofa" => (2.0, 0.8),
        "rug" => (2.0, 1.5),
        "lamp" => (0.3, 0.3),
        _ => return None,
    };
    Some(Footprint { width, depth })
}

pub fn footprint_for(kind: &str) -> Footprint {
    if let Some(footprint) = category_footprint(kind) {
        return footprint;
    }
    catalog_entry(kind)
        .and_then(|entry| entry.category.footprint_key())
        .and_then(category_footprint)
        .unwrap_or(DEFAULT_FOOTPRINT)
}
