use glam::Vec3;
use serde::{Deserialize, Serialize};

pub const WALL_THICKNESS: f32 = 0.1;
pub const FLOOR_THICKNESS: f32 = 0.1;
const ROOM_SHADE_MARGIN: f32 = 1.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomShape {
    #[default]
    Rectangular,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSpecs {
    pub width: f32,
    pub length: f32,
    pub height: f32,
    #[serde(default)]
    pub shape: RoomShape,
    #[serde(default = "default_wall_color")]
    pub wall_color: String,
    #[serde(default = "default_floor_color")]
    pub floor_color: String,
    #[serde(default = "default_wall_texture")]
    pub wall_texture: String,
    #[serde(default = "default_floor_texture")]
    pub floor_texture: String,
}

fn default_wall_color() -> String {
    "#ffffff".to_string()
}

fn default_floor_color() -> String {
    "#808080".to_string()
}

fn default_wall_texture() -> String {
    "smooth".to_string()
}

fn default_floor_texture() -> String {
    "wood".to_string()
}

impl Default for RoomSpecs {
    fn default() -> Self {
        Self {
            width: 5.0,
            length: 5.0,
            height: 3.0,
            shape: RoomShape::Rectangular,
            wall_color: default_wall_color(),
            floor_color: default_floor_color(),
            wall_texture: default_wall_texture(),
            floor_texture: default_floor_texture(),
        }
    }
}

impl RoomSpecs {
    /// True when any dimension is non-positive or not finite. Such rooms still
    /// produce geometry, it is just degenerate.
    pub fn is_degenerate(&self) -> bool {
        [self.width, self.length, self.height]
            .iter()
            .any(|v| !v.is_finite() || *v <= 0.0)
    }

    pub fn half_extents(&self) -> (f32, f32) {
        (self.width * 0.5, self.length * 0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallId {
    Front,
    Back,
    Left,
    Right,
    Ceiling,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSlab {
    pub id: WallId,
    pub center: Vec3,
    pub size: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slab {
    pub center: Vec3,
    pub size: Vec3,
}

pub fn room_walls(specs: &RoomSpecs) -> [WallSlab; 4] {
    let (half_w, half_l) = specs.half_extents();
    let h = specs.height;
    [
        WallSlab {
            id: WallId::Front,
            center: Vec3::new(0.0, h * 0.5, -half_l),
            size: Vec3::new(specs.width, h, WALL_THICKNESS),
        },
        WallSlab {
            id: WallId::Back,
            center: Vec3::new(0.0, h * 0.5, half_l),
            size: Vec3::new(specs.width, h, WALL_THICKNESS),
        },
        WallSlab {
            id: WallId::Left,
            center: Vec3::new(-half_w, h * 0.5, 0.0),
            size: Vec3::new(WALL_THICKNESS, h, specs.length),
        },
        WallSlab {
            id: WallId::Right,
            center: Vec3::new(half_w, h * 0.5, 0.0),
            size: Vec3::new(WALL_THICKNESS, h, specs.length),
        },
    ]
}

pub fn visible_walls(specs: &RoomSpecs, hidden: &[WallId]) -> Vec<WallSlab> {
    room_walls(specs)
        .into_iter()
        .filter(|wall| !hidden.contains(&wall.id))
        .collect()
}

pub fn room_floor(specs: &RoomSpecs) -> Slab {
    Slab {
        center: Vec3::ZERO,
        size: Vec3::new(specs.width, FLOOR_THICKNESS, specs.length),
    }
}

pub fn room_shade_volume(specs: &RoomSpecs) -> Slab {
    Slab {
        center: Vec3::new(0.0, specs.height * 0.5, 0.0),
        size: Vec3::new(
            specs.width * ROOM_SHADE_MARGIN,
            specs.height,
            specs.length * ROOM_SHADE_MARGIN,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_sit_on_room_edges() {
        let specs = RoomSpecs {
            width: 4.0,
            length: 6.0,
            height: 2.5,
            ..RoomSpecs::default()
        };
        let walls = room_walls(&specs);
        let front = walls.iter().find(|w| w.id == WallId::Front).expect("front");
        assert_eq!(front.center, Vec3::new(0.0, 1.25, -3.0));
        assert_eq!(front.size, Vec3::new(4.0, 2.5, WALL_THICKNESS));
        let right = walls.iter().find(|w| w.id == WallId::Right).expect("right");
        assert_eq!(right.center, Vec3::new(2.0, 1.25, 0.0));
        assert_eq!(right.size, Vec3::new(WALL_THICKNESS, 2.5, 6.0));
    }

    #[test]
    fn hidden_walls_are_filtered() {
        let specs = RoomSpecs::default();
        let visible = visible_walls(&specs, &[WallId::Back, WallId::Right]);
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|w| w.id != WallId::Back && w.id != WallId::Right));
        // the ceiling has no slab, hiding it changes nothing
        assert_eq!(visible_walls(&specs, &[WallId::Ceiling]).len(), 4);
    }

    #[test]
    fn degenerate_dimensions_do_not_panic() {
        let specs = RoomSpecs {
            width: -1.0,
            length: 0.0,
            height: f32::NAN,
            ..RoomSpecs::default()
        };
        assert!(specs.is_degenerate());
        let _ = room_walls(&specs);
        let floor = room_floor(&specs);
        assert_eq!(floor.size.x, -1.0);
        assert!(!RoomSpecs::default().is_degenerate());
    }

    #[test]
    fn specs_use_camel_case_on_the_wire() {
        let json = serde_json::to_value(RoomSpecs::default()).expect("json");
        assert_eq!(json["wallColor"], "#ffffff");
        assert_eq!(json["shape"], "rectangular");
        let parsed: RoomSpecs =
            serde_json::from_str(r#"{"width":3,"length":4,"height":2.5}"#).expect("parse");
        assert_eq!(parsed.floor_texture, "wood");
    }
}
