use std::collections::BTreeMap;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::room::{RoomSpecs, WallId};

pub const CAMERA_FOV_DEGREES: f32 = 50.0;
const CAMERA_NEAR: f32 = 0.01;
const CAMERA_FAR: f32 = 1000.0;
const EYE_HEIGHT: f32 = 1.5;
/// Horizontal share of the view direction below which the up vector turns to `-Z`.
const VERTICAL_BLEND: f32 = 0.2;
const PRESET_STANDOFF: f32 = 2.0;

const SPRING_MASS: f32 = 1.0;
const SPRING_TENSION: f32 = 170.0;
const SETTLE_EPSILON: f32 = 1.0e-3;
const SETTLE_VELOCITY: f32 = 1.0e-2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraAngle {
    #[default]
    Front,
    Left,
    Right,
    Top,
    Corner,
}

impl CameraAngle {
    pub const ALL: [CameraAngle; 5] = [
        CameraAngle::Front,
        CameraAngle::Left,
        CameraAngle::Right,
        CameraAngle::Top,
        CameraAngle::Corner,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CameraAngle::Front => "Front",
            CameraAngle::Left => "Left",
            CameraAngle::Right => "Right",
            CameraAngle::Top => "Top",
            CameraAngle::Corner => "Corner",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|angle| angle.label().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        let up = self.up_vector();
        let view = Mat4::look_at_rh(self.position, self.target, up);
        let projection =
            Mat4::perspective_rh(CAMERA_FOV_DEGREES.to_radians(), aspect, CAMERA_NEAR, CAMERA_FAR);
        projection * view
    }

    /// Up vector for the look-at. Looking down, the horizontal look direction is
    /// equivalent to `Y` and is turned toward `-Z` as the view nears vertical,
    /// so the straight-down pose keeps the plan orientation without a sudden roll.
    fn up_vector(&self) -> Vec3 {
        let forward = self.forward();
        let horizontal = Vec3::new(forward.x, 0.0, forward.z);
        let spread = horizontal.length();
        if forward.y >= 0.0 || spread >= VERTICAL_BLEND {
            if spread <= 1.0e-4 {
                return Vec3::NEG_Z;
            }
            return Vec3::Y;
        }
        let weight = 1.0 - spread / VERTICAL_BLEND;
        let heading = horizontal.normalize_or_zero();
        let up = heading * (1.0 - weight) + Vec3::NEG_Z * weight;
        // only a camera facing +Z straight through the blend cancels out
        up.try_normalize().unwrap_or(Vec3::X)
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraPreset {
    pub position: Vec3,
    pub target: Vec3,
    pub hidden_walls: Vec<WallId>,
}

impl CameraPreset {
    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            target: self.target,
        }
    }

    pub fn hides(&self, wall: WallId) -> bool {
        self.hidden_walls.contains(&wall)
    }
}

pub fn preset(angle: CameraAngle, specs: &RoomSpecs) -> CameraPreset {
    let eye_target = Vec3::new(0.0, EYE_HEIGHT, 0.0);
    let (position, target, hidden_walls) = match angle {
        CameraAngle::Front => (
            Vec3::new(0.0, EYE_HEIGHT, specs.length + PRESET_STANDOFF),
            eye_target,
            vec![WallId::Back],
        ),
        CameraAngle::Left => (
            Vec3::new(-(specs.width + PRESET_STANDOFF), EYE_HEIGHT, 0.0),
            eye_target,
            vec![WallId::Left],
        ),
        CameraAngle::Right => (
            Vec3::new(specs.width + PRESET_STANDOFF, EYE_HEIGHT, 0.0),
            eye_target,
            vec![WallId::Right],
        ),
        CameraAngle::Top => (
            Vec3::new(0.0, specs.height + PRESET_STANDOFF, 0.0),
            Vec3::ZERO,
            vec![WallId::Ceiling],
        ),
        CameraAngle::Corner => (
            Vec3::new(
                specs.width + PRESET_STANDOFF,
                EYE_HEIGHT,
                specs.length + PRESET_STANDOFF,
            ),
            eye_target,
            vec![WallId::Back, WallId::Right],
        ),
    };
    CameraPreset {
        position,
        target,
        hidden_walls,
    }
}

pub fn presets_for(specs: &RoomSpecs) -> BTreeMap<CameraAngle, CameraPreset> {
    CameraAngle::ALL
        .into_iter()
        .map(|angle| (angle, preset(angle, specs)))
        .collect()
}

/// Critically damped spring easing the camera pose towards a goal.
///
/// Each axis is advanced with the closed-form solution, so large frame deltas
/// cannot destabilise it and the motion never oscillates around the goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraAnimator {
    current: CameraPose,
    goal: CameraPose,
    position_velocity: Vec3,
    target_velocity: Vec3,
    omega: f32,
}

impl CameraAnimator {
    pub fn new(pose: CameraPose) -> Self {
        Self {
            current: pose,
            goal: pose,
            position_velocity: Vec3::ZERO,
            target_velocity: Vec3::ZERO,
            omega: (SPRING_TENSION / SPRING_MASS).sqrt(),
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.current
    }

    pub fn goal(&self) -> CameraPose {
        self.goal
    }

    pub fn retarget(&mut self, goal: CameraPose) {
        self.goal = goal;
    }

    pub fn snap_to(&mut self, pose: CameraPose) {
        self.current = pose;
        self.goal = pose;
        self.position_velocity = Vec3::ZERO;
        self.target_velocity = Vec3::ZERO;
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.goal
            && self.position_velocity == Vec3::ZERO
            && self.target_velocity == Vec3::ZERO
    }

    /// Advances by `dt` seconds; returns true while still moving.
    pub fn step(&mut self, dt: f32) -> bool {
        if self.is_settled() {
            return false;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let (position, position_velocity) = spring_step(
            self.current.position,
            self.position_velocity,
            self.goal.position,
            self.omega,
            dt,
        );
        let (target, target_velocity) = spring_step(
            self.current.target,
            self.target_velocity,
            self.goal.target,
            self.omega,
            dt,
        );
        self.current = CameraPose { position, target };
        self.position_velocity = position_velocity;
        self.target_velocity = target_velocity;

        let near_goal = (self.current.position - self.goal.position).length() < SETTLE_EPSILON
            && (self.current.target - self.goal.target).length() < SETTLE_EPSILON;
        let slow = self.position_velocity.length() < SETTLE_VELOCITY
            && self.target_velocity.length() < SETTLE_VELOCITY;
        if near_goal && slow {
            self.snap_to(self.goal);
            return false;
        }
        true
    }
}

fn spring_step(value: Vec3, velocity: Vec3, goal: Vec3, omega: f32, dt: f32) -> (Vec3, Vec3) {
    let displacement = value - goal;
    let decay = (-omega * dt).exp();
    let temp = (velocity + displacement * omega) * dt;
    let next_displacement = (displacement + temp) * decay;
    let next_velocity = (velocity - temp * omega) * decay;
    (goal + next_displacement, next_velocity)
}

/// Active preset plus the animated camera that follows it.
#[derive(Debug, Clone)]
pub struct CameraRig {
    angle: CameraAngle,
    animator: CameraAnimator,
}

impl CameraRig {
    pub fn new(angle: CameraAngle, specs: &RoomSpecs) -> Self {
        Self {
            angle,
            animator: CameraAnimator::new(preset(angle, specs).pose()),
        }
    }

    pub fn angle(&self) -> CameraAngle {
        self.angle
    }

    pub fn preset(&self, specs: &RoomSpecs) -> CameraPreset {
        preset(self.angle, specs)
    }

    pub fn pose(&self) -> CameraPose {
        self.animator.pose()
    }

    pub fn is_animating(&self) -> bool {
        !self.animator.is_settled()
    }

    pub fn set_angle(&mut self, angle: CameraAngle, specs: &RoomSpecs) {
        self.angle = angle;
        self.animator.retarget(preset(angle, specs).pose());
    }

    /// Re-aims at the current preset, e.g. after the room was resized.
    pub fn refresh(&mut self, specs: &RoomSpecs) {
        self.animator.retarget(preset(self.angle, specs).pose());
    }

    /// Free-look adjustment from orbit controls; the next preset switch overrides it.
    pub fn override_pose(&mut self, pose: CameraPose) {
        self.animator.snap_to(pose);
    }

    pub fn tick(&mut self, dt: f32) -> bool {
        self.animator.step(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> RoomSpecs {
        RoomSpecs {
            width: 5.0,
            length: 4.0,
            height: 3.0,
            ..RoomSpecs::default()
        }
    }

    fn screen_up(pose: &CameraPose) -> Vec3 {
        let forward = pose.forward();
        let up = pose.up_vector();
        (up - forward * up.dot(forward)).normalize()
    }

    #[test]
    fn up_vector_turns_smoothly_into_top_view() {
        let specs = room();
        let left = preset(CameraAngle::Left, &specs).pose();
        let top = preset(CameraAngle::Top, &specs).pose();
        assert_eq!(top.up_vector(), Vec3::NEG_Z);
        assert_eq!(left.up_vector(), Vec3::Y);

        let steps = 400;
        let mut previous = screen_up(&left);
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            let pose = CameraPose {
                position: left.position.lerp(top.position, t),
                target: left.target.lerp(top.target, t),
            };
            let up = screen_up(&pose);
            assert!(up.dot(previous) > 0.95, "roll jump at t = {t}");
            previous = up;
        }
        assert!(previous.dot(Vec3::NEG_Z) > 0.999);
    }

    #[test]
    fn front_approach_to_top_has_no_roll() {
        let pose = CameraPose {
            position: Vec3::new(0.0, 5.0, 0.5),
            target: Vec3::ZERO,
        };
        let forward = pose.forward();
        let from_y = (Vec3::Y - forward * forward.y).normalize();
        assert!(screen_up(&pose).dot(from_y) > 0.9999);
    }

    #[test]
    fn preset_table_matches_room_dimensions() {
        let presets = presets_for(&room());
        let front = &presets[&CameraAngle::Front];
        assert_eq!(front.position, Vec3::new(0.0, 1.5, 6.0));
        assert_eq!(front.target, Vec3::new(0.0, 1.5, 0.0));
        assert_eq!(front.hidden_walls, vec![WallId::Back]);
        let top = &presets[&CameraAngle::Top];
        assert_eq!(top.position, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(top.target, Vec3::ZERO);
        let corner = &presets[&CameraAngle::Corner];
        assert_eq!(corner.position, Vec3::new(7.0, 1.5, 6.0));
        assert!(corner.hides(WallId::Back) && corner.hides(WallId::Right));
        assert_eq!(presets[&CameraAngle::Left].position.x, -7.0);
    }

    #[test]
    fn round_trip_through_top_returns_same_preset() {
        let specs = room();
        for angle in CameraAngle::ALL {
            let before = preset(angle, &specs);
            let mut rig = CameraRig::new(angle, &specs);
            rig.set_angle(CameraAngle::Top, &specs);
            rig.set_angle(angle, &specs);
            let after = rig.preset(&specs);
            assert_eq!(before.position, after.position);
            assert_eq!(before.target, after.target);
        }
    }

    #[test]
    fn animator_converges_within_a_second() {
        let specs = room();
        let mut rig = CameraRig::new(CameraAngle::Front, &specs);
        rig.set_angle(CameraAngle::Corner, &specs);
        let goal = preset(CameraAngle::Corner, &specs).pose();
        let mut elapsed = 0.0;
        while rig.tick(1.0 / 60.0) {
            elapsed += 1.0 / 60.0;
            assert!(elapsed < 1.5, "camera did not settle");
        }
        assert_eq!(rig.pose(), goal);
        assert!(elapsed <= 1.1);
    }

    #[test]
    fn animator_distance_never_increases() {
        let start = preset(CameraAngle::Left, &room()).pose();
        let goal = preset(CameraAngle::Right, &room()).pose();
        let mut animator = CameraAnimator::new(start);
        animator.retarget(goal);
        let mut last = (animator.pose().position - goal.position).length();
        for _ in 0..120 {
            animator.step(1.0 / 60.0);
            let distance = (animator.pose().position - goal.position).length();
            assert!(distance <= last + 1.0e-5);
            last = distance;
        }
    }

    #[test]
    fn huge_step_is_stable() {
        let mut animator = CameraAnimator::new(preset(CameraAngle::Front, &room()).pose());
        let goal = preset(CameraAngle::Top, &room()).pose();
        animator.retarget(goal);
        animator.step(10.0);
        assert_eq!(animator.pose(), goal);
        assert!(animator.is_settled());
    }

    #[test]
    fn top_view_projection_is_finite() {
        let pose = preset(CameraAngle::Top, &room()).pose();
        let vp = pose.view_proj(1.5);
        assert!(vp.to_cols_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn angle_names_parse() {
        assert_eq!(CameraAngle::from_name("corner"), Some(CameraAngle::Corner));
        assert_eq!(CameraAngle::from_name("TOP"), Some(CameraAngle::Top));
        assert_eq!(CameraAngle::from_name("ceiling"), None);
    }
}
