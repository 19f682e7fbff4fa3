use egui::{Pos2, Rect};
use glam::{Mat4, Vec2, Vec3};

const PITCH_LIMIT: f32 = 1.54;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 100.0;

pub fn viewport_aspect(rect: Rect) -> f32 {
    rect.width().max(1.0) / rect.height().max(1.0)
}

/// Screen position inside `rect` to normalized device coordinates (y up).
pub fn ndc_from_screen(rect: Rect, pos: Pos2) -> Vec2 {
    let width = rect.width().max(1.0);
    let height = rect.height().max(1.0);
    Vec2::new(
        ((pos.x - rect.min.x) / width) * 2.0 - 1.0,
        1.0 - ((pos.y - rect.min.y) / height) * 2.0,
    )
}

pub fn project_world_to_screen(view_proj: Mat4, rect: Rect, world: Vec3) -> Option<Pos2> {
    project_world_to_screen_with_depth(view_proj, rect, world).map(|(pos, _)| pos)
}

/// Projects `world` into `rect`, returning the screen point and NDC depth.
/// Points behind the eye are rejected.
pub fn project_world_to_screen_with_depth(
    view_proj: Mat4,
    rect: Rect,
    world: Vec3,
) -> Option<(Pos2, f32)> {
    let clip = view_proj * world.extend(1.0);
    if clip.w <= 1.0e-6 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    if !ndc.x.is_finite() || !ndc.y.is_finite() || !ndc.z.is_finite() {
        return None;
    }
    let x = rect.min.x + (ndc.x * 0.5 + 0.5) * rect.width();
    let y = rect.min.y + (0.5 - ndc.y * 0.5) * rect.height();
    Some((Pos2::new(x, y), ndc.z))
}

/// Orbits `position` around `target` by yaw and pitch deltas in radians,
/// keeping the distance.
pub fn orbit_position(position: Vec3, target: Vec3, delta_yaw: f32, delta_pitch: f32) -> Vec3 {
    let offset = position - target;
    let distance = offset.length();
    if distance <= 1.0e-6 {
        return position;
    }
    let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
    let yaw = offset.z.atan2(offset.x);
    let yaw = yaw + delta_yaw;
    let pitch = (pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    let direction = Vec3::new(pitch.cos() * yaw.cos(), pitch.sin(), pitch.cos() * yaw.sin());
    target + direction * distance
}

/// Moves `position` toward `target` by `factor` of the current distance.
pub fn zoom_position(position: Vec3, target: Vec3, factor: f32) -> Vec3 {
    let offset = position - target;
    let distance = offset.length();
    if distance <= 1.0e-6 {
        return position;
    }
    let zoomed = (distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    target + offset / distance * zoomed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect::from_min_size(Pos2::new(10.0, 20.0), egui::vec2(200.0, 100.0))
    }

    #[test]
    fn screen_center_is_ndc_origin() {
        let ndc = ndc_from_screen(rect(), Pos2::new(110.0, 70.0));
        assert!(ndc.length() < 1.0e-6);
        let corner = ndc_from_screen(rect(), Pos2::new(10.0, 20.0));
        assert_eq!(corner, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn projection_round_trips_through_ndc() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 4.0, 6.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(50_f32.to_radians(), viewport_aspect(rect()), 0.1, 100.0);
        let view_proj = proj * view;
        let world = Vec3::new(0.5, 0.0, -0.25);
        let (screen, depth) =
            project_world_to_screen_with_depth(view_proj, rect(), world).expect("visible");
        assert!(depth > 0.0 && depth < 1.0);
        let ndc = ndc_from_screen(rect(), screen);
        let expected = view_proj.project_point3(world);
        assert!((ndc.x - expected.x).abs() < 1.0e-4);
        assert!((ndc.y - expected.y).abs() < 1.0e-4);
    }

    #[test]
    fn points_behind_the_eye_are_rejected() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(50_f32.to_radians(), 1.0, 0.1, 100.0);
        assert!(project_world_to_screen(proj * view, rect(), Vec3::new(0.0, 0.0, 10.0)).is_none());
    }

    #[test]
    fn orbit_keeps_distance_and_clamps_pitch() {
        let target = Vec3::new(1.0, 0.0, 1.0);
        let position = target + Vec3::new(0.0, 3.0, 4.0);
        let moved = orbit_position(position, target, 0.7, 10.0);
        assert!(((moved - target).length() - 5.0).abs() < 1.0e-4);
        assert!(moved.y - target.y < 5.0);
        let closer = zoom_position(position, target, 0.5);
        assert!(((closer - target).length() - 2.5).abs() < 1.0e-4);
        assert!((zoom_position(position, target, 0.0).distance(target) - MIN_DISTANCE).abs() < 1.0e-5);
    }
}
