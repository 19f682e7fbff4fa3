use glam::{Mat4, Vec2, Vec3};

const PARALLEL_EPSILON: f32 = 1.0e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray through normalized device coordinates (x right, y up, both in -1..1).
    pub fn from_ndc(view_proj: Mat4, ndc: Vec2) -> Option<Self> {
        let inv = view_proj.inverse();
        let near = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        if !near.is_finite() || !far.is_finite() {
            return None;
        }
        let direction = (far - near).normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        Some(Self {
            origin: near,
            direction,
        })
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Intersection with the plane `y = height`. `None` when the ray runs parallel
/// to the plane or the plane lies behind the ray origin.
pub fn intersect_horizontal_plane(ray: &Ray, height: f32) -> Option<Vec3> {
    if ray.direction.y.abs() <= PARALLEL_EPSILON {
        return None;
    }
    let t = (height - ray.origin.y) / ray.direction.y;
    if t < 0.0 || !t.is_finite() {
        return None;
    }
    Some(ray.at(t))
}

/// Ray against a box given in the local space of `transform`; returns the
/// world-space hit distance along the ray.
pub fn ray_hits_obb(ray: &Ray, transform: Mat4, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = transform.inverse();
    if !inv.is_finite() {
        return None;
    }
    let local_origin = inv.transform_point3(ray.origin);
    let local_direction = inv.transform_vector3(ray.direction);
    let t = ray_aabb_hit_t(local_origin, local_direction, min, max)?;
    let world_hit = transform.transform_point3(local_origin + local_direction * t);
    Some((world_hit - ray.origin).length())
}

// Slab test; returns the parametric entry distance (or exit when starting inside).
fn ray_aabb_hit_t(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        if d.abs() <= PARALLEL_EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }
    if t_max < 0.0 {
        return None;
    }
    Some(if t_min >= 0.0 { t_min } else { t_max })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraPose;

    #[test]
    fn downward_ray_hits_floor() {
        let ray = Ray::new(Vec3::new(1.0, 5.0, -2.0), Vec3::NEG_Y);
        let hit = intersect_horizontal_plane(&ray, 0.0).expect("hit");
        assert!((hit - Vec3::new(1.0, 0.0, -2.0)).length() < 1.0e-5);
    }

    #[test]
    fn parallel_ray_has_no_intersection() {
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        assert_eq!(intersect_horizontal_plane(&ray, 0.0), None);
    }

    #[test]
    fn plane_behind_origin_is_ignored() {
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert_eq!(intersect_horizontal_plane(&ray, 0.0), None);
    }

    #[test]
    fn center_ndc_ray_points_at_target() {
        let pose = CameraPose {
            position: Vec3::new(0.0, 1.5, 7.0),
            target: Vec3::new(0.0, 1.5, 0.0),
        };
        let ray = Ray::from_ndc(pose.view_proj(1.6), Vec2::ZERO).expect("ray");
        assert!((ray.direction - Vec3::NEG_Z).length() < 1.0e-4);
        assert!((ray.origin.x).abs() < 1.0e-4);
    }

    #[test]
    fn obb_hit_respects_rotation() {
        let transform = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4);
        let ray = Ray::new(Vec3::new(0.0, 0.5, 5.0), Vec3::NEG_Z);
        let t = ray_hits_obb(&ray, transform, Vec3::new(-0.5, 0.0, -0.5), Vec3::new(0.5, 1.0, 0.5))
            .expect("hit");
        // rotated cube corner faces the ray at distance 5 - sqrt(0.5)
        assert!((t - (5.0 - 0.5f32.sqrt())).abs() < 1.0e-4);
        let miss = Ray::new(Vec3::new(2.0, 0.5, 5.0), Vec3::NEG_Z);
        assert!(ray_hits_obb(&miss, transform, Vec3::splat(-0.5), Vec3::splat(0.5)).is_none());
    }
}
