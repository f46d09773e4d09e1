use bevy::prelude::*;

/// Slab-method ray–AABB intersection. Returns the distance to the box along
/// the ray, zero when the origin is inside it.
pub fn ray_aabb_hit_t(ray_origin: Vec3, ray_direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let (t_near, t_far) = slab_interval(ray_origin, ray_direction, min, max)?;
    if t_far < 0.0 {
        return None;
    }
    Some(t_near.max(0.0))
}

/// Front-face only variant: a ray starting inside the box does not hit it.
pub fn ray_aabb_entry_t(ray_origin: Vec3, ray_direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let (t_near, t_far) = slab_interval(ray_origin, ray_direction, min, max)?;
    (t_near >= 0.0 && t_near <= t_far).then_some(t_near)
}

fn slab_interval(ray_origin: Vec3, ray_direction: Vec3, min: Vec3, max: Vec3) -> Option<(f32, f32)> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray_origin[axis];
        let direction = ray_direction[axis];
        if direction == 0.0 {
            // Parallel to this slab: must already lie between its planes.
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / direction;
        let mut t0 = (min[axis] - origin) * inv;
        let mut t1 = (max[axis] - origin) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    Some((t_near, t_far))
}

/// Entry distance into a sphere. Origins inside the sphere do not hit.
pub fn ray_sphere_entry_t(ray_origin: Vec3, ray_direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let to_origin = ray_origin - center;
    let a = ray_direction.length_squared();
    if a == 0.0 {
        return None;
    }
    let c = to_origin.length_squared() - radius * radius;
    if c <= 0.0 {
        return None;
    }
    let half_b = to_origin.dot(ray_direction);
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let t = (-half_b - discriminant.sqrt()) / a;
    (t >= 0.0).then_some(t)
}

/// Möller–Trumbore ray–triangle intersection, double sided.
///
/// The parallel/degenerate cut-off is relative to the edge and direction
/// lengths, so tiny triangles seen through a scaled transform still hit.
pub fn ray_triangle_hit_t(ray_origin: Vec3, ray_direction: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray_direction.cross(edge2);
    let det = edge1.dot(h);
    let tolerance = f32::EPSILON * edge1.length() * edge2.length() * ray_direction.length();
    if det.abs() <= tolerance {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray_origin - v0;
    let u = inv_det * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = inv_det * ray_direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(q);
    (t > 0.0).then_some(t)
}
