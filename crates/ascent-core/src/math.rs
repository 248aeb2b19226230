//! Orientation and vector helpers shared by the physics and climb crates

use glam::{Mat3, Quat, Vec3};

/// Dot-product threshold above which two normals count as parallel
pub const PARALLEL_THRESHOLD: f32 = 0.999_845;

/// Move a vector towards a target by a maximum delta
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let diff = target - current;
    let distance = diff.length();

    if distance <= max_delta || distance == 0.0 {
        target
    } else {
        current + diff / distance * max_delta
    }
}

/// Rotation whose local forward (-Z) points along `forward`, keeping local up
/// as close to world up as possible.
///
/// Returns `None` for a zero-length direction.
pub fn rotation_from_forward(forward: Vec3) -> Option<Quat> {
    let forward = forward.try_normalize()?;
    let back = -forward;
    let world_up = if forward.dot(Vec3::Y).abs() > 0.999 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let right = world_up.cross(back).normalize();
    let up = back.cross(right);
    Some(Quat::from_mat3(&Mat3::from_cols(right, up, back)).normalize())
}

/// Frame-rate aware spherical interpolation towards `target`.
///
/// `speed` is the fraction of the remaining arc covered per second; a
/// non-positive speed snaps straight to the target.
pub fn quat_interp_to(current: Quat, target: Quat, dt: f32, speed: f32) -> Quat {
    if speed <= 0.0 || current.angle_between(target) < 1e-4 {
        return target;
    }

    let alpha = (dt * speed).clamp(0.0, 1.0);
    current.slerp(target, alpha).normalize()
}

/// Keep only the rotation about world up
pub fn yaw_only(rotation: Quat) -> Quat {
    let forward = rotation * -Vec3::Z;
    let flat = Vec3::new(forward.x, 0.0, forward.z);

    let yaw = if flat.length_squared() > 1e-8 {
        (-flat.x).atan2(-flat.z)
    } else {
        // Looking straight up or down, heading comes from the right axis
        let right = rotation * Vec3::X;
        (-right.z).atan2(right.x)
    };

    Quat::from_rotation_y(yaw)
}

/// Whether two directions are parallel (either sense)
pub fn is_parallel(a: Vec3, b: Vec3) -> bool {
    a.normalize_or_zero().dot(b.normalize_or_zero()).abs() >= PARALLEL_THRESHOLD
}

/// Angle between two directions in degrees (0 for zero-length input)
pub fn angle_between_degrees(a: Vec3, b: Vec3) -> f32 {
    let (Some(a), Some(b)) = (a.try_normalize(), b.try_normalize()) else {
        return 0.0;
    };
    a.dot(b).clamp(-1.0, 1.0).acos().to_degrees()
}
