//! View rotation and the combined field-of-view test / perspective divide
use nalgebra::{Matrix3, Vector3};

/// Squared tangent limit for the FOV cone; a lateral/depth ratio whose
/// square exceeds this is outside the view
pub const TAN_LIMIT_SQ: f32 = 25.0;

/// Rotation that maps `v` onto the +X axis without rolling world +Z.
///
/// Built from two plane rotations: first about Z so `v` lies in the XZ
/// plane, then about Y so it lies on X. Because neither step rotates about
/// X, "up" stays in the XZ plane and the view never rolls.
///
/// `v` must be non-zero.
pub fn align_with_x_axis(v: &Vector3<f32>) -> Matrix3<f32> {
    let horizontal = (v.x * v.x + v.y * v.y).sqrt();
    let length = v.norm();

    let about_z = if horizontal != 0.0 {
        let (c, s) = (v.x / horizontal, v.y / horizontal);
        Matrix3::new(
            c, s, 0.0,
            -s, c, 0.0,
            0.0, 0.0, 1.0,
        )
    } else {
        Matrix3::identity()
    };

    // After the first step v = (horizontal, 0, z)
    let (c, s) = (horizontal / length, v.z / length);
    let about_y = Matrix3::new(
        c, 0.0, s,
        0.0, 1.0, 0.0,
        -s, 0.0, c,
    );

    about_y * about_z
}

/// Unit normal of the plane through `a`, `b`, `c`: `(a - b) x (c - b)`.
/// `None` when the points are collinear.
pub fn plane_normal(
    a: &Vector3<f32>,
    b: &Vector3<f32>,
    c: &Vector3<f32>,
) -> Option<Vector3<f32>> {
    let e1 = a - b;
    let e2 = c - b;
    e1.cross(&e2).try_normalize(f32::EPSILON)
}

/// FOV test and perspective divide in one pass.
///
/// `p` is in camera space: `x` is depth measured from the focus plane,
/// positive toward the eye, which sits at `x = d`. Returns `None` for points
/// at or behind the eye or outside the tangent cone. On success the lateral
/// axes are divided by the remaining depth and `x` is returned untouched,
/// for use as the fog and sort key.
pub fn fov_project(p: &Vector3<f32>, d: f32) -> Option<Vector3<f32>> {
    if p.x >= d {
        return None;
    }

    let scale = d - p.x;
    let ty = p.y / scale;
    let tz = p.z / scale;
    if ty * ty > TAN_LIMIT_SQ || tz * tz > TAN_LIMIT_SQ {
        return None;
    }

    Some(Vector3::new(p.x, ty, tz))
}
