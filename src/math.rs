//! 4x4 homogeneous transform construction and composition.
//!
//! All matrices are [`glam::Mat4`] in column-major order and transform column
//! vectors (`p' = M * p`). The constructors here pin down the exact conventions
//! the viewer relies on:
//!
//! - [`look_at`] is right-handed: the camera looks down its local -Z.
//! - [`perspective`] maps view depth to the OpenGL clip range `[-1, 1]`.
//!   The vertex shader remaps that range to wgpu's `[0, 1]` on the GPU.
//! - [`rotation_from_yaw_pitch`] composes `Ry * Rx`, so pitch is applied in
//!   the object's local frame and yaw then turns that frame about world +Y.
//!
//! # Example
//!
//! ```
//! use orbitview::math;
//! use glam::Vec3;
//!
//! let model = math::multiply(
//!     math::scale(2.0, 2.0, 2.0),
//!     math::translation(-1.0, 0.0, 0.0),
//! );
//! let p = model.transform_point3(Vec3::new(1.0, 0.0, 0.0));
//! assert_eq!(p, Vec3::ZERO);
//! ```

use glam::{Mat4, Vec3, Vec4};

/// The identity transform.
pub fn identity() -> Mat4 {
    Mat4::IDENTITY
}

/// A diagonal scale with the homogeneous element left at 1.
pub fn scale(sx: f32, sy: f32, sz: f32) -> Mat4 {
    Mat4::from_scale(Vec3::new(sx, sy, sz))
}

/// Identity with the translation column set to `(tx, ty, tz)`.
pub fn translation(tx: f32, ty: f32, tz: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(tx, ty, tz))
}

/// Builds `Ry(yaw) * Rx(pitch)`. Both angles are in radians.
///
/// The order matters: swapping it changes how combined horizontal and
/// vertical drags feel, because pitch would then be applied about the world
/// X axis after yaw instead of about the object's own X axis.
pub fn rotation_from_yaw_pitch(pitch: f32, yaw: f32) -> Mat4 {
    let (sx, cx) = pitch.sin_cos();
    let (sy, cy) = yaw.sin_cos();

    let rx = Mat4::from_cols(
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, cx, sx, 0.0),
        Vec4::new(0.0, -sx, cx, 0.0),
        Vec4::W,
    );
    let ry = Mat4::from_cols(
        Vec4::new(cy, 0.0, -sy, 0.0),
        Vec4::Y,
        Vec4::new(sy, 0.0, cy, 0.0),
        Vec4::W,
    );

    multiply(ry, rx)
}

/// Right-handed view matrix looking from `eye` towards `target`.
///
/// The basis rows are `right`, `true_up` and `-forward`; the translation
/// column holds `-dot(row, eye)` for each of them.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let forward = (target - eye).normalize();
    let right = forward.cross(up).normalize();
    let true_up = right.cross(forward);

    Mat4::from_cols(
        Vec4::new(right.x, true_up.x, -forward.x, 0.0),
        Vec4::new(right.y, true_up.y, -forward.y, 0.0),
        Vec4::new(right.z, true_up.z, -forward.z, 0.0),
        Vec4::new(-right.dot(eye), -true_up.dot(eye), forward.dot(eye), 1.0),
    )
}

/// Right-handed perspective projection with OpenGL's `[-1, 1]` depth range.
///
/// `fov_y` is the full vertical field of view in radians.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fov_y / 2.0).tan();
    let nf = 1.0 / (near - far);

    Mat4::from_cols(
        Vec4::new(f / aspect, 0.0, 0.0, 0.0),
        Vec4::new(0.0, f, 0.0, 0.0),
        Vec4::new(0.0, 0.0, (far + near) * nf, -1.0),
        Vec4::new(0.0, 0.0, 2.0 * far * near * nf, 0.0),
    )
}

/// Matrix product: the result transforms `p` as `a * (b * p)`.
pub fn multiply(a: Mat4, b: Mat4) -> Mat4 {
    a * b
}
