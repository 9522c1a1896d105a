//! Viewport-relative model scaling.
//!
//! One world unit at the eye distance projects to
//! `(height / 2) / (tan(fov_y / 2) * eye_distance)` pixels, whatever the
//! window's width. Dividing the wanted pixel size of the model's largest
//! extent by that factor gives a uniform scale that pins the model to a fixed
//! share of the viewport's *smaller* side, through any resize or aspect change.
//!
//! The result depends on the viewport and is recomputed every frame.

use crate::config::SceneConstants;

/// Pixels covered by one world unit at `eye_distance` in front of the camera.
pub fn projection_factor(viewport_height: f32, fov_y: f32, eye_distance: f32) -> f32 {
    (viewport_height / 2.0) / ((fov_y / 2.0).tan() * eye_distance)
}

/// Uniform scale that makes an object of `characteristic_size` project to
/// `target_fraction * min(width, height)` pixels.
pub fn adaptive_scale(
    width: f32,
    height: f32,
    characteristic_size: f32,
    eye_distance: f32,
    fov_y: f32,
    target_fraction: f32,
) -> f32 {
    let min_dimension = width.min(height);
    let desired_screen_size = target_fraction * min_dimension;
    let factor = projection_factor(height, fov_y, eye_distance);
    desired_screen_size / (characteristic_size * factor)
}

/// [`adaptive_scale`] with the viewer's fixed scene parameters.
pub fn scene_scale(width: u32, height: u32, characteristic_size: f32, scene: &SceneConstants) -> f32 {
    adaptive_scale(
        width as f32,
        height as f32,
        characteristic_size,
        scene.eye_distance(),
        scene.fov_y,
        scene.target_fraction,
    )
}
