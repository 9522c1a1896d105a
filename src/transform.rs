use glam::{Mat4, Vec3};

use crate::adaptive_scale;
use crate::bounds::BoundingBox;
use crate::config::SceneConstants;
use crate::math;
use crate::orbit_camera::OrbitCamera;

/// Current framebuffer size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewportState {
    pub width: u32,
    pub height: u32,
}

impl ViewportState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Record a new framebuffer size. Zero-sized dimensions (a minimized
    /// window) are ignored so the aspect ratio stays finite.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.width = width;
            self.height = height;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// The three matrices uploaded for a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTransforms {
    pub model: Mat4,
    pub view: Mat4,
    pub proj: Mat4,
    /// Uniform scale folded into `model`.
    pub scale: f32,
}

/// Builds model, view and projection for one frame.
///
/// The model matrix centers the mesh on its bounding box, rotates it about
/// that center and then applies the adaptive scale: `S * R * T`.
pub fn frame_transforms(
    bounds: &BoundingBox,
    orbit: &OrbitCamera,
    viewport: ViewportState,
    scene: &SceneConstants,
) -> FrameTransforms {
    let s = adaptive_scale::scene_scale(viewport.width, viewport.height, bounds.size(), scene);
    let center = bounds.center();

    let scale = math::scale(s, s, s);
    let rotation = orbit.rotation();
    let to_origin = math::translation(-center.x, -center.y, -center.z);
    let model = math::multiply(scale, math::multiply(rotation, to_origin));

    let view = math::look_at(scene.eye, Vec3::ZERO, scene.up);
    let proj = math::perspective(scene.fov_y, viewport.aspect(), scene.near, scene.far);

    FrameTransforms {
        model,
        view,
        proj,
        scale: s,
    }
}

impl FrameTransforms {
    /// Inverse transpose of the model matrix, for transforming normals.
    pub fn normal_matrix(&self) -> Mat4 {
        self.model.inverse().transpose()
    }

    /// Projects a model-space point to window pixels (origin top-left).
    pub fn project_to_pixels(&self, point: Vec3, viewport: ViewportState) -> Vec3 {
        let clip = self.proj * self.view * self.model * point.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        Vec3::new(
            (ndc.x + 1.0) * 0.5 * viewport.width as f32,
            (1.0 - ndc.y) * 0.5 * viewport.height as f32,
            ndc.z,
        )
    }
}
