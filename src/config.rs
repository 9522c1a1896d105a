use std::path::PathBuf;

use glam::Vec3;

/// Fixed scene parameters. Nothing here changes at runtime.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConstants {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Camera position. The camera always looks at the world origin.
    pub eye: Vec3,
    pub up: Vec3,
    /// Share of the viewport's smaller side the model's largest extent covers.
    pub target_fraction: f32,
    pub light_position: Vec3,
}

impl Default for SceneConstants {
    fn default() -> Self {
        Self {
            fov_y: std::f32::consts::FRAC_PI_3, // 60 degrees
            near: 0.1,
            far: 100.0,
            eye: Vec3::new(0.0, 0.4, 3.0),
            up: Vec3::Y,
            target_fraction: 0.45,
            light_position: Vec3::new(2.0, 4.0, 3.0),
        }
    }
}

impl SceneConstants {
    /// Depth of the world origin along the view axis.
    pub fn eye_distance(&self) -> f32 {
        self.eye.length()
    }
}

/// Paths of the four material maps bound alongside the mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct TexturePaths {
    /// Base color, sampled as sRGB.
    pub diffuse: PathBuf,
    /// Tangent-space normal map (OpenGL convention), linear.
    pub normal: PathBuf,
    /// Roughness in the red channel, linear.
    pub roughness: PathBuf,
    /// Ambient occlusion in the red channel, linear.
    pub ambient_occlusion: PathBuf,
}

impl Default for TexturePaths {
    fn default() -> Self {
        Self {
            diffuse: "textures/waffle_diffuse.jpg".into(),
            normal: "textures/waffle_normal_ogl.jpg".into(),
            roughness: "textures/waffle_roughness.jpg".into(),
            ambient_occlusion: "textures/waffle_AO.png".into(),
        }
    }
}

/// Configuration for the viewer window and its assets.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub model: PathBuf,
    pub textures: TexturePaths,
    pub clear_color: wgpu::Color,
    pub scene: SceneConstants,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "ohh my waffle".to_string(),
            width: 1000,
            height: 800,
            model: "waffle/waffle.glb".into(),
            textures: TexturePaths::default(),
            clear_color: wgpu::Color {
                r: 0.19,
                g: 0.19,
                b: 0.225,
                a: 1.0,
            },
            scene: SceneConstants::default(),
        }
    }
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn model(mut self, path: impl Into<PathBuf>) -> Self {
        self.model = path.into();
        self
    }

    pub fn textures(mut self, textures: TexturePaths) -> Self {
        self.textures = textures;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scene_matches_viewer_setup() {
        let scene = SceneConstants::default();
        assert!((scene.fov_y.to_degrees() - 60.0).abs() < 1e-4);
        assert_eq!(scene.target_fraction, 0.45);
        assert!((scene.eye_distance() - (0.16f32 + 9.0).sqrt()).abs() < 1e-6);
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = ViewerConfig::new()
            .title("Teapot")
            .size(640, 480)
            .model("teapot.stl");
        assert_eq!(config.title, "Teapot");
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.model, PathBuf::from("teapot.stl"));
        assert_eq!(config.textures, TexturePaths::default());
    }
}
