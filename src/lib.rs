//! # Orbitview
//!
//! **Look at one textured mesh from every side, at a size that never changes.**
//!
//! Orbitview opens a window, imports the first mesh of an STL or glTF file,
//! shades it with four material maps and lets you drag to spin it. However
//! the window is resized, the mesh's largest extent stays at 45% of the
//! smaller window side.
//!
//! ## Quick Start
//!
//! ```no_run
//! use orbitview::*;
//!
//! fn main() -> Result<(), ViewerError> {
//!     run(ViewerConfig::new()
//!         .title("Bunny")
//!         .size(1280, 720)
//!         .model("assets/bunny.stl"))
//! }
//! ```
//!
//! ## Headless use
//!
//! Nothing in the camera, scale or transform code needs a window. Drive a
//! [`ViewerState`] with [`ViewerEvent`]s and read the matrices back:
//!
//! ```
//! use orbitview::*;
//!
//! let bounds = BoundingBox::from_positions([Vec3::splat(-1.0), Vec3::splat(1.0)]);
//! let mut state = ViewerState::new(bounds, ViewportState::new(800, 600), SceneConstants::default());
//!
//! state.apply(ViewerEvent::PointerPress { x: 10.0, y: 10.0 });
//! state.apply(ViewerEvent::PointerMove { x: 40.0, y: 10.0 });
//!
//! let frame = state.frame_transforms();
//! assert!(frame.model.transform_point3(bounds.center()).length() < 1e-5);
//! ```
//!
//! ## Layout
//!
//! - [`math`] builds the matrices, [`BoundingBox`] measures the mesh.
//! - [`OrbitCamera`] turns pointer drags into yaw and pitch.
//! - [`frame_transforms`] combines both with the adaptive scale.
//! - [`geometry`] imports meshes; [`MaterialTextures`] and [`MeshPass`] put them on screen.

mod adaptive_scale;
mod app;
mod bounds;
mod config;
mod error;
pub mod geometry;
mod gpu;
mod input;
pub mod math;
mod mesh;
mod mesh_pass;
mod orbit_camera;
mod texture;
mod transform;

pub use adaptive_scale::{adaptive_scale, projection_factor, scene_scale};
pub use app::{LoopState, ViewerState, run};
pub use bounds::BoundingBox;
pub use config::{SceneConstants, TexturePaths, ViewerConfig};
pub use error::ViewerError;
pub use geometry::{ImportError, RawGeometry, import_first_mesh};
pub use gpu::GpuContext;
pub use input::{InputQueue, ViewerEvent};
pub use mesh::{Mesh, Vertex3d};
pub use mesh_pass::{MeshPass, ViewerUniforms};
pub use orbit_camera::{DragState, OrbitCamera};
pub use texture::{ColorSpace, MaterialTextures, Texture};
pub use transform::{FrameTransforms, ViewportState, frame_transforms};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec2, Vec3};
