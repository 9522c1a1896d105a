use std::path::PathBuf;

use crate::geometry::ImportError;

/// Fatal viewer failures. All but [`ViewerError::Render`] happen before the first frame.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Window, surface, adapter or device could not be created.
    #[error("failed to initialize {stage}: {message}")]
    Initialization { stage: &'static str, message: String },

    /// The mesh file yielded no usable mesh.
    #[error("failed to import mesh {}", path.display())]
    Import {
        path: PathBuf,
        #[source]
        source: ImportError,
    },

    /// One of the material maps could not be decoded.
    #[error("failed to load texture {}", path.display())]
    TextureLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// WGSL compilation or pipeline linking reported a validation error.
    #[error("shader {label} failed to compile: {message}")]
    ShaderCompile { label: &'static str, message: String },

    /// The surface could not produce frames and the loop had to stop.
    #[error("rendering failed: {0}")]
    Render(#[source] wgpu::SurfaceError),

    /// The window system's event loop failed.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

impl ViewerError {
    pub(crate) fn init(stage: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Initialization {
            stage,
            message: err.to_string(),
        }
    }
}
