use std::path::Path;

use image::RgbaImage;
use image::error::{LimitError, LimitErrorKind};
use image::imageops::FilterType;

use crate::config::TexturePaths;
use crate::error::ViewerError;
use crate::gpu::GpuContext;

/// How texel values should be interpreted by the sampler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    /// Color data; the GPU converts from sRGB to linear on sampling.
    Srgb,
    /// Raw data such as normals, roughness or occlusion.
    Linear,
}

impl ColorSpace {
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// A GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
}

impl Texture {
    /// Create a texture from a decoded RGBA image, uploading a full mip chain.
    pub fn from_image(gpu: &GpuContext, image: &RgbaImage, space: ColorSpace, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let (width, height) = image.dimensions();
        let chain = mip_chain(image);
        let mip_levels = chain.len() as u32;
        let data: Vec<u8> = chain.iter().flat_map(|level| level.as_raw().iter().copied()).collect();

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: mip_levels,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: space.format(),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            width,
            height,
            mip_levels,
        }
    }

    /// Load a texture from an image file.
    pub fn from_file(gpu: &GpuContext, path: &Path, space: ColorSpace) -> Result<Self, ViewerError> {
        let img = decode(path)?;
        check_dimensions(path, &img, gpu.device.limits().max_texture_dimension_2d)?;
        tracing::debug!(
            path = %path.display(),
            width = img.width(),
            height = img.height(),
            ?space,
            "decoded texture"
        );
        Ok(Self::from_image(gpu, &img, space, &path.display().to_string()))
    }
}

/// Decodes an image file to RGBA8, tagging failures with the file name.
pub fn decode(path: &Path) -> Result<RgbaImage, ViewerError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| ViewerError::TextureLoad {
            path: path.to_path_buf(),
            source,
        })
}

/// Rejects images the device cannot hold as a single 2D texture.
pub fn check_dimensions(path: &Path, img: &RgbaImage, max_dimension: u32) -> Result<(), ViewerError> {
    if img.width() <= max_dimension && img.height() <= max_dimension {
        return Ok(());
    }
    tracing::warn!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        max_dimension,
        "texture exceeds device limit"
    );
    Err(ViewerError::TextureLoad {
        path: path.to_path_buf(),
        source: image::ImageError::Limits(LimitError::from_kind(LimitErrorKind::DimensionError)),
    })
}

/// Full mip chain down to 1x1, level 0 first.
pub fn mip_chain(image: &RgbaImage) -> Vec<RgbaImage> {
    let mut levels = vec![image.clone()];
    let (mut w, mut h) = image.dimensions();

    while w > 1 || h > 1 {
        w = (w / 2).max(1);
        h = (h / 2).max(1);
        let next = image::imageops::resize(levels.last().unwrap_or(image), w, h, FilterType::Triangle);
        levels.push(next);
    }

    levels
}

/// The four material maps the mesh is shaded with.
#[derive(Debug)]
pub struct MaterialTextures {
    pub diffuse: Texture,
    pub normal: Texture,
    pub roughness: Texture,
    pub ambient_occlusion: Texture,
    /// Trilinear, repeating sampler shared by all four maps.
    pub(crate) sampler: wgpu::Sampler,
}

impl MaterialTextures {
    /// Decodes and uploads all four maps. The first failure aborts loading.
    pub fn load(gpu: &GpuContext, paths: &TexturePaths) -> Result<Self, ViewerError> {
        let diffuse = Texture::from_file(gpu, &paths.diffuse, ColorSpace::Srgb)?;
        let normal = Texture::from_file(gpu, &paths.normal, ColorSpace::Linear)?;
        let roughness = Texture::from_file(gpu, &paths.roughness, ColorSpace::Linear)?;
        let ambient_occlusion = Texture::from_file(gpu, &paths.ambient_occlusion, ColorSpace::Linear)?;

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        tracing::info!("loaded 4 material textures");

        Ok(Self {
            diffuse,
            normal,
            roughness,
            ambient_occlusion,
            sampler,
        })
    }
}
