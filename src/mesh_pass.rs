//! Textured, lit mesh rendering pass with depth testing.
//!
//! [`MeshPass`] owns the pipeline that draws the single viewer mesh. It is
//! built once after the GPU context, the mesh and the material maps exist.
//!
//! # Architecture
//!
//! The pass uses two bind groups:
//! - **Group 0**: Frame uniforms (model, view, projection, normal matrix, light and eye position)
//! - **Group 1**: Material maps (diffuse, normal, roughness, ambient occlusion) and their sampler
//!
//! # Depth Buffer
//!
//! The pass owns a `Depth32Float` buffer that follows the surface size. Call
//! [`MeshPass::ensure_depth_size`] after the surface has been resized.

use crate::config::SceneConstants;
use crate::error::ViewerError;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};
use crate::texture::MaterialTextures;
use crate::transform::FrameTransforms;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Per-frame uniforms, laid out to match `Uniforms` in `viewer.wgsl`.
///
/// The two positions are `vec3<f32>` in WGSL and therefore padded to 16 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewerUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix, for transforming normals.
    pub normal_matrix: [[f32; 4]; 4],
    pub light_pos: [f32; 3],
    _pad0: f32,
    pub view_pos: [f32; 3],
    _pad1: f32,
}

impl ViewerUniforms {
    pub fn new(transforms: &FrameTransforms, scene: &SceneConstants) -> Self {
        Self {
            model: transforms.model.to_cols_array_2d(),
            view: transforms.view.to_cols_array_2d(),
            proj: transforms.proj.to_cols_array_2d(),
            normal_matrix: transforms.normal_matrix().to_cols_array_2d(),
            light_pos: scene.light_position.to_array(),
            _pad0: 0.0,
            view_pos: scene.eye.to_array(),
            _pad1: 0.0,
        }
    }
}

/// Draws one mesh with the four material maps and a single point light.
///
/// # Pipeline Configuration
///
/// - No face culling, since imported meshes do not agree on winding
/// - Opaque output (blending replaces the destination)
/// - Depth write and Less-than comparison
pub struct MeshPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    material_bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl MeshPass {
    /// Compiles the viewer shader and builds the pipeline and bind groups.
    ///
    /// Shader compilation and pipeline validation run inside a validation
    /// error scope. Anything reported there becomes
    /// [`ViewerError::ShaderCompile`] instead of a device panic.
    pub fn new(gpu: &GpuContext, material: &MaterialTextures) -> Result<Self, ViewerError> {
        let device = &gpu.device;

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Viewer Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/viewer.wgsl").into()),
        });

        // Frame uniform buffer (group 0)
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Viewer Uniforms"),
            size: std::mem::size_of::<ViewerUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Viewer Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Viewer Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // Material bind group (group 1): four maps, then the shared sampler
        let map_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let material_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Material Bind Group Layout"),
                entries: &[
                    map_entry(0),
                    map_entry(1),
                    map_entry(2),
                    map_entry(3),
                    wgpu::BindGroupLayoutEntry {
                        binding: 4,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout: &material_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&material.diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&material.normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&material.roughness.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&material.ambient_occlusion.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&material.sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Viewer Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &material_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Viewer Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[Vertex3d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(ViewerError::ShaderCompile {
                label: "viewer.wgsl",
                message: err.to_string(),
            });
        }

        let depth_view = Self::create_depth_view(gpu);
        tracing::debug!(width = gpu.width(), height = gpu.height(), "created viewer pipeline");

        Ok(Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            material_bind_group,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
        })
    }

    fn create_depth_view(gpu: &GpuContext) -> wgpu::TextureView {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Recreates the depth buffer if the surface size changed.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            self.depth_view = Self::create_depth_view(gpu);
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Acquires the next surface image, clears color and depth, and draws the mesh.
    ///
    /// Surface acquisition errors are returned untouched so the caller can
    /// decide between reconfiguring, skipping the frame, or shutting down.
    pub fn draw_frame(
        &mut self,
        gpu: &GpuContext,
        mesh: &Mesh,
        transforms: &FrameTransforms,
        scene: &SceneConstants,
        clear_color: wgpu::Color,
    ) -> Result<(), wgpu::SurfaceError> {
        self.ensure_depth_size(gpu);

        let output = gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Viewer Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Viewer Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.render(gpu, &mut render_pass, mesh, transforms, scene);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Uploads the frame uniforms and records one indexed draw of `mesh`.
    ///
    /// The render pass must have a `Depth32Float` depth attachment.
    pub fn render(
        &self,
        gpu: &GpuContext,
        render_pass: &mut wgpu::RenderPass,
        mesh: &Mesh,
        transforms: &FrameTransforms,
        scene: &SceneConstants,
    ) {
        let uniforms = ViewerUniforms::new(transforms, scene);
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_bind_group(1, &self.material_bind_group, &[]);
        render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::BoundingBox;
    use crate::orbit_camera::OrbitCamera;
    use crate::transform::{ViewportState, frame_transforms};
    use glam::Vec3;

    #[test]
    fn uniforms_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<ViewerUniforms>(), 288);
        assert_eq!(std::mem::offset_of!(ViewerUniforms, light_pos), 256);
        assert_eq!(std::mem::offset_of!(ViewerUniforms, view_pos), 272);
    }

    #[test]
    fn uniforms_carry_scene_positions() {
        let scene = SceneConstants::default();
        let bounds = BoundingBox::from_positions([Vec3::splat(-1.0), Vec3::splat(1.0)]);
        let transforms = frame_transforms(
            &bounds,
            &OrbitCamera::new(),
            ViewportState::new(1000, 800),
            &scene,
        );

        let uniforms = ViewerUniforms::new(&transforms, &scene);
        assert_eq!(uniforms.light_pos, [2.0, 4.0, 3.0]);
        assert_eq!(uniforms.view_pos, scene.eye.to_array());
        assert_eq!(uniforms.model, transforms.model.to_cols_array_2d());
    }
}
