//! Camera-facing textured quads (the target reticle).
//!
//! The vertex shader expands each quad corner along the camera's right and
//! up axes, so the quad always faces the viewer regardless of its model
//! rotation. Textures are looked up by name; the reticle texture is baked
//! procedurally at startup.

use std::collections::HashMap;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use nebula_viewport::reticle::{RETICLE_INDICES, RETICLE_TEXTURE, RETICLE_UVS};
use nebula_viewport::{Billboard, FrameMatrices};
use wgpu::util::DeviceExt;

use crate::depth::DepthBuffer;

/// Edge length of the baked reticle texture.
pub const RETICLE_TEXTURE_SIZE: u32 = 64;

/// Per-billboard uniform.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BillboardUniform {
    pub view_proj: [[f32; 4]; 4],
    /// World-space camera right; `w` is the quad size.
    pub right_size: [f32; 4],
    pub up: [f32; 4],
    pub center: [f32; 4],
    pub tint: [f32; 4],
}

impl BillboardUniform {
    pub fn new(billboard: &Billboard, matrices: &FrameMatrices) -> Self {
        let right = matrices.view.row(0).truncate();
        let up = matrices.view.row(1).truncate();
        let center = billboard.model.transform_point3(Vec3::ZERO);
        Self {
            view_proj: matrices.view_projection().to_cols_array_2d(),
            right_size: right.extend(billboard.size).to_array(),
            up: up.extend(0.0).to_array(),
            center: center.extend(1.0).to_array(),
            tint: billboard.tint.extend(1.0).to_array(),
        }
    }
}

/// WGSL shader source for billboards.
pub const BILLBOARD_SHADER_SOURCE: &str = r#"
struct BillboardUniform {
    view_proj: mat4x4<f32>,
    right_size: vec4<f32>,
    up: vec4<f32>,
    center: vec4<f32>,
    tint: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> quad: BillboardUniform;

@group(1) @binding(0)
var quad_texture: texture_2d<f32>;
@group(1) @binding(1)
var quad_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_billboard(@location(0) uv: vec2<f32>) -> VertexOutput {
    let size = quad.right_size.w;
    let offset = quad.right_size.xyz * (uv.x - 0.5) * size + quad.up.xyz * (0.5 - uv.y) * size;
    var out: VertexOutput;
    out.position = quad.view_proj * vec4<f32>(quad.center.xyz + offset, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_billboard(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(quad_texture, quad_sampler, in.uv);
    return vec4<f32>(color.rgb * quad.tint.rgb, color.a * quad.tint.a);
}
"#;

/// Bind groups for one billboard draw.
pub struct PreparedBillboard {
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group: Arc<wgpu::BindGroup>,
    depth_test: bool,
}

/// Billboard pipelines (depth-tested and overlay) with a named texture table.
pub struct BillboardPipeline {
    depth_tested: wgpu::RenderPipeline,
    overlay: wgpu::RenderPipeline,
    uniform_bgl: wgpu::BindGroupLayout,
    texture_bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    textures: HashMap<String, Arc<wgpu::BindGroup>>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

impl BillboardPipeline {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("billboard-shader"),
            source: wgpu::ShaderSource::Wgsl(BILLBOARD_SHADER_SOURCE.into()),
        });

        let uniform_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("billboard-uniform-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<BillboardUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("billboard-texture-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("billboard-pipeline-layout"),
            bind_group_layouts: &[&uniform_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let build = |label: &str, compare: wgpu::CompareFunction| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_billboard"),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                    }],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(DepthBuffer::stencil_state(false, compare)),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_billboard"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview_mask: None,
                cache: None,
            })
        };
        let depth_tested = build("billboard-pipeline", DepthBuffer::COMPARE_FUNCTION);
        let overlay = build("billboard-overlay-pipeline", wgpu::CompareFunction::Always);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("billboard-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("billboard-uvs"),
            contents: bytemuck::cast_slice(&RETICLE_UVS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("billboard-indices"),
            contents: bytemuck::cast_slice(&RETICLE_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let mut pipeline = Self {
            depth_tested,
            overlay,
            uniform_bgl,
            texture_bgl,
            sampler,
            textures: HashMap::new(),
            vertex_buffer,
            index_buffer,
        };
        pipeline.register_texture(
            device,
            queue,
            RETICLE_TEXTURE,
            &reticle_pixels(RETICLE_TEXTURE_SIZE),
            RETICLE_TEXTURE_SIZE,
            RETICLE_TEXTURE_SIZE,
        );
        pipeline
    }

    /// Make an RGBA8 texture available to billboards under `name`.
    pub fn register_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: None,
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{name}-bind-group")),
            layout: &self.texture_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.textures.insert(name.to_string(), Arc::new(bind_group));
        log::info!("Registered billboard texture '{name}' ({width}x{height})");
    }

    pub fn has_texture(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    /// Bind groups for `billboard`, or `None` if its texture is unknown.
    pub fn prepare(
        &self,
        device: &wgpu::Device,
        billboard: &Billboard,
        matrices: &FrameMatrices,
    ) -> Option<PreparedBillboard> {
        let Some(texture_bind_group) = self.textures.get(billboard.texture) else {
            log::warn!("Billboard texture '{}' is not registered", billboard.texture);
            return None;
        };
        let uniform = BillboardUniform::new(billboard, matrices);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("billboard-uniform"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("billboard-uniform-bg"),
            layout: &self.uniform_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Some(PreparedBillboard {
            uniform_bind_group,
            texture_bind_group: Arc::clone(texture_bind_group),
            depth_test: billboard.depth_test,
        })
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, prepared: &PreparedBillboard) {
        let pipeline = if prepared.depth_test {
            &self.depth_tested
        } else {
            &self.overlay
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &prepared.uniform_bind_group, &[]);
        pass.set_bind_group(1, &*prepared.texture_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..RETICLE_INDICES.len() as u32, 0, 0..1);
    }
}

/// White ring with four inward ticks on a transparent background.
pub fn reticle_pixels(size: u32) -> Vec<u8> {
    let mut pixels = vec![0u8; (size * size * 4) as usize];
    let half = size as f32 * 0.5;
    let outer = half * 0.95;
    let inner = half * 0.85;
    let tick = half * 0.04;

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - half;
            let dy = y as f32 + 0.5 - half;
            let r = (dx * dx + dy * dy).sqrt();
            let on_ring = (inner..=outer).contains(&r);
            let on_tick = r >= half * 0.6
                && r < inner
                && (dx.abs() <= tick || dy.abs() <= tick);
            if on_ring || on_tick {
                let i = ((y * size + x) * 4) as usize;
                pixels[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
            }
        }
    }
    pixels
}
