//! Space-dust pass: independent line segments streaked by ship velocity.
//!
//! Endpoint positions live in one fixed vertex buffer sized at allocation;
//! the per-vertex sign lives in a second buffer written once. The shader
//! offsets each vertex by `velocity * sign`, turning each collapsed segment
//! into a streak along the direction of travel.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use nebula_viewport::FrameMatrices;
use wgpu::util::DeviceExt;

use crate::depth::DepthBuffer;

/// Per-frame dust uniform.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DustUniform {
    pub view_proj: [[f32; 4]; 4],
    /// `xy` is the streak vector.
    pub velocity: [f32; 4],
}

impl DustUniform {
    pub fn new(matrices: &FrameMatrices, velocity: Vec2) -> Self {
        Self {
            view_proj: matrices.view_projection().to_cols_array_2d(),
            velocity: [velocity.x, velocity.y, 0.0, 0.0],
        }
    }
}

/// WGSL shader source for the dust pass.
pub const DUST_SHADER_SOURCE: &str = r#"
struct DustUniform {
    view_proj: mat4x4<f32>,
    velocity: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> dust: DustUniform;

@vertex
fn vs_dust(@location(0) position: vec3<f32>, @location(1) sign: f32) -> @builtin(position) vec4<f32> {
    let streaked = position + vec3<f32>(dust.velocity.xy * sign, 0.0);
    return dust.view_proj * vec4<f32>(streaked, 1.0);
}

@fragment
fn fs_dust() -> @location(0) vec4<f32> {
    return vec4<f32>(0.7, 0.7, 0.7, 0.6);
}
"#;

/// Pipeline and vertex storage for the dust field.
pub struct DustPipeline {
    pipeline: wgpu::RenderPipeline,
    uniform_bgl: wgpu::BindGroupLayout,
    buffers: Option<DustBuffers>,
}

struct DustBuffers {
    positions: wgpu::Buffer,
    signs: wgpu::Buffer,
    vertex_count: u32,
}

impl DustPipeline {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("dust-shader"),
            source: wgpu::ShaderSource::Wgsl(DUST_SHADER_SOURCE.into()),
        });

        let uniform_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("dust-uniform-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<DustUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("dust-pipeline-layout"),
            bind_group_layouts: &[&uniform_bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("dust-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_dust"),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<f32>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![1 => Float32],
                    },
                ],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(DepthBuffer::stencil_state(
                false,
                DepthBuffer::COMPARE_FUNCTION,
            )),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_dust"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_bgl,
            buffers: None,
        }
    }

    /// Allocate the position buffer (zeroed) and upload the signs.
    ///
    /// An empty field allocates nothing and never draws.
    pub fn allocate(&mut self, device: &wgpu::Device, signs: &[f32]) {
        if signs.is_empty() {
            self.buffers = None;
            return;
        }
        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("dust-positions"),
            contents: bytemuck::cast_slice(&vec![[0.0f32; 3]; signs.len()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let sign_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("dust-signs"),
            contents: bytemuck::cast_slice(signs),
            usage: wgpu::BufferUsages::VERTEX,
        });
        log::debug!("Allocated dust buffers for {} vertices", signs.len());
        self.buffers = Some(DustBuffers {
            positions,
            signs: sign_buffer,
            vertex_count: signs.len() as u32,
        });
    }

    /// Number of allocated endpoint vertices.
    pub fn vertex_count(&self) -> u32 {
        self.buffers.as_ref().map_or(0, |b| b.vertex_count)
    }

    /// Overwrite the endpoint positions. Extra positions beyond the allocation are dropped.
    pub fn upload(&self, queue: &wgpu::Queue, positions: &[Vec3]) {
        let Some(buffers) = &self.buffers else {
            return;
        };
        let count = positions.len().min(buffers.vertex_count as usize);
        let packed: Vec<[f32; 3]> = positions[..count].iter().map(|p| p.to_array()).collect();
        queue.write_buffer(&buffers.positions, 0, bytemuck::cast_slice(&packed));
    }

    /// Bind group for one frame's dust draw, or `None` with nothing allocated.
    pub fn prepare(
        &self,
        device: &wgpu::Device,
        velocity: Vec2,
        matrices: &FrameMatrices,
    ) -> Option<wgpu::BindGroup> {
        self.buffers.as_ref()?;
        let uniform = DustUniform::new(matrices, velocity);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("dust-uniform"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("dust-uniform-bg"),
            layout: &self.uniform_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        }))
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, bind_group: &wgpu::BindGroup) {
        let Some(buffers) = &self.buffers else {
            return;
        };
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, buffers.positions.slice(..));
        pass.set_vertex_buffer(1, buffers.signs.slice(..));
        pass.draw(0..buffers.vertex_count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{DEFAULT_COLOR_FORMAT, create_test_device_queue};
    use nebula_viewport::Camera;

    #[test]
    fn test_uniform_carries_velocity() {
        let matrices = Camera::default().matrices(60.0, 1.0);
        let uniform = DustUniform::new(&matrices, Vec2::new(2.0, -1.0));
        assert_eq!(uniform.velocity, [2.0, -1.0, 0.0, 0.0]);
        assert_eq!(std::mem::size_of::<DustUniform>(), 80);
    }

    #[test]
    fn test_shader_streaks_by_sign() {
        assert!(DUST_SHADER_SOURCE.contains("dust.velocity.xy * sign"));
    }

    #[test]
    fn test_allocation_fixes_vertex_count() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let mut pipeline = DustPipeline::new(&device, DEFAULT_COLOR_FORMAT);
        assert_eq!(pipeline.vertex_count(), 0);
        pipeline.allocate(&device, &[-1.0, 1.0, -1.0, 1.0]);
        assert_eq!(pipeline.vertex_count(), 4);
        // Oversized uploads are truncated to the allocation.
        pipeline.upload(&queue, &[Vec3::ONE; 10]);
        assert!(pipeline.prepare(&device, Vec2::ZERO, &Camera::default().matrices(60.0, 1.0)).is_some());
    }
}
