//! [`RenderBackend`] on wgpu.
//!
//! Draw calls made between `begin_frame` and `end_frame` are prepared
//! immediately (uniforms and bind groups) and recorded into one render
//! pass that is encoded and submitted in `end_frame`. The pass loads the
//! existing color contents, clears depth, and is restricted to the frame's
//! pixel viewport.

use bevy_ecs::world::World;
use glam::{Vec2, Vec3};
use nebula_viewport::{Billboard, FrameMatrices, PixelRect, RenderBackend};

use crate::billboard_pipeline::{BillboardPipeline, PreparedBillboard};
use crate::cubemap::{CubemapFaces, DEFAULT_FACE_SIZE, DEFAULT_STAR_COUNT, GpuCubemap};
use crate::depth::DepthBuffer;
use crate::dust_pipeline::DustPipeline;
use crate::gpu::{DEFAULT_COLOR_FORMAT, GpuContext, RenderError};
use crate::skybox_pipeline::{PreparedSkybox, SkyboxPipeline};
use crate::target::OffscreenTarget;

/// World-geometry pipeline hooked into the viewport pass.
pub trait ScenePass {
    /// Upload whatever the scene needs for this frame.
    fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        world: &mut World,
        matrices: &FrameMatrices,
    );

    /// Record draws into the viewport pass, after the skybox.
    fn draw(&self, pass: &mut wgpu::RenderPass<'_>);
}

enum DrawOp {
    Skybox(PreparedSkybox),
    Scene,
    Dust(wgpu::BindGroup),
    Billboard(PreparedBillboard),
}

enum ColorTarget {
    Offscreen(OffscreenTarget),
    External {
        view: wgpu::TextureView,
        width: u32,
        height: u32,
    },
}

impl ColorTarget {
    fn view(&self) -> &wgpu::TextureView {
        match self {
            Self::Offscreen(target) => &target.view,
            Self::External { view, .. } => view,
        }
    }

    fn size(&self) -> (u32, u32) {
        match self {
            Self::Offscreen(target) => (target.width(), target.height()),
            Self::External { width, height, .. } => (*width, *height),
        }
    }
}

/// Viewport backend drawing with wgpu.
pub struct WgpuBackend {
    gpu: GpuContext,
    color_format: wgpu::TextureFormat,
    color: ColorTarget,
    depth: DepthBuffer,
    skybox: SkyboxPipeline,
    dust: DustPipeline,
    billboards: BillboardPipeline,
    scene: Option<Box<dyn ScenePass>>,
    clear_color: Option<wgpu::Color>,
    viewport: Option<PixelRect>,
    ops: Vec<DrawOp>,
    face_size: u32,
    frames_submitted: u64,
}

impl WgpuBackend {
    /// Create a backend rendering into a new `width` x `height` offscreen target.
    pub fn new(gpu: GpuContext, width: u32, height: u32) -> Result<Self, RenderError> {
        let color_format = DEFAULT_COLOR_FORMAT;
        let target = OffscreenTarget::new(&gpu.device, width, height, color_format)?;
        let depth = DepthBuffer::new(&gpu.device, width, height);
        let skybox = SkyboxPipeline::new(&gpu.device, color_format);
        let dust = DustPipeline::new(&gpu.device, color_format);
        let billboards = BillboardPipeline::new(&gpu.device, &gpu.queue, color_format);
        log::info!("Viewport backend ready: {width}x{height} {color_format:?}");

        Ok(Self {
            gpu,
            color_format,
            color: ColorTarget::Offscreen(target),
            depth,
            skybox,
            dust,
            billboards,
            scene: None,
            clear_color: None,
            viewport: None,
            ops: Vec::new(),
            face_size: DEFAULT_FACE_SIZE,
            frames_submitted: 0,
        })
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }

    /// Render into `view` from now on. It must use [`Self::color_format`].
    pub fn set_color_target(
        &mut self,
        view: wgpu::TextureView,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidTargetSize { width, height });
        }
        self.depth.resize(&self.gpu.device, width, height);
        self.color = ColorTarget::External {
            view,
            width,
            height,
        };
        Ok(())
    }

    /// Attach the world-geometry pass.
    pub fn set_scene_pass(&mut self, scene: Box<dyn ScenePass>) {
        self.scene = Some(scene);
    }

    /// Clear color applied when the pass starts; `None` keeps existing contents.
    pub fn set_clear_color(&mut self, color: Option<wgpu::Color>) {
        self.clear_color = color;
    }

    /// Edge length used for procedurally generated skybox faces.
    pub fn set_skybox_face_size(&mut self, face_size: u32) {
        self.face_size = face_size.max(1);
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    /// Read the offscreen target back as RGBA8; `None` for external targets.
    pub fn read_pixels(&self) -> Option<Vec<u8>> {
        match &self.color {
            ColorTarget::Offscreen(target) => target.read_rgba8(&self.gpu.device, &self.gpu.queue),
            ColorTarget::External { .. } => None,
        }
    }

    fn encode_and_submit(&mut self, viewport: PixelRect) {
        let ops = std::mem::take(&mut self.ops);
        let (width, height) = self.color.size();
        let Some((x, y, w, h)) = clamp_viewport(viewport, width, height) else {
            log::debug!("Viewport {viewport:?} lies outside the {width}x{height} target");
            return;
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("viewport-encoder"),
            });
        {
            let load = match self.clear_color {
                Some(color) => wgpu::LoadOp::Clear(color),
                None => wgpu::LoadOp::Load,
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("viewport-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.color.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(DepthBuffer::CLEAR_VALUE),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_viewport(x, y, w, h, 0.0, 1.0);
            pass.set_scissor_rect(x as u32, y as u32, w.ceil() as u32, h.ceil() as u32);

            for op in &ops {
                match op {
                    DrawOp::Skybox(prepared) => self.skybox.draw(&mut pass, prepared),
                    DrawOp::Scene => {
                        if let Some(scene) = &self.scene {
                            scene.draw(&mut pass);
                        }
                    }
                    DrawOp::Dust(bind_group) => self.dust.draw(&mut pass, bind_group),
                    DrawOp::Billboard(prepared) => self.billboards.draw(&mut pass, prepared),
                }
            }
        }
        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        self.frames_submitted += 1;
    }
}

/// Intersect `viewport` with a `width` x `height` target.
///
/// Returns `(x, y, w, h)` in pixels, or `None` when nothing remains.
pub fn clamp_viewport(viewport: PixelRect, width: u32, height: u32) -> Option<(f32, f32, f32, f32)> {
    let x0 = viewport.x.max(0.0).floor();
    let y0 = viewport.y.max(0.0).floor();
    let x1 = (viewport.x + viewport.width).min(width as f32);
    let y1 = (viewport.y + viewport.height).min(height as f32);
    let (w, h) = (x1 - x0, y1 - y0);
    (w >= 1.0 && h >= 1.0).then_some((x0, y0, w.floor(), h.floor()))
}

impl RenderBackend for WgpuBackend {
    type Cubemap = GpuCubemap;

    fn load_cubemap(&mut self, name: &str) -> GpuCubemap {
        let faces = CubemapFaces::for_skybox(name, self.face_size, DEFAULT_STAR_COUNT);
        GpuCubemap::upload(&self.gpu.device, &self.gpu.queue, name, &faces)
    }

    fn allocate_dust(&mut self, signs: &[f32]) {
        self.dust.allocate(&self.gpu.device, signs);
    }

    fn begin_frame(&mut self, viewport: PixelRect) {
        if !self.ops.is_empty() {
            log::warn!("Discarding {} draws from an unfinished frame", self.ops.len());
            self.ops.clear();
        }
        self.viewport = Some(viewport);
    }

    fn draw_skybox(
        &mut self,
        global: &GpuCubemap,
        local: &GpuCubemap,
        blend: f32,
        matrices: &FrameMatrices,
    ) {
        let prepared = self
            .skybox
            .prepare(&self.gpu.device, global, local, blend, matrices);
        self.ops.push(DrawOp::Skybox(prepared));
    }

    fn render_scene(&mut self, world: &mut World, matrices: &FrameMatrices) {
        if let Some(scene) = self.scene.as_mut() {
            scene.prepare(&self.gpu.device, &self.gpu.queue, world, matrices);
            self.ops.push(DrawOp::Scene);
        }
    }

    fn upload_dust_positions(&mut self, positions: &[Vec3]) {
        self.dust.upload(&self.gpu.queue, positions);
    }

    fn draw_dust(&mut self, velocity: Vec2, matrices: &FrameMatrices) {
        if let Some(bind_group) = self.dust.prepare(&self.gpu.device, velocity, matrices) {
            self.ops.push(DrawOp::Dust(bind_group));
        }
    }

    fn draw_billboard(&mut self, billboard: &Billboard, matrices: &FrameMatrices) {
        if let Some(prepared) = self
            .billboards
            .prepare(&self.gpu.device, billboard, matrices)
        {
            self.ops.push(DrawOp::Billboard(prepared));
        }
    }

    fn end_frame(&mut self) {
        match self.viewport.take() {
            Some(viewport) => self.encode_and_submit(viewport),
            None => log::warn!("end_frame without begin_frame"),
        }
    }
}
