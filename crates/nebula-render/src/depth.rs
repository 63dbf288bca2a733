//! Depth buffer for the viewport pass.
//!
//! Standard 0..1 depth: the near plane maps to 0.0 and the far plane to 1.0.
//! The skybox is drawn at the far plane, so depth tests use `LessEqual`.

/// Depth attachment sized to the color target.
pub struct DepthBuffer {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl DepthBuffer {
    /// 32-bit float depth.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Cleared to the far plane at the start of every viewport frame.
    pub const CLEAR_VALUE: f32 = 1.0;

    /// Fragments at the far plane still pass, so the skybox survives the clear.
    pub const COMPARE_FUNCTION: wgpu::CompareFunction = wgpu::CompareFunction::LessEqual;

    /// Create a new depth buffer with the specified dimensions.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("viewport-depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Resize the depth buffer. No-op if dimensions are unchanged.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }
        *self = Self::new(device, width, height);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth state for pipelines drawn in the viewport pass.
    pub fn stencil_state(write: bool, compare: wgpu::CompareFunction) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: Self::FORMAT,
            depth_write_enabled: write,
            depth_compare: compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;

    #[test]
    fn test_clear_value_is_far_plane() {
        assert_eq!(DepthBuffer::CLEAR_VALUE, 1.0);
    }

    #[test]
    fn test_compare_accepts_far_plane() {
        assert_eq!(
            DepthBuffer::COMPARE_FUNCTION,
            wgpu::CompareFunction::LessEqual
        );
    }

    #[test]
    fn test_stencil_state_passes_through_flags() {
        let state = DepthBuffer::stencil_state(false, wgpu::CompareFunction::Always);
        assert!(!state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Always);
        assert_eq!(state.format, DepthBuffer::FORMAT);
    }

    #[test]
    fn test_resize_updates_dimensions() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let mut depth = DepthBuffer::new(&device, 800, 600);
        depth.resize(&device, 1920, 1080);
        assert_eq!((depth.width(), depth.height()), (1920, 1080));
        assert!(
            depth
                .texture
                .usage()
                .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
        );
    }
}
