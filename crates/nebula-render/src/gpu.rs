//! GPU device initialization.
//!
//! Provides [`GpuContext`], which owns the wgpu instance, adapter, device and
//! queue, and [`RenderError`] for diagnostics when initialization fails.
//! The viewport renders into textures it is handed, so no surface is created
//! here.

/// Error type for GPU initialization and render-target setup failures.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    /// Failed to request GPU device.
    #[error("failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// A render target was requested with a zero dimension.
    #[error("render target dimensions must be non-zero, got {width}x{height}")]
    InvalidTargetSize { width: u32, height: u32 },
}

/// Owns the GPU device and queue.
pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Initialize a device without a presentation surface.
    pub async fn new_headless() -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!(
            "Selected GPU: {} ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("nebula-viewport-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }
}

/// Initialize a headless GPU context synchronously using `pollster`.
pub fn init_headless_blocking() -> Result<GpuContext, RenderError> {
    pollster::block_on(GpuContext::new_headless())
}

/// Preferred color format for offscreen viewport targets.
pub const DEFAULT_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Create a test GPU device and queue. Returns `None` if no GPU is available.
#[cfg(test)]
pub(crate) fn create_test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;

        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_failure() {
        assert_eq!(
            RenderError::NoAdapter.to_string(),
            "no compatible GPU adapter found"
        );
        assert_eq!(
            RenderError::InvalidTargetSize {
                width: 0,
                height: 720
            }
            .to_string(),
            "render target dimensions must be non-zero, got 0x720"
        );
    }

    #[test]
    fn test_default_color_format_is_srgb() {
        assert!(DEFAULT_COLOR_FORMAT.is_srgb());
    }

    #[test]
    fn test_headless_context_or_no_adapter() {
        match init_headless_blocking() {
            Ok(ctx) => {
                let limits = ctx.device.limits();
                assert!(limits.max_texture_dimension_2d >= 2048);
            }
            Err(err) => assert!(
                matches!(err, RenderError::NoAdapter | RenderError::DeviceRequest(_)),
                "unexpected error {err}"
            ),
        }
    }
}
