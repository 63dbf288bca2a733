//! wgpu backend for the viewport: procedural skybox cubemaps, the blended
//! skybox pass, the dust line pass, billboards and offscreen targets.

pub mod backend;
pub mod billboard_pipeline;
pub mod cubemap;
pub mod depth;
pub mod dust_pipeline;
pub mod gpu;
pub mod skybox_pipeline;
pub mod target;

pub use backend::{ScenePass, WgpuBackend, clamp_viewport};
pub use cubemap::{CubemapFaces, GpuCubemap, seed_for_name};
pub use depth::DepthBuffer;
pub use gpu::{DEFAULT_COLOR_FORMAT, GpuContext, RenderError, init_headless_blocking};
pub use target::OffscreenTarget;
