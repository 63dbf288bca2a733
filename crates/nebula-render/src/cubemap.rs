//! Procedural skybox cubemaps.
//!
//! Every skybox name maps to a deterministic starfield: the name is hashed
//! into a seed, stars are scattered on the sky sphere and baked into six
//! faces over a faint nebula tint. The result is uploaded as a cube texture.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Edge length of each generated face.
pub const DEFAULT_FACE_SIZE: u32 = 256;
/// Stars per generated skybox.
pub const DEFAULT_STAR_COUNT: u32 = 6000;

/// A single star on the sky sphere.
#[derive(Clone, Debug)]
pub struct StarPoint {
    /// Unit direction.
    pub direction: Vec3,
    /// Brightness in [0, 1].
    pub brightness: f32,
    /// Linear RGB color.
    pub color: [f32; 3],
}

/// Stable 64-bit FNV-1a hash of a skybox name.
pub fn seed_for_name(name: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    name.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

/// Scatter `count` stars uniformly over the sphere. Deterministic per seed.
pub fn generate_stars(seed: u64, count: u32) -> Vec<StarPoint> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let theta = rng.random::<f32>() * std::f32::consts::TAU;
            let phi = (1.0 - 2.0 * rng.random::<f32>()).acos();
            let direction = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());

            // Many dim stars, few bright ones.
            let brightness = rng.random::<f32>().powf(4.0);
            let color = blackbody_to_rgb(2000.0 + brightness * 28000.0);
            StarPoint {
                direction,
                brightness,
                color,
            }
        })
        .collect()
}

/// Approximate sRGB color of a blackbody at `temperature_k` Kelvin.
pub fn blackbody_to_rgb(temperature_k: f32) -> [f32; 3] {
    let t = temperature_k / 100.0;
    let r = if t <= 66.0 {
        1.0
    } else {
        (329.698_73 * (t - 60.0).powf(-0.133_204_76) / 255.0).clamp(0.0, 1.0)
    };
    let g = if t <= 66.0 {
        (99.470_8 * t.ln() - 161.119_57).clamp(0.0, 255.0) / 255.0
    } else {
        (288.122_17 * (t - 60.0).powf(-0.075_514_85) / 255.0).clamp(0.0, 1.0)
    };
    let b = if t >= 66.0 {
        1.0
    } else if t <= 19.0 {
        0.0
    } else {
        (138.517_73 * (t - 10.0).ln() - 305.044_8).clamp(0.0, 255.0) / 255.0
    };
    [r, g, b]
}

/// Map a direction to a cube face (0=+X, 1=-X, 2=+Y, 3=-Y, 4=+Z, 5=-Z) and UV in [0, 1].
pub fn direction_to_face_uv(dir: Vec3) -> (usize, f32, f32) {
    let abs = dir.abs();
    let (face, u, v) = if abs.x >= abs.y && abs.x >= abs.z {
        if dir.x > 0.0 {
            (0, -dir.z / abs.x, -dir.y / abs.x)
        } else {
            (1, dir.z / abs.x, -dir.y / abs.x)
        }
    } else if abs.y >= abs.z {
        if dir.y > 0.0 {
            (2, dir.x / abs.y, dir.z / abs.y)
        } else {
            (3, dir.x / abs.y, -dir.z / abs.y)
        }
    } else if dir.z > 0.0 {
        (4, dir.x / abs.z, -dir.y / abs.z)
    } else {
        (5, -dir.x / abs.z, -dir.y / abs.z)
    };
    (face, u * 0.5 + 0.5, v * 0.5 + 0.5)
}

/// Six RGBA8 faces ready for upload.
pub struct CubemapFaces {
    pub face_size: u32,
    pub faces: [Vec<u8>; 6],
}

impl CubemapFaces {
    /// Bake the skybox named `name`.
    pub fn for_skybox(name: &str, face_size: u32, star_count: u32) -> Self {
        let seed = seed_for_name(name);
        let tint = nebula_tint(seed);
        Self::bake(&generate_stars(seed, star_count), face_size, tint)
    }

    /// Rasterize `stars` into six faces filled with `background`.
    pub fn bake(stars: &[StarPoint], face_size: u32, background: [f32; 3]) -> Self {
        let pixel_count = (face_size * face_size) as usize;
        let mut faces: [Vec<[f32; 3]>; 6] =
            std::array::from_fn(|_| vec![background; pixel_count]);

        let max = face_size as f32 - 1.0;
        for star in stars {
            let (face, u, v) = direction_to_face_uv(star.direction);
            let px = (u * face_size as f32).min(max) as u32;
            let py = (v * face_size as f32).min(max) as u32;
            let pixel = &mut faces[face][(py * face_size + px) as usize];
            let gain = star.brightness * 8.0 + 0.4;
            for (channel, color) in pixel.iter_mut().zip(star.color) {
                *channel = (*channel + color * gain).min(1.0);
            }
        }

        let faces: [Vec<u8>; 6] = faces.map(|face| {
            face.iter()
                .flat_map(|[r, g, b]| [to_u8(*r), to_u8(*g), to_u8(*b), 255])
                .collect()
        });
        Self { face_size, faces }
    }

    /// Pixels brighter than black, summed over all faces.
    pub fn lit_pixels(&self, threshold: u8) -> usize {
        self.faces
            .iter()
            .map(|face| {
                face.chunks_exact(4)
                    .filter(|px| px[0] > threshold || px[1] > threshold || px[2] > threshold)
                    .count()
            })
            .sum()
    }
}

fn to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

/// Dim background color derived from the seed so distinct skyboxes differ at a glance.
fn nebula_tint(seed: u64) -> [f32; 3] {
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0x5eed);
    let hue: f32 = rng.random();
    let base = blackbody_to_rgb(3000.0 + hue * 20000.0);
    base.map(|c| c * 0.04)
}

/// A cube texture on the GPU.
pub struct GpuCubemap {
    pub name: String,
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuCubemap {
    /// Upload six faces as an `Rgba8UnormSrgb` cube texture.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        faces: &CubemapFaces,
    ) -> Self {
        let face_size = faces.face_size;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size: wgpu::Extent3d {
                width: face_size,
                height: face_size,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (i, face) in faces.faces.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: i as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                face,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(face_size * 4),
                    rows_per_image: Some(face_size),
                },
                wgpu::Extent3d {
                    width: face_size,
                    height: face_size,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        log::info!(
            "Uploaded skybox '{name}': {face_size}x{face_size}, {} lit pixels",
            faces.lit_pixels(0)
        );
        Self {
            name: name.to_string(),
            texture,
            view,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;

    #[test]
    fn test_seed_is_stable_and_name_sensitive() {
        assert_eq!(seed_for_name("skybox/default"), seed_for_name("skybox/default"));
        assert_ne!(seed_for_name("skybox/default"), seed_for_name("skybox/nebula"));
        // FNV-1a of the empty string is the offset basis.
        assert_eq!(seed_for_name(""), 0xcbf2_9ce4_8422_2325);
    }

    #[test]
    fn test_stars_are_unit_directions() {
        for star in generate_stars(7, 500) {
            assert!((star.direction.length() - 1.0).abs() < 1e-4);
            assert!((0.0..=1.0).contains(&star.brightness));
        }
    }

    #[test]
    fn test_same_name_bakes_identical_faces() {
        let a = CubemapFaces::for_skybox("skybox/orion", 32, 300);
        let b = CubemapFaces::for_skybox("skybox/orion", 32, 300);
        assert_eq!(a.faces, b.faces);
    }

    #[test]
    fn test_different_names_bake_different_faces() {
        let a = CubemapFaces::for_skybox("skybox/orion", 32, 300);
        let b = CubemapFaces::for_skybox("skybox/vega", 32, 300);
        assert_ne!(a.faces, b.faces);
    }

    #[test]
    fn test_faces_are_rgba8_sized() {
        let faces = CubemapFaces::for_skybox("skybox/default", 16, 100);
        for face in &faces.faces {
            assert_eq!(face.len(), 16 * 16 * 4);
        }
        assert!(faces.lit_pixels(20) > 0, "stars should light some pixels");
    }

    #[test]
    fn test_axis_directions_hit_their_faces() {
        assert_eq!(direction_to_face_uv(Vec3::X).0, 0);
        assert_eq!(direction_to_face_uv(Vec3::NEG_X).0, 1);
        assert_eq!(direction_to_face_uv(Vec3::Y).0, 2);
        assert_eq!(direction_to_face_uv(Vec3::NEG_Y).0, 3);
        assert_eq!(direction_to_face_uv(Vec3::Z).0, 4);
        assert_eq!(direction_to_face_uv(Vec3::NEG_Z).0, 5);
        let (_, u, v) = direction_to_face_uv(Vec3::X);
        assert_eq!((u, v), (0.5, 0.5));
    }

    #[test]
    fn test_blackbody_hot_is_blue_cool_is_red() {
        let hot = blackbody_to_rgb(25000.0);
        let cool = blackbody_to_rgb(2500.0);
        assert!(hot[2] >= hot[0]);
        assert!(cool[0] > cool[2]);
    }

    #[test]
    fn test_upload_creates_six_layer_cube() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let faces = CubemapFaces::for_skybox("skybox/default", 16, 50);
        let cubemap = GpuCubemap::upload(&device, &queue, "skybox/default", &faces);
        assert_eq!(cubemap.texture.depth_or_array_layers(), 6);
        assert_eq!(cubemap.texture.width(), 16);
    }
}
