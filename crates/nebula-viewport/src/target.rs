//! The 2D render target the viewport sits in: rectangles, text and coordinate conversion.

use glam::{UVec2, Vec2};

/// Axis-aligned rectangle in virtual (GUI) coordinates, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub position: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl Rect {
    /// Creates a rectangle from its corner and size.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// A zero-sized rectangle anchoring text at `point`.
    pub fn point(point: Vec2) -> Self {
        Self {
            position: point,
            size: Vec2::ZERO,
        }
    }

    /// Center point.
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Width / height, or `None` when either side is not positive.
    pub fn aspect_ratio(&self) -> Option<f32> {
        (self.size.x > 0.0 && self.size.y > 0.0).then(|| self.size.x / self.size.y)
    }
}

/// Viewport rectangle in physical pixels, origin at the top-left of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Horizontal/vertical anchoring of text inside its rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    TopLeft,
    #[default]
    Center,
    BottomRight,
}

/// Font faces the GUI provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Font {
    #[default]
    Regular,
    Bold,
}

/// 8-bit RGBA color.
pub type Rgba8 = [u8; 4];

/// The GUI surface the viewport is embedded in.
///
/// Implemented by the owning screen; the viewport only converts coordinates
/// through it and queues text on it.
pub trait RenderTarget {
    /// Convert a virtual GUI position to physical pixels.
    fn virtual_to_pixel(&self, position: Vec2) -> Vec2;

    /// Full surface size in physical pixels.
    fn physical_size(&self) -> UVec2;

    /// Flush pending 2D work so 3D draws land on top of it.
    fn finish(&mut self);

    /// Queue text for drawing.
    fn draw_text(
        &mut self,
        rect: Rect,
        text: &str,
        alignment: Alignment,
        size: f32,
        font: Font,
        color: Rgba8,
    );
}
