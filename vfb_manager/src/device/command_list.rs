/// CommandList trait - for recording framebuffer commands

use std::sync::Arc;
use crate::error::Result;
use crate::device::{Buffer, Texture, TextureAspect};
use crate::format::PixelConversion;

/// Command list for recording GPU commands
///
/// Commands are recorded and later submitted via `GraphicsDevice::submit()`.
/// Transfer commands (`copy_*`, `blit_texture`) must be recorded outside
/// of a render pass; draw and clear commands inside one.
pub trait CommandList: Send {
    /// Begin recording commands
    fn begin(&mut self) -> Result<()>;

    /// End recording commands
    fn end(&mut self) -> Result<()>;

    /// Begin a render pass
    ///
    /// Attachments whose entry in `pass.clear` is `Some` are cleared on load,
    /// the others keep their previous content.
    fn begin_render_pass(&mut self, pass: &RenderPassBegin) -> Result<()>;

    /// End the current render pass
    fn end_render_pass(&mut self) -> Result<()>;

    /// Clear attachments of the current render pass
    fn clear_attachments(&mut self, clear: &AttachmentClear) -> Result<()>;

    /// Set the viewport
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Bind a range of a uniform buffer for the next draw
    fn bind_uniforms(&mut self, buffer: &Arc<dyn Buffer>, offset: u64, size: u64) -> Result<()>;

    /// Copy a region between two textures of the same format (1:1)
    fn copy_texture(
        &mut self,
        src: &Arc<dyn Texture>,
        dst: &Arc<dyn Texture>,
        aspect: TextureAspect,
        region: &TextureCopy,
    ) -> Result<()>;

    /// Scaled copy between two color textures
    fn blit_texture(
        &mut self,
        src: &Arc<dyn Texture>,
        src_rect: Rect2D,
        dst: &Arc<dyn Texture>,
        dst_rect: Rect2D,
        filter: Filter,
    ) -> Result<()>;

    /// Copy a texture rectangle into a buffer (tightly packed rows)
    fn copy_texture_to_buffer(
        &mut self,
        src: &Arc<dyn Texture>,
        aspect: TextureAspect,
        rect: Rect2D,
        dst: &Arc<dyn Buffer>,
        dst_offset: u64,
    ) -> Result<()>;

    /// Copy tightly packed buffer rows into a texture rectangle
    fn copy_buffer_to_texture(
        &mut self,
        src: &Arc<dyn Buffer>,
        src_offset: u64,
        dst: &Arc<dyn Texture>,
        aspect: TextureAspect,
        rect: Rect2D,
    ) -> Result<()>;

    /// Fullscreen draw of `src` into the current color attachment through
    /// a format conversion shader
    fn draw_converted(&mut self, src: &Arc<dyn Texture>, conversion: PixelConversion) -> Result<()>;

    /// Draw a textured quad into the current color attachment
    fn draw_textured_quad(&mut self, texture: &Arc<dyn Texture>, quad: &TexturedQuad) -> Result<()>;
}

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

/// 2D rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect2D {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// 1:1 copy region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureCopy {
    pub src_x: u32,
    pub src_y: u32,
    pub dst_x: u32,
    pub dst_y: u32,
    pub width: u32,
    pub height: u32,
}

/// Sampling filter for scaled copies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
}

/// Which attachments to clear and to which values
///
/// `None` keeps the attachment's content.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AttachmentClear {
    pub color: Option<[f32; 4]>,
    pub depth: Option<f32>,
    pub stencil: Option<u8>,
}

impl AttachmentClear {
    /// Keep everything
    pub fn keep() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.depth.is_none() && self.stencil.is_none()
    }
}

/// Parameters for `CommandList::begin_render_pass`
#[derive(Clone)]
pub struct RenderPassBegin {
    /// Color attachment
    pub color: Arc<dyn Texture>,
    /// Optional depth/stencil attachment
    pub depth_stencil: Option<Arc<dyn Texture>>,
    /// Load operations
    pub clear: AttachmentClear,
}

/// Textured quad in normalized destination space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexturedQuad {
    /// Destination rectangle in attachment pixels (x, y, w, h)
    pub dst: [f32; 4],
    /// Texture coordinates (u0, v0, u1, v1)
    pub uv: [f32; 4],
    /// Quarter turns applied to the texture coordinates (0..=3)
    pub uv_rotation: u32,
    /// Sampling filter
    pub filter: Filter,
}
