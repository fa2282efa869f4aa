/// Presentation helpers: post-shader uniforms, guest pixel uploads and
/// textured quad draws into the current target

use std::sync::Arc;
use crate::device::{
    BufferDesc, BufferUsage, Filter, Rect2D, Texture, TextureAspect, TextureDesc, TextureFormat,
    TextureUsage, TexturedQuad,
};
use crate::error::{Error, Result};
use crate::format::GuestFormat;
use crate::frame::PushAllocation;
use crate::framebuffer::VfbFlags;
use crate::post_shader::PostShaderUniforms;
use crate::{vfb_reject, vfb_trace};
use super::framebuffer_manager::{lock_device, FramebufferManager, SOURCE};

/// RGBA8 texture holding decoded guest pixels, reused across uploads
pub struct PixelTexture {
    texture: Arc<dyn Texture>,
    format: GuestFormat,
}

impl PixelTexture {
    pub fn texture(&self) -> &Arc<dyn Texture> {
        &self.texture
    }

    /// Guest format of the last upload
    pub fn format(&self) -> GuestFormat {
        self.format
    }

    fn fits(&self, format: GuestFormat, width: u32, height: u32) -> bool {
        let info = self.texture.info();
        self.format == format && info.width == width && info.height == height
    }
}

impl FramebufferManager {
    /// Refresh the post-shader uniforms for the given buffer/render sizes
    pub fn update_post_shader_uniforms(
        &mut self,
        buffer_width: u32,
        buffer_height: u32,
        render_width: u32,
        render_height: u32,
    ) -> PostShaderUniforms {
        self.post_shader.update(buffer_width, buffer_height, render_width, render_height)
    }

    /// Copy the current uniforms into this frame's push buffer and bind them
    pub fn bind_post_shader(&mut self) -> Result<PushAllocation> {
        self.ensure_device("bind_post_shader")?;
        let uniforms = *self.post_shader.uniforms();
        let allocation = {
            let mut device = lock_device(&self.device)?;
            let ring = self.ring.as_mut().ok_or(Error::DeviceLost)?;
            ring.push(&mut *device, bytemuck::bytes_of(&uniforms))?
        };
        self.ring_mut()?.commands()?.bind_uniforms(&allocation.buffer, allocation.offset, allocation.size)?;
        vfb_trace!(SOURCE, "Post-shader uniforms bound at offset {}", allocation.offset);
        Ok(allocation)
    }

    /// Upload guest-format pixels into an RGBA8 texture
    ///
    /// `pixels` holds `height` rows of `stride` pixels. Returns the texture
    /// and the texture coordinates `(u1, v1)` of the visible `width`x`height`
    /// corner. The texture is reused while format and size stay the same.
    pub fn make_pixel_texture(
        &mut self,
        pixels: &[u8],
        format: GuestFormat,
        stride: u32,
        width: u32,
        height: u32,
    ) -> Result<(Arc<dyn Texture>, f32, f32)> {
        self.ensure_device("make_pixel_texture")?;
        if width == 0 || height == 0 || stride < width {
            return Err(vfb_reject!(SOURCE, "Pixel upload of {}x{} with stride {}", width, height, stride));
        }
        let bpp = format.bytes_per_pixel() as usize;
        let needed = stride as usize * height as usize * bpp;
        if pixels.len() < needed {
            return Err(vfb_reject!(SOURCE,
                "Pixel upload needs {} bytes, got {}", needed, pixels.len()));
        }

        self.conversion_buffer.clear();
        for chunk in pixels[..needed].chunks_exact(bpp) {
            self.conversion_buffer.extend_from_slice(&format.decode_pixel(chunk));
        }

        let cached = self.pixel_texture.as_ref()
            .filter(|cached| cached.fits(format, stride, height))
            .map(|cached| cached.texture.clone());
        let texture = match cached {
            Some(texture) => texture,
            None => {
                let texture = lock_device(&self.device)?.create_texture(TextureDesc {
                    width: stride,
                    height,
                    format: TextureFormat::R8G8B8A8_UNORM,
                    usage: TextureUsage::Sampled,
                    label: "vfb_pixel_texture".to_string(),
                })?;
                self.pixel_texture = Some(PixelTexture { texture: texture.clone(), format });
                texture
            }
        };

        let staging = lock_device(&self.device)?.create_buffer(BufferDesc {
            size: self.conversion_buffer.len() as u64,
            usage: BufferUsage::Staging,
        })?;
        staging.update(0, &self.conversion_buffer)?;

        self.end_active_pass()?;
        let ring = self.ring_mut()?;
        ring.commands()?.copy_buffer_to_texture(
            &staging,
            0,
            &texture,
            TextureAspect::Color,
            Rect2D::new(0, 0, stride, height),
        )?;
        ring.retain(staging);

        let info = texture.info();
        let u1 = width as f32 / info.width as f32;
        let v1 = height as f32 / info.height as f32;
        Ok((texture, u1, v1))
    }

    /// Draw `texture` into the current render target
    ///
    /// `x, y, w, h` are in a `dest_width`x`dest_height` coordinate space
    /// which is scaled onto the target's render size. `uv_rotation` turns the
    /// texture coordinates by quarter turns.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_active_texture(
        &mut self,
        texture: &Arc<dyn Texture>,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        dest_width: f32,
        dest_height: f32,
        uv: [f32; 4],
        uv_rotation: u32,
        filter: Filter,
    ) -> Result<()> {
        self.ensure_device("draw_active_texture")?;
        if dest_width <= 0.0 || dest_height <= 0.0 {
            return Err(vfb_reject!(SOURCE,
                "draw_active_texture() into a {}x{} destination", dest_width, dest_height));
        }
        if uv_rotation > 3 {
            return Err(vfb_reject!(SOURCE, "UV rotation {} out of range", uv_rotation));
        }
        let target = self.bind_for_draw()?;
        let (render_w, render_h) = match self.cache.get(target) {
            Some(vfb) => (vfb.render_width() as f32, vfb.render_height() as f32),
            None => return Err(Error::InvalidResource(format!("framebuffer {:?}", target))),
        };
        let sx = render_w / dest_width;
        let sy = render_h / dest_height;
        let quad = TexturedQuad {
            dst: [x * sx, y * sy, w * sx, h * sy],
            uv,
            uv_rotation,
            filter,
        };
        self.ring_mut()?.commands()?.draw_textured_quad(texture, &quad)?;
        if let Some(vfb) = self.cache.get_mut(target) {
            vfb.insert_flags(VfbFlags::DIRTY);
        }
        Ok(())
    }
}
