/// Reformat, resize, blit and stencil upload paths of the manager

use std::sync::Arc;
use crate::blit::{plan_blit, BlitSide};
use crate::device::{
    AttachmentClear, BufferDesc, BufferUsage, Filter, Rect2D, RenderPassBegin, Texture,
    TextureAspect, TextureCopy,
};
use crate::error::{Error, Result};
use crate::format::{GuestFormat, PixelConversion};
use crate::framebuffer::{VfbFlags, VfbKey, VirtualFramebuffer};
use crate::{vfb_debug, vfb_reject, vfb_trace, vfb_warn};
use super::collaborators::FramebufferEvent;
use super::framebuffer_manager::{lock_device, pooled_texture, FramebufferManager, SOURCE};

/// How `reformat_framebuffer_from` handled a format change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReformatOutcome {
    /// Formats were equal
    Unchanged,
    /// Host content converted in place
    Converted,
    /// Host targets destroyed and recreated (content cleared)
    Recreated,
}

fn blit_side(vfb: &VirtualFramebuffer) -> BlitSide {
    BlitSide {
        guest_width: vfb.identity().width,
        guest_height: vfb.identity().height,
        render_width: vfb.render_width(),
        render_height: vfb.render_height(),
        format_bpp: vfb.format().bytes_per_pixel(),
    }
}

fn full_copy(width: u32, height: u32) -> TextureCopy {
    TextureCopy { src_x: 0, src_y: 0, dst_x: 0, dst_y: 0, width, height }
}

impl FramebufferManager {
    /// Convert `key`'s host content from `old_format` to its current format
    ///
    /// Falls back to destroying and recreating the host targets when the
    /// pair has no conversion or the scratch texture cannot be allocated.
    pub fn reformat_framebuffer_from(
        &mut self,
        key: VfbKey,
        old_format: GuestFormat,
    ) -> Result<ReformatOutcome> {
        self.ensure_device("reformat_framebuffer_from")?;
        let (new_format, address, width, height) = match self.cache.get(key) {
            Some(vfb) => (vfb.format(), vfb.address(), vfb.render_width(), vfb.render_height()),
            None => return Err(Error::InvalidResource(format!("framebuffer {:?}", key))),
        };
        if old_format == new_format {
            if let Some(vfb) = self.cache.get_mut(key) {
                vfb.clear_pending_reformat();
            }
            return Ok(ReformatOutcome::Unchanged);
        }

        let conversion = match PixelConversion::lookup(old_format, new_format) {
            Some(conversion) => conversion,
            None => {
                vfb_debug!(SOURCE, "No conversion {:?} -> {:?} at {:08x}, recreating",
                    old_format, new_format, address);
                self.recreate_host(key)?;
                return Ok(ReformatOutcome::Recreated);
            }
        };
        let scratch = match pooled_texture(&mut self.scratch, &self.device, width, height, "vfb_scratch") {
            Ok(scratch) => scratch,
            Err(e) => {
                vfb_warn!(SOURCE, "Scratch allocation for {:?} -> {:?} failed ({}), recreating",
                    old_format, new_format, e);
                self.recreate_host(key)?;
                return Ok(ReformatOutcome::Recreated);
            }
        };

        let host = self.host_of(key)?;
        self.end_active_pass()?;
        let commands = self.ring_mut()?.commands()?;
        commands.copy_texture(&host.color, &scratch, TextureAspect::Color, &full_copy(width, height))?;
        commands.begin_render_pass(&RenderPassBegin {
            color: host.color.clone(),
            depth_stencil: None,
            clear: AttachmentClear::keep(),
        })?;
        commands.draw_converted(&scratch, conversion)?;
        commands.end_render_pass()?;

        if let Some(vfb) = self.cache.get_mut(key) {
            vfb.clear_pending_reformat();
        }
        self.stats.reformats += 1;
        vfb_debug!(SOURCE, "Reformatted {:08x} {:?} -> {:?} in place", address, old_format, new_format);
        self.notify_texture_cache(address, key, FramebufferEvent::Updated);
        Ok(ReformatOutcome::Converted)
    }

    /// Reallocate `key` at a new guest size, keeping the overlapping content
    pub(super) fn resize_framebuffer(&mut self, key: VfbKey, width: u32, height: u32) -> Result<()> {
        let (mut identity, old_host) = match self.cache.get(key) {
            Some(vfb) => (*vfb.identity(), vfb.host().cloned()),
            None => return Err(Error::InvalidResource(format!("framebuffer {:?}", key))),
        };
        identity.width = width;
        identity.height = height;
        let (render_w, render_h) = self.render_size(&identity);
        let host = self.create_host(&identity, render_w, render_h)?;

        let recording = self.ring.as_ref().is_some_and(|ring| ring.is_recording());
        match old_host {
            Some(old) if recording => {
                self.end_active_pass()?;
                let copy_w = old.color.info().width.min(render_w);
                let copy_h = old.color.info().height.min(render_h);
                let commands = self.ring_mut()?.commands()?;
                commands.copy_texture(&old.color, &host.color, TextureAspect::Color, &full_copy(copy_w, copy_h))?;
                if let (Some(src), Some(dst)) = (&old.depth_stencil, &host.depth_stencil) {
                    commands.copy_texture(src, dst, TextureAspect::DepthStencil, &full_copy(copy_w, copy_h))?;
                }
            }
            Some(_) => vfb_debug!(SOURCE, "Resize of {:08x} outside a frame, content dropped", identity.address),
            None => {}
        }

        if let Some(vfb) = self.cache.get_mut(key) {
            vfb.set_identity(identity);
            vfb.set_render_size(render_w, render_h);
            vfb.release_host();
            vfb.attach_host(host);
        }
        self.stats.resizes += 1;
        vfb_debug!(SOURCE, "Resized {:08x} to {}x{} (host {}x{})",
            identity.address, width, height, render_w, render_h);
        self.notify_texture_cache(identity.address, key, FramebufferEvent::Updated);
        Ok(())
    }

    /// Copy a guest rectangle between framebuffers (possibly the same one)
    ///
    /// Coordinates are in units of `bpp` bytes. The rectangle is clipped to
    /// both framebuffers; nothing remaining is a no-op.
    #[allow(clippy::too_many_arguments)]
    pub fn blit_framebuffer(
        &mut self,
        dst: VfbKey,
        dst_x: i32,
        dst_y: i32,
        src: VfbKey,
        src_x: i32,
        src_y: i32,
        width: i32,
        height: i32,
        bpp: u32,
    ) -> Result<()> {
        self.ensure_device("blit_framebuffer")?;
        let (src_side, dst_side) = match (self.cache.get(src), self.cache.get(dst)) {
            (Some(s), Some(d)) => (blit_side(s), blit_side(d)),
            _ => return Err(vfb_reject!(SOURCE, "blit_framebuffer() with an unknown framebuffer")),
        };
        let plan = match plan_blit(&dst_side, dst_x, dst_y, &src_side, src_x, src_y, width, height, bpp) {
            Some(plan) => plan,
            None => {
                vfb_trace!(SOURCE, "Blit {}x{} at ({}, {}) clipped away", width, height, dst_x, dst_y);
                return Ok(());
            }
        };
        let src_color = self.host_of(src)?.color;
        let dst_color = self.host_of(dst)?.color;
        self.end_active_pass()?;

        let source: Arc<dyn Texture> = if src == dst {
            let scratch = pooled_texture(
                &mut self.scratch, &self.device, src_side.render_width, src_side.render_height, "vfb_scratch",
            )?;
            let region = TextureCopy {
                src_x: plan.src.x as u32,
                src_y: plan.src.y as u32,
                dst_x: plan.src.x as u32,
                dst_y: plan.src.y as u32,
                width: plan.src.width,
                height: plan.src.height,
            };
            self.ring_mut()?.commands()?.copy_texture(&src_color, &scratch, TextureAspect::Color, &region)?;
            scratch
        } else {
            src_color
        };

        let commands = self.ring_mut()?.commands()?;
        if plan.is_one_to_one() {
            commands.copy_texture(&source, &dst_color, TextureAspect::Color, &TextureCopy {
                src_x: plan.src.x as u32,
                src_y: plan.src.y as u32,
                dst_x: plan.dst.x as u32,
                dst_y: plan.dst.y as u32,
                width: plan.dst.width,
                height: plan.dst.height,
            })?;
        } else {
            commands.blit_texture(&source, plan.src, &dst_color, plan.dst, Filter::Nearest)?;
        }

        if let Some(vfb) = self.cache.get_mut(dst) {
            vfb.insert_flags(VfbFlags::DIRTY);
        }
        self.stats.blits += 1;
        vfb_trace!(SOURCE, "Blit {:?} -> {:?}", plan.src, plan.dst);
        Ok(())
    }

    /// Copy depth/stencil from `src` to `dst`
    ///
    /// Both need a depth attachment of the same size and format.
    pub fn blit_framebuffer_depth(&mut self, src: VfbKey, dst: VfbKey) -> Result<()> {
        self.ensure_device("blit_framebuffer_depth")?;
        let (src_depth, dst_depth) = match (self.host_of(src)?.depth_stencil, self.host_of(dst)?.depth_stencil) {
            (Some(s), Some(d)) => (s, d),
            _ => return Err(vfb_reject!(SOURCE, "blit_framebuffer_depth() needs two depth attachments")),
        };
        let (s, d) = (src_depth.info(), dst_depth.info());
        if s.width != d.width || s.height != d.height || s.format != d.format {
            return Err(vfb_reject!(SOURCE,
                "Depth layouts differ: {}x{} {:?} vs {}x{} {:?}",
                s.width, s.height, s.format, d.width, d.height, d.format));
        }
        if src == dst {
            return Ok(());
        }
        let region = full_copy(s.width, s.height);
        self.end_active_pass()?;
        self.ring_mut()?.commands()?.copy_texture(&src_depth, &dst_depth, TextureAspect::DepthStencil, &region)
    }

    /// Upload stencil values written by the CPU into guest memory
    ///
    /// `size` bytes from `address` were written. The stencil of the whole
    /// framebuffer is refreshed from guest memory. Returns true when an
    /// upload was recorded; framebuffers without stencil bits and unknown
    /// addresses upload nothing, and neither does `skip_zero` when the
    /// written bytes carry no stencil.
    pub fn notify_stencil_upload(&mut self, address: u32, size: u32, skip_zero: bool) -> Result<bool> {
        self.ensure_device("notify_stencil_upload")?;
        let key = match self.cache.key_for_address(address) {
            Some(key) => key,
            None => {
                vfb_trace!(SOURCE, "Stencil upload to {:08x}: no framebuffer", address);
                return Ok(false);
            }
        };
        let (identity, render_w, render_h) = match self.cache.get(key) {
            Some(vfb) => (*vfb.identity(), vfb.render_width(), vfb.render_height()),
            None => return Ok(false),
        };
        if identity.format.stencil_bits() == 0 {
            return Ok(false);
        }
        let depth = match self.host_of(key)?.depth_stencil {
            Some(depth) => depth,
            None => return Ok(false),
        };
        let memory = match &self.guest_memory {
            Some(memory) => memory.clone(),
            None => return Err(vfb_reject!(SOURCE, "notify_stencil_upload() without guest memory")),
        };

        // Whole framebuffer; `size` only bounds the skip_zero scan
        let mut bytes = vec![0u8; identity.byte_size()];
        memory.lock()
            .map_err(|_| Error::BackendError("guest memory mutex poisoned".to_string()))?
            .read(address, &mut bytes)?;

        let bpp = identity.format.bytes_per_pixel() as usize;
        let written = (size as usize).min(bytes.len());
        if skip_zero && bytes[..written].chunks_exact(bpp)
            .all(|px| identity.format.stencil_from_pixel(px).unwrap_or(0) == 0)
        {
            return Ok(false);
        }

        let (width, height) = (identity.width as usize, identity.height as usize);
        let mut guest = vec![0u8; width * height];
        for y in 0..height {
            for x in 0..width {
                let offset = (y * identity.stride as usize + x) * bpp;
                if let Some(px) = bytes.get(offset..offset + bpp) {
                    guest[y * width + x] = identity.format.stencil_from_pixel(px).unwrap_or(0);
                }
            }
        }

        let (rw, rh) = (render_w as usize, render_h as usize);
        let mut staged = vec![0u8; rw * rh];
        for ry in 0..rh {
            let gy = ry * height / rh;
            for rx in 0..rw {
                staged[ry * rw + rx] = guest[gy * width + rx * width / rw];
            }
        }
        let buffer = lock_device(&self.device)?.create_buffer(BufferDesc {
            size: staged.len() as u64,
            usage: BufferUsage::Staging,
        })?;
        buffer.update(0, &staged)?;

        self.end_active_pass()?;
        let ring = self.ring_mut()?;
        ring.commands()?.copy_buffer_to_texture(
            &buffer, 0, &depth, TextureAspect::Stencil, Rect2D::new(0, 0, render_w, render_h),
        )?;
        ring.retain(buffer);
        self.stats.stencil_uploads += 1;
        vfb_debug!(SOURCE, "Stencil upload to {:08x} ({} bytes)", address, size);
        Ok(true)
    }
}
