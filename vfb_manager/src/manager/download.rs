/// Framebuffer readback into guest layout

use crate::device::{BufferDesc, BufferUsage, Rect2D, TextureAspect};
use crate::error::{Error, Result};
use crate::framebuffer::{DownloadBuffer, VfbFlags, VfbKey};
use crate::{vfb_reject, vfb_trace, vfb_warn};
use super::framebuffer_manager::{lock_device, FramebufferManager, SOURCE};

impl FramebufferManager {
    /// Make sure `key` has a staging buffer large enough for a readback
    ///
    /// Returns false when the allocation fails or the device is lost;
    /// nothing is committed then.
    pub fn create_download_temp_buffer(&mut self, key: VfbKey) -> bool {
        if self.ensure_device("create_download_temp_buffer").is_err() {
            return false;
        }
        let (needed, existing) = match self.cache.get(key) {
            Some(vfb) => (
                vfb.render_width() as u64 * vfb.render_height() as u64 * 4,
                vfb.download().map(|d| d.buffer.size()),
            ),
            None => return false,
        };
        if existing.is_some_and(|size| size >= needed) {
            return true;
        }

        let buffer = match lock_device(&self.device)
            .and_then(|mut device| device.create_buffer(BufferDesc { size: needed, usage: BufferUsage::Staging }))
        {
            Ok(buffer) => buffer,
            Err(e) => {
                vfb_warn!(SOURCE, "Download buffer of {} bytes unavailable: {}", needed, e);
                return false;
            }
        };
        if let Some(vfb) = self.cache.get_mut(key) {
            vfb.set_download(Some(DownloadBuffer { buffer, pending: None }));
        }
        true
    }

    /// Record a copy of `key`'s color content into its staging buffer
    ///
    /// Only schedules the copy; `read_download_temp_buffer` waits for it.
    pub fn update_download_temp_buffer(&mut self, key: VfbKey) -> Result<()> {
        self.ensure_device("update_download_temp_buffer")?;
        let buffer = match self.cache.get(key).and_then(|vfb| vfb.download()) {
            Some(download) => download.buffer.clone(),
            None => return Err(vfb_reject!(SOURCE, "update_download_temp_buffer() without a download buffer")),
        };
        let color = self.host_of(key)?.color;
        let rect = Rect2D::new(0, 0, color.info().width, color.info().height);

        self.end_active_pass()?;
        let ring = self.ring_mut()?;
        ring.commands()?.copy_texture_to_buffer(&color, TextureAspect::Color, rect, &buffer, 0)?;
        let pending = ring.pending_copy();
        if let Some(download) = self.cache.get_mut(key).and_then(|vfb| vfb.download_mut()) {
            download.pending = Some(pending);
        }
        vfb_trace!(SOURCE, "Download of {:?} scheduled in slot {}", key, pending.slot);
        Ok(())
    }

    /// Wait for the scheduled copy and return the content in guest layout
    ///
    /// The result is `stride * height` pixels in the guest format, sampled
    /// down to guest resolution. Clears `VfbFlags::DIRTY`.
    pub fn read_download_temp_buffer(&mut self, key: VfbKey) -> Result<Vec<u8>> {
        self.ensure_device("read_download_temp_buffer")?;
        let (identity, render_w, render_h, download) = match self.cache.get(key) {
            Some(vfb) => match vfb.download() {
                Some(download) => (*vfb.identity(), vfb.render_width(), vfb.render_height(), download.clone()),
                None => return Err(vfb_reject!(SOURCE, "read_download_temp_buffer() without a download buffer")),
            },
            None => return Err(Error::InvalidResource(format!("framebuffer {:?}", key))),
        };
        let pending = match download.pending {
            Some(pending) => pending,
            None => return Err(vfb_reject!(SOURCE, "read_download_temp_buffer() before update")),
        };

        self.end_active_pass()?;
        {
            let device = lock_device(&self.device)?;
            let ring = self.ring.as_mut().ok_or(Error::DeviceLost)?;
            ring.wait_for(&*device, pending)?;
        }

        let texels = download.buffer.read(0, render_w as u64 * render_h as u64 * 4)?;
        let format = identity.format;
        let bpp = format.bytes_per_pixel() as usize;
        let mut out = vec![0u8; identity.byte_size()];
        let (width, height) = (identity.width as usize, identity.height as usize);
        let (rw, rh) = (render_w as usize, render_h as usize);
        for y in 0..height {
            let ry = y * rh / height;
            for x in 0..width {
                let rx = x * rw / width;
                let i = (ry * rw + rx) * 4;
                let rgba = [texels[i], texels[i + 1], texels[i + 2], texels[i + 3]];
                let o = (y * identity.stride as usize + x) * bpp;
                format.encode_pixel(rgba, &mut out[o..o + bpp]);
            }
        }

        if let Some(vfb) = self.cache.get_mut(key) {
            vfb.remove_flags(VfbFlags::DIRTY);
            if let Some(download) = vfb.download_mut() {
                download.pending = None;
            }
        }
        self.stats.downloads += 1;
        Ok(out)
    }

    /// Synchronously copy a guest rectangle of `key` into guest memory
    ///
    /// Flushes the commands recorded so far and waits for them.
    pub fn read_framebuffer_to_memory(
        &mut self,
        key: VfbKey,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<()> {
        self.ensure_device("read_framebuffer_to_memory")?;
        let identity = match self.cache.get(key) {
            Some(vfb) => *vfb.identity(),
            None => return Err(Error::InvalidResource(format!("framebuffer {:?}", key))),
        };
        let memory = match &self.guest_memory {
            Some(memory) => memory.clone(),
            None => return Err(vfb_reject!(SOURCE, "read_framebuffer_to_memory() without guest memory")),
        };
        let x_end = x.saturating_add(width).min(identity.width);
        let y_end = y.saturating_add(height).min(identity.height);
        if x >= x_end || y >= y_end {
            return Ok(());
        }

        if !self.create_download_temp_buffer(key) {
            return Err(Error::OutOfMemory);
        }
        self.update_download_temp_buffer(key)?;
        let pixels = self.read_download_temp_buffer(key)?;

        let bpp = identity.format.bytes_per_pixel() as usize;
        let pitch = identity.row_pitch();
        let mut memory = memory.lock()
            .map_err(|_| Error::BackendError("guest memory mutex poisoned".to_string()))?;
        for row in y..y_end {
            let start = row as usize * pitch + x as usize * bpp;
            let end = row as usize * pitch + x_end as usize * bpp;
            let address = u32::try_from(start).ok()
                .and_then(|offset| identity.address.checked_add(offset))
                .ok_or_else(|| vfb_reject!(SOURCE,
                    "Row {} of {:08x} lies beyond the guest address space", row, identity.address))?;
            memory.write(address, &pixels[start..end])?;
        }
        Ok(())
    }
}
