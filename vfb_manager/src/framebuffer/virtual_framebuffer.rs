/// VirtualFramebuffer - a guest framebuffer and the host targets backing it

use std::sync::Arc;
use bitflags::bitflags;
use slotmap::new_key_type;
use crate::device::{
    Buffer, GraphicsDevice, Texture, TextureDesc, TextureFormat, TextureUsage,
};
use crate::error::Result;
use crate::format::GuestFormat;

new_key_type! {
    /// Stable key of a cached virtual framebuffer
    pub struct VfbKey;
}

/// What the guest believes its framebuffer is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GuestIdentity {
    /// Guest VRAM address (cache key)
    pub address: u32,
    /// Row length in pixels
    pub stride: u32,
    /// Guest pixel format
    pub format: GuestFormat,
    /// Visible width in pixels
    pub width: u32,
    /// Visible height in pixels
    pub height: u32,
}

impl GuestIdentity {
    pub fn new(address: u32, stride: u32, format: GuestFormat, width: u32, height: u32) -> Self {
        Self { address, stride, format, width, height }
    }

    /// Zero-sized or with a stride shorter than a row
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0 || self.stride < self.width
    }

    /// Bytes between two guest rows
    pub fn row_pitch(&self) -> usize {
        self.stride as usize * self.format.bytes_per_pixel() as usize
    }

    /// Bytes covered in guest memory
    pub fn byte_size(&self) -> usize {
        self.row_pitch() * self.height as usize
    }
}

bitflags! {
    /// Per-framebuffer state bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VfbFlags: u32 {
        /// Rendered to since the last download
        const DIRTY = 1 << 0;
        /// Format changed, host content not yet converted
        const REFORMAT_PENDING = 1 << 1;
    }
}

/// Host textures backing a framebuffer at render resolution
#[derive(Clone)]
pub struct HostTargets {
    /// RGBA8 color attachment
    pub color: Arc<dyn Texture>,
    /// Depth/stencil attachment
    pub depth_stencil: Option<Arc<dyn Texture>>,
}

impl HostTargets {
    /// Allocate host textures of `width`x`height`
    pub fn create(
        device: &mut dyn GraphicsDevice,
        identity: &GuestIdentity,
        width: u32,
        height: u32,
        depth_format: Option<TextureFormat>,
    ) -> Result<Self> {
        let color = device.create_texture(TextureDesc {
            width,
            height,
            format: TextureFormat::R8G8B8A8_UNORM,
            usage: TextureUsage::SampledAndRenderTarget,
            label: format!("vfb_{:08x}_color", identity.address),
        })?;
        let depth_stencil = match depth_format {
            Some(format) => Some(device.create_texture(TextureDesc {
                width,
                height,
                format,
                usage: TextureUsage::DepthStencil,
                label: format!("vfb_{:08x}_depth", identity.address),
            })?),
            None => None,
        };
        Ok(Self { color, depth_stencil })
    }
}

/// Copy in flight into a download buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCopy {
    /// Ring slot the copy was recorded into
    pub slot: usize,
    /// Submission serial of that slot's frame
    pub serial: u64,
}

/// Host-visible buffer receiving framebuffer readbacks
#[derive(Clone)]
pub struct DownloadBuffer {
    pub buffer: Arc<dyn Buffer>,
    pub pending: Option<PendingCopy>,
}

/// A guest framebuffer tracked by the manager
pub struct VirtualFramebuffer {
    identity: GuestIdentity,
    render_width: u32,
    render_height: u32,
    host: Option<HostTargets>,
    download: Option<DownloadBuffer>,
    flags: VfbFlags,
    pending_reformat: Option<GuestFormat>,
    last_frame_referenced: u64,
    generation: u32,
}

impl VirtualFramebuffer {
    /// Create a framebuffer entry without host resources
    pub fn new(identity: GuestIdentity, render_width: u32, render_height: u32) -> Self {
        Self {
            identity,
            render_width,
            render_height,
            host: None,
            download: None,
            flags: VfbFlags::empty(),
            pending_reformat: None,
            last_frame_referenced: 0,
            generation: 0,
        }
    }

    // ===== ACCESSORS =====

    pub fn identity(&self) -> &GuestIdentity {
        &self.identity
    }

    pub fn address(&self) -> u32 {
        self.identity.address
    }

    pub fn format(&self) -> GuestFormat {
        self.identity.format
    }

    pub fn render_width(&self) -> u32 {
        self.render_width
    }

    pub fn render_height(&self) -> u32 {
        self.render_height
    }

    pub fn host(&self) -> Option<&HostTargets> {
        self.host.as_ref()
    }

    pub fn download(&self) -> Option<&DownloadBuffer> {
        self.download.as_ref()
    }

    pub fn flags(&self) -> VfbFlags {
        self.flags
    }

    /// Format the host content still holds while a conversion is owed
    pub fn pending_reformat(&self) -> Option<GuestFormat> {
        self.pending_reformat
    }

    pub fn last_frame_referenced(&self) -> u64 {
        self.last_frame_referenced
    }

    /// Incremented every time host resources are (re)created
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Color texture, if host resources exist
    pub fn color(&self) -> Option<&Arc<dyn Texture>> {
        self.host.as_ref().map(|h| &h.color)
    }

    /// Depth/stencil texture, if any
    pub fn depth_stencil(&self) -> Option<&Arc<dyn Texture>> {
        self.host.as_ref().and_then(|h| h.depth_stencil.as_ref())
    }

    // ===== MUTATION =====

    pub fn set_identity(&mut self, identity: GuestIdentity) {
        self.identity = identity;
    }

    pub fn set_render_size(&mut self, width: u32, height: u32) {
        self.render_width = width;
        self.render_height = height;
    }

    /// Install freshly created host targets
    pub fn attach_host(&mut self, host: HostTargets) {
        self.host = Some(host);
        self.generation = self.generation.wrapping_add(1);
    }

    /// Release host resources, keeping the guest identity
    pub fn release_host(&mut self) -> Option<HostTargets> {
        self.download = None;
        self.host.take()
    }

    pub fn set_download(&mut self, download: Option<DownloadBuffer>) {
        self.download = download;
    }

    pub fn download_mut(&mut self) -> Option<&mut DownloadBuffer> {
        self.download.as_mut()
    }

    pub fn insert_flags(&mut self, flags: VfbFlags) {
        self.flags.insert(flags);
    }

    pub fn remove_flags(&mut self, flags: VfbFlags) {
        self.flags.remove(flags);
    }

    /// Record that host content is still in `old_format` precision
    ///
    /// An earlier pending format is kept; the content was never converted.
    pub fn defer_reformat(&mut self, old_format: GuestFormat) {
        self.pending_reformat.get_or_insert(old_format);
        self.flags.insert(VfbFlags::REFORMAT_PENDING);
    }

    pub fn clear_pending_reformat(&mut self) {
        self.pending_reformat = None;
        self.flags.remove(VfbFlags::REFORMAT_PENDING);
    }

    pub fn touch(&mut self, frame: u64) {
        self.last_frame_referenced = frame;
    }
}
