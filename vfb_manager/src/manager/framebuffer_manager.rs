/// FramebufferManager - owns the framebuffer cache, frame ring and pass state
///
/// The manager is driven from a single render thread. Every operation first
/// checks for device loss; while the device is lost operations log a warning
/// and return `Error::DeviceLost` without touching any resource.

use std::sync::{Arc, Mutex, MutexGuard};
use bitflags::bitflags;
use crate::config::{ManagerConfig, NATIVE_WIDTH};
use crate::device::{
    AttachmentClear, GraphicsDevice, RenderPassBegin, Texture, TextureAspect, TextureCopy,
    TextureDesc, TextureUsage, TextureFormat, Viewport,
};
use crate::error::{Error, Result};
use crate::frame::FrameRing;
use crate::framebuffer::{
    CacheLookup, FramebufferCache, GuestIdentity, HostTargets, IdentityChange, VfbFlags, VfbKey,
    VirtualFramebuffer,
};
use crate::pass_state::{ClearAction, PassState, PassTracker};
use crate::post_shader::{Clock, PostShaderPipeline, SystemClock};
use crate::{vfb_debug, vfb_error, vfb_info, vfb_reject, vfb_trace, vfb_warn};
use super::collaborators::{DrawEngine, FramebufferEvent, GuestMemory, TextureCache};
use super::present::PixelTexture;

pub(super) const SOURCE: &str = "vfb::FramebufferManager";

/// Texture stages a framebuffer can be bound to
pub const MAX_TEXTURE_STAGES: u32 = 8;

bitflags! {
    /// Options for `bind_framebuffer_as_color_texture`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BindFlags: u32 {
        /// Sampling the active render target returns a copy
        const MAY_COPY = 1 << 0;
        /// Always return a copy
        const FORCE_COPY = 1 << 1;
    }
}

/// Counters exposed for diagnostics and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagerStats {
    pub framebuffers_created: u64,
    pub framebuffers_destroyed: u64,
    pub resizes: u64,
    pub reformats: u64,
    pub recreations: u64,
    pub blits: u64,
    pub downloads: u64,
    pub stencil_uploads: u64,
}

pub(super) fn lock_device(
    device: &Arc<Mutex<dyn GraphicsDevice>>,
) -> Result<MutexGuard<'_, dyn GraphicsDevice + 'static>> {
    device.lock()
        .map_err(|_| Error::BackendError("graphics device mutex poisoned".to_string()))
}

/// Reuse `slot` when it has the requested size, otherwise allocate a new
/// color texture into it
pub(super) fn pooled_texture(
    slot: &mut Option<Arc<dyn Texture>>,
    device: &Arc<Mutex<dyn GraphicsDevice>>,
    width: u32,
    height: u32,
    label: &str,
) -> Result<Arc<dyn Texture>> {
    if let Some(texture) = slot {
        if texture.info().width == width && texture.info().height == height {
            return Ok(texture.clone());
        }
    }
    let texture = lock_device(device)?.create_texture(TextureDesc {
        width,
        height,
        format: TextureFormat::R8G8B8A8_UNORM,
        usage: TextureUsage::SampledAndRenderTarget,
        label: label.to_string(),
    })?;
    *slot = Some(texture.clone());
    Ok(texture)
}

/// Guest clear color (0xAABBGGRR) as normalized RGBA
fn abgr_to_rgba(color: u32) -> [f32; 4] {
    [
        (color & 0xFF) as f32 / 255.0,
        ((color >> 8) & 0xFF) as f32 / 255.0,
        ((color >> 16) & 0xFF) as f32 / 255.0,
        (color >> 24) as f32 / 255.0,
    ]
}

pub struct FramebufferManager {
    pub(super) config: ManagerConfig,
    pub(super) device: Arc<Mutex<dyn GraphicsDevice>>,
    pub(super) device_lost: bool,
    pub(super) cache: FramebufferCache,
    pub(super) ring: Option<FrameRing>,
    pub(super) passes: PassTracker,
    pub(super) current_target: Option<VfbKey>,
    pub(super) render_scale: f32,
    pub(super) post_shader: PostShaderPipeline,
    pub(super) scratch: Option<Arc<dyn Texture>>,
    pub(super) self_copy: Option<Arc<dyn Texture>>,
    pub(super) pixel_texture: Option<PixelTexture>,
    pub(super) conversion_buffer: Vec<u8>,
    pub(super) texture_cache: Option<Arc<Mutex<dyn TextureCache>>>,
    pub(super) draw_engine: Option<Arc<Mutex<dyn DrawEngine>>>,
    pub(super) guest_memory: Option<Arc<Mutex<dyn GuestMemory>>>,
    pub(super) frame_number: u64,
    pub(super) flips: u64,
    pub(super) stats: ManagerStats,
}

impl FramebufferManager {
    /// Create a manager and its frame ring on `device`
    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>, config: ManagerConfig) -> Result<Self> {
        config.validate()?;
        let ring = {
            let mut guard = lock_device(&device)?;
            FrameRing::new(&mut *guard, config.push_buffer_size, config.fence_timeout)?
        };
        let (output_w, output_h) = config.output_size;
        let render_scale = config.render_scale.factor(output_w, output_h);
        vfb_info!(SOURCE, "Framebuffer manager ready ({} frames in flight, render scale {})",
            ring.frame_count(), render_scale);

        Ok(Self {
            config,
            device,
            device_lost: false,
            cache: FramebufferCache::new(),
            ring: Some(ring),
            passes: PassTracker::new(),
            current_target: None,
            render_scale,
            post_shader: PostShaderPipeline::new(Box::new(SystemClock::new())),
            scratch: None,
            self_copy: None,
            pixel_texture: None,
            conversion_buffer: Vec::new(),
            texture_cache: None,
            draw_engine: None,
            guest_memory: None,
            frame_number: 0,
            flips: 0,
            stats: ManagerStats::default(),
        })
    }

    // ===== COLLABORATORS =====

    pub fn set_texture_cache(&mut self, texture_cache: Arc<Mutex<dyn TextureCache>>) {
        self.texture_cache = Some(texture_cache);
    }

    pub fn set_draw_engine(&mut self, draw_engine: Arc<Mutex<dyn DrawEngine>>) {
        self.draw_engine = Some(draw_engine);
    }

    pub fn set_guest_memory(&mut self, guest_memory: Arc<Mutex<dyn GuestMemory>>) {
        self.guest_memory = Some(guest_memory);
    }

    /// Replace the clock feeding post-shader time uniforms
    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.post_shader.set_clock(clock);
    }

    // ===== QUERIES =====

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn stats(&self) -> ManagerStats {
        self.stats
    }

    /// Render passes opened by the binding logic
    pub fn render_pass_begins(&self) -> u64 {
        self.passes.render_pass_begins()
    }

    pub fn pass_state(&self) -> PassState {
        self.passes.state()
    }

    pub fn current_render_target(&self) -> Option<VfbKey> {
        self.current_target
    }

    pub fn framebuffer(&self, key: VfbKey) -> Option<&VirtualFramebuffer> {
        self.cache.get(key)
    }

    /// Key of the framebuffer at a guest address
    pub fn framebuffer_at(&self, address: u32) -> Option<VfbKey> {
        self.cache.key_for_address(address)
    }

    pub fn framebuffer_count(&self) -> usize {
        self.cache.len()
    }

    /// Frames begun since creation
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    pub fn is_device_lost(&self) -> bool {
        self.device_lost
    }

    pub fn render_scale(&self) -> f32 {
        self.render_scale
    }

    /// Framebuffers older than `ManagerConfig::stale_frame_age`
    ///
    /// The manager never evicts on its own; callers decide what to destroy.
    pub fn stale_framebuffers(&self) -> Vec<VfbKey> {
        self.cache.stale_framebuffers(self.frame_number, self.config.stale_frame_age)
    }

    // ===== CACHE =====

    /// Return the framebuffer for `identity`, creating or updating it
    pub fn get_framebuffer(&mut self, identity: GuestIdentity) -> Result<VfbKey> {
        self.ensure_device("get_framebuffer")?;
        if identity.is_degenerate() {
            return Err(vfb_reject!(SOURCE,
                "Degenerate framebuffer {}x{} (stride {}) at {:08x}",
                identity.width, identity.height, identity.stride, identity.address));
        }

        let key = match self.cache.lookup(&identity) {
            CacheLookup::Hit(key) => {
                if self.cache.get(key).is_some_and(|vfb| vfb.host().is_none()) {
                    self.recreate_host(key)?;
                }
                key
            }
            CacheLookup::Miss => self.create_framebuffer(identity)?,
            CacheLookup::Changed(key, change) => {
                self.apply_identity_change(key, identity, change)?;
                key
            }
        };
        self.resolve_pending_reformat(key)?;

        let frame = self.frame_number;
        if let Some(vfb) = self.cache.get_mut(key) {
            vfb.touch(frame);
        }
        Ok(key)
    }

    /// Make `identity` the target of subsequent draws and clears
    ///
    /// The open pass, if on another target, is closed lazily by the next
    /// draw or clear.
    pub fn set_render_target(&mut self, identity: GuestIdentity) -> Result<VfbKey> {
        let key = self.get_framebuffer(identity)?;
        if self.current_target != Some(key) {
            vfb_trace!(SOURCE, "Render target -> {:08x}", identity.address);
            self.current_target = Some(key);
        }
        Ok(key)
    }

    /// Remove one framebuffer and release its host resources
    ///
    /// Returns false for an unknown key.
    pub fn destroy(&mut self, key: VfbKey) -> Result<bool> {
        if self.passes.is_active_on(key) {
            self.end_active_pass()?;
        }
        let vfb = match self.cache.remove(key) {
            Some(vfb) => vfb,
            None => return Ok(false),
        };
        if self.current_target == Some(key) {
            self.current_target = None;
        }
        self.stats.framebuffers_destroyed += 1;
        vfb_debug!(SOURCE, "Destroyed framebuffer at {:08x}", vfb.address());
        self.notify_texture_cache(vfb.address(), key, FramebufferEvent::Destroyed);
        Ok(true)
    }

    /// Remove every framebuffer
    pub fn destroy_all_fbos(&mut self) -> Result<()> {
        self.end_active_pass()?;
        let drained = self.cache.drain();
        vfb_debug!(SOURCE, "Destroying all {} framebuffers", drained.len());
        for (key, vfb) in drained {
            self.stats.framebuffers_destroyed += 1;
            self.notify_texture_cache(vfb.address(), key, FramebufferEvent::Destroyed);
        }
        self.current_target = None;
        self.scratch = None;
        self.self_copy = None;
        Ok(())
    }

    fn create_framebuffer(&mut self, identity: GuestIdentity) -> Result<VfbKey> {
        let (width, height) = self.render_size(&identity);
        let host = self.create_host(&identity, width, height)?;
        let mut vfb = VirtualFramebuffer::new(identity, width, height);
        vfb.attach_host(host);

        let (key, displaced) = self.cache.insert(vfb);
        if displaced.is_some() {
            self.stats.framebuffers_destroyed += 1;
        }
        self.stats.framebuffers_created += 1;
        vfb_debug!(SOURCE, "Created {:?} framebuffer {}x{} at {:08x} (host {}x{})",
            identity.format, identity.width, identity.height, identity.address, width, height);
        self.notify_texture_cache(identity.address, key, FramebufferEvent::Created);
        Ok(key)
    }

    fn apply_identity_change(
        &mut self,
        key: VfbKey,
        identity: GuestIdentity,
        change: IdentityChange,
    ) -> Result<()> {
        if change.old_format.is_some() && change.stride_changed {
            vfb_debug!(SOURCE, "Format and stride changed at {:08x}, recreating", identity.address);
            if let Some(vfb) = self.cache.get_mut(key) {
                vfb.set_identity(identity);
            }
            return self.recreate_host(key);
        }

        if change.resized {
            self.resize_framebuffer(key, identity.width, identity.height)?;
        }

        if let Some(vfb) = self.cache.get_mut(key) {
            vfb.set_identity(identity);
        }
        match change.old_format {
            Some(old_format) => {
                if let Some(vfb) = self.cache.get_mut(key) {
                    vfb.defer_reformat(old_format);
                }
            }
            None if change.stride_changed => {
                vfb_trace!(SOURCE, "Stride at {:08x} now {}", identity.address, identity.stride);
                self.notify_texture_cache(identity.address, key, FramebufferEvent::Updated);
            }
            None => {}
        }
        Ok(())
    }

    /// Convert host content owed a reformat, once a frame is recording
    ///
    /// Outside a frame the conversion stays pending and the framebuffer
    /// already answers with its new format.
    fn resolve_pending_reformat(&mut self, key: VfbKey) -> Result<()> {
        let old_format = match self.cache.get(key).and_then(|vfb| vfb.pending_reformat()) {
            Some(old_format) => old_format,
            None => return Ok(()),
        };
        if !self.ring.as_ref().is_some_and(|ring| ring.is_recording()) {
            vfb_trace!(SOURCE, "Reformat of {:?} from {:?} deferred to the next frame", key, old_format);
            return Ok(());
        }
        self.reformat_framebuffer_from(key, old_format)?;
        Ok(())
    }

    /// Release and reallocate host targets at the current render scale
    ///
    /// Content is lost. On allocation failure the entry stays without host
    /// resources and the next `get_framebuffer` retries.
    pub(super) fn recreate_host(&mut self, key: VfbKey) -> Result<()> {
        if self.passes.is_active_on(key) {
            self.end_active_pass()?;
        }
        let identity = match self.cache.get_mut(key) {
            Some(vfb) => {
                vfb.release_host();
                *vfb.identity()
            }
            None => return Err(Error::InvalidResource(format!("framebuffer {:?}", key))),
        };
        let (width, height) = self.render_size(&identity);
        let host = self.create_host(&identity, width, height)?;
        if let Some(vfb) = self.cache.get_mut(key) {
            vfb.set_render_size(width, height);
            vfb.attach_host(host);
            vfb.clear_pending_reformat();
        }
        self.stats.recreations += 1;
        self.notify_texture_cache(identity.address, key, FramebufferEvent::Updated);
        Ok(())
    }

    pub(super) fn create_host(
        &self,
        identity: &GuestIdentity,
        width: u32,
        height: u32,
    ) -> Result<HostTargets> {
        let depth_format = self.config.create_depth.then_some(self.config.depth_format);
        let mut device = lock_device(&self.device)?;
        HostTargets::create(&mut *device, identity, width, height, depth_format)
    }

    pub(super) fn render_size(&self, identity: &GuestIdentity) -> (u32, u32) {
        let scale = |v: u32| ((v as f32 * self.render_scale).round() as u32).max(1);
        (scale(identity.width), scale(identity.height))
    }

    pub(super) fn host_of(&self, key: VfbKey) -> Result<HostTargets> {
        match self.cache.get(key) {
            Some(vfb) => vfb.host().cloned().ok_or_else(|| {
                Error::InvalidResource(format!("framebuffer at {:08x} has no host resources", vfb.address()))
            }),
            None => Err(Error::InvalidResource(format!("framebuffer {:?}", key))),
        }
    }

    // ===== FRAME LIFECYCLE =====

    /// Start recording the next frame
    ///
    /// Fails with `Error::FrameNotRetired` when the ring slot is still in
    /// use by the GPU.
    pub fn begin_frame(&mut self) -> Result<()> {
        self.ensure_device("begin_frame")?;
        self.ring_mut()?.begin_frame()?;
        self.frame_number += 1;
        self.post_shader.set_frame_counters(self.frame_number, self.flips);
        Ok(())
    }

    /// Close any open pass and submit the frame
    pub fn end_frame(&mut self) -> Result<()> {
        self.ensure_device("end_frame")?;
        self.end_active_pass()?;
        let device = lock_device(&self.device)?;
        let ring = self.ring.as_mut().ok_or(Error::DeviceLost)?;
        ring.end_frame(&*device)?;
        self.flips += 1;
        Ok(())
    }

    // ===== DEVICE LOSS =====

    /// Drop every GPU resource; identities are kept for `device_restore`
    pub fn device_lost(&mut self) {
        if self.device_lost {
            return;
        }
        self.passes.invalidate();
        self.ring = None;
        self.cache.release_host_resources();
        self.scratch = None;
        self.self_copy = None;
        self.pixel_texture = None;
        self.device_lost = true;

        let released: Vec<(u32, VfbKey)> = self.cache.iter()
            .map(|(key, vfb)| (vfb.address(), key))
            .collect();
        for (address, key) in released {
            self.notify_texture_cache(address, key, FramebufferEvent::Destroyed);
        }
        vfb_info!(SOURCE, "Device lost, {} framebuffers awaiting restore", self.cache.len());
    }

    /// Recreate the ring and every framebuffer on a new device
    pub fn device_restore(&mut self, device: Arc<Mutex<dyn GraphicsDevice>>) -> Result<()> {
        self.device = device;
        let ring = {
            let mut guard = lock_device(&self.device)?;
            FrameRing::new(&mut *guard, self.config.push_buffer_size, self.config.fence_timeout)?
        };
        self.ring = Some(ring);
        self.passes.invalidate();
        self.device_lost = false;

        let keys: Vec<VfbKey> = self.cache.keys().collect();
        let mut failed = 0;
        for key in keys {
            if let Err(e) = self.recreate_host(key) {
                vfb_error!(SOURCE, "Restoring framebuffer {:?} failed: {}", key, e);
                failed += 1;
            }
        }
        vfb_info!(SOURCE, "Device restored ({} framebuffers, {} deferred)", self.cache.len(), failed);
        Ok(())
    }

    /// Host output size changed
    ///
    /// When the render scale changes as a result, every framebuffer is
    /// destroyed and recreated lazily at the new scale. Returns whether that
    /// happened.
    pub fn resized(&mut self, output_width: u32, output_height: u32) -> Result<bool> {
        self.ensure_device("resized")?;
        let scale = self.config.render_scale.factor(output_width, output_height);
        if scale == self.render_scale {
            return Ok(false);
        }
        vfb_info!(SOURCE, "Output {}x{}: render scale {} -> {}",
            output_width, output_height, self.render_scale, scale);
        self.render_scale = scale;
        self.destroy_all_fbos()?;
        Ok(true)
    }

    // ===== BINDING =====

    /// Close any open pass and reopen one (load = keep) on the current target
    pub fn rebind_framebuffer(&mut self) -> Result<()> {
        self.ensure_device("rebind_framebuffer")?;
        let target = self.require_target("rebind_framebuffer")?;
        self.open_pass(target, AttachmentClear::keep())
    }

    /// Make sure a pass is open on the current target before drawing
    pub fn bind_for_draw(&mut self) -> Result<VfbKey> {
        self.ensure_device("bind_for_draw")?;
        let target = self.require_target("bind_for_draw")?;
        if !self.passes.is_active_on(target) {
            self.open_pass(target, AttachmentClear::keep())?;
        }
        Ok(target)
    }

    /// Clear the current target
    ///
    /// `color` is guest ABGR8888. Clearing alpha also clears stencil to the
    /// alpha byte. Inside the target's open pass this records a plain clear;
    /// otherwise a pass is opened with the clear as its load operation.
    pub fn notify_clear(
        &mut self,
        clear_color: bool,
        clear_alpha: bool,
        clear_depth: bool,
        color: u32,
        depth: f32,
    ) -> Result<()> {
        self.ensure_device("notify_clear")?;
        let target = self.require_target("notify_clear")?;
        let has_depth = self.host_of(target)?.depth_stencil.is_some();

        let mut clear = AttachmentClear::keep();
        if clear_color || clear_alpha {
            clear.color = Some(abgr_to_rgba(color));
        }
        if has_depth && clear_depth {
            clear.depth = Some(depth);
        }
        if has_depth && clear_alpha {
            clear.stencil = Some((color >> 24) as u8);
        }
        if clear.is_empty() {
            return Ok(());
        }

        match self.passes.clear_action(target) {
            ClearAction::InPass => {
                self.flush_draw_engine();
                self.ring_mut()?.commands()?.clear_attachments(&clear)?;
                if let Some(vfb) = self.cache.get_mut(target) {
                    vfb.insert_flags(VfbFlags::DIRTY);
                }
            }
            ClearAction::OpenWithClear { .. } => self.open_pass(target, clear)?,
        }
        Ok(())
    }

    /// Hand out `key`'s color texture for sampling on `stage`
    ///
    /// A framebuffer cannot be sampled while it is the open pass's
    /// attachment, so that pass is closed first. With `BindFlags::MAY_COPY`
    /// the active target is copied and the copy returned instead.
    pub fn bind_framebuffer_as_color_texture(
        &mut self,
        stage: u32,
        key: VfbKey,
        flags: BindFlags,
    ) -> Result<Arc<dyn Texture>> {
        self.ensure_device("bind_framebuffer_as_color_texture")?;
        if stage >= MAX_TEXTURE_STAGES {
            return Err(vfb_reject!(SOURCE, "Texture stage {} out of range", stage));
        }
        let host = self.host_of(key)?;
        let was_active = self.passes.is_active_on(key);
        if was_active {
            self.end_active_pass()?;
        }

        let copy = flags.contains(BindFlags::FORCE_COPY)
            || (was_active && flags.contains(BindFlags::MAY_COPY));
        if !copy {
            vfb_trace!(SOURCE, "Stage {} samples framebuffer {:?}", stage, key);
            return Ok(host.color);
        }

        let (width, height) = (host.color.info().width, host.color.info().height);
        let texture = pooled_texture(&mut self.self_copy, &self.device, width, height, "vfb_self_copy")?;
        self.end_active_pass()?;
        self.ring_mut()?.commands()?.copy_texture(
            &host.color,
            &texture,
            TextureAspect::Color,
            &TextureCopy { src_x: 0, src_y: 0, dst_x: 0, dst_y: 0, width, height },
        )?;
        vfb_trace!(SOURCE, "Stage {} samples a copy of framebuffer {:?}", stage, key);
        Ok(texture)
    }

    /// Set the viewport of the open pass, in render-target pixels
    pub fn set_viewport_2d(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<()> {
        self.ensure_device("set_viewport_2d")?;
        if self.passes.active_target().is_none() {
            return Err(vfb_reject!(SOURCE, "set_viewport_2d() without an open pass"));
        }
        self.ring_mut()?.commands()?.set_viewport(Viewport {
            x,
            y,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        })
    }

    /// Line width matching the current target's render scale
    pub fn line_width(&self) -> u32 {
        self.current_target
            .and_then(|key| self.cache.get(key))
            .map(|vfb| ((vfb.render_width() as f32 / NATIVE_WIDTH as f32).round() as u32).max(1))
            .unwrap_or(1)
    }

    // ===== INTERNALS =====

    pub(super) fn ensure_device(&self, operation: &str) -> Result<()> {
        if self.device_lost {
            vfb_warn!(SOURCE, "{}() ignored: device lost", operation);
            return Err(Error::DeviceLost);
        }
        Ok(())
    }

    pub(super) fn ring_mut(&mut self) -> Result<&mut FrameRing> {
        self.ring.as_mut().ok_or(Error::DeviceLost)
    }

    fn require_target(&self, operation: &str) -> Result<VfbKey> {
        match self.current_target {
            Some(key) if self.cache.contains(key) => Ok(key),
            _ => Err(vfb_reject!(SOURCE, "{}() without a render target", operation)),
        }
    }

    /// End the open pass, if any, after flushing queued draws
    pub(super) fn end_active_pass(&mut self) -> Result<()> {
        if self.passes.active_target().is_none() {
            return Ok(());
        }
        self.flush_draw_engine();
        self.ring_mut()?.commands()?.end_render_pass()?;
        self.passes.closed();
        Ok(())
    }

    /// Close any open pass and open one on `key`
    fn open_pass(&mut self, key: VfbKey, clear: AttachmentClear) -> Result<()> {
        self.end_active_pass()?;
        self.resolve_pending_reformat(key)?;
        let host = self.host_of(key)?;
        let clear = if host.depth_stencil.is_some() {
            clear
        } else {
            AttachmentClear { depth: None, stencil: None, ..clear }
        };
        self.ring_mut()?.commands()?.begin_render_pass(&RenderPassBegin {
            color: host.color,
            depth_stencil: host.depth_stencil,
            clear,
        })?;
        self.passes.opened(key)?;
        if let Some(vfb) = self.cache.get_mut(key) {
            vfb.insert_flags(VfbFlags::DIRTY);
        }
        vfb_trace!(SOURCE, "Pass opened on {:?} (clear {:?})", key, clear);
        Ok(())
    }

    pub(super) fn flush_draw_engine(&self) {
        if let Some(engine) = &self.draw_engine {
            match engine.lock() {
                Ok(mut engine) => engine.flush(),
                Err(_) => vfb_error!(SOURCE, "Draw engine mutex poisoned, flush skipped"),
            }
        }
    }

    pub(super) fn notify_texture_cache(&self, address: u32, key: VfbKey, event: FramebufferEvent) {
        if let Some(cache) = &self.texture_cache {
            match cache.lock() {
                Ok(mut cache) => cache.notify_framebuffer(address, key, event),
                Err(_) => vfb_error!(SOURCE, "Texture cache mutex poisoned, {:?} dropped", event),
            }
        }
    }
}

#[cfg(test)]
#[path = "framebuffer_manager_tests.rs"]
mod tests;
