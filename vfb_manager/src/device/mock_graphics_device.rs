/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Textures and buffers live in CPU memory and every recorded command is
/// executed immediately on them, so tests can inspect pixel content after
/// blits, clears, reformats and downloads. Recording rules of real APIs
/// (no transfers inside a render pass, no draws outside one, no
/// out-of-bounds regions) are enforced and reported as errors.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use rustc_hash::FxHashMap;

use crate::device::{
    AttachmentClear, Buffer, BufferDesc, CommandList, DeviceStats, Fence, Filter,
    GraphicsDevice, Rect2D, RenderPassBegin, Texture, TextureAspect, TextureCopy,
    TextureDesc, TextureInfo, TexturedQuad, Viewport,
};
use crate::error::{Error, Result};
use crate::format::PixelConversion;
use crate::vfb_bail;

// ============================================================================
// Mock Texture
// ============================================================================

/// CPU storage behind a mock texture
#[derive(Debug, Default)]
pub struct MockTextureStorage {
    /// RGBA8, tightly packed (color textures)
    pub color: Vec<u8>,
    /// One float per pixel (depth textures)
    pub depth: Vec<f32>,
    /// One byte per pixel (depth textures)
    pub stencil: Vec<u8>,
}

#[derive(Debug)]
pub struct MockTexture {
    pub info: TextureInfo,
    pub handle: u64,
    pub label: String,
    pub storage: Mutex<MockTextureStorage>,
}

impl MockTexture {
    pub fn new(desc: &TextureDesc, handle: u64) -> Self {
        let pixels = (desc.width * desc.height) as usize;
        let storage = if desc.format.is_depth_stencil() {
            MockTextureStorage {
                color: Vec::new(),
                depth: vec![0.0; pixels],
                stencil: vec![0; pixels],
            }
        } else {
            MockTextureStorage {
                color: vec![0; pixels * 4],
                depth: Vec::new(),
                stencil: Vec::new(),
            }
        };
        Self {
            info: TextureInfo {
                width: desc.width,
                height: desc.height,
                format: desc.format,
                usage: desc.usage,
            },
            handle,
            label: desc.label.clone(),
            storage: Mutex::new(storage),
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.info.width + x) as usize
    }

    /// Read one RGBA8 pixel
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y) * 4;
        let storage = self.storage.lock().unwrap();
        [storage.color[i], storage.color[i + 1], storage.color[i + 2], storage.color[i + 3]]
    }

    /// Write one RGBA8 pixel
    pub fn set_pixel(&self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.index(x, y) * 4;
        self.storage.lock().unwrap().color[i..i + 4].copy_from_slice(&rgba);
    }

    /// Fill the whole color storage
    pub fn fill(&self, rgba: [u8; 4]) {
        let mut storage = self.storage.lock().unwrap();
        for px in storage.color.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Snapshot of the color storage
    pub fn color_pixels(&self) -> Vec<u8> {
        self.storage.lock().unwrap().color.clone()
    }

    /// Read one stencil value
    pub fn stencil(&self, x: u32, y: u32) -> u8 {
        let i = self.index(x, y);
        self.storage.lock().unwrap().stencil[i]
    }

    /// Read one depth value
    pub fn depth(&self, x: u32, y: u32) -> f32 {
        let i = self.index(x, y);
        self.storage.lock().unwrap().depth[i]
    }

    /// Write one depth value
    pub fn set_depth(&self, x: u32, y: u32, value: f32) {
        let i = self.index(x, y);
        self.storage.lock().unwrap().depth[i] = value;
    }

    fn contains(&self, rect: Rect2D) -> bool {
        rect.x >= 0
            && rect.y >= 0
            && rect.x as u64 + rect.width as u64 <= self.info.width as u64
            && rect.y as u64 + rect.height as u64 <= self.info.height as u64
    }
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }

    fn handle(&self) -> u64 {
        self.handle
    }
}

// ============================================================================
// Mock Buffer
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub handle: u64,
    pub data: Mutex<Vec<u8>>,
}

impl MockBuffer {
    pub fn new(size: u64, handle: u64) -> Self {
        Self {
            handle,
            data: Mutex::new(vec![0; size as usize]),
        }
    }
}

impl Buffer for MockBuffer {
    fn size(&self) -> u64 {
        self.data.lock().unwrap().len() as u64
    }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        let mut storage = self.data.lock().unwrap();
        let end = offset as usize + data.len();
        if end > storage.len() {
            vfb_bail!("vfb::mock", "Buffer update out of range ({} > {})", end, storage.len());
        }
        storage[offset as usize..end].copy_from_slice(data);
        Ok(())
    }

    fn read(&self, offset: u64, len: u64) -> Result<Vec<u8>> {
        let storage = self.data.lock().unwrap();
        let end = (offset + len) as usize;
        if end > storage.len() {
            vfb_bail!("vfb::mock", "Buffer read out of range ({} > {})", end, storage.len());
        }
        Ok(storage[offset as usize..end].to_vec())
    }

    fn handle(&self) -> u64 {
        self.handle
    }
}

// ============================================================================
// Mock Fence
// ============================================================================

#[derive(Debug)]
pub struct MockFence {
    signaled: AtomicBool,
    handle: u64,
}

impl MockFence {
    pub fn new(signaled: bool, handle: u64) -> Self {
        Self { signaled: AtomicBool::new(signaled), handle }
    }

    pub fn signal(&self) {
        self.signaled.store(true, Ordering::SeqCst);
    }
}

impl Fence for MockFence {
    fn is_signaled(&self) -> bool {
        self.signaled.load(Ordering::SeqCst)
    }

    fn wait(&self, _timeout: Duration) -> Result<bool> {
        Ok(self.is_signaled())
    }

    fn reset(&self) -> Result<()> {
        self.signaled.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn handle(&self) -> u64 {
        self.handle
    }
}

// ============================================================================
// Shared device state
// ============================================================================

/// State shared by the mock device, its command lists and the test
///
/// Tests keep a clone of the `Arc` to inspect resources and to inject
/// failures after the device has been handed to the manager.
#[derive(Debug, Default)]
pub struct MockDeviceState {
    textures: Mutex<FxHashMap<u64, Weak<MockTexture>>>,
    buffers: Mutex<FxHashMap<u64, Weak<MockBuffer>>>,
    fences: Mutex<FxHashMap<u64, Weak<MockFence>>>,
    pending_fences: Mutex<Vec<Arc<MockFence>>>,
    next_handle: AtomicU64,
    submits: AtomicU64,
    /// Render passes begun on any command list
    pub render_passes_begun: AtomicU64,
    /// Number of upcoming texture allocations that fail
    pub fail_next_textures: AtomicU32,
    /// Every buffer allocation fails while set
    pub fail_buffers: AtomicBool,
    /// Submitted fences stay pending until `retire_all()`
    pub hold_fences: AtomicBool,
}

impl MockDeviceState {
    fn next_handle(&self) -> u64 {
        self.next_handle.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Look up a live texture by handle
    pub fn texture(&self, handle: u64) -> Option<Arc<MockTexture>> {
        self.textures.lock().unwrap().get(&handle).and_then(Weak::upgrade)
    }

    /// Look up a live buffer by handle
    pub fn buffer(&self, handle: u64) -> Option<Arc<MockBuffer>> {
        self.buffers.lock().unwrap().get(&handle).and_then(Weak::upgrade)
    }

    /// Look up a live fence by handle
    pub fn fence(&self, handle: u64) -> Option<Arc<MockFence>> {
        self.fences.lock().unwrap().get(&handle).and_then(Weak::upgrade)
    }

    /// Number of submits so far
    pub fn submits(&self) -> u64 {
        self.submits.load(Ordering::SeqCst)
    }

    /// Number of textures still referenced somewhere
    pub fn live_textures(&self) -> u32 {
        self.textures.lock().unwrap().values().filter(|w| w.strong_count() > 0).count() as u32
    }

    /// Number of buffers still referenced somewhere
    pub fn live_buffers(&self) -> u32 {
        self.buffers.lock().unwrap().values().filter(|w| w.strong_count() > 0).count() as u32
    }

    /// Signal every fence held back by `hold_fences`
    pub fn retire_all(&self) {
        for fence in self.pending_fences.lock().unwrap().drain(..) {
            fence.signal();
        }
    }

    fn resolve_texture(&self, texture: &Arc<dyn Texture>) -> Result<Arc<MockTexture>> {
        match self.texture(texture.handle()) {
            Some(t) => Ok(t),
            None => vfb_bail!("vfb::mock", "Unknown texture handle {}", texture.handle()),
        }
    }

    fn resolve_buffer(&self, buffer: &Arc<dyn Buffer>) -> Result<Arc<MockBuffer>> {
        match self.buffer(buffer.handle()) {
            Some(b) => Ok(b),
            None => vfb_bail!("vfb::mock", "Unknown buffer handle {}", buffer.handle()),
        }
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

struct ActivePass {
    color: Arc<MockTexture>,
    depth_stencil: Option<Arc<MockTexture>>,
}

pub struct MockCommandList {
    state: Arc<MockDeviceState>,
    /// Names of recorded commands, in order
    pub commands: Vec<String>,
    recording: bool,
    pass: Option<ActivePass>,
}

impl MockCommandList {
    pub fn new(state: Arc<MockDeviceState>) -> Self {
        Self {
            state,
            commands: Vec::new(),
            recording: false,
            pass: None,
        }
    }

    fn record(&mut self, name: &str) -> Result<()> {
        if !self.recording {
            vfb_bail!("vfb::mock", "{} recorded outside begin()/end()", name);
        }
        self.commands.push(name.to_string());
        Ok(())
    }

    fn require_transfer(&mut self, name: &str) -> Result<()> {
        self.record(name)?;
        if self.pass.is_some() {
            vfb_bail!("vfb::mock", "{} recorded inside a render pass", name);
        }
        Ok(())
    }

    fn require_pass(&mut self, name: &str) -> Result<&ActivePass> {
        self.record(name)?;
        match self.pass.as_ref() {
            Some(pass) => Ok(pass),
            None => vfb_bail!("vfb::mock", "{} recorded outside a render pass", name),
        }
    }

    fn apply_clear(pass: &ActivePass, clear: &AttachmentClear) {
        if let Some(color) = clear.color {
            let rgba = color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
            pass.color.fill(rgba);
        }
        if let Some(ds) = &pass.depth_stencil {
            let mut storage = ds.storage.lock().unwrap();
            if let Some(depth) = clear.depth {
                storage.depth.iter_mut().for_each(|d| *d = depth);
            }
            if let Some(stencil) = clear.stencil {
                storage.stencil.iter_mut().for_each(|s| *s = stencil);
            }
        }
    }
}

impl CommandList for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        if self.recording {
            vfb_bail!("vfb::mock", "begin() on a command list already recording");
        }
        self.recording = true;
        self.commands.clear();
        self.commands.push("begin".to_string());
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        if self.pass.is_some() {
            vfb_bail!("vfb::mock", "end() with an open render pass");
        }
        self.record("end")?;
        self.recording = false;
        Ok(())
    }

    fn begin_render_pass(&mut self, pass: &RenderPassBegin) -> Result<()> {
        self.record("begin_render_pass")?;
        if self.pass.is_some() {
            vfb_bail!("vfb::mock", "begin_render_pass() inside a render pass");
        }
        let color = self.state.resolve_texture(&pass.color)?;
        let depth_stencil = match &pass.depth_stencil {
            Some(ds) => Some(self.state.resolve_texture(ds)?),
            None => None,
        };
        let active = ActivePass { color, depth_stencil };
        Self::apply_clear(&active, &pass.clear);
        self.pass = Some(active);
        self.state.render_passes_begun.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.require_pass("end_render_pass")?;
        self.pass = None;
        Ok(())
    }

    fn clear_attachments(&mut self, clear: &AttachmentClear) -> Result<()> {
        let pass = self.require_pass("clear_attachments")?;
        Self::apply_clear(pass, clear);
        Ok(())
    }

    fn set_viewport(&mut self, _viewport: Viewport) -> Result<()> {
        self.require_pass("set_viewport")?;
        Ok(())
    }

    fn bind_uniforms(&mut self, buffer: &Arc<dyn Buffer>, offset: u64, size: u64) -> Result<()> {
        self.record("bind_uniforms")?;
        if offset + size > buffer.size() {
            vfb_bail!("vfb::mock", "Uniform range {}+{} exceeds buffer size {}",
                offset, size, buffer.size());
        }
        Ok(())
    }

    fn copy_texture(
        &mut self,
        src: &Arc<dyn Texture>,
        dst: &Arc<dyn Texture>,
        aspect: TextureAspect,
        region: &TextureCopy,
    ) -> Result<()> {
        self.require_transfer("copy_texture")?;
        let src = self.state.resolve_texture(src)?;
        let dst = self.state.resolve_texture(dst)?;
        if src.info.format != dst.info.format {
            vfb_bail!("vfb::mock", "copy_texture between {:?} and {:?}", src.info.format, dst.info.format);
        }
        let src_rect = Rect2D::new(region.src_x as i32, region.src_y as i32, region.width, region.height);
        let dst_rect = Rect2D::new(region.dst_x as i32, region.dst_y as i32, region.width, region.height);
        if !src.contains(src_rect) || !dst.contains(dst_rect) {
            vfb_bail!("vfb::mock", "copy_texture region {:?} out of bounds", region);
        }

        // Snapshot the source first so src == dst cannot deadlock
        let snapshot = {
            let s = src.storage.lock().unwrap();
            (s.color.clone(), s.depth.clone(), s.stencil.clone())
        };
        let mut d = dst.storage.lock().unwrap();
        for row in 0..region.height {
            for col in 0..region.width {
                let si = src.index(region.src_x + col, region.src_y + row);
                let di = dst.index(region.dst_x + col, region.dst_y + row);
                match aspect {
                    TextureAspect::Color => {
                        let px = [snapshot.0[si * 4], snapshot.0[si * 4 + 1], snapshot.0[si * 4 + 2], snapshot.0[si * 4 + 3]];
                        d.color[di * 4..di * 4 + 4].copy_from_slice(&px);
                    }
                    TextureAspect::Depth => d.depth[di] = snapshot.1[si],
                    TextureAspect::Stencil => d.stencil[di] = snapshot.2[si],
                    TextureAspect::DepthStencil => {
                        d.depth[di] = snapshot.1[si];
                        d.stencil[di] = snapshot.2[si];
                    }
                }
            }
        }
        Ok(())
    }

    fn blit_texture(
        &mut self,
        src: &Arc<dyn Texture>,
        src_rect: Rect2D,
        dst: &Arc<dyn Texture>,
        dst_rect: Rect2D,
        _filter: Filter,
    ) -> Result<()> {
        self.require_transfer("blit_texture")?;
        let src = self.state.resolve_texture(src)?;
        let dst = self.state.resolve_texture(dst)?;
        if !src.contains(src_rect) || !dst.contains(dst_rect) {
            vfb_bail!("vfb::mock", "blit_texture {:?} -> {:?} out of bounds", src_rect, dst_rect);
        }
        if src_rect.is_empty() || dst_rect.is_empty() {
            return Ok(());
        }
        let snapshot = src.color_pixels();
        for dy in 0..dst_rect.height {
            for dx in 0..dst_rect.width {
                let sx = src_rect.x as u32 + dx * src_rect.width / dst_rect.width;
                let sy = src_rect.y as u32 + dy * src_rect.height / dst_rect.height;
                let si = src.index(sx, sy) * 4;
                dst.set_pixel(
                    dst_rect.x as u32 + dx,
                    dst_rect.y as u32 + dy,
                    [snapshot[si], snapshot[si + 1], snapshot[si + 2], snapshot[si + 3]],
                );
            }
        }
        Ok(())
    }

    fn copy_texture_to_buffer(
        &mut self,
        src: &Arc<dyn Texture>,
        aspect: TextureAspect,
        rect: Rect2D,
        dst: &Arc<dyn Buffer>,
        dst_offset: u64,
    ) -> Result<()> {
        self.require_transfer("copy_texture_to_buffer")?;
        let src = self.state.resolve_texture(src)?;
        let dst = self.state.resolve_buffer(dst)?;
        if !src.contains(rect) {
            vfb_bail!("vfb::mock", "copy_texture_to_buffer rect {:?} out of bounds", rect);
        }
        let mut bytes = Vec::new();
        {
            let s = src.storage.lock().unwrap();
            for row in 0..rect.height {
                for col in 0..rect.width {
                    let i = src.index(rect.x as u32 + col, rect.y as u32 + row);
                    match aspect {
                        TextureAspect::Color => bytes.extend_from_slice(&s.color[i * 4..i * 4 + 4]),
                        TextureAspect::Depth => bytes.extend_from_slice(&s.depth[i].to_le_bytes()),
                        TextureAspect::Stencil => bytes.push(s.stencil[i]),
                        TextureAspect::DepthStencil => {
                            vfb_bail!("vfb::mock", "copy_texture_to_buffer needs a single aspect");
                        }
                    }
                }
            }
        }
        dst.update(dst_offset, &bytes)
    }

    fn copy_buffer_to_texture(
        &mut self,
        src: &Arc<dyn Buffer>,
        src_offset: u64,
        dst: &Arc<dyn Texture>,
        aspect: TextureAspect,
        rect: Rect2D,
    ) -> Result<()> {
        self.require_transfer("copy_buffer_to_texture")?;
        let src = self.state.resolve_buffer(src)?;
        let dst = self.state.resolve_texture(dst)?;
        if !dst.contains(rect) {
            vfb_bail!("vfb::mock", "copy_buffer_to_texture rect {:?} out of bounds", rect);
        }
        let texel_size = match aspect {
            TextureAspect::Color | TextureAspect::Depth => 4,
            TextureAspect::Stencil => 1,
            TextureAspect::DepthStencil => {
                vfb_bail!("vfb::mock", "copy_buffer_to_texture needs a single aspect");
            }
        };
        let len = rect.width as u64 * rect.height as u64 * texel_size;
        let bytes = src.read(src_offset, len)?;
        let mut d = dst.storage.lock().unwrap();
        let mut cursor = 0usize;
        for row in 0..rect.height {
            for col in 0..rect.width {
                let i = dst.index(rect.x as u32 + col, rect.y as u32 + row);
                match aspect {
                    TextureAspect::Color => d.color[i * 4..i * 4 + 4].copy_from_slice(&bytes[cursor..cursor + 4]),
                    TextureAspect::Depth => {
                        d.depth[i] = f32::from_le_bytes([bytes[cursor], bytes[cursor + 1], bytes[cursor + 2], bytes[cursor + 3]]);
                    }
                    _ => d.stencil[i] = bytes[cursor],
                }
                cursor += texel_size as usize;
            }
        }
        Ok(())
    }

    fn draw_converted(&mut self, src: &Arc<dyn Texture>, conversion: PixelConversion) -> Result<()> {
        let target = self.require_pass("draw_converted")?.color.clone();
        let src = self.state.resolve_texture(src)?;
        if src.info.width != target.info.width || src.info.height != target.info.height {
            vfb_bail!("vfb::mock", "draw_converted size mismatch");
        }
        let mut pixels = src.color_pixels();
        conversion.apply_in_place(&mut pixels);
        target.storage.lock().unwrap().color = pixels;
        Ok(())
    }

    fn draw_textured_quad(&mut self, texture: &Arc<dyn Texture>, quad: &TexturedQuad) -> Result<()> {
        let target = self.require_pass("draw_textured_quad")?.color.clone();
        let src = self.state.resolve_texture(texture)?;
        let snapshot = src.color_pixels();
        let [x, y, w, h] = quad.dst;
        let [u0, v0, u1, v1] = quad.uv;
        let x0 = x.max(0.0).floor() as u32;
        let y0 = y.max(0.0).floor() as u32;
        let x1 = ((x + w).ceil() as u32).min(target.info.width);
        let y1 = ((y + h).ceil() as u32).min(target.info.height);
        for py in y0..y1 {
            for px in x0..x1 {
                let s = ((px as f32 + 0.5 - x) / w).clamp(0.0, 1.0);
                let t = ((py as f32 + 0.5 - y) / h).clamp(0.0, 1.0);
                let (s, t) = match quad.uv_rotation % 4 {
                    0 => (s, t),
                    1 => (t, 1.0 - s),
                    2 => (1.0 - s, 1.0 - t),
                    _ => (1.0 - t, s),
                };
                let u = u0 + s * (u1 - u0);
                let v = v0 + t * (v1 - v0);
                let sx = ((u * src.info.width as f32) as u32).min(src.info.width - 1);
                let sy = ((v * src.info.height as f32) as u32).min(src.info.height - 1);
                let si = src.index(sx, sy) * 4;
                target.set_pixel(px, py, [snapshot[si], snapshot[si + 1], snapshot[si + 2], snapshot[si + 3]]);
            }
        }
        Ok(())
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// Mock device that keeps every resource in CPU memory
pub struct MockGraphicsDevice {
    state: Arc<MockDeviceState>,
    frames_in_flight: usize,
}

impl MockGraphicsDevice {
    /// Create a mock device pipelining two frames
    pub fn new() -> Self {
        Self::with_frames_in_flight(2)
    }

    pub fn with_frames_in_flight(frames_in_flight: usize) -> Self {
        Self {
            state: Arc::new(MockDeviceState::default()),
            frames_in_flight,
        }
    }

    /// Shared state, kept by tests after the device is handed over
    pub fn state(&self) -> Arc<MockDeviceState> {
        self.state.clone()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>> {
        let fail = self.state.fail_next_textures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail {
            return Err(Error::OutOfMemory);
        }
        if desc.width == 0 || desc.height == 0 {
            vfb_bail!("vfb::mock", "create_texture with zero size ({}x{})", desc.width, desc.height);
        }
        let handle = self.state.next_handle();
        let texture = Arc::new(MockTexture::new(&desc, handle));
        self.state.textures.lock().unwrap().insert(handle, Arc::downgrade(&texture));
        Ok(texture)
    }

    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>> {
        if self.state.fail_buffers.load(Ordering::SeqCst) {
            return Err(Error::OutOfMemory);
        }
        let handle = self.state.next_handle();
        let buffer = Arc::new(MockBuffer::new(desc.size, handle));
        self.state.buffers.lock().unwrap().insert(handle, Arc::downgrade(&buffer));
        Ok(buffer)
    }

    fn create_command_list(&self) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(MockCommandList::new(self.state.clone())))
    }

    fn create_fence(&self) -> Result<Arc<dyn Fence>> {
        let handle = self.state.next_handle();
        let fence = Arc::new(MockFence::new(true, handle));
        self.state.fences.lock().unwrap().insert(handle, Arc::downgrade(&fence));
        Ok(fence)
    }

    fn submit(&self, _commands: &dyn CommandList, fence: Option<&Arc<dyn Fence>>) -> Result<()> {
        self.state.submits.fetch_add(1, Ordering::SeqCst);
        if let Some(fence) = fence {
            // Work already executed while recording; only completion is simulated
            let mock = match self.state.fence(fence.handle()) {
                Some(f) => f,
                None => vfb_bail!("vfb::mock", "Unknown fence handle {}", fence.handle()),
            };
            if self.state.hold_fences.load(Ordering::SeqCst) {
                self.state.pending_fences.lock().unwrap().push(mock);
            } else {
                mock.signal();
            }
        }
        Ok(())
    }

    fn frames_in_flight(&self) -> usize {
        self.frames_in_flight
    }

    fn wait_idle(&self) -> Result<()> {
        self.state.retire_all();
        Ok(())
    }

    fn stats(&self) -> DeviceStats {
        DeviceStats {
            textures: self.state.live_textures(),
            buffers: self.state.live_buffers(),
            submits: self.state.submits.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
