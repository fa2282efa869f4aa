/// Interfaces of the emulator components the manager talks to
///
/// All three are injected after construction and shared as
/// `Arc<Mutex<dyn _>>`. The manager works without them; operations that
/// need guest memory are rejected until it is set.

use crate::error::Result;
use crate::framebuffer::VfbKey;

/// Framebuffer lifecycle events forwarded to the texture cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferEvent {
    /// New framebuffer with fresh host resources
    Created,
    /// Host resources replaced or content reinterpreted (resize, reformat)
    Updated,
    /// Framebuffer removed or host resources released
    Destroyed,
}

/// Texture cache listener
///
/// Textures sampled from guest VRAM may alias framebuffers; the cache
/// drops or refreshes such bindings on these notifications.
pub trait TextureCache: Send {
    fn notify_framebuffer(&mut self, address: u32, key: VfbKey, event: FramebufferEvent);
}

/// Draw engine listener
pub trait DrawEngine: Send {
    /// Emit every queued draw into the open render pass
    fn flush(&mut self);
}

/// Guest memory accessor
pub trait GuestMemory: Send {
    /// Fill `out` with guest bytes starting at `address`
    fn read(&self, address: u32, out: &mut [u8]) -> Result<()>;

    /// Store `data` at guest `address`
    fn write(&mut self, address: u32, data: &[u8]) -> Result<()>;
}
