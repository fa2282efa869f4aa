/// GraphicsDevice trait - factory and submission interface of the host API

use std::sync::Arc;
use std::time::Duration;
use crate::error::Result;
use crate::device::{Buffer, BufferDesc, CommandList, Texture, TextureDesc};

/// Most frames the manager will ever pipeline
pub const MAX_FRAMES_IN_FLIGHT: usize = 3;

/// Device statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    /// Live textures
    pub textures: u32,
    /// Live buffers
    pub buffers: u32,
    /// Command lists submitted since creation
    pub submits: u64,
}

/// Completion token signalled by the device when submitted work retires
pub trait Fence: Send + Sync {
    /// Whether the work guarded by this fence has retired
    fn is_signaled(&self) -> bool;

    /// Block until signalled or `timeout` elapses
    ///
    /// Returns `Ok(false)` on timeout.
    fn wait(&self, timeout: Duration) -> Result<bool>;

    /// Return the fence to the unsignaled state before resubmission
    fn reset(&self) -> Result<()>;

    /// Backend handle, unique for the lifetime of the device
    fn handle(&self) -> u64;
}

/// Host graphics device
///
/// Implemented by backend-specific devices. Allocation internals and queue
/// submission live behind this trait.
pub trait GraphicsDevice: Send {
    /// Create a texture
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Create a buffer
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Create a command list in the recording-ready state
    fn create_command_list(&self) -> Result<Box<dyn CommandList>>;

    /// Create a fence in the signaled state
    fn create_fence(&self) -> Result<Arc<dyn Fence>>;

    /// Submit recorded commands; `fence` is signalled when they retire
    fn submit(&self, commands: &dyn CommandList, fence: Option<&Arc<dyn Fence>>) -> Result<()>;

    /// Number of frames the host API keeps in flight
    fn frames_in_flight(&self) -> usize;

    /// Wait for all GPU operations to complete
    fn wait_idle(&self) -> Result<()>;

    /// Get statistics about the device
    fn stats(&self) -> DeviceStats;
}
