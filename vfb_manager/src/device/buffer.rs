/// Buffer trait and buffer descriptor

use crate::error::Result;

/// Buffer usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Per-frame uniform/push data
    Uniform,
    /// CPU-visible transfer buffer (upload or readback)
    Staging,
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
    /// Buffer usage
    pub usage: BufferUsage,
}

/// Buffer resource trait
///
/// Implemented by backend-specific buffer types.
/// The buffer is destroyed when the last reference is dropped.
pub trait Buffer: Send + Sync {
    /// Size in bytes
    fn size(&self) -> u64;

    /// Write data into the buffer
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset into the buffer in bytes
    /// * `data` - Data to write
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Map the buffer and copy `len` bytes out of it
    ///
    /// Only meaningful for staging buffers once the GPU work writing them
    /// has retired.
    fn read(&self, offset: u64, len: u64) -> Result<Vec<u8>>;

    /// Backend handle, unique for the lifetime of the device
    fn handle(&self) -> u64;
}
