/// PushBuffer - per-frame linear allocator for uniform data
///
/// Allocations bump an offset inside the current block. When a block is
/// full a larger one is allocated; on `reset()` only the largest block is
/// kept so the buffer settles at the frame's peak usage.

use std::sync::Arc;
use crate::device::{Buffer, BufferDesc, BufferUsage, GraphicsDevice};
use crate::error::Result;

/// Alignment of every allocation (minimum uniform offset alignment)
pub const PUSH_ALIGNMENT: u64 = 256;

/// A range handed out by `PushBuffer::push`
#[derive(Clone)]
pub struct PushAllocation {
    pub buffer: Arc<dyn Buffer>,
    pub offset: u64,
    pub size: u64,
}

pub struct PushBuffer {
    blocks: Vec<Arc<dyn Buffer>>,
    offset: u64,
    used: u64,
}

fn align_up(value: u64) -> u64 {
    (value + PUSH_ALIGNMENT - 1) / PUSH_ALIGNMENT * PUSH_ALIGNMENT
}

impl PushBuffer {
    /// Create a push buffer with one block of `size` bytes
    pub fn new(device: &mut dyn GraphicsDevice, size: u64) -> Result<Self> {
        let block = device.create_buffer(BufferDesc {
            size: align_up(size.max(1)),
            usage: BufferUsage::Uniform,
        })?;
        Ok(Self {
            blocks: vec![block],
            offset: 0,
            used: 0,
        })
    }

    /// Copy `data` into the buffer, growing it if needed
    pub fn push(&mut self, device: &mut dyn GraphicsDevice, data: &[u8]) -> Result<PushAllocation> {
        let size = data.len() as u64;
        let aligned = align_up(size.max(1));

        if self.offset + aligned > self.current().size() {
            let grown = (self.current().size() * 2).max(aligned);
            let block = device.create_buffer(BufferDesc {
                size: grown,
                usage: BufferUsage::Uniform,
            })?;
            self.blocks.push(block);
            self.offset = 0;
        }

        let buffer = self.current().clone();
        buffer.update(self.offset, data)?;
        let allocation = PushAllocation { buffer, offset: self.offset, size };
        self.offset += aligned;
        self.used += aligned;
        Ok(allocation)
    }

    /// Forget every allocation of the previous use of this frame
    ///
    /// Must only be called once the GPU finished reading the data.
    pub fn reset(&mut self) {
        if self.blocks.len() > 1 {
            let largest = self.blocks.len() - 1;
            self.blocks.swap(0, largest);
            self.blocks.truncate(1);
        }
        self.offset = 0;
        self.used = 0;
    }

    /// Bytes handed out since the last reset (aligned)
    pub fn used(&self) -> u64 {
        self.used
    }

    /// Size of the block currently allocated from
    pub fn capacity(&self) -> u64 {
        self.current().size()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn current(&self) -> &Arc<dyn Buffer> {
        // Never empty: `new()` allocates one block and `reset()` keeps one
        &self.blocks[self.blocks.len() - 1]
    }
}
