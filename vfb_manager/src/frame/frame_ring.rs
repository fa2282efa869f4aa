/// FrameRing - per-frame resources cycled across the frames in flight
///
/// Each slot owns a push buffer, a command list and a fence. A slot is
/// reused only after its fence signalled, so anything recorded or pushed
/// during frame N stays valid until N retires.

use std::sync::Arc;
use std::time::Duration;
use crate::device::{Buffer, CommandList, Fence, GraphicsDevice, MAX_FRAMES_IN_FLIGHT};
use crate::error::{Error, Result};
use crate::framebuffer::PendingCopy;
use crate::{vfb_reject, vfb_trace, vfb_warn};
use super::push_buffer::{PushAllocation, PushBuffer};

/// Resources of one ring slot
pub struct FrameData {
    push: PushBuffer,
    commands: Box<dyn CommandList>,
    fence: Arc<dyn Fence>,
    /// Serial of the last recording started in this slot (0 = never used)
    serial: u64,
    /// Transient buffers kept alive until the slot retires
    retained: Vec<Arc<dyn Buffer>>,
}

impl FrameData {
    fn new(device: &mut dyn GraphicsDevice, push_size: u64) -> Result<Self> {
        Ok(Self {
            push: PushBuffer::new(device, push_size)?,
            commands: device.create_command_list()?,
            fence: device.create_fence()?,
            serial: 0,
            retained: Vec::new(),
        })
    }

    pub fn push_buffer(&self) -> &PushBuffer {
        &self.push
    }

    pub fn fence(&self) -> &Arc<dyn Fence> {
        &self.fence
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }
}

pub struct FrameRing {
    frames: Vec<FrameData>,
    current: usize,
    recording: bool,
    last_serial: u64,
    fence_timeout: Duration,
}

impl FrameRing {
    /// Create one slot per frame the device keeps in flight
    pub fn new(device: &mut dyn GraphicsDevice, push_size: u64, fence_timeout: Duration) -> Result<Self> {
        let count = device.frames_in_flight().clamp(1, MAX_FRAMES_IN_FLIGHT);
        let frames = (0..count)
            .map(|_| FrameData::new(device, push_size))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            frames,
            // The first begin_frame() lands on slot 0
            current: count - 1,
            recording: false,
            last_serial: 0,
            fence_timeout,
        })
    }

    /// Advance to the next slot and start recording into it
    ///
    /// Fails with `Error::FrameNotRetired` when the slot's previous work has
    /// not retired within the fence timeout; the ring does not advance then.
    pub fn begin_frame(&mut self) -> Result<()> {
        if self.recording {
            return Err(vfb_reject!("vfb::FrameRing", "begin_frame() while slot {} is recording", self.current));
        }
        let next = (self.current + 1) % self.frames.len();
        let frame = &mut self.frames[next];
        if !frame.fence.is_signaled() && !frame.fence.wait(self.fence_timeout)? {
            vfb_warn!("vfb::FrameRing", "Slot {} not retired after {:?}", next, self.fence_timeout);
            return Err(Error::FrameNotRetired { slot: next });
        }

        frame.push.reset();
        frame.retained.clear();
        frame.commands.begin()?;
        self.last_serial += 1;
        frame.serial = self.last_serial;
        self.current = next;
        self.recording = true;
        vfb_trace!("vfb::FrameRing", "Frame serial {} recording in slot {}", frame.serial, next);
        Ok(())
    }

    /// Finish recording and submit the current slot
    pub fn end_frame(&mut self, device: &dyn GraphicsDevice) -> Result<()> {
        if !self.recording {
            return Err(vfb_reject!("vfb::FrameRing", "end_frame() without begin_frame()"));
        }
        self.recording = false;
        let frame = &mut self.frames[self.current];
        frame.commands.end()?;
        frame.fence.reset()?;
        device.submit(frame.commands.as_ref(), Some(&frame.fence))
    }

    /// Submit what the current slot recorded so far, wait for it to retire
    /// and continue recording in the same slot
    pub fn flush_and_wait(&mut self, device: &dyn GraphicsDevice) -> Result<()> {
        self.end_frame(device)?;
        let slot = self.current;
        let frame = &mut self.frames[slot];
        if !frame.fence.wait(self.fence_timeout)? {
            vfb_warn!("vfb::FrameRing", "Synchronous flush of slot {} timed out", slot);
            return Err(Error::FrameNotRetired { slot });
        }
        frame.retained.clear();
        frame.commands.begin()?;
        self.last_serial += 1;
        frame.serial = self.last_serial;
        self.recording = true;
        Ok(())
    }

    /// Block until the work recorded under `pending` has retired
    pub fn wait_for(&mut self, device: &dyn GraphicsDevice, pending: PendingCopy) -> Result<()> {
        let serial = match self.frames.get(pending.slot) {
            Some(frame) => frame.serial,
            None => return Err(Error::InvalidResource(format!("ring slot {}", pending.slot))),
        };
        if serial != pending.serial {
            // Slot was recycled, which required its fence
            return Ok(());
        }
        if self.recording && pending.slot == self.current {
            return self.flush_and_wait(device);
        }
        let fence = &self.frames[pending.slot].fence;
        if !fence.is_signaled() && !fence.wait(self.fence_timeout)? {
            return Err(Error::FrameNotRetired { slot: pending.slot });
        }
        Ok(())
    }

    /// Command list of the frame being recorded
    pub fn commands(&mut self) -> Result<&mut dyn CommandList> {
        if !self.recording {
            return Err(vfb_reject!("vfb::FrameRing", "No frame in progress; call begin_frame() first"));
        }
        Ok(self.frames[self.current].commands.as_mut())
    }

    /// Allocate uniform data in the current frame's push buffer
    pub fn push(&mut self, device: &mut dyn GraphicsDevice, data: &[u8]) -> Result<PushAllocation> {
        if !self.recording {
            return Err(vfb_reject!("vfb::FrameRing", "push() outside of a frame"));
        }
        self.frames[self.current].push.push(device, data)
    }

    /// Keep a transient buffer alive until the current slot retires
    pub fn retain(&mut self, buffer: Arc<dyn Buffer>) {
        self.frames[self.current].retained.push(buffer);
    }

    /// Where a copy recorded now will complete
    pub fn pending_copy(&self) -> PendingCopy {
        PendingCopy {
            slot: self.current,
            serial: self.frames[self.current].serial,
        }
    }

    pub fn current_slot(&self) -> usize {
        self.current
    }

    pub fn frame(&self, slot: usize) -> Option<&FrameData> {
        self.frames.get(slot)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }
}
