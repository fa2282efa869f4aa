/// Frame ring and per-frame push buffers

pub mod push_buffer;
pub mod frame_ring;

pub use push_buffer::{PushAllocation, PushBuffer, PUSH_ALIGNMENT};
pub use frame_ring::{FrameData, FrameRing};

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
