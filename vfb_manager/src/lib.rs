/*!
# VFB Manager

Virtual framebuffer management for emulated fixed-function GPUs.

Guest software addresses framebuffers by memory address, stride and pixel
format. This crate maps each such identity onto host render targets at a
configurable render scale, keeps them coherent across format changes, and
reads them back into guest memory on demand.

## Architecture

- **FramebufferManager**: owns the cache, the frame ring and the pass state
- **FramebufferCache**: virtual framebuffers keyed by guest address
- **FrameRing**: per-frame push buffers, command lists and fences
- **PassTracker**: which framebuffer the open render pass targets
- **GraphicsDevice**: host API abstraction implemented by backends

Collaborators from the surrounding emulator (texture cache, draw engine,
guest memory) are injected after construction.
*/

// Internal modules
mod error;
pub mod log;
pub mod config;
pub mod device;
pub mod format;
pub mod framebuffer;
pub mod frame;
pub mod post_shader;
pub mod pass_state;
pub mod blit;
pub mod manager;

// Main vfb namespace module
pub mod vfb {
    // Error types
    pub use crate::error::{Error, Result};

    // Manager and its configuration
    pub use crate::manager::{BindFlags, FramebufferManager, ManagerStats, ReformatOutcome};
    pub use crate::config::{ManagerConfig, RenderScale};

    // Collaborator interfaces
    pub use crate::manager::{DrawEngine, FramebufferEvent, GuestMemory, TextureCache};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, set_logger, reset_logger};
    }

    // Host API sub-module
    pub mod device {
        pub use crate::device::*;
    }

    // Guest formats sub-module
    pub mod format {
        pub use crate::format::*;
    }

    // Framebuffer types sub-module
    pub mod framebuffer {
        pub use crate::framebuffer::{GuestIdentity, VfbFlags, VfbKey, VirtualFramebuffer};
    }
}

// Re-export math library at crate root
pub use glam;
