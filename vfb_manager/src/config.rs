//! Framebuffer manager configuration
//!
//! All tunables of the manager live in `ManagerConfig`. A config is
//! validated once when the manager is created; nothing reads global
//! settings afterwards.

use std::time::Duration;
use crate::device::TextureFormat;
use crate::error::{Error, Result};

/// Guest display width the hardware renders at natively
pub const NATIVE_WIDTH: u32 = 480;
/// Guest display height the hardware renders at natively
pub const NATIVE_HEIGHT: u32 = 272;

/// How guest dimensions map to host render resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderScale {
    /// Integer multiple of the guest size
    Integer(u32),
    /// Arbitrary factor (e.g. 1.5x)
    Fractional(f32),
    /// Largest integer multiple of the native display fitting the output
    FitOutput,
}

impl RenderScale {
    /// Scale factor for the given host output size
    pub fn factor(self, output_width: u32, output_height: u32) -> f32 {
        match self {
            RenderScale::Integer(n) => n.max(1) as f32,
            RenderScale::Fractional(f) => f,
            RenderScale::FitOutput => {
                let fit = (output_width / NATIVE_WIDTH).min(output_height / NATIVE_HEIGHT);
                fit.max(1) as f32
            }
        }
    }
}

/// Framebuffer manager configuration
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Guest → host resolution mapping
    pub render_scale: RenderScale,
    /// Format of depth/stencil attachments
    pub depth_format: TextureFormat,
    /// Whether render targets get a depth/stencil attachment
    pub create_depth: bool,
    /// Initial size of each frame's push buffer in bytes
    pub push_buffer_size: u64,
    /// Longest `begin_frame()` waits for a ring slot to retire
    pub fence_timeout: Duration,
    /// Initial host output size (for `RenderScale::FitOutput`)
    pub output_size: (u32, u32),
    /// Frames without reference after which a framebuffer counts as stale
    pub stale_frame_age: u64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            render_scale: RenderScale::Integer(1),
            depth_format: TextureFormat::D24_UNORM_S8_UINT,
            create_depth: true,
            push_buffer_size: 64 * 1024,
            fence_timeout: Duration::from_secs(1),
            output_size: (NATIVE_WIDTH, NATIVE_HEIGHT),
            stale_frame_age: 6,
        }
    }
}

impl ManagerConfig {
    /// Check the configuration for values the manager cannot work with
    pub fn validate(&self) -> Result<()> {
        match self.render_scale {
            RenderScale::Integer(0) => {
                return Err(Error::InitializationFailed("render scale must be at least 1".to_string()));
            }
            RenderScale::Fractional(f) if !(f.is_finite() && f > 0.0) => {
                return Err(Error::InitializationFailed(format!("invalid fractional render scale {}", f)));
            }
            _ => {}
        }
        if !self.depth_format.is_depth_stencil() {
            return Err(Error::InitializationFailed(
                format!("{:?} is not a depth/stencil format", self.depth_format)
            ));
        }
        if self.push_buffer_size == 0 {
            return Err(Error::InitializationFailed("push buffer size must be non-zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
