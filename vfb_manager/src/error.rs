//! Error types for the virtual framebuffer manager
//!
//! This module defines the error types used throughout the crate,
//! including device failures, rejected requests and device loss.

use std::fmt;

/// Result type for framebuffer manager operations
pub type Result<T> = std::result::Result<T, Error>;

/// Framebuffer manager errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan, Direct3D, mock, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (unknown framebuffer key, destroyed texture, etc.)
    InvalidResource(String),

    /// Initialization failed (device objects, frame ring)
    InitializationFailed(String),

    /// Request rejected before touching any resource
    /// (degenerate dimensions, mismatched depth layouts, ...)
    InvalidRequest(String),

    /// The device is lost; every operation is a no-op until restore
    DeviceLost,

    /// GPU work previously submitted against a ring slot has not retired
    FrameNotRetired {
        /// Ring slot whose fence did not signal in time
        slot: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            Error::DeviceLost => write!(f, "Device lost"),
            Error::FrameNotRetired { slot } => {
                write!(f, "Frame slot {} still in flight", slot)
            }
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an error (with file:line) and build an `Error::BackendError`
///
/// # Example
///
/// ```ignore
/// let buffer = device.create_buffer(desc)
///     .map_err(|e| vfb_err!("vfb::mock", "Staging allocation failed: {}", e))?;
/// ```
#[macro_export]
macro_rules! vfb_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::log::log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::vfb::Error::BackendError(message)
    }};
}

/// Log an error and return early with `Error::BackendError`
#[macro_export]
macro_rules! vfb_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::vfb_err!($source, $($arg)*))
    };
}

/// Log a warning and build an `Error::InvalidRequest`
///
/// Used for requests that are rejected synchronously without mutating
/// any resource.
#[macro_export]
macro_rules! vfb_reject {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::log::log(
            $crate::log::LogSeverity::Warn,
            $source,
            message.clone(),
        );
        $crate::vfb::Error::InvalidRequest(message)
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
