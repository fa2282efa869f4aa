//! Guest pixel formats and the reformat conversion table

pub mod guest_format;
pub mod conversion;

pub use guest_format::GuestFormat;
pub use conversion::{PixelConversion, AlphaRule, CONVERSION_TABLE};

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
