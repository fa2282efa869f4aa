/// Texture trait, texture descriptor, and texture info

/// Host texture formats used by render targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    /// Color attachments and pixel textures
    R8G8B8A8_UNORM,
    /// Depth with 8-bit stencil
    D24_UNORM_S8_UINT,
    /// Float depth with 8-bit stencil
    D32_SFLOAT_S8_UINT,
}

impl TextureFormat {
    /// Whether the format carries depth (and stencil) rather than color
    pub fn is_depth_stencil(self) -> bool {
        matches!(self, TextureFormat::D24_UNORM_S8_UINT | TextureFormat::D32_SFLOAT_S8_UINT)
    }
}

/// Texture usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureUsage {
    /// Texture can be sampled in shaders
    Sampled,
    /// Texture can be used as color attachment and sampled
    SampledAndRenderTarget,
    /// Texture can be used as depth/stencil attachment
    DepthStencil,
}

/// Part of a texture addressed by a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureAspect {
    Color,
    Depth,
    Stencil,
    DepthStencil,
}

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage
    pub usage: TextureUsage,
    /// Debug label shown by backends
    pub label: String,
}

/// Read-only properties of a created texture.
#[derive(Debug, Clone)]
pub struct TextureInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage
    pub usage: TextureUsage,
}

/// Texture resource trait
///
/// Implemented by backend-specific texture types.
/// The texture is destroyed when the last reference is dropped.
pub trait Texture: Send + Sync {
    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;

    /// Backend handle, unique for the lifetime of the device
    fn handle(&self) -> u64;
}
