/// Framebuffer manager and the collaborator interfaces it drives

pub mod framebuffer_manager;
pub mod collaborators;
pub mod reformat;
pub mod download;
pub mod present;

pub use framebuffer_manager::{BindFlags, FramebufferManager, ManagerStats, MAX_TEXTURE_STAGES};
pub use collaborators::{DrawEngine, FramebufferEvent, GuestMemory, TextureCache};
pub use reformat::ReformatOutcome;
pub use present::PixelTexture;
