/// Virtual framebuffers and the address-keyed cache holding them

pub mod virtual_framebuffer;
pub mod framebuffer_cache;

pub use virtual_framebuffer::{
    DownloadBuffer, GuestIdentity, HostTargets, PendingCopy, VfbFlags, VfbKey, VirtualFramebuffer,
};
pub use framebuffer_cache::{CacheLookup, FramebufferCache, IdentityChange};

#[cfg(test)]
#[path = "framebuffer_tests.rs"]
mod tests;
