/// FramebufferCache - virtual framebuffers keyed by guest address.
///
/// Entries live in a SlotMap so keys stay valid while other entries are
/// removed. A side index maps guest addresses to keys; at most one entry
/// exists per address.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use crate::format::GuestFormat;
use super::virtual_framebuffer::{GuestIdentity, HostTargets, VfbKey, VirtualFramebuffer};

/// How a requested identity differs from the cached one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdentityChange {
    /// Visible width or height differ
    pub resized: bool,
    /// Row stride differs
    pub stride_changed: bool,
    /// Previous format, when the format differs
    pub old_format: Option<GuestFormat>,
}

impl IdentityChange {
    pub fn is_empty(&self) -> bool {
        !self.resized && !self.stride_changed && self.old_format.is_none()
    }
}

/// Result of looking up a guest identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    /// Same address and identical identity
    Hit(VfbKey),
    /// Same address, different stride/format/size
    Changed(VfbKey, IdentityChange),
    /// No framebuffer at that address
    Miss,
}

/// Address-keyed store of virtual framebuffers
pub struct FramebufferCache {
    framebuffers: SlotMap<VfbKey, VirtualFramebuffer>,
    by_address: FxHashMap<u32, VfbKey>,
}

impl FramebufferCache {
    pub fn new() -> Self {
        Self {
            framebuffers: SlotMap::with_key(),
            by_address: FxHashMap::default(),
        }
    }

    /// Classify `identity` against the cached entry at its address
    pub fn lookup(&self, identity: &GuestIdentity) -> CacheLookup {
        let key = match self.by_address.get(&identity.address) {
            Some(&key) => key,
            None => return CacheLookup::Miss,
        };
        let cached = match self.framebuffers.get(key) {
            Some(vfb) => vfb.identity(),
            None => return CacheLookup::Miss,
        };
        let change = IdentityChange {
            resized: cached.width != identity.width || cached.height != identity.height,
            stride_changed: cached.stride != identity.stride,
            old_format: (cached.format != identity.format).then_some(cached.format),
        };
        if change.is_empty() {
            CacheLookup::Hit(key)
        } else {
            CacheLookup::Changed(key, change)
        }
    }

    /// Insert a framebuffer, replacing any entry at the same address
    ///
    /// Returns the new key and the displaced entry, if any.
    pub fn insert(&mut self, vfb: VirtualFramebuffer) -> (VfbKey, Option<VirtualFramebuffer>) {
        let address = vfb.address();
        let displaced = self.by_address.get(&address)
            .copied()
            .and_then(|old| self.framebuffers.remove(old));
        let key = self.framebuffers.insert(vfb);
        self.by_address.insert(address, key);
        (key, displaced)
    }

    /// Remove a framebuffer; its host resources go with it
    pub fn remove(&mut self, key: VfbKey) -> Option<VirtualFramebuffer> {
        let vfb = self.framebuffers.remove(key)?;
        if self.by_address.get(&vfb.address()) == Some(&key) {
            self.by_address.remove(&vfb.address());
        }
        Some(vfb)
    }

    /// Remove every framebuffer
    pub fn drain(&mut self) -> Vec<(VfbKey, VirtualFramebuffer)> {
        self.by_address.clear();
        self.framebuffers.drain().collect()
    }

    /// Release host resources of every entry, keeping identities
    pub fn release_host_resources(&mut self) -> Vec<HostTargets> {
        self.framebuffers.values_mut()
            .filter_map(|vfb| vfb.release_host())
            .collect()
    }

    pub fn get(&self, key: VfbKey) -> Option<&VirtualFramebuffer> {
        self.framebuffers.get(key)
    }

    pub fn get_mut(&mut self, key: VfbKey) -> Option<&mut VirtualFramebuffer> {
        self.framebuffers.get_mut(key)
    }

    pub fn contains(&self, key: VfbKey) -> bool {
        self.framebuffers.contains_key(key)
    }

    /// Key of the framebuffer at a guest address
    pub fn key_for_address(&self, address: u32) -> Option<VfbKey> {
        self.by_address.get(&address).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = VfbKey> + '_ {
        self.framebuffers.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VfbKey, &VirtualFramebuffer)> {
        self.framebuffers.iter()
    }

    pub fn len(&self) -> usize {
        self.framebuffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.framebuffers.is_empty()
    }

    /// Framebuffers not referenced during the last `max_age` frames
    pub fn stale_framebuffers(&self, current_frame: u64, max_age: u64) -> Vec<VfbKey> {
        self.framebuffers.iter()
            .filter(|(_, vfb)| current_frame.saturating_sub(vfb.last_frame_referenced()) > max_age)
            .map(|(key, _)| key)
            .collect()
    }
}

impl Default for FramebufferCache {
    fn default() -> Self {
        Self::new()
    }
}
