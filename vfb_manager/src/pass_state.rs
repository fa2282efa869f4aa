/// Render pass state machine
///
/// Tracks which framebuffer, if any, has an open render pass. The manager
/// asks the tracker before recording a pass transition and commits the
/// transition once the commands are recorded.

use crate::error::Result;
use crate::framebuffer::VfbKey;
use crate::vfb_reject;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassState {
    #[default]
    NoActivePass,
    ActivePass(VfbKey),
}

/// What a clear request turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearAction {
    /// Target's pass already open: clear inside it
    InPass,
    /// Open a pass on the target with the clear as load operation,
    /// closing `close` first
    OpenWithClear { close: Option<VfbKey> },
}

#[derive(Debug, Default)]
pub struct PassTracker {
    state: PassState,
    begins: u64,
    ends: u64,
}

impl PassTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    /// Framebuffer whose pass is open
    pub fn active_target(&self) -> Option<VfbKey> {
        match self.state {
            PassState::ActivePass(key) => Some(key),
            PassState::NoActivePass => None,
        }
    }

    pub fn is_active_on(&self, key: VfbKey) -> bool {
        self.state == PassState::ActivePass(key)
    }

    /// Decide how to clear `target`
    pub fn clear_action(&self, target: VfbKey) -> ClearAction {
        match self.state {
            PassState::ActivePass(key) if key == target => ClearAction::InPass,
            PassState::ActivePass(key) => ClearAction::OpenWithClear { close: Some(key) },
            PassState::NoActivePass => ClearAction::OpenWithClear { close: None },
        }
    }

    /// Record that a pass on `target` was begun
    pub fn opened(&mut self, target: VfbKey) -> Result<()> {
        if let PassState::ActivePass(key) = self.state {
            return Err(vfb_reject!("vfb::PassTracker",
                "Pass on {:?} opened while {:?} is still active", target, key));
        }
        self.state = PassState::ActivePass(target);
        self.begins += 1;
        Ok(())
    }

    /// Record that the open pass was ended
    pub fn closed(&mut self) -> Option<VfbKey> {
        let closed = self.active_target();
        if closed.is_some() {
            self.ends += 1;
        }
        self.state = PassState::NoActivePass;
        closed
    }

    /// Drop the open pass without ending it (device loss)
    pub fn invalidate(&mut self) {
        self.state = PassState::NoActivePass;
    }

    /// Passes begun since creation
    pub fn render_pass_begins(&self) -> u64 {
        self.begins
    }

    /// Passes ended since creation
    pub fn render_pass_ends(&self) -> u64 {
        self.ends
    }
}

#[cfg(test)]
#[path = "pass_state_tests.rs"]
mod tests;
