/// Post-shader uniforms and the pipeline that keeps them current
///
/// Deltas are recomputed only when the four input dimensions change; the
/// time vector is refreshed from the clock on every update.

use std::time::Instant;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};

/// Uniform block consumed by post-processing shaders (std140 compatible)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PostShaderUniforms {
    /// 1 / render size
    pub texel_delta: Vec2,
    /// 1 / buffer size
    pub pixel_delta: Vec2,
    /// (seconds, frame, flips, fractional seconds)
    pub time: Vec4,
}

/// Time source for the uniform time vector
pub trait Clock: Send {
    /// Seconds since an arbitrary fixed origin
    fn seconds(&self) -> f64;
}

/// Wall clock starting at creation
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

pub struct PostShaderPipeline {
    clock: Box<dyn Clock>,
    uniforms: PostShaderUniforms,
    last_dims: Option<[u32; 4]>,
    frame: u64,
    flips: u64,
    recomputes: u64,
}

impl PostShaderPipeline {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            uniforms: PostShaderUniforms::zeroed(),
            last_dims: None,
            frame: 0,
            flips: 0,
            recomputes: 0,
        }
    }

    /// Replace the time source
    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.clock = clock;
    }

    /// Counters fed into the time vector
    pub fn set_frame_counters(&mut self, frame: u64, flips: u64) {
        self.frame = frame;
        self.flips = flips;
    }

    /// Refresh the uniforms for the given dimensions
    ///
    /// Zero dimensions are treated as 1.
    pub fn update(&mut self, buffer_w: u32, buffer_h: u32, render_w: u32, render_h: u32) -> PostShaderUniforms {
        let dims = [buffer_w, buffer_h, render_w, render_h];
        if self.last_dims != Some(dims) {
            let inv = |v: u32| 1.0 / v.max(1) as f32;
            self.uniforms.texel_delta = Vec2::new(inv(render_w), inv(render_h));
            self.uniforms.pixel_delta = Vec2::new(inv(buffer_w), inv(buffer_h));
            self.last_dims = Some(dims);
            self.recomputes += 1;
        }

        let seconds = self.clock.seconds();
        self.uniforms.time = Vec4::new(
            seconds as f32,
            self.frame as f32,
            self.flips as f32,
            seconds.fract() as f32,
        );
        self.uniforms
    }

    /// Last computed uniforms
    pub fn uniforms(&self) -> &PostShaderUniforms {
        &self.uniforms
    }

    /// How often the deltas were recomputed
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }
}

#[cfg(test)]
#[path = "post_shader_tests.rs"]
mod tests;
