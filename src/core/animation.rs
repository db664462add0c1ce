//! Frame loop driving pulse spawn/advance and repaint.
//!
//! The loop is host-agnostic: the browser shell hands in a [`FrameHost`] backed
//! by `requestAnimationFrame`, tests hand in a counter. At most one frame
//! request is outstanding at any time.

use tracing::debug;

use crate::config::RadarConfig;
use crate::pulse::PulseSet;
use crate::render::{Painter, Renderer};
use crate::store::DisplayStore;

/// Opaque id of a requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(pub i32);

pub trait FrameHost {
    /// Schedule one callback for the next display frame. `None` when the host
    /// cannot schedule (for example, no window).
    fn request_frame(&mut self) -> Option<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

#[derive(Debug)]
pub struct AnimationLoop {
    state: LoopState,
    pending: Option<FrameHandle>,
    pulses: PulseSet,
    renderer: Renderer,
    frames: u64,
}

impl AnimationLoop {
    pub fn new(cfg: &RadarConfig) -> Self {
        Self {
            state: LoopState::Stopped,
            pending: None,
            pulses: PulseSet::new(cfg.pulses.clone()),
            renderer: Renderer::new(cfg),
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn pulses(&self) -> &PulseSet {
        &self.pulses
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Frames painted since construction.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Start the loop. Starting a running loop does nothing.
    pub fn start<H: FrameHost + ?Sized>(&mut self, host: &mut H) {
        if self.is_running() {
            return;
        }
        self.state = LoopState::Running;
        self.arm(host);
        debug!(pending = ?self.pending, "animation loop started");
    }

    /// Stop the loop, drop in-flight pulses and cancel the outstanding frame.
    pub fn stop<H: FrameHost + ?Sized>(&mut self, host: &mut H) {
        self.state = LoopState::Stopped;
        self.pulses.clear();
        if let Some(handle) = self.pending.take() {
            host.cancel_frame(handle);
        }
        debug!("animation loop stopped");
    }

    /// Drop every pulse and the spawn throttles, and restart the frame chain.
    ///
    /// A stopped loop stays stopped.
    pub fn reset_view<H: FrameHost + ?Sized>(&mut self, host: &mut H) {
        self.pulses.clear();
        if let Some(handle) = self.pending.take() {
            host.cancel_frame(handle);
        }
        if self.is_running() {
            self.arm(host);
        }
        debug!(running = self.is_running(), "view reset");
    }

    /// One display frame: repaint the scene, spawn and advance pulses, paint
    /// them, then request the next frame.
    ///
    /// `now_ms` is a monotonic clock reading, as handed to rAF callbacks.
    pub fn on_frame<P, H>(
        &mut self,
        now_ms: f64,
        store: &DisplayStore,
        painter: &mut P,
        host: &mut H,
    ) where
        P: Painter + ?Sized,
        H: FrameHost + ?Sized,
    {
        self.pending = None;
        if !self.is_running() {
            return;
        }

        self.renderer.draw_scene(painter, store);
        self.pulses.spawn(store, now_ms);
        self.pulses.advance();
        self.renderer.draw_pulses(painter, self.pulses.pulses());
        self.frames += 1;

        self.arm(host);
    }

    /// Repaint without touching pulses or requesting a frame. Used after a
    /// resize while the loop is stopped.
    pub fn repaint<P: Painter + ?Sized>(&self, store: &DisplayStore, painter: &mut P) {
        self.renderer
            .draw_frame(painter, store, self.pulses.pulses());
    }

    fn arm<H: FrameHost + ?Sized>(&mut self, host: &mut H) {
        if self.pending.is_none() {
            self.pending = host.request_frame();
        }
    }
}
