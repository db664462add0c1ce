use std::rc::Weak;

use radarview::animation::{FrameHandle, FrameHost};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::runtime::RadarRuntime;

/// `requestAnimationFrame` backed [`FrameHost`]. The callback is created once
/// and reused for every frame.
pub(super) struct RafHost {
    callback: Closure<dyn FnMut(f64)>,
}

impl RafHost {
    pub(super) fn new(runtime: Weak<RadarRuntime>) -> Self {
        let callback = Closure::wrap(Box::new(move |now_ms: f64| {
            if let Some(rt) = runtime.upgrade() {
                rt.on_frame(now_ms);
            }
        }) as Box<dyn FnMut(f64)>);
        Self { callback }
    }
}

impl FrameHost for RafHost {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let window = web_sys::window()?;
        window
            .request_animation_frame(self.callback.as_ref().unchecked_ref())
            .ok()
            .map(FrameHandle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle.0);
        }
    }
}
