use std::rc::Weak;

use radarview::connection::{ConnectionError, ReconnectTimer, TimerHandle, Transport};
use radarview::time::Duration;
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::runtime::RadarRuntime;

/// Event handlers of the current socket. They must outlive the socket's last
/// event, so they are dropped only after being detached.
struct SocketHandlers {
    _on_open: Closure<dyn FnMut(web_sys::Event)>,
    _on_message: Closure<dyn FnMut(web_sys::MessageEvent)>,
    _on_close: Closure<dyn FnMut(web_sys::CloseEvent)>,
    _on_error: Closure<dyn FnMut(web_sys::Event)>,
}

pub(super) struct WebSocketTransport {
    runtime: Weak<RadarRuntime>,
    socket: Option<web_sys::WebSocket>,
    handlers: Option<SocketHandlers>,
}

impl WebSocketTransport {
    pub(super) fn new(runtime: Weak<RadarRuntime>) -> Self {
        Self {
            runtime,
            socket: None,
            handlers: None,
        }
    }

    fn attach(&self, ws: &web_sys::WebSocket) -> SocketHandlers {
        let rt = self.runtime.clone();
        let on_open = Closure::wrap(Box::new(move |_e: web_sys::Event| {
            if let Some(rt) = rt.upgrade() {
                rt.on_socket_open();
            }
        }) as Box<dyn FnMut(web_sys::Event)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

        let rt = self.runtime.clone();
        let on_message = Closure::wrap(Box::new(move |e: web_sys::MessageEvent| {
            let Some(rt) = rt.upgrade() else {
                return;
            };
            match e.data().as_string() {
                Some(text) => rt.on_socket_message(&text),
                None => debug!("ignoring non-text frame"),
            }
        }) as Box<dyn FnMut(web_sys::MessageEvent)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        let rt = self.runtime.clone();
        let on_close = Closure::wrap(Box::new(move |e: web_sys::CloseEvent| {
            if let Some(rt) = rt.upgrade() {
                rt.on_socket_close(e.code());
            }
        }) as Box<dyn FnMut(web_sys::CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        let rt = self.runtime.clone();
        let on_error = Closure::wrap(Box::new(move |_e: web_sys::Event| {
            if let Some(rt) = rt.upgrade() {
                rt.on_socket_error();
            }
        }) as Box<dyn FnMut(web_sys::Event)>);
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        SocketHandlers {
            _on_open: on_open,
            _on_message: on_message,
            _on_close: on_close,
            _on_error: on_error,
        }
    }
}

impl Transport for WebSocketTransport {
    fn open(&mut self, url: &str) -> Result<(), ConnectionError> {
        let ws = web_sys::WebSocket::new(url)
            .map_err(|e| ConnectionError::Open(format!("{e:?}")))?;
        self.handlers = Some(self.attach(&ws));
        self.socket = Some(ws);
        Ok(())
    }

    fn send_text(&mut self, text: &str) -> Result<(), ConnectionError> {
        let ws = self.socket.as_ref().ok_or(ConnectionError::NotConnected)?;
        ws.send_with_str(text)
            .map_err(|e| ConnectionError::Send(format!("{e:?}")))
    }

    fn close(&mut self) {
        if let Some(ws) = self.socket.take() {
            ws.set_onopen(None);
            ws.set_onmessage(None);
            ws.set_onclose(None);
            ws.set_onerror(None);
            let _ = ws.close();
        }
        self.handlers = None;
    }
}

/// `setTimeout` backed [`ReconnectTimer`].
///
/// Each callback is a one-shot closure; a cancelled one is leaked by
/// wasm-bindgen, which is fine at one per reconnect.
pub(super) struct WindowTimer {
    runtime: Weak<RadarRuntime>,
}

impl WindowTimer {
    pub(super) fn new(runtime: Weak<RadarRuntime>) -> Self {
        Self { runtime }
    }
}

impl ReconnectTimer for WindowTimer {
    fn schedule(&mut self, delay: Duration) -> Option<TimerHandle> {
        let window = web_sys::window()?;
        let rt = self.runtime.clone();
        let cb = Closure::once_into_js(move || {
            if let Some(rt) = rt.upgrade() {
                rt.on_reconnect_timer();
            }
        });
        let ms = delay.as_millis().min(i32::MAX as u128) as i32;
        window
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), ms)
            .ok()
            .map(TimerHandle)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(handle.0);
        }
    }
}
