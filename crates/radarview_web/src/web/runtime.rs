use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use leptos::prelude::*;
use radarview::animation::AnimationLoop;
use radarview::config::RadarConfig;
use radarview::connection::{ConnectionError, ConnectionManager};
use radarview::demo::DemoFeed;
use radarview::protocol::{Command, Inbound};
use radarview::store::DisplayStore;
use radarview::time::Instant;
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use super::canvas::CanvasPainter;
use super::frame::RafHost;
use super::socket::{WebSocketTransport, WindowTimer};
use super::status::fetch_status;
use crate::ui_model::{
    accuracy_text, coordinates_text, device_status_text, system_info_text, ConnectionBadge,
    Measurement,
};

/// Setters for everything the status line shows.
#[derive(Clone, Copy)]
pub(super) struct UiSignals {
    pub(super) badge: WriteSignal<ConnectionBadge>,
    pub(super) coordinates: WriteSignal<String>,
    pub(super) accuracy: WriteSignal<String>,
    pub(super) system_info: WriteSignal<String>,
    pub(super) device_status: WriteSignal<String>,
    pub(super) error: WriteSignal<Option<String>>,
    pub(super) demo: WriteSignal<bool>,
    pub(super) measurement: WriteSignal<Measurement>,
    pub(super) clients: WriteSignal<Option<u32>>,
}

/// Owns the display state and every browser callback's target.
///
/// All entry points run on the page's single event loop; the `RefCell`s are
/// never borrowed across a callback boundary.
pub(super) struct RadarRuntime {
    me: Weak<RadarRuntime>,
    cfg: RadarConfig,
    ui: UiSignals,
    store: RefCell<DisplayStore>,
    anim: RefCell<AnimationLoop>,
    frames: RefCell<RafHost>,
    painter: RefCell<Option<CanvasPainter>>,
    conn: RefCell<ConnectionManager<WebSocketTransport>>,
    demo: RefCell<Option<DemoFeed>>,
    status_url: String,
    status_interval: Cell<Option<i32>>,
}

impl RadarRuntime {
    pub(super) fn new(
        cfg: RadarConfig,
        url: String,
        status_url: String,
        ui: UiSignals,
    ) -> Rc<Self> {
        Rc::new_cyclic(|me: &Weak<RadarRuntime>| RadarRuntime {
            me: me.clone(),
            store: RefCell::new(DisplayStore::from_config(&cfg)),
            anim: RefCell::new(AnimationLoop::new(&cfg)),
            frames: RefCell::new(RafHost::new(me.clone())),
            painter: RefCell::new(None),
            conn: RefCell::new(ConnectionManager::new(
                url,
                WebSocketTransport::new(me.clone()),
                cfg.socket.retry_policy(),
            )),
            demo: RefCell::new(None),
            status_url,
            status_interval: Cell::new(None),
            cfg,
            ui,
        })
    }

    fn timer(&self) -> WindowTimer {
        WindowTimer::new(self.me.clone())
    }

    pub(super) fn has_canvas(&self) -> bool {
        self.painter.borrow().is_some()
    }

    pub(super) fn attach_canvas(&self, canvas: web_sys::HtmlCanvasElement) -> Result<(), String> {
        let painter = CanvasPainter::new(canvas)?;
        let (w, h) = painter.fit_to_container(self.cfg.canvas.container_padding)?;
        info!(width = w, height = h, "canvas attached");
        *self.painter.borrow_mut() = Some(painter);
        self.refresh_readouts();
        Ok(())
    }

    pub(super) fn resize(&self) {
        let mut painter = self.painter.borrow_mut();
        let Some(painter) = painter.as_mut() else {
            return;
        };
        match painter.fit_to_container(self.cfg.canvas.container_padding) {
            Ok((w, h)) => debug!(width = w, height = h, "canvas resized"),
            Err(e) => warn!(error = %e, "canvas resize failed"),
        }
        // A running loop repaints on its next frame.
        let anim = self.anim.borrow();
        if !anim.is_running() {
            anim.repaint(&self.store.borrow(), painter);
        }
    }

    pub(super) fn start_loop(&self) {
        self.anim.borrow_mut().start(&mut *self.frames.borrow_mut());
    }

    pub(super) fn on_frame(&self, now_ms: f64) {
        self.poll_demo();

        let mut painter = self.painter.borrow_mut();
        let Some(painter) = painter.as_mut() else {
            return;
        };
        let store = self.store.borrow();
        self.anim
            .borrow_mut()
            .on_frame(now_ms, &store, painter, &mut *self.frames.borrow_mut());
    }

    fn poll_demo(&self) {
        let update = self
            .demo
            .borrow_mut()
            .as_mut()
            .and_then(|feed| feed.poll(Instant::now()));
        if let Some(update) = update {
            self.apply(&update.into());
        }
    }

    fn apply(&self, msg: &Inbound) {
        if let Inbound::Status { message } = msg {
            info!(%message, "device status");
            self.ui.device_status.set(device_status_text(message));
        }
        let outcome = self.store.borrow_mut().apply_update(msg);
        if !outcome.is_clean() {
            debug!(
                unknown_beacon = ?outcome.unknown_beacon,
                unknown_sensors = ?outcome.unknown_sensors,
                rejected_ids = ?outcome.rejected_ids,
                "update referenced ids missing from the layout"
            );
        }
        self.refresh_readouts();
    }

    fn refresh_readouts(&self) {
        let store = self.store.borrow();
        self.ui.coordinates.set(coordinates_text(&store));
        self.ui.accuracy.set(accuracy_text(&store));
        self.ui.system_info.set(system_info_text(&store));
    }

    fn refresh_badge(&self) {
        let badge = if self.demo.borrow().is_some() {
            ConnectionBadge::Demo
        } else {
            ConnectionBadge::from_state(self.conn.borrow().state())
        };
        self.ui.badge.set(badge);
    }

    pub(super) fn connect(&self) {
        self.conn.borrow_mut().connect(&mut self.timer());
        self.refresh_badge();
    }

    pub(super) fn on_socket_open(&self) {
        self.conn.borrow_mut().on_open();
        self.ui.error.set(None);
        self.refresh_badge();
    }

    pub(super) fn on_socket_message(&self, text: &str) {
        let msg = self.conn.borrow_mut().on_message(text);
        if let Some(msg) = msg {
            self.apply(&msg);
        }
    }

    pub(super) fn on_socket_close(&self, code: u16) {
        debug!(code, "socket closed");
        self.conn.borrow_mut().on_close(&mut self.timer());
        self.refresh_badge();
    }

    pub(super) fn on_socket_error(&self) {
        self.conn.borrow_mut().on_error(&mut self.timer());
        let url = self.conn.borrow().url().to_string();
        self.ui
            .error
            .set(Some(format!("WebSocket error on {url}, retrying")));
        self.refresh_badge();
    }

    pub(super) fn on_reconnect_timer(&self) {
        self.conn.borrow_mut().on_reconnect_timer(&mut self.timer());
        self.refresh_badge();
    }

    /// Drop the fix and restart the pulse animation.
    pub(super) fn calibrate(&self) {
        self.store.borrow_mut().calibrate();
        self.reset_view();
        self.refresh_readouts();
    }

    pub(super) fn reset_view(&self) {
        self.anim
            .borrow_mut()
            .reset_view(&mut *self.frames.borrow_mut());
    }

    /// Switch between the simulated feed and the device socket. Only one of
    /// them drives the store at a time.
    pub(super) fn set_demo(&self, on: bool) {
        if on {
            self.conn.borrow_mut().disconnect(&mut self.timer());
            *self.demo.borrow_mut() = Some(DemoFeed::new(&self.cfg));
            info!("demo feed started");
        } else {
            *self.demo.borrow_mut() = None;
            info!("demo feed stopped");
        }
        self.calibrate();
        if !on {
            self.connect();
        }
        self.ui.demo.set(on);
        self.refresh_badge();
    }

    pub(super) fn send_command(&self, command: Command) -> Result<(), ConnectionError> {
        self.conn.borrow_mut().send_command(command)?;
        self.ui.measurement.set(Measurement::after(command));
        Ok(())
    }

    /// Poll the device's status endpoint every `status_poll_ms`. Polls are
    /// skipped while the demo feed runs.
    pub(super) fn start_status_polling(&self) -> Result<(), String> {
        let period = self.cfg.socket.status_poll_ms;
        if period == 0 || self.status_interval.get().is_some() {
            return Ok(());
        }
        let window = web_sys::window().ok_or("no window".to_string())?;
        let me = self.me.clone();
        let cb = Closure::wrap(Box::new(move || {
            if let Some(rt) = me.upgrade() {
                rt.poll_status();
            }
        }) as Box<dyn FnMut()>);
        let timeout = i32::try_from(period).unwrap_or(i32::MAX);
        let id = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                timeout,
            )
            .map_err(|_| "failed to start status polling".to_string())?;
        cb.forget();
        self.status_interval.set(Some(id));
        debug!(url = %self.status_url, period_ms = period, "status polling started");
        self.poll_status();
        Ok(())
    }

    fn poll_status(&self) {
        if self.demo.borrow().is_some() {
            return;
        }
        let url = self.status_url.clone();
        let ui = self.ui;
        spawn_local(async move {
            match fetch_status(&url).await {
                Ok(status) => {
                    ui.measurement.update(|m| *m = m.with_status(&status));
                    if status.clients.is_some() {
                        ui.clients.set(status.clients);
                    }
                }
                Err(e) => debug!(error = %e, "status poll failed"),
            }
        });
    }
}
