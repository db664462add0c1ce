use std::rc::Rc;

use leptos::prelude::*;
use radarview::protocol::Command;
use tracing::{error, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::ui_model::{clients_text, ConnectionBadge, Measurement};

mod canvas;
mod frame;
mod logging;
mod page;
mod runtime;
mod socket;
mod status;

use page::PageConfig;
use runtime::{RadarRuntime, UiSignals};

pub fn start() {
    console_error_panic_hook::set_once();
    let page = PageConfig::read();
    logging::init(page.log_level);
    info!(url = %page.socket_url(), demo = page.demo, "radarview starting");
    mount_to_body(move || view! { <App page=page /> });
}

fn install_resize_listener(rt: &Rc<RadarRuntime>) -> Result<(), String> {
    let window = web_sys::window().ok_or("no window".to_string())?;
    let weak = Rc::downgrade(rt);
    let cb = Closure::wrap(Box::new(move || {
        if let Some(rt) = weak.upgrade() {
            rt.resize();
        }
    }) as Box<dyn FnMut()>);
    window
        .add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
        .map_err(|_| "failed to add resize listener".to_string())?;
    cb.forget();
    Ok(())
}

#[component]
fn App(page: PageConfig) -> impl IntoView {
    let (badge, set_badge) = signal(ConnectionBadge::default());
    let (coordinates, set_coordinates) = signal(String::new());
    let (accuracy, set_accuracy) = signal(String::new());
    let (system_info, set_system_info) = signal(String::new());
    let (device_status, set_device_status) = signal(crate::ui_model::device_status_text(""));
    let (last_error, set_last_error) = signal(page.config_error.clone());
    let (demo, set_demo) = signal(false);
    let (measurement, set_measurement) = signal(Measurement::default());
    let (clients, set_clients) = signal(None::<u32>);

    let ui = UiSignals {
        badge: set_badge,
        coordinates: set_coordinates,
        accuracy: set_accuracy,
        system_info: set_system_info,
        device_status: set_device_status,
        error: set_last_error,
        demo: set_demo,
        measurement: set_measurement,
        clients: set_clients,
    };
    let url = page.socket_url();
    let status_url = page.status_url();
    let start_in_demo = page.demo;
    let runtime = StoredValue::new_local(RadarRuntime::new(page.cfg, url, status_url, ui));

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    Effect::new(move |_| {
        let Some(canvas) = canvas_ref.get() else {
            return;
        };
        let rt = runtime.get_value();
        if rt.has_canvas() {
            return;
        }
        if let Err(e) = rt.attach_canvas(canvas) {
            // Nothing to draw on: leave the loop and the socket down.
            error!(error = %e, "radar canvas unavailable");
            set_last_error.set(Some(e));
            return;
        }
        if let Err(e) = install_resize_listener(&rt) {
            error!(error = %e, "resize listener not installed");
        }
        rt.start_loop();
        if let Err(e) = rt.start_status_polling() {
            error!(error = %e, "status polling not started");
        }
        if start_in_demo {
            rt.set_demo(true);
        } else {
            rt.connect();
        }
    });

    let send = move |command: Command| match runtime.with_value(|rt| rt.send_command(command)) {
        Ok(()) => set_last_error.set(None),
        Err(e) => set_last_error.set(Some(format!("{command}: {e}"))),
    };

    view! {
        <main style="font-family: 'Courier New', monospace; padding: 12px; color: #64ffa5; background: #020602; min-height: 100vh; box-sizing: border-box;">
            <header style="display: flex; gap: 12px; align-items: center; margin-bottom: 10px;">
                <h1 style="margin: 0; font-size: 20px;">"Radar View"</h1>
                <span class=move || badge.get().class()>{move || badge.get().label()}</span>
            </header>

            <section style="display: flex; gap: 10px; flex-wrap: wrap; margin-bottom: 10px;">
                <button on:click=move |_| runtime.with_value(|rt| rt.calibrate())>
                    "Calibrate"
                </button>
                <button on:click=move |_| runtime.with_value(|rt| rt.reset_view())>
                    "Reset view"
                </button>
                <button on:click=move |_| {
                    let on = !demo.get_untracked();
                    runtime.with_value(|rt| rt.set_demo(on));
                }>
                    {move || if demo.get() { "Stop demo" } else { "Demo" }}
                </button>
                <button
                    on:click=move |_| send(Command::Start)
                    disabled=move || !measurement.get().start_enabled()
                >
                    "START"
                </button>
                <button
                    on:click=move |_| send(Command::Stop)
                    disabled=move || !measurement.get().stop_enabled()
                >
                    "STOP"
                </button>
            </section>

            <section style="display: flex; gap: 18px; flex-wrap: wrap; margin-bottom: 10px;">
                <span>{move || coordinates.get()}</span>
                <span>{move || accuracy.get()}</span>
                <span>{move || system_info.get()}</span>
                <span>{move || device_status.get()}</span>
                <span>{move || measurement.get().label()}</span>
                <span>{move || clients_text(clients.get())}</span>
            </section>

            <Show when=move || last_error.get().is_some()>
                <p style="margin: 0 0 10px 0; color: #ff4444;">
                    {move || last_error.get().unwrap_or_default()}
                </p>
            </Show>

            <div style="height: 75vh; padding: 15px; box-sizing: border-box; border: 1px solid #1a3a1a;">
                <canvas node_ref=canvas_ref></canvas>
            </div>
        </main>
    }
}
