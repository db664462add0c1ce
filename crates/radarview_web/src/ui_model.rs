//! Status-line text and labels, kept out of the wasm-only `web` module so they
//! can be unit-tested on the host.

use radarview::connection::ConnectionState;
use radarview::protocol::{Command, DeviceStatus};
use radarview::store::DisplayStore;

/// Connection badge shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionBadge {
    Connected,
    Connecting,
    #[default]
    Disconnected,
    /// The simulated feed is driving the display; the socket is closed.
    Demo,
}

impl ConnectionBadge {
    pub fn from_state(state: ConnectionState) -> Self {
        match state {
            ConnectionState::Connected => ConnectionBadge::Connected,
            ConnectionState::Connecting => ConnectionBadge::Connecting,
            ConnectionState::Disconnected => ConnectionBadge::Disconnected,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnectionBadge::Connected => "Connected",
            ConnectionBadge::Connecting => "Connecting...",
            ConnectionBadge::Disconnected => "Disconnected",
            ConnectionBadge::Demo => "Demo",
        }
    }

    /// CSS classes for the badge element.
    pub fn class(self) -> &'static str {
        match self {
            ConnectionBadge::Connected => "status connected",
            ConnectionBadge::Connecting => "status connecting",
            ConnectionBadge::Disconnected => "status disconnected",
            ConnectionBadge::Demo => "status demo",
        }
    }
}

pub fn coordinates_text(store: &DisplayStore) -> String {
    let s = store.source();
    format!("Source: X: {:.2}, Y: {:.2}", s.x, s.y)
}

pub fn system_info_text(store: &DisplayStore) -> String {
    let beacon = store
        .active_beacon()
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    format!(
        "Active Beacon: {beacon} | Detected Sensors: {}",
        store.detected_count()
    )
}

pub fn accuracy_text(store: &DisplayStore) -> String {
    let s = store.source();
    if s.valid {
        format!("± {:.1}", s.accuracy)
    } else {
        "no fix".to_string()
    }
}

/// Whether the rig is taking measurements, as far as this page knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Measurement {
    #[default]
    Unknown,
    Running,
    Stopped,
}

impl Measurement {
    /// State implied by a command the device accepted.
    pub fn after(command: Command) -> Self {
        match command {
            Command::Start => Measurement::Running,
            Command::Stop => Measurement::Stopped,
        }
    }

    /// Fold in a polled status. A reply without `measuring` keeps the state.
    pub fn with_status(self, status: &DeviceStatus) -> Self {
        match status.measuring {
            Some(true) => Measurement::Running,
            Some(false) => Measurement::Stopped,
            None => self,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Measurement::Unknown => "Measurements: -",
            Measurement::Running => "Measurements: Running",
            Measurement::Stopped => "Measurements: Stopped",
        }
    }

    pub fn start_enabled(self) -> bool {
        self != Measurement::Running
    }

    pub fn stop_enabled(self) -> bool {
        self != Measurement::Stopped
    }
}

pub fn clients_text(clients: Option<u32>) -> String {
    match clients {
        Some(n) => format!("Clients: {n}"),
        None => "Clients: -".to_string(),
    }
}

/// Text for the device's last `status` frame.
pub fn device_status_text(message: &str) -> String {
    let message = message.trim();
    if message.is_empty() {
        "Device: -".to_string()
    } else {
        format!("Device: {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radarview::config::RadarConfig;
    use radarview::protocol::parse_frame;

    fn store() -> DisplayStore {
        DisplayStore::from_config(&RadarConfig::default())
    }

    #[test]
    fn badge_inventory_is_stable() {
        let all = [
            ConnectionBadge::Connected,
            ConnectionBadge::Connecting,
            ConnectionBadge::Disconnected,
            ConnectionBadge::Demo,
        ];
        let mut labels: Vec<&'static str> =
            all.iter().copied().map(ConnectionBadge::label).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), all.len());

        for b in all {
            assert!(b.class().starts_with("status "));
        }
        assert_eq!(
            ConnectionBadge::from_state(ConnectionState::Connected).class(),
            "status connected"
        );
        assert_eq!(ConnectionBadge::default().label(), "Disconnected");
    }

    #[test]
    fn idle_store_texts() {
        let s = store();
        assert_eq!(coordinates_text(&s), "Source: X: 500.00, Y: 350.00");
        assert_eq!(system_info_text(&s), "Active Beacon: - | Detected Sensors: 0");
        assert_eq!(accuracy_text(&s), "no fix");
    }

    #[test]
    fn texts_follow_updates() {
        let mut s = store();
        let msg = parse_frame(
            r#"{"source": {"x": 123.456, "y": 7, "accuracy": 18.34},
                "active_beacon": 2, "detected_sensors": [0, 5, 7]}"#,
        )
        .unwrap();
        s.apply_update(&msg);

        assert_eq!(coordinates_text(&s), "Source: X: 123.46, Y: 7.00");
        assert_eq!(system_info_text(&s), "Active Beacon: 2 | Detected Sensors: 3");
        assert_eq!(accuracy_text(&s), "± 18.3");
    }

    #[test]
    fn command_buttons_follow_the_measurement_state() {
        let m = Measurement::default();
        assert_eq!(m.label(), "Measurements: -");
        assert!(m.start_enabled() && m.stop_enabled());

        let m = Measurement::after(Command::Start);
        assert_eq!(m.label(), "Measurements: Running");
        assert!(!m.start_enabled());
        assert!(m.stop_enabled());

        let m = Measurement::after(Command::Stop);
        assert_eq!(m.label(), "Measurements: Stopped");
        assert!(m.start_enabled());
        assert!(!m.stop_enabled());
    }

    #[test]
    fn polled_status_updates_the_readouts() {
        let running = DeviceStatus {
            measuring: Some(true),
            clients: Some(2),
        };
        assert_eq!(Measurement::Stopped.with_status(&running), Measurement::Running);
        assert_eq!(clients_text(running.clients), "Clients: 2");

        let clients_only = DeviceStatus {
            measuring: None,
            clients: Some(1),
        };
        assert_eq!(Measurement::Stopped.with_status(&clients_only), Measurement::Stopped);
        assert_eq!(clients_text(None), "Clients: -");
    }

    #[test]
    fn device_status_is_trimmed() {
        assert_eq!(device_status_text("  Measurements started "), "Device: Measurements started");
        assert_eq!(device_status_text(""), "Device: -");
    }
}
