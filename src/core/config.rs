//! Compiled-in display and connection settings.
//!
//! [`RadarConfig::default()`] reproduces the constants the rig's own pages ship
//! with. Every struct is `#[serde(default)]`, so a partial JSON document only
//! overrides the fields it names.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::connection::RetryPolicy;
use crate::layout::Layout;
use crate::time::Duration;

/// Access-point address of the rig when no other host is known.
pub const DEFAULT_DEVICE_HOST: &str = "192.168.4.1";

/// Accuracy radius used when a source fix omits one.
pub const DEFAULT_ACCURACY: f64 = 20.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate {kind} id {id} in layout")]
    DuplicateId { kind: &'static str, id: u32 },
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub background: String,
    pub grid_spacing: f64,
    /// Subtracted from the container size on each axis when the surface is resized.
    pub container_padding: f64,
    pub font_family: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            background: "#050a05".to_string(),
            grid_spacing: 50.0,
            container_padding: 30.0,
            font_family: "Courier New".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub grid: String,
    pub source: String,
    pub source_accuracy: String,
    pub beacon_active: String,
    pub beacon_inactive: String,
    pub sensor_detected: String,
    pub sensor_normal: String,
    pub receiver: String,
    pub pulse: String,
    pub label: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            grid: "#1a3a1a".to_string(),
            source: "#ff4444".to_string(),
            source_accuracy: "rgba(255, 68, 68, 0.2)".to_string(),
            beacon_active: "#64ffa5".to_string(),
            beacon_inactive: "#333333".to_string(),
            sensor_detected: "#b7fe65".to_string(),
            sensor_normal: "#333333".to_string(),
            receiver: "#64ffa5".to_string(),
            pulse: "#64ffa5".to_string(),
            label: "white".to_string(),
        }
    }
}

/// Marker radii and stroke widths, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sizes {
    pub source: f64,
    pub beacon: f64,
    /// Distance from the beacon edge to its active ring.
    pub beacon_ring_offset: f64,
    /// Opacity of the filled halo inside an active beacon's ring.
    pub beacon_halo_alpha: f64,
    pub sensor: f64,
    pub receiver: f64,
    pub pulse_head: f64,
    pub pulse_line_width: f64,
    /// Dash pattern for the pulse trail (`[dash, gap]`).
    pub pulse_dash: [f64; 2],
}

impl Default for Sizes {
    fn default() -> Self {
        Self {
            source: 8.0,
            beacon: 15.0,
            beacon_ring_offset: 10.0,
            beacon_halo_alpha: 0.15,
            sensor: 8.0,
            receiver: 12.0,
            pulse_head: 2.0,
            pulse_line_width: 1.5,
            pulse_dash: [5.0, 3.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseTiming {
    /// Progress added to every pulse per frame.
    pub step: f64,
    /// Minimum time between beacon-origin spawns.
    pub beacon_interval_ms: f64,
    /// Minimum time between sensor-origin spawns.
    pub sensor_interval_ms: f64,
}

impl Default for PulseTiming {
    fn default() -> Self {
        Self {
            step: 0.01,
            beacon_interval_ms: 800.0,
            sensor_interval_ms: 600.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketConfig {
    /// Device host (`host[:port]`) or a full `ws://`/`wss://` URL. When unset the
    /// page's own host is used, then [`DEFAULT_DEVICE_HOST`].
    pub host: Option<String>,
    pub path: String,
    pub reconnect_delay_ms: u64,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
    /// HTTP endpoint reporting `{measuring, clients}`, on the socket's host.
    pub status_path: String,
    /// Status poll period; `0` disables polling.
    pub status_poll_ms: u64,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            host: None,
            path: "/ws".to_string(),
            reconnect_delay_ms: 2000,
            max_attempts: None,
            status_path: "/status".to_string(),
            status_poll_ms: 2000,
        }
    }
}

impl SocketConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            delay: Duration::from_millis(self.reconnect_delay_ms),
            max_attempts: self.max_attempts,
        }
    }

    /// Resolve the socket URL.
    ///
    /// `page_host` is the host the page was served from (empty for `file:`
    /// pages); `secure` selects `wss://` for pages served over https.
    pub fn url(&self, page_host: Option<&str>, secure: bool) -> String {
        let configured = self.host.as_deref().map(str::trim).filter(|h| !h.is_empty());
        if let Some(full) =
            configured.filter(|h| h.starts_with("ws://") || h.starts_with("wss://"))
        {
            return full.to_string();
        }

        let host = configured
            .or_else(|| page_host.map(str::trim).filter(|h| !h.is_empty()))
            .unwrap_or(DEFAULT_DEVICE_HOST);
        let scheme = if secure { "wss" } else { "ws" };
        format!("{scheme}://{host}{}", rooted(&self.path))
    }

    /// HTTP URL of the status endpoint, on the same host as the socket.
    pub fn status_url(&self, page_host: Option<&str>, secure: bool) -> String {
        let socket = self.url(page_host, secure);
        let (scheme, rest) = match socket.strip_prefix("wss://") {
            Some(rest) => ("https", rest),
            None => ("http", socket.strip_prefix("ws://").unwrap_or(&socket)),
        };
        let host = rest.split('/').next().unwrap_or(rest);
        format!("{scheme}://{host}{}", rooted(&self.status_path))
    }
}

fn rooted(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Simulated feed: a source orbiting the receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub seed: u64,
    pub tick_ms: u64,
    pub orbit_radius: f64,
    /// Radians added per tick.
    pub angle_step: f64,
    /// A beacon closer than this is preferred over the nearest one.
    pub beacon_range: f64,
    pub sensor_range: f64,
    /// Chance that an in-range sensor reports a detection on a given tick.
    pub detection_chance: f64,
    /// Accuracy is drawn uniformly from `[min, max)`.
    pub accuracy_range: [f64; 2],
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            tick_ms: 150,
            orbit_radius: 200.0,
            angle_step: 0.02,
            beacon_range: 400.0,
            sensor_range: 300.0,
            detection_chance: 0.3,
            accuracy_range: [15.0, 25.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub canvas: CanvasConfig,
    pub palette: Palette,
    pub sizes: Sizes,
    pub pulses: PulseTiming,
    pub socket: SocketConfig,
    pub layout: Layout,
    pub demo: DemoConfig,
    pub default_accuracy: f64,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            palette: Palette::default(),
            sizes: Sizes::default(),
            pulses: PulseTiming::default(),
            socket: SocketConfig::default(),
            layout: Layout::default(),
            demo: DemoConfig::default(),
            default_accuracy: DEFAULT_ACCURACY,
        }
    }
}

impl RadarConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: RadarConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some((kind, id)) = self.layout.duplicate_id() {
            return Err(ConfigError::DuplicateId { kind, id });
        }
        for (field, value) in [
            ("pulses.step", self.pulses.step),
            ("default_accuracy", self.default_accuracy),
            ("demo.tick_ms", self.demo.tick_ms as f64),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        Ok(())
    }
}
