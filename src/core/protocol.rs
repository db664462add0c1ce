//! Wire format spoken with the rig over the WebSocket.
//!
//! Inbound frames are JSON text. Three shapes are accepted:
//!
//! - the display update `{source?, active_beacon?, detected_sensors?}`,
//! - the legacy typed frames `{type: "position", x, y, accuracy}` and
//!   `{type: "status", message}`,
//! - the bare position the firmware broadcasts,
//!   `{x, y, accuracy, valid, timestamp}`.
//!
//! Outbound traffic is limited to the plain-text [`Command`]s.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame does not match any known shape: {0}")]
    Schema(#[source] serde_json::Error),
    #[error("frame is not a JSON object")]
    NotAnObject,
    #[error("frame `type` is not a string")]
    BadType,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
}

/// Source coordinates as sent by the rig. Missing fields are defaulted by the
/// store, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceFix {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub accuracy: Option<f64>,
}

impl SourceFix {
    pub fn new(x: f64, y: f64, accuracy: Option<f64>) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            accuracy,
        }
    }
}

/// Display update. `active_beacon` and `detected_sensors` always replace the
/// previous values: absent or `null` means "none".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireUpdate")]
pub struct PositionUpdate {
    pub source: Option<SourceFix>,
    pub active_beacon: Option<u32>,
    pub detected_sensors: Vec<u32>,
    /// Ids that are not non-negative integers, as JSON text. They can name no
    /// beacon or sensor, so the frame is applied without them.
    #[serde(skip_serializing)]
    pub rejected_ids: Vec<String>,
}

#[derive(Deserialize)]
struct WireUpdate {
    #[serde(default)]
    source: Option<SourceFix>,
    #[serde(default)]
    active_beacon: Option<Value>,
    #[serde(default)]
    detected_sensors: Option<Vec<Value>>,
}

impl From<WireUpdate> for PositionUpdate {
    fn from(wire: WireUpdate) -> Self {
        let mut rejected_ids = Vec::new();
        let mut id = |v: Value| {
            let id = wire_id(&v);
            if id.is_none() {
                rejected_ids.push(v.to_string());
            }
            id
        };
        let active_beacon = wire.active_beacon.and_then(&mut id);
        let detected_sensors = wire
            .detected_sensors
            .unwrap_or_default()
            .into_iter()
            .filter_map(&mut id)
            .collect();
        Self {
            source: wire.source,
            active_beacon,
            detected_sensors,
            rejected_ids,
        }
    }
}

/// Ids compare as numbers, so `2.0` names the same sensor as `2`.
fn wire_id(v: &Value) -> Option<u32> {
    if let Some(n) = v.as_u64() {
        return u32::try_from(n).ok();
    }
    let f = v.as_f64()?;
    (f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&f)).then_some(f as u32)
}

/// Position-only frame, either `type: "position"` or the firmware's bare
/// broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevicePosition {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default = "default_valid")]
    pub valid: bool,
    /// Device uptime in milliseconds.
    #[serde(default)]
    pub timestamp: Option<u64>,
}

fn default_valid() -> bool {
    true
}

impl DevicePosition {
    pub fn fix(&self) -> SourceFix {
        SourceFix {
            x: self.x,
            y: self.y,
            accuracy: self.accuracy,
        }
    }
}

/// Reply of the device's HTTP status endpoint. Fields the firmware does not
/// report stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    #[serde(default)]
    pub measuring: Option<bool>,
    /// Connected socket clients.
    #[serde(default)]
    pub clients: Option<u32>,
}

impl DeviceStatus {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(ProtocolError::NotAnObject);
        }
        from_value(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Update(PositionUpdate),
    Position(DevicePosition),
    Status { message: String },
    /// A typed frame this client does not understand.
    Unknown { kind: String },
}

impl From<PositionUpdate> for Inbound {
    fn from(update: PositionUpdate) -> Self {
        Inbound::Update(update)
    }
}

const UPDATE_KEYS: [&str; 3] = ["source", "active_beacon", "detected_sensors"];

/// Parse one inbound text frame.
pub fn parse_frame(text: &str) -> Result<Inbound, ProtocolError> {
    let value: Value = serde_json::from_str(text)?;
    let obj = value.as_object().ok_or(ProtocolError::NotAnObject)?;

    if let Some(kind) = obj.get("type") {
        let kind = kind.as_str().ok_or(ProtocolError::BadType)?;
        return match kind {
            "position" => Ok(Inbound::Position(from_value(value.clone())?)),
            "status" => {
                let message = obj
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Ok(Inbound::Status { message })
            }
            other => Ok(Inbound::Unknown {
                kind: other.to_string(),
            }),
        };
    }

    let looks_like_update = UPDATE_KEYS.iter().any(|k| obj.contains_key(*k));
    if !looks_like_update && obj.contains_key("x") && obj.contains_key("y") {
        return Ok(Inbound::Position(from_value(value)?));
    }

    Ok(Inbound::Update(from_value(value)?))
}

fn from_value<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(value).map_err(ProtocolError::Schema)
}

/// Control commands understood by the rig's firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Start => "START",
            Command::Stop => "STOP",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "START" => Ok(Command::Start),
            "STOP" => Ok(Command::Stop),
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }
}
