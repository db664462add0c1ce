//! Display state: what the last message said, ready to be drawn.
//!
//! The store has a single writer. Updates arrive through [`DisplayStore::apply_update`]
//! and [`DisplayStore::calibrate`]; the animation loop only reads.

use tracing::info;

use crate::config::RadarConfig;
use crate::layout::{Layout, Point};
use crate::protocol::{Inbound, PositionUpdate, SourceFix};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beacon {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub active: bool,
}

impl Beacon {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensor {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub detected: bool,
}

impl Sensor {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The located object. `valid == false` means there is no fix to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Source {
    pub x: f64,
    pub y: f64,
    pub accuracy: f64,
    pub valid: bool,
}

impl Source {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Ids in an update that matched nothing in the layout. They are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub unknown_beacon: Option<u32>,
    pub unknown_sensors: Vec<u32>,
    /// Ids that were not integers at all, as sent.
    pub rejected_ids: Vec<String>,
}

impl UpdateOutcome {
    pub fn is_clean(&self) -> bool {
        self.unknown_beacon.is_none()
            && self.unknown_sensors.is_empty()
            && self.rejected_ids.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct DisplayStore {
    receiver: Point,
    beacons: Vec<Beacon>,
    sensors: Vec<Sensor>,
    source: Source,
    active_beacon: Option<u32>,
    default_accuracy: f64,
}

impl DisplayStore {
    pub fn new(layout: &Layout, default_accuracy: f64) -> Self {
        Self {
            receiver: layout.receiver,
            beacons: layout
                .beacons
                .iter()
                .map(|b| Beacon {
                    id: b.id,
                    x: b.x,
                    y: b.y,
                    active: false,
                })
                .collect(),
            sensors: layout
                .sensors
                .iter()
                .map(|s| Sensor {
                    id: s.id,
                    x: s.x,
                    y: s.y,
                    detected: false,
                })
                .collect(),
            source: Source {
                x: layout.receiver.x,
                y: layout.receiver.y,
                accuracy: default_accuracy,
                valid: false,
            },
            active_beacon: None,
            default_accuracy,
        }
    }

    pub fn from_config(cfg: &RadarConfig) -> Self {
        Self::new(&cfg.layout, cfg.default_accuracy)
    }

    pub fn receiver(&self) -> Point {
        self.receiver
    }

    pub fn beacons(&self) -> &[Beacon] {
        &self.beacons
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn active_beacon(&self) -> Option<u32> {
        self.active_beacon
    }

    pub fn active_beacons(&self) -> impl Iterator<Item = &Beacon> {
        self.beacons.iter().filter(|b| b.active)
    }

    pub fn detected_sensors(&self) -> impl Iterator<Item = &Sensor> {
        self.sensors.iter().filter(|s| s.detected)
    }

    pub fn active_beacon_point(&self) -> Option<Point> {
        self.active_beacons().next().map(Beacon::point)
    }

    pub fn detected_sensor_points(&self) -> Vec<Point> {
        self.detected_sensors().map(Sensor::point).collect()
    }

    pub fn detected_count(&self) -> usize {
        self.detected_sensors().count()
    }

    /// Apply one inbound message.
    ///
    /// Status and unknown frames leave the store untouched.
    pub fn apply_update(&mut self, message: &Inbound) -> UpdateOutcome {
        match message {
            Inbound::Update(update) => self.apply_position_update(update),
            Inbound::Position(pos) => {
                self.set_source(&pos.fix());
                self.source.valid = pos.valid;
                UpdateOutcome::default()
            }
            Inbound::Status { .. } | Inbound::Unknown { .. } => UpdateOutcome::default(),
        }
    }

    fn apply_position_update(&mut self, update: &PositionUpdate) -> UpdateOutcome {
        if let Some(fix) = &update.source {
            self.set_source(fix);
        }

        let unknown_beacon = self.select_beacon(update.active_beacon);
        let unknown_sensors = self.replace_detected(&update.detected_sensors);

        UpdateOutcome {
            unknown_beacon,
            unknown_sensors,
            rejected_ids: update.rejected_ids.clone(),
        }
    }

    fn set_source(&mut self, fix: &SourceFix) {
        // A zero radius is treated like a missing one.
        let accuracy = fix
            .accuracy
            .filter(|a| a.is_finite() && *a > 0.0)
            .unwrap_or(self.default_accuracy);
        self.source = Source {
            x: fix.x.unwrap_or(self.receiver.x),
            y: fix.y.unwrap_or(self.receiver.y),
            accuracy,
            valid: true,
        };
    }

    /// Returns the requested id when it names no configured beacon.
    fn select_beacon(&mut self, id: Option<u32>) -> Option<u32> {
        let known = id.filter(|id| self.beacons.iter().any(|b| b.id == *id));
        self.active_beacon = known;
        for b in &mut self.beacons {
            b.active = Some(b.id) == known;
        }
        id.filter(|_| known.is_none())
    }

    /// Returns the ids that name no configured sensor.
    fn replace_detected(&mut self, ids: &[u32]) -> Vec<u32> {
        for s in &mut self.sensors {
            s.detected = false;
        }
        let mut unknown = Vec::new();
        for id in ids {
            match self.sensors.iter_mut().find(|s| s.id == *id) {
                Some(s) => s.detected = true,
                None => unknown.push(*id),
            }
        }
        unknown
    }

    /// Drop the current fix: no source, no active beacon, no detections.
    pub fn calibrate(&mut self) {
        info!("calibrating: clearing source fix and detections");
        self.source.valid = false;
        self.select_beacon(None);
        self.replace_detected(&[]);
    }
}
