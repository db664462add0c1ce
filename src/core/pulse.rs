//! Transient link animations between the source and the beacon/sensors.

use crate::config::PulseTiming;
use crate::layout::Point;
use crate::store::DisplayStore;

/// What a pulse is visualising.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseOrigin {
    /// Active beacon towards the source.
    Beacon(u32),
    /// Source towards a detected sensor.
    Sensor(u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub from: Point,
    pub to: Point,
    pub progress: f64,
    pub alpha: f64,
    pub origin: PulseOrigin,
}

impl Pulse {
    pub fn new(from: Point, to: Point, origin: PulseOrigin) -> Self {
        Self {
            from,
            to,
            progress: 0.0,
            alpha: 1.0,
            origin,
        }
    }

    /// Current position of the leading dot.
    pub fn head(&self) -> Point {
        self.from.lerp(self.to, self.progress)
    }

    /// Progress is clamped at 1 so `alpha = 1 - progress` stays within `[0, 1]`.
    pub fn advance(&mut self, step: f64) {
        self.progress = (self.progress + step.max(0.0)).min(1.0);
        self.alpha = 1.0 - self.progress;
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }
}

/// In-flight pulses plus the spawn throttles.
#[derive(Debug, Clone)]
pub struct PulseSet {
    timing: PulseTiming,
    pulses: Vec<Pulse>,
    last_beacon_spawn_ms: Option<f64>,
    last_sensor_spawn_ms: Option<f64>,
}

impl PulseSet {
    pub fn new(timing: PulseTiming) -> Self {
        Self {
            timing,
            pulses: Vec::new(),
            last_beacon_spawn_ms: None,
            last_sensor_spawn_ms: None,
        }
    }

    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    /// Spawn due pulses for the current store contents. Returns how many were added.
    ///
    /// Nothing spawns while the source has no valid fix.
    pub fn spawn(&mut self, store: &DisplayStore, now_ms: f64) -> usize {
        let source = store.source();
        if !source.valid {
            return 0;
        }
        let before = self.pulses.len();
        let src = source.point();

        if due(self.last_beacon_spawn_ms, self.timing.beacon_interval_ms, now_ms) {
            let mut spawned = false;
            for b in store.active_beacons() {
                self.pulses
                    .push(Pulse::new(b.point(), src, PulseOrigin::Beacon(b.id)));
                spawned = true;
            }
            if spawned {
                self.last_beacon_spawn_ms = Some(now_ms);
            }
        }

        if due(self.last_sensor_spawn_ms, self.timing.sensor_interval_ms, now_ms) {
            let mut spawned = false;
            for s in store.detected_sensors() {
                self.pulses
                    .push(Pulse::new(src, s.point(), PulseOrigin::Sensor(s.id)));
                spawned = true;
            }
            if spawned {
                self.last_sensor_spawn_ms = Some(now_ms);
            }
        }

        self.pulses.len() - before
    }

    /// Advance every pulse by one step and drop the completed ones. Returns how
    /// many were dropped.
    pub fn advance(&mut self) -> usize {
        let before = self.pulses.len();
        for p in &mut self.pulses {
            p.advance(self.timing.step);
        }
        self.pulses.retain(|p| !p.is_complete());
        before - self.pulses.len()
    }

    /// Drop all pulses and forget the spawn throttles.
    pub fn clear(&mut self) {
        self.pulses.clear();
        self.last_beacon_spawn_ms = None;
        self.last_sensor_spawn_ms = None;
    }
}

fn due(last_ms: Option<f64>, interval_ms: f64, now_ms: f64) -> bool {
    last_ms.map_or(true, |last| now_ms - last > interval_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RadarConfig;
    use crate::protocol::{PositionUpdate, SourceFix};

    fn store_with(active: Option<u32>, detected: &[u32], valid_source: bool) -> DisplayStore {
        let mut store = DisplayStore::from_config(&RadarConfig::default());
        store.apply_update(
            &PositionUpdate {
                source: valid_source.then(|| SourceFix::new(500.0, 500.0, Some(15.0))),
                active_beacon: active,
                detected_sensors: detected.to_vec(),
                ..PositionUpdate::default()
            }
            .into(),
        );
        store
    }

    fn timing(step: f64) -> PulseTiming {
        PulseTiming {
            step,
            ..PulseTiming::default()
        }
    }

    #[test]
    fn alpha_tracks_progress_until_removal() {
        let mut p = Pulse::new(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            PulseOrigin::Sensor(0),
        );
        for _ in 0..200 {
            p.advance(0.03);
            assert!((p.alpha - (1.0 - p.progress)).abs() < 1e-12);
            assert!((0.0..=1.0).contains(&p.alpha));
        }
        assert!(p.is_complete());
        assert_eq!(p.head(), Point::new(10.0, 0.0));
    }

    #[test]
    fn pulses_are_removed_exactly_when_complete() {
        let store = store_with(Some(1), &[], true);
        let mut set = PulseSet::new(timing(0.25));
        assert_eq!(set.spawn(&store, 0.0), 1);

        for expected_progress in [0.25, 0.5, 0.75] {
            assert_eq!(set.advance(), 0);
            assert_eq!(set.len(), 1);
            assert!((set.pulses()[0].progress - expected_progress).abs() < 1e-12);
        }
        assert_eq!(set.advance(), 1);
        assert!(set.is_empty());
    }

    #[test]
    fn beacon_pulses_run_from_beacon_to_source() {
        let store = store_with(Some(2), &[], true);
        let mut set = PulseSet::new(PulseTiming::default());
        assert_eq!(set.spawn(&store, 10.0), 1);

        let p = set.pulses()[0];
        assert_eq!(p.origin, PulseOrigin::Beacon(2));
        assert_eq!(p.from, Point::new(800.0, 300.0));
        assert_eq!(p.to, Point::new(500.0, 500.0));
    }

    #[test]
    fn one_sensor_pulse_per_detected_sensor() {
        let store = store_with(None, &[0, 3, 6], true);
        let mut set = PulseSet::new(PulseTiming::default());
        assert_eq!(set.spawn(&store, 0.0), 3);
        assert!(set
            .pulses()
            .iter()
            .all(|p| p.from == Point::new(500.0, 500.0)));
        let origins: Vec<PulseOrigin> = set.pulses().iter().map(|p| p.origin).collect();
        assert_eq!(
            origins,
            vec![
                PulseOrigin::Sensor(0),
                PulseOrigin::Sensor(3),
                PulseOrigin::Sensor(6)
            ]
        );
    }

    #[test]
    fn spawning_is_throttled_per_origin_kind() {
        let store = store_with(Some(1), &[2], true);
        let mut set = PulseSet::new(PulseTiming::default());

        assert_eq!(set.spawn(&store, 1000.0), 2);
        // Neither interval has elapsed.
        assert_eq!(set.spawn(&store, 1500.0), 0);
        // Sensor interval (600 ms) elapsed, beacon interval (800 ms) not yet.
        assert_eq!(set.spawn(&store, 1601.0), 1);
        assert_eq!(set.pulses().last().map(|p| p.origin), Some(PulseOrigin::Sensor(2)));
        assert_eq!(set.spawn(&store, 1801.0), 1);
        assert_eq!(set.pulses().last().map(|p| p.origin), Some(PulseOrigin::Beacon(1)));
    }

    #[test]
    fn nothing_spawns_without_a_valid_source() {
        let store = store_with(Some(1), &[0, 1], false);
        let mut set = PulseSet::new(PulseTiming::default());
        assert_eq!(set.spawn(&store, 0.0), 0);
        assert!(set.is_empty());
    }

    #[test]
    fn clear_resets_throttles() {
        let store = store_with(Some(1), &[], true);
        let mut set = PulseSet::new(PulseTiming::default());
        assert_eq!(set.spawn(&store, 100.0), 1);
        assert_eq!(set.spawn(&store, 200.0), 0);

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.spawn(&store, 200.0), 1);
    }
}
