//! Simulated feed for running the display without the rig.
//!
//! The source orbits the receiver at a fixed radius. Each tick produces the same
//! [`PositionUpdate`] the device would send: the first beacon in range (else the
//! nearest one) is active, and each in-range sensor reports a detection by
//! chance. A given seed always replays the same sequence.

use crate::config::{DemoConfig, RadarConfig};
use crate::layout::{Layout, Point};
use crate::prng::Prng;
use crate::protocol::{PositionUpdate, SourceFix};
use crate::time::{Duration, Instant};

/// Fires at most once per interval.
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a tick is due at `now`. A due tick is consumed.
    pub fn ready(&mut self, now: Instant) -> bool {
        let due = self
            .last
            .map_or(true, |last| now.duration_since(last) >= self.interval);
        if due {
            self.last = Some(now);
        }
        due
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[derive(Debug, Clone)]
pub struct DemoFeed {
    layout: Layout,
    cfg: DemoConfig,
    rng: Prng,
    angle: f64,
    ticks: u64,
    pacer: Pacer,
}

impl DemoFeed {
    pub fn new(radar: &RadarConfig) -> Self {
        let cfg = radar.demo.clone();
        Self {
            layout: radar.layout.clone(),
            rng: Prng::new(cfg.seed),
            angle: 0.0,
            ticks: 0,
            pacer: Pacer::new(Duration::from_millis(cfg.tick_ms)),
            cfg,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Produce an update if one is due at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<PositionUpdate> {
        self.pacer.ready(now).then(|| self.tick())
    }

    /// Produce the next update unconditionally.
    pub fn tick(&mut self) -> PositionUpdate {
        let center = self.layout.receiver;
        let src = Point::new(
            center.x + self.cfg.orbit_radius * self.angle.cos(),
            center.y + self.cfg.orbit_radius * self.angle.sin(),
        );

        let active_beacon = self.pick_beacon(src);

        let mut detected_sensors = Vec::new();
        for s in &self.layout.sensors {
            // Draw for every sensor so the sequence does not depend on range.
            let hit = self.rng.chance(self.cfg.detection_chance);
            if hit && s.point().distance(src) < self.cfg.sensor_range {
                detected_sensors.push(s.id);
            }
        }

        let [lo, hi] = self.cfg.accuracy_range;
        let accuracy = self.rng.gen_range_f64(lo, hi);

        self.angle += self.cfg.angle_step;
        self.ticks += 1;

        PositionUpdate {
            source: Some(SourceFix::new(src.x, src.y, Some(accuracy))),
            active_beacon,
            detected_sensors,
            rejected_ids: Vec::new(),
        }
    }

    fn pick_beacon(&self, src: Point) -> Option<u32> {
        let in_range = self
            .layout
            .beacons
            .iter()
            .find(|b| b.point().distance(src) < self.cfg.beacon_range);
        let nearest = || {
            self.layout.beacons.iter().min_by(|a, b| {
                a.point()
                    .distance(src)
                    .total_cmp(&b.point().distance(src))
            })
        };
        in_range.or_else(nearest).map(|b| b.id)
    }

    /// Restart the orbit and the random sequence from the configured seed.
    pub fn reset(&mut self) {
        self.rng = Prng::new(self.cfg.seed);
        self.angle = 0.0;
        self.ticks = 0;
        self.pacer.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutPoint;

    #[test]
    fn same_seed_replays_the_same_run() {
        let cfg = RadarConfig::default();
        let mut a = DemoFeed::new(&cfg);
        let mut b = DemoFeed::new(&cfg);
        for _ in 0..200 {
            assert_eq!(a.tick(), b.tick());
        }

        let first = DemoFeed::new(&cfg).tick();
        a.reset();
        assert_eq!(a.tick(), first);
    }

    #[test]
    fn only_configured_ids_are_referenced() {
        let cfg = RadarConfig::default();
        let mut feed = DemoFeed::new(&cfg);
        let mut saw_detection = false;
        for _ in 0..400 {
            let update = feed.tick();
            let beacon = update.active_beacon.expect("demo always picks a beacon");
            assert!(cfg.layout.beacon(beacon).is_some());
            for id in &update.detected_sensors {
                assert!(cfg.layout.sensor(*id).is_some());
            }
            saw_detection |= !update.detected_sensors.is_empty();

            let src = update.source.expect("demo always sends a source");
            let accuracy = src.accuracy.unwrap_or_default();
            assert!((15.0..25.0).contains(&accuracy));
        }
        assert!(saw_detection);
        assert_eq!(feed.ticks(), 400);
    }

    #[test]
    fn source_orbits_the_receiver() {
        let cfg = RadarConfig::default();
        let mut feed = DemoFeed::new(&cfg);
        let first = feed.tick().source.unwrap_or_default();
        assert_eq!(first.x, Some(700.0));
        assert_eq!(first.y, Some(350.0));

        for _ in 0..50 {
            let fix = feed.tick().source.unwrap_or_default();
            let p = Point::new(fix.x.unwrap_or_default(), fix.y.unwrap_or_default());
            assert!((p.distance(cfg.layout.receiver) - 200.0).abs() < 1e-9);
        }
    }

    #[test]
    fn out_of_range_falls_back_to_nearest_beacon() {
        let mut cfg = RadarConfig::default();
        cfg.layout.beacons = vec![
            LayoutPoint::new(1, -5000.0, 0.0),
            LayoutPoint::new(2, 5000.0, 0.0),
        ];
        let mut feed = DemoFeed::new(&cfg);
        // The first tick puts the source at (700, 350), closer to beacon 2.
        assert_eq!(feed.tick().active_beacon, Some(2));
    }

    #[test]
    fn pacer_fires_once_per_interval() {
        let mut pacer = Pacer::new(Duration::from_millis(150));
        let t0 = Instant::now();
        assert!(pacer.ready(t0));
        assert!(!pacer.ready(t0 + Duration::from_millis(100)));
        assert!(pacer.ready(t0 + Duration::from_millis(150)));
        assert!(!pacer.ready(t0 + Duration::from_millis(299)));
        assert!(pacer.ready(t0 + Duration::from_millis(300)));

        pacer.reset();
        assert!(pacer.ready(t0 + Duration::from_millis(301)));
    }

    #[test]
    fn poll_respects_the_tick_interval() {
        let cfg = RadarConfig::default();
        let mut feed = DemoFeed::new(&cfg);
        let t0 = Instant::now();
        assert!(feed.poll(t0).is_some());
        assert!(feed.poll(t0 + Duration::from_millis(10)).is_none());
        assert!(feed.poll(t0 + Duration::from_millis(150)).is_some());
        assert_eq!(feed.ticks(), 2);
    }
}
