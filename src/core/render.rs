//! Scene painting.
//!
//! The renderer only knows about [`Painter`], a handful of 2D primitives. The web
//! crate implements it over `CanvasRenderingContext2d`; tests record the calls.
//!
//! Z-order, back to front: background, grid, receiver, beacons, sensors, source,
//! pulses.

use crate::config::{CanvasConfig, Palette, RadarConfig, Sizes};
use crate::layout::Point;
use crate::pulse::Pulse;
use crate::store::{Beacon, DisplayStore, Sensor, Source};

/// Minimal 2D drawing surface.
///
/// Stroke and fill calls honour the current alpha and line dash until they are
/// changed again.
pub trait Painter {
    /// Surface size in pixels, `(width, height)`.
    fn size(&self) -> (f64, f64);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str);
    fn line(&mut self, from: Point, to: Point, color: &str, width: f64);
    fn fill_circle(&mut self, center: Point, radius: f64, color: &str);
    fn stroke_circle(&mut self, center: Point, radius: f64, color: &str, width: f64);
    fn fill_triangle(&mut self, a: Point, b: Point, c: Point, color: &str);
    /// Centered text with its baseline at `at.y`.
    fn text(&mut self, text: &str, at: Point, font: &str, color: &str);
    fn set_alpha(&mut self, alpha: f64);
    /// An empty slice restores solid lines.
    fn set_line_dash(&mut self, dash: &[f64]);
}

/// Drawing-surface size for a container of `width` x `height` CSS pixels,
/// leaving `padding` on each axis. Never negative.
pub fn surface_size(width: f64, height: f64, padding: f64) -> (u32, u32) {
    let fit = |v: f64| {
        let v = (v - padding).floor();
        if v.is_finite() && v > 0.0 {
            v as u32
        } else {
            0
        }
    };
    (fit(width), fit(height))
}

#[derive(Debug, Clone)]
pub struct Renderer {
    canvas: CanvasConfig,
    palette: Palette,
    sizes: Sizes,
}

impl Renderer {
    pub fn new(cfg: &RadarConfig) -> Self {
        Self {
            canvas: cfg.canvas.clone(),
            palette: cfg.palette.clone(),
            sizes: cfg.sizes.clone(),
        }
    }

    /// Everything except the pulses.
    pub fn draw_scene<P: Painter + ?Sized>(&self, p: &mut P, store: &DisplayStore) {
        self.clear(p);
        self.draw_grid(p);
        self.draw_receiver(p, store.receiver());
        for b in store.beacons() {
            self.draw_beacon(p, b);
        }
        for s in store.sensors() {
            self.draw_sensor(p, s);
        }
        self.draw_source(p, store.source());
    }

    pub fn draw_pulses<P: Painter + ?Sized>(&self, p: &mut P, pulses: &[Pulse]) {
        for pulse in pulses {
            self.draw_pulse(p, pulse);
        }
    }

    pub fn draw_frame<P: Painter + ?Sized>(
        &self,
        p: &mut P,
        store: &DisplayStore,
        pulses: &[Pulse],
    ) {
        self.draw_scene(p, store);
        self.draw_pulses(p, pulses);
    }

    fn font(&self, style: &str) -> String {
        format!("{style} {}", self.canvas.font_family)
    }

    fn clear<P: Painter + ?Sized>(&self, p: &mut P) {
        let (w, h) = p.size();
        p.set_alpha(1.0);
        p.set_line_dash(&[]);
        p.fill_rect(0.0, 0.0, w, h, &self.canvas.background);
    }

    fn draw_grid<P: Painter + ?Sized>(&self, p: &mut P) {
        let spacing = self.canvas.grid_spacing;
        if !(spacing.is_finite() && spacing > 0.0) {
            return;
        }
        let (w, h) = p.size();

        let mut x = 0.0;
        while x <= w {
            p.line(Point::new(x, 0.0), Point::new(x, h), &self.palette.grid, 1.0);
            x += spacing;
        }
        let mut y = 0.0;
        while y <= h {
            p.line(Point::new(0.0, y), Point::new(w, y), &self.palette.grid, 1.0);
            y += spacing;
        }
    }

    fn draw_receiver<P: Painter + ?Sized>(&self, p: &mut P, rx: Point) {
        let r = self.sizes.receiver;
        p.fill_triangle(
            Point::new(rx.x, rx.y - r),
            Point::new(rx.x - r, rx.y + r),
            Point::new(rx.x + r, rx.y + r),
            &self.palette.receiver,
        );
        p.text(
            "RX",
            Point::new(rx.x, rx.y + 5.0),
            &self.font("12px"),
            &self.palette.label,
        );
    }

    fn draw_beacon<P: Painter + ?Sized>(&self, p: &mut P, b: &Beacon) {
        let color = if b.active {
            &self.palette.beacon_active
        } else {
            &self.palette.beacon_inactive
        };
        let center = b.point();

        if b.active {
            let ring = self.sizes.beacon + self.sizes.beacon_ring_offset;
            p.set_alpha(self.sizes.beacon_halo_alpha);
            p.fill_circle(center, ring, color);
            p.set_alpha(1.0);
            p.stroke_circle(center, ring, color, 2.0);
        }
        p.fill_circle(center, self.sizes.beacon, color);
        p.text(
            &format!("B{}", b.id),
            Point::new(center.x, center.y + 5.0),
            &self.font("bold 14px"),
            &self.palette.label,
        );
    }

    fn draw_sensor<P: Painter + ?Sized>(&self, p: &mut P, s: &Sensor) {
        let center = s.point();
        if s.detected {
            p.fill_circle(center, self.sizes.sensor, &self.palette.sensor_detected);
            p.stroke_circle(center, self.sizes.sensor, &self.palette.sensor_detected, 2.0);
        } else {
            p.fill_circle(center, self.sizes.sensor, &self.palette.sensor_normal);
        }
    }

    fn draw_source<P: Painter + ?Sized>(&self, p: &mut P, source: &Source) {
        if !source.valid {
            return;
        }
        let center = source.point();
        p.fill_circle(center, source.accuracy, &self.palette.source_accuracy);
        p.fill_circle(center, self.sizes.source, &self.palette.source);
        p.text(
            "SRC",
            Point::new(center.x, center.y + 15.0),
            &self.font("bold 12px"),
            &self.palette.label,
        );
    }

    fn draw_pulse<P: Painter + ?Sized>(&self, p: &mut P, pulse: &Pulse) {
        let head = pulse.head();

        p.set_line_dash(&self.sizes.pulse_dash);
        p.set_alpha(pulse.alpha * 0.7);
        p.line(pulse.from, head, &self.palette.pulse, self.sizes.pulse_line_width);

        p.set_line_dash(&[]);
        p.set_alpha(pulse.alpha);
        p.fill_circle(head, self.sizes.pulse_head, &self.palette.pulse);

        p.set_alpha(1.0);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// One recorded painter call. Colors are kept so tests can tell layers apart.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Op {
        FillRect { color: String },
        Line { from: Point, to: Point, color: String },
        FillCircle { center: Point, radius: f64, color: String },
        StrokeCircle { center: Point, radius: f64, color: String },
        Triangle { color: String },
        Text { text: String },
        Alpha(f64),
        Dash(Vec<f64>),
    }

    #[derive(Debug)]
    pub struct RecordingPainter {
        pub width: f64,
        pub height: f64,
        pub ops: Vec<Op>,
    }

    impl RecordingPainter {
        pub fn new(width: f64, height: f64) -> Self {
            Self {
                width,
                height,
                ops: Vec::new(),
            }
        }
    }

    impl Painter for RecordingPainter {
        fn size(&self) -> (f64, f64) {
            (self.width, self.height)
        }
        fn fill_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64, color: &str) {
            self.ops.push(Op::FillRect {
                color: color.to_string(),
            });
        }
        fn line(&mut self, from: Point, to: Point, color: &str, _width: f64) {
            self.ops.push(Op::Line {
                from,
                to,
                color: color.to_string(),
            });
        }
        fn fill_circle(&mut self, center: Point, radius: f64, color: &str) {
            self.ops.push(Op::FillCircle {
                center,
                radius,
                color: color.to_string(),
            });
        }
        fn stroke_circle(&mut self, center: Point, radius: f64, color: &str, _width: f64) {
            self.ops.push(Op::StrokeCircle {
                center,
                radius,
                color: color.to_string(),
            });
        }
        fn fill_triangle(&mut self, _a: Point, _b: Point, _c: Point, color: &str) {
            self.ops.push(Op::Triangle {
                color: color.to_string(),
            });
        }
        fn text(&mut self, text: &str, _at: Point, _font: &str, _color: &str) {
            self.ops.push(Op::Text {
                text: text.to_string(),
            });
        }
        fn set_alpha(&mut self, alpha: f64) {
            self.ops.push(Op::Alpha(alpha));
        }
        fn set_line_dash(&mut self, dash: &[f64]) {
            self.ops.push(Op::Dash(dash.to_vec()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Op, RecordingPainter};
    use super::*;
    use crate::protocol::{PositionUpdate, SourceFix};
    use crate::pulse::PulseOrigin;

    fn position_of(ops: &[Op], pred: impl Fn(&Op) -> bool) -> usize {
        ops.iter()
            .position(pred)
            .expect("expected op was not painted")
    }

    fn tracked_store() -> DisplayStore {
        let mut store = DisplayStore::from_config(&RadarConfig::default());
        store.apply_update(
            &PositionUpdate {
                source: Some(SourceFix::new(450.0, 320.0, Some(25.0))),
                active_beacon: Some(1),
                detected_sensors: vec![4],
                ..PositionUpdate::default()
            }
            .into(),
        );
        store
    }

    #[test]
    fn layers_are_painted_back_to_front() {
        let cfg = RadarConfig::default();
        let renderer = Renderer::new(&cfg);
        let store = tracked_store();
        let pulse = Pulse::new(
            Point::new(200.0, 300.0),
            Point::new(450.0, 320.0),
            PulseOrigin::Beacon(1),
        );

        let mut p = RecordingPainter::new(1000.0, 700.0);
        renderer.draw_frame(&mut p, &store, &[pulse]);
        let ops = &p.ops;

        let background = position_of(ops, |op| {
            matches!(op, Op::FillRect { color } if *color == cfg.canvas.background)
        });
        let grid = position_of(ops, |op| {
            matches!(op, Op::Line { color, .. } if *color == cfg.palette.grid)
        });
        let receiver = position_of(ops, |op| matches!(op, Op::Triangle { .. }));
        let beacon = position_of(ops, |op| matches!(op, Op::Text { text } if text == "B1"));
        let sensor = position_of(ops, |op| {
            matches!(op, Op::FillCircle { color, .. } if *color == cfg.palette.sensor_detected)
        });
        let source = position_of(ops, |op| matches!(op, Op::Text { text } if text == "SRC"));
        let trail = position_of(ops, |op| {
            matches!(op, Op::Line { color, .. } if *color == cfg.palette.pulse)
        });

        assert_eq!(background, 2, "alpha and dash reset come first");
        assert!(background < grid);
        assert!(grid < receiver);
        assert!(receiver < beacon);
        assert!(beacon < sensor);
        assert!(sensor < source);
        assert!(source < trail);
    }

    #[test]
    fn grid_covers_the_surface_at_fixed_spacing() {
        let renderer = Renderer::new(&RadarConfig::default());
        let store = DisplayStore::from_config(&RadarConfig::default());
        let mut p = RecordingPainter::new(200.0, 100.0);
        renderer.draw_scene(&mut p, &store);

        let grid_color = RadarConfig::default().palette.grid;
        let lines: Vec<&Op> = p
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Line { color, .. } if *color == grid_color))
            .collect();
        // x = 0, 50, 100, 150, 200 and y = 0, 50, 100.
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn surface_is_container_minus_padding() {
        assert_eq!(surface_size(1030.0, 730.0, 30.0), (1000, 700));
        assert_eq!(surface_size(640.5, 480.9, 30.0), (610, 450));
        assert_eq!(surface_size(10.0, 0.0, 30.0), (0, 0));
    }

    #[test]
    fn invalid_source_is_not_painted() {
        let renderer = Renderer::new(&RadarConfig::default());
        let mut store = tracked_store();
        store.calibrate();

        let mut p = RecordingPainter::new(1000.0, 700.0);
        renderer.draw_scene(&mut p, &store);
        assert!(!p
            .ops
            .iter()
            .any(|op| matches!(op, Op::Text { text } if text == "SRC")));
    }

    #[test]
    fn active_beacon_gets_ring_and_halo() {
        let cfg = RadarConfig::default();
        let renderer = Renderer::new(&cfg);
        let store = tracked_store();
        let mut p = RecordingPainter::new(1000.0, 700.0);
        renderer.draw_scene(&mut p, &store);

        let ring_radius = cfg.sizes.beacon + cfg.sizes.beacon_ring_offset;
        let b1 = Point::new(200.0, 300.0);
        assert!(p.ops.contains(&Op::StrokeCircle {
            center: b1,
            radius: ring_radius,
            color: cfg.palette.beacon_active.clone(),
        }));
        assert!(p.ops.contains(&Op::FillCircle {
            center: b1,
            radius: ring_radius,
            color: cfg.palette.beacon_active.clone(),
        }));
        // The inactive beacon has neither.
        assert!(!p.ops.iter().any(|op| matches!(
            op,
            Op::StrokeCircle { center, .. } if *center == Point::new(800.0, 300.0)
        )));
    }

    #[test]
    fn pulse_fades_with_progress_and_restores_state() {
        let cfg = RadarConfig::default();
        let renderer = Renderer::new(&cfg);
        let mut pulse = Pulse::new(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            PulseOrigin::Sensor(1),
        );
        pulse.advance(0.5);

        let mut p = RecordingPainter::new(10.0, 10.0);
        renderer.draw_pulses(&mut p, &[pulse]);
        assert_eq!(
            p.ops,
            vec![
                Op::Dash(cfg.sizes.pulse_dash.to_vec()),
                Op::Alpha(0.5 * 0.7),
                Op::Line {
                    from: Point::new(0.0, 0.0),
                    to: Point::new(50.0, 0.0),
                    color: cfg.palette.pulse.clone(),
                },
                Op::Dash(Vec::new()),
                Op::Alpha(0.5),
                Op::FillCircle {
                    center: Point::new(50.0, 0.0),
                    radius: cfg.sizes.pulse_head,
                    color: cfg.palette.pulse.clone(),
                },
                Op::Alpha(1.0),
            ]
        );
    }
}
