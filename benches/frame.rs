//! Criterion benchmarks for the per-frame path.
//!
//! Run with:
//!   cargo bench
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use radarview::animation::{AnimationLoop, FrameHandle, FrameHost};
use radarview::config::RadarConfig;
use radarview::demo::DemoFeed;
use radarview::layout::{LayoutPoint, Point};
use radarview::protocol::{parse_frame, Inbound};
use radarview::render::Painter;
use radarview::store::DisplayStore;

/// Counts primitives instead of drawing them.
#[derive(Default)]
struct CountingPainter {
    calls: u64,
}

impl Painter for CountingPainter {
    fn size(&self) -> (f64, f64) {
        (1000.0, 700.0)
    }
    fn fill_rect(&mut self, _: f64, _: f64, _: f64, _: f64, _: &str) {
        self.calls += 1;
    }
    fn line(&mut self, _: Point, _: Point, _: &str, _: f64) {
        self.calls += 1;
    }
    fn fill_circle(&mut self, _: Point, _: f64, _: &str) {
        self.calls += 1;
    }
    fn stroke_circle(&mut self, _: Point, _: f64, _: &str, _: f64) {
        self.calls += 1;
    }
    fn fill_triangle(&mut self, _: Point, _: Point, _: Point, _: &str) {
        self.calls += 1;
    }
    fn text(&mut self, _: &str, _: Point, _: &str, _: &str) {
        self.calls += 1;
    }
    fn set_alpha(&mut self, _: f64) {}
    fn set_line_dash(&mut self, _: &[f64]) {}
}

struct ImmediateHost;

impl FrameHost for ImmediateHost {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        Some(FrameHandle(1))
    }
    fn cancel_frame(&mut self, _: FrameHandle) {}
}

/// Config with `sensors` sensors on a ring around the receiver.
fn config_with_sensors(sensors: usize) -> RadarConfig {
    let mut cfg = RadarConfig::default();
    cfg.layout.sensors = (0..sensors)
        .map(|i| {
            let a = i as f64 / sensors as f64 * std::f64::consts::TAU;
            LayoutPoint::new(i as u32, 500.0 + 250.0 * a.cos(), 350.0 + 250.0 * a.sin())
        })
        .collect();
    cfg
}

/// One animation frame with every sensor detected, so pulses pile up.
fn bench_frame_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_sensors");

    for size in [8usize, 32, 128].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("on_frame", size), size, |b, &size| {
            let cfg = config_with_sensors(size);
            let mut store = DisplayStore::from_config(&cfg);
            let ids: Vec<String> = (0..size).map(|i| i.to_string()).collect();
            let frame = format!(
                r#"{{"source": {{"x": 480, "y": 360}}, "active_beacon": 1, "detected_sensors": [{}]}}"#,
                ids.join(",")
            );
            if let Ok(msg) = parse_frame(&frame) {
                store.apply_update(&msg);
            }

            let mut anim = AnimationLoop::new(&cfg);
            let mut host = ImmediateHost;
            let mut painter = CountingPainter::default();
            anim.start(&mut host);

            let mut now = 0.0;
            b.iter(|| {
                now += 16.0;
                anim.on_frame(now, &store, &mut painter, &mut host);
                black_box(painter.calls)
            });
        });
    }

    group.finish();
}

/// Parse + apply of a typical update frame.
fn bench_apply_update(c: &mut Criterion) {
    let cfg = RadarConfig::default();
    let mut feed = DemoFeed::new(&cfg);
    let frames: Vec<String> = (0..64)
        .filter_map(|_| serde_json::to_string(&feed.tick()).ok())
        .collect();

    c.bench_function("parse_and_apply", |b| {
        let mut store = DisplayStore::from_config(&cfg);
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % frames.len();
            if let Ok(msg @ Inbound::Update(_)) = parse_frame(&frames[i]) {
                black_box(store.apply_update(&msg));
            }
        });
    });
}

criterion_group!(benches, bench_frame_sizes, bench_apply_update);
criterion_main!(benches);
