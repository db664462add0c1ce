//! Fixed rig geometry.
//!
//! Coordinates are canvas pixels with the origin at the top-left corner. The
//! layout is decided once at startup and never mutated afterwards; display
//! state that changes at runtime lives in [`crate::store`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `to`; `t = 0` is `self`, `t = 1` is `to`.
    pub fn lerp(self, to: Point, t: f64) -> Point {
        Point {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }

    pub fn distance(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A beacon or sensor position keyed by its configured id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub id: u32,
    pub x: f64,
    pub y: f64,
}

impl LayoutPoint {
    pub const fn new(id: u32, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub receiver: Point,
    pub beacons: Vec<LayoutPoint>,
    pub sensors: Vec<LayoutPoint>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            receiver: Point::new(500.0, 350.0),
            beacons: vec![
                LayoutPoint::new(1, 200.0, 300.0),
                LayoutPoint::new(2, 800.0, 300.0),
            ],
            sensors: vec![
                LayoutPoint::new(0, 100.0, 100.0),
                LayoutPoint::new(1, 900.0, 100.0),
                LayoutPoint::new(2, 100.0, 600.0),
                LayoutPoint::new(3, 900.0, 600.0),
                LayoutPoint::new(4, 300.0, 200.0),
                LayoutPoint::new(5, 700.0, 200.0),
                LayoutPoint::new(6, 300.0, 500.0),
                LayoutPoint::new(7, 700.0, 500.0),
            ],
        }
    }
}

impl Layout {
    pub fn beacon(&self, id: u32) -> Option<&LayoutPoint> {
        self.beacons.iter().find(|b| b.id == id)
    }

    pub fn sensor(&self, id: u32) -> Option<&LayoutPoint> {
        self.sensors.iter().find(|s| s.id == id)
    }

    /// Ids must be unique within each group; beacons and sensors have separate
    /// id spaces.
    pub fn duplicate_id(&self) -> Option<(&'static str, u32)> {
        fn first_dup(points: &[LayoutPoint]) -> Option<u32> {
            points.iter().enumerate().find_map(|(i, p)| {
                points[..i].iter().any(|q| q.id == p.id).then_some(p.id)
            })
        }
        first_dup(&self.beacons)
            .map(|id| ("beacon", id))
            .or_else(|| first_dup(&self.sensors).map(|id| ("sensor", id)))
    }
}
