//! Axis-aligned geometry primitives used for clickable regions.
//!
//! Coordinates are in the corrected game-surface space: the origin is the
//! top-left corner of the game surface after device offset correction.

use serde::{Deserialize, Serialize};

/// A point in game-surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in game-surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle with no area cannot be clicked in.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Scale all coordinates uniformly, for normalizing rectangles across
    /// devices with different resolutions.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            (self.x as f64 * factor) as i32,
            (self.y as f64 * factor) as i32,
            (self.width as f64 * factor) as i32,
            (self.height as f64 * factor) as i32,
        )
    }

    /// Shrink (factor < 1.0) or grow (factor > 1.0) around the center.
    ///
    /// Used to tighten a matched region before picking a click point so that
    /// clicks land away from the region's edges.
    pub fn center_shrink(&self, factor: f64) -> Self {
        let new_width = (self.width as f64 * factor) as i32;
        let new_height = (self.height as f64 * factor) as i32;
        Self::new(
            self.x + (self.width - new_width) / 2,
            self.y + (self.height - new_height) / 2,
            new_width,
            new_height,
        )
    }
}
