//! Drawing interface used to visualise the simulation.
//!
//! Nothing drawn here feeds back into physics or observations.

use crate::math::Point2d;
use serde_json::json;

/// An RGBA colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);
    pub const RED: Rgba = Rgba([255, 0, 0, 255]);
    pub const PURPLE: Rgba = Rgba([128, 0, 128, 255]);

    /// Colours given to vehicles in spawn order.
    pub const PALETTE: [Rgba; 6] = [
        Rgba([0, 0, 255, 255]),
        Rgba([0, 255, 0, 255]),
        Rgba([255, 0, 0, 255]),
        Rgba([255, 255, 0, 255]),
        Rgba([255, 192, 203, 255]),
        Rgba([255, 165, 0, 255]),
    ];

    /// The same colour with a different opacity.
    pub const fn with_alpha(self, alpha: u8) -> Self {
        let [r, g, b, _] = self.0;
        Rgba([r, g, b, alpha])
    }
}

/// A surface the simulation can draw onto.
pub trait Canvas {
    fn draw_line(&mut self, from: Point2d, to: Point2d, color: Rgba);

    fn draw_circle(&mut self, centre: Point2d, radius: f64, color: Rgba, filled: bool);

    /// Draws the closed outline through `points`.
    fn draw_polygon(&mut self, points: &[Point2d], color: Rgba);
}

/// A headless [Canvas] which records every shape of a frame as JSON.
#[derive(Clone, Debug, Default)]
pub struct FrameRecorder {
    shapes: Vec<serde_json::Value>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Default::default()
    }

    /// The number of shapes recorded so far.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// The shapes recorded so far.
    pub fn shapes(&self) -> &[serde_json::Value] {
        &self.shapes
    }

    /// Takes the recorded frame as a JSON array, leaving the recorder empty.
    pub fn take_frame(&mut self) -> serde_json::Value {
        json!(std::mem::take(&mut self.shapes))
    }
}

impl Canvas for FrameRecorder {
    fn draw_line(&mut self, from: Point2d, to: Point2d, color: Rgba) {
        self.shapes.push(json!({
            "type": "line",
            "p1": [from.x, from.y],
            "p2": [to.x, to.y],
            "color": color.0,
        }))
    }

    fn draw_circle(&mut self, centre: Point2d, radius: f64, color: Rgba, filled: bool) {
        self.shapes.push(json!({
            "type": "circle",
            "centre": [centre.x, centre.y],
            "radius": radius,
            "color": color.0,
            "filled": filled,
        }))
    }

    fn draw_polygon(&mut self, points: &[Point2d], color: Rgba) {
        let points: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        self.shapes.push(json!({
            "type": "polygon",
            "points": points,
            "color": color.0,
        }))
    }
}
