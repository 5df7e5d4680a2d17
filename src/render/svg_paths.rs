//! Helpers for building SVG path data strings.
//!
//! Every helper pads its output with spaces so fragments can be concatenated directly.

use itertools::Itertools;

/// A coordinate pair, `" x,y "`.
pub fn point(x: f64, y: f64) -> String {
    format!(" {},{} ", x, y)
}

/// A curve command followed by its control points.
pub fn curve(command: &str, points: &[String]) -> String {
    format!(" {}{}", command, points.iter().join(""))
}

/// Absolute move.
pub fn move_to(x: f64, y: f64) -> String {
    format!(" M {},{} ", x, y)
}

/// Relative move.
pub fn move_by(dx: f64, dy: f64) -> String {
    format!(" m {},{} ", dx, dy)
}

/// Relative line to a single point.
pub fn line_to(dx: f64, dy: f64) -> String {
    format!(" l {},{} ", dx, dy)
}

/// Relative polyline through the given points.
pub fn line(points: &[String]) -> String {
    format!(" l{}", points.iter().join(""))
}

/// Horizontal or vertical line. `H`/`V` are absolute, `h`/`v` relative.
pub fn line_on_axis(command: &str, value: f64) -> String {
    format!(" {} {} ", command, value)
}

/// Elliptical arc with equal radii.
pub fn arc(command: &str, flags: &str, radius: f64, point: &str) -> String {
    format!("{} {} {} {}{}", command, radius, radius, flags, point)
}
