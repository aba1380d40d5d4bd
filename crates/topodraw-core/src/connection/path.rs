//! Connection path generation and endpoint snapping.

use crate::device::DeviceRef;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Grid size for snapping when grid snapping is switched on.
pub const GRID_SIZE: f64 = 20.0;

/// Bezier control point offset, as a fraction of the horizontal span.
const BEZIER_TENSION: f64 = 0.3;

/// How the path between two endpoints is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DrawingMode {
    #[default]
    Straight,
    Orthogonal,
    Bezier,
}

/// Snapping options for connection endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    pub enabled: bool,
    /// How far outside a device's bounds the pointer may be and still
    /// target it.
    pub snap_distance: f64,
    pub snap_to_devices: bool,
    pub snap_to_grid: bool,
    pub grid_size: f64,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            snap_distance: 20.0,
            snap_to_devices: true,
            snap_to_grid: false,
            grid_size: GRID_SIZE,
        }
    }
}

impl SnapSettings {
    pub fn snaps_to_devices(&self) -> bool {
        self.enabled && self.snap_to_devices
    }

    pub fn snaps_to_grid(&self) -> bool {
        self.enabled && self.snap_to_grid
    }
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the point moved onto a snap target.
    pub snapped: bool,
}

impl SnapResult {
    /// A result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped: false,
        }
    }
}

/// Route a path from `start` to `end`.
///
/// * straight: `[S, E]`
/// * orthogonal: `[S, (mid_x, S.y), (mid_x, E.y), E]`
/// * bezier: `[S, c1, c2, E]` with horizontal control points
pub fn generate_path(mode: DrawingMode, start: Point, end: Point) -> Vec<Point> {
    match mode {
        DrawingMode::Straight => vec![start, end],
        DrawingMode::Orthogonal => {
            let mid_x = start.x + (end.x - start.x) / 2.0;
            vec![
                start,
                Point::new(mid_x, start.y),
                Point::new(mid_x, end.y),
                end,
            ]
        }
        DrawingMode::Bezier => {
            let dx = end.x - start.x;
            vec![
                start,
                Point::new(start.x + BEZIER_TENSION * dx, start.y),
                Point::new(end.x - BEZIER_TENSION * dx, end.y),
                end,
            ]
        }
    }
}

/// Project `point` onto the nearest edge of `device`.
///
/// The dominant axis of the offset from the device centre picks the edge;
/// the other coordinate is clamped to the device's extent.
pub fn snap_to_device_edge(device: &DeviceRef, point: Point) -> SnapResult {
    let center = device.center();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    let half_w = device.half_width();
    let half_h = device.half_height();

    let snapped = if dx.abs() > dy.abs() {
        let x = if dx > 0.0 { center.x + half_w } else { center.x - half_w };
        Point::new(x, point.y.max(center.y - half_h).min(center.y + half_h))
    } else {
        let y = if dy < 0.0 { center.y - half_h } else { center.y + half_h };
        Point::new(point.x.max(center.x - half_w).min(center.x + half_w), y)
    };

    SnapResult {
        point: snapped,
        snapped: true,
    }
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> SnapResult {
    if grid_size <= 0.0 {
        return SnapResult::none(point);
    }
    SnapResult {
        point: Point::new(
            (point.x / grid_size).round() * grid_size,
            (point.y / grid_size).round() * grid_size,
        ),
        snapped: true,
    }
}

/// Sum of the Euclidean lengths of consecutive segments.
pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Rect, Size};
    use uuid::Uuid;

    fn device_at(x: f64, y: f64) -> DeviceRef {
        DeviceRef::new(Uuid::new_v4(), Point::new(x, y), Size::new(60.0, 60.0))
    }

    #[test]
    fn test_straight_path() {
        let path = generate_path(DrawingMode::Straight, Point::new(0.0, 0.0), Point::new(10.0, 5.0));
        assert_eq!(path, vec![Point::new(0.0, 0.0), Point::new(10.0, 5.0)]);
    }

    #[test]
    fn test_orthogonal_path() {
        let path = generate_path(DrawingMode::Orthogonal, Point::new(0.0, 0.0), Point::new(100.0, 50.0));
        assert_eq!(
            path,
            vec![
                Point::new(0.0, 0.0),
                Point::new(50.0, 0.0),
                Point::new(50.0, 50.0),
                Point::new(100.0, 50.0),
            ]
        );
    }

    #[test]
    fn test_bezier_path() {
        let path = generate_path(DrawingMode::Bezier, Point::new(0.0, 0.0), Point::new(100.0, 40.0));
        assert_eq!(path.len(), 4);
        assert!((path[1].x - 30.0).abs() < 1e-9);
        assert!((path[1].y - 0.0).abs() < 1e-9);
        assert!((path[2].x - 70.0).abs() < 1e-9);
        assert!((path[2].y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_snap_to_left_edge() {
        let device = device_at(200.0, 0.0);
        let result = snap_to_device_edge(&device, Point::new(170.0, 0.0));
        assert_eq!(result.point, Point::new(170.0, 0.0));

        let result = snap_to_device_edge(&device, Point::new(100.0, 10.0));
        assert_eq!(result.point, Point::new(170.0, 10.0));
    }

    #[test]
    fn test_snap_clamps_secondary_axis() {
        let device = device_at(0.0, 0.0);
        // Dominant x, y outside the device extent
        let result = snap_to_device_edge(&device, Point::new(200.0, 90.0));
        assert_eq!(result.point, Point::new(30.0, 30.0));
        // Dominant y, above the device
        let result = snap_to_device_edge(&device, Point::new(-10.0, -100.0));
        assert_eq!(result.point, Point::new(-10.0, -30.0));
    }

    #[test]
    fn test_snap_at_center_goes_to_bottom() {
        let device = device_at(0.0, 0.0);
        let result = snap_to_device_edge(&device, Point::ZERO);
        assert_eq!(result.point, Point::new(0.0, 30.0));
    }

    #[test]
    fn test_snap_with_negative_size_uses_magnitude() {
        let device = DeviceRef::new(Uuid::new_v4(), Point::ZERO, Size::new(-60.0, -40.0));
        let result = snap_to_device_edge(&device, Point::new(200.0, 90.0));
        assert_eq!(result.point, Point::new(30.0, 20.0));
        let result = snap_to_device_edge(&device, Point::new(5.0, -100.0));
        assert_eq!(result.point, Point::new(5.0, -20.0));
        assert_eq!(device.bounds(), Rect::new(-30.0, -20.0, 30.0, 20.0));
    }

    #[test]
    fn test_snap_to_grid() {
        let result = snap_to_grid(Point::new(23.0, 47.0), 20.0);
        assert_eq!(result.point, Point::new(20.0, 40.0));
        assert!(result.snapped);
        assert!(!snap_to_grid(Point::new(3.0, 3.0), 0.0).snapped);
    }

    #[test]
    fn test_path_length() {
        assert_eq!(path_length(&[]), 0.0);
        assert_eq!(path_length(&[Point::new(1.0, 1.0)]), 0.0);
        let points = [Point::new(0.0, 0.0), Point::new(3.0, 4.0), Point::new(3.0, 10.0)];
        assert!((path_length(&points) - 11.0).abs() < 1e-9);
    }
}
