//! Per-device connection anchors.

use super::ConnectionId;
use crate::device::{DeviceId, DeviceRef};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Side of the device bounding box an anchor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorDirection {
    Top,
    Right,
    Bottom,
    Left,
    Center,
}

/// A directional attachment point on a device's perimeter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionAnchor {
    pub device_id: DeviceId,
    pub position: Point,
    pub direction: AnchorDirection,
    pub max_connections: usize,
    pub current_connections: HashSet<ConnectionId>,
    /// Kept equal to `current_connections.len() >= max_connections`.
    pub is_occupied: bool,
}

impl ConnectionAnchor {
    pub fn new(device_id: DeviceId, position: Point, direction: AnchorDirection, max_connections: usize) -> Self {
        Self {
            device_id,
            position,
            direction,
            max_connections,
            current_connections: HashSet::new(),
            is_occupied: max_connections == 0,
        }
    }

    /// Record a connection on this anchor. Returns false if the anchor was
    /// already full, leaving it unchanged.
    pub fn attach(&mut self, id: ConnectionId) -> bool {
        if self.current_connections.contains(&id) {
            return true;
        }
        if self.is_occupied {
            return false;
        }
        self.current_connections.insert(id);
        self.refresh_occupancy();
        true
    }

    /// Forget a connection. Returns whether it was attached.
    pub fn detach(&mut self, id: ConnectionId) -> bool {
        let removed = self.current_connections.remove(&id);
        self.refresh_occupancy();
        removed
    }

    pub fn remaining_capacity(&self) -> usize {
        self.max_connections.saturating_sub(self.current_connections.len())
    }

    fn refresh_occupancy(&mut self) {
        self.is_occupied = self.current_connections.len() >= self.max_connections;
    }
}

/// The four edge-midpoint anchors of a device, in top/right/bottom/left order.
pub fn anchors_for_device(device: &DeviceRef, max_connections: usize) -> [ConnectionAnchor; 4] {
    let c = device.center();
    let hw = device.half_width();
    let hh = device.half_height();
    [
        ConnectionAnchor::new(device.id, Point::new(c.x, c.y - hh), AnchorDirection::Top, max_connections),
        ConnectionAnchor::new(device.id, Point::new(c.x + hw, c.y), AnchorDirection::Right, max_connections),
        ConnectionAnchor::new(device.id, Point::new(c.x, c.y + hh), AnchorDirection::Bottom, max_connections),
        ConnectionAnchor::new(device.id, Point::new(c.x - hw, c.y), AnchorDirection::Left, max_connections),
    ]
}

/// Index of the anchor of `device_id` closest to `point`.
pub fn nearest_anchor_index(anchors: &[ConnectionAnchor], device_id: DeviceId, point: Point) -> Option<usize> {
    anchors
        .iter()
        .enumerate()
        .filter(|(_, a)| a.device_id == device_id)
        .min_by(|(_, a), (_, b)| {
            a.position
                .distance_squared(point)
                .total_cmp(&b.position.distance_squared(point))
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use uuid::Uuid;

    fn device() -> DeviceRef {
        DeviceRef::new(Uuid::new_v4(), Point::new(0.0, 0.0), Size::new(60.0, 40.0))
    }

    #[test]
    fn test_four_edge_anchors() {
        let d = device();
        let anchors = anchors_for_device(&d, 2);
        let positions: Vec<_> = anchors.iter().map(|a| (a.direction, a.position)).collect();
        assert_eq!(
            positions,
            vec![
                (AnchorDirection::Top, Point::new(0.0, -20.0)),
                (AnchorDirection::Right, Point::new(30.0, 0.0)),
                (AnchorDirection::Bottom, Point::new(0.0, 20.0)),
                (AnchorDirection::Left, Point::new(-30.0, 0.0)),
            ]
        );
        assert!(anchors.iter().all(|a| !a.is_occupied && a.device_id == d.id));
    }

    #[test]
    fn test_occupancy_tracks_capacity() {
        let d = device();
        let [mut top, ..] = anchors_for_device(&d, 2);
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        assert!(top.attach(a));
        assert!(!top.is_occupied);
        assert!(top.attach(b));
        assert!(top.is_occupied);
        assert_eq!(top.remaining_capacity(), 0);

        assert!(!top.attach(c), "full anchor must reject");
        assert_eq!(top.current_connections.len(), 2);

        assert!(top.detach(a));
        assert!(!top.is_occupied);
        assert!(!top.detach(a));
    }

    #[test]
    fn test_reattach_same_id_is_idempotent() {
        let d = device();
        let [mut top, ..] = anchors_for_device(&d, 1);
        let id = Uuid::new_v4();
        assert!(top.attach(id));
        assert!(top.attach(id));
        assert_eq!(top.current_connections.len(), 1);
    }

    #[test]
    fn test_nearest_anchor() {
        let d = device();
        let other = DeviceRef::new(Uuid::new_v4(), Point::new(28.0, 0.0), Size::new(10.0, 10.0));
        let mut anchors = anchors_for_device(&d, 1).to_vec();
        anchors.extend(anchors_for_device(&other, 1));

        let idx = nearest_anchor_index(&anchors, d.id, Point::new(25.0, 3.0)).unwrap();
        assert_eq!(anchors[idx].direction, AnchorDirection::Right);
        assert_eq!(anchors[idx].device_id, d.id);

        assert!(nearest_anchor_index(&anchors, Uuid::new_v4(), Point::ZERO).is_none());
    }
}
