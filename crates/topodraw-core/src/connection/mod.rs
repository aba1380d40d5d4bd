//! Typed connections between devices and the engine that draws them.

mod analytics;
mod anchor;
mod engine;
mod path;
mod style;

pub use analytics::ConnectionAnalytics;
pub use anchor::{AnchorDirection, ConnectionAnchor, anchors_for_device, nearest_anchor_index};
pub use engine::{ConnectionDrawingEngine, DrawingSession, DrawingState};
pub use path::{
    DrawingMode, GRID_SIZE, SnapResult, SnapSettings, generate_path, path_length, snap_to_device_edge,
    snap_to_grid,
};
pub use style::{ConnectionStyle, SerializableColor, StrokeStyle};

use crate::clock::now_millis;
use crate::device::DeviceId;
use crate::error::EditorError;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for connections.
pub type ConnectionId = Uuid;

/// Physical medium of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    #[default]
    Ethernet,
    Fiber,
    Wireless,
    Serial,
    Usb,
    Power,
}

impl ConnectionType {
    pub const ALL: [ConnectionType; 6] = [
        ConnectionType::Ethernet,
        ConnectionType::Fiber,
        ConnectionType::Wireless,
        ConnectionType::Serial,
        ConnectionType::Usb,
        ConnectionType::Power,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionType::Ethernet => "ethernet",
            ConnectionType::Fiber => "fiber",
            ConnectionType::Wireless => "wireless",
            ConnectionType::Serial => "serial",
            ConnectionType::Usb => "usb",
            ConnectionType::Power => "power",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionType {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| EditorError::InvalidConnectionType(s.to_string()))
    }
}

/// A link between two devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    #[serde(rename = "type")]
    pub kind: ConnectionType,
    pub source_device_id: DeviceId,
    pub target_device_id: DeviceId,
    pub points: Vec<Point>,
    pub style: ConnectionStyle,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
    pub updated_at: u64,
}

impl Connection {
    /// Create a connection with a fresh id and the default style for `kind`.
    pub fn new(kind: ConnectionType, source: DeviceId, target: DeviceId, points: Vec<Point>) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4(),
            kind,
            source_device_id: source,
            target_device_id: target,
            points,
            style: ConnectionStyle::for_type(kind),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn involves_device(&self, id: DeviceId) -> bool {
        self.source_device_id == id || self.target_device_id == id
    }

    pub fn is_self_connection(&self) -> bool {
        self.source_device_id == self.target_device_id
    }

    pub fn path_length(&self) -> f64 {
        path_length(&self.points)
    }

    pub fn start_point(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn end_point(&self) -> Option<Point> {
        self.points.last().copied()
    }
}

/// Request to create a connection without going through a drawing session.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionRequest {
    pub source: Option<DeviceId>,
    pub target: Option<DeviceId>,
    pub kind: ConnectionType,
    /// Where on the source the link should attach; defaults to the anchor
    /// facing the target.
    pub source_point: Option<Point>,
    pub target_point: Option<Point>,
}

impl ConnectionRequest {
    pub fn new(source: DeviceId, target: DeviceId, kind: ConnectionType) -> Self {
        Self {
            source: Some(source),
            target: Some(target),
            kind,
            source_point: None,
            target_point: None,
        }
    }

    pub fn with_points(mut self, source_point: Point, target_point: Point) -> Self {
        self.source_point = Some(source_point);
        self.target_point = Some(target_point);
        self
    }
}
