//! Devices placed on the topology canvas.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for devices.
pub type DeviceId = Uuid;

/// Default footprint of a newly placed device.
pub const DEFAULT_DEVICE_SIZE: Size = Size::new(60.0, 60.0);

/// Read-only geometric view of a device, as supplied by the device registry.
///
/// `position` is the centre of the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceRef {
    pub id: DeviceId,
    pub position: Point,
    pub size: Size,
}

impl DeviceRef {
    pub fn new(id: DeviceId, position: Point, size: Size) -> Self {
        Self { id, position, size }
    }

    /// Centre point.
    pub fn center(&self) -> Point {
        self.position
    }

    /// Bounding box in world coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, self.size).abs()
    }

    /// Half extents; a negative size counts by magnitude.
    pub fn half_width(&self) -> f64 {
        self.size.width.abs() / 2.0
    }

    pub fn half_height(&self) -> f64 {
        self.size.height.abs() / 2.0
    }
}

/// Category of network equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Router,
    #[default]
    Switch,
    Firewall,
    Server,
    Workstation,
    AccessPoint,
    Cloud,
}

/// A device record as held by the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub kind: DeviceKind,
    pub position: Point,
    pub size: Size,
}

impl Device {
    /// Create a device with a fresh id and the default size.
    pub fn new(name: impl Into<String>, kind: DeviceKind, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            position,
            size: DEFAULT_DEVICE_SIZE,
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Geometric view for the drawing engine.
    pub fn to_ref(&self) -> DeviceRef {
        DeviceRef::new(self.id, self.position, self.size)
    }
}

impl From<&Device> for DeviceRef {
    fn from(device: &Device) -> Self {
        device.to_ref()
    }
}
