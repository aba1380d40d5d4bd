//! Interfaces to the project that owns devices and connections.
//!
//! The engines never hold the project itself. Commands receive a
//! [`ProjectMutator`] at construction and otherwise keep only ids and value
//! snapshots.

mod memory;

pub use memory::InMemoryProject;

use crate::connection::{Connection, ConnectionId};
use crate::device::{Device, DeviceId, DeviceRef};
use crate::error::EditorResult;

/// Read access to device geometry.
pub trait DeviceRegistry {
    /// All devices, in registry order.
    fn device_refs(&self) -> Vec<DeviceRef>;

    /// Geometry of one device.
    fn device_ref(&self, id: DeviceId) -> Option<DeviceRef> {
        self.device_refs().into_iter().find(|d| d.id == id)
    }
}

/// Device and connection CRUD.
///
/// Methods take `&self`; implementations use interior mutability so that
/// several commands can share one mutator.
pub trait ProjectMutator {
    /// Insert a device.
    fn add_device(&self, device: Device) -> EditorResult<()>;

    /// Remove a device and every connection attached to it.
    fn remove_device(&self, id: DeviceId) -> EditorResult<Device>;

    /// Replace a device record, returning the previous one.
    fn update_device(&self, device: Device) -> EditorResult<Device>;

    fn get_device(&self, id: DeviceId) -> Option<Device>;

    /// Insert a connection between existing devices.
    fn add_connection(&self, connection: Connection) -> EditorResult<()>;

    fn remove_connection(&self, id: ConnectionId) -> EditorResult<Connection>;

    fn get_connection(&self, id: ConnectionId) -> Option<Connection>;

    /// Connections with `id` as source or target.
    fn connections_for_device(&self, id: DeviceId) -> Vec<Connection>;
}
