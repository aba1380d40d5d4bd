//! In-memory project implementation.

use super::{DeviceRegistry, ProjectMutator};
use crate::config::EditorConfig;
use crate::connection::{Connection, ConnectionId};
use crate::device::{Device, DeviceId, DeviceRef};
use crate::error::{EditorError, EditorResult};
use std::cell::RefCell;

/// Single-threaded project store for tests and simple hosts.
///
/// Devices and connections keep insertion order.
#[derive(Debug)]
pub struct InMemoryProject {
    devices: RefCell<Vec<Device>>,
    connections: RefCell<Vec<Connection>>,
    max_devices: usize,
    max_connections: usize,
}

impl Default for InMemoryProject {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl InMemoryProject {
    /// Create an empty project with the device and connection caps from
    /// `config`.
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_limits(config.max_devices, config.max_connections)
    }

    pub fn with_limits(max_devices: usize, max_connections: usize) -> Self {
        Self {
            devices: RefCell::new(Vec::new()),
            connections: RefCell::new(Vec::new()),
            max_devices,
            max_connections,
        }
    }

    pub fn devices(&self) -> Vec<Device> {
        self.devices.borrow().clone()
    }

    pub fn device_ids(&self) -> Vec<DeviceId> {
        self.devices.borrow().iter().map(|d| d.id).collect()
    }

    pub fn connections(&self) -> Vec<Connection> {
        self.connections.borrow().clone()
    }

    pub fn device_count(&self) -> usize {
        self.devices.borrow().len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.borrow().len()
    }

    fn has_device(&self, id: DeviceId) -> bool {
        self.devices.borrow().iter().any(|d| d.id == id)
    }
}

impl DeviceRegistry for InMemoryProject {
    fn device_refs(&self) -> Vec<DeviceRef> {
        self.devices.borrow().iter().map(Device::to_ref).collect()
    }
}

impl ProjectMutator for InMemoryProject {
    fn add_device(&self, device: Device) -> EditorResult<()> {
        if self.has_device(device.id) {
            return Err(EditorError::state(format!("device {} already exists", device.id)));
        }
        let mut devices = self.devices.borrow_mut();
        if devices.len() >= self.max_devices {
            return Err(EditorError::LimitExceeded {
                what: "Device",
                limit: self.max_devices,
            });
        }
        devices.push(device);
        Ok(())
    }

    fn remove_device(&self, id: DeviceId) -> EditorResult<Device> {
        let mut devices = self.devices.borrow_mut();
        let index = devices
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| EditorError::not_found("Device", id))?;
        let device = devices.remove(index);
        self.connections
            .borrow_mut()
            .retain(|c| !c.involves_device(id));
        Ok(device)
    }

    fn update_device(&self, device: Device) -> EditorResult<Device> {
        let mut devices = self.devices.borrow_mut();
        let slot = devices
            .iter_mut()
            .find(|d| d.id == device.id)
            .ok_or_else(|| EditorError::not_found("Device", device.id))?;
        Ok(std::mem::replace(slot, device))
    }

    fn get_device(&self, id: DeviceId) -> Option<Device> {
        self.devices.borrow().iter().find(|d| d.id == id).cloned()
    }

    fn add_connection(&self, connection: Connection) -> EditorResult<()> {
        if connection.is_self_connection() {
            return Err(EditorError::SelfConnection);
        }
        for id in [connection.source_device_id, connection.target_device_id] {
            if !self.has_device(id) {
                return Err(EditorError::not_found("Device", id));
            }
        }
        let mut connections = self.connections.borrow_mut();
        if connections.iter().any(|c| c.id == connection.id) {
            return Err(EditorError::state(format!(
                "connection {} already exists",
                connection.id
            )));
        }
        if connections.len() >= self.max_connections {
            return Err(EditorError::LimitExceeded {
                what: "Connection",
                limit: self.max_connections,
            });
        }
        connections.push(connection);
        Ok(())
    }

    fn remove_connection(&self, id: ConnectionId) -> EditorResult<Connection> {
        let mut connections = self.connections.borrow_mut();
        let index = connections
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| EditorError::not_found("Connection", id))?;
        Ok(connections.remove(index))
    }

    fn get_connection(&self, id: ConnectionId) -> Option<Connection> {
        self.connections.borrow().iter().find(|c| c.id == id).cloned()
    }

    fn connections_for_device(&self, id: DeviceId) -> Vec<Connection> {
        self.connections
            .borrow()
            .iter()
            .filter(|c| c.involves_device(id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionType;
    use crate::device::DeviceKind;
    use crate::error::ErrorKind;
    use kurbo::Point;

    fn router(name: &str, x: f64) -> Device {
        Device::new(name, DeviceKind::Router, Point::new(x, 0.0))
    }

    fn link(a: &Device, b: &Device) -> Connection {
        Connection::new(ConnectionType::Ethernet, a.id, b.id, vec![a.position, b.position])
    }

    #[test]
    fn test_add_and_get_device() {
        let project = InMemoryProject::default();
        let r1 = router("r1", 0.0);
        project.add_device(r1.clone()).unwrap();
        assert_eq!(project.get_device(r1.id), Some(r1.clone()));
        assert_eq!(project.device_refs(), vec![r1.to_ref()]);
        assert_eq!(project.device_ref(r1.id), Some(r1.to_ref()));

        let err = project.add_device(r1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
    }

    #[test]
    fn test_device_limit() {
        let project = InMemoryProject::with_limits(1, 10);
        project.add_device(router("r1", 0.0)).unwrap();
        let err = project.add_device(router("r2", 100.0)).unwrap_err();
        assert!(matches!(err, EditorError::LimitExceeded { what: "Device", limit: 1 }));
        assert_eq!(project.device_count(), 1);
    }

    #[test]
    fn test_remove_device_cascades_connections() {
        let project = InMemoryProject::default();
        let (r1, r2, r3) = (router("r1", 0.0), router("r2", 100.0), router("r3", 200.0));
        for d in [&r1, &r2, &r3] {
            project.add_device(d.clone()).unwrap();
        }
        project.add_connection(link(&r1, &r2)).unwrap();
        project.add_connection(link(&r2, &r3)).unwrap();
        assert_eq!(project.connections_for_device(r2.id).len(), 2);

        let removed = project.remove_device(r1.id).unwrap();
        assert_eq!(removed.id, r1.id);
        assert_eq!(project.connection_count(), 1);
        assert_eq!(project.remove_device(r1.id).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_update_device_returns_previous() {
        let project = InMemoryProject::default();
        let r1 = router("r1", 0.0);
        project.add_device(r1.clone()).unwrap();

        let mut moved = r1.clone();
        moved.position = Point::new(40.0, 50.0);
        let previous = project.update_device(moved).unwrap();
        assert_eq!(previous.position, Point::ZERO);
        assert_eq!(project.get_device(r1.id).unwrap().position, Point::new(40.0, 50.0));

        assert!(project.update_device(router("ghost", 0.0)).is_err());
    }

    #[test]
    fn test_connection_validation() {
        let project = InMemoryProject::with_limits(10, 1);
        let (r1, r2) = (router("r1", 0.0), router("r2", 100.0));
        project.add_device(r1.clone()).unwrap();

        assert_eq!(
            project.add_connection(link(&r1, &r2)).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            project.add_connection(link(&r1, &r1)).unwrap_err(),
            EditorError::SelfConnection
        );

        project.add_device(r2.clone()).unwrap();
        let conn = link(&r1, &r2);
        project.add_connection(conn.clone()).unwrap();
        assert_eq!(project.add_connection(conn.clone()).unwrap_err().kind(), ErrorKind::State);
        assert_eq!(
            project.add_connection(link(&r2, &r1)).unwrap_err().kind(),
            ErrorKind::LimitExceeded
        );

        assert_eq!(project.remove_connection(conn.id).unwrap(), conn);
        assert!(project.get_connection(conn.id).is_none());
    }
}
