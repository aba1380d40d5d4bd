//! Device and connection edits as undoable commands.
//!
//! Each command keeps ids and value snapshots taken at construction, plus the
//! mutator it was given. None of them hold on to the project's collections.

use super::{BoxFuture, Command, CommandKind, CommandMeta};
use crate::connection::{Connection, ConnectionId};
use crate::device::{Device, DeviceId};
use crate::error::{EditorError, EditorResult};
use crate::project::ProjectMutator;
use kurbo::Point;
use std::rc::Rc;

/// Shared handle to the project mutator.
pub type Mutator = Rc<dyn ProjectMutator>;

fn device_label(device: &Device) -> &str {
    if device.name.is_empty() {
        "device"
    } else {
        &device.name
    }
}

pub struct AddDeviceCommand {
    meta: CommandMeta,
    mutator: Mutator,
    device: Device,
}

impl AddDeviceCommand {
    pub fn new(mutator: Mutator, device: Device) -> Self {
        Self {
            meta: CommandMeta::new(format!("Add {}", device_label(&device))),
            mutator,
            device,
        }
    }

    pub fn device_id(&self) -> DeviceId {
        self.device.id
    }
}

impl Command for AddDeviceCommand {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn kind(&self) -> CommandKind {
        CommandKind::AddDevice
    }

    fn can_execute(&self) -> bool {
        self.mutator.get_device(self.device.id).is_none()
    }

    fn execute(&self) -> BoxFuture<'_, EditorResult<()>> {
        Box::pin(async move { self.mutator.add_device(self.device.clone()) })
    }

    fn undo(&self) -> BoxFuture<'_, EditorResult<()>> {
        Box::pin(async move { self.mutator.remove_device(self.device.id).map(drop) })
    }
}

/// Removes a device together with its connections.
pub struct RemoveDeviceCommand {
    meta: CommandMeta,
    mutator: Mutator,
    device: Device,
    connections: Vec<Connection>,
}

impl RemoveDeviceCommand {
    /// Snapshot device `id` and its attached connections.
    pub fn new(mutator: Mutator, id: DeviceId) -> EditorResult<Self> {
        let device = mutator
            .get_device(id)
            .ok_or_else(|| EditorError::not_found("Device", id))?;
        let connections = mutator.connections_for_device(id);
        Ok(Self {
            meta: CommandMeta::new(format!("Remove {}", device_label(&device))),
            mutator,
            device,
            connections,
        })
    }

    pub fn device_id(&self) -> DeviceId {
        self.device.id
    }

    pub fn removed_connections(&self) -> &[Connection] {
        &self.connections
    }
}

impl Command for RemoveDeviceCommand {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn kind(&self) -> CommandKind {
        CommandKind::RemoveDevice
    }

    fn can_execute(&self) -> bool {
        self.mutator.get_device(self.device.id).is_some()
    }

    fn execute(&self) -> BoxFuture<'_, EditorResult<()>> {
        Box::pin(async move { self.mutator.remove_device(self.device.id).map(drop) })
    }

    fn undo(&self) -> BoxFuture<'_, EditorResult<()>> {
        Box::pin(async move {
            self.mutator.add_device(self.device.clone())?;
            for connection in &self.connections {
                match self.mutator.add_connection(connection.clone()) {
                    Ok(()) => {}
                    // the other endpoint was removed since
                    Err(EditorError::NotFound { .. }) => {
                        log::debug!("Skipping connection {}: endpoint is gone", connection.id);
                    }
                    Err(err) => {
                        log::warn!("Could not restore connection {}: {}", connection.id, err);
                        // removing the device also drops the connections restored so far
                        if let Err(rollback) = self.mutator.remove_device(self.device.id) {
                            log::error!("Rollback of '{}' failed: {}", self.description(), rollback);
                        }
                        return Err(err);
                    }
                }
            }
            Ok(())
        })
    }
}

/// Replaces a device record, remembering the previous one.
pub struct UpdateDeviceCommand {
    meta: CommandMeta,
    mutator: Mutator,
    before: Device,
    after: Device,
}

impl UpdateDeviceCommand {
    pub fn new(mutator: Mutator, after: Device) -> EditorResult<Self> {
        let before = mutator
            .get_device(after.id)
            .ok_or_else(|| EditorError::not_found("Device", after.id))?;
        Ok(Self::from_snapshots(
            mutator,
            format!("Update {}", device_label(&after)),
            before,
            after,
        ))
    }

    fn from_snapshots(mutator: Mutator, description: String, before: Device, after: Device) -> Self {
        Self {
            meta: CommandMeta::new(description),
            mutator,
            before,
            after,
        }
    }

    pub fn before(&self) -> &Device {
        &self.before
    }

    pub fn after(&self) -> &Device {
        &self.after
    }
}

impl Command for UpdateDeviceCommand {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn kind(&self) -> CommandKind {
        CommandKind::UpdateDevice
    }

    fn can_execute(&self) -> bool {
        self.before != self.after
    }

    fn execute(&self) -> BoxFuture<'_, EditorResult<()>> {
        Box::pin(async move { self.mutator.update_device(self.after.clone()).map(drop) })
    }

    fn undo(&self) -> BoxFuture<'_, EditorResult<()>> {
        Box::pin(async move { self.mutator.update_device(self.before.clone()).map(drop) })
    }
}

/// Constructor for position-only updates.
pub struct MoveDeviceCommand;

impl MoveDeviceCommand {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(mutator: Mutator, id: DeviceId, to: Point) -> EditorResult<UpdateDeviceCommand> {
        let before = mutator
            .get_device(id)
            .ok_or_else(|| EditorError::not_found("Device", id))?;
        let mut after = before.clone();
        after.position = to;
        let description = format!("Move {}", device_label(&before));
        Ok(UpdateDeviceCommand::from_snapshots(mutator, description, before, after))
    }
}

pub struct AddConnectionCommand {
    meta: CommandMeta,
    mutator: Mutator,
    connection: Connection,
}

impl AddConnectionCommand {
    pub fn new(mutator: Mutator, connection: Connection) -> Self {
        Self {
            meta: CommandMeta::new(format!("Add {} connection", connection.kind)),
            mutator,
            connection,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection.id
    }
}

impl Command for AddConnectionCommand {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn kind(&self) -> CommandKind {
        CommandKind::AddConnection
    }

    fn can_execute(&self) -> bool {
        !self.connection.is_self_connection()
    }

    fn execute(&self) -> BoxFuture<'_, EditorResult<()>> {
        Box::pin(async move { self.mutator.add_connection(self.connection.clone()) })
    }

    fn undo(&self) -> BoxFuture<'_, EditorResult<()>> {
        Box::pin(async move { self.mutator.remove_connection(self.connection.id).map(drop) })
    }
}

pub struct RemoveConnectionCommand {
    meta: CommandMeta,
    mutator: Mutator,
    connection: Connection,
}

impl RemoveConnectionCommand {
    pub fn new(mutator: Mutator, id: ConnectionId) -> EditorResult<Self> {
        let connection = mutator
            .get_connection(id)
            .ok_or_else(|| EditorError::not_found("Connection", id))?;
        Ok(Self {
            meta: CommandMeta::new(format!("Remove {} connection", connection.kind)),
            mutator,
            connection,
        })
    }
}

impl Command for RemoveConnectionCommand {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn kind(&self) -> CommandKind {
        CommandKind::RemoveConnection
    }

    fn execute(&self) -> BoxFuture<'_, EditorResult<()>> {
        Box::pin(async move { self.mutator.remove_connection(self.connection.id).map(drop) })
    }

    fn undo(&self) -> BoxFuture<'_, EditorResult<()>> {
        Box::pin(async move { self.mutator.add_connection(self.connection.clone()) })
    }
}
