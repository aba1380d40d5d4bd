//! Undoable commands and the history that records them.
//!
//! A [`Command`] is immutable once constructed: it carries ids and value
//! snapshots and talks to the project through an injected
//! [`ProjectMutator`](crate::project::ProjectMutator). The
//! [`CommandHistory`] awaits each step before touching its own cursor, so a
//! command may defer its side effects (for example to persistence).

mod batch;
pub mod commands;
mod stack;

pub use batch::BatchCommand;
pub use commands::{
    AddConnectionCommand, AddDeviceCommand, MoveDeviceCommand, RemoveConnectionCommand,
    RemoveDeviceCommand, UpdateDeviceCommand,
};
pub use stack::{CommandHistory, HistoryEntry, HistorySnapshot};

use crate::clock::now_millis;
use crate::error::EditorResult;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

/// Boxed future for command steps.
///
/// Not `Send`: the editor runs on a single thread.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Unique identifier for commands.
pub type CommandId = Uuid;

/// What a command does, for history panels and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    AddDevice,
    RemoveDevice,
    UpdateDevice,
    AddConnection,
    RemoveConnection,
    Batch,
    Custom,
}

/// Identity shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMeta {
    pub id: CommandId,
    pub description: String,
    /// Milliseconds since the Unix epoch at construction.
    pub timestamp: u64,
}

impl CommandMeta {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            timestamp: now_millis(),
        }
    }
}

/// A reversible edit.
pub trait Command {
    fn meta(&self) -> &CommandMeta;

    fn kind(&self) -> CommandKind;

    fn id(&self) -> CommandId {
        self.meta().id
    }

    fn description(&self) -> &str {
        &self.meta().description
    }

    fn timestamp(&self) -> u64 {
        self.meta().timestamp
    }

    /// Checked by the history before `execute` is invoked.
    fn can_execute(&self) -> bool {
        true
    }

    fn execute(&self) -> BoxFuture<'_, EditorResult<()>>;

    fn undo(&self) -> BoxFuture<'_, EditorResult<()>>;

    /// Re-apply after an undo. Defaults to `execute`.
    fn redo(&self) -> BoxFuture<'_, EditorResult<()>> {
        self.execute()
    }
}

impl std::fmt::Debug for dyn Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id())
            .field("kind", &self.kind())
            .field("description", &self.description())
            .finish()
    }
}
