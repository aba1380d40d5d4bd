use super::{BoxFuture, Command, CommandKind, CommandMeta};
use crate::error::EditorResult;

/// Several commands recorded as one history entry.
///
/// `execute` and `redo` run the members in their original order; `undo`
/// runs them in reverse. When a member fails, the members already handled
/// in that pass are reverted and the member's error is returned.
#[derive(Debug)]
pub struct BatchCommand {
    meta: CommandMeta,
    commands: Vec<Box<dyn Command>>,
}

impl BatchCommand {
    pub fn new(description: impl Into<String>, commands: Vec<Box<dyn Command>>) -> Self {
        Self {
            meta: CommandMeta::new(description),
            commands,
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Box<dyn Command>] {
        &self.commands
    }

    async fn forward(&self, first_run: bool) -> EditorResult<()> {
        for (index, command) in self.commands.iter().enumerate() {
            let result = if first_run {
                command.execute().await
            } else {
                command.redo().await
            };
            if let Err(err) = result {
                log::warn!(
                    "Batch '{}' failed at '{}': {}",
                    self.description(),
                    command.description(),
                    err
                );
                for applied in self.commands[..index].iter().rev() {
                    if let Err(rollback) = applied.undo().await {
                        log::error!("Rollback of '{}' failed: {}", applied.description(), rollback);
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    async fn backward(&self) -> EditorResult<()> {
        for (index, command) in self.commands.iter().enumerate().rev() {
            if let Err(err) = command.undo().await {
                log::warn!(
                    "Undo of batch '{}' failed at '{}': {}",
                    self.description(),
                    command.description(),
                    err
                );
                for reverted in &self.commands[index + 1..] {
                    if let Err(rollback) = reverted.redo().await {
                        log::error!("Rollback of '{}' failed: {}", reverted.description(), rollback);
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

impl Command for BatchCommand {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn kind(&self) -> CommandKind {
        CommandKind::Batch
    }

    fn can_execute(&self) -> bool {
        self.commands.iter().all(|c| c.can_execute())
    }

    fn execute(&self) -> BoxFuture<'_, EditorResult<()>> {
        Box::pin(self.forward(true))
    }

    fn undo(&self) -> BoxFuture<'_, EditorResult<()>> {
        Box::pin(self.backward())
    }

    fn redo(&self) -> BoxFuture<'_, EditorResult<()>> {
        Box::pin(self.forward(false))
    }
}
