use super::{BatchCommand, Command, CommandId, CommandKind};
use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::store::{Store, Subscription};
use serde::{Deserialize, Serialize};

/// Published view of the history for UI binding.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub size: usize,
    /// Index of the last applied entry; `None` when nothing is applied.
    pub cursor: Option<usize>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub is_recording: bool,
    pub is_batching: bool,
    pub undo_description: Option<String>,
    pub redo_description: Option<String>,
}

/// One row of a history panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: CommandId,
    pub kind: CommandKind,
    pub description: String,
    pub timestamp: u64,
    /// Whether the entry is at or before the cursor.
    pub applied: bool,
}

struct PendingBatch {
    description: String,
    commands: Vec<Box<dyn Command>>,
}

/// Linear undo/redo history with batching.
///
/// Entries before the cursor are applied; entries after it form the redo
/// tail, which is discarded when a new command is recorded. Operations must
/// not overlap: the caller awaits one before starting the next.
pub struct CommandHistory {
    entries: Vec<Box<dyn Command>>,
    /// Number of applied entries (cursor + 1).
    applied: usize,
    max_size: usize,
    recording: bool,
    batch: Option<PendingBatch>,
    state: Store<HistorySnapshot>,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::with_config(&EditorConfig::default())
    }
}

impl std::fmt::Debug for CommandHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHistory")
            .field("entries", &self.entries)
            .field("applied", &self.applied)
            .field("max_size", &self.max_size)
            .field("recording", &self.recording)
            .field("batching", &self.batch.is_some())
            .finish()
    }
}

impl CommandHistory {
    /// Create a history that keeps at most `max_size` entries (at least one).
    pub fn new(max_size: usize) -> Self {
        let mut history = Self {
            entries: Vec::new(),
            applied: 0,
            max_size: max_size.max(1),
            recording: true,
            batch: None,
            state: Store::new(HistorySnapshot::default()),
        };
        history.publish();
        history
    }

    pub fn with_config(config: &EditorConfig) -> Self {
        Self::new(config.max_history_size)
    }

    /// Run `command` and record it.
    ///
    /// While a batch is open the command joins the batch instead of the
    /// entry list. On failure nothing is recorded.
    pub async fn execute_command(&mut self, command: Box<dyn Command>) -> EditorResult<()> {
        if !self.recording {
            return Err(EditorError::state("history recording is disabled"));
        }
        if !command.can_execute() {
            return Err(EditorError::state(format!(
                "command '{}' cannot execute",
                command.description()
            )));
        }

        if let Err(err) = command.execute().await {
            log::warn!("Command '{}' failed: {}", command.description(), err);
            return Err(err);
        }
        log::debug!("Executed '{}'", command.description());

        match &mut self.batch {
            Some(batch) => batch.commands.push(command),
            None => self.push_entry(command),
        }
        self.publish();
        Ok(())
    }

    /// Revert the entry at the cursor and return its description.
    pub async fn undo(&mut self) -> EditorResult<String> {
        if self.batch.is_some() {
            return Err(EditorError::state("cannot undo while a batch is open"));
        }
        let Some(index) = self.applied.checked_sub(1) else {
            return Err(EditorError::state("nothing to undo"));
        };
        let entry = &self.entries[index];
        entry.undo().await?;
        let description = entry.description().to_string();

        self.applied = index;
        log::debug!("Undid '{}'", description);
        self.publish();
        Ok(description)
    }

    /// Re-apply the entry after the cursor and return its description.
    pub async fn redo(&mut self) -> EditorResult<String> {
        if self.batch.is_some() {
            return Err(EditorError::state("cannot redo while a batch is open"));
        }
        let Some(entry) = self.entries.get(self.applied) else {
            return Err(EditorError::state("nothing to redo"));
        };
        entry.redo().await?;
        let description = entry.description().to_string();

        self.applied += 1;
        log::debug!("Redid '{}'", description);
        self.publish();
        Ok(description)
    }

    /// Open a batch. Batches do not nest.
    pub fn start_batch(&mut self, description: impl Into<String>) -> EditorResult<()> {
        if self.batch.is_some() {
            return Err(EditorError::state("a batch is already open"));
        }
        self.batch = Some(PendingBatch {
            description: description.into(),
            commands: Vec::new(),
        });
        self.publish();
        Ok(())
    }

    /// Close the open batch and record it as a single entry.
    ///
    /// `description` overrides the one given to [`start_batch`]. An empty
    /// batch records nothing.
    ///
    /// [`start_batch`]: Self::start_batch
    pub fn end_batch(&mut self, description: Option<&str>) -> EditorResult<()> {
        let Some(pending) = self.batch.take() else {
            return Err(EditorError::state("no batch is open"));
        };
        if pending.commands.is_empty() {
            log::debug!("Discarding empty batch '{}'", pending.description);
        } else {
            let description = description.map_or(pending.description, str::to_string);
            let batch = BatchCommand::new(description, pending.commands);
            self.push_entry(Box::new(batch));
        }
        self.publish();
        Ok(())
    }

    /// Drop the open batch without recording it.
    ///
    /// Members already executed stay applied; use [`rollback_batch`] to
    /// revert them.
    ///
    /// [`rollback_batch`]: Self::rollback_batch
    pub fn cancel_batch(&mut self) {
        if let Some(pending) = self.batch.take() {
            log::debug!(
                "Cancelled batch '{}' with {} command(s)",
                pending.description,
                pending.commands.len()
            );
            self.publish();
        }
    }

    /// Undo the members of the open batch in reverse, then drop it.
    pub async fn rollback_batch(&mut self) -> EditorResult<()> {
        let Some(pending) = self.batch.take() else {
            return Err(EditorError::state("no batch is open"));
        };
        let mut result = Ok(());
        for command in pending.commands.iter().rev() {
            if let Err(err) = command.undo().await {
                log::error!("Rollback of '{}' failed: {}", command.description(), err);
                result = Err(err);
            }
        }
        self.publish();
        result
    }

    /// Remove every entry. An open batch is left alone.
    pub fn clear_history(&mut self) {
        self.entries.clear();
        self.applied = 0;
        self.publish();
    }

    /// While disabled, [`execute_command`](Self::execute_command) records
    /// and runs nothing.
    pub fn set_recording(&mut self, recording: bool) {
        if self.recording != recording {
            self.recording = recording;
            self.publish();
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn is_batching(&self) -> bool {
        self.batch.is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Index of the last applied entry.
    pub fn cursor(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, command)| HistoryEntry {
                id: command.id(),
                kind: command.kind(),
                description: command.description().to_string(),
                timestamp: command.timestamp(),
                applied: index < self.applied,
            })
            .collect()
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        self.state.get_current()
    }

    pub fn subscribe(&self, listener: impl Fn(&HistorySnapshot) + 'static) -> Subscription<HistorySnapshot> {
        self.state.subscribe(listener)
    }

    fn push_entry(&mut self, command: Box<dyn Command>) {
        self.entries.truncate(self.applied);
        self.entries.push(command);
        if self.entries.len() > self.max_size {
            let evicted = self.entries.remove(0);
            log::debug!("History full, dropped '{}'", evicted.description());
        }
        self.applied = self.entries.len();
    }

    fn publish(&mut self) {
        let snapshot = self.compute_snapshot();
        self.state.set(snapshot);
    }

    fn compute_snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            size: self.entries.len(),
            cursor: self.cursor(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            is_recording: self.recording,
            is_batching: self.batch.is_some(),
            undo_description: self
                .cursor()
                .map(|index| self.entries[index].description().to_string()),
            redo_description: self
                .entries
                .get(self.applied)
                .map(|c| c.description().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{BoxFuture, CommandMeta};
    use pollster::block_on;
    use std::cell::{Cell, RefCell};
    use std::future::Future;
    use std::pin::Pin;
    use std::rc::Rc;
    use std::task::{Context, Poll};

    /// Adds `amount` to a shared counter.
    struct Add {
        meta: CommandMeta,
        total: Rc<Cell<i64>>,
        amount: i64,
        allowed: bool,
        fails: bool,
    }

    impl Add {
        fn new(total: &Rc<Cell<i64>>, amount: i64) -> Self {
            Self {
                meta: CommandMeta::new(format!("add {amount}")),
                total: total.clone(),
                amount,
                allowed: true,
                fails: false,
            }
        }

        fn boxed(total: &Rc<Cell<i64>>, amount: i64) -> Box<dyn Command> {
            Box::new(Self::new(total, amount))
        }
    }

    /// Resolves after returning `Pending` once.
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    impl Command for Add {
        fn meta(&self) -> &CommandMeta {
            &self.meta
        }

        fn kind(&self) -> CommandKind {
            CommandKind::Custom
        }

        fn can_execute(&self) -> bool {
            self.allowed
        }

        fn execute(&self) -> BoxFuture<'_, EditorResult<()>> {
            Box::pin(async move {
                YieldOnce(false).await;
                if self.fails {
                    return Err(EditorError::CommandFailed("boom".into()));
                }
                self.total.set(self.total.get() + self.amount);
                Ok(())
            })
        }

        fn undo(&self) -> BoxFuture<'_, EditorResult<()>> {
            Box::pin(async move {
                self.total.set(self.total.get() - self.amount);
                Ok(())
            })
        }
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let total = Rc::new(Cell::new(0));
        let mut history = CommandHistory::new(10);
        for amount in [1, 2, 3] {
            block_on(history.execute_command(Add::boxed(&total, amount))).unwrap();
        }
        assert_eq!(total.get(), 6);
        assert_eq!(history.cursor(), Some(2));

        assert_eq!(block_on(history.undo()).unwrap(), "add 3");
        assert_eq!(block_on(history.undo()).unwrap(), "add 2");
        assert_eq!(block_on(history.undo()).unwrap(), "add 1");
        assert_eq!(total.get(), 0);
        assert_eq!(history.cursor(), None);
        assert!(!history.can_undo());
        assert!(block_on(history.undo()).is_err());

        for _ in 0..3 {
            block_on(history.redo()).unwrap();
        }
        assert_eq!(total.get(), 6);
        assert!(!history.can_redo());
        assert_eq!(
            block_on(history.redo()).unwrap_err().kind(),
            crate::error::ErrorKind::State
        );
    }

    #[test]
    fn test_new_command_truncates_redo_tail() {
        let total = Rc::new(Cell::new(0));
        let mut history = CommandHistory::new(10);
        block_on(history.execute_command(Add::boxed(&total, 1))).unwrap();
        block_on(history.execute_command(Add::boxed(&total, 2))).unwrap();
        block_on(history.undo()).unwrap();
        assert!(history.can_redo());

        block_on(history.execute_command(Add::boxed(&total, 10))).unwrap();
        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        let descriptions: Vec<_> = history.entries().into_iter().map(|e| e.description).collect();
        assert_eq!(descriptions, ["add 1", "add 10"]);
        assert_eq!(total.get(), 11);
    }

    #[test]
    fn test_history_cap_drops_oldest() {
        let total = Rc::new(Cell::new(0));
        let mut history = CommandHistory::new(3);
        for amount in 1..=5 {
            block_on(history.execute_command(Add::boxed(&total, amount))).unwrap();
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), Some(2));
        assert_eq!(history.entries()[0].description, "add 3");

        for _ in 0..3 {
            block_on(history.undo()).unwrap();
        }
        assert!(!history.can_undo());
        // 1 and 2 fell off the front and stay applied
        assert_eq!(total.get(), 3);
    }

    #[test]
    fn test_recording_disabled_is_rejected() {
        let total = Rc::new(Cell::new(0));
        let mut history = CommandHistory::new(10);
        history.set_recording(false);
        assert!(!history.snapshot().is_recording);

        let err = block_on(history.execute_command(Add::boxed(&total, 1))).unwrap_err();
        assert!(matches!(err, EditorError::InvalidState(_)));
        assert_eq!(total.get(), 0);
        assert!(history.is_empty());
    }

    #[test]
    fn test_cannot_execute_skips_execute() {
        let total = Rc::new(Cell::new(0));
        let mut history = CommandHistory::new(10);
        let mut command = Add::new(&total, 5);
        command.allowed = false;

        assert!(block_on(history.execute_command(Box::new(command))).is_err());
        assert_eq!(total.get(), 0);
        assert!(history.is_empty());
    }

    #[test]
    fn test_failed_command_is_not_recorded() {
        let total = Rc::new(Cell::new(0));
        let mut history = CommandHistory::new(10);
        let mut command = Add::new(&total, 5);
        command.fails = true;

        let err = block_on(history.execute_command(Box::new(command))).unwrap_err();
        assert_eq!(err, EditorError::CommandFailed("boom".into()));
        assert!(history.is_empty());
        assert_eq!(history.cursor(), None);
    }

    #[test]
    fn test_batch_records_one_entry() {
        let total = Rc::new(Cell::new(0));
        let mut history = CommandHistory::new(10);
        history.start_batch("sum").unwrap();
        assert!(history.is_batching());
        assert!(history.start_batch("nested").is_err());

        for amount in [1, 2, 3] {
            block_on(history.execute_command(Add::boxed(&total, amount))).unwrap();
        }
        assert!(history.is_empty());
        assert!(block_on(history.undo()).is_err());

        history.end_batch(Some("add six")).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.entries()[0].kind, CommandKind::Batch);
        assert_eq!(total.get(), 6);

        assert_eq!(block_on(history.undo()).unwrap(), "add six");
        assert_eq!(total.get(), 0);
        block_on(history.redo()).unwrap();
        assert_eq!(total.get(), 6);
    }

    #[test]
    fn test_end_batch_without_batch() {
        let mut history = CommandHistory::default();
        assert!(history.end_batch(None).is_err());

        history.start_batch("nothing").unwrap();
        history.end_batch(None).unwrap();
        assert!(history.is_empty());
        assert!(!history.is_batching());
    }

    #[test]
    fn test_cancel_and_rollback_batch() {
        let total = Rc::new(Cell::new(0));
        let mut history = CommandHistory::new(10);

        history.start_batch("kept").unwrap();
        block_on(history.execute_command(Add::boxed(&total, 1))).unwrap();
        history.cancel_batch();
        assert!(history.is_empty());
        assert_eq!(total.get(), 1);

        history.start_batch("reverted").unwrap();
        block_on(history.execute_command(Add::boxed(&total, 2))).unwrap();
        block_on(history.execute_command(Add::boxed(&total, 3))).unwrap();
        block_on(history.rollback_batch()).unwrap();
        assert_eq!(total.get(), 1);
        assert!(history.is_empty());
        assert!(!history.is_batching());
    }

    #[test]
    fn test_clear_history() {
        let total = Rc::new(Cell::new(0));
        let mut history = CommandHistory::new(10);
        block_on(history.execute_command(Add::boxed(&total, 1))).unwrap();
        history.clear_history();
        assert!(history.is_empty());
        assert_eq!(history.cursor(), None);
        assert_eq!(total.get(), 1);
    }

    #[test]
    fn test_snapshot_published_to_subscribers() {
        let total = Rc::new(Cell::new(0));
        let mut history = CommandHistory::new(10);
        let seen: Rc<RefCell<Vec<HistorySnapshot>>> = Rc::default();
        let sink = seen.clone();
        let _sub = history.subscribe(move |s| sink.borrow_mut().push(s.clone()));

        block_on(history.execute_command(Add::boxed(&total, 4))).unwrap();
        let snapshot = history.snapshot();
        assert_eq!(snapshot.size, 1);
        assert_eq!(snapshot.cursor, Some(0));
        assert!(snapshot.can_undo);
        assert!(!snapshot.can_redo);
        assert_eq!(snapshot.undo_description.as_deref(), Some("add 4"));

        block_on(history.undo()).unwrap();
        let snapshot = history.snapshot();
        assert_eq!(snapshot.redo_description.as_deref(), Some("add 4"));
        assert_eq!(snapshot.undo_description, None);
        assert_eq!(seen.borrow().len(), 2);
    }
}
