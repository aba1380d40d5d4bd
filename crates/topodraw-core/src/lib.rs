//! TopoDraw Core Library
//!
//! Interaction and command engine for the TopoDraw network topology editor:
//! viewport zoom and pan, interactive connection drawing between devices,
//! and undo/redo history. Rendering and persistence live elsewhere.

pub mod clock;
pub mod config;
pub mod connection;
pub mod device;
pub mod error;
pub mod history;
pub mod project;
pub mod shortcuts;
pub mod store;
pub mod tools;
pub mod viewport;

pub use config::EditorConfig;
pub use connection::{
    Connection, ConnectionAnalytics, ConnectionDrawingEngine, ConnectionId, ConnectionRequest,
    ConnectionType, DrawingMode, DrawingSession, SnapSettings,
};
pub use device::{Device, DeviceId, DeviceKind, DeviceRef};
pub use error::{EditorError, EditorResult, ErrorKind};
pub use history::{BatchCommand, Command, CommandHistory, CommandKind, HistorySnapshot};
pub use project::{DeviceRegistry, InMemoryProject, ProjectMutator};
pub use shortcuts::{EditorAction, Shortcut, ShortcutRegistry};
pub use store::{Store, Subscription};
pub use tools::{Cursor, InteractionMode, ToolKind, cursor_for};
pub use viewport::{PanConstraints, ViewportState, ViewportStateMachine, ZoomConstraints};
