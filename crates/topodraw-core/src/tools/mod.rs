//! Tools, interaction modes and the cursor each one implies.

use serde::{Deserialize, Serialize};

/// How pointer input on the canvas is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    #[default]
    Select,
    Pan,
    Connect,
    Annotate,
}

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Connection,
    Text,
    /// Placing devices from the template library.
    Device,
}

impl ToolKind {
    /// The interaction mode a tool puts the canvas in.
    pub fn mode(self) -> InteractionMode {
        match self {
            ToolKind::Select | ToolKind::Device => InteractionMode::Select,
            ToolKind::Pan => InteractionMode::Pan,
            ToolKind::Connection => InteractionMode::Connect,
            ToolKind::Text => InteractionMode::Annotate,
        }
    }
}

/// Abstract pointer affordance shown over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    #[default]
    Default,
    Grab,
    Grabbing,
    Crosshair,
    Text,
}

impl Cursor {
    /// CSS cursor keyword for web hosts.
    pub fn css_name(self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
            Cursor::Crosshair => "crosshair",
            Cursor::Text => "text",
        }
    }
}

/// Cursor for an interaction mode.
pub fn cursor_for(mode: InteractionMode) -> Cursor {
    match mode {
        InteractionMode::Select => Cursor::Default,
        InteractionMode::Pan => Cursor::Grab,
        InteractionMode::Connect => Cursor::Crosshair,
        InteractionMode::Annotate => Cursor::Text,
    }
}
