//! Visual style attached to connection records.

use super::ConnectionType;
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Stroke pattern for connection lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Style properties for a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStyle {
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
    #[serde(default)]
    pub stroke_style: StrokeStyle,
}

impl ConnectionStyle {
    /// Conventional look for a medium: fiber is orange, wireless dashed,
    /// power thick red, and so on.
    pub fn for_type(kind: ConnectionType) -> Self {
        let (stroke_color, stroke_width, stroke_style) = match kind {
            ConnectionType::Ethernet => (SerializableColor::rgb(37, 99, 235), 2.0, StrokeStyle::Solid),
            ConnectionType::Fiber => (SerializableColor::rgb(234, 88, 12), 3.0, StrokeStyle::Solid),
            ConnectionType::Wireless => (SerializableColor::rgb(124, 58, 237), 2.0, StrokeStyle::Dashed),
            ConnectionType::Serial => (SerializableColor::rgb(75, 85, 99), 1.5, StrokeStyle::Dotted),
            ConnectionType::Usb => (SerializableColor::rgb(22, 163, 74), 1.5, StrokeStyle::Solid),
            ConnectionType::Power => (SerializableColor::rgb(220, 38, 38), 4.0, StrokeStyle::Solid),
        };
        Self {
            stroke_color,
            stroke_width,
            stroke_style,
        }
    }

    /// Stroke color as a peniko Color, for renderers.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }
}

impl Default for ConnectionStyle {
    fn default() -> Self {
        Self::for_type(ConnectionType::default())
    }
}
