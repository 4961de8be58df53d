//! The diagram data model.
//!
//! Everything here arrives fully resolved from outer collaborators: the
//! board/device template registry has already turned template names into
//! concrete pin lists, and config parsing has already happened. The layout
//! engine only reads these values; the single mutable field is
//! [`Device::position`], written by the compatibility shim after layout.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::geometry::{Point, Size};

/// Electrical role of a pin, shared by board header pins and device pins.
///
/// Also keys the default wire palette ([`Color::for_role`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinRole {
    Power,
    Ground,
    Gpio,
    Analog,
    Pwm,
    I2c,
    Spi,
    Uart,
}

/// Header arrangement of a board, supplied by the board collaborator.
///
/// Only the vertical placement band depends on this: a vertical
/// single-column header keeps the device stack within the board's own
/// height where possible, a horizontal dual-header board gets a fixed
/// band derived from the stack itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardLayout {
    #[default]
    VerticalSingle,
    HorizontalDual,
}

/// One physical header pin on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderPin {
    /// Physical pin number, unique on the board and ≥ 1.
    pub number: u32,
    pub name: String,
    pub role: PinRole,
    /// Position relative to the board's top-left corner.
    pub position: Point,
}

/// The circuit board at the center of the diagram. Static data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub pins: Vec<HeaderPin>,
    /// Header arrangement marker; absent means vertical single-column.
    #[serde(default)]
    pub layout_kind: Option<BoardLayout>,
}

impl Board {
    /// Look up a header pin by its physical number.
    pub fn pin(&self, number: u32) -> Option<&HeaderPin> {
        self.pins.iter().find(|pin| pin.number == number)
    }

    /// The effective header arrangement (defaults to vertical single-column).
    pub fn layout_kind(&self) -> BoardLayout {
        self.layout_kind.unwrap_or_default()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// One pin on a peripheral device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevicePin {
    pub name: String,
    pub role: PinRole,
    /// Position relative to the device's top-left corner.
    pub position: Point,
}

/// A peripheral device wired to the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Diagram-unique name.
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub pins: Vec<DevicePin>,
    /// Absolute top-left position. The engine computes positions into its
    /// result; the engine crate's `apply_positions` shim writes this field
    /// back for callers relying on the legacy in-place convention.
    #[serde(default)]
    pub position: Option<Point>,
    /// Free-text description shown in the device-specifications legend.
    #[serde(default)]
    pub description: Option<String>,
}

impl Device {
    /// Look up a device pin by name.
    pub fn pin(&self, name: &str) -> Option<&DevicePin> {
        self.pins.iter().find(|pin| pin.name == name)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Where a connection originates. The two source forms are mutually
/// exclusive by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionSource {
    /// Sourced from a board header pin, by physical number.
    Board { pin: u32 },
    /// Sourced from a pin on another device.
    Device { device: String, pin: String },
}

/// Stroke style for a drawn wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// One wire in the diagram: a source (board pin or device pin) feeding a
/// named pin on a destination device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub source: ConnectionSource,
    /// Destination device name.
    pub device: String,
    /// Destination pin name on that device.
    pub device_pin: String,
    /// Explicit wire color; absent means the role palette decides.
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub style: Option<WireStyle>,
}

impl Connection {
    /// The source device name, for device-sourced connections.
    pub fn source_device(&self) -> Option<&str> {
        match &self.source {
            ConnectionSource::Board { .. } => None,
            ConnectionSource::Device { device, .. } => Some(device),
        }
    }

    pub fn is_board_sourced(&self) -> bool {
        matches!(self.source, ConnectionSource::Board { .. })
    }
}

/// The full layout input: one board, its peripheral devices, and the
/// wiring between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub board: Board,
    pub devices: Vec<Device>,
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub show_title: bool,
    #[serde(default)]
    pub show_legend: bool,
}

impl Diagram {
    /// Look up a device by name.
    pub fn device(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|device| device.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_board() -> Board {
        Board {
            name: "demo".to_string(),
            width: 120.0,
            height: 200.0,
            pins: vec![
                HeaderPin {
                    number: 1,
                    name: "3V3".to_string(),
                    role: PinRole::Power,
                    position: Point::new(110.0, 20.0),
                },
                HeaderPin {
                    number: 2,
                    name: "GND".to_string(),
                    role: PinRole::Ground,
                    position: Point::new(110.0, 40.0),
                },
            ],
            layout_kind: None,
        }
    }

    #[test]
    fn test_board_pin_lookup() {
        let board = sample_board();
        assert_eq!(board.pin(2).unwrap().name, "GND");
        assert!(board.pin(99).is_none());
    }

    #[test]
    fn test_board_layout_kind_defaults_to_vertical() {
        let mut board = sample_board();
        assert_eq!(board.layout_kind(), BoardLayout::VerticalSingle);
        board.layout_kind = Some(BoardLayout::HorizontalDual);
        assert_eq!(board.layout_kind(), BoardLayout::HorizontalDual);
    }

    #[test]
    fn test_device_pin_lookup() {
        let device = Device {
            name: "sensor".to_string(),
            width: 60.0,
            height: 40.0,
            pins: vec![DevicePin {
                name: "VCC".to_string(),
                role: PinRole::Power,
                position: Point::new(0.0, 10.0),
            }],
            position: None,
            description: None,
        };
        assert!(device.pin("VCC").is_some());
        assert!(device.pin("vcc").is_none());
    }

    #[test]
    fn test_connection_source_forms() {
        let board_sourced = Connection {
            source: ConnectionSource::Board { pin: 1 },
            device: "sensor".to_string(),
            device_pin: "VCC".to_string(),
            color: None,
            style: None,
        };
        assert!(board_sourced.is_board_sourced());
        assert_eq!(board_sourced.source_device(), None);

        let device_sourced = Connection {
            source: ConnectionSource::Device {
                device: "mux".to_string(),
                pin: "OUT".to_string(),
            },
            device: "sensor".to_string(),
            device_pin: "SIG".to_string(),
            color: None,
            style: None,
        };
        assert!(!device_sourced.is_board_sourced());
        assert_eq!(device_sourced.source_device(), Some("mux"));
    }
}
