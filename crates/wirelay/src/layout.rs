//! The layout pipeline: device placement, wire routing, canvas sizing,
//! and post-hoc validation.
//!
//! Each stage is a standalone type consuming the previous stage's output;
//! [`crate::LayoutEngine`] wires them together.

pub mod canvas;
pub mod position;
pub mod route;
pub mod validate;

use indexmap::IndexMap;
use serde::Serialize;

use wirelay_core::color::Color;
use wirelay_core::geometry::Point;
use wirelay_core::model::{Connection, Device};

/// One routed wire: the sampled curve for a single connection.
///
/// `path_points` starts at the source pin and ends at a point just short
/// of the destination pin; the final straight run to `to_pin_pos` is the
/// penetration segment that makes the curve visually terminate at the
/// pin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedWire {
    /// The connection this wire renders.
    pub connection: Connection,
    /// Sampled curve points, at least two. First point is the source pin
    /// position, last point is destination-pin-adjacent.
    pub path_points: Vec<Point>,
    /// Resolved wire color (explicit, else the role palette).
    pub color: Color,
    /// Absolute source pin position.
    pub from_pin_pos: Point,
    /// Absolute destination pin position.
    pub to_pin_pos: Point,
}

/// The immutable result of one layout call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult {
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Absolute top-left position of the board.
    pub board_position: Point,
    /// Absolute top-left position per device, in placement order.
    pub device_positions: IndexMap<String, Point>,
    /// One routed wire per resolvable connection, in connection order.
    pub routed_wires: Vec<RoutedWire>,
    /// The effective board top margin (title-aware).
    pub board_margin_top: f32,
}

impl LayoutResult {
    /// Copies the computed positions onto caller-owned devices.
    ///
    /// The engine itself never mutates its input; this shim exists for
    /// callers that rely on the legacy convention of reading positions
    /// back off their own `Device` values. Devices without a computed
    /// position (never referenced by a connection) are left untouched.
    pub fn apply_positions(&self, devices: &mut [Device]) {
        for device in devices {
            if let Some(&position) = self.device_positions.get(&device.name) {
                device.position = Some(position);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirelay_core::model::{Device, DevicePin, PinRole};

    #[test]
    fn test_apply_positions_updates_known_devices() {
        let mut devices = vec![
            Device {
                name: "led".to_string(),
                width: 40.0,
                height: 30.0,
                pins: vec![DevicePin {
                    name: "A".to_string(),
                    role: PinRole::Gpio,
                    position: Point::new(0.0, 15.0),
                }],
                position: None,
                description: None,
            },
            Device {
                name: "floating".to_string(),
                width: 40.0,
                height: 30.0,
                pins: Vec::new(),
                position: None,
                description: None,
            },
        ];

        let mut positions = IndexMap::new();
        positions.insert("led".to_string(), Point::new(300.0, 80.0));
        let result = LayoutResult {
            canvas_width: 400.0,
            canvas_height: 300.0,
            board_position: Point::new(40.0, 40.0),
            device_positions: positions,
            routed_wires: Vec::new(),
            board_margin_top: 40.0,
        };

        result.apply_positions(&mut devices);
        assert_eq!(devices[0].position, Some(Point::new(300.0, 80.0)));
        assert_eq!(devices[1].position, None);
    }
}
