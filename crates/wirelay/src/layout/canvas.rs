//! Canvas sizing.
//!
//! The canvas must cover the board, every placed device, and every wire
//! sample, with uniform padding; an optional device-specifications legend
//! extends the height below the lowest element. The final size is clamped
//! to the configured range — clamping is advisory, the renderer decides
//! whether clipping matters.

use indexmap::IndexMap;
use log::warn;

use wirelay_core::geometry::{Bounds, Point};
use wirelay_core::model::Diagram;

use crate::config::LayoutConfig;
use crate::layout::RoutedWire;

/// Computes the final canvas extent for a positioned, routed diagram.
pub struct CanvasSizer<'a> {
    config: &'a LayoutConfig,
}

impl<'a> CanvasSizer<'a> {
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self { config }
    }

    /// The clamped (width, height) of the canvas.
    pub fn size_canvas(
        &self,
        diagram: &Diagram,
        board_position: Point,
        positions: &IndexMap<String, Point>,
        wires: &[RoutedWire],
    ) -> (f32, f32) {
        let mut extent = Bounds::from_origin_size(board_position, diagram.board.size());

        for (name, &position) in positions {
            if let Some(device) = diagram.device(name) {
                extent = extent.merge(Bounds::from_origin_size(position, device.size()));
            }
        }
        for wire in wires {
            for &point in &wire.path_points {
                extent = extent.expand_to(point);
            }
            extent = extent.expand_to(wire.to_pin_pos);
        }

        let padding = self.config.canvas_padding;
        let width = extent.max_x() + padding;
        let mut height = extent.max_y() + padding;

        if diagram.show_legend {
            let rows = diagram
                .devices
                .iter()
                .filter(|device| device.description.is_some())
                .count();
            if rows > 0 {
                height += self.config.legend_header_height
                    + rows as f32 * self.config.legend_row_height
                    + padding;
            }
        }

        let clamped_width = width.clamp(self.config.min_canvas_width, self.config.max_canvas_width);
        let clamped_height =
            height.clamp(self.config.min_canvas_height, self.config.max_canvas_height);
        if clamped_width != width {
            warn!(
                requested = width,
                clamped = clamped_width;
                "Canvas width clamped to configured bounds"
            );
        }
        if clamped_height != height {
            warn!(
                requested = height,
                clamped = clamped_height;
                "Canvas height clamped to configured bounds"
            );
        }

        (clamped_width, clamped_height)
    }
}

#[cfg(test)]
mod tests {
    use wirelay_core::model::{Board, Device};

    use super::*;

    fn small_board() -> Board {
        Board {
            name: "testboard".to_string(),
            width: 100.0,
            height: 150.0,
            pins: Vec::new(),
            layout_kind: None,
        }
    }

    fn device(name: &str, description: Option<&str>) -> Device {
        Device {
            name: name.to_string(),
            width: 60.0,
            height: 40.0,
            pins: Vec::new(),
            position: None,
            description: description.map(str::to_string),
        }
    }

    fn bare_diagram(devices: Vec<Device>, show_legend: bool) -> Diagram {
        Diagram {
            board: small_board(),
            devices,
            connections: Vec::new(),
            show_title: false,
            show_legend,
        }
    }

    #[test]
    fn test_small_diagram_clamps_to_minimum() {
        let config = LayoutConfig::default();
        let diagram = bare_diagram(Vec::new(), false);
        let (width, height) = CanvasSizer::new(&config).size_canvas(
            &diagram,
            Point::new(40.0, 40.0),
            &IndexMap::new(),
            &[],
        );
        // The bare board extent is far below the minimum canvas size.
        assert_eq!(width, config.min_canvas_width);
        assert_eq!(height, config.min_canvas_height);
    }

    #[test]
    fn test_devices_extend_the_canvas() {
        let config = LayoutConfig::default();
        let diagram = bare_diagram(vec![device("far", None)], false);
        let mut positions = IndexMap::new();
        positions.insert("far".to_string(), Point::new(800.0, 500.0));
        let (width, height) =
            CanvasSizer::new(&config).size_canvas(&diagram, Point::new(40.0, 40.0), &positions, &[]);
        assert_eq!(width, 800.0 + 60.0 + config.canvas_padding);
        assert_eq!(height, 500.0 + 40.0 + config.canvas_padding);
    }

    #[test]
    fn test_legend_extends_height_per_described_device() {
        let config = LayoutConfig::default();
        let devices = vec![
            device("a", Some("temperature sensor")),
            device("b", Some("status LED")),
            device("c", None),
        ];
        let mut positions = IndexMap::new();
        positions.insert("a".to_string(), Point::new(400.0, 300.0));

        let without = CanvasSizer::new(&config).size_canvas(
            &bare_diagram(devices.clone(), false),
            Point::new(40.0, 40.0),
            &positions,
            &[],
        );
        let with = CanvasSizer::new(&config).size_canvas(
            &bare_diagram(devices, true),
            Point::new(40.0, 40.0),
            &positions,
            &[],
        );

        assert_eq!(with.0, without.0);
        // Two described devices: header plus two rows plus padding.
        assert_eq!(
            with.1,
            without.1
                + config.legend_header_height
                + 2.0 * config.legend_row_height
                + config.canvas_padding
        );
    }

    #[test]
    fn test_oversized_diagram_clamps_to_maximum() {
        let config = LayoutConfig::default();
        let diagram = bare_diagram(vec![device("far", None)], false);
        let mut positions = IndexMap::new();
        positions.insert("far".to_string(), Point::new(9000.0, 7000.0));
        let (width, height) =
            CanvasSizer::new(&config).size_canvas(&diagram, Point::new(40.0, 40.0), &positions, &[]);
        assert_eq!(width, config.max_canvas_width);
        assert_eq!(height, config.max_canvas_height);
    }
}
