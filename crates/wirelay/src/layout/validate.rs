//! Post-hoc layout validation.
//!
//! Everything here is advisory: findings come back as human-readable
//! strings and are never promoted to errors. The checks run over a
//! finished [`LayoutResult`], so callers can re-validate a stored layout
//! without recomputing it.

use wirelay_core::geometry::Bounds;
use wirelay_core::model::Diagram;

use crate::config::LayoutConfig;
use crate::layout::LayoutResult;

/// Check a finished layout for overlap, out-of-bounds placement, and
/// title clearance problems.
pub fn validate_layout(
    diagram: &Diagram,
    config: &LayoutConfig,
    result: &LayoutResult,
) -> Vec<String> {
    let mut findings = Vec::new();

    let rects: Vec<(&str, Bounds)> = result
        .device_positions
        .iter()
        .filter_map(|(name, &position)| {
            diagram
                .device(name)
                .map(|device| (name.as_str(), Bounds::from_origin_size(position, device.size())))
        })
        .collect();

    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            if rects[i].1.overlaps(rects[j].1) {
                findings.push(format!(
                    "devices '{}' and '{}' overlap",
                    rects[i].0, rects[j].0
                ));
            }
        }
    }

    for (name, bounds) in &rects {
        if bounds.min_x() < 0.0
            || bounds.min_y() < 0.0
            || bounds.max_x() > result.canvas_width
            || bounds.max_y() > result.canvas_height
        {
            findings.push(format!("device '{name}' extends outside the canvas"));
        }
    }

    if diagram.show_title {
        let topmost_sample = result
            .routed_wires
            .iter()
            .flat_map(|wire| wire.path_points.iter())
            .map(|point| point.y())
            .min_by(|a, b| a.total_cmp(b));
        if let Some(topmost) = topmost_sample {
            let required = config.title_bottom() + config.title_clearance;
            if topmost < required {
                findings.push(format!(
                    "wires encroach on the title area (topmost wire sample at y={topmost:.1}, \
                     clearance requires y>={required:.1})"
                ));
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use wirelay_core::color::Color;
    use wirelay_core::geometry::Point;
    use wirelay_core::model::{Board, Connection, ConnectionSource, Device};

    use crate::layout::RoutedWire;

    use super::*;

    fn diagram(devices: Vec<Device>, show_title: bool) -> Diagram {
        Diagram {
            board: Board {
                name: "testboard".to_string(),
                width: 100.0,
                height: 150.0,
                pins: Vec::new(),
                layout_kind: None,
            },
            devices,
            connections: Vec::new(),
            show_title,
            show_legend: false,
        }
    }

    fn device(name: &str) -> Device {
        Device {
            name: name.to_string(),
            width: 60.0,
            height: 40.0,
            pins: Vec::new(),
            position: None,
            description: None,
        }
    }

    fn result(positions: IndexMap<String, Point>, wires: Vec<RoutedWire>) -> LayoutResult {
        LayoutResult {
            canvas_width: 600.0,
            canvas_height: 400.0,
            board_position: Point::new(40.0, 40.0),
            device_positions: positions,
            routed_wires: wires,
            board_margin_top: 40.0,
        }
    }

    #[test]
    fn test_clean_layout_has_no_findings() {
        let diagram = diagram(vec![device("a"), device("b")], false);
        let mut positions = IndexMap::new();
        positions.insert("a".to_string(), Point::new(200.0, 50.0));
        positions.insert("b".to_string(), Point::new(200.0, 120.0));
        let findings = validate_layout(&diagram, &LayoutConfig::default(), &result(positions, Vec::new()));
        assert!(findings.is_empty(), "unexpected findings: {findings:?}");
    }

    #[test]
    fn test_overlapping_devices_are_flagged() {
        let diagram = diagram(vec![device("a"), device("b")], false);
        let mut positions = IndexMap::new();
        positions.insert("a".to_string(), Point::new(200.0, 50.0));
        positions.insert("b".to_string(), Point::new(220.0, 60.0));
        let findings = validate_layout(&diagram, &LayoutConfig::default(), &result(positions, Vec::new()));
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("overlap"));
        assert!(findings[0].contains("'a'"));
        assert!(findings[0].contains("'b'"));
    }

    #[test]
    fn test_out_of_canvas_device_is_flagged() {
        let diagram = diagram(vec![device("a")], false);
        let mut positions = IndexMap::new();
        positions.insert("a".to_string(), Point::new(580.0, 50.0));
        let findings = validate_layout(&diagram, &LayoutConfig::default(), &result(positions, Vec::new()));
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("outside the canvas"));
    }

    #[test]
    fn test_wire_in_title_area_is_flagged() {
        let diagram = diagram(Vec::new(), true);
        let config = LayoutConfig::default();
        let wire = RoutedWire {
            connection: Connection {
                source: ConnectionSource::Board { pin: 1 },
                device: "a".to_string(),
                device_pin: "IN".to_string(),
                color: None,
                style: None,
            },
            path_points: vec![Point::new(100.0, 10.0), Point::new(200.0, 10.0)],
            color: Color::default(),
            from_pin_pos: Point::new(100.0, 10.0),
            to_pin_pos: Point::new(210.0, 10.0),
        };
        let findings = validate_layout(&diagram, &config, &result(IndexMap::new(), vec![wire]));
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("title"));
    }

    #[test]
    fn test_no_title_means_no_clearance_check() {
        let diagram = diagram(Vec::new(), false);
        let wire = RoutedWire {
            connection: Connection {
                source: ConnectionSource::Board { pin: 1 },
                device: "a".to_string(),
                device_pin: "IN".to_string(),
                color: None,
                style: None,
            },
            path_points: vec![Point::new(100.0, 2.0), Point::new(200.0, 2.0)],
            color: Color::default(),
            from_pin_pos: Point::new(100.0, 2.0),
            to_pin_pos: Point::new(210.0, 2.0),
        };
        let findings =
            validate_layout(&diagram, &LayoutConfig::default(), &result(IndexMap::new(), vec![wire]));
        assert!(findings.is_empty());
    }
}
