//! Wire routing.
//!
//! Every connection becomes a cubic Bezier curve from its source pin to a
//! point just short of its destination pin. Board-sourced wires (and most
//! device-sourced ones) travel through a per-destination-device rail — a
//! vertical waypoint lane beyond the board's right edge — so wires to the
//! same device bundle and wires to different devices never share a lane.
//! Curves are emitted as fixed parametric samples; a two-pass greedy
//! conflict pass then pushes overlapping curves apart vertically.
//!
//! The conflict pass is a local heuristic, not a global optimum: it
//! reduces pairwise violations deterministically for moderate wire counts
//! and bounds per-wire drift with a hard clamp.

use std::cmp::Ordering;

use indexmap::IndexMap;
use log::debug;

use wirelay_core::color::Color;
use wirelay_core::geometry::{Bounds, Point};
use wirelay_core::model::{Board, Connection, ConnectionSource, Diagram};

use crate::config::LayoutConfig;
use crate::layout::RoutedWire;

/// Parametric samples emitted per cubic segment.
const SAMPLES_PER_SEGMENT: usize = 8;
/// Length of the straight run into the destination pin.
const PENETRATION_LENGTH: f32 = 10.0;
/// Endpoint Y separation below which a wire gets the shallow arc shape.
const FLAT_THRESHOLD: f32 = 14.0;
/// Rail lane step between destination devices, in wire-spacing units.
const RAIL_DEVICE_STEP: f32 = 4.0;
/// Origin-Y window for the coarse conflict pre-filter.
const CONFLICT_ORIGIN_TOLERANCE: f32 = 48.0;
/// Fraction of the vertical span at which S-curve control points sit.
const S_CURVE_PULL: f32 = 0.4;

/// A resolved connection waiting to be curved.
struct PendingWire<'a> {
    connection: &'a Connection,
    from: Point,
    to: Point,
    color: Color,
    /// Right-edge device-to-device wire that bypasses the rail system.
    direct: bool,
    /// Rail waypoint X; stays `None` for direct wires.
    rail_x: Option<f32>,
    fan_offset: f32,
    conflict_offset: f32,
}

/// A pair of wires closer than the minimum separation.
struct Conflict {
    first: usize,
    second: usize,
    /// How far below the minimum separation the pair sits.
    severity: f32,
}

/// Routes every resolvable connection of a positioned diagram.
pub struct WireRouter<'a> {
    config: &'a LayoutConfig,
    board: &'a Board,
    board_position: Point,
}

impl<'a> WireRouter<'a> {
    pub fn new(config: &'a LayoutConfig, board: &'a Board, board_position: Point) -> Self {
        Self {
            config,
            board,
            board_position,
        }
    }

    /// Compute one routed wire per connection, in connection order.
    ///
    /// Connections naming an unknown board pin, device, or device pin are
    /// dropped without error; callers relying on that leniency get one
    /// wire per resolvable connection and nothing for the rest.
    pub fn route_wires(
        &self,
        diagram: &Diagram,
        positions: &IndexMap<String, Point>,
    ) -> Vec<RoutedWire> {
        let mut wires = Vec::new();
        for connection in &diagram.connections {
            match self.resolve(connection, diagram, positions) {
                Some(wire) => wires.push(wire),
                None => debug!(
                    device = connection.device.as_str(),
                    pin = connection.device_pin.as_str();
                    "Dropping connection with unresolved endpoint"
                ),
            }
        }

        self.assign_rails(&mut wires);
        self.assign_fan_offsets(&mut wires);

        let initial_paths: Vec<Vec<Point>> = wires.iter().map(|wire| self.curve(wire)).collect();
        let conflicts = self.detect_conflicts(&wires, &initial_paths);
        debug!(
            wires = wires.len(),
            conflicts = conflicts.len();
            "Routed wires"
        );

        if conflicts.is_empty() {
            return wires
                .iter()
                .zip(initial_paths)
                .map(|(wire, path)| assemble(wire, path))
                .collect();
        }

        self.resolve_conflicts(&mut wires, conflicts);
        wires
            .iter()
            .map(|wire| assemble(wire, self.curve(wire)))
            .collect()
    }

    /// Resolve a connection's endpoints and color, or `None` when any
    /// referenced board pin, device, or device pin does not exist.
    fn resolve<'c>(
        &self,
        connection: &'c Connection,
        diagram: &Diagram,
        positions: &IndexMap<String, Point>,
    ) -> Option<PendingWire<'c>> {
        let device = diagram.device(&connection.device)?;
        let device_position = positions.get(&connection.device)?;
        let pin = device.pin(&connection.device_pin)?;
        let to = device_position.add(pin.position);

        let (from, role, direct) = match &connection.source {
            ConnectionSource::Board { pin } => {
                let header = self.board.pin(*pin)?;
                (
                    self.board_position.add(header.position),
                    header.role,
                    false,
                )
            }
            ConnectionSource::Device {
                device: source_name,
                pin: source_pin,
            } => {
                let source = diagram.device(source_name)?;
                let source_position = positions.get(source_name)?;
                let pin = source.pin(source_pin)?;
                let from = source_position.add(pin.position);
                // A right-edge pin aiming at a device further right skips
                // the rail system entirely.
                let right_edge = pin.position.x() >= source.width / 2.0;
                (from, pin.role, right_edge && to.x() > from.x())
            }
        };

        let color = connection
            .color
            .clone()
            .unwrap_or_else(|| Color::for_role(role));

        Some(PendingWire {
            connection,
            from,
            to,
            color,
            direct,
            rail_x: None,
            fan_offset: 0.0,
            conflict_offset: 0.0,
        })
    }

    /// Give each rail-bound wire its waypoint lane.
    ///
    /// Destination devices claim lanes in first-wire order, stepped apart
    /// far enough that two devices' bundles cannot collide; wires within
    /// one bundle fan out symmetrically around the device's base lane.
    fn assign_rails(&self, wires: &mut [PendingWire]) {
        let spacing = self.config.wire_spacing;
        let board_right = self.board_position.x() + self.board.width;

        let mut device_lane: IndexMap<&str, usize> = IndexMap::new();
        let mut bundle_size: IndexMap<&str, usize> = IndexMap::new();
        for wire in wires.iter() {
            let next_lane = device_lane.len();
            device_lane
                .entry(wire.connection.device.as_str())
                .or_insert(next_lane);
            if !wire.direct {
                *bundle_size
                    .entry(wire.connection.device.as_str())
                    .or_insert(0) += 1;
            }
        }

        let mut bundle_position: IndexMap<&str, usize> = IndexMap::new();
        for wire in wires.iter_mut() {
            if wire.direct {
                continue;
            }
            let name = wire.connection.device.as_str();
            let lane = device_lane[name];
            let count = bundle_size[name];
            let index = {
                let slot = bundle_position.entry(name).or_insert(0);
                let index = *slot;
                *slot += 1;
                index
            };
            let base =
                board_right + self.config.rail_offset + lane as f32 * spacing * RAIL_DEVICE_STEP;
            let sub = index as f32 * spacing - (count - 1) as f32 * spacing / 2.0;
            wire.rail_x = Some(base + sub);
        }
    }

    /// Fan out the departure segments of wires whose origins sit within
    /// one vertical tolerance window.
    fn assign_fan_offsets(&self, wires: &mut [PendingWire]) {
        let mut order: Vec<usize> = (0..wires.len()).collect();
        order.sort_by(|&a, &b| {
            wires[a]
                .from
                .y()
                .partial_cmp(&wires[b].from.y())
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });

        let fan = self.config.fan_spacing;
        let mut start = 0;
        while start < order.len() {
            let anchor_y = wires[order[start]].from.y();
            let mut end = start + 1;
            while end < order.len()
                && wires[order[end]].from.y() - anchor_y <= self.config.group_tolerance
            {
                end += 1;
            }
            let count = end - start;
            if count > 1 {
                for (position, &wire_index) in order[start..end].iter().enumerate() {
                    wires[wire_index].fan_offset =
                        position as f32 * fan - (count - 1) as f32 * fan / 2.0;
                }
            }
            start = end;
        }
    }

    /// Build the sampled curve for one wire with its current offsets.
    fn curve(&self, wire: &PendingWire) -> Vec<Point> {
        let to_adjacent = pin_approach(wire.from, wire.to);
        let offset = wire.fan_offset + wire.conflict_offset;

        let (c1, c2) = match wire.rail_x {
            // Direct device-to-device run: bow through the horizontal
            // midpoint between the two pins.
            None => {
                let mid_x = (wire.from.x() + to_adjacent.x()) / 2.0;
                (
                    Point::new(mid_x, wire.from.y() + offset),
                    Point::new(mid_x, to_adjacent.y()),
                )
            }
            Some(rail_x) => {
                let dy = to_adjacent.y() - wire.from.y();
                if dy.abs() < FLAT_THRESHOLD {
                    // Level endpoints: one shallow arc bowing through the
                    // rail lane.
                    (
                        Point::new(rail_x, wire.from.y() + offset),
                        Point::new(rail_x, to_adjacent.y() + offset),
                    )
                } else {
                    // S-curve: pull into the rail lane through 40% of the
                    // span, then release toward the destination.
                    (
                        Point::new(rail_x, wire.from.y() + S_CURVE_PULL * dy + offset),
                        Point::new(rail_x, to_adjacent.y() - S_CURVE_PULL * dy + offset),
                    )
                }
            }
        };

        sample_cubic(wire.from, c1, c2, to_adjacent)
    }

    /// Find every wire pair closer than the minimum separation.
    ///
    /// O(n²) over wires by design; the origin-Y window and the AABB
    /// overlap test discard almost all pairs before any distance work,
    /// and the sample scan stops at the first sub-threshold pair.
    fn detect_conflicts(&self, wires: &[PendingWire], paths: &[Vec<Point>]) -> Vec<Conflict> {
        let min_separation = self.config.min_wire_separation;
        let boxes: Vec<Option<Bounds>> = paths
            .iter()
            .map(|path| Bounds::from_points(path.iter().copied()))
            .collect();

        let mut conflicts = Vec::new();
        for i in 0..wires.len() {
            for j in (i + 1)..wires.len() {
                if (wires[i].from.y() - wires[j].from.y()).abs() > CONFLICT_ORIGIN_TOLERANCE {
                    continue;
                }
                let (Some(a), Some(b)) = (boxes[i], boxes[j]) else {
                    continue;
                };
                if !a.expand(min_separation).overlaps(b) {
                    continue;
                }
                if let Some(distance) =
                    first_subthreshold_distance(&paths[i], &paths[j], min_separation)
                {
                    conflicts.push(Conflict {
                        first: i,
                        second: j,
                        severity: min_separation - distance,
                    });
                }
            }
        }
        conflicts
    }

    /// Push conflicting pairs apart, worst pair first.
    ///
    /// Each pair splits its deficit: the lower-origin wire shifts up,
    /// the other down, with the cumulative per-wire offset clamped so a
    /// heavily conflicted wire cannot drift without bound.
    fn resolve_conflicts(&self, wires: &mut [PendingWire], mut conflicts: Vec<Conflict>) {
        conflicts.sort_by(|a, b| {
            b.severity
                .partial_cmp(&a.severity)
                .unwrap_or(Ordering::Equal)
                .then(a.first.cmp(&b.first))
                .then(a.second.cmp(&b.second))
        });

        let clamp = self.config.max_conflict_offset;
        for conflict in conflicts {
            let push = conflict.severity / 2.0;
            let (up, down) =
                if wires[conflict.first].from.y() <= wires[conflict.second].from.y() {
                    (conflict.first, conflict.second)
                } else {
                    (conflict.second, conflict.first)
                };
            wires[up].conflict_offset = (wires[up].conflict_offset - push).clamp(-clamp, clamp);
            wires[down].conflict_offset =
                (wires[down].conflict_offset + push).clamp(-clamp, clamp);
        }
    }
}

/// The destination-pin-adjacent point: a short horizontal step back along
/// the direction of travel, leaving a straight penetration run into the
/// pin.
fn pin_approach(from: Point, to: Point) -> Point {
    if to.x() >= from.x() {
        to.with_x(to.x() - PENETRATION_LENGTH)
    } else {
        to.with_x(to.x() + PENETRATION_LENGTH)
    }
}

/// Evaluate a cubic Bezier at a fixed parameter grid. The first sample is
/// exactly `p0`, the last exactly `p3`.
fn sample_cubic(p0: Point, c1: Point, c2: Point, p3: Point) -> Vec<Point> {
    let mut points = Vec::with_capacity(SAMPLES_PER_SEGMENT);
    for step in 0..SAMPLES_PER_SEGMENT {
        let t = step as f32 / (SAMPLES_PER_SEGMENT - 1) as f32;
        let u = 1.0 - t;
        let point = p0
            .scale(u * u * u)
            .add(c1.scale(3.0 * u * u * t))
            .add(c2.scale(3.0 * u * t * t))
            .add(p3.scale(t * t * t));
        points.push(point);
    }
    points
}

/// First sample-pair distance below `threshold`, if any. Scanning stops
/// at the first hit, in sample order, so equal inputs report equal
/// distances.
fn first_subthreshold_distance(a: &[Point], b: &[Point], threshold: f32) -> Option<f32> {
    for &p in a {
        for &q in b {
            let distance = p.distance_to(q);
            if distance < threshold {
                return Some(distance);
            }
        }
    }
    None
}

fn assemble(wire: &PendingWire, path_points: Vec<Point>) -> RoutedWire {
    RoutedWire {
        connection: wire.connection.clone(),
        path_points,
        color: wire.color.clone(),
        from_pin_pos: wire.from,
        to_pin_pos: wire.to,
    }
}
