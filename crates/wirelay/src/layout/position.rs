//! Device placement.
//!
//! Devices are arranged in vertical tiers to the right of the board, one
//! tier per connection-graph level. Horizontal placement is fully
//! determined by the tiers; vertical placement is a soft-constraint pass
//! that pulls each device toward the centroid of what it is wired to,
//! then resolves overlap with a running cursor or, when a tier cannot
//! fit its band, an even redistribution.

use std::cmp::Ordering;

use indexmap::IndexMap;
use log::debug;

use wirelay_core::geometry::Point;
use wirelay_core::model::{Board, BoardLayout, Connection, ConnectionSource, Device, Diagram};

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::graph::ConnectionGraph;

/// Assigns every connected device an absolute top-left position.
pub struct DevicePositioner<'a> {
    config: &'a LayoutConfig,
    board: &'a Board,
    board_position: Point,
}

impl<'a> DevicePositioner<'a> {
    pub fn new(config: &'a LayoutConfig, board: &'a Board, board_position: Point) -> Self {
        Self {
            config,
            board,
            board_position,
        }
    }

    /// Position every device that appears in the connection graph.
    ///
    /// Devices referenced by connections but missing from the diagram's
    /// device list get no position; the router later drops their wires
    /// under the same leniency policy.
    ///
    /// # Errors
    ///
    /// Propagates [`LayoutError::Cyclic`] from the level calculation.
    pub fn position_devices(
        &self,
        diagram: &Diagram,
        graph: &ConnectionGraph,
    ) -> Result<IndexMap<String, Point>, LayoutError> {
        let levels = graph.device_levels()?;
        let mut positions = IndexMap::new();

        let Some(&max_level) = levels.values().max() else {
            return Ok(positions);
        };

        let mut tiers: Vec<Vec<&Device>> = vec![Vec::new(); max_level + 1];
        for (name, &level) in &levels {
            if let Some(device) = diagram.device(name) {
                tiers[level].push(device);
            }
        }

        let tier_xs = self.tier_x_positions(&tiers);
        let min_device_y = self.min_device_y(diagram);

        for (tier_index, tier) in tiers.iter().enumerate() {
            if tier.is_empty() {
                continue;
            }
            self.place_tier(
                tier,
                tier_xs[tier_index],
                min_device_y,
                diagram,
                &mut positions,
            );
        }

        debug!(
            tiers = tiers.len(),
            positioned = positions.len();
            "Positioned devices"
        );
        Ok(positions)
    }

    /// X-coordinate where each tier starts. Tier 0 sits a configured
    /// offset right of the board; every following tier starts after the
    /// widest device of the previous one. Empty tiers still advance the
    /// cursor by the tier spacing.
    fn tier_x_positions(&self, tiers: &[Vec<&Device>]) -> Vec<f32> {
        let mut xs = Vec::with_capacity(tiers.len());
        let mut x =
            self.board_position.x() + self.board.width + self.config.device_left_offset;
        for tier in tiers {
            xs.push(x);
            let max_width = tier.iter().map(|device| device.width).fold(0.0, f32::max);
            x += max_width + self.config.tier_spacing;
        }
        xs
    }

    /// The upper edge of the placement band.
    ///
    /// Devices may rise up to a fixed allowance above the topmost board
    /// pin that any connection touches, but never above the board's top
    /// edge; a shown title additionally pushes the band below its
    /// clearance zone.
    fn min_device_y(&self, diagram: &Diagram) -> f32 {
        let topmost_pin_y = diagram
            .connections
            .iter()
            .filter_map(|connection| match &connection.source {
                ConnectionSource::Board { pin } => self
                    .board
                    .pin(*pin)
                    .map(|pin| self.board_position.y() + pin.position.y()),
                ConnectionSource::Device { .. } => None,
            })
            .min_by(|a, b| a.total_cmp(b));

        let mut min_y = match topmost_pin_y {
            Some(pin_y) => (pin_y - self.config.pin_allowance).max(self.board_position.y()),
            None => self.board_position.y(),
        };
        if diagram.show_title {
            min_y = min_y.max(self.config.title_bottom() + self.config.title_clearance);
        }
        min_y
    }

    fn place_tier(
        &self,
        tier: &[&Device],
        tier_x: f32,
        min_device_y: f32,
        diagram: &Diagram,
        positions: &mut IndexMap<String, Point>,
    ) {
        let spacing = self.config.min_device_spacing;

        // Sort by target centroid, ties broken by tier insertion order so
        // equal targets stay deterministic.
        let mut order: Vec<(usize, f32)> = tier
            .iter()
            .enumerate()
            .map(|(index, device)| (index, self.target_center_y(device, diagram, positions)))
            .collect();
        order.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let total_height: f32 = tier.iter().map(|device| device.height).sum();
        let required = total_height + spacing * (tier.len() - 1) as f32;
        let max_device_y = match self.board.layout_kind() {
            // A vertical header keeps the stack within the board's own
            // height where possible.
            BoardLayout::VerticalSingle => self.board_position.y() + self.board.height,
            // A dual-header board has no natural bottom edge to respect;
            // the band is the stack itself plus a fixed slack.
            BoardLayout::HorizontalDual => {
                min_device_y + required + self.config.dual_header_extra
            }
        };
        let band = max_device_y - min_device_y;

        if required <= band {
            // The stack fits: honor each target as far as the no-overlap
            // cursor allows.
            let mut cursor = min_device_y;
            for &(index, target) in &order {
                let device = tier[index];
                let y = cursor.max(target - device.height / 2.0);
                positions.insert(device.name.clone(), Point::new(tier_x, y));
                cursor = y + device.height + spacing;
            }
        } else if tier.len() == 1 {
            let device = tier[0];
            let y = min_device_y + (band - device.height) / 2.0;
            positions.insert(device.name.clone(), Point::new(tier_x, y));
        } else {
            // Over-full tier: give up on targets and spread evenly,
            // falling back to the minimum spacing (and past the band)
            // when even that does not fit.
            let gap = ((band - total_height) / (tier.len() - 1) as f32).max(spacing);
            let mut cursor = min_device_y;
            for &(index, _) in &order {
                let device = tier[index];
                positions.insert(device.name.clone(), Point::new(tier_x, cursor));
                cursor += device.height + gap;
            }
        }
    }

    /// The y-coordinate this device would ideally be centered on: the
    /// centroid of its connected board pins and the centers of its
    /// already-placed upstream devices. Falls back to the board's
    /// vertical midpoint when nothing resolves.
    fn target_center_y(
        &self,
        device: &Device,
        diagram: &Diagram,
        positions: &IndexMap<String, Point>,
    ) -> f32 {
        let mut anchor_ys = Vec::new();
        for connection in incoming_connections(diagram, &device.name) {
            match &connection.source {
                ConnectionSource::Board { pin } => {
                    if let Some(pin) = self.board.pin(*pin) {
                        anchor_ys.push(self.board_position.y() + pin.position.y());
                    }
                }
                ConnectionSource::Device { device: source, .. } => {
                    if let (Some(upstream), Some(position)) =
                        (diagram.device(source), positions.get(source))
                    {
                        anchor_ys.push(position.y() + upstream.height / 2.0);
                    }
                }
            }
        }

        if anchor_ys.is_empty() {
            self.board_position.y() + self.board.height / 2.0
        } else {
            anchor_ys.iter().sum::<f32>() / anchor_ys.len() as f32
        }
    }
}

fn incoming_connections<'d>(
    diagram: &'d Diagram,
    device_name: &'d str,
) -> impl Iterator<Item = &'d Connection> {
    diagram
        .connections
        .iter()
        .filter(move |connection| connection.device == device_name)
}
