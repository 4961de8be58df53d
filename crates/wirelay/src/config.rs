//! Engine configuration.
//!
//! All tunables of the layout pipeline live here as plain in-memory values
//! with sensible defaults. An outer collaborator may deserialize this from
//! whatever format it manages; the engine never touches files or formats
//! itself.

use serde::{Deserialize, Serialize};

/// Tunables for the layout pipeline.
///
/// Construct with [`LayoutConfig::default`] and adjust through the
/// `with_*` builder methods:
///
/// ```rust
/// use wirelay::config::LayoutConfig;
///
/// let config = LayoutConfig::default()
///     .with_tier_spacing(80.0)
///     .with_min_device_spacing(24.0);
/// assert_eq!(config.tier_spacing, 80.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Board left margin (board X position).
    pub margin_left: f32,
    /// Board top margin without a title.
    pub margin_top: f32,
    /// Height reserved for the title text when shown.
    pub title_height: f32,
    /// Gap between the title and the board.
    pub title_gap: f32,
    /// Required clearance between the title and the nearest device or wire.
    pub title_clearance: f32,

    /// Distance from the board's right edge to tier 0. Leaves room for the
    /// routing rails.
    pub device_left_offset: f32,
    /// Horizontal gap between consecutive tiers.
    pub tier_spacing: f32,
    /// Minimum vertical gap between devices in one tier.
    pub min_device_spacing: f32,
    /// How far above the topmost connected board pin devices may start.
    pub pin_allowance: f32,
    /// Extra band height granted below the stack on horizontal dual-header
    /// boards.
    pub dual_header_extra: f32,

    /// Base spacing between parallel wires.
    pub wire_spacing: f32,
    /// Gap between the board's right edge and the first rail.
    pub rail_offset: f32,
    /// Window within which wire origins are considered vertically grouped.
    pub group_tolerance: f32,
    /// Vertical fan-out step between wires of one origin group.
    pub fan_spacing: f32,
    /// Minimum desired distance between any two wire samples.
    pub min_wire_separation: f32,
    /// Cap on the cumulative vertical offset conflict resolution may apply
    /// to a single wire.
    pub max_conflict_offset: f32,

    /// Uniform padding around the diagram extent.
    pub canvas_padding: f32,
    pub min_canvas_width: f32,
    pub min_canvas_height: f32,
    pub max_canvas_width: f32,
    pub max_canvas_height: f32,
    /// Legend header row height.
    pub legend_header_height: f32,
    /// Height of one legend device row.
    pub legend_row_height: f32,

    /// Hard cap on device count; exceeding it aborts the call.
    pub max_devices: usize,
    /// Hard cap on connection count; exceeding it aborts the call.
    pub max_connections: usize,
    /// Soft device count threshold; exceeding it only logs.
    pub warn_devices: usize,
    /// Soft connection count threshold; exceeding it only logs.
    pub warn_connections: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin_left: 40.0,
            margin_top: 40.0,
            title_height: 30.0,
            title_gap: 12.0,
            title_clearance: 8.0,

            device_left_offset: 140.0,
            tier_spacing: 60.0,
            min_device_spacing: 20.0,
            pin_allowance: 20.0,
            dual_header_extra: 40.0,

            wire_spacing: 6.0,
            rail_offset: 30.0,
            group_tolerance: 12.0,
            fan_spacing: 8.0,
            min_wire_separation: 4.0,
            max_conflict_offset: 24.0,

            canvas_padding: 30.0,
            min_canvas_width: 400.0,
            min_canvas_height: 300.0,
            max_canvas_width: 4000.0,
            max_canvas_height: 3000.0,
            legend_header_height: 24.0,
            legend_row_height: 18.0,

            max_devices: 50,
            max_connections: 200,
            warn_devices: 25,
            warn_connections: 100,
        }
    }
}

impl LayoutConfig {
    /// Set the horizontal gap between tiers
    pub fn with_tier_spacing(mut self, spacing: f32) -> Self {
        self.tier_spacing = spacing;
        self
    }

    /// Set the minimum vertical gap between devices in a tier
    pub fn with_min_device_spacing(mut self, spacing: f32) -> Self {
        self.min_device_spacing = spacing;
        self
    }

    /// Set the base spacing between parallel wires
    pub fn with_wire_spacing(mut self, spacing: f32) -> Self {
        self.wire_spacing = spacing;
        self
    }

    /// Set the uniform padding around the diagram extent
    pub fn with_canvas_padding(mut self, padding: f32) -> Self {
        self.canvas_padding = padding;
        self
    }

    /// Set the canvas width clamp range
    pub fn with_canvas_width_bounds(mut self, min: f32, max: f32) -> Self {
        self.min_canvas_width = min;
        self.max_canvas_width = max;
        self
    }

    /// Set the canvas height clamp range
    pub fn with_canvas_height_bounds(mut self, min: f32, max: f32) -> Self {
        self.min_canvas_height = min;
        self.max_canvas_height = max;
        self
    }

    /// Set the hard complexity caps
    pub fn with_hard_limits(mut self, max_devices: usize, max_connections: usize) -> Self {
        self.max_devices = max_devices;
        self.max_connections = max_connections;
        self
    }

    /// Set the soft complexity thresholds that only log
    pub fn with_warn_limits(mut self, warn_devices: usize, warn_connections: usize) -> Self {
        self.warn_devices = warn_devices;
        self.warn_connections = warn_connections;
        self
    }

    /// The board's top margin, accounting for a shown title.
    pub fn board_margin_top(&self, show_title: bool) -> f32 {
        if show_title {
            self.margin_top + self.title_height + self.title_gap
        } else {
            self.margin_top
        }
    }

    /// The y-coordinate where the title text ends, when shown.
    pub fn title_bottom(&self) -> f32 {
        self.margin_top + self.title_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let config = LayoutConfig::default()
            .with_tier_spacing(100.0)
            .with_hard_limits(10, 20);
        assert_eq!(config.tier_spacing, 100.0);
        assert_eq!(config.max_devices, 10);
        assert_eq!(config.max_connections, 20);
    }

    #[test]
    fn test_board_margin_top_reserves_title_space() {
        let config = LayoutConfig::default();
        assert_eq!(config.board_margin_top(false), config.margin_top);
        assert_eq!(
            config.board_margin_top(true),
            config.margin_top + config.title_height + config.title_gap
        );
    }
}
