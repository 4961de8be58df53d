//! Wirelay - multi-tier placement and wire routing for board wiring
//! diagrams.
//!
//! Given a board, its peripheral devices, and the abstract connection
//! topology between them, the engine computes a complete 2-D layout:
//! devices arranged in tiers by connection depth, and one
//! collision-avoided curved wire per connection. The computation is pure
//! and deterministic — equal inputs produce byte-identical results — and
//! everything around it (config parsing, template resolution, SVG
//! rendering, electrical validation) is an outside collaborator feeding
//! or consuming plain data.

pub mod config;
pub mod graph;
pub mod layout;

mod error;

pub use error::LayoutError;
pub use layout::{LayoutResult, RoutedWire};
pub use wirelay_core::{color, geometry, model};

use log::{debug, info, warn};

use wirelay_core::geometry::Point;
use wirelay_core::model::Diagram;

use config::LayoutConfig;
use graph::ConnectionGraph;
use layout::canvas::CanvasSizer;
use layout::position::DevicePositioner;
use layout::route::WireRouter;
use layout::validate;

/// The layout pipeline facade.
///
/// Holds a [`LayoutConfig`] and runs the full pipeline — complexity
/// pre-check, device positioning, wire routing, canvas sizing, and
/// advisory validation — as one pure call.
///
/// # Examples
///
/// ```rust
/// use wirelay::LayoutEngine;
/// use wirelay::geometry::Point;
/// use wirelay::model::{
///     Board, Connection, ConnectionSource, Device, DevicePin, Diagram, HeaderPin, PinRole,
/// };
///
/// let diagram = Diagram {
///     board: Board {
///         name: "nano".to_string(),
///         width: 100.0,
///         height: 160.0,
///         pins: vec![HeaderPin {
///             number: 1,
///             name: "GPIO4".to_string(),
///             role: PinRole::Gpio,
///             position: Point::new(95.0, 30.0),
///         }],
///         layout_kind: None,
///     },
///     devices: vec![Device {
///         name: "led".to_string(),
///         width: 60.0,
///         height: 40.0,
///         pins: vec![DevicePin {
///             name: "IN".to_string(),
///             role: PinRole::Gpio,
///             position: Point::new(0.0, 20.0),
///         }],
///         position: None,
///         description: None,
///     }],
///     connections: vec![Connection {
///         source: ConnectionSource::Board { pin: 1 },
///         device: "led".to_string(),
///         device_pin: "IN".to_string(),
///         color: None,
///         style: None,
///     }],
///     show_title: false,
///     show_legend: false,
/// };
///
/// let engine = LayoutEngine::default();
/// let result = engine.layout(&diagram).expect("acyclic diagram lays out");
/// assert_eq!(result.routed_wires.len(), 1);
/// assert!(result.device_positions.contains_key("led"));
/// ```
#[derive(Debug, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute the full layout for a diagram.
    ///
    /// The input is not mutated; positions come back in the result (use
    /// [`LayoutResult::apply_positions`] for the legacy in-place
    /// convention). Advisory findings — overlap, out-of-bounds placement,
    /// clearance problems — are logged at `warn` and can be re-obtained
    /// through [`LayoutEngine::validate_layout`].
    ///
    /// # Errors
    ///
    /// * [`LayoutError::ComplexityExceeded`] when device or connection
    ///   counts exceed the configured hard caps; nothing is computed.
    /// * [`LayoutError::Cyclic`] when the connection graph contains a
    ///   cycle; nothing is computed.
    pub fn layout(&self, diagram: &Diagram) -> Result<LayoutResult, LayoutError> {
        self.check_complexity(diagram)?;

        info!(
            devices = diagram.devices.len(),
            connections = diagram.connections.len();
            "Laying out diagram"
        );

        let board_margin_top = self.config.board_margin_top(diagram.show_title);
        let board_position = Point::new(self.config.margin_left, board_margin_top);

        let graph = ConnectionGraph::from_connections(&diagram.connections);
        let device_positions = DevicePositioner::new(&self.config, &diagram.board, board_position)
            .position_devices(diagram, &graph)?;
        let routed_wires = WireRouter::new(&self.config, &diagram.board, board_position)
            .route_wires(diagram, &device_positions);
        let (canvas_width, canvas_height) = CanvasSizer::new(&self.config).size_canvas(
            diagram,
            board_position,
            &device_positions,
            &routed_wires,
        );

        let result = LayoutResult {
            canvas_width,
            canvas_height,
            board_position,
            device_positions,
            routed_wires,
            board_margin_top,
        };

        for finding in validate::validate_layout(diagram, &self.config, &result) {
            warn!("{finding}");
        }
        debug!(
            canvas_width = result.canvas_width,
            canvas_height = result.canvas_height;
            "Layout complete"
        );
        Ok(result)
    }

    /// Re-check an already-produced layout without recomputing it.
    ///
    /// Returns the advisory findings: device overlaps, out-of-canvas
    /// placement, and insufficient title/wire clearance.
    pub fn validate_layout(&self, diagram: &Diagram, result: &LayoutResult) -> Vec<String> {
        validate::validate_layout(diagram, &self.config, result)
    }

    /// Abort oversized diagrams before any positioning work; merely large
    /// ones only log.
    fn check_complexity(&self, diagram: &Diagram) -> Result<(), LayoutError> {
        if diagram.devices.len() > self.config.max_devices {
            return Err(LayoutError::ComplexityExceeded {
                what: "device",
                count: diagram.devices.len(),
                limit: self.config.max_devices,
            });
        }
        if diagram.connections.len() > self.config.max_connections {
            return Err(LayoutError::ComplexityExceeded {
                what: "connection",
                count: diagram.connections.len(),
                limit: self.config.max_connections,
            });
        }
        if diagram.devices.len() > self.config.warn_devices {
            warn!(
                devices = diagram.devices.len(),
                threshold = self.config.warn_devices;
                "Large diagram: device count above the warning threshold"
            );
        }
        if diagram.connections.len() > self.config.warn_connections {
            warn!(
                connections = diagram.connections.len(),
                threshold = self.config.warn_connections;
                "Large diagram: connection count above the warning threshold"
            );
        }
        Ok(())
    }
}
