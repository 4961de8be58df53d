//! Error types for layout operations.
//!
//! Only two conditions are fatal (§ error design): a cyclic connection
//! graph, and a diagram exceeding the configured complexity caps. Both
//! abort the call before any positioning work. Everything else — overlap,
//! out-of-bounds placement, clamped canvas — is advisory text, never an
//! error.

use thiserror::Error;

/// The fatal error type for layout operations.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The connection graph contains at least one cycle, so device levels
    /// cannot be computed. Carries every detected cycle as an ordered
    /// device-name sequence (a self-loop lists its device twice).
    #[error("connection graph is cyclic: {}", render_cycles(.cycles))]
    Cyclic { cycles: Vec<Vec<String>> },

    /// A device or connection count exceeded its configured hard cap.
    #[error("{what} count {count} exceeds the configured maximum of {limit}")]
    ComplexityExceeded {
        what: &'static str,
        count: usize,
        limit: usize,
    },
}

fn render_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|cycle| cycle.join(" -> "))
        .collect::<Vec<_>>()
        .join("; ")
}
