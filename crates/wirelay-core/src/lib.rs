//! Wirelay Core Types and Definitions
//!
//! This crate provides the foundational types for the wirelay layout engine:
//!
//! - **Geometry**: points, sizes, and bounding boxes ([`geometry`] module)
//! - **Colors**: CSS color handling and the role-keyed wire palette
//!   ([`color::Color`])
//! - **Model**: the board/device/connection diagram model ([`model`] module)
//!
//! All types here are plain data supplied by outer collaborators (template
//! registries, config parsers). The engine crate consumes them as-is and
//! never resolves names or templates itself.

pub mod color;
pub mod geometry;
pub mod model;
