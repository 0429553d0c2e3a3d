//! Spatial weather layout for Weathervane.
//!
//! The map's north-south axis is split into bands, and a rotation schedule
//! assigns one weather to each band. Rotating the schedule moves every
//! weather one band south.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid and schedule operations.
//! - [`grid`] -- Band generation and position-to-band resolution.
//! - [`rotation`] -- The cyclic weather schedule.

pub mod error;
pub mod grid;
pub mod rotation;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use grid::{Band, Grid, GridSpec, generate_grid, resolve_band};
pub use rotation::RotationSchedule;
