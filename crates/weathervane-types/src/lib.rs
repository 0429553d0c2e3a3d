//! Shared type definitions for Weathervane.
//!
//! This crate is the single source of truth for the types that cross the
//! wire between the server and game clients. Types flow to `TypeScript`
//! via `ts-rs` for the client scripts.
//!
//! # Modules
//!
//! - [`enums`] -- The closed [`Weather`] enumeration
//! - [`ids`] -- Type-safe UUID wrappers
//! - [`messages`] -- Client/server messages and [`Position`]

pub mod enums;
pub mod ids;
pub mod messages;

// Re-export all public types at crate root for convenience.
pub use enums::{UnknownWeather, Weather};
pub use ids::ConnectionId;
pub use messages::{ClientMessage, Position, ServerMessage};
