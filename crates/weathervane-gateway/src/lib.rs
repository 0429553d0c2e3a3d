//! Network gateway for Weathervane.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/weather`) where game clients request
//!   their weather and receive updates
//! - **Operator REST endpoints** for weather/time overrides and the
//!   rotation schedule
//! - **Status endpoint** (`/api/status`) with a world snapshot
//!
//! # Architecture
//!
//! [`ConnectionRegistry`] tracks every socket and implements the core
//! crate's `WeatherTransport`, so the world service can reply to one
//! client or announce to all without knowing about sockets.
//!
//! [`ConnectionRegistry`]: registry::ConnectionRegistry

pub mod error;
pub mod operator;
pub mod registry;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use registry::ConnectionRegistry;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
