//! Client-side weather for Weathervane.
//!
//! Applies the weather the server announces without visible popping: each
//! new value is blended in over a bounded window, one transition at a time,
//! and winter audio/visual effects follow the weather.
//!
//! # Modules
//!
//! - [`config`] -- Environment-variable configuration.
//! - [`effects`] -- Winter effect policy.
//! - [`error`] -- [`ClientError`].
//! - [`natives`] -- [`WeatherNatives`] engine seam and a recording double.
//! - [`session`] -- Server message dispatch and the poll loop.
//! - [`transition`] -- [`TransitionController`].
//!
//! [`WeatherNatives`]: natives::WeatherNatives
//! [`TransitionController`]: transition::TransitionController

pub mod config;
pub mod effects;
pub mod error;
pub mod natives;
pub mod session;
pub mod transition;

pub use config::ClientConfig;
pub use error::ClientError;
