//! World clock, overrides, and the authoritative world service for Weathervane.
//!
//! This crate turns the spatial layout from `weathervane-world` into a live
//! world: a clock that rotates the weather schedule once per simulated hour,
//! operator overrides, and the service that answers client requests.
//!
//! # Modules
//!
//! - [`clock`] -- World clock, injectable [`TimeRule`]s, and wall-clock mode.
//! - [`commands`] -- Operator commands with user-facing replies.
//! - [`config`] -- Configuration loading from `weathervane-config.yaml` into
//!   strongly-typed structs.
//! - [`overrides`] -- Operator weather and time overrides.
//! - [`runner`] -- Fixed-period tick loop.
//! - [`service`] -- [`WorldService`], the single owner of world state.
//! - [`transport`] -- [`WeatherTransport`] seam for outbound messages.
//!
//! [`TimeRule`]: clock::TimeRule
//! [`WorldService`]: service::WorldService
//! [`WeatherTransport`]: transport::WeatherTransport

pub mod clock;
pub mod commands;
pub mod config;
pub mod overrides;
pub mod runner;
pub mod service;
pub mod transport;
