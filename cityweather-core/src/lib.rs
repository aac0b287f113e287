//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The upstream provider abstraction and its OpenWeather client
//! - The display model and the projection of raw payloads onto it
//! - The input controller that validates queries and owns the result panel
//!
//! It is used by `cityweather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod projector;
pub mod provider;

pub use config::{ClientConfig, Config};
pub use controller::{InputController, Outcome, PanelState, Phase, ResolutionPolicy};
pub use error::{SchemaError, SubmitError, TransportError, ValidationError};
pub use model::WeatherReading;
pub use projector::{local_time, project, viewer_clock};
pub use provider::{WeatherProvider, provider_from_config};
