//! Randomized load generator
//!
//! This module provides:
//! - `Scenario` and `PlannedRequest` for turning an RNG into a request
//! - `ScenarioPicker` for uniform or weighted scenario selection
//! - `LoadClient` for sending planned requests over HTTP
//! - `Generator`, the timer loop tying them together

mod client;
mod runner;
mod scenario;
mod types;

pub use client::LoadClient;
pub use runner::{Generator, RunSummary};
pub use scenario::{Payload, PlannedRequest, Scenario, ScenarioPicker, parse_weights};
pub use types::{GeneratorError, RequestOutcome};
