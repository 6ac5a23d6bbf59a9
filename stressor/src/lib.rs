//! Stressor Library
//!
//! A synthetic load-testing pair: a server that burns the resources it is
//! asked to (memory, CPU, time, bandwidth) and a generator that keeps asking
//! it to, at random, on a timer.

pub mod config;
pub mod generator;
pub mod params;
pub mod server;

// Re-export commonly used types
pub use config::{GeneratorConfig, ServerConfig};
pub use generator::{Generator, GeneratorError, LoadClient, Scenario, ScenarioPicker};
pub use server::{AppState, build_app, stress_routes};
