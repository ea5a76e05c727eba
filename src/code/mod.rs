//! Withdrawal-code generation: configuration, random fields, the simulated
//! approval gate, record assembly and the batch runner.

pub mod config;

pub mod gate;

pub mod generator;

/// Exposes a runner as an `ItemReader` so it can feed a chunk-oriented step.
pub mod reader;

pub mod record;

pub mod runner;
