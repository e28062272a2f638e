//! Cloud IoT Core telemetry publisher — library crate.
//!
//! Exposes config loading so `iotcore-e2e-tests` can drive the same
//! setup path as the binary.

pub mod config;
