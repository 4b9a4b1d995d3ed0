//! GPIO remote device library.
//!
//! Exposes the device model, form schemas and persistence ports so the
//! `remoted` daemon and the integration tests share one implementation.
//! Real GPIO access lives behind the `rpi` feature; everything else runs
//! against the simulated backend.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod forms;
pub mod pins;
pub mod record;
pub mod remotes;
