//! Application core.
//!
//! The remote service and the ports it talks through.  GPIO, storage,
//! clock and event output are all traits defined in [`ports`], so the
//! service is testable without a Raspberry Pi.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
