//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every service event through the
//! `log` facade.  A browser push adapter would implement the same trait.

use log::info;

use crate::app::events::RemoteEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`RemoteEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &RemoteEvent) {
        match event {
            RemoteEvent::Loaded { bound, failed } => {
                info!("LOAD | bound={} failed={}", bound, failed);
            }
            RemoteEvent::Created { pin, kind } => {
                info!("CREATE | {} {}", kind, pin);
            }
            RemoteEvent::Updated { pin } => {
                info!("UPDATE | {}", pin);
            }
            RemoteEvent::PinChanged { from, to } => {
                info!("MOVE | {} -> {}", from, to);
            }
            RemoteEvent::Removed { pin } => {
                info!("REMOVE | {}", pin);
            }
            RemoteEvent::Polled { written, failed } => {
                log::debug!("POLL | written={} failed={}", written, failed);
            }
            RemoteEvent::Closed { pin } => {
                info!("CLOSE | {}", pin);
            }
        }
    }
}
