//! Outbound service events.
//!
//! The [`RemoteService`](super::service::RemoteService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them, such as logging them.

use crate::pins::Pin;
use crate::record::RemoteKind;

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteEvent {
    /// Stored records were rebuilt into live remotes.
    Loaded { bound: usize, failed: usize },

    /// A new remote was validated, bound and stored.
    Created { pin: Pin, kind: RemoteKind },

    /// A stored remote received new settings.
    Updated { pin: Pin },

    /// A remote moved to another pin.
    PinChanged { from: Pin, to: Pin },

    /// A remote was closed and deleted.
    Removed { pin: Pin },

    /// One output pass finished.
    Polled { written: usize, failed: usize },

    /// A remote's driver handle was released.
    Closed { pin: Pin },
}
