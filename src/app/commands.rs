//! Inbound commands to the remote service.
//!
//! These represent what the web UI (or any other caller) asks for; the
//! [`RemoteService`](super::service::RemoteService) validates and applies
//! them.

use crate::forms::FormData;
use crate::pins::Pin;
use crate::record::RemoteKind;

#[derive(Debug, Clone)]
pub enum RemoteCommand {
    /// Validate a submitted form and bring a new remote up.
    Create { kind: RemoteKind, form: FormData },

    /// Validate a submitted edit form and apply it to the remote on `pin`.
    Update { pin: Pin, form: FormData },

    /// Close the remote on `pin` and delete its record.
    Remove { pin: Pin },
}
