//! Unified error type for the remotes library.
//!
//! Every fallible device, store, and service operation funnels into
//! [`Error`], so the daemon and any web handler built on top deal with a
//! single type.  Port errors stay typed ([`DriverError`], [`StoreError`])
//! and are wrapped unchanged.

use core::fmt;

use crate::app::ports::{DriverError, StoreError};
use crate::forms::FormErrors;
use crate::pins::Pin;
use crate::record::RecordError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The driver reports the pin is already claimed by another open
    /// handle.  User-facing: surfaced to whoever creates or edits the
    /// remote, never retried.
    PinUnavailable(Pin),
    /// Any other driver failure, propagated as-is.
    Driver(DriverError),
    /// Record store failure.
    Store(StoreError),
    /// A stored record could not be decoded.
    Record(RecordError),
    /// Submitted form data failed validation.
    Form(FormErrors),
    /// Operation on a remote whose handle has been released.
    Closed(Pin),
    /// No remote is configured on this pin.
    UnknownRemote(Pin),
    /// A remote is already configured on this pin.
    DuplicatePin(Pin),
    /// An update tried to change a remote's type.
    KindMismatch { pin: Pin, expected: &'static str, found: &'static str },
    /// Configuration is invalid or could not be loaded.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinUnavailable(pin) => {
                write!(f, "{pin} is already in use by another remote")
            }
            Self::Driver(e) => write!(f, "driver: {e}"),
            Self::Store(e) => write!(f, "store: {e}"),
            Self::Record(e) => write!(f, "record: {e}"),
            Self::Form(e) => write!(f, "form: {e}"),
            Self::Closed(pin) => write!(f, "remote on {pin} is closed"),
            Self::UnknownRemote(pin) => write!(f, "no remote on {pin}"),
            Self::DuplicatePin(pin) => write!(f, "a remote already exists on {pin}"),
            Self::KindMismatch { pin, expected, found } => {
                write!(f, "remote on {pin} is a {expected}, not a {found}")
            }
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<RecordError> for Error {
    fn from(e: RecordError) -> Self {
        Self::Record(e)
    }
}

impl From<FormErrors> for Error {
    fn from(e: FormErrors) -> Self {
        Self::Form(e)
    }
}

impl Error {
    /// Translate a driver failure raised while opening `pin`.
    ///
    /// Only the "already in use" condition is translated; everything else
    /// passes through untouched.
    pub fn from_open(pin: Pin, e: DriverError) -> Self {
        match e {
            DriverError::PinInUse(_) => Self::PinUnavailable(pin),
            other => Self::Driver(other),
        }
    }
}

impl From<DriverError> for Error {
    fn from(e: DriverError) -> Self {
        Self::Driver(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, Error>;
