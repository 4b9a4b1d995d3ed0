//! Port traits: the hexagonal boundary between the device model and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Remote / RemoteService (domain)
//! ```
//!
//! Driven adapters (GPIO driver, record store, clock, event sinks) implement
//! these traits.  The device model only ever sees the traits, so every
//! remote can be exercised on a laptop against the simulated GPIO adapter.
//!
//! ## Exclusivity
//!
//! A [`GpioPort`] is the sole arbiter of pin ownership: it MUST refuse to
//! open a second handle on a pin that already has one open, and report
//! that as [`DriverError::PinInUse`].  Callers neither lock nor retry.

use core::fmt;

use serde_json::Value;

use crate::pins::Pin;

// ───────────────────────────────────────────────────────────────
// GPIO driver port (driven adapter: domain ↔ header pins)
// ───────────────────────────────────────────────────────────────

/// How a pin is configured when a handle is opened on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverKind {
    /// Plain input, active when high.
    Generic,
    /// Push-pull digital output.
    Output,
    /// PIR motion sensor input (pull-down, active when high).
    MotionSensor,
    /// Momentary/toggle switch input (pull-up, active when low).
    Button,
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => write!(f, "GPIODevice"),
            Self::Output => write!(f, "OutputDevice"),
            Self::MotionSensor => write!(f, "MotionSensor"),
            Self::Button => write!(f, "Button"),
        }
    }
}

/// Opens driver handles on pins.
pub trait GpioPort: Send + Sync {
    /// Claim `pin` and configure it for `kind`.
    fn open(&self, pin: Pin, kind: DriverKind) -> Result<Box<dyn PinHandle>, DriverError>;
}

/// A live, exclusive binding to one pin.  Dropping it releases the pin.
pub trait PinHandle: Send {
    fn pin(&self) -> Pin;

    fn kind(&self) -> DriverKind;

    /// Drive an output high.
    fn on(&mut self) -> Result<(), DriverError>;

    /// Drive an output low.
    fn off(&mut self) -> Result<(), DriverError>;

    /// Driver-reported signal state; inputs honour their pull direction.
    fn is_active(&self) -> Result<bool, DriverError>;

    /// Release the pin.
    fn close(self: Box<Self>);
}

/// Errors from [`GpioPort`] and [`PinHandle`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// Another open handle already owns the pin.
    PinInUse(u8),
    /// The pin does not exist on this board.
    PinNotAvailable(u8),
    /// The process may not access the GPIO device.
    PermissionDenied(String),
    /// Any other I/O failure talking to the GPIO peripheral.
    Io(String),
    /// Operation makes no sense for this handle (e.g. `on()` on an input).
    Unsupported(&'static str),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinInUse(pin) => write!(f, "GPIO{pin} is already in use"),
            Self::PinNotAvailable(pin) => write!(f, "GPIO{pin} is not available"),
            Self::PermissionDenied(path) => write!(f, "permission denied: {path}"),
            Self::Io(msg) => write!(f, "GPIO I/O error: {msg}"),
            Self::Unsupported(what) => write!(f, "unsupported: {what}"),
        }
    }
}

impl std::error::Error for DriverError {}

// ───────────────────────────────────────────────────────────────
// Record store port (driven adapter: domain ↔ document database)
// ───────────────────────────────────────────────────────────────

/// One stored record: a flat field mapping.
pub type Document = serde_json::Map<String, Value>;

/// Selects documents whose `field` equals `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matcher {
    pub field: String,
    pub value: Value,
}

impl Matcher {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `pin == pin`, the only key records are addressed by.
    pub fn pin(pin: Pin) -> Self {
        Self::new("pin", pin.number())
    }

    pub fn matches(&self, doc: &Document) -> bool {
        doc.get(&self.field) == Some(&self.value)
    }
}

/// Query-and-update interface over device records.
pub trait RecordStore {
    /// Every stored document, in insertion order.
    fn all(&self) -> Result<Vec<Document>, StoreError>;

    /// First document selected by `matcher`.
    fn find(&self, matcher: &Matcher) -> Result<Option<Document>, StoreError>;

    fn insert(&mut self, doc: Document) -> Result<(), StoreError>;

    /// Merge `fields` into every selected document.  Returns how many
    /// documents were touched.
    fn update(&mut self, fields: Document, matcher: &Matcher) -> Result<usize, StoreError>;

    /// Delete every selected document.  Returns how many were removed.
    fn remove(&mut self, matcher: &Matcher) -> Result<usize, StoreError>;
}

/// Errors from [`RecordStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backing file could not be read or written.
    Io(String),
    /// Backing file exists but is not a JSON array of objects.
    Corrupted(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "store I/O error: {msg}"),
            Self::Corrupted(msg) => write!(f, "store corrupted: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Wall-clock source for sensor timestamps.
pub trait Clock {
    /// Seconds since the Unix epoch.
    fn now_secs(&self) -> i64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / UI push)
// ───────────────────────────────────────────────────────────────

/// The service emits structured [`RemoteEvent`](super::events::RemoteEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::RemoteEvent);
}
