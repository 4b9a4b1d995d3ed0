//! GPIO pin policy for the Raspberry Pi header.
//!
//! Single source of truth for which BCM pins a remote may claim.  Both the
//! form layer (server-side validation, client-side min/max hints) and the
//! record decoder go through [`Pin`], so an out-of-range pin can never reach
//! the driver binding.

use core::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// Lowest usable BCM pin (0–3 are reserved for ID EEPROM and I²C).
pub const MIN_GPIO: u8 = 4;
/// Highest usable BCM pin on the 40-pin header.
pub const MAX_GPIO: u8 = 26;

pub const BLANK_PIN_MESSAGE: &str = "GPIO pin must not be left blank";
pub const WRONG_PIN_MESSAGE: &str = "GPIO pin must be between 4 - 26";

/// Inclusive pin range, exposed alongside pin fields so a browser can hint
/// the valid values before submitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PinRange {
    pub min: u8,
    pub max: u8,
}

impl PinRange {
    pub const GPIO: Self = Self {
        min: MIN_GPIO,
        max: MAX_GPIO,
    };

    pub const fn contains(&self, value: i64) -> bool {
        value >= self.min as i64 && value <= self.max as i64
    }
}

// ---------------------------------------------------------------------------
// Pin
// ---------------------------------------------------------------------------

/// A BCM pin number guaranteed to lie in `MIN_GPIO..=MAX_GPIO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Pin(u8);

impl Pin {
    pub fn new(value: i64) -> Result<Self, PinOutOfRange> {
        if PinRange::GPIO.contains(value) {
            Ok(Self(value as u8))
        } else {
            Err(PinOutOfRange(value))
        }
    }

    pub const fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Pin {
    type Error = PinOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Pin> for u8 {
    fn from(pin: Pin) -> Self {
        pin.0
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// Rejected pin value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinOutOfRange(pub i64);

impl fmt::Display for PinOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pin {} outside {}..={}", self.0, MIN_GPIO, MAX_GPIO)
    }
}

impl std::error::Error for PinOutOfRange {}

// ---------------------------------------------------------------------------
// Form-level validation
// ---------------------------------------------------------------------------

/// Validate a raw submitted pin value.
///
/// Blank or missing input and out-of-range / non-numeric input produce
/// distinct messages; the message is attached to the field by the caller.
pub fn validate_pin(raw: Option<&str>) -> Result<Pin, &'static str> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(BLANK_PIN_MESSAGE);
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|n| Pin::new(n).ok())
        .ok_or(WRONG_PIN_MESSAGE)
}
