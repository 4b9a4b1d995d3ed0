//! Pin binding shared by every remote.
//!
//! [`Binding`] is the hardware toggle: either a live [`GpioPort`] or
//! nothing (debug mode, where every driver call is skipped).
//! [`PinBinding`] is the per-remote base state: the pin, the driver kind it
//! is opened as, and the open handle, with the lifecycle
//!
//! ```text
//!   construct ──▶ Bound ──close()──▶ Closed
//!                  │  ▲
//!                  └──┘ change_pin() (old handle closed before the new opens)
//! ```
//!
//! Construction is all-or-nothing: either the handle opens and the binding
//! is `Bound`, or the error is returned and nothing is held.

use core::fmt;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::app::ports::{DriverKind, GpioPort, PinHandle};
use crate::error::{Error, Result};
use crate::pins::Pin;

// ───────────────────────────────────────────────────────────────
// Hardware toggle
// ───────────────────────────────────────────────────────────────

/// Where remotes get their driver handles from, if anywhere.
#[derive(Clone)]
pub struct Binding {
    gpio: Option<Arc<dyn GpioPort>>,
}

impl Binding {
    /// Debug mode: no driver is ever touched.
    pub fn disabled() -> Self {
        warn!("Hardware disabled (debug mode): remotes will not drive any GPIO");
        Self { gpio: None }
    }

    pub fn enabled(gpio: Arc<dyn GpioPort>) -> Self {
        Self { gpio: Some(gpio) }
    }

    pub fn is_enabled(&self) -> bool {
        self.gpio.is_some()
    }

    /// Open a handle, or `None` in debug mode.
    fn open(&self, pin: Pin, kind: DriverKind) -> Result<Option<Box<dyn PinHandle>>> {
        match &self.gpio {
            Some(gpio) => gpio
                .open(pin, kind)
                .map(Some)
                .map_err(|e| Error::from_open(pin, e)),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

// ───────────────────────────────────────────────────────────────
// Per-remote binding
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Bound,
    Closed,
}

pub struct PinBinding {
    pin: Pin,
    kind: DriverKind,
    binding: Binding,
    handle: Option<Box<dyn PinHandle>>,
    state: Lifecycle,
}

impl PinBinding {
    pub fn open(binding: &Binding, pin: Pin, kind: DriverKind) -> Result<Self> {
        let handle = binding.open(pin, kind)?;
        debug!("Bound {} as {}", pin, kind);
        Ok(Self {
            pin,
            kind,
            binding: binding.clone(),
            handle,
            state: Lifecycle::Bound,
        })
    }

    pub fn pin(&self) -> Pin {
        self.pin
    }

    pub fn driver_kind(&self) -> DriverKind {
        self.kind
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn is_bound(&self) -> bool {
        self.state == Lifecycle::Bound
    }

    /// Whether a real driver handle is held (always false in debug mode).
    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }

    pub fn ensure_bound(&self) -> Result<()> {
        match self.state {
            Lifecycle::Bound => Ok(()),
            Lifecycle::Closed => Err(Error::Closed(self.pin)),
        }
    }

    /// Release the handle.  Closing twice is an error, not a no-op.
    pub fn close(&mut self) -> Result<()> {
        self.ensure_bound()?;
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
        self.state = Lifecycle::Closed;
        debug!("Closed {}", self.pin);
        Ok(())
    }

    /// Move to `new_pin`: close the current handle, then open the same
    /// driver kind on the new pin.
    ///
    /// On failure the old handle is already gone; the binding is left
    /// `Closed` on its old pin and the error is returned as-is.
    pub fn change_pin(&mut self, new_pin: Pin) -> Result<()> {
        self.ensure_bound()?;
        if new_pin == self.pin {
            return Ok(());
        }
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
        match self.binding.open(new_pin, self.kind) {
            Ok(handle) => {
                info!("Moved {} remote {} -> {}", self.kind, self.pin, new_pin);
                self.handle = handle;
                self.pin = new_pin;
                Ok(())
            }
            Err(e) => {
                self.state = Lifecycle::Closed;
                warn!("Failed to move {} -> {}: {}", self.pin, new_pin, e);
                Err(e)
            }
        }
    }

    /// Base `input` behaviour: follow the record's pin.
    pub fn follow(&mut self, pin: Pin) -> Result<()> {
        self.ensure_bound()?;
        if pin != self.pin {
            self.change_pin(pin)?;
        }
        Ok(())
    }

    pub fn on(&mut self) -> Result<()> {
        self.ensure_bound()?;
        match self.handle.as_mut() {
            Some(handle) => handle.on().map_err(Error::from),
            None => Ok(()),
        }
    }

    pub fn off(&mut self) -> Result<()> {
        self.ensure_bound()?;
        match self.handle.as_mut() {
            Some(handle) => handle.off().map_err(Error::from),
            None => Ok(()),
        }
    }

    /// Driver "active" state, passed straight through.  Always `false`
    /// without a handle.
    pub fn is_active(&self) -> Result<bool> {
        self.ensure_bound()?;
        match self.handle.as_ref() {
            Some(handle) => handle.is_active().map_err(Error::from),
            None => Ok(false),
        }
    }
}

impl fmt::Debug for PinBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinBinding")
            .field("pin", &self.pin)
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("handle", &self.handle.is_some())
            .finish()
    }
}
