//! Simulated GPIO adapter.
//!
//! Implements [`GpioPort`] entirely in memory so remotes can be run and
//! tested without a Pi.  It keeps the one property that matters from the
//! real driver: at most one open handle per pin, with a second open
//! failing as [`DriverError::PinInUse`].  Input signals are set from the
//! outside with [`SimGpio::set_active`]; output levels are observable
//! through [`SimGpio::level`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, trace};

use crate::app::ports::{DriverError, DriverKind, GpioPort, PinHandle};
use crate::pins::Pin;

#[derive(Debug, Default)]
struct SimState {
    /// Pins with an open handle, and what they were opened as.
    claimed: HashMap<Pin, DriverKind>,
    /// Output levels of claimed output pins.
    levels: HashMap<Pin, bool>,
    /// Externally driven input signals (survive handle close).
    active: HashMap<Pin, bool>,
    /// One-shot failures returned by the next `open` on a pin.
    faults: HashMap<Pin, DriverError>,
}

#[derive(Debug, Default, Clone)]
pub struct SimGpio {
    state: Arc<Mutex<SimState>>,
}

fn lock(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimGpio {
    pub fn new() -> Self {
        debug!("SimGpio: simulation backend");
        Self::default()
    }

    pub fn is_claimed(&self, pin: Pin) -> bool {
        lock(&self.state).claimed.contains_key(&pin)
    }

    /// Number of handles currently open.
    pub fn open_count(&self) -> usize {
        lock(&self.state).claimed.len()
    }

    /// Output level of a claimed output pin.
    pub fn level(&self, pin: Pin) -> Option<bool> {
        lock(&self.state).levels.get(&pin).copied()
    }

    /// Drive the logical "active" signal seen by input handles on `pin`.
    pub fn set_active(&self, pin: Pin, active: bool) {
        lock(&self.state).active.insert(pin, active);
    }

    /// Make the next `open` on `pin` fail with `err`.
    pub fn inject_fault(&self, pin: Pin, err: DriverError) {
        lock(&self.state).faults.insert(pin, err);
    }
}

impl GpioPort for SimGpio {
    fn open(&self, pin: Pin, kind: DriverKind) -> Result<Box<dyn PinHandle>, DriverError> {
        let mut state = lock(&self.state);
        if let Some(err) = state.faults.remove(&pin) {
            return Err(err);
        }
        if state.claimed.contains_key(&pin) {
            return Err(DriverError::PinInUse(pin.number()));
        }
        state.claimed.insert(pin, kind);
        if kind == DriverKind::Output {
            state.levels.insert(pin, false);
        }
        trace!("SimGpio: opened {} as {}", pin, kind);
        Ok(Box::new(SimHandle {
            pin,
            kind,
            state: Arc::clone(&self.state),
        }))
    }
}

struct SimHandle {
    pin: Pin,
    kind: DriverKind,
    state: Arc<Mutex<SimState>>,
}

impl SimHandle {
    fn set_level(&mut self, high: bool) -> Result<(), DriverError> {
        if self.kind != DriverKind::Output {
            return Err(DriverError::Unsupported("level change on an input pin"));
        }
        lock(&self.state).levels.insert(self.pin, high);
        Ok(())
    }
}

impl PinHandle for SimHandle {
    fn pin(&self) -> Pin {
        self.pin
    }

    fn kind(&self) -> DriverKind {
        self.kind
    }

    fn on(&mut self) -> Result<(), DriverError> {
        self.set_level(true)
    }

    fn off(&mut self) -> Result<(), DriverError> {
        self.set_level(false)
    }

    fn is_active(&self) -> Result<bool, DriverError> {
        let state = lock(&self.state);
        let map = if self.kind == DriverKind::Output {
            &state.levels
        } else {
            &state.active
        };
        Ok(map.get(&self.pin).copied().unwrap_or(false))
    }

    fn close(self: Box<Self>) {
        // Released by Drop.
    }
}

impl Drop for SimHandle {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        state.claimed.remove(&self.pin);
        state.levels.remove(&self.pin);
        trace!("SimGpio: released {}", self.pin);
    }
}
