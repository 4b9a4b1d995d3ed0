//! Raspberry Pi GPIO adapter (rppal).
//!
//! Only compiled with the `rpi` feature on Linux.  Each [`DriverKind`] maps
//! to a pin mode:
//!
//! | Kind           | Mode                | Active when |
//! |----------------|---------------------|-------------|
//! | `Output`       | push-pull output    | set high    |
//! | `Generic`      | floating input      | high        |
//! | `MotionSensor` | input, pull-down    | high        |
//! | `Button`       | input, pull-up      | low         |
//!
//! rppal itself refuses a second `get()` on a pin that is still held,
//! which is what makes handles exclusive; dropping a pin releases it.

use log::info;
use rppal::gpio::{self, Gpio, InputPin, OutputPin};

use crate::app::ports::{DriverError, DriverKind, GpioPort, PinHandle};
use crate::pins::Pin;

pub struct RppalGpio {
    gpio: Gpio,
}

impl RppalGpio {
    pub fn new() -> Result<Self, DriverError> {
        let gpio = Gpio::new().map_err(map_err)?;
        info!("RppalGpio: GPIO peripheral opened");
        Ok(Self { gpio })
    }
}

fn map_err(e: gpio::Error) -> DriverError {
    match e {
        gpio::Error::PinUsed(pin) => DriverError::PinInUse(pin),
        gpio::Error::PinNotAvailable(pin) => DriverError::PinNotAvailable(pin),
        gpio::Error::PermissionDenied(path) => DriverError::PermissionDenied(path),
        other => DriverError::Io(other.to_string()),
    }
}

enum Line {
    Output(OutputPin),
    Input { pin: InputPin, active_low: bool },
}

struct RppalHandle {
    pin: Pin,
    kind: DriverKind,
    line: Line,
}

impl GpioPort for RppalGpio {
    fn open(&self, pin: Pin, kind: DriverKind) -> Result<Box<dyn PinHandle>, DriverError> {
        let raw = self.gpio.get(pin.number()).map_err(map_err)?;
        let line = match kind {
            DriverKind::Output => Line::Output(raw.into_output_low()),
            DriverKind::Generic => Line::Input {
                pin: raw.into_input(),
                active_low: false,
            },
            DriverKind::MotionSensor => Line::Input {
                pin: raw.into_input_pulldown(),
                active_low: false,
            },
            DriverKind::Button => Line::Input {
                pin: raw.into_input_pullup(),
                active_low: true,
            },
        };
        Ok(Box::new(RppalHandle { pin, kind, line }))
    }
}

impl PinHandle for RppalHandle {
    fn pin(&self) -> Pin {
        self.pin
    }

    fn kind(&self) -> DriverKind {
        self.kind
    }

    fn on(&mut self) -> Result<(), DriverError> {
        match &mut self.line {
            Line::Output(out) => {
                out.set_high();
                Ok(())
            }
            Line::Input { .. } => Err(DriverError::Unsupported("level change on an input pin")),
        }
    }

    fn off(&mut self) -> Result<(), DriverError> {
        match &mut self.line {
            Line::Output(out) => {
                out.set_low();
                Ok(())
            }
            Line::Input { .. } => Err(DriverError::Unsupported("level change on an input pin")),
        }
    }

    fn is_active(&self) -> Result<bool, DriverError> {
        Ok(match &self.line {
            Line::Output(out) => out.is_set_high(),
            Line::Input { pin, active_low } => pin.is_high() != *active_low,
        })
    }

    fn close(self: Box<Self>) {
        // Dropping the rppal pin resets its mode and releases it.
    }
}
