//! Remote device model.
//!
//! Every remote shares a [`PinBinding`] and implements [`RemoteDevice`];
//! the default trait methods are the base behaviour (follow the record's
//! pin on `input`, write nothing on `output`), and each variant overrides
//! what it needs.
//!
//! | Variant        | Driver kind    | `input`               | `output`                       |
//! |----------------|----------------|-----------------------|--------------------------------|
//! | `SimpleOutput` | Output         | pin + `keep_on` level | none                           |
//! | `SimpleInput`  | Generic        | pin                   | writes `data`                  |
//! | `MotionSensor` | MotionSensor   | pin                   | `data` = now if active, writes |
//! | `Switch`       | Button         | pin                   | `data` = ON/OFF, writes        |
//! | `AlarmSystem`  | Generic        | pin + alarm fields    | none                           |
//!
//! [`Remote`] is the tagged union the service stores; it is rebuilt from a
//! record by [`Remote::construct`] using the record's `type`.

pub mod alarm;
pub mod binding;
pub mod input;
pub mod output;

use crate::app::ports::{Clock, RecordStore};
use crate::error::{Error, Result};
use crate::pins::Pin;
use crate::record::{RemoteKind, RemoteRecord, RemoteSpec};

pub use alarm::AlarmSystem;
pub use binding::{Binding, Lifecycle, PinBinding};
pub use input::{MotionSensor, SimpleInput, Switch};
pub use output::SimpleOutput;

// ───────────────────────────────────────────────────────────────
// Capability interface
// ───────────────────────────────────────────────────────────────

pub trait RemoteDevice {
    fn kind(&self) -> RemoteKind;

    fn name(&self) -> &str;

    fn binding(&self) -> &PinBinding;

    fn binding_mut(&mut self) -> &mut PinBinding;

    fn pin(&self) -> Pin {
        self.binding().pin()
    }

    fn is_bound(&self) -> bool {
        self.binding().is_bound()
    }

    fn close(&mut self) -> Result<()> {
        self.binding_mut().close()
    }

    fn change_pin(&mut self, pin: Pin) -> Result<()> {
        self.binding_mut().change_pin(pin)
    }

    /// Push an updated record into the remote.
    fn input(&mut self, record: &RemoteRecord) -> Result<()>;

    /// Write the remote's current reading to the store, keyed by pin.
    fn output(&mut self, _store: &mut dyn RecordStore, _clock: &dyn Clock) -> Result<()> {
        self.binding().ensure_bound()
    }
}

/// Shared prologue for every `input`: the record must describe this kind
/// of remote, and the pin follows it.
pub(crate) fn follow_record(
    binding: &mut PinBinding,
    kind: RemoteKind,
    record: &RemoteRecord,
) -> Result<()> {
    if record.kind() != kind {
        return Err(Error::KindMismatch {
            pin: binding.pin(),
            expected: kind.as_str(),
            found: record.kind().as_str(),
        });
    }
    binding.follow(record.pin)
}

// ───────────────────────────────────────────────────────────────
// Tagged union
// ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum Remote {
    SimpleOutput(SimpleOutput),
    SimpleInput(SimpleInput),
    MotionSensor(MotionSensor),
    Switch(Switch),
    AlarmSystem(AlarmSystem),
}

impl Remote {
    /// Build the variant named by the record's `type` and bind its pin.
    pub fn construct(record: &RemoteRecord, binding: &Binding) -> Result<Self> {
        Ok(match &record.spec {
            RemoteSpec::SimpleOutput { .. } => {
                Self::SimpleOutput(SimpleOutput::construct(record, binding)?)
            }
            RemoteSpec::SimpleInput { .. } => {
                Self::SimpleInput(SimpleInput::construct(record, binding)?)
            }
            RemoteSpec::MotionSensor { .. } => {
                Self::MotionSensor(MotionSensor::construct(record, binding)?)
            }
            RemoteSpec::Switch { .. } => Self::Switch(Switch::construct(record, binding)?),
            RemoteSpec::AlarmSystem(_) => {
                Self::AlarmSystem(AlarmSystem::construct(record, binding)?)
            }
        })
    }

    fn device(&self) -> &dyn RemoteDevice {
        match self {
            Self::SimpleOutput(d) => d,
            Self::SimpleInput(d) => d,
            Self::MotionSensor(d) => d,
            Self::Switch(d) => d,
            Self::AlarmSystem(d) => d,
        }
    }

    fn device_mut(&mut self) -> &mut dyn RemoteDevice {
        match self {
            Self::SimpleOutput(d) => d,
            Self::SimpleInput(d) => d,
            Self::MotionSensor(d) => d,
            Self::Switch(d) => d,
            Self::AlarmSystem(d) => d,
        }
    }
}

impl RemoteDevice for Remote {
    fn kind(&self) -> RemoteKind {
        self.device().kind()
    }

    fn name(&self) -> &str {
        self.device().name()
    }

    fn binding(&self) -> &PinBinding {
        self.device().binding()
    }

    fn binding_mut(&mut self) -> &mut PinBinding {
        self.device_mut().binding_mut()
    }

    fn close(&mut self) -> Result<()> {
        self.device_mut().close()
    }

    fn change_pin(&mut self, pin: Pin) -> Result<()> {
        self.device_mut().change_pin(pin)
    }

    fn input(&mut self, record: &RemoteRecord) -> Result<()> {
        self.device_mut().input(record)
    }

    fn output(&mut self, store: &mut dyn RecordStore, clock: &dyn Clock) -> Result<()> {
        self.device_mut().output(store, clock)
    }
}
