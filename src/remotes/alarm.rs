//! Composite alarm system.
//!
//! Only the main pin is bound.  The buzzer and motion sub-pins and the
//! notification list are carried from the record but not yet wired to any
//! driver handle, and arming (`keep_on`) does not trigger anything.

use log::debug;

use crate::app::ports::DriverKind;
use crate::error::{Error, Result};
use crate::pins::Pin;
use crate::record::{AlarmSpec, RemoteKind, RemoteRecord, RemoteSpec, SensorData};

use super::binding::{Binding, PinBinding};
use super::{follow_record, RemoteDevice};

#[derive(Debug)]
pub struct AlarmSystem {
    binding: PinBinding,
    name: String,
    keep_on: bool,
    pin_buzzer: Pin,
    pin_motion: Pin,
    motion: Option<SensorData>,
    photo_toggle: bool,
    emails: String,
}

impl AlarmSystem {
    /// Bind the main pin of an `AlarmSystem` record.  A record of any other
    /// kind is refused before the pin is touched.
    pub fn construct(record: &RemoteRecord, binding: &Binding) -> Result<Self> {
        let RemoteSpec::AlarmSystem(spec) = &record.spec else {
            return Err(Error::KindMismatch {
                pin: record.pin,
                expected: RemoteKind::AlarmSystem.as_str(),
                found: record.kind().as_str(),
            });
        };
        Ok(Self {
            binding: PinBinding::open(binding, record.pin, DriverKind::Generic)?,
            name: record.name.clone(),
            keep_on: spec.keep_on,
            pin_buzzer: spec.pin_buzzer,
            pin_motion: spec.pin_motion,
            motion: spec.motion.clone(),
            photo_toggle: spec.photo_toggle,
            emails: spec.emails.clone(),
        })
    }

    fn absorb(&mut self, spec: &AlarmSpec) {
        self.keep_on = spec.keep_on;
        self.pin_buzzer = spec.pin_buzzer;
        self.pin_motion = spec.pin_motion;
        self.motion.clone_from(&spec.motion);
        self.photo_toggle = spec.photo_toggle;
        self.emails.clone_from(&spec.emails);
    }

    /// Whether the alarm is armed (away mode).
    pub fn keep_on(&self) -> bool {
        self.keep_on
    }

    pub fn pin_buzzer(&self) -> Pin {
        self.pin_buzzer
    }

    pub fn pin_motion(&self) -> Pin {
        self.pin_motion
    }

    pub fn motion(&self) -> Option<&SensorData> {
        self.motion.as_ref()
    }

    pub fn photo_toggle(&self) -> bool {
        self.photo_toggle
    }

    /// Notification recipients.
    pub fn emails(&self) -> impl Iterator<Item = &str> {
        self.emails.split(',').filter(|e| !e.is_empty())
    }
}

impl RemoteDevice for AlarmSystem {
    fn kind(&self) -> RemoteKind {
        RemoteKind::AlarmSystem
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn binding(&self) -> &PinBinding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut PinBinding {
        &mut self.binding
    }

    fn input(&mut self, record: &RemoteRecord) -> Result<()> {
        follow_record(&mut self.binding, RemoteKind::AlarmSystem, record)?;
        self.name.clone_from(&record.name);
        if let RemoteSpec::AlarmSystem(spec) = &record.spec {
            self.absorb(spec);
        }
        if self.keep_on {
            // Away mode: buzzer, motion watch and notifications are not
            // implemented yet.
            debug!(
                "{} '{}' armed; away mode is not implemented",
                self.binding.pin(),
                self.name
            );
        }
        Ok(())
    }
}
