//! Input remotes: a generic input plus the motion sensor and switch that
//! refine it.
//!
//! "Active" is whatever the driver handle reports; there is no debouncing,
//! polling interval, or edge detection here.

use log::trace;
use serde_json::Value;

use crate::app::ports::{Clock, DriverKind, Document, Matcher, RecordStore};
use crate::error::Result;
use crate::record::{RemoteKind, RemoteRecord, SensorData};

use super::binding::{Binding, PinBinding};
use super::{follow_record, RemoteDevice};

// ───────────────────────────────────────────────────────────────
// SimpleInput
// ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct SimpleInput {
    binding: PinBinding,
    name: String,
    data: Option<SensorData>,
}

impl SimpleInput {
    pub fn construct(record: &RemoteRecord, binding: &Binding) -> Result<Self> {
        Self::with_driver(record, binding, DriverKind::Generic)
    }

    /// Sensors start from the record's stored reading, if any.
    pub(crate) fn with_driver(
        record: &RemoteRecord,
        binding: &Binding,
        kind: DriverKind,
    ) -> Result<Self> {
        Ok(Self {
            binding: PinBinding::open(binding, record.pin, kind)?,
            name: record.name.clone(),
            data: record.data().cloned(),
        })
    }

    pub fn data(&self) -> Option<&SensorData> {
        self.data.as_ref()
    }

    pub(crate) fn set_data(&mut self, data: SensorData) {
        self.data = Some(data);
    }

    /// Base sensor write: `{data}` into the record with this pin.
    fn write(&self, store: &mut dyn RecordStore) -> Result<()> {
        self.binding.ensure_bound()?;
        let mut fields = Document::new();
        let value = self.data.as_ref().map_or(Value::Null, Value::from);
        fields.insert("data".into(), value);
        let touched = store.update(fields, &Matcher::pin(self.binding.pin()))?;
        trace!("{} wrote data to {} record(s)", self.binding.pin(), touched);
        Ok(())
    }

    fn apply(&mut self, kind: RemoteKind, record: &RemoteRecord) -> Result<()> {
        follow_record(&mut self.binding, kind, record)?;
        self.name.clone_from(&record.name);
        Ok(())
    }
}

impl RemoteDevice for SimpleInput {
    fn kind(&self) -> RemoteKind {
        RemoteKind::SimpleInput
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
        self.apply(RemoteKind::SimpleInput, record)
    }

    fn output(&mut self, store: &mut dyn RecordStore, _clock: &dyn Clock) -> Result<()> {
        self.write(store)
    }
}

// ───────────────────────────────────────────────────────────────
// MotionSensor
// ───────────────────────────────────────────────────────────────

/// PIR sensor.  `data` holds the Unix time motion was last seen.
#[derive(Debug)]
pub struct MotionSensor {
    input: SimpleInput,
}

impl MotionSensor {
    pub fn construct(record: &RemoteRecord, binding: &Binding) -> Result<Self> {
        Ok(Self {
            input: SimpleInput::with_driver(record, binding, DriverKind::MotionSensor)?,
        })
    }

    pub fn last_motion(&self) -> Option<&SensorData> {
        self.input.data()
    }
}

impl RemoteDevice for MotionSensor {
    fn kind(&self) -> RemoteKind {
        RemoteKind::MotionSensor
    }

    fn name(&self) -> &str {
        &self.input.name
    }

    fn binding(&self) -> &PinBinding {
        &self.input.binding
    }

    fn binding_mut(&mut self) -> &mut PinBinding {
        &mut self.input.binding
    }

    fn input(&mut self, record: &RemoteRecord) -> Result<()> {
        self.input.apply(RemoteKind::MotionSensor, record)
    }

    fn output(&mut self, store: &mut dyn RecordStore, clock: &dyn Clock) -> Result<()> {
        if self.input.binding.is_active()? {
            self.input.set_data(SensorData::Timestamp(clock.now_secs()));
        }
        self.input.write(store)
    }
}

// ───────────────────────────────────────────────────────────────
// Switch
// ───────────────────────────────────────────────────────────────

pub const SWITCH_ON: &str = "ON";
pub const SWITCH_OFF: &str = "OFF";

/// Toggle or push switch.  `data` is `"ON"` while the switch is active.
#[derive(Debug)]
pub struct Switch {
    input: SimpleInput,
}

impl Switch {
    pub fn construct(record: &RemoteRecord, binding: &Binding) -> Result<Self> {
        Ok(Self {
            input: SimpleInput::with_driver(record, binding, DriverKind::Button)?,
        })
    }

    pub fn state(&self) -> Option<&SensorData> {
        self.input.data()
    }
}

impl RemoteDevice for Switch {
    fn kind(&self) -> RemoteKind {
        RemoteKind::Switch
    }

    fn name(&self) -> &str {
        &self.input.name
    }

    fn binding(&self) -> &PinBinding {
        &self.input.binding
    }

    fn binding_mut(&mut self) -> &mut PinBinding {
        &mut self.input.binding
    }

    fn input(&mut self, record: &RemoteRecord) -> Result<()> {
        self.input.apply(RemoteKind::Switch, record)
    }

    fn output(&mut self, store: &mut dyn RecordStore, _clock: &dyn Clock) -> Result<()> {
        let state = if self.input.binding.is_active()? {
            SWITCH_ON
        } else {
            SWITCH_OFF
        };
        self.input.set_data(SensorData::Text(state.to_owned()));
        self.input.write(store)
    }
}
