//! Simple on/off output (relay, LED, lamp).

use log::debug;

use crate::app::ports::DriverKind;
use crate::error::Result;
use crate::record::{RemoteKind, RemoteRecord};

use super::binding::{Binding, PinBinding};
use super::{follow_record, RemoteDevice};

#[derive(Debug)]
pub struct SimpleOutput {
    binding: PinBinding,
    name: String,
    is_on: bool,
}

impl SimpleOutput {
    pub fn construct(record: &RemoteRecord, binding: &Binding) -> Result<Self> {
        Ok(Self {
            binding: PinBinding::open(binding, record.pin, DriverKind::Output)?,
            name: record.name.clone(),
            is_on: false,
        })
    }

    /// Last level commanded through `input`.
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn set(&mut self, on: bool) -> Result<()> {
        if on {
            self.binding.on()?;
        } else {
            self.binding.off()?;
        }
        self.is_on = on;
        debug!("{} '{}' -> {}", self.binding.pin(), self.name, if on { "on" } else { "off" });
        Ok(())
    }
}

impl RemoteDevice for SimpleOutput {
    fn kind(&self) -> RemoteKind {
        RemoteKind::SimpleOutput
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
        follow_record(&mut self.binding, RemoteKind::SimpleOutput, record)?;
        self.name.clone_from(&record.name);
        self.set(record.keep_on().unwrap_or(false))
    }
}
