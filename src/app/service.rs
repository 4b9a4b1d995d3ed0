//! Remote service: the hexagonal core.
//!
//! [`RemoteService`] owns every live [`Remote`], keyed by pin.  It turns
//! submitted forms into bound remotes and stored records, pushes edits into
//! remotes, and runs output passes.  All I/O flows through port traits
//! passed in at call sites, so the whole service runs against the simulated
//! GPIO and an in-memory store in tests.
//!
//! ```text
//!  RemoteCommand ──▶ ┌──────────────────────┐ ──▶ EventSink
//!                    │    RemoteService      │
//!    RecordStore ◀──▶│  Remote · Remote · …  │ ◀── Clock
//!                    └──────────────────────┘
//!                               │
//!                            GpioPort
//! ```
//!
//! Calls are synchronous and the service is `&mut self` throughout, which
//! serialises `input` / `output` / `change_pin` per remote.

use std::collections::BTreeMap;

use log::{info, warn};

use crate::error::{Error, Result};
use crate::forms::{FormData, FormSchema};
use crate::pins::Pin;
use crate::record::{RemoteKind, RemoteRecord};
use crate::remotes::{Binding, Remote, RemoteDevice};

use super::commands::RemoteCommand;
use super::events::RemoteEvent;
use super::ports::{Clock, EventSink, Matcher, RecordStore};

/// Fields owned by `output`; an edit never overwrites a reading.
const READING_FIELDS: [&str; 2] = ["data", "motion"];

/// Result of [`RemoteService::load`].
#[derive(Debug, Default)]
pub struct LoadReport {
    pub bound: Vec<Pin>,
    pub failed: Vec<Error>,
}

/// Result of [`RemoteService::poll`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    pub written: usize,
    pub failed: usize,
}

pub struct RemoteService {
    binding: Binding,
    remotes: BTreeMap<Pin, Remote>,
}

impl RemoteService {
    pub fn new(binding: Binding) -> Self {
        Self {
            binding,
            remotes: BTreeMap::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Rebuild one remote per stored record.
    ///
    /// Any remotes already live are closed first.  A record that fails to
    /// decode or bind is reported and skipped; the rest still come up.
    pub fn load(
        &mut self,
        store: &impl RecordStore,
        sink: &mut impl EventSink,
    ) -> Result<LoadReport> {
        if !self.remotes.is_empty() {
            self.shutdown(sink);
        }
        let mut report = LoadReport::default();
        for doc in store.all()? {
            match self.bring_up(&doc) {
                Ok(pin) => report.bound.push(pin),
                Err(e) => {
                    warn!("Skipping stored remote: {}", e);
                    report.failed.push(e);
                }
            }
        }
        sink.emit(&RemoteEvent::Loaded {
            bound: report.bound.len(),
            failed: report.failed.len(),
        });
        Ok(report)
    }

    fn bring_up(&mut self, doc: &super::ports::Document) -> Result<Pin> {
        let record = RemoteRecord::from_dic(doc)?;
        if self.remotes.contains_key(&record.pin) {
            return Err(Error::DuplicatePin(record.pin));
        }
        let remote = self.start(&record)?;
        self.remotes.insert(record.pin, remote);
        Ok(record.pin)
    }

    /// Construct and apply the record's settings; nothing stays bound if
    /// either step fails.
    fn start(&self, record: &RemoteRecord) -> Result<Remote> {
        let mut remote = Remote::construct(record, &self.binding)?;
        if let Err(e) = remote.input(record) {
            if remote.is_bound() {
                if let Err(close_err) = remote.close() {
                    warn!("Close {} after failed start: {}", record.pin, close_err);
                }
            }
            return Err(e);
        }
        Ok(remote)
    }

    /// Close every bound remote and forget them all.
    pub fn shutdown(&mut self, sink: &mut impl EventSink) {
        for (pin, mut remote) in std::mem::take(&mut self.remotes) {
            if !remote.is_bound() {
                continue;
            }
            match remote.close() {
                Ok(()) => sink.emit(&RemoteEvent::Closed { pin }),
                Err(e) => warn!("Close {} failed: {}", pin, e),
            }
        }
    }

    // ── Commands ──────────────────────────────────────────────

    pub fn handle_command(
        &mut self,
        cmd: RemoteCommand,
        store: &mut impl RecordStore,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match cmd {
            RemoteCommand::Create { kind, form } => self.create(kind, &form, store, sink),
            RemoteCommand::Update { pin, form } => self.update(pin, &form, store, sink),
            RemoteCommand::Remove { pin } => self.remove(pin, store, sink),
        }
    }

    fn create(
        &mut self,
        kind: RemoteKind,
        form: &FormData,
        store: &mut impl RecordStore,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let record = FormSchema::for_kind(kind).validate(form)?;
        let pin = record.pin;
        if self.remotes.contains_key(&pin) || store.find(&Matcher::pin(pin))?.is_some() {
            return Err(Error::DuplicatePin(pin));
        }
        let mut remote = self.start(&record)?;
        if let Err(e) = store.insert(record.to_dic()) {
            if let Err(close_err) = remote.close() {
                warn!("Close {} after failed insert: {}", pin, close_err);
            }
            return Err(e.into());
        }
        info!("Created {} '{}' on {}", kind, record.name, pin);
        self.remotes.insert(pin, remote);
        sink.emit(&RemoteEvent::Created { pin, kind });
        Ok(())
    }

    fn update(
        &mut self,
        pin: Pin,
        form: &FormData,
        store: &mut impl RecordStore,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let kind = self
            .remotes
            .get(&pin)
            .map(|remote| remote.kind())
            .ok_or(Error::UnknownRemote(pin))?;
        let record = FormSchema::for_kind(kind).validate(form)?;
        let new_pin = record.pin;
        if new_pin != pin
            && (self.remotes.contains_key(&new_pin)
                || store.find(&Matcher::pin(new_pin))?.is_some())
        {
            return Err(Error::DuplicatePin(new_pin));
        }

        let mut remote = self.remotes.remove(&pin).ok_or(Error::UnknownRemote(pin))?;
        let applied = if remote.is_bound() {
            remote.input(&record)
        } else {
            // A failed move left it closed; the edit rebinds it with the
            // last stored reading.
            let mut seeded = record.clone();
            if let Some(previous) = store
                .find(&Matcher::pin(pin))
                .ok()
                .flatten()
                .and_then(|doc| RemoteRecord::from_dic(&doc).ok())
            {
                seeded.keep_reading_from(&previous);
            }
            self.start(&seeded).map(|fresh| remote = fresh)
        };
        if let Err(e) = applied {
            self.remotes.insert(remote.pin(), remote);
            return Err(e);
        }

        let mut fields = record.to_dic();
        for key in READING_FIELDS {
            fields.remove(key);
        }
        let stored = store.update(fields, &Matcher::pin(pin));
        self.remotes.insert(new_pin, remote);
        stored?;

        if new_pin != pin {
            sink.emit(&RemoteEvent::PinChanged { from: pin, to: new_pin });
        }
        sink.emit(&RemoteEvent::Updated { pin: new_pin });
        Ok(())
    }

    fn remove(
        &mut self,
        pin: Pin,
        store: &mut impl RecordStore,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let mut remote = self.remotes.remove(&pin).ok_or(Error::UnknownRemote(pin))?;
        if remote.is_bound() {
            remote.close()?;
        }
        store.remove(&Matcher::pin(pin))?;
        sink.emit(&RemoteEvent::Removed { pin });
        Ok(())
    }

    // ── Output pass ───────────────────────────────────────────

    /// Run `output` on every remote in pin order.  A failing remote is
    /// logged and counted; it does not stop the pass.
    pub fn poll(
        &mut self,
        store: &mut impl RecordStore,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) -> PollReport {
        let mut report = PollReport::default();
        for (pin, remote) in &mut self.remotes {
            match remote.output(&mut *store, clock) {
                Ok(()) => report.written += 1,
                Err(e) => {
                    warn!("Output from {} failed: {}", pin, e);
                    report.failed += 1;
                }
            }
        }
        sink.emit(&RemoteEvent::Polled {
            written: report.written,
            failed: report.failed,
        });
        report
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn get(&self, pin: Pin) -> Option<&Remote> {
        self.remotes.get(&pin)
    }

    pub fn pins(&self) -> impl Iterator<Item = Pin> + '_ {
        self.remotes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.remotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remotes.is_empty()
    }

    pub fn hardware_enabled(&self) -> bool {
        self.binding.is_enabled()
    }
}
