//! Form schema: per-remote-type field definitions and validation.
//!
//! A browser submits raw strings ([`FormData`]); [`FormSchema::validate`]
//! turns them into an already-valid [`RemoteRecord`] or a set of
//! per-field messages.  Mapping the record to its stored document is a
//! separate, pure step ([`RemoteRecord::to_dic`]).
//!
//! Field sets nest the same way records do:
//!
//! ```text
//!   base   : name, pin
//!   output : base + keep_on
//!   input  : base
//!   alarm  : output + pin_buzzer, pin_motion, emails
//! ```

pub mod email;

use core::fmt;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::app::ports::Document;
use crate::pins::{validate_pin, Pin, PinRange};
use crate::record::{AlarmSpec, RemoteKind, RemoteRecord, RemoteSpec};

pub const BLANK_NAME_MESSAGE: &str = "Name must not be left blank";

// ───────────────────────────────────────────────────────────────
// Raw input
// ───────────────────────────────────────────────────────────────

/// Raw submitted fields, as decoded from a url-encoded request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(BTreeMap<String, String>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.0.insert(field.to_owned(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Checkbox semantics: an unchecked box is simply absent.
    pub fn flag(&self, field: &str) -> bool {
        self.get(field).is_some_and(|v| {
            matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "y" | "yes" | "on" | "true" | "1"
            )
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ───────────────────────────────────────────────────────────────
// Schema
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    Text,
    /// Integer pin input; `min`/`max` let the UI check before submit.
    Pin { min: u8, max: u8 },
    Checkbox,
    EmailList,
}

impl FieldType {
    const fn pin() -> Self {
        let range = PinRange::GPIO;
        Self::Pin {
            min: range.min,
            max: range.max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub field_type: FieldType,
    pub required: bool,
}

const fn field(
    name: &'static str,
    label: &'static str,
    field_type: FieldType,
    required: bool,
) -> FormField {
    FormField {
        name,
        label,
        field_type,
        required,
    }
}

/// Ordered field set for one remote type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSchema {
    pub kind: RemoteKind,
    pub fields: Vec<FormField>,
}

fn base_fields() -> Vec<FormField> {
    vec![
        field("name", "Name", FieldType::Text, true),
        field("pin", "GPIO pin", FieldType::pin(), true),
    ]
}

fn output_fields() -> Vec<FormField> {
    let mut fields = base_fields();
    fields.push(field("keep_on", "Initial State", FieldType::Checkbox, false));
    fields
}

fn alarm_fields() -> Vec<FormField> {
    let mut fields = output_fields();
    fields.extend([
        field("pin_buzzer", "Buzzer GPIO pin", FieldType::pin(), true),
        field("pin_motion", "Motion sensor GPIO pin", FieldType::pin(), true),
        field("emails", "Notification emails", FieldType::EmailList, true),
    ]);
    fields
}

impl FormSchema {
    pub fn for_kind(kind: RemoteKind) -> Self {
        let fields = match kind {
            RemoteKind::SimpleOutput => output_fields(),
            RemoteKind::SimpleInput | RemoteKind::MotionSensor | RemoteKind::Switch => {
                base_fields()
            }
            RemoteKind::AlarmSystem => alarm_fields(),
        };
        Self { kind, fields }
    }

    /// Validate every field and build the record.
    ///
    /// Errors accumulate across fields; nothing is returned unless the
    /// whole form is valid.
    pub fn validate(&self, data: &FormData) -> Result<RemoteRecord, FormErrors> {
        let mut errors = FormErrors::default();

        let name = data.get("name").map(str::trim).unwrap_or_default();
        if name.is_empty() {
            errors.add("name", BLANK_NAME_MESSAGE);
        }
        let pin = check_pin(data, "pin", &mut errors);

        let spec = match self.kind {
            RemoteKind::SimpleOutput => Some(RemoteSpec::SimpleOutput {
                keep_on: data.flag("keep_on"),
            }),
            RemoteKind::SimpleInput => Some(RemoteSpec::SimpleInput { data: None }),
            RemoteKind::MotionSensor => Some(RemoteSpec::MotionSensor { data: None }),
            RemoteKind::Switch => Some(RemoteSpec::Switch { data: None }),
            RemoteKind::AlarmSystem => {
                let pin_buzzer = check_pin(data, "pin_buzzer", &mut errors);
                let pin_motion = check_pin(data, "pin_motion", &mut errors);
                let raw_emails = data.get("emails").unwrap_or_default();
                let emails = match email::validate_email_list(raw_emails) {
                    Ok(list) => Some(list),
                    Err(msg) => {
                        errors.add("emails", msg);
                        None
                    }
                };
                match (pin_buzzer, pin_motion, emails) {
                    (Some(pin_buzzer), Some(pin_motion), Some(emails)) => {
                        Some(RemoteSpec::AlarmSystem(AlarmSpec {
                            keep_on: data.flag("keep_on"),
                            pin_buzzer,
                            pin_motion,
                            motion: None,
                            photo_toggle: false,
                            emails,
                        }))
                    }
                    _ => None,
                }
            }
        };

        match (pin, spec) {
            (Some(pin), Some(spec)) if errors.is_empty() => Ok(RemoteRecord {
                pin,
                name: name.to_owned(),
                spec,
            }),
            _ => Err(errors),
        }
    }
}

fn check_pin(data: &FormData, field: &str, errors: &mut FormErrors) -> Option<Pin> {
    match validate_pin(data.get(field)) {
        Ok(pin) => Some(pin),
        Err(msg) => {
            errors.add(field, msg);
            None
        }
    }
}

/// Validate `data` as a `kind` form and flatten it to its stored document.
pub fn to_dic(kind: RemoteKind, data: &FormData) -> Result<Document, FormErrors> {
    FormSchema::for_kind(kind).validate(data).map(|rec| rec.to_dic())
}

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.to_owned());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages attached to `field` (empty if it passed).
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for msg in messages {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                write!(f, "{field}: {msg}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}
