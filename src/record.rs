//! Remote records: the persisted shape of one configured remote.
//!
//! A record is produced by the form layer from validated user input,
//! stored as a flat [`Document`], and read back to select and rebuild the
//! matching [`Remote`](crate::remotes::Remote) variant via its `type`
//! discriminator.
//!
//! ## Field layout
//!
//! | Family        | Fields added on top of the parent                      |
//! |---------------|--------------------------------------------------------|
//! | base          | `pin`, `name`, `type`                                  |
//! | input         | `data`                                                 |
//! | output        | `keep_on`                                              |
//! | alarm (output)| `pin_buzzer`, `pin_motion`, `motion`, `photo_toggle`, `emails` |

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::ports::Document;
use crate::pins::Pin;

// ---------------------------------------------------------------------------
// Discriminator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteKind {
    SimpleOutput,
    SimpleInput,
    MotionSensor,
    Switch,
    AlarmSystem,
}

impl RemoteKind {
    pub const ALL: [Self; 5] = [
        Self::SimpleOutput,
        Self::SimpleInput,
        Self::MotionSensor,
        Self::Switch,
        Self::AlarmSystem,
    ];

    /// The `type` value stored in records.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SimpleOutput => "SimpleOutput",
            Self::SimpleInput => "SimpleInput",
            Self::MotionSensor => "MotionSensor",
            Self::Switch => "Switch",
            Self::AlarmSystem => "AlarmSystem",
        }
    }
}

impl fmt::Display for RemoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemoteKind {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| RecordError::UnknownType(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Sensor readings
// ---------------------------------------------------------------------------

/// Last value a sensor wrote.  Motion sensors store a Unix timestamp,
/// switches store `"ON"` / `"OFF"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorData {
    Timestamp(i64),
    Text(String),
}

impl From<&SensorData> for Value {
    fn from(data: &SensorData) -> Self {
        match data {
            SensorData::Timestamp(t) => Value::from(*t),
            SensorData::Text(s) => Value::from(s.as_str()),
        }
    }
}

fn optional_value(data: Option<&SensorData>) -> Value {
    data.map_or(Value::Null, Value::from)
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub pin: Pin,
    pub name: String,
    #[serde(flatten)]
    pub spec: RemoteSpec,
}

/// Type-specific fields, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RemoteSpec {
    SimpleOutput {
        #[serde(default)]
        keep_on: bool,
    },
    SimpleInput {
        #[serde(default)]
        data: Option<SensorData>,
    },
    MotionSensor {
        #[serde(default)]
        data: Option<SensorData>,
    },
    Switch {
        #[serde(default)]
        data: Option<SensorData>,
    },
    AlarmSystem(AlarmSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmSpec {
    #[serde(default)]
    pub keep_on: bool,
    pub pin_buzzer: Pin,
    pub pin_motion: Pin,
    #[serde(default)]
    pub motion: Option<SensorData>,
    #[serde(default)]
    pub photo_toggle: bool,
    #[serde(default)]
    pub emails: String,
}

impl RemoteSpec {
    pub const fn kind(&self) -> RemoteKind {
        match self {
            Self::SimpleOutput { .. } => RemoteKind::SimpleOutput,
            Self::SimpleInput { .. } => RemoteKind::SimpleInput,
            Self::MotionSensor { .. } => RemoteKind::MotionSensor,
            Self::Switch { .. } => RemoteKind::Switch,
            Self::AlarmSystem(_) => RemoteKind::AlarmSystem,
        }
    }
}

impl RemoteRecord {
    pub const fn kind(&self) -> RemoteKind {
        self.spec.kind()
    }

    /// `keep_on` for output-family records, `None` otherwise.
    pub fn keep_on(&self) -> Option<bool> {
        match &self.spec {
            RemoteSpec::SimpleOutput { keep_on } => Some(*keep_on),
            RemoteSpec::AlarmSystem(alarm) => Some(alarm.keep_on),
            _ => None,
        }
    }

    /// Stored sensor reading, for input-family records.
    pub fn data(&self) -> Option<&SensorData> {
        match &self.spec {
            RemoteSpec::SimpleInput { data }
            | RemoteSpec::MotionSensor { data }
            | RemoteSpec::Switch { data } => data.as_ref(),
            _ => None,
        }
    }

    /// Carry `previous`'s sensor reading into this record if it has none.
    pub fn keep_reading_from(&mut self, previous: &Self) {
        if let RemoteSpec::SimpleInput { data }
        | RemoteSpec::MotionSensor { data }
        | RemoteSpec::Switch { data } = &mut self.spec
        {
            if data.is_none() {
                *data = previous.data().cloned();
            }
        }
    }

    /// Flatten into the stored document.
    ///
    /// Built as a chain: base fields first, then each family layers its
    /// own fields on top without touching its parent's.
    pub fn to_dic(&self) -> Document {
        let mut dic = self.base_dic();
        match &self.spec {
            RemoteSpec::SimpleOutput { keep_on } => add_output_fields(&mut dic, *keep_on),
            RemoteSpec::SimpleInput { data }
            | RemoteSpec::MotionSensor { data }
            | RemoteSpec::Switch { data } => add_input_fields(&mut dic, data.as_ref()),
            RemoteSpec::AlarmSystem(alarm) => {
                add_output_fields(&mut dic, alarm.keep_on);
                dic.insert("pin_buzzer".into(), alarm.pin_buzzer.number().into());
                dic.insert("pin_motion".into(), alarm.pin_motion.number().into());
                dic.insert("motion".into(), optional_value(alarm.motion.as_ref()));
                dic.insert("photo_toggle".into(), alarm.photo_toggle.into());
                dic.insert("emails".into(), alarm.emails.clone().into());
            }
        }
        dic
    }

    fn base_dic(&self) -> Document {
        let mut dic = Document::new();
        dic.insert("pin".into(), self.pin.number().into());
        dic.insert("name".into(), self.name.clone().into());
        dic.insert("type".into(), self.kind().as_str().into());
        dic
    }

    /// Decode a stored document.
    pub fn from_dic(doc: &Document) -> Result<Self, RecordError> {
        match doc.get("type") {
            Some(Value::String(t)) => {
                RemoteKind::from_str(t)?;
            }
            Some(other) => return Err(RecordError::UnknownType(other.to_string())),
            None => return Err(RecordError::MissingType),
        }
        serde_json::from_value(Value::Object(doc.clone()))
            .map_err(|e| RecordError::Invalid(e.to_string()))
    }
}

fn add_output_fields(dic: &mut Document, keep_on: bool) {
    dic.insert("keep_on".into(), keep_on.into());
}

fn add_input_fields(dic: &mut Document, data: Option<&SensorData>) {
    dic.insert("data".into(), optional_value(data));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The document has no `type` field.
    MissingType,
    /// `type` names no known remote.
    UnknownType(String),
    /// A field is missing or has the wrong shape.
    Invalid(String),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingType => write!(f, "record has no type"),
            Self::UnknownType(t) => write!(f, "unknown remote type {t}"),
            Self::Invalid(msg) => write!(f, "invalid record: {msg}"),
        }
    }
}

impl std::error::Error for RecordError {}
