use crate::level::Severity;
use chrono::{DateTime, FixedOffset, Local};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A single structured log event as seen by a [`Handler`](crate::handler::Handler).
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<FixedOffset>,
    pub severity: Severity,
    pub message: String,
    attrs: Vec<Attr>,
}

impl LogRecord {
    /// Create a record stamped with the current local time.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self::at(Local::now().fixed_offset(), severity, message)
    }

    pub fn at(
        timestamp: DateTime<FixedOffset>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        LogRecord {
            timestamp,
            severity,
            message: message.into(),
            attrs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.push(Attr::new(key, value));
        self
    }

    pub fn add_attrs<I: IntoIterator<Item = Attr>>(&mut self, attrs: I) {
        self.attrs.extend(attrs);
    }

    /// Attributes in the order they were emitted. Keys may repeat.
    pub fn attrs(&self) -> impl Iterator<Item = &Attr> + '_ {
        self.attrs.iter()
    }

    pub fn num_attrs(&self) -> usize {
        self.attrs.len()
    }
}

/// Key/value pair attached to a record or bound to a handler.
#[derive(Debug, Clone)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Attr {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Attach any serde-serializable value. Conversion to JSON is deferred
    /// until the record is handled.
    pub fn serialized<T>(key: impl Into<String>, value: T) -> Self
    where
        T: Serialize + fmt::Debug + Send + Sync + 'static,
    {
        Attr {
            key: key.into(),
            value: Value::Any(Arc::new(value)),
        }
    }
}

/// Anything that can be turned into a JSON value on demand.
pub trait AttrValue: fmt::Debug + Send + Sync {
    fn to_json(&self) -> serde_json::Result<serde_json::Value>;
}

impl<T> AttrValue for T
where
    T: Serialize + fmt::Debug + Send + Sync,
{
    fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Time(DateTime<FixedOffset>),
    Json(serde_json::Value),
    Any(Arc<dyn AttrValue>),
}

impl Value {
    /// Convert to JSON. Fails for values JSON cannot represent, such as
    /// non-finite floats or maps with non-string keys.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        use serde::ser::Error as _;

        Ok(match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Uint(u) => serde_json::Value::from(*u),
            Value::Float(f) => match serde_json::Number::from_f64(*f) {
                Some(n) => serde_json::Value::Number(n),
                None => {
                    return Err(serde_json::Error::custom(format!(
                        "unsupported float value: {}",
                        f
                    )))
                }
            },
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Time(t) => serde_json::Value::String(t.to_rfc3339()),
            Value::Json(v) => v.clone(),
            Value::Any(v) => v.to_json()?,
        })
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

macro_rules! value_from_int {
    ($variant:ident, $target:ty, $($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$variant(v as $target)
            }
        })*
    };
}

value_from_int!(Int, i64, i8, i16, i32, i64);
value_from_int!(Uint, u64, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<Tz: chrono::TimeZone> From<DateTime<Tz>> for Value {
    fn from(v: DateTime<Tz>) -> Self {
        Value::Time(v.fixed_offset())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

/// Merge attribute sequences into one JSON object using mapping semantics:
/// later keys overwrite earlier ones, in the order the iterators are chained.
///
/// Only values that survive the merge are converted, so an overwritten value
/// never fails the record.
pub(crate) fn merge_fields<'a, I>(attrs: I) -> serde_json::Result<serde_json::Map<String, serde_json::Value>>
where
    I: IntoIterator<Item = &'a Attr>,
{
    let mut surviving: HashMap<&'a str, &'a Value> = HashMap::new();
    for attr in attrs {
        surviving.insert(attr.key.as_str(), &attr.value);
    }

    let mut fields = serde_json::Map::new();
    for (key, value) in surviving {
        fields.insert(key.to_string(), value.to_json()?);
    }
    Ok(fields)
}
