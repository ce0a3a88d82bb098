//! Purpose: Record scheme shared by every model: fixed fields plus an extension bag.
//! Exports: `Record`, `Extensions`, `FieldReader`, `FieldWriter`.
//! Role: Decode pops fixed keys in declaration order; leftovers become extensions.
//! Invariants: Extension keys never name a fixed field of their record.
//! Invariants: Encode writes extensions first, then fixed fields (fixed field wins).
use super::error::{ApiResult, Error, ErrorKind};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A JSON object model with a fixed schema and an opaque extension bag.
pub trait Record: Sized {
    /// Schema name used in error messages.
    const NAME: &'static str;
    /// Fixed field names, in decode order.
    const FIELDS: &'static [&'static str];

    fn from_map(map: Map<String, Value>) -> ApiResult<Self>;

    fn to_map(&self) -> Map<String, Value>;

    fn extensions(&self) -> &Extensions;

    fn extensions_mut(&mut self) -> &mut Extensions;

    fn from_value(value: Value) -> ApiResult<Self> {
        match value {
            Value::Object(map) => Self::from_map(map),
            other => Err(Error::new(ErrorKind::TypeMismatch).with_message(format!(
                "{} must be a JSON object, found {}",
                Self::NAME,
                json_type_name(&other)
            ))),
        }
    }

    fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }
}

/// Keys of a record that are not part of its schema.
#[derive(Clone, Debug)]
pub struct Extensions {
    reserved: &'static [&'static str],
    entries: Map<String, Value>,
}

impl PartialEq for Extensions {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Extensions {
    /// Empty bag for a record whose fixed fields are `reserved`.
    pub fn for_fields(reserved: &'static [&'static str]) -> Self {
        Self {
            reserved,
            entries: Map::new(),
        }
    }

    pub fn get(&self, key: &str) -> ApiResult<&Value> {
        self.entries.get(key).ok_or_else(|| missing_extension(key))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> ApiResult<Option<Value>> {
        let key = key.into();
        if self.reserved.contains(&key.as_str()) {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("extension key collides with a fixed field")
                .with_key(key));
        }
        Ok(self.entries.insert(key, value.into()))
    }

    pub fn remove(&mut self, key: &str) -> ApiResult<Value> {
        self.entries.remove(key).ok_or_else(|| missing_extension(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.entries
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.entries
    }
}

/// Pops fixed fields out of a decoded object.
#[derive(Debug)]
pub struct FieldReader {
    record: &'static str,
    map: Map<String, Value>,
}

impl FieldReader {
    pub fn new(record: &'static str, map: Map<String, Value>) -> Self {
        Self { record, map }
    }

    pub fn required(&mut self, key: &str) -> ApiResult<Value> {
        self.map.remove(key).ok_or_else(|| {
            Error::new(ErrorKind::MissingKey)
                .with_message(format!("{} is missing required field", self.record))
                .with_key(key)
        })
    }

    pub fn required_as<T: DeserializeOwned>(&mut self, key: &str) -> ApiResult<T> {
        let value = self.required(key)?;
        self.convert(key, value)
    }

    pub fn required_with<T>(
        &mut self,
        key: &str,
        decode: impl FnOnce(Value) -> ApiResult<T>,
    ) -> ApiResult<T> {
        let value = self.required(key)?;
        decode(value).map_err(|err| nest_key(err, key))
    }

    /// Absent and `null` both decode to `None`.
    pub fn optional_as<T: DeserializeOwned>(&mut self, key: &str) -> ApiResult<Option<T>> {
        match self.map.remove(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => self.convert(key, value).map(Some),
        }
    }

    pub fn optional_with<T>(
        &mut self,
        key: &str,
        decode: impl FnOnce(Value) -> ApiResult<T>,
    ) -> ApiResult<Option<T>> {
        match self.map.remove(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => decode(value).map(Some).map_err(|err| nest_key(err, key)),
        }
    }

    /// Remaining keys become the extension bag.
    pub fn finish(self, reserved: &'static [&'static str]) -> Extensions {
        Extensions {
            reserved,
            entries: self.map,
        }
    }

    fn convert<T: DeserializeOwned>(&self, key: &str, value: Value) -> ApiResult<T> {
        let found = json_type_name(&value);
        serde_json::from_value(value).map_err(|err| {
            Error::new(ErrorKind::TypeMismatch)
                .with_message(format!("{} field has unexpected {found} value", self.record))
                .with_key(key)
                .with_source(err)
        })
    }
}

/// Assembles an encoded object: extensions first, fixed fields on top.
#[derive(Debug)]
pub struct FieldWriter {
    map: Map<String, Value>,
}

impl FieldWriter {
    pub fn new(extensions: &Extensions) -> Self {
        Self {
            map: extensions.entries.clone(),
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.map.insert(key.to_string(), value.into());
        self
    }

    pub fn value(mut self, key: &str, value: Value) -> Self {
        self.map.insert(key.to_string(), value);
        self
    }

    pub fn optional(mut self, key: &str, value: Option<Value>) -> Self {
        if let Some(value) = value {
            self.map.insert(key.to_string(), value);
        }
        self
    }

    pub fn finish(self) -> Map<String, Value> {
        self.map
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// Prefixes a nested decode error's key with the field that held it.
fn nest_key(err: Error, key: &str) -> Error {
    let path = match err.key() {
        Some(inner) => format!("{key}.{inner}"),
        None => key.to_string(),
    };
    err.with_key(path)
}

fn missing_extension(key: &str) -> Error {
    Error::new(ErrorKind::MissingKey)
        .with_message("no such extension key")
        .with_key(key)
}
