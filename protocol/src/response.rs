//! # Response Accessor
//!
//! Typed field extraction over an untyped JSON document. The transport that
//! talks to a node (out of scope here) hands us parsed `serde_json` objects;
//! every decoder in the crate reads them through [`Response`] so the
//! conventions of the remote API are handled in exactly one place:
//!
//! - numbers may arrive as JSON numbers *or* as numeric strings,
//! - hex fields that are absent or empty mean "no bytes",
//! - identifiers are unsigned decimal text that may exceed `i64::MAX`,
//! - lists of nested objects are exposed as `Vec<Response>`.
//!
//! A JSON `null` is treated the same as an absent field.

use serde_json::{Map, Value};

use crate::error::NxtError;
use crate::identifier::parse_id_field;

/// A parsed API response (or any nested object within one).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    fields: Map<String, Value>,
}

fn number_error(field: &str, value: impl ToString) -> NxtError {
    NxtError::NumberFormat {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn number_value(field: &str, value: &Value) -> Result<i64, NxtError> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| number_error(field, n)),
        Value::String(s) => s.parse::<i64>().map_err(|_| number_error(field, s)),
        other => Err(number_error(field, other)),
    }
}

fn id_value(field: &str, value: &Value) -> Result<i64, NxtError> {
    match value {
        Value::String(s) => parse_id_field(field, s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|v| v as i64))
            .ok_or_else(|| NxtError::Identifier {
                field: field.to_string(),
                value: n.to_string(),
            }),
        other => Err(NxtError::Identifier {
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}

fn hex_value(field: &str, value: &Value) -> Result<Vec<u8>, NxtError> {
    match value {
        Value::String(s) if s.is_empty() => Ok(Vec::new()),
        Value::String(s) => hex::decode(s).map_err(|e| NxtError::Hex {
            field: field.to_string(),
            reason: e.to_string(),
        }),
        other => Err(NxtError::Hex {
            field: field.to_string(),
            reason: format!("expected a string, got {other}"),
        }),
    }
}

impl Response {
    /// Wrap an already-parsed JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, NxtError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(NxtError::Json(format!("expected an object, got {other}"))),
        }
    }

    /// Parse JSON text into a response.
    pub fn parse(text: &str) -> Result<Self, NxtError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Borrow the underlying object.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns `true` if the field is present and not `null`.
    pub fn has(&self, field: &str) -> bool {
        self.value(field).is_some()
    }

    fn value(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    fn require(&self, field: &str) -> Result<&Value, NxtError> {
        self.value(field)
            .ok_or_else(|| NxtError::MissingField(field.to_string()))
    }

    // -- strings & booleans -------------------------------------------------

    /// Required string field.
    pub fn get_string(&self, field: &str) -> Result<String, NxtError> {
        match self.require(field)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(NxtError::invalid(field, format!("expected a string, got {other}"))),
        }
    }

    /// Optional string field.
    pub fn opt_string(&self, field: &str) -> Result<Option<String>, NxtError> {
        if self.has(field) {
            self.get_string(field).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Required boolean field. The strings `"true"` and `"false"` are
    /// accepted as well.
    pub fn get_bool(&self, field: &str) -> Result<bool, NxtError> {
        match self.require(field)? {
            Value::Bool(b) => Ok(*b),
            Value::String(s) if s == "true" => Ok(true),
            Value::String(s) if s == "false" => Ok(false),
            other => Err(NxtError::invalid(field, format!("expected a boolean, got {other}"))),
        }
    }

    /// Optional boolean field.
    pub fn opt_bool(&self, field: &str) -> Result<Option<bool>, NxtError> {
        if self.has(field) {
            self.get_bool(field).map(Some)
        } else {
            Ok(None)
        }
    }

    // -- numbers ------------------------------------------------------------

    /// Required integer field, narrowed to `T`. Accepts a JSON number or a
    /// numeric string; values that do not fit `T` are a number-format error.
    pub fn get_number<T: TryFrom<i64>>(&self, field: &str) -> Result<T, NxtError> {
        let raw = number_value(field, self.require(field)?)?;
        T::try_from(raw).map_err(|_| number_error(field, raw))
    }

    /// Optional integer field.
    pub fn opt_number<T: TryFrom<i64>>(&self, field: &str) -> Result<Option<T>, NxtError> {
        if self.has(field) {
            self.get_number(field).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Required 64-bit integer field.
    pub fn get_long(&self, field: &str) -> Result<i64, NxtError> {
        self.get_number(field)
    }

    pub fn get_int(&self, field: &str) -> Result<i32, NxtError> {
        self.get_number(field)
    }

    pub fn get_short(&self, field: &str) -> Result<i16, NxtError> {
        self.get_number(field)
    }

    pub fn get_byte(&self, field: &str) -> Result<i8, NxtError> {
        self.get_number(field)
    }

    /// Attachment or appendix version byte stored under `version.<name>`.
    /// An absent version means 0.
    pub fn get_version(&self, name: &str) -> Result<u8, NxtError> {
        Ok(self
            .opt_number::<u8>(&format!("version.{name}"))?
            .unwrap_or(0))
    }

    // -- identifiers --------------------------------------------------------

    /// Required identifier field.
    pub fn get_id(&self, field: &str) -> Result<i64, NxtError> {
        id_value(field, self.require(field)?)
    }

    /// Optional identifier field.
    pub fn opt_id(&self, field: &str) -> Result<Option<i64>, NxtError> {
        match self.value(field) {
            Some(v) => id_value(field, v).map(Some),
            None => Ok(None),
        }
    }

    /// Array of identifiers; absent means empty.
    pub fn get_id_list(&self, field: &str) -> Result<Vec<i64>, NxtError> {
        self.array(field)?
            .iter()
            .map(|v| id_value(field, v))
            .collect()
    }

    // -- bytes --------------------------------------------------------------

    /// Hex-encoded byte field. Absent, `null` or empty yields no bytes.
    pub fn get_hex(&self, field: &str) -> Result<Vec<u8>, NxtError> {
        match self.value(field) {
            Some(v) => hex_value(field, v),
            None => Ok(Vec::new()),
        }
    }

    /// Fixed-width hex field; absent or empty yields `None`.
    pub fn opt_hex_array<const N: usize>(&self, field: &str) -> Result<Option<[u8; N]>, NxtError> {
        let bytes = self.get_hex(field)?;
        if bytes.is_empty() {
            return Ok(None);
        }
        <[u8; N]>::try_from(bytes.as_slice())
            .map(Some)
            .map_err(|_| NxtError::invalid(field, format!("expected {N} bytes, got {}", bytes.len())))
    }

    /// Array of hex strings; absent means empty.
    pub fn get_hex_list(&self, field: &str) -> Result<Vec<Vec<u8>>, NxtError> {
        self.array(field)?
            .iter()
            .map(|v| hex_value(field, v))
            .collect()
    }

    // -- nested documents ---------------------------------------------------

    fn array(&self, field: &str) -> Result<&[Value], NxtError> {
        match self.value(field) {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(NxtError::invalid(field, format!("expected an array, got {other}"))),
            None => Ok(&[]),
        }
    }

    /// Array of nested objects, in document order; absent means empty.
    pub fn get_list(&self, field: &str) -> Result<Vec<Response>, NxtError> {
        self.array(field)?
            .iter()
            .map(|item| match item {
                Value::Object(fields) => Ok(Response::new(fields.clone())),
                other => Err(NxtError::invalid(field, format!("expected an object, got {other}"))),
            })
            .collect()
    }

    /// Required nested object.
    pub fn get_object(&self, field: &str) -> Result<Response, NxtError> {
        match self.require(field)? {
            Value::Object(fields) => Ok(Response::new(fields.clone())),
            other => Err(NxtError::invalid(field, format!("expected an object, got {other}"))),
        }
    }

    /// Optional nested object.
    pub fn opt_object(&self, field: &str) -> Result<Option<Response>, NxtError> {
        if self.has(field) {
            self.get_object(field).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl From<Map<String, Value>> for Response {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

impl From<Response> for Value {
    fn from(response: Response) -> Self {
        Value::Object(response.fields)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
