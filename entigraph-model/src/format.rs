use crate::{FormatError, ScalarKind, Value};
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::sync::Arc;

/// String conversion for a scalar property.
///
/// The serializer calls [`convert_from_string`](ValueFormat::convert_from_string)
/// when textual data arrives for a property whose native representation is
/// not a string (dates, numbers, booleans). Implement this to plug custom
/// scalar types into deserialization.
pub trait ValueFormat: Send + Sync + fmt::Debug {
    /// Short name used in error messages.
    fn name(&self) -> &str;

    /// Parses `text` into the property's native value.
    fn convert_from_string(&self, text: &str) -> Result<Value, FormatError>;
}

/// ISO 8601 dates. Accepts full RFC 3339 timestamps and bare `YYYY-MM-DD`
/// dates (midnight UTC).
#[derive(Debug, Clone, Copy, Default)]
pub struct DateFormat;

impl ValueFormat for DateFormat {
    fn name(&self) -> &str {
        "date"
    }

    fn convert_from_string(&self, text: &str) -> Result<Value, FormatError> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(Value::Date(dt.with_timezone(&Utc)));
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Value::Date(naive.and_utc()))
            .ok_or_else(|| FormatError::new(self.name(), text, "expected an ISO 8601 date"))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NumberFormat;

impl ValueFormat for NumberFormat {
    fn name(&self) -> &str {
        "number"
    }

    fn convert_from_string(&self, text: &str) -> Result<Value, FormatError> {
        let text = text.trim();
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Value::from(n));
        }
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Value::from(n)),
            Ok(_) => Err(FormatError::new(self.name(), text, "number is not finite")),
            Err(e) => Err(FormatError::new(self.name(), text, e.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanFormat;

impl ValueFormat for BooleanFormat {
    fn name(&self) -> &str {
        "boolean"
    }

    fn convert_from_string(&self, text: &str) -> Result<Value, FormatError> {
        match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "0" => Ok(Value::Bool(false)),
            _ => Err(FormatError::new(self.name(), text, "expected true or false")),
        }
    }
}

/// The format a scalar property of `kind` gets unless one is supplied.
pub fn default_format(kind: ScalarKind) -> Option<Arc<dyn ValueFormat>> {
    match kind {
        ScalarKind::Date => Some(Arc::new(DateFormat)),
        ScalarKind::Number => Some(Arc::new(NumberFormat)),
        ScalarKind::Boolean => Some(Arc::new(BooleanFormat)),
        ScalarKind::String | ScalarKind::Json => None,
    }
}
