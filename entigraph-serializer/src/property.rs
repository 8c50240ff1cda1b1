use entigraph_model::Value;

/// Output of serializing one property or one injected pair.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertySerialization {
    Pair {
        key: String,
        value: serde_json::Value,
    },
    /// Leave this property out of the output.
    Ignore,
}

impl PropertySerialization {
    pub fn pair(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self::Pair {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn is_ignore(&self) -> bool {
        matches!(self, Self::Ignore)
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Pair { key, .. } => Some(key),
            Self::Ignore => None,
        }
    }
}

/// Output of a converter's deserialization step.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertedValue {
    /// Continue with this value.
    Value(Value),
    /// Do not deserialize this property at all.
    Ignore,
}

impl From<Value> for ConvertedValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}
