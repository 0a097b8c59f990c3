//! Sort specifications and `search_after` cursor values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    #[default]
    Desc,
}

impl SortDirection {
    /// Parses `asc` / `desc`, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    /// The engine keyword for this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One entry of the sort specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    /// Index field to sort on.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortField {
    /// Creates a sort entry.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Serializes the entry for the request body.
    ///
    /// `unmapped_type` keeps the engine from failing on indices where the
    /// field has never been populated.
    pub fn to_json(&self) -> Value {
        let mut entry = Map::new();
        entry.insert(
            self.field.clone(),
            json!({
                "order": self.direction.as_str(),
                "unmapped_type": "keyword"
            }),
        );
        Value::Object(entry)
    }
}

/// A value in the `search_after` cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CursorValue {
    /// Numeric value (dates are epoch milliseconds).
    Number(f64),
    /// Keyword value.
    String(String),
}

impl CursorValue {
    /// Serializes the value for the request body.
    pub fn to_json(&self) -> Value {
        match self {
            CursorValue::Number(n) => json!(n),
            CursorValue::String(s) => json!(s),
        }
    }
}
