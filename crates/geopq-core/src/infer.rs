//! Type inference for individual property values.

use std::fmt;

use arrow_schema::DataType;
use geopq_geojson::JsonValue;

/// The column type a property value maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    String,
    Integer,
    Float,
    Boolean,
    /// Only nulls observed so far.
    Null,
}

impl SemanticType {
    /// Combine two observations of the same property.
    ///
    /// Nulls never change the other side, equal types are kept and any other
    /// pair widens to [`SemanticType::String`]. The operation is commutative and
    /// associative, so partial results can be merged in any order.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (current, Self::Null) => current,
            (Self::Null, observed) => observed,
            (current, observed) if current == observed => current,
            _ => Self::String,
        }
    }

    /// Resolve a finished observation to a concrete column type.
    #[must_use]
    pub fn resolved(self) -> Self {
        match self {
            Self::Null => Self::String,
            other => other,
        }
    }

    /// Canonical lowercase type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "int64",
            Self::Float => "double",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }

    /// Arrow type of the column holding values of this type.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Self::String | Self::Null => DataType::Utf8,
            Self::Integer => DataType::Int64,
            Self::Float => DataType::Float64,
            Self::Boolean => DataType::Boolean,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Classify a single property value.
#[must_use]
pub fn infer(value: &JsonValue) -> SemanticType {
    match value {
        JsonValue::Null => SemanticType::Null,
        JsonValue::Bool(_) => SemanticType::Boolean,
        JsonValue::Number(n) if n.is_i64() || n.is_u64() => SemanticType::Integer,
        JsonValue::Number(_) => SemanticType::Float,
        JsonValue::String(_) | JsonValue::Array(_) | JsonValue::Object(_) => SemanticType::String,
    }
}
