use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Syntax {
    #[default]
    Proto2,
    Proto3,
}

/// Declared type of a field, as written in the schema.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Group,
    Message,
    Bytes,
    Uint32,
    Enum,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
    /// Map field; key and value types live in the field's `map` entry.
    Map,
}

impl FieldType {
    /// Numeric scalars: every integral and floating point type.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            FieldType::Double
                | FieldType::Float
                | FieldType::Int64
                | FieldType::Uint64
                | FieldType::Int32
                | FieldType::Fixed64
                | FieldType::Fixed32
                | FieldType::Uint32
                | FieldType::Sfixed32
                | FieldType::Sfixed64
                | FieldType::Sint32
                | FieldType::Sint64
        )
    }

    pub fn is_floating_point(self) -> bool {
        matches!(self, FieldType::Double | FieldType::Float)
    }

    /// Types whose value refers to another named schema type.
    pub fn needs_type_name(self) -> bool {
        matches!(self, FieldType::Message | FieldType::Group | FieldType::Enum)
    }

    /// Valid map key types (any integral type, bool or string).
    pub fn is_valid_map_key(self) -> bool {
        (self.is_numeric() && !self.is_floating_point())
            || matches!(self, FieldType::Bool | FieldType::String)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    #[default]
    #[serde(alias = "singular")]
    Optional,
    Required,
    Repeated,
}

/// Default value as written in the schema. Interpretation depends on the
/// field type: enum defaults name a value, bytes defaults are raw text.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefaultValue::Bool(v) => write!(f, "{}", v),
            DefaultValue::Int(v) => write!(f, "{}", v),
            DefaultValue::Uint(v) => write!(f, "{}", v),
            DefaultValue::Float(v) => write!(f, "{}", v),
            DefaultValue::Text(v) => write!(f, "\"{}\"", v),
        }
    }
}
