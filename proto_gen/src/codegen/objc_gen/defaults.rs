//! Default values of fields, typed and rendered as C initializers.

use super::data_type::ObjCType;
use crate::codegen::escape::{c_escape, escape_trigraphs};
use crate::schema::TypeEntry;
use proto_types::{DefaultValue, FieldDescriptor};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefaultError {
    #[error("{value} is out of range for {kind}")]
    OutOfRange { value: String, kind: &'static str },

    #[error("{value} is not a valid {kind} default")]
    WrongKind { value: String, kind: &'static str },

    #[error("enum has no value named '{0}'")]
    UnknownEnumValue(String),

    #[error("imported enum '{enum_name}' lists no values, cannot resolve default '{value}'")]
    ImportedValuesMissing { enum_name: String, value: String },

    #[error("{0} fields cannot declare a default")]
    NotAllowed(&'static str),
}

/// A field default, checked against the field's type.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedDefault {
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    Enum { value: String, number: i32 },
    Nil,
}

impl ResolvedDefault {
    /// Resolve the declared default of `field`, or its zero value when none is
    /// declared. `enum_type` is the referenced enum for enum fields.
    pub fn resolve(
        field: &FieldDescriptor,
        enum_type: Option<&TypeEntry>,
    ) -> Result<Self, DefaultError> {
        let declared = field.default.as_ref();
        if field.is_repeated() {
            return match declared {
                Some(_) => Err(DefaultError::NotAllowed("repeated")),
                None => Ok(ResolvedDefault::Nil),
            };
        }

        let resolved = match ObjCType::of(field.field_type) {
            ObjCType::Int32 => ResolvedDefault::Int32(narrow(integer(declared, "int32")?, "int32")?),
            ObjCType::UInt32 => {
                ResolvedDefault::UInt32(narrow(integer(declared, "uint32")?, "uint32")?)
            }
            ObjCType::Int64 => ResolvedDefault::Int64(narrow(integer(declared, "int64")?, "int64")?),
            ObjCType::UInt64 => {
                ResolvedDefault::UInt64(narrow(integer(declared, "uint64")?, "uint64")?)
            }
            ObjCType::Float => {
                let value = floating(declared, "float")?;
                if value.is_finite() && !(value as f32).is_finite() {
                    return Err(DefaultError::OutOfRange {
                        value: value.to_string(),
                        kind: "float",
                    });
                }
                ResolvedDefault::Float(value as f32)
            }
            ObjCType::Double => ResolvedDefault::Double(floating(declared, "double")?),
            ObjCType::Bool => ResolvedDefault::Bool(match declared {
                None => false,
                Some(DefaultValue::Bool(b)) => *b,
                Some(DefaultValue::Text(t)) if t == "true" => true,
                Some(DefaultValue::Text(t)) if t == "false" => false,
                Some(other) => return Err(wrong_kind(other, "bool")),
            }),
            ObjCType::String => ResolvedDefault::String(text(declared, "string")?),
            ObjCType::Data => ResolvedDefault::Bytes(text(declared, "bytes")?.into_bytes()),
            ObjCType::Enum => resolve_enum(declared, enum_type)?,
            ObjCType::Message => match declared {
                Some(_) => return Err(DefaultError::NotAllowed("message")),
                None => ResolvedDefault::Nil,
            },
        };
        Ok(resolved)
    }

    /// The value as a C expression.
    pub fn render(&self) -> String {
        match self {
            ResolvedDefault::Int32(i32::MIN) => "-2147483647 - 1".to_string(),
            ResolvedDefault::Int32(v) => v.to_string(),
            ResolvedDefault::UInt32(v) => format!("{}U", v),
            ResolvedDefault::Int64(i64::MIN) => "-9223372036854775807LL - 1".to_string(),
            ResolvedDefault::Int64(v) => format!("{}LL", v),
            ResolvedDefault::UInt64(v) => format!("{}ULL", v),
            ResolvedDefault::Float(v) => float_literal(v.to_string(), f64::from(*v), true),
            ResolvedDefault::Double(v) => float_literal(v.to_string(), *v, false),
            ResolvedDefault::Bool(true) => "YES".to_string(),
            ResolvedDefault::Bool(false) => "NO".to_string(),
            ResolvedDefault::String(s) if s.is_empty() => "nil".to_string(),
            ResolvedDefault::String(s) => {
                format!("@\"{}\"", escape_trigraphs(&c_escape(s.as_bytes())))
            }
            ResolvedDefault::Bytes(b) if b.is_empty() => "nil".to_string(),
            ResolvedDefault::Bytes(b) => {
                // Length-prefixed so the runtime can build an NSData from a static C string
                let mut raw = (b.len() as u32).to_be_bytes().to_vec();
                raw.extend_from_slice(b);
                format!("(NSData*)\"{}\"", escape_trigraphs(&c_escape(&raw)))
            }
            ResolvedDefault::Enum { value, .. } => value.clone(),
            ResolvedDefault::Nil => "nil".to_string(),
        }
    }

    pub fn is_non_zero(&self) -> bool {
        match self {
            ResolvedDefault::Int32(v) => *v != 0,
            ResolvedDefault::UInt32(v) => *v != 0,
            ResolvedDefault::Int64(v) => *v != 0,
            ResolvedDefault::UInt64(v) => *v != 0,
            ResolvedDefault::Float(v) => *v != 0.0,
            ResolvedDefault::Double(v) => *v != 0.0,
            ResolvedDefault::Bool(b) => *b,
            ResolvedDefault::String(s) => !s.is_empty(),
            ResolvedDefault::Bytes(b) => !b.is_empty(),
            ResolvedDefault::Enum { number, .. } => *number != 0,
            ResolvedDefault::Nil => false,
        }
    }
}

/// Member of the runtime's `GPBGenericValue` union that holds the default.
pub fn default_name(field: &FieldDescriptor) -> &'static str {
    if field.is_repeated() {
        return "valueMessage";
    }
    match ObjCType::of(field.field_type) {
        ObjCType::Int32 => "valueInt32",
        ObjCType::UInt32 => "valueUInt32",
        ObjCType::Int64 => "valueInt64",
        ObjCType::UInt64 => "valueUInt64",
        ObjCType::Float => "valueFloat",
        ObjCType::Double => "valueDouble",
        ObjCType::Bool => "valueBool",
        ObjCType::String => "valueString",
        ObjCType::Data => "valueData",
        ObjCType::Enum => "valueEnum",
        ObjCType::Message => "valueMessage",
    }
}

fn wrong_kind(value: &DefaultValue, kind: &'static str) -> DefaultError {
    DefaultError::WrongKind {
        value: value.to_string(),
        kind,
    }
}

fn integer(declared: Option<&DefaultValue>, kind: &'static str) -> Result<i128, DefaultError> {
    match declared {
        None => Ok(0),
        Some(DefaultValue::Int(v)) => Ok(i128::from(*v)),
        Some(DefaultValue::Uint(v)) => Ok(i128::from(*v)),
        Some(DefaultValue::Text(t)) => t.trim().parse().map_err(|_| DefaultError::WrongKind {
            value: t.clone(),
            kind,
        }),
        Some(other) => Err(wrong_kind(other, kind)),
    }
}

fn narrow<T: TryFrom<i128>>(value: i128, kind: &'static str) -> Result<T, DefaultError> {
    T::try_from(value).map_err(|_| DefaultError::OutOfRange {
        value: value.to_string(),
        kind,
    })
}

fn floating(declared: Option<&DefaultValue>, kind: &'static str) -> Result<f64, DefaultError> {
    match declared {
        None => Ok(0.0),
        Some(DefaultValue::Float(v)) => Ok(*v),
        Some(DefaultValue::Int(v)) => Ok(*v as f64),
        Some(DefaultValue::Uint(v)) => Ok(*v as f64),
        Some(DefaultValue::Text(t)) => match t.trim() {
            "inf" => Ok(f64::INFINITY),
            "-inf" => Ok(f64::NEG_INFINITY),
            "nan" => Ok(f64::NAN),
            other => other.parse().map_err(|_| DefaultError::WrongKind {
                value: t.clone(),
                kind,
            }),
        },
        Some(other) => Err(wrong_kind(other, kind)),
    }
}

fn text(declared: Option<&DefaultValue>, kind: &'static str) -> Result<String, DefaultError> {
    match declared {
        None => Ok(String::new()),
        Some(DefaultValue::Text(t)) => Ok(t.clone()),
        Some(other) => Err(wrong_kind(other, kind)),
    }
}

fn resolve_enum(
    declared: Option<&DefaultValue>,
    enum_type: Option<&TypeEntry>,
) -> Result<ResolvedDefault, DefaultError> {
    let Some(entry) = enum_type else {
        return Ok(zero_enum());
    };
    match declared {
        // Proto2 enums default to their first declared value, which need not be zero
        None => Ok(entry
            .values
            .first()
            .map(|v| ResolvedDefault::Enum {
                value: entry.enum_value_name(&v.name),
                number: v.number,
            })
            .unwrap_or_else(zero_enum)),
        Some(DefaultValue::Text(name)) if entry.external && entry.values.is_empty() => {
            Err(DefaultError::ImportedValuesMissing {
                enum_name: entry.name.clone(),
                value: name.clone(),
            })
        }
        Some(DefaultValue::Text(name)) => {
            let value = entry
                .values
                .iter()
                .find(|v| &v.name == name)
                .ok_or_else(|| DefaultError::UnknownEnumValue(name.clone()))?;
            Ok(ResolvedDefault::Enum {
                value: entry.enum_value_name(&value.name),
                number: value.number,
            })
        }
        Some(other) => Err(wrong_kind(other, "enum")),
    }
}

fn zero_enum() -> ResolvedDefault {
    ResolvedDefault::Enum {
        value: "0".to_string(),
        number: 0,
    }
}

fn float_literal(mut text: String, value: f64, is_float: bool) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    if value.is_infinite() {
        let huge = if is_float { "HUGE_VALF" } else { "HUGE_VAL" };
        return if value > 0.0 {
            huge.to_string()
        } else {
            format!("-{}", huge)
        };
    }
    if is_float && text.contains(['.', 'e', 'E']) {
        text.push('f');
    }
    text
}
