//! Field generation policies and the classification that selects them.
//!
//! Every operation that depends on how a field is represented matches on
//! [`FieldPolicy`] exhaustively, so a new policy cannot be added without
//! visiting each of those sites.

use proto_types::{Cardinality, FieldDescriptor, FieldType};
use serde_derive::Serialize;
use thiserror::Error;

/// Reference-typed values whose storage can itself be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    String,
    Bytes,
    /// Messages and groups.
    Message,
}

/// Representation of a single value, independent of cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueShape {
    Primitive,
    Bool,
    Enum,
    Object(ObjectKind),
}

impl ValueShape {
    /// `None` for map fields, whose value shape lives in the map entry.
    pub fn of(field_type: FieldType) -> Option<Self> {
        let shape = match field_type {
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
            | FieldType::Sint64 => ValueShape::Primitive,
            FieldType::Bool => ValueShape::Bool,
            FieldType::Enum => ValueShape::Enum,
            FieldType::String => ValueShape::Object(ObjectKind::String),
            FieldType::Bytes => ValueShape::Object(ObjectKind::Bytes),
            FieldType::Message | FieldType::Group => ValueShape::Object(ObjectKind::Message),
            FieldType::Map => return None,
        };
        Some(shape)
    }
}

/// How a generated message records whether a field is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresenceMechanism {
    /// A dedicated bit in the message's shared has-bit storage.
    HasBit,
    /// The storage slot is nil when unset.
    NullCheck,
    /// The container is empty when unset.
    Count,
    /// The oneof's shared case records which member is set.
    OneofCase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "policy", content = "shape")]
pub enum FieldPolicy {
    /// Numeric scalar with a presence bit.
    Primitive,
    /// Bool with a presence bit; the value itself is packed into an extra bit.
    Bool,
    /// Enum value with a presence bit.
    Enum,
    /// String, bytes or message; presence by null check.
    Object(ObjectKind),
    /// Array container; presence by count.
    Repeated(ValueShape),
    /// Dictionary container; presence by count.
    Map,
    /// Member of a oneof; presence by the shared oneof case.
    OneofMember(ValueShape),
}

impl FieldPolicy {
    pub fn presence(&self) -> PresenceMechanism {
        match self {
            FieldPolicy::Primitive | FieldPolicy::Bool | FieldPolicy::Enum => {
                PresenceMechanism::HasBit
            }
            FieldPolicy::Object(_) => PresenceMechanism::NullCheck,
            FieldPolicy::Repeated(_) | FieldPolicy::Map => PresenceMechanism::Count,
            FieldPolicy::OneofMember(_) => PresenceMechanism::OneofCase,
        }
    }

    pub fn runtime_uses_has_bit(&self) -> bool {
        self.presence() == PresenceMechanism::HasBit
    }

    /// Bits requested beyond the standard presence bit.
    pub fn extra_runtime_has_bits_needed(&self) -> u32 {
        match self {
            FieldPolicy::Bool | FieldPolicy::OneofMember(ValueShape::Bool) => 1,
            FieldPolicy::Primitive
            | FieldPolicy::Enum
            | FieldPolicy::Object(_)
            | FieldPolicy::Repeated(_)
            | FieldPolicy::Map
            | FieldPolicy::OneofMember(_) => 0,
        }
    }

    /// Shape of the single stored value; `None` for containers.
    pub fn single_value_shape(&self) -> Option<ValueShape> {
        match self {
            FieldPolicy::Primitive => Some(ValueShape::Primitive),
            FieldPolicy::Bool => Some(ValueShape::Bool),
            FieldPolicy::Enum => Some(ValueShape::Enum),
            FieldPolicy::Object(kind) => Some(ValueShape::Object(*kind)),
            FieldPolicy::OneofMember(shape) => Some(*shape),
            FieldPolicy::Repeated(_) | FieldPolicy::Map => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, FieldPolicy::Repeated(_) | FieldPolicy::Map)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldPolicy::Primitive => "primitive",
            FieldPolicy::Bool => "bool",
            FieldPolicy::Enum => "enum",
            FieldPolicy::Object(_) => "object",
            FieldPolicy::Repeated(_) => "repeated",
            FieldPolicy::Map => "map",
            FieldPolicy::OneofMember(_) => "oneof-member",
        }
    }
}

/// Field shapes no policy covers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("extension fields are generated separately from message fields")]
    Extension,
    #[error("repeated fields cannot be oneof members")]
    RepeatedInOneof,
    #[error("required fields cannot be oneof members")]
    RequiredInOneof,
    #[error("map fields cannot be oneof members")]
    MapInOneof,
    #[error("map fields must be repeated")]
    MapNotRepeated,
    #[error("map field is missing its key/value entry")]
    MissingMapEntry,
    #[error("{0:?} is not a valid map key type")]
    InvalidMapKey(FieldType),
    #[error("map values cannot themselves be maps")]
    NestedMap,
}

/// Select the generation policy for a field from its kind, cardinality and
/// oneof membership.
pub fn classify(field: &FieldDescriptor) -> Result<FieldPolicy, ClassifyError> {
    if field.extension {
        return Err(ClassifyError::Extension);
    }

    let Some(shape) = ValueShape::of(field.field_type) else {
        return classify_map(field);
    };

    match (field.cardinality, field.in_oneof()) {
        (Cardinality::Repeated, true) => Err(ClassifyError::RepeatedInOneof),
        (Cardinality::Required, true) => Err(ClassifyError::RequiredInOneof),
        (Cardinality::Repeated, false) => Ok(FieldPolicy::Repeated(shape)),
        (Cardinality::Optional, true) => Ok(FieldPolicy::OneofMember(shape)),
        (Cardinality::Optional | Cardinality::Required, false) => Ok(match shape {
            ValueShape::Primitive => FieldPolicy::Primitive,
            ValueShape::Bool => FieldPolicy::Bool,
            ValueShape::Enum => FieldPolicy::Enum,
            ValueShape::Object(kind) => FieldPolicy::Object(kind),
        }),
    }
}

fn classify_map(field: &FieldDescriptor) -> Result<FieldPolicy, ClassifyError> {
    if field.in_oneof() {
        return Err(ClassifyError::MapInOneof);
    }
    if !field.is_repeated() {
        return Err(ClassifyError::MapNotRepeated);
    }
    let entry = field.map.as_ref().ok_or(ClassifyError::MissingMapEntry)?;
    if !entry.key.is_valid_map_key() {
        return Err(ClassifyError::InvalidMapKey(entry.key));
    }
    if entry.value == FieldType::Map {
        return Err(ClassifyError::NestedMap);
    }
    Ok(FieldPolicy::Map)
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod policy_tests;
