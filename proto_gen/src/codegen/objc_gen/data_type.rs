//! Objective-C spellings of schema field types.

use proto_types::FieldType;

/// Storage class a schema type maps to in generated Objective-C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjCType {
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    Bool,
    String,
    Data,
    Enum,
    Message,
}

impl ObjCType {
    pub fn of(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Int32 | FieldType::Sint32 | FieldType::Sfixed32 => ObjCType::Int32,
            FieldType::Uint32 | FieldType::Fixed32 => ObjCType::UInt32,
            FieldType::Int64 | FieldType::Sint64 | FieldType::Sfixed64 => ObjCType::Int64,
            FieldType::Uint64 | FieldType::Fixed64 => ObjCType::UInt64,
            FieldType::Float => ObjCType::Float,
            FieldType::Double => ObjCType::Double,
            FieldType::Bool => ObjCType::Bool,
            FieldType::String => ObjCType::String,
            FieldType::Bytes => ObjCType::Data,
            FieldType::Enum => ObjCType::Enum,
            FieldType::Message | FieldType::Group | FieldType::Map => ObjCType::Message,
        }
    }

    /// Spelling of a stored value. Enums and messages are spelled by the
    /// referenced type instead; this is their untyped fallback.
    pub fn spelling(self) -> &'static str {
        match self {
            ObjCType::Int32 | ObjCType::Enum => "int32_t",
            ObjCType::UInt32 => "uint32_t",
            ObjCType::Int64 => "int64_t",
            ObjCType::UInt64 => "uint64_t",
            ObjCType::Float => "float",
            ObjCType::Double => "double",
            ObjCType::Bool => "BOOL",
            ObjCType::String => "NSString",
            ObjCType::Data => "NSData",
            ObjCType::Message => "GPBMessage",
        }
    }

    /// Runtime array class for repeated fields of this type.
    pub fn array_class(self) -> &'static str {
        match self {
            ObjCType::Int32 => "GPBInt32Array",
            ObjCType::UInt32 => "GPBUInt32Array",
            ObjCType::Int64 => "GPBInt64Array",
            ObjCType::UInt64 => "GPBUInt64Array",
            ObjCType::Float => "GPBFloatArray",
            ObjCType::Double => "GPBDoubleArray",
            ObjCType::Bool => "GPBBoolArray",
            ObjCType::Enum => "GPBEnumArray",
            ObjCType::String | ObjCType::Data | ObjCType::Message => "NSMutableArray",
        }
    }

    /// Component of a `GPB<Key><Value>Dictionary` class name.
    pub fn dictionary_component(self) -> &'static str {
        match self {
            ObjCType::Int32 => "Int32",
            ObjCType::UInt32 => "UInt32",
            ObjCType::Int64 => "Int64",
            ObjCType::UInt64 => "UInt64",
            ObjCType::Float => "Float",
            ObjCType::Double => "Double",
            ObjCType::Bool => "Bool",
            ObjCType::String => "String",
            ObjCType::Enum => "Enum",
            ObjCType::Data | ObjCType::Message => "Object",
        }
    }

    pub fn is_object(self) -> bool {
        matches!(self, ObjCType::String | ObjCType::Data | ObjCType::Message)
    }
}

/// Suffix of the runtime's `GPBDataType` constant.
pub fn gpb_data_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::Double => "Double",
        FieldType::Float => "Float",
        FieldType::Int64 => "Int64",
        FieldType::Uint64 => "UInt64",
        FieldType::Int32 => "Int32",
        FieldType::Fixed64 => "Fixed64",
        FieldType::Fixed32 => "Fixed32",
        FieldType::Bool => "Bool",
        FieldType::String => "String",
        FieldType::Group => "Group",
        FieldType::Message => "Message",
        FieldType::Bytes => "Bytes",
        FieldType::Uint32 => "UInt32",
        FieldType::Enum => "Enum",
        FieldType::Sfixed32 => "SFixed32",
        FieldType::Sfixed64 => "SFixed64",
        FieldType::Sint32 => "SInt32",
        FieldType::Sint64 => "SInt64",
        // Map entries travel as messages
        FieldType::Map => "Message",
    }
}

/// Whether repeated fields of this type may use the packed encoding.
pub fn is_packable(field_type: FieldType) -> bool {
    field_type.is_numeric() || matches!(field_type, FieldType::Bool | FieldType::Enum)
}

/// Size in bytes of the storage slot, used to group the storage struct.
pub fn storage_size(objc_type: ObjCType) -> usize {
    match objc_type {
        ObjCType::Int32 | ObjCType::UInt32 | ObjCType::Float | ObjCType::Enum => 4,
        ObjCType::Bool => 1,
        ObjCType::Int64
        | ObjCType::UInt64
        | ObjCType::Double
        | ObjCType::String
        | ObjCType::Data
        | ObjCType::Message => 8,
    }
}
