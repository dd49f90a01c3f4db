use crate::types::{Cardinality, DefaultValue, FieldType, Syntax};
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct MapEntry {
    pub key: FieldType,
    pub value: FieldType,
    /// Message or enum name when `value` refers to a named type.
    #[serde(default)]
    pub value_type_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FieldDescriptor {
    pub name: String,
    pub number: u32,
    #[serde(rename = "kind")]
    pub field_type: FieldType,
    #[serde(default)]
    pub cardinality: Cardinality,
    /// Message, group or enum name for fields that refer to another type.
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub map: Option<MapEntry>,
    /// Name of the owning oneof, if any.
    #[serde(default)]
    pub oneof: Option<String>,
    /// Absent means the zero value of the field type.
    #[serde(default)]
    pub default: Option<DefaultValue>,
    #[serde(default)]
    pub extension: bool,
    /// `optional` keyword on a proto3 singular field (explicit presence).
    #[serde(default)]
    pub proto3_optional: bool,
    #[serde(default)]
    pub packed: Option<bool>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

impl FieldDescriptor {
    /// Singular field with no type reference, oneof, or default.
    pub fn new(name: impl Into<String>, number: u32, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            number,
            field_type,
            cardinality: Cardinality::Optional,
            type_name: None,
            map: None,
            oneof: None,
            default: None,
            extension: false,
            proto3_optional: false,
            packed: None,
            deprecated: false,
            comment: None,
        }
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }

    pub fn is_required(&self) -> bool {
        self.cardinality == Cardinality::Required
    }

    pub fn is_map(&self) -> bool {
        self.field_type == FieldType::Map
    }

    pub fn in_oneof(&self) -> bool {
        self.oneof.is_some()
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct OneofDescriptor {
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct MessageDescriptor {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub oneofs: Vec<OneofDescriptor>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

impl MessageDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Declaration index of the named oneof.
    pub fn oneof_index(&self, name: &str) -> Option<usize> {
        self.oneofs.iter().position(|o| o.name == name)
    }

    /// Members of the oneof at `index`, in declaration order.
    pub fn oneof_fields(&self, index: usize) -> impl Iterator<Item = &FieldDescriptor> {
        let name = self.oneofs.get(index).map(|o| o.name.as_str());
        self.fields
            .iter()
            .filter(move |f| name.is_some() && f.oneof.as_deref() == name)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumValueDescriptor {
    pub name: String,
    pub number: i32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumDescriptor {
    pub name: String,
    pub values: Vec<EnumValueDescriptor>,
    /// Closed enums reject unknown values; defaults to closed for proto2 files.
    #[serde(default)]
    pub closed: Option<bool>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl EnumDescriptor {
    pub fn is_closed(&self, syntax: Syntax) -> bool {
        self.closed.unwrap_or(syntax == Syntax::Proto2)
    }

    pub fn value(&self, name: &str) -> Option<&EnumValueDescriptor> {
        self.values.iter().find(|v| v.name == name)
    }
}

/// An enum declared in another schema file, either by bare name or with its values.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(untagged)]
pub enum ImportedEnum {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        values: Vec<EnumValueDescriptor>,
    },
}

impl ImportedEnum {
    pub fn name(&self) -> &str {
        match self {
            ImportedEnum::Name(name) | ImportedEnum::Detailed { name, .. } => name,
        }
    }

    /// Empty when the enum was imported by name only.
    pub fn values(&self) -> &[EnumValueDescriptor] {
        match self {
            ImportedEnum::Name(_) => &[],
            ImportedEnum::Detailed { values, .. } => values,
        }
    }
}

/// Types made visible by another schema file. Messages are known by name only.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ImportedFile {
    pub package: String,
    #[serde(default)]
    pub objc_class_prefix: Option<String>,
    #[serde(default)]
    pub syntax: Syntax,
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub enums: Vec<ImportedEnum>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FileDescriptor {
    pub package: String,
    #[serde(default)]
    pub objc_class_prefix: Option<String>,
    #[serde(default)]
    pub syntax: Syntax,
    #[serde(default)]
    pub imports: Vec<ImportedFile>,
    #[serde(default)]
    pub messages: Vec<MessageDescriptor>,
    #[serde(default)]
    pub enums: Vec<EnumDescriptor>,
}

impl FileDescriptor {
    pub fn message(&self, name: &str) -> Option<&MessageDescriptor> {
        self.messages.iter().find(|m| m.name == name)
    }

    pub fn enum_type(&self, name: &str) -> Option<&EnumDescriptor> {
        self.enums.iter().find(|e| e.name == name)
    }
}
