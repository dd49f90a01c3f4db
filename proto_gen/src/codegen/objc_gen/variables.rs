//! Per-field template variables.
//!
//! A [`VariableMap`] is built once from the field's descriptor and then never
//! mutated. Values that depend on message-wide allocation (has-bit index,
//! oneof index, storage offset) are not in the draft map at all: they are
//! layered on top by [`VariableMap::finalized`] once allocation has run, so a
//! template that needs them cannot be printed from the draft.

use indexmap::IndexMap;

/// Keys a field generator defines. Templates spell them as `$key$`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKey {
    Classname,
    OwningMessageClass,
    Name,
    CapitalizedName,
    RawFieldName,
    FieldNumberName,
    FieldNumber,
    FieldType,
    StorageType,
    PropertyType,
    PropertyStorageAttribute,
    StorageAttribute,
    DataTypeSpecificName,
    DataTypeSpecificValue,
    FieldFlags,
    Default,
    DefaultName,
    DeprecatedAttribute,
    Comments,
    ArrayStorageType,
    ArrayPropertyType,
    ArrayComment,
    EnumName,
    HasIndex,
    StorageOffsetValue,
    StorageOffsetComment,
}

impl VarKey {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKey::Classname => "classname",
            VarKey::OwningMessageClass => "owning_message_class",
            VarKey::Name => "name",
            VarKey::CapitalizedName => "capitalized_name",
            VarKey::RawFieldName => "raw_field_name",
            VarKey::FieldNumberName => "field_number_name",
            VarKey::FieldNumber => "field_number",
            VarKey::FieldType => "field_type",
            VarKey::StorageType => "storage_type",
            VarKey::PropertyType => "property_type",
            VarKey::PropertyStorageAttribute => "property_storage_attribute",
            VarKey::StorageAttribute => "storage_attribute",
            VarKey::DataTypeSpecificName => "dataTypeSpecific_name",
            VarKey::DataTypeSpecificValue => "dataTypeSpecific_value",
            VarKey::FieldFlags => "fieldflags",
            VarKey::Default => "default",
            VarKey::DefaultName => "default_name",
            VarKey::DeprecatedAttribute => "deprecated_attribute",
            VarKey::Comments => "comments",
            VarKey::ArrayStorageType => "array_storage_type",
            VarKey::ArrayPropertyType => "array_property_type",
            VarKey::ArrayComment => "array_comment",
            VarKey::EnumName => "enum_name",
            VarKey::HasIndex => "has_index",
            VarKey::StorageOffsetValue => "storage_offset_value",
            VarKey::StorageOffsetComment => "storage_offset_comment",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableMap {
    entries: IndexMap<String, String>,
}

impl VariableMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from string keys; mostly useful for ad hoc templates.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub(crate) fn set(&mut self, key: VarKey, value: impl Into<String>) {
        self.entries.insert(key.as_str().to_string(), value.into());
    }

    pub fn get(&self, key: VarKey) -> Option<&str> {
        self.lookup(key.as_str())
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: VarKey) -> bool {
        self.entries.contains_key(key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// A new map with `overlay` layered over this one. Later keys win.
    pub fn finalized(&self, overlay: impl IntoIterator<Item = (VarKey, String)>) -> Self {
        let mut result = self.clone();
        for (key, value) in overlay {
            result.set(key, value);
        }
        result
    }
}
