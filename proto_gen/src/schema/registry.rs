//! Name resolution for the types a schema file can mention.
//!
//! Every message and enum declared in the file is registered as local; names
//! listed under `imports` are registered as external. The code generator asks
//! the registry for the Objective-C spelling of a referenced type and whether
//! that type belongs to the current generation unit.

use super::file::SchemaError;
use crate::codegen::names;
use proto_types::{EnumValueDescriptor, FileDescriptor, Syntax};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Message,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    pub name: String,
    pub package: String,
    pub objc_name: String,
    pub category: TypeCategory,
    /// Declared in another schema file.
    pub external: bool,
    /// Only meaningful for enums.
    pub closed: bool,
    /// Enum values; empty for messages and for external enums.
    pub values: Vec<EnumValueDescriptor>,
}

impl TypeEntry {
    /// Objective-C name of the enum value with the given schema name.
    pub fn enum_value_name(&self, value: &str) -> String {
        names::enum_value_name(&self.objc_name, value)
    }
}

#[derive(Debug, Clone)]
pub struct TypeRegistry {
    package: String,
    class_prefix: String,
    syntax: Syntax,
    types: BTreeMap<String, TypeEntry>,
}

impl TypeRegistry {
    pub fn from_file(file: &FileDescriptor) -> Result<Self, SchemaError> {
        let class_prefix = file.objc_class_prefix.clone().unwrap_or_default();
        let mut registry = Self {
            package: file.package.clone(),
            class_prefix: class_prefix.clone(),
            syntax: file.syntax,
            types: BTreeMap::new(),
        };

        for message in &file.messages {
            registry.insert(TypeEntry {
                name: message.name.clone(),
                package: file.package.clone(),
                objc_name: names::class_name(&class_prefix, &message.name),
                category: TypeCategory::Message,
                external: false,
                closed: false,
                values: Vec::new(),
            })?;
        }
        for enum_type in &file.enums {
            registry.insert(TypeEntry {
                name: enum_type.name.clone(),
                package: file.package.clone(),
                objc_name: names::enum_name(&class_prefix, &enum_type.name),
                category: TypeCategory::Enum,
                external: false,
                closed: enum_type.is_closed(file.syntax),
                values: enum_type.values.clone(),
            })?;
        }

        for import in &file.imports {
            let prefix = import.objc_class_prefix.clone().unwrap_or_default();
            for message in &import.messages {
                registry.insert(TypeEntry {
                    name: message.clone(),
                    package: import.package.clone(),
                    objc_name: names::class_name(&prefix, message),
                    category: TypeCategory::Message,
                    external: true,
                    closed: false,
                    values: Vec::new(),
                })?;
            }
            for imported in &import.enums {
                registry.insert(TypeEntry {
                    name: imported.name().to_string(),
                    package: import.package.clone(),
                    objc_name: names::enum_name(&prefix, imported.name()),
                    category: TypeCategory::Enum,
                    external: true,
                    closed: import.syntax == Syntax::Proto2,
                    values: imported.values().to_vec(),
                })?;
            }
        }

        Ok(registry)
    }

    fn insert(&mut self, entry: TypeEntry) -> Result<(), SchemaError> {
        if self.types.contains_key(&entry.name) {
            return Err(SchemaError::DuplicateType {
                package: entry.package,
                name: entry.name,
            });
        }
        self.types.insert(entry.name.clone(), entry);
        Ok(())
    }

    /// Look up a type by its simple name or its package-qualified name.
    pub fn resolve(&self, name: &str) -> Option<&TypeEntry> {
        let name = name.strip_prefix('.').unwrap_or(name);
        if let Some(entry) = self.types.get(name) {
            return Some(entry);
        }
        let (package, simple) = name.rsplit_once('.')?;
        self.types
            .get(simple)
            .filter(|entry| entry.package == package)
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn class_prefix(&self) -> &str {
        &self.class_prefix
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn class_name(&self, message_name: &str) -> String {
        names::class_name(&self.class_prefix, message_name)
    }
}
