//! Per-field generator: the draft record built from a field descriptor.
//!
//! A [`FieldGenerator`] holds everything about a field that can be known
//! without looking at its siblings. Allocation results are kept by the owning
//! [`FieldGeneratorMap`](super::FieldGeneratorMap) and combined with the draft
//! only when a [`FieldEmitter`](super::FieldEmitter) is created.

use super::data_type::{gpb_data_type, is_packable, storage_size, ObjCType};
use super::defaults::{default_name, ResolvedDefault};
use super::error::FieldGenError;
use super::flags::{FieldFlag, FieldFlags};
use super::fwd_decls::ForwardDeclaration;
use super::policy::{FieldPolicy, ObjectKind, PresenceMechanism, ValueShape};
use super::presence::OneofAssignment;
use super::variables::{VarKey, VariableMap};
use crate::codegen::escape::doc_comment;
use crate::codegen::names;
use crate::schema::{TypeCategory, TypeEntry, TypeRegistry};
use proto_types::{Cardinality, FieldDescriptor, FieldType, Syntax};
use std::collections::BTreeSet;

/// Position of a field inside its oneof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneofMembership {
    pub name: String,
    /// Declaration index of the oneof within its message.
    pub group_index: u32,
    /// Declaration index of the field within the oneof.
    pub position: u32,
}

/// A named type a field's declaration mentions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    pub objc_name: String,
    pub category: TypeCategory,
    pub external: bool,
}

/// Message-level facts a field generator needs while it is built.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'r> {
    pub message_name: &'r str,
    pub classname: &'r str,
    pub registry: &'r TypeRegistry,
}

#[derive(Debug)]
pub struct FieldGenerator<'a> {
    descriptor: &'a FieldDescriptor,
    policy: FieldPolicy,
    variables: VariableMap,
    oneof: Option<OneofMembership>,
    referenced_type: Option<TypeReference>,
    has_non_zero_default: bool,
    has_presence: bool,
    open_enum: bool,
}

impl<'a> FieldGenerator<'a> {
    pub fn new(
        descriptor: &'a FieldDescriptor,
        policy: FieldPolicy,
        oneof: Option<OneofMembership>,
        ctx: &FieldContext<'_>,
    ) -> Result<Self, FieldGenError> {
        let entry = resolve_referenced_type(descriptor, policy, ctx)?;
        let enum_entry = entry.filter(|e| e.category == TypeCategory::Enum);

        let default = ResolvedDefault::resolve(descriptor, enum_entry).map_err(|err| {
            FieldGenError::InvalidDefault {
                message: ctx.message_name.to_string(),
                field: descriptor.name.clone(),
                reason: err.to_string(),
            }
        })?;

        let has_non_zero_default = match policy {
            FieldPolicy::Primitive
            | FieldPolicy::Bool
            | FieldPolicy::Enum
            | FieldPolicy::Object(_) => default.is_non_zero(),
            FieldPolicy::Repeated(_) | FieldPolicy::Map | FieldPolicy::OneofMember(_) => false,
        };
        let has_presence = match policy {
            FieldPolicy::Repeated(_) | FieldPolicy::Map => false,
            FieldPolicy::OneofMember(_) | FieldPolicy::Object(ObjectKind::Message) => true,
            FieldPolicy::Primitive
            | FieldPolicy::Bool
            | FieldPolicy::Enum
            | FieldPolicy::Object(_) => {
                ctx.registry.syntax() == Syntax::Proto2 || descriptor.proto3_optional
            }
        };
        let open_enum = policy.single_value_shape() == Some(ValueShape::Enum)
            && enum_entry.is_some_and(|e| !e.closed);

        let mut generator = Self {
            descriptor,
            policy,
            variables: VariableMap::new(),
            oneof,
            referenced_type: entry.map(|e| TypeReference {
                objc_name: e.objc_name.clone(),
                category: e.category,
                external: e.external,
            }),
            has_non_zero_default,
            has_presence,
            open_enum,
        };
        generator.set_common_variables(ctx, entry, &default);
        generator.set_policy_variables();
        generator.finish_initialization();
        Ok(generator)
    }

    fn set_common_variables(
        &mut self,
        ctx: &FieldContext<'_>,
        entry: Option<&TypeEntry>,
        default: &ResolvedDefault,
    ) {
        let descriptor = self.descriptor;
        let name = names::field_name(descriptor);
        let capitalized_name = names::capitalize(&name);

        // Groups are named after their message type on the wire
        let raw_field_name = match (descriptor.field_type, entry) {
            (FieldType::Group, Some(entry)) => entry.name.clone(),
            _ => descriptor.name.clone(),
        };
        let needs_custom_name = names::un_camel_case_field_name(&name, descriptor) != raw_field_name;

        let flags = self.field_flags(ctx.registry.syntax(), needs_custom_name, entry);

        let (specific_name, specific_value) = match entry {
            Some(e) if e.category == TypeCategory::Enum => {
                ("enumDescFunc", format!("{}_EnumDescriptor", e.objc_name))
            }
            Some(e) => ("clazz", format!("GPBObjCClass({})", e.objc_name)),
            None => ("clazz", "Nil".to_string()),
        };

        let deprecated_attribute = if descriptor.deprecated {
            let package = ctx.registry.package();
            let full_name = if package.is_empty() {
                format!("{}.{}", ctx.message_name, descriptor.name)
            } else {
                format!("{}.{}.{}", package, ctx.message_name, descriptor.name)
            };
            format!(" GPB_DEPRECATED_MSG(\"{} is deprecated.\")", full_name)
        } else {
            String::new()
        };

        let field_type = gpb_data_type(self.value_type());

        let vars = &mut self.variables;
        vars.set(VarKey::Classname, ctx.classname);
        vars.set(VarKey::OwningMessageClass, ctx.classname);
        vars.set(
            VarKey::FieldNumberName,
            names::field_number_name(ctx.classname, &capitalized_name),
        );
        vars.set(
            VarKey::StorageOffsetValue,
            format!("(uint32_t)offsetof({}__storage_, {})", ctx.classname, name),
        );
        vars.set(VarKey::StorageOffsetComment, "");
        vars.set(VarKey::Name, name);
        vars.set(VarKey::CapitalizedName, capitalized_name);
        vars.set(VarKey::RawFieldName, raw_field_name);
        vars.set(VarKey::FieldNumber, descriptor.number.to_string());
        vars.set(VarKey::FieldType, field_type);
        vars.set(VarKey::FieldFlags, flags.to_string());
        vars.set(VarKey::Default, default.render());
        vars.set(VarKey::DefaultName, default_name(descriptor));
        vars.set(VarKey::DataTypeSpecificName, specific_name);
        vars.set(VarKey::DataTypeSpecificValue, specific_value);
        vars.set(VarKey::DeprecatedAttribute, deprecated_attribute);
        vars.set(
            VarKey::Comments,
            doc_comment(descriptor.comment.as_deref()),
        );
    }

    fn field_flags(
        &self,
        syntax: Syntax,
        needs_custom_name: bool,
        entry: Option<&TypeEntry>,
    ) -> FieldFlags {
        let descriptor = self.descriptor;
        let mut flags = FieldFlags::default();

        match (&self.policy, &descriptor.map) {
            (FieldPolicy::Map, Some(map)) => {
                flags.insert(FieldFlag::MapKey(gpb_data_type(map.key)));
            }
            _ => match descriptor.cardinality {
                Cardinality::Repeated => {
                    flags.insert(FieldFlag::Repeated);
                    let packed = descriptor.packed.unwrap_or(syntax == Syntax::Proto3);
                    if packed && is_packable(descriptor.field_type) {
                        flags.insert(FieldFlag::Packed);
                    }
                }
                Cardinality::Required => flags.insert(FieldFlag::Required),
                Cardinality::Optional => flags.insert(FieldFlag::Optional),
            },
        }

        if self.has_non_zero_default {
            flags.insert(FieldFlag::HasDefaultValue);
        }
        if needs_custom_name {
            flags.insert(FieldFlag::TextFormatNameCustom);
        }
        if let Some(e) = entry.filter(|e| e.category == TypeCategory::Enum) {
            flags.insert(FieldFlag::HasEnumDescriptor);
            if e.closed {
                flags.insert(FieldFlag::ClosedEnum);
            }
        }
        if !descriptor.is_repeated() && !self.has_presence {
            flags.insert(FieldFlag::ClearHasIvarOnZero);
        }
        flags
    }

    fn set_policy_variables(&mut self) {
        match self.policy {
            FieldPolicy::Primitive => self.set_value_variables(ValueShape::Primitive),
            FieldPolicy::Bool => self.set_value_variables(ValueShape::Bool),
            FieldPolicy::Enum => self.set_value_variables(ValueShape::Enum),
            FieldPolicy::Object(kind) => self.set_value_variables(ValueShape::Object(kind)),
            FieldPolicy::OneofMember(shape) => self.set_value_variables(shape),
            FieldPolicy::Repeated(_) | FieldPolicy::Map => {
                let storage_attribute = self.storage_attribute();
                let enum_name = self
                    .referenced_type
                    .as_ref()
                    .filter(|r| r.category == TypeCategory::Enum)
                    .map(|r| r.objc_name.clone());
                let vars = &mut self.variables;
                vars.set(VarKey::PropertyStorageAttribute, "strong");
                vars.set(VarKey::StorageAttribute, storage_attribute);
                if let Some(enum_name) = enum_name {
                    vars.set(VarKey::EnumName, enum_name);
                }
            }
        }
    }

    fn set_value_variables(&mut self, shape: ValueShape) {
        let spelling = self.element_spelling();
        let storage_attribute = self.storage_attribute();
        let vars = &mut self.variables;
        vars.set(VarKey::StorageType, spelling.clone());
        vars.set(VarKey::PropertyType, spelling.clone());
        match shape {
            ValueShape::Primitive | ValueShape::Bool => {}
            ValueShape::Enum => vars.set(VarKey::EnumName, spelling),
            ValueShape::Object(kind) => {
                let attribute = match kind {
                    ObjectKind::String | ObjectKind::Bytes => "copy",
                    ObjectKind::Message => "strong",
                };
                vars.set(VarKey::PropertyStorageAttribute, attribute);
                vars.set(VarKey::StorageAttribute, storage_attribute);
            }
        }
    }

    /// Container variables, set once the rest of the draft is in place.
    fn finish_initialization(&mut self) {
        match self.policy {
            FieldPolicy::Repeated(shape) => {
                let objc = ObjCType::of(self.descriptor.field_type);
                let storage = objc.array_class();
                let property = if objc.is_object() {
                    format!("{}<{}*>", storage, self.element_spelling())
                } else {
                    storage.to_string()
                };
                let comment = match shape {
                    ValueShape::Enum => self.array_comment("contains"),
                    ValueShape::Primitive | ValueShape::Bool | ValueShape::Object(_) => {
                        String::new()
                    }
                };
                self.set_container_variables(storage.to_string(), property, comment);
            }
            FieldPolicy::Map => {
                let Some(map) = &self.descriptor.map else {
                    return;
                };
                let key = ObjCType::of(map.key);
                let value = ObjCType::of(map.value);
                let element = self.element_spelling();
                let (storage, property) = if key == ObjCType::String && value.is_object() {
                    let storage = "NSMutableDictionary".to_string();
                    let property = format!("{}<NSString*, {}*>", storage, element);
                    (storage, property)
                } else {
                    let storage = format!(
                        "GPB{}{}Dictionary",
                        key.dictionary_component(),
                        value.dictionary_component()
                    );
                    let property = if value.is_object() {
                        format!("{}<{}*>", storage, element)
                    } else {
                        storage.clone()
                    };
                    (storage, property)
                };
                let comment = if value == ObjCType::Enum {
                    self.array_comment("values are")
                } else {
                    String::new()
                };
                self.set_container_variables(storage, property, comment);
            }
            FieldPolicy::Primitive
            | FieldPolicy::Bool
            | FieldPolicy::Enum
            | FieldPolicy::Object(_)
            | FieldPolicy::OneofMember(_) => {}
        }
    }

    fn set_container_variables(&mut self, storage: String, property: String, comment: String) {
        self.variables.set(VarKey::ArrayStorageType, storage);
        self.variables.set(VarKey::ArrayPropertyType, property);
        self.variables.set(VarKey::ArrayComment, comment);
    }

    fn array_comment(&self, verb: &str) -> String {
        let enum_name = self.variables.get(VarKey::EnumName).unwrap_or("int32_t");
        format!(
            "// |{}| {} |{}|\n",
            names::field_name(self.descriptor),
            verb,
            enum_name
        )
    }

    /// Type of a single stored value: the field type, or the map value type.
    pub fn value_type(&self) -> FieldType {
        match (&self.policy, &self.descriptor.map) {
            (FieldPolicy::Map, Some(map)) => map.value,
            _ => self.descriptor.field_type,
        }
    }

    fn element_spelling(&self) -> String {
        let objc = ObjCType::of(self.value_type());
        match (&self.referenced_type, objc) {
            (Some(reference), ObjCType::Enum | ObjCType::Message) => reference.objc_name.clone(),
            _ => objc.spelling().to_string(),
        }
    }

    fn storage_attribute(&self) -> &'static str {
        if names::is_retained_name(&names::field_name(self.descriptor)) {
            " NS_RETURNS_NOT_RETAINED"
        } else {
            ""
        }
    }

    pub fn descriptor(&self) -> &'a FieldDescriptor {
        self.descriptor
    }

    pub fn policy(&self) -> FieldPolicy {
        self.policy
    }

    /// Draft variables; allocation-dependent keys are absent.
    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    pub fn oneof(&self) -> Option<&OneofMembership> {
        self.oneof.as_ref()
    }

    pub fn referenced_type(&self) -> Option<&TypeReference> {
        self.referenced_type.as_ref()
    }

    pub fn generated_objc_name(&self) -> &str {
        self.variables.get(VarKey::Name).unwrap_or_default()
    }

    pub fn raw_field_name(&self) -> &str {
        self.variables.get(VarKey::RawFieldName).unwrap_or_default()
    }

    pub fn needs_textformat_name_support(&self) -> bool {
        self.variables
            .get(VarKey::FieldFlags)
            .is_some_and(|flags| flags.contains("GPBFieldTextFormatNameCustom"))
    }

    pub fn runtime_uses_has_bit(&self) -> bool {
        self.policy.runtime_uses_has_bit()
    }

    pub fn extra_runtime_has_bits_needed(&self) -> u32 {
        self.policy.extra_runtime_has_bits_needed()
    }

    /// Oneof placement for a given oneof index base; `None` outside oneofs.
    pub fn oneof_assignment(&self, index_base: u32) -> Option<OneofAssignment> {
        self.oneof.as_ref().map(|oneof| OneofAssignment {
            index: index_base + oneof.position,
            case_slot: index_base + oneof.group_index,
        })
    }

    /// Whether the field exposes a `has<Name>` property.
    pub fn wants_has_property(&self) -> bool {
        match self.policy.presence() {
            PresenceMechanism::HasBit | PresenceMechanism::NullCheck => self.has_presence,
            PresenceMechanism::Count | PresenceMechanism::OneofCase => false,
        }
    }

    pub fn has_non_zero_default(&self) -> bool {
        self.has_non_zero_default
    }

    /// Open enums expose raw value accessors as C functions.
    pub fn has_raw_value_functions(&self) -> bool {
        self.open_enum
    }

    /// Bytes of storage in the message struct; `None` when the value lives
    /// in the has bits.
    pub fn storage_size(&self) -> Option<usize> {
        match self.policy {
            FieldPolicy::Bool | FieldPolicy::OneofMember(ValueShape::Bool) => None,
            FieldPolicy::Repeated(_) | FieldPolicy::Map => Some(8),
            FieldPolicy::Primitive
            | FieldPolicy::Enum
            | FieldPolicy::Object(_)
            | FieldPolicy::OneofMember(_) => Some(storage_size(ObjCType::of(self.value_type()))),
        }
    }

    /// Types this field's declaration mentions and that must be declared
    /// before it. External types are only included when asked for.
    pub fn forward_declarations(&self, include_external_types: bool) -> BTreeSet<ForwardDeclaration> {
        let mut decls = BTreeSet::new();
        let Some(reference) = &self.referenced_type else {
            return decls;
        };
        match reference.category {
            TypeCategory::Message => {
                if include_external_types || !reference.external {
                    decls.insert(ForwardDeclaration::Class(reference.objc_name.clone()));
                }
            }
            // Local enums are emitted ahead of every message in the header
            TypeCategory::Enum => {
                let names_enum = self.policy.single_value_shape() == Some(ValueShape::Enum);
                if names_enum && include_external_types && reference.external {
                    decls.insert(ForwardDeclaration::Enum(reference.objc_name.clone()));
                }
            }
        }
        decls
    }

    pub fn determine_forward_declarations(
        &self,
        decls: &mut BTreeSet<ForwardDeclaration>,
        include_external_types: bool,
    ) {
        decls.extend(self.forward_declarations(include_external_types));
    }

    /// Message classes whose class object the field's metadata refers to.
    pub fn objc_class_definitions(&self) -> BTreeSet<String> {
        self.referenced_type
            .iter()
            .filter(|r| r.category == TypeCategory::Message)
            .map(|r| r.objc_name.clone())
            .collect()
    }

    pub fn determine_objc_class_definitions(&self, classes: &mut BTreeSet<String>) {
        classes.extend(self.objc_class_definitions());
    }
}

fn resolve_referenced_type<'r>(
    descriptor: &FieldDescriptor,
    policy: FieldPolicy,
    ctx: &FieldContext<'r>,
) -> Result<Option<&'r TypeEntry>, FieldGenError> {
    let (value_type, type_name) = match (policy, &descriptor.map) {
        (FieldPolicy::Map, Some(map)) => (map.value, map.value_type_name.as_deref()),
        _ => (descriptor.field_type, descriptor.type_name.as_deref()),
    };
    let expected = match value_type {
        FieldType::Message | FieldType::Group => TypeCategory::Message,
        FieldType::Enum => TypeCategory::Enum,
        _ => return Ok(None),
    };

    let unresolved = |type_name: &str| FieldGenError::UnresolvedType {
        message: ctx.message_name.to_string(),
        field: descriptor.name.clone(),
        type_name: type_name.to_string(),
    };
    let type_name = type_name.ok_or_else(|| unresolved("<missing type-name>"))?;
    ctx.registry
        .resolve(type_name)
        .filter(|entry| entry.category == expected)
        .map(Some)
        .ok_or_else(|| unresolved(type_name))
}

#[cfg(test)]
#[path = "field_tests.rs"]
mod field_tests;
