//! Emission for one field, from its finalized variables.
//!
//! A [`FieldEmitter`] only exists once the owning message's allocation
//! passes have run, so every template here can rely on `has_index` and the
//! storage offset being present.

use super::description::FieldDescription;
use super::field::FieldGenerator;
use super::policy::{FieldPolicy, ValueShape};
use super::presence::{OneofAssignment, PresenceAssignment};
use super::variables::{VarKey, VariableMap};
use crate::codegen::names;
use crate::codegen::printer::{Printer, PrinterError};

const STORED_IN_HAS_BITS: &str = "  // Stored in _has_storage_ to save space.";

#[derive(Debug)]
pub struct FieldEmitter<'g, 'a> {
    generator: &'g FieldGenerator<'a>,
    variables: VariableMap,
    presence: PresenceAssignment,
    oneof: Option<OneofAssignment>,
}

impl<'g, 'a> FieldEmitter<'g, 'a> {
    pub(crate) fn new(
        generator: &'g FieldGenerator<'a>,
        presence: PresenceAssignment,
        oneof: Option<OneofAssignment>,
    ) -> Self {
        // Oneof members point at the negated slot holding their oneof's case
        let has_index = match oneof {
            Some(assignment) => format!("-{}", assignment.case_slot),
            None => presence.has_bit.to_string(),
        };
        let mut overlay = vec![(VarKey::HasIndex, has_index)];
        if let Some(base) = presence.extra_bits_base {
            overlay.push((VarKey::StorageOffsetValue, base.to_string()));
            overlay.push((VarKey::StorageOffsetComment, STORED_IN_HAS_BITS.to_string()));
        }

        Self {
            generator,
            variables: generator.variables().finalized(overlay),
            presence,
            oneof,
        }
    }

    pub fn generator(&self) -> &'g FieldGenerator<'a> {
        self.generator
    }

    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    pub fn presence(&self) -> PresenceAssignment {
        self.presence
    }

    pub fn oneof(&self) -> Option<OneofAssignment> {
        self.oneof
    }

    fn print(&self, printer: &mut Printer, template: &str) -> Result<(), PrinterError> {
        printer.print(&self.variables, template)
    }

    /// Member of the message's `__storage_` struct.
    pub fn generate_field_storage_declaration(
        &self,
        printer: &mut Printer,
    ) -> Result<(), PrinterError> {
        match self.generator.policy() {
            FieldPolicy::Primitive
            | FieldPolicy::Enum
            | FieldPolicy::OneofMember(ValueShape::Primitive | ValueShape::Enum) => {
                self.print(printer, "$storage_type$ $name$;\n")
            }
            // The value lives in the has bits
            FieldPolicy::Bool | FieldPolicy::OneofMember(ValueShape::Bool) => Ok(()),
            FieldPolicy::Object(_) | FieldPolicy::OneofMember(ValueShape::Object(_)) => {
                self.print(printer, "$storage_type$ *$name$;\n")
            }
            FieldPolicy::Repeated(_) | FieldPolicy::Map => {
                self.print(printer, "$array_storage_type$ *$name$;\n")
            }
        }
    }

    pub fn generate_property_declaration(&self, printer: &mut Printer) -> Result<(), PrinterError> {
        match self.generator.policy() {
            FieldPolicy::Primitive
            | FieldPolicy::Bool
            | FieldPolicy::Enum
            | FieldPolicy::OneofMember(
                ValueShape::Primitive | ValueShape::Bool | ValueShape::Enum,
            ) => {
                self.print(
                    printer,
                    "$comments$@property(nonatomic, readwrite) $property_type$ $name$$deprecated_attribute$;\n\n",
                )?;
                if self.generator.wants_has_property() {
                    self.print(
                        printer,
                        "@property(nonatomic, readwrite) BOOL has$capitalized_name$$deprecated_attribute$;\n",
                    )?;
                }
            }
            FieldPolicy::Object(_) | FieldPolicy::OneofMember(ValueShape::Object(_)) => {
                self.print(
                    printer,
                    "$comments$@property(nonatomic, readwrite, $property_storage_attribute$, null_resettable) $property_type$ *$name$$storage_attribute$$deprecated_attribute$;\n",
                )?;
                if self.generator.wants_has_property() {
                    self.print(
                        printer,
                        "/** Test to see if @c $name$ has been set. */\n@property(nonatomic, readwrite) BOOL has$capitalized_name$$deprecated_attribute$;\n",
                    )?;
                }
                self.emit_init_family_override(printer, "$property_type$")?;
            }
            FieldPolicy::Repeated(_) | FieldPolicy::Map => {
                self.print(printer, "$comments$")?;
                self.emit_array_comment(printer)?;
                self.print(
                    printer,
                    "@property(nonatomic, readwrite, strong, null_resettable) $array_property_type$ *$name$$storage_attribute$$deprecated_attribute$;\n\
                     /** The number of items in @c $name$ without causing the container to be created. */\n\
                     @property(nonatomic, readonly) NSUInteger $name$_Count$deprecated_attribute$;\n",
                )?;
                self.emit_init_family_override(printer, "$array_property_type$")?;
            }
        }
        printer.print_raw("\n");
        Ok(())
    }

    /// Human readable note on what a container holds.
    pub fn emit_array_comment(&self, printer: &mut Printer) -> Result<(), PrinterError> {
        match self.generator.policy() {
            FieldPolicy::Repeated(_) | FieldPolicy::Map => self.print(printer, "$array_comment$"),
            FieldPolicy::Primitive
            | FieldPolicy::Bool
            | FieldPolicy::Enum
            | FieldPolicy::Object(_)
            | FieldPolicy::OneofMember(_) => Ok(()),
        }
    }

    fn emit_init_family_override(
        &self,
        printer: &mut Printer,
        property_type: &str,
    ) -> Result<(), PrinterError> {
        if !names::is_init_name(self.generator.generated_objc_name()) {
            return Ok(());
        }
        self.print(
            printer,
            &format!(
                "- ({} *)$name$ GPB_METHOD_FAMILY_NONE$deprecated_attribute$;\n",
                property_type
            ),
        )
    }

    pub fn generate_property_implementation(
        &self,
        printer: &mut Printer,
    ) -> Result<(), PrinterError> {
        match self.generator.policy() {
            FieldPolicy::Repeated(_) | FieldPolicy::Map => {
                self.print(printer, "@dynamic $name$, $name$_Count;\n")
            }
            FieldPolicy::Primitive
            | FieldPolicy::Bool
            | FieldPolicy::Enum
            | FieldPolicy::Object(_)
            | FieldPolicy::OneofMember(_) => {
                if self.generator.wants_has_property() {
                    self.print(printer, "@dynamic has$capitalized_name$, $name$;\n")
                } else {
                    self.print(printer, "@dynamic $name$;\n")
                }
            }
        }
    }

    pub fn generate_c_function_declarations(
        &self,
        printer: &mut Printer,
    ) -> Result<(), PrinterError> {
        if !self.generator.has_raw_value_functions() {
            return Ok(());
        }
        self.print(
            printer,
            "/**\n\
             \x20* Fetches the raw value of a @c $owning_message_class$'s @c $name$ property, even\n\
             \x20* if the value was not defined by the enum at the time the code was generated.\n\
             \x20**/\n\
             int32_t $owning_message_class$_$capitalized_name$_RawValue($owning_message_class$ *message)$deprecated_attribute$;\n\
             /**\n\
             \x20* Sets the raw value of an @c $owning_message_class$'s @c $name$ property, allowing\n\
             \x20* it to be set to a value that was not defined by the enum at the time the code\n\
             \x20* was generated.\n\
             \x20**/\n\
             void Set$owning_message_class$_$capitalized_name$_RawValue($owning_message_class$ *message, int32_t value)$deprecated_attribute$;\n\
             \n",
        )
    }

    pub fn generate_c_function_implementations(
        &self,
        printer: &mut Printer,
    ) -> Result<(), PrinterError> {
        if !self.generator.has_raw_value_functions() {
            return Ok(());
        }
        self.print(
            printer,
            "int32_t $owning_message_class$_$capitalized_name$_RawValue($owning_message_class$ *message) {\n\
             \x20 GPBDescriptor *descriptor = [$owning_message_class$ descriptor];\n\
             \x20 GPBFieldDescriptor *field = [descriptor fieldWithNumber:$field_number_name$];\n\
             \x20 return GPBGetMessageRawEnumField(message, field);\n\
             }\n\
             \n\
             void Set$owning_message_class$_$capitalized_name$_RawValue($owning_message_class$ *message, int32_t value) {\n\
             \x20 GPBDescriptor *descriptor = [$owning_message_class$ descriptor];\n\
             \x20 GPBFieldDescriptor *field = [descriptor fieldWithNumber:$field_number_name$];\n\
             \x20 GPBSetMessageRawEnumField(message, field, value);\n\
             }\n\
             \n",
        )
    }

    /// Entry for the message's field description table.
    pub fn generate_field_description(
        &self,
        printer: &mut Printer,
        include_default: bool,
    ) -> Result<(), PrinterError> {
        let description = self.field_description()?;
        printer.print_raw(&description.render(include_default));
        Ok(())
    }

    pub fn generate_field_number_constant(
        &self,
        printer: &mut Printer,
    ) -> Result<(), PrinterError> {
        self.print(printer, "$field_number_name$ = $field_number$,\n")
    }

    /// All variables assembled into the runtime metadata record.
    pub fn field_description(&self) -> Result<FieldDescription, PrinterError> {
        let get = |key: VarKey| {
            self.variables
                .get(key)
                .map(str::to_string)
                .ok_or_else(|| PrinterError::UnknownVariable(key.as_str().to_string()))
        };
        Ok(FieldDescription {
            name: get(VarKey::Name)?,
            data_type_specific_name: get(VarKey::DataTypeSpecificName)?,
            data_type_specific_value: get(VarKey::DataTypeSpecificValue)?,
            number: get(VarKey::FieldNumberName)?,
            has_index: get(VarKey::HasIndex)?,
            offset: get(VarKey::StorageOffsetValue)?,
            offset_comment: get(VarKey::StorageOffsetComment)?,
            flags: get(VarKey::FieldFlags)?,
            data_type: get(VarKey::FieldType)?,
            default_name: get(VarKey::DefaultName)?,
            default_value: get(VarKey::Default)?,
            text_format_name: self
                .generator
                .needs_textformat_name_support()
                .then(|| self.generator.raw_field_name().to_string()),
        })
    }
}
