//! Enum declarations and their runtime descriptor functions.

use super::variables::VariableMap;
use crate::codegen::escape::{c_escape, doc_comment};
use crate::codegen::names;
use crate::codegen::printer::{Printer, PrinterError};
use crate::schema::TypeRegistry;
use proto_types::EnumDescriptor;

#[derive(Debug)]
pub struct EnumGenerator<'a> {
    descriptor: &'a EnumDescriptor,
    objc_name: String,
    closed: bool,
}

impl<'a> EnumGenerator<'a> {
    pub fn new(descriptor: &'a EnumDescriptor, registry: &TypeRegistry) -> Self {
        Self {
            descriptor,
            objc_name: names::enum_name(registry.class_prefix(), &descriptor.name),
            closed: descriptor.is_closed(registry.syntax()),
        }
    }

    pub fn objc_name(&self) -> &str {
        &self.objc_name
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn variables(&self) -> VariableMap {
        VariableMap::from_pairs([
            ("name", self.objc_name.clone()),
            ("comments", doc_comment(self.descriptor.comment.as_deref())),
        ])
    }

    pub fn generate_header(&self, printer: &mut Printer) -> Result<(), PrinterError> {
        let vars = self.variables();
        printer.print(
            &vars,
            "#pragma mark - Enum $name$\n\n$comments$typedef GPB_ENUM($name$) {\n",
        )?;
        printer.with_indent(|p| -> Result<(), PrinterError> {
            if !self.closed {
                p.print(
                    &vars,
                    "/**\n\
                     \x20* Value used if any message's field encounters a value that is not defined\n\
                     \x20* by this enum. The message will also have C functions to get/set the rawValue\n\
                     \x20* of the field.\n\
                     \x20**/\n\
                     $name$_GPBUnrecognizedEnumeratorValue = kGPBUnrecognizedEnumeratorValue,\n",
                )?;
            }
            for value in &self.descriptor.values {
                p.print_raw(&format!(
                    "{} = {},\n",
                    names::enum_value_name(&self.objc_name, &value.name),
                    value.number
                ));
            }
            Ok(())
        })?;
        printer.print(
            &vars,
            "};\n\
             \n\
             GPBEnumDescriptor *$name$_EnumDescriptor(void);\n\
             \n\
             /**\n\
             \x20* Checks to see if the given value is defined by the enum or was not known at\n\
             \x20* the time this source was generated.\n\
             \x20**/\n\
             BOOL $name$_IsValidValue(int32_t value);\n\
             \n",
        )
    }

    pub fn generate_source(&self, printer: &mut Printer) -> Result<(), PrinterError> {
        let mut value_names = Vec::new();
        for value in &self.descriptor.values {
            value_names.extend(names::underscores_to_camel_case(&value.name, true).into_bytes());
            value_names.push(0);
        }
        let flags = if self.closed {
            "GPBEnumDescriptorInitializationFlag_IsClosed"
        } else {
            "GPBEnumDescriptorInitializationFlag_None"
        };
        let vars = VariableMap::from_pairs([
            ("name", self.objc_name.clone()),
            ("value_names", c_escape(&value_names)),
            ("flags", flags.to_string()),
        ]);

        printer.print(
            &vars,
            "#pragma mark - Enum $name$\n\
             \n\
             GPBEnumDescriptor *$name$_EnumDescriptor(void) {\n\
             \x20 static _Atomic(GPBEnumDescriptor*) descriptor = nil;\n\
             \x20 if (!descriptor) {\n\
             \x20   GPB_DEBUG_CHECK_RUNTIME_VERSIONS();\n\
             \x20   static const char *valueNames =\n\
             \x20       \"$value_names$\";\n\
             \x20   static const int32_t values[] = {\n",
        )?;
        for value in &self.descriptor.values {
            printer.print_raw(&format!(
                "        {},\n",
                names::enum_value_name(&self.objc_name, &value.name)
            ));
        }
        printer.print(
            &vars,
            "\x20   };\n\
             \x20   GPBEnumDescriptor *worker =\n\
             \x20       [GPBEnumDescriptor allocDescriptorForName:GPBNSStringifySymbol($name$)\n\
             \x20                                      valueNames:valueNames\n\
             \x20                                          values:values\n\
             \x20                                           count:(uint32_t)(sizeof(values) / sizeof(int32_t))\n\
             \x20                                    enumVerifier:$name$_IsValidValue\n\
             \x20                                           flags:$flags$];\n\
             \x20   GPBEnumDescriptor *expected = nil;\n\
             \x20   if (!atomic_compare_exchange_strong(&descriptor, &expected, worker)) {\n\
             \x20     [worker release];\n\
             \x20   }\n\
             \x20 }\n\
             \x20 return descriptor;\n\
             }\n\
             \n\
             BOOL $name$_IsValidValue(int32_t value__) {\n\
             \x20 switch (value__) {\n",
        )?;
        for value in &self.descriptor.values {
            printer.print_raw(&format!(
                "    case {}:\n",
                names::enum_value_name(&self.objc_name, &value.name)
            ));
        }
        printer.print(
            &vars,
            "\x20     return YES;\n\
             \x20   default:\n\
             \x20     return NO;\n\
             \x20 }\n\
             }\n\
             \n",
        )
    }
}
