//! Message-level emission: the interface, the storage struct and the
//! runtime descriptor of one message, driven by its field generators.

use super::emitter::FieldEmitter;
use super::error::FieldGenError;
use super::fwd_decls::ForwardDeclaration;
use super::map::FieldGeneratorMap;
use super::presence::HasBitLayout;
use super::variables::VariableMap;
use crate::codegen::escape::{c_escape, doc_comment};
use crate::codegen::names;
use crate::codegen::printer::Printer;
use crate::schema::TypeRegistry;
use proto_types::MessageDescriptor;
use std::collections::BTreeSet;

/// Raw bytes per line of the text format info literal.
const TEXT_FORMAT_CHUNK: usize = 40;

#[derive(Debug)]
pub struct MessageGenerator<'a> {
    descriptor: &'a MessageDescriptor,
    fields: FieldGeneratorMap<'a>,
    root_class: String,
    full_name: String,
    has_storage_words: u32,
}

impl<'a> MessageGenerator<'a> {
    /// Build the field generators and run both allocation passes. The oneof
    /// case slots follow the has bit words.
    pub fn new(
        descriptor: &'a MessageDescriptor,
        registry: &TypeRegistry,
        root_class: &str,
    ) -> Result<Self, FieldGenError> {
        let mut fields = FieldGeneratorMap::new(descriptor, registry)?;
        fields.calculate_has_bits();
        let has_storage_words = fields
            .has_bit_layout()
            .map_or(1, HasBitLayout::storage_words);
        fields.set_oneof_index_base(has_storage_words);

        let full_name = if registry.package().is_empty() {
            descriptor.name.clone()
        } else {
            format!("{}.{}", registry.package(), descriptor.name)
        };

        Ok(Self {
            descriptor,
            fields,
            root_class: root_class.to_string(),
            full_name,
            has_storage_words,
        })
    }

    pub fn classname(&self) -> &str {
        self.fields.classname()
    }

    pub fn fields(&self) -> &FieldGeneratorMap<'a> {
        &self.fields
    }

    /// Length of `_has_storage_`: the has bit words plus one case slot per
    /// oneof.
    pub fn has_storage_size(&self) -> u32 {
        self.has_storage_words + self.descriptor.oneofs.len() as u32
    }

    pub fn determine_forward_declarations(
        &self,
        decls: &mut BTreeSet<ForwardDeclaration>,
        include_external_types: bool,
    ) {
        self.fields
            .determine_forward_declarations(decls, include_external_types);
    }

    pub fn determine_objc_class_definitions(&self, classes: &mut BTreeSet<String>) {
        classes.insert(self.classname().to_string());
        self.fields.determine_objc_class_definitions(classes);
    }

    fn variables(&self) -> VariableMap {
        let with_default = self.fields.does_any_field_have_non_zero_default();
        let description_type = if with_default {
            "GPBMessageFieldDescriptionWithDefault"
        } else {
            "GPBMessageFieldDescription"
        };
        let (fields, field_count) = if self.descriptor.fields.is_empty() {
            ("NULL".to_string(), "0".to_string())
        } else {
            (
                "fields".to_string(),
                format!("(uint32_t)(sizeof(fields) / sizeof({}))", description_type),
            )
        };

        let mut init_flags = vec![
            "GPBDescriptorInitializationFlag_UsesClassRefs",
            "GPBDescriptorInitializationFlag_Proto3OptionalKnown",
            "GPBDescriptorInitializationFlag_ClosedEnumSupportKnown",
        ];
        if with_default {
            init_flags.push("GPBDescriptorInitializationFlag_FieldsWithDefault");
        }

        let deprecated = if self.descriptor.deprecated {
            format!("GPB_DEPRECATED_MSG(\"{} is deprecated.\")\n", self.full_name)
        } else {
            String::new()
        };

        VariableMap::from_pairs([
            ("classname", self.classname().to_string()),
            ("message_name", self.descriptor.name.clone()),
            ("root_class", self.root_class.clone()),
            ("comments", doc_comment(self.descriptor.comment.as_deref())),
            ("deprecated_attribute", deprecated),
            ("has_storage_size", self.has_storage_size().to_string()),
            ("description_type", description_type.to_string()),
            ("fields", fields),
            ("field_count", field_count),
            (
                "init_flags",
                format!("(GPBDescriptorInitializationFlags)({})", init_flags.join(" | ")),
            ),
            ("oneof_base", self.has_storage_words.to_string()),
        ])
    }

    pub fn generate_header(&self, printer: &mut Printer) -> Result<(), FieldGenError> {
        let emitters = self.fields.emitters()?;
        let vars = self.variables();
        let classname = self.classname();

        printer.print(&vars, "#pragma mark - $classname$\n\n")?;

        if !emitters.is_empty() {
            printer.print(&vars, "typedef GPB_ENUM($classname$_FieldNumber) {\n")?;
            printer.with_indent(|p| -> Result<(), FieldGenError> {
                for emitter in &emitters {
                    emitter.generate_field_number_constant(p)?;
                }
                Ok(())
            })?;
            printer.print_raw("};\n\n");
        }

        for (index, oneof) in self.descriptor.oneofs.iter().enumerate() {
            let enum_name = names::oneof_enum_name(classname, &oneof.name);
            printer.print_raw(&format!("typedef GPB_ENUM({}) {{\n", enum_name));
            printer.with_indent(|p| -> Result<(), FieldGenError> {
                p.print_raw(&format!("{}_GPBUnsetOneOfCase = 0,\n", enum_name));
                for member in self.descriptor.oneof_fields(index) {
                    p.print_raw(&format!(
                        "{}_{} = {},\n",
                        enum_name,
                        names::field_name_capitalized(member),
                        member.number
                    ));
                }
                Ok(())
            })?;
            printer.print_raw("};\n\n");
        }

        printer.print(
            &vars,
            "$comments$$deprecated_attribute$GPB_FINAL @interface $classname$ : GPBMessage\n\n",
        )?;
        for oneof in &self.descriptor.oneofs {
            printer.print_raw(&format!(
                "@property(nonatomic, readonly) {} {}OneOfCase;\n\n",
                names::oneof_enum_name(classname, &oneof.name),
                names::oneof_name(&oneof.name)
            ));
        }
        for emitter in &emitters {
            emitter.generate_property_declaration(printer)?;
        }
        printer.print_raw("@end\n\n");

        for emitter in &emitters {
            emitter.generate_c_function_declarations(printer)?;
        }
        for oneof in &self.descriptor.oneofs {
            printer.print_raw(&format!(
                "/**\n * Clears whatever value was set for the oneof '{}'.\n **/\nvoid {}({} *message);\n\n",
                names::oneof_name(&oneof.name),
                clear_oneof_function(classname, &oneof.name),
                classname
            ));
        }
        Ok(())
    }

    pub fn generate_source(&self, printer: &mut Printer) -> Result<(), FieldGenError> {
        let emitters = self.fields.emitters()?;
        let vars = self.variables();
        let classname = self.classname();

        printer.print(&vars, "#pragma mark - $classname$\n\n@implementation $classname$\n\n")?;
        for oneof in &self.descriptor.oneofs {
            printer.print_raw(&format!("@dynamic {}OneOfCase;\n", names::oneof_name(&oneof.name)));
        }
        for emitter in &emitters {
            emitter.generate_property_implementation(printer)?;
        }

        let mut by_storage: Vec<&FieldEmitter<'_, 'a>> = emitters.iter().collect();
        by_storage.sort_by_key(|e| (e.generator().storage_size(), e.generator().descriptor().number));

        printer.print(&vars, "\ntypedef struct $classname$__storage_ {\n")?;
        printer.with_indent(|p| -> Result<(), FieldGenError> {
            p.print(&vars, "uint32_t _has_storage_[$has_storage_size$];\n")?;
            for emitter in &by_storage {
                emitter.generate_field_storage_declaration(p)?;
            }
            Ok(())
        })?;
        printer.print(&vars, "} $classname$__storage_;\n\n")?;

        self.generate_descriptor_method(printer, &vars, &emitters)?;
        printer.print_raw("@end\n\n");

        for (index, oneof) in self.descriptor.oneofs.iter().enumerate() {
            printer.print_raw(&format!(
                "void {}({} *message) {{\n  GPBDescriptor *descriptor = [{} descriptor];\n  GPBOneofDescriptor *oneof = [descriptor.oneofs objectAtIndex:{}];\n  GPBClearOneof(message, oneof);\n}}\n\n",
                clear_oneof_function(classname, &oneof.name),
                classname,
                classname,
                index
            ));
        }
        for emitter in &emitters {
            emitter.generate_c_function_implementations(printer)?;
        }
        Ok(())
    }

    fn generate_descriptor_method(
        &self,
        printer: &mut Printer,
        vars: &VariableMap,
        emitters: &[FieldEmitter<'_, 'a>],
    ) -> Result<(), FieldGenError> {
        let include_default = self.fields.does_any_field_have_non_zero_default();
        let mut by_number: Vec<&FieldEmitter<'_, 'a>> = emitters.iter().collect();
        by_number.sort_by_key(|e| e.generator().descriptor().number);

        printer.print(
            vars,
            "// This method is threadsafe because it is initially called\n\
             // in +initialize for each subclass.\n\
             + (GPBDescriptor *)descriptor {\n",
        )?;
        printer.with_indent(|p| -> Result<(), FieldGenError> {
            p.print_raw("static GPBDescriptor *descriptor = nil;\nif (!descriptor) {\n");
            p.with_indent(|p| -> Result<(), FieldGenError> {
                p.print_raw("GPB_DEBUG_CHECK_RUNTIME_VERSIONS();\n");
                if !by_number.is_empty() {
                    p.print(vars, "static $description_type$ fields[] = {\n")?;
                    p.with_indent(|p| -> Result<(), FieldGenError> {
                        for emitter in &by_number {
                            emitter.generate_field_description(p, include_default)?;
                        }
                        Ok(())
                    })?;
                    p.print_raw("};\n");
                }
                p.print(
                    vars,
                    "GPBDescriptor *localDescriptor =\n\
                     \x20   [GPBDescriptor allocDescriptorForClass:GPBObjCClass($classname$)\n\
                     \x20                              messageName:@\"$message_name$\"\n\
                     \x20                          fileDescription:&$root_class$_FileDescription\n\
                     \x20                                   fields:$fields$\n\
                     \x20                               fieldCount:$field_count$\n\
                     \x20                              storageSize:sizeof($classname$__storage_)\n\
                     \x20                                    flags:$init_flags$];\n",
                )?;
                if !self.descriptor.oneofs.is_empty() {
                    p.print_raw("static const char *oneofs[] = {\n");
                    for oneof in &self.descriptor.oneofs {
                        p.print_raw(&format!("  \"{}\",\n", names::oneof_name(&oneof.name)));
                    }
                    p.print(
                        vars,
                        "};\n\
                         [localDescriptor setupOneofs:oneofs\n\
                         \x20                      count:(uint32_t)(sizeof(oneofs) / sizeof(char*))\n\
                         \x20              firstHasIndex:-$oneof_base$];\n",
                    )?;
                }
                if let Some(info) = self.text_format_info() {
                    p.print_raw(
                        "#if !GPBOBJC_SKIP_MESSAGE_TEXTFORMAT_EXTRAS\n  static const char *extraTextFormatInfo =\n",
                    );
                    let chunks: Vec<&[u8]> = info.chunks(TEXT_FORMAT_CHUNK).collect();
                    for (i, chunk) in chunks.iter().enumerate() {
                        let end = if i + 1 == chunks.len() { ";" } else { "" };
                        p.print_raw(&format!("    \"{}\"{}\n", c_escape(chunk), end));
                    }
                    p.print_raw(
                        "  [localDescriptor setupExtraTextInfo:extraTextFormatInfo];\n#endif  // !GPBOBJC_SKIP_MESSAGE_TEXTFORMAT_EXTRAS\n",
                    );
                }
                p.print_raw(
                    "#if defined(DEBUG) && DEBUG\n  NSAssert(descriptor == nil, @\"Startup recursed!\");\n#endif  // DEBUG\ndescriptor = localDescriptor;\n",
                );
                Ok(())
            })?;
            p.print_raw("}\nreturn descriptor;\n");
            Ok(())
        })?;
        printer.print_raw("}\n\n");
        Ok(())
    }

    /// Names the runtime cannot derive from the generated property names:
    /// a varint entry count, then per field its varint number followed by
    /// the schema name between NUL bytes.
    pub fn text_format_info(&self) -> Option<Vec<u8>> {
        let mut entries: Vec<(u32, &str)> = self
            .fields
            .generators()
            .iter()
            .filter(|g| g.needs_textformat_name_support())
            .map(|g| (g.descriptor().number, g.raw_field_name()))
            .collect();
        if entries.is_empty() {
            return None;
        }
        entries.sort_by_key(|(number, _)| *number);

        let mut data = Vec::new();
        write_varint(&mut data, entries.len() as u32);
        for (number, raw_name) in entries {
            write_varint(&mut data, number);
            data.push(0);
            data.extend_from_slice(raw_name.as_bytes());
            data.push(0);
        }
        Some(data)
    }
}

fn clear_oneof_function(classname: &str, oneof: &str) -> String {
    format!(
        "{}_Clear{}OneOfCase",
        classname,
        names::underscores_to_camel_case(oneof, true)
    )
}

fn write_varint(out: &mut Vec<u8>, mut value: u32) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod message_tests;
