use crate::codegen::names;
use crate::codegen::objc_gen::{EnumGenerator, FieldGenError, ForwardDeclaration, MessageGenerator};
use crate::codegen::printer::{Printer, PrinterError};
use crate::schema::{SchemaError, SchemaFile, TypeRegistry};
use proto_types::{FileDescriptor, Syntax};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Field(#[from] FieldGenError),

    #[error(transparent)]
    Printer(#[from] PrinterError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Clone)]
pub struct ObjCCodeGeneratorOptions {
    pub output_dir: String,
    pub emit_header: bool,
    pub emit_source: bool,
    /// Forward declare types that come from imported files instead of
    /// leaving them to the importing headers.
    pub include_external_types: bool,
    /// Replaces the schema's `objc-class-prefix`.
    pub class_prefix: Option<String>,
}

impl Default for ObjCCodeGeneratorOptions {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            emit_header: true,
            emit_source: true,
            include_external_types: false,
            class_prefix: None,
        }
    }
}

pub struct ObjCCodeGenerator {
    options: ObjCCodeGeneratorOptions,
}

impl ObjCCodeGenerator {
    pub fn new(options: ObjCCodeGeneratorOptions) -> Self {
        Self { options }
    }

    /// Render the `.pbobjc.h` / `.pbobjc.m` pair for one schema file.
    pub fn generate(&self, schema: &SchemaFile) -> Result<Vec<GeneratedFile>, CodegenError> {
        let mut file = schema.descriptor.clone();
        if let Some(prefix) = &self.options.class_prefix {
            file.objc_class_prefix = Some(prefix.clone());
        }
        let registry = TypeRegistry::from_file(&file)?;

        let stem = schema.output_stem();
        let root_class = root_class_name(registry.class_prefix(), &stem);
        let source_name = schema
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<inline>".to_string());

        let enums: Vec<EnumGenerator<'_>> = file
            .enums
            .iter()
            .map(|e| EnumGenerator::new(e, &registry))
            .collect();
        let messages = file
            .messages
            .iter()
            .map(|m| MessageGenerator::new(m, &registry, &root_class))
            .collect::<Result<Vec<_>, _>>()?;

        let unit = FileUnit {
            file: &file,
            stem: &stem,
            root_class: &root_class,
            source_name: &source_name,
            enums: &enums,
            messages: &messages,
        };

        let out_dir = PathBuf::from(&self.options.output_dir);
        let mut outputs = Vec::new();
        if self.options.emit_header {
            outputs.push(GeneratedFile {
                path: out_dir.join(format!("{}.pbobjc.h", stem)),
                contents: unit.header(self.options.include_external_types)?,
            });
        }
        if self.options.emit_source {
            outputs.push(GeneratedFile {
                path: out_dir.join(format!("{}.pbobjc.m", stem)),
                contents: unit.source()?,
            });
        }

        tracing::info!(
            "generated {} ({} messages, {} enums)",
            stem,
            messages.len(),
            enums.len()
        );
        Ok(outputs)
    }

    pub fn write(&self, files: &[GeneratedFile]) -> Result<(), CodegenError> {
        let out_dir = PathBuf::from(&self.options.output_dir);
        fs::create_dir_all(&out_dir).map_err(|source| CodegenError::Write {
            path: out_dir.clone(),
            source,
        })?;
        for file in files {
            fs::write(&file.path, &file.contents).map_err(|source| CodegenError::Write {
                path: file.path.clone(),
                source,
            })?;
            tracing::debug!("wrote {}", file.path.display());
        }
        Ok(())
    }

    /// Generate and write; returns the paths written.
    pub fn emit_code(&self, schema: &SchemaFile) -> Result<Vec<PathBuf>, CodegenError> {
        let files = self.generate(schema)?;
        self.write(&files)?;
        Ok(files.into_iter().map(|f| f.path).collect())
    }
}

/* Everything generated from one schema file */
struct FileUnit<'u, 'a> {
    file: &'u FileDescriptor,
    stem: &'u str,
    root_class: &'u str,
    source_name: &'u str,
    enums: &'u [EnumGenerator<'a>],
    messages: &'u [MessageGenerator<'a>],
}

impl FileUnit<'_, '_> {
    fn preamble(&self, printer: &mut Printer) {
        printer.print_raw(&format!(
            "// Generated by proto-gen. DO NOT EDIT!\n// clang-format off\n// source: {}\n\n",
            self.source_name
        ));
    }

    fn header(&self, include_external_types: bool) -> Result<String, CodegenError> {
        let mut printer = Printer::new();
        self.preamble(&mut printer);
        printer.print_raw(
            "#import \"GPBDescriptor.h\"\n\
             #import \"GPBMessage.h\"\n\
             #import \"GPBRootObject.h\"\n\
             \n\
             #if GOOGLE_PROTOBUF_OBJC_VERSION < 30007\n\
             #error This file was generated by a newer version of proto-gen which is incompatible with your Protocol Buffer library sources.\n\
             #endif\n\
             #if 30007 < GOOGLE_PROTOBUF_OBJC_MIN_SUPPORTED_VERSION\n\
             #error This file was generated by an older version of proto-gen which is incompatible with your Protocol Buffer library sources.\n\
             #endif\n\
             \n\
             #pragma clang diagnostic push\n\
             #pragma clang diagnostic ignored \"-Wdeprecated-declarations\"\n\
             \n\
             CF_EXTERN_C_BEGIN\n\
             \n",
        );

        let mut decls: BTreeSet<ForwardDeclaration> = BTreeSet::new();
        for message in self.messages {
            message.determine_forward_declarations(&mut decls, include_external_types);
        }
        if !decls.is_empty() {
            // Enums sort after classes
            for decl in &decls {
                printer.print_raw(&format!("{}\n", decl));
            }
            printer.print_raw("\n");
        }

        printer.print_raw("NS_ASSUME_NONNULL_BEGIN\n\n");
        for enum_gen in self.enums {
            enum_gen.generate_header(&mut printer)?;
        }

        printer.print_raw(&format!(
            "#pragma mark - {root}\n\
             \n\
             /**\n\
             \x20* Exposes the extension registry for this file.\n\
             \x20*\n\
             \x20* The base class provides:\n\
             \x20* @code\n\
             \x20*   + (GPBExtensionRegistry *)extensionRegistry;\n\
             \x20* @endcode\n\
             \x20* which is a @c GPBExtensionRegistry that includes all the extensions defined by\n\
             \x20* this file and all files that it depends on.\n\
             \x20**/\n\
             GPB_FINAL @interface {root} : GPBRootObject\n\
             @end\n\
             \n",
            root = self.root_class
        ));

        for message in self.messages {
            message.generate_header(&mut printer)?;
        }

        printer.print_raw(
            "NS_ASSUME_NONNULL_END\n\
             \n\
             CF_EXTERN_C_END\n\
             \n\
             #pragma clang diagnostic pop\n",
        );
        Ok(printer.into_string())
    }

    fn source(&self) -> Result<String, CodegenError> {
        let mut printer = Printer::new();
        self.preamble(&mut printer);
        printer.print_raw(&format!(
            "#import \"GPBProtocolBuffers_RuntimeSupport.h\"\n\
             #import <stdatomic.h>\n\
             \n\
             #import \"{}.pbobjc.h\"\n\
             \n\
             #pragma clang diagnostic push\n\
             #pragma clang diagnostic ignored \"-Wdeprecated-declarations\"\n\
             #pragma clang diagnostic ignored \"-Wdollar-in-identifier-extension\"\n\
             \n",
            self.stem
        ));

        let mut classes = BTreeSet::new();
        for message in self.messages {
            message.determine_objc_class_definitions(&mut classes);
        }
        if !classes.is_empty() {
            printer.print_raw(
                "#pragma mark - Objective-C Class declarations\n\
                 // Forward declarations of Objective-C classes that we can use as\n\
                 // static values in struct initializers.\n\
                 // We don't use [Foo class] because it is not a static value.\n",
            );
            for class in &classes {
                printer.print_raw(&format!("GPBObjCClassDeclaration({});\n", class));
            }
            printer.print_raw("\n");
        }

        let syntax = match self.file.syntax {
            Syntax::Proto2 => "GPBFileSyntaxProto2",
            Syntax::Proto3 => "GPBFileSyntaxProto3",
        };
        printer.print_raw(&format!(
            "#pragma mark - {root}\n\
             \n\
             @implementation {root}\n\
             \n\
             @end\n\
             \n\
             static GPBFileDescription {root}_FileDescription = {{\n\
             \x20 .package = \"{package}\",\n\
             \x20 .prefix = \"{prefix}\",\n\
             \x20 .syntax = {syntax}\n\
             }};\n\
             \n",
            root = self.root_class,
            package = self.file.package,
            prefix = self.file.objc_class_prefix.as_deref().unwrap_or_default(),
            syntax = syntax
        ));

        for enum_gen in self.enums {
            enum_gen.generate_source(&mut printer)?;
        }
        for message in self.messages {
            message.generate_source(&mut printer)?;
        }

        printer.print_raw("#pragma clang diagnostic pop\n");
        Ok(printer.into_string())
    }
}

/// Root class name for a schema, e.g. `TPTestRoot`.
pub fn root_class_name(prefix: &str, stem: &str) -> String {
    names::class_name(prefix, &format!("{}Root", stem))
}
