/* Objective-C Code Generation Tests
 *
 * These tests run whole schema files through the generator and check the
 * header/source pair it produces.
 */

use proto_gen::codegen::objc_gen::FieldGenError;
use proto_gen::codegen::{CodegenError, GeneratedFile, ObjCCodeGenerator, ObjCCodeGeneratorOptions};
use proto_gen::schema::SchemaFile;

const SCHEMA: &str = r#"
package: "test.pkg"
objc-class-prefix: "TP"
imports:
  - package: "other.pkg"
    objc-class-prefix: "OP"
    messages: ["Remote"]
    enums: ["Shade"]
messages:
  - name: "Bar"
  - name: "Foo"
    oneofs:
      - name: "choice"
    fields:
      - { name: "count", number: 1, kind: int32, default: 5 }
      - { name: "bar", number: 2, kind: message, type-name: "Bar" }
      - { name: "remote", number: 3, kind: message, type-name: "Remote" }
      - { name: "shade", number: 4, kind: enum, type-name: "Shade" }
      - { name: "color", number: 5, kind: enum, type-name: "Color" }
      - { name: "x", number: 6, kind: int32, oneof: "choice" }
      - name: "tags"
        number: 7
        kind: map
        cardinality: repeated
        map: { key: string, value: int32 }
enums:
  - name: "Color"
    values:
      - { name: "RED", number: 0 }
      - { name: "BLUE", number: 1 }
"#;

/* Helper to generate both files with the given options */
fn generate(options: ObjCCodeGeneratorOptions) -> Result<Vec<GeneratedFile>, CodegenError> {
    let schema = SchemaFile::parse(SCHEMA).unwrap();
    ObjCCodeGenerator::new(options).generate(&schema)
}

fn header_and_source(files: &[GeneratedFile]) -> (&str, &str) {
    assert_eq!(files.len(), 2);
    (&files[0].contents, &files[1].contents)
}

#[test]
fn test_file_pair() {
    let files = generate(ObjCCodeGeneratorOptions::default()).unwrap();
    assert!(files[0].path.ends_with("Pkg.pbobjc.h"));
    assert!(files[1].path.ends_with("Pkg.pbobjc.m"));

    let (header, source) = header_and_source(&files);
    assert!(header.starts_with("// Generated by proto-gen. DO NOT EDIT!\n"));
    assert!(header.contains("@class TPBar;\n"));
    assert!(header.contains("GPB_FINAL @interface TPPkgRoot : GPBRootObject\n@end\n"));
    assert!(header.contains("typedef GPB_ENUM(TPColor) {\n"));
    assert!(header.contains("GPB_FINAL @interface TPBar : GPBMessage\n"));
    assert!(header.contains("GPB_FINAL @interface TPFoo : GPBMessage\n"));
    assert!(header.contains("GPBStringInt32Dictionary *tags"));
    assert!(header.trim_end().ends_with("#pragma clang diagnostic pop"));

    // Enums are declared ahead of the messages that use them
    let color = header.find("typedef GPB_ENUM(TPColor)").unwrap();
    let foo = header.find("@interface TPFoo").unwrap();
    assert!(color < foo);

    assert!(source.contains("#import \"Pkg.pbobjc.h\"\n"));
    assert!(source.contains("GPBObjCClassDeclaration(TPBar);\n"));
    assert!(source.contains("GPBObjCClassDeclaration(TPFoo);\n"));
    assert!(source.contains(
        "static GPBFileDescription TPPkgRoot_FileDescription = {\n  .package = \"test.pkg\",\n  .prefix = \"TP\",\n  .syntax = GPBFileSyntaxProto2\n};\n"
    ));
    assert!(source.contains("GPBEnumDescriptor *TPColor_EnumDescriptor(void) {\n"));
    assert!(source.contains("@implementation TPFoo\n"));
    assert!(source.contains("static GPBMessageFieldDescriptionWithDefault fields[] = {\n"));
}

#[test]
fn test_external_types_are_opt_in() {
    let files = generate(ObjCCodeGeneratorOptions::default()).unwrap();
    let (header, source) = header_and_source(&files);
    assert!(!header.contains("@class OPRemote;"));
    assert!(!header.contains("GPB_ENUM_FWD_DECLARE(OPShade);"));
    // Class objects are still referenced from the field descriptions
    assert!(source.contains("GPBObjCClassDeclaration(OPRemote);\n"));

    let files = generate(ObjCCodeGeneratorOptions {
        include_external_types: true,
        ..Default::default()
    })
    .unwrap();
    let (header, _) = header_and_source(&files);
    assert!(header.contains("@class OPRemote;\n@class TPBar;\nGPB_ENUM_FWD_DECLARE(OPShade);\n"));
}

#[test]
fn test_class_prefix_override() {
    let files = generate(ObjCCodeGeneratorOptions {
        class_prefix: Some("XY".to_string()),
        ..Default::default()
    })
    .unwrap();
    let (header, source) = header_and_source(&files);
    assert!(header.contains("GPB_FINAL @interface XYFoo : GPBMessage\n"));
    assert!(header.contains("GPB_FINAL @interface XYPkgRoot : GPBRootObject\n"));
    assert!(!header.contains("TPFoo"));
    // Imported types keep their own prefix
    assert!(source.contains("GPBObjCClassDeclaration(OPRemote);\n"));
    assert!(source.contains("  .prefix = \"XY\",\n"));
}

#[test]
fn test_emit_toggles() {
    let files = generate(ObjCCodeGeneratorOptions {
        emit_source: false,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].path.ends_with("Pkg.pbobjc.h"));

    let files = generate(ObjCCodeGeneratorOptions {
        emit_header: false,
        emit_source: false,
        ..Default::default()
    })
    .unwrap();
    assert!(files.is_empty());
}

#[test]
fn test_field_errors_abort_generation() {
    let schema = SchemaFile::parse(
        r#"
package: "test.pkg"
messages:
  - name: "Foo"
    fields:
      - { name: "missing", number: 1, kind: message, type-name: "Nowhere" }
"#,
    )
    .unwrap();
    let err = ObjCCodeGenerator::new(ObjCCodeGeneratorOptions::default())
        .generate(&schema)
        .unwrap_err();
    match err {
        CodegenError::Field(FieldGenError::UnresolvedType {
            message,
            field,
            type_name,
        }) => {
            assert_eq!(message, "Foo");
            assert_eq!(field, "missing");
            assert_eq!(type_name, "Nowhere");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_emit_code_writes_files() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");
    let schema = SchemaFile::parse(SCHEMA).unwrap();
    let generator = ObjCCodeGenerator::new(ObjCCodeGeneratorOptions {
        output_dir: out_dir.to_string_lossy().to_string(),
        ..Default::default()
    });

    let written = generator.emit_code(&schema).unwrap();
    assert_eq!(written.len(), 2);
    for path in &written {
        assert!(path.starts_with(&out_dir));
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("TPFoo"));
    }
}
