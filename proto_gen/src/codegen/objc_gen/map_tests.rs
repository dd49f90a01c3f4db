use super::*;
use crate::codegen::objc_gen::policy::ClassifyError;
use crate::codegen::objc_gen::presence::{HasBit, OneofAssignment};
use crate::codegen::objc_gen::variables::VarKey;
use crate::codegen::printer::Printer;
use crate::schema::SchemaFile;
use proto_types::FileDescriptor;

fn load(yaml: &str) -> (FileDescriptor, TypeRegistry) {
    let file = SchemaFile::parse(yaml).unwrap().descriptor;
    let registry = TypeRegistry::from_file(&file).unwrap();
    (file, registry)
}

fn field<'f>(file: &'f FileDescriptor, message: &str, name: &str) -> &'f FieldDescriptor {
    file.message(message).unwrap().field(name).unwrap()
}

fn has_index(map: &FieldGeneratorMap<'_>, field: &FieldDescriptor) -> String {
    map.emitter(field)
        .unwrap()
        .variables()
        .get(VarKey::HasIndex)
        .unwrap()
        .to_string()
}

const SCALARS: &str = r#"
package: "test.pkg"
messages:
  - name: "Foo"
    fields:
      - { name: "a", number: 1, kind: int32, default: 0 }
      - { name: "b", number: 2, kind: int32, default: 5 }
      - { name: "c", number: 3, kind: string }
      - { name: "d", number: 4, kind: int32, cardinality: repeated }
"#;

const ONEOF: &str = r#"
package: "test.pkg"
messages:
  - name: "Foo"
    oneofs:
      - name: "choice"
    fields:
      - { name: "x", number: 1, kind: int32, oneof: "choice" }
      - { name: "y", number: 2, kind: string, oneof: "choice" }
      - { name: "z", number: 3, kind: int32 }
"#;

const BOOLS: &str = r#"
package: "test.pkg"
messages:
  - name: "Foo"
    fields:
      - { name: "flag", number: 1, kind: bool }
      - { name: "n", number: 2, kind: int32 }
      - { name: "other_flag", number: 3, kind: bool, default: true }
"#;

#[test]
fn test_scalar_allocation() {
    let (file, registry) = load(SCALARS);
    let message = file.message("Foo").unwrap();
    let mut map = FieldGeneratorMap::new(message, &registry).unwrap();

    assert_eq!(map.calculate_has_bits(), 2);
    assert_eq!(has_index(&map, field(&file, "Foo", "a")), "0");
    assert_eq!(has_index(&map, field(&file, "Foo", "b")), "1");
    assert_eq!(has_index(&map, field(&file, "Foo", "c")), "GPBNoHasBit");
    assert_eq!(has_index(&map, field(&file, "Foo", "d")), "GPBNoHasBit");
    assert!(map.does_any_field_have_non_zero_default());
}

#[test]
fn test_oneof_allocation() {
    let (file, registry) = load(ONEOF);
    let message = file.message("Foo").unwrap();
    let mut map = FieldGeneratorMap::new(message, &registry).unwrap();

    assert_eq!(map.calculate_has_bits(), 1);
    map.set_oneof_index_base(0);

    let x = map.emitter(field(&file, "Foo", "x")).unwrap();
    let y = map.emitter(field(&file, "Foo", "y")).unwrap();
    let z = map.emitter(field(&file, "Foo", "z")).unwrap();

    assert_eq!(x.presence().has_bit, HasBit::NoHasBit);
    assert_eq!(y.presence().has_bit, HasBit::NoHasBit);
    assert_eq!(z.presence().has_bit, HasBit::Index(0));

    assert_eq!(x.oneof(), Some(OneofAssignment { index: 0, case_slot: 0 }));
    assert_eq!(y.oneof(), Some(OneofAssignment { index: 1, case_slot: 0 }));
    assert_eq!(z.oneof(), None);
}

#[test]
fn test_oneof_members_point_at_case_slot() {
    let (file, registry) = load(ONEOF);
    let message = file.message("Foo").unwrap();
    let mut map = FieldGeneratorMap::new(message, &registry).unwrap();
    map.calculate_has_bits();
    let words = map.has_bit_layout().unwrap().storage_words();
    map.set_oneof_index_base(words);

    assert_eq!(has_index(&map, field(&file, "Foo", "x")), "-1");
    assert_eq!(has_index(&map, field(&file, "Foo", "y")), "-1");
    assert_eq!(has_index(&map, field(&file, "Foo", "z")), "0");
}

#[test]
fn test_indices_are_unique() {
    let (file, registry) = load(
        r#"
package: "test.pkg"
messages:
  - name: "Foo"
    oneofs:
      - name: "first"
      - name: "second"
    fields:
      - { name: "a", number: 1, kind: int32 }
      - { name: "b", number: 2, kind: bool }
      - { name: "p", number: 3, kind: int32, oneof: "first" }
      - { name: "q", number: 4, kind: bool, oneof: "second" }
      - { name: "r", number: 5, kind: double, oneof: "first" }
      - { name: "c", number: 6, kind: enum, type-name: "Color" }
      - { name: "d", number: 7, kind: bool, cardinality: repeated }
enums:
  - name: "Color"
    values:
      - { name: "RED", number: 0 }
"#,
    );
    let message = file.message("Foo").unwrap();
    let mut map = FieldGeneratorMap::new(message, &registry).unwrap();
    let total = map.calculate_has_bits();
    map.set_oneof_index_base(1);
    let slots = map.presence_slots().unwrap();

    // a, b, c take standard bits; b and q each add one extra
    assert_eq!(total, 5);
    let mut used: Vec<u32> = slots
        .iter()
        .flat_map(|s| s.has_bit.index().into_iter().chain(s.extra_bits_base))
        .collect();
    used.sort_unstable();
    assert_eq!(used, vec![0, 1, 2, 3, 4]);

    let p = &slots[2];
    let r = &slots[4];
    assert_eq!(p.oneof.map(|o| o.index), Some(1));
    assert_eq!(r.oneof.map(|o| o.index), Some(2));
    assert_eq!(p.oneof.map(|o| o.case_slot), r.oneof.map(|o| o.case_slot));
    assert_eq!(slots[3].oneof, Some(OneofAssignment { index: 1, case_slot: 2 }));

    assert!(slots.iter().all(|s| s.policy != "repeated" || s.has_bit == HasBit::NoHasBit));
    assert!(
        slots
            .iter()
            .all(|s| s.oneof.is_none() || s.has_bit == HasBit::NoHasBit)
    );
}

#[test]
fn test_bool_lives_in_extra_bits() {
    let (file, registry) = load(BOOLS);
    let message = file.message("Foo").unwrap();
    let mut map = FieldGeneratorMap::new(message, &registry).unwrap();

    assert_eq!(map.calculate_has_bits(), 5);

    let flag = map.emitter(field(&file, "Foo", "flag")).unwrap();
    assert_eq!(flag.variables().get(VarKey::HasIndex), Some("0"));
    assert_eq!(flag.variables().get(VarKey::StorageOffsetValue), Some("3"));

    let other = map.emitter(field(&file, "Foo", "other_flag")).unwrap();
    assert_eq!(other.variables().get(VarKey::HasIndex), Some("2"));
    assert_eq!(other.variables().get(VarKey::StorageOffsetValue), Some("4"));

    let mut printer = Printer::new();
    flag.generate_field_storage_declaration(&mut printer).unwrap();
    assert_eq!(printer.as_str(), "");

    let description = flag.field_description().unwrap();
    assert_eq!(description.offset, "3");
    assert_eq!(
        description.offset_comment,
        "  // Stored in _has_storage_ to save space."
    );

    let n = map.emitter(field(&file, "Foo", "n")).unwrap();
    assert_eq!(n.field_description().unwrap().offset_comment, "");
}

#[test]
fn test_zero_defaults() {
    let (file, registry) = load(
        r#"
package: "test.pkg"
messages:
  - name: "Foo"
    oneofs:
      - name: "choice"
    fields:
      - { name: "a", number: 1, kind: int32, default: 0 }
      - { name: "s", number: 2, kind: string, default: "" }
      - { name: "x", number: 3, kind: int32, oneof: "choice", default: 5 }
      - { name: "f", number: 4, kind: bool, default: false }
"#,
    );
    let map = FieldGeneratorMap::new(file.message("Foo").unwrap(), &registry).unwrap();
    assert!(!map.does_any_field_have_non_zero_default());
}

#[test]
fn test_imported_enum_defaults_resolve_their_numbers() {
    let schema = |default: &str| {
        format!(
            r#"
package: "test.pkg"
imports:
  - package: "other.pkg"
    objc-class-prefix: "OP"
    enums:
      - name: "Shade"
        values:
          - {{ name: "SHADE_ZERO", number: 0 }}
          - {{ name: "SHADE_DARK", number: 2 }}
messages:
  - name: "Foo"
    fields:
      - {{ name: "shade", number: 1, kind: enum, type-name: "Shade", default: "{}" }}
"#,
            default
        )
    };

    let (file, registry) = load(&schema("SHADE_ZERO"));
    let map = FieldGeneratorMap::new(file.message("Foo").unwrap(), &registry).unwrap();
    assert!(!map.does_any_field_have_non_zero_default());

    let (file, registry) = load(&schema("SHADE_DARK"));
    let map = FieldGeneratorMap::new(file.message("Foo").unwrap(), &registry).unwrap();
    assert!(map.does_any_field_have_non_zero_default());

    let (file, registry) = load(&schema("SHADE_LIGHT"));
    let err = FieldGeneratorMap::new(file.message("Foo").unwrap(), &registry).unwrap_err();
    assert!(matches!(err, FieldGenError::InvalidDefault { ref field, .. } if field == "shade"));
}

#[test]
fn test_imported_enum_without_values_rejects_named_default() {
    let (file, registry) = load(
        r#"
package: "test.pkg"
imports:
  - package: "other.pkg"
    enums: ["Shade"]
messages:
  - name: "Foo"
    fields:
      - { name: "shade", number: 1, kind: enum, type-name: "Shade", default: "SHADE_ZERO" }
      - { name: "plain", number: 2, kind: enum, type-name: "Shade" }
"#,
    );
    let err = FieldGeneratorMap::new(file.message("Foo").unwrap(), &registry).unwrap_err();
    assert!(matches!(err, FieldGenError::InvalidDefault { ref field, .. } if field == "shade"));
}

#[test]
fn test_foreign_field_is_rejected() {
    let (file, registry) = load(SCALARS);
    let map = FieldGeneratorMap::new(file.message("Foo").unwrap(), &registry).unwrap();

    let lookalike = field(&file, "Foo", "a").clone();
    let err = map.get(&lookalike).unwrap_err();
    assert_eq!(
        err,
        FieldGenError::ForeignField {
            message: "Foo".to_string(),
            field: "a".to_string(),
        }
    );
    assert!(map.get(field(&file, "Foo", "a")).is_ok());
}

#[test]
fn test_emission_before_allocation_is_rejected() {
    let (file, registry) = load(ONEOF);
    let mut map = FieldGeneratorMap::new(file.message("Foo").unwrap(), &registry).unwrap();

    let err = map.emitter(field(&file, "Foo", "z")).unwrap_err();
    assert_eq!(
        err,
        FieldGenError::HasBitsPending {
            message: "Foo".to_string(),
            field: "z".to_string(),
        }
    );

    map.calculate_has_bits();
    assert!(map.emitter(field(&file, "Foo", "z")).is_ok());
    let err = map.emitter(field(&file, "Foo", "x")).unwrap_err();
    assert_eq!(
        err,
        FieldGenError::OneofBasePending {
            message: "Foo".to_string(),
            field: "x".to_string(),
        }
    );
    assert!(map.emitters().is_err());
}

#[test]
fn test_dispatch_gaps_abort_construction() {
    let (file, registry) = load(
        r#"
package: "test.pkg"
messages:
  - name: "Foo"
    fields:
      - { name: "a", number: 1, kind: int32 }
      - { name: "ext", number: 100, kind: int32, extension: true }
"#,
    );
    let err = FieldGeneratorMap::new(file.message("Foo").unwrap(), &registry).unwrap_err();
    assert_eq!(
        err,
        FieldGenError::DispatchGap {
            message: "Foo".to_string(),
            field: "ext".to_string(),
            reason: ClassifyError::Extension,
        }
    );

    let (file, registry) = load(
        r#"
package: "test.pkg"
messages:
  - name: "Foo"
    fields:
      - { name: "x", number: 1, kind: int32, oneof: "nowhere" }
"#,
    );
    let err = FieldGeneratorMap::new(file.message("Foo").unwrap(), &registry).unwrap_err();
    assert!(matches!(err, FieldGenError::UnknownOneof { ref oneof, .. } if oneof == "nowhere"));
}

#[test]
fn test_forward_declarations_fold_over_fields() {
    let (file, registry) = load(
        r#"
package: "test.pkg"
objc-class-prefix: "TP"
imports:
  - package: "other.pkg"
    objc-class-prefix: "OP"
    messages: ["Remote"]
messages:
  - name: "Bar"
  - name: "Foo"
    fields:
      - { name: "bar", number: 1, kind: message, type-name: "Bar" }
      - { name: "bars", number: 2, kind: message, cardinality: repeated, type-name: "Bar" }
      - { name: "remote", number: 3, kind: message, type-name: "Remote" }
      - { name: "n", number: 4, kind: int32 }
"#,
    );
    let map = FieldGeneratorMap::new(file.message("Foo").unwrap(), &registry).unwrap();

    assert_eq!(
        map.forward_declarations(false),
        BTreeSet::from([ForwardDeclaration::Class("TPBar".to_string())])
    );

    let mut decls = BTreeSet::from([ForwardDeclaration::Class("TPAlready".to_string())]);
    map.determine_forward_declarations(&mut decls, true);
    map.determine_forward_declarations(&mut decls, true);
    assert_eq!(
        decls,
        BTreeSet::from([
            ForwardDeclaration::Class("OPRemote".to_string()),
            ForwardDeclaration::Class("TPAlready".to_string()),
            ForwardDeclaration::Class("TPBar".to_string()),
        ])
    );

    let mut classes = BTreeSet::new();
    map.determine_objc_class_definitions(&mut classes);
    assert_eq!(
        classes,
        BTreeSet::from(["OPRemote".to_string(), "TPBar".to_string()])
    );
}

#[test]
fn test_scalar_emission() {
    let (file, registry) = load(SCALARS);
    let mut map = FieldGeneratorMap::new(file.message("Foo").unwrap(), &registry).unwrap();
    map.calculate_has_bits();
    map.set_oneof_index_base(1);
    let b = map.emitter(field(&file, "Foo", "b")).unwrap();

    let mut printer = Printer::new();
    b.generate_field_storage_declaration(&mut printer).unwrap();
    b.generate_property_declaration(&mut printer).unwrap();
    b.generate_property_implementation(&mut printer).unwrap();
    b.generate_field_number_constant(&mut printer).unwrap();
    assert_eq!(
        printer.as_str(),
        "int32_t b;\n\
         @property(nonatomic, readwrite) int32_t b;\n\n\
         @property(nonatomic, readwrite) BOOL hasB;\n\n\
         @dynamic hasB, b;\n\
         Foo_FieldNumber_B = 2,\n"
    );

    let mut printer = Printer::new();
    b.generate_field_description(&mut printer, false).unwrap();
    assert_eq!(
        printer.as_str(),
        "{\n\
         \x20 .name = \"b\",\n\
         \x20 .dataTypeSpecific.clazz = Nil,\n\
         \x20 .number = Foo_FieldNumber_B,\n\
         \x20 .hasIndex = 1,\n\
         \x20 .offset = (uint32_t)offsetof(Foo__storage_, b),\n\
         \x20 .flags = (GPBFieldFlags)(GPBFieldOptional | GPBFieldHasDefaultValue),\n\
         \x20 .dataType = GPBDataTypeInt32,\n\
         },\n"
    );

    let mut printer = Printer::new();
    b.generate_c_function_declarations(&mut printer).unwrap();
    b.generate_c_function_implementations(&mut printer).unwrap();
    assert_eq!(printer.as_str(), "");
}

#[test]
fn test_container_emission() {
    let (file, registry) = load(
        r#"
package: "test.pkg"
objc-class-prefix: "TP"
messages:
  - name: "Foo"
    fields:
      - { name: "d", number: 1, kind: int32, cardinality: repeated }
      - { name: "colors", number: 2, kind: enum, cardinality: repeated, type-name: "Color" }
      - { name: "title", number: 3, kind: string }
enums:
  - name: "Color"
    values:
      - { name: "RED", number: 0 }
"#,
    );
    let mut map = FieldGeneratorMap::new(file.message("Foo").unwrap(), &registry).unwrap();
    map.calculate_has_bits();
    map.set_oneof_index_base(1);

    let d = map.emitter(field(&file, "Foo", "d")).unwrap();
    let mut printer = Printer::new();
    d.generate_field_storage_declaration(&mut printer).unwrap();
    d.generate_property_implementation(&mut printer).unwrap();
    assert_eq!(
        printer.as_str(),
        "GPBInt32Array *dArray;\n@dynamic dArray, dArray_Count;\n"
    );

    let colors = map.emitter(field(&file, "Foo", "colors")).unwrap();
    let mut printer = Printer::new();
    colors.generate_property_declaration(&mut printer).unwrap();
    let out = printer.as_str();
    assert!(out.starts_with("// |colorsArray| contains |TPColor|\n"));
    assert!(out.contains(
        "@property(nonatomic, readwrite, strong, null_resettable) GPBEnumArray *colorsArray;\n"
    ));
    assert!(out.contains("@property(nonatomic, readonly) NSUInteger colorsArray_Count;\n"));

    let title = map.emitter(field(&file, "Foo", "title")).unwrap();
    let mut printer = Printer::new();
    title.generate_field_storage_declaration(&mut printer).unwrap();
    title.generate_property_declaration(&mut printer).unwrap();
    let out = printer.as_str();
    assert!(out.starts_with("NSString *title;\n"));
    assert!(out.contains(
        "@property(nonatomic, readwrite, copy, null_resettable) NSString *title;\n"
    ));
    assert!(out.contains("BOOL hasTitle;\n"));
}

#[test]
fn test_init_family_and_text_format_names() {
    let (file, registry) = load(
        r#"
package: "test.pkg"
messages:
  - name: "Foo"
    fields:
      - { name: "init_value", number: 1, kind: string }
      - { name: "fooBar", number: 2, kind: int32 }
"#,
    );
    let mut map = FieldGeneratorMap::new(file.message("Foo").unwrap(), &registry).unwrap();
    map.calculate_has_bits();
    map.set_oneof_index_base(1);

    let init = map.emitter(field(&file, "Foo", "init_value")).unwrap();
    let mut printer = Printer::new();
    init.generate_property_declaration(&mut printer).unwrap();
    assert!(printer
        .as_str()
        .contains("- (NSString *)initValue GPB_METHOD_FAMILY_NONE;\n"));
    assert_eq!(init.field_description().unwrap().text_format_name, None);

    let foo_bar = map.emitter(field(&file, "Foo", "fooBar")).unwrap();
    assert_eq!(
        foo_bar.field_description().unwrap().text_format_name.as_deref(),
        Some("fooBar")
    );
}

#[test]
fn test_open_enum_raw_value_functions() {
    let (file, registry) = load(
        r#"
package: "p3"
syntax: proto3
messages:
  - name: "Msg"
    fields:
      - { name: "level", number: 1, kind: enum, type-name: "Level" }
enums:
  - name: "Level"
    values:
      - { name: "LOW", number: 0 }
"#,
    );
    let mut map = FieldGeneratorMap::new(file.message("Msg").unwrap(), &registry).unwrap();
    map.calculate_has_bits();
    map.set_oneof_index_base(1);
    let level = map.emitter(field(&file, "Msg", "level")).unwrap();

    let mut printer = Printer::new();
    level.generate_c_function_declarations(&mut printer).unwrap();
    let decls = printer.into_string();
    assert!(decls.contains("int32_t Msg_Level_RawValue(Msg *message);\n"));
    assert!(decls.contains("void SetMsg_Level_RawValue(Msg *message, int32_t value);\n"));

    let mut printer = Printer::new();
    level.generate_c_function_implementations(&mut printer).unwrap();
    let defs = printer.into_string();
    assert!(defs.contains("[descriptor fieldWithNumber:Msg_FieldNumber_Level];\n"));
    assert!(defs.contains("  GPBSetMessageRawEnumField(message, field, value);\n"));

    // proto3 singular fields without `optional` have no has property
    let mut printer = Printer::new();
    level.generate_property_implementation(&mut printer).unwrap();
    assert_eq!(printer.as_str(), "@dynamic level;\n");
}
