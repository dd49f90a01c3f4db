/* Objective-C identifier spelling for schema names */

use proto_types::{FieldDescriptor, FieldType};

/* Segments that are spelled all caps when camel casing */
const UPPER_SEGMENTS: &[&str] = &["url", "http", "https"];

/* Prefixes that imply ownership transfer under Cocoa memory rules */
const RETAINED_PREFIXES: &[&str] = &["new", "alloc", "copy", "mutableCopy"];

/* Names that would clash with C/Objective-C keywords or NSObject/GPBMessage members */
const RESERVED_NAMES: &[&str] = &[
    // C
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while",
    // Objective-C
    "id", "_cmd", "super", "nil", "Nil", "YES", "NO", "NULL", "self", "in", "out", "inout",
    "bycopy", "byref", "oneway", "BOOL", "SEL", "IMP", "Class", "Protocol",
    // NSObject
    "class", "description", "debugDescription", "hash", "isa", "superclass", "retain",
    "release", "autorelease", "retainCount", "zone", "isProxy", "copy", "mutableCopy", "init",
    "dealloc", "finalize", "new", "alloc",
    // GPBMessage
    "clear", "data", "delimitedData", "descriptor", "extensionRegistry",
    "extensionsCurrentlySet", "initialized", "isInitialized", "serializedSize",
    "sortedExtensionsInUse", "unknownFields",
];

/* Split `input` into words and join them camel cased */
pub fn underscores_to_camel_case(input: &str, first_capitalized: bool) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut last_was_number = false;
    let mut last_was_lower = false;
    let mut last_was_upper = false;

    for c in input.chars() {
        if c.is_ascii_digit() {
            if !last_was_number {
                words.push(std::mem::take(&mut current));
            }
            current.push(c);
            (last_was_number, last_was_lower, last_was_upper) = (true, false, false);
        } else if c.is_ascii_lowercase() {
            if !last_was_lower && !last_was_upper {
                words.push(std::mem::take(&mut current));
            }
            current.push(c);
            (last_was_number, last_was_lower, last_was_upper) = (false, true, false);
        } else if c.is_ascii_uppercase() {
            if !last_was_upper {
                words.push(std::mem::take(&mut current));
            }
            current.push(c.to_ascii_lowercase());
            (last_was_number, last_was_lower, last_was_upper) = (false, false, true);
        } else {
            (last_was_number, last_was_lower, last_was_upper) = (false, false, false);
        }
    }
    words.push(current);

    let mut result = String::new();
    let mut first_segment_forces_upper = false;
    for word in words.iter().filter(|w| !w.is_empty()) {
        let all_upper = UPPER_SEGMENTS.contains(&word.as_str());
        if all_upper && result.is_empty() {
            first_segment_forces_upper = true;
        }
        if all_upper {
            result.push_str(&word.to_ascii_uppercase());
        } else {
            result.push_str(&capitalize(word));
        }
    }
    if !first_capitalized && !first_segment_forces_upper {
        result = decapitalize(&result);
    }
    result
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/* `prefix` followed by the end of the name or a non-lowercase character */
fn has_bounded_prefix(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some(rest) => rest.chars().next().is_none_or(|c| !c.is_ascii_lowercase()),
        None => false,
    }
}

/* Accessors with these names would be assumed to return a +1 reference */
pub fn is_retained_name(name: &str) -> bool {
    RETAINED_PREFIXES
        .iter()
        .any(|prefix| has_bounded_prefix(name, prefix))
}

/* Properties in the init family need their method family overridden under ARC */
pub fn is_init_name(name: &str) -> bool {
    has_bounded_prefix(name, "init")
}

fn sanitize(name: String, suffix: &str) -> String {
    if is_reserved_name(&name) {
        name + suffix
    } else {
        name
    }
}

/* Property name for a field: camel cased, `Array` suffix for repeated non-map fields */
pub fn field_name(field: &FieldDescriptor) -> String {
    let mut result = underscores_to_camel_case(&field.name, false);
    if field.is_repeated() && !field.is_map() {
        result.push_str("Array");
    } else if result.ends_with("Array") {
        result.push_str("_p");
    }
    sanitize(result, "_p")
}

pub fn field_name_capitalized(field: &FieldDescriptor) -> String {
    capitalize(&field_name(field))
}

/* Reverse the camel casing to recover the name a text format parser would derive */
pub fn un_camel_case_field_name(name: &str, field: &FieldDescriptor) -> String {
    let mut worker = name.strip_suffix("_p").unwrap_or(name);
    if field.is_repeated() {
        worker = worker.strip_suffix("Array").unwrap_or(worker);
    }
    if field.field_type == FieldType::Group {
        return capitalize(worker);
    }
    let mut result = String::with_capacity(worker.len() + 4);
    for (i, c) in worker.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

pub fn class_name(prefix: &str, message_name: &str) -> String {
    sanitize(format!("{}{}", prefix, message_name), "_Class")
}

pub fn enum_name(prefix: &str, enum_name: &str) -> String {
    sanitize(format!("{}{}", prefix, enum_name), "_Enum")
}

pub fn enum_value_name(enum_objc_name: &str, value_name: &str) -> String {
    let value = underscores_to_camel_case(value_name, true);
    sanitize(format!("{}_{}", enum_objc_name, value), "_Value")
}

pub fn field_number_name(class_name: &str, capitalized_field_name: &str) -> String {
    format!("{}_FieldNumber_{}", class_name, capitalized_field_name)
}

pub fn oneof_name(oneof: &str) -> String {
    sanitize(underscores_to_camel_case(oneof, false), "_p")
}

pub fn oneof_enum_name(class_name: &str, oneof: &str) -> String {
    format!(
        "{}_{}_OneOfCase",
        class_name,
        underscores_to_camel_case(oneof, true)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proto_types::Cardinality;

    fn field(name: &str, field_type: FieldType, cardinality: Cardinality) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            number: 1,
            field_type,
            cardinality,
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

    #[test]
    fn test_camel_case() {
        assert_eq!(underscores_to_camel_case("foo_bar", false), "fooBar");
        assert_eq!(underscores_to_camel_case("foo_bar", true), "FooBar");
        assert_eq!(underscores_to_camel_case("fooBar", false), "fooBar");
        assert_eq!(underscores_to_camel_case("field2_name", false), "field2Name");
        assert_eq!(underscores_to_camel_case("DARK_RED", true), "DarkRed");
        assert_eq!(underscores_to_camel_case("image_url", false), "imageURL");
        assert_eq!(underscores_to_camel_case("url_path", false), "URLPath");
    }

    #[test]
    fn test_field_names() {
        let f = field("foo_bar", FieldType::Int32, Cardinality::Optional);
        assert_eq!(field_name(&f), "fooBar");
        assert_eq!(field_name_capitalized(&f), "FooBar");

        let f = field("values", FieldType::Int32, Cardinality::Repeated);
        assert_eq!(field_name(&f), "valuesArray");

        let f = field("id", FieldType::Int32, Cardinality::Optional);
        assert_eq!(field_name(&f), "id_p");

        let f = field("my_array", FieldType::Int32, Cardinality::Optional);
        assert_eq!(field_name(&f), "myArray_p");

        let f = field("tags", FieldType::Map, Cardinality::Repeated);
        assert_eq!(field_name(&f), "tags");
    }

    #[test]
    fn test_un_camel_case_round_trip() {
        let f = field("foo_bar", FieldType::Int32, Cardinality::Optional);
        assert_eq!(un_camel_case_field_name(&field_name(&f), &f), "foo_bar");

        let f = field("values", FieldType::Int32, Cardinality::Repeated);
        assert_eq!(un_camel_case_field_name(&field_name(&f), &f), "values");

        let f = field("id", FieldType::Int32, Cardinality::Optional);
        assert_eq!(un_camel_case_field_name(&field_name(&f), &f), "id");

        let f = field("fooBar", FieldType::Int32, Cardinality::Optional);
        assert_eq!(un_camel_case_field_name(&field_name(&f), &f), "foo_bar");
    }

    #[test]
    fn test_retained_names() {
        assert!(is_retained_name("newValue"));
        assert!(is_retained_name("copy"));
        assert!(!is_retained_name("newsletter"));
        assert!(!is_retained_name("value"));
        assert!(is_init_name("initValue"));
        assert!(!is_init_name("initial"));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(class_name("TP", "Foo"), "TPFoo");
        assert_eq!(class_name("", "id"), "id_Class");
        assert_eq!(enum_value_name("TPColor", "DARK_RED"), "TPColor_DarkRed");
        assert_eq!(field_number_name("TPFoo", "FooBar"), "TPFoo_FieldNumber_FooBar");
        assert_eq!(oneof_enum_name("TPFoo", "my_choice"), "TPFoo_MyChoice_OneOfCase");
        assert_eq!(oneof_name("my_choice"), "myChoice");
    }
}
