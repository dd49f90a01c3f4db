use serde_derive::Serialize;
use std::fmt::Write;

/// One entry of a message's static `GPBMessageFieldDescription` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FieldDescription {
    pub name: String,
    pub data_type_specific_name: String,
    pub data_type_specific_value: String,
    /// Field number constant.
    pub number: String,
    pub has_index: String,
    pub offset: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub offset_comment: String,
    pub flags: String,
    pub data_type: String,
    pub default_name: String,
    pub default_value: String,
    /// Schema name, when text format cannot derive it from `name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_format_name: Option<String>,
}

impl FieldDescription {
    /// C initializer for the entry. Tables with defaults nest the core
    /// description under `.core`.
    pub fn render(&self, include_default: bool) -> String {
        let core = if include_default { ".core." } else { "." };
        let mut out = String::from("{\n");
        if include_default {
            writeln!(out, "  .defaultValue.{} = {},", self.default_name, self.default_value).unwrap();
        }
        writeln!(out, "  {}name = \"{}\",", core, self.name).unwrap();
        writeln!(
            out,
            "  {}dataTypeSpecific.{} = {},",
            core, self.data_type_specific_name, self.data_type_specific_value
        )
        .unwrap();
        writeln!(out, "  {}number = {},", core, self.number).unwrap();
        writeln!(out, "  {}hasIndex = {},", core, self.has_index).unwrap();
        writeln!(out, "  {}offset = {},{}", core, self.offset, self.offset_comment).unwrap();
        writeln!(out, "  {}flags = {},", core, self.flags).unwrap();
        writeln!(out, "  {}dataType = GPBDataType{},", core, self.data_type).unwrap();
        out.push_str("},\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description() -> FieldDescription {
        FieldDescription {
            name: "flag".to_string(),
            data_type_specific_name: "clazz".to_string(),
            data_type_specific_value: "Nil".to_string(),
            number: "TPFoo_FieldNumber_Flag".to_string(),
            has_index: "0".to_string(),
            offset: "1".to_string(),
            offset_comment: "  // Stored in _has_storage_ to save space.".to_string(),
            flags: "GPBFieldOptional".to_string(),
            data_type: "Bool".to_string(),
            default_name: "valueBool".to_string(),
            default_value: "YES".to_string(),
            text_format_name: None,
        }
    }

    #[test]
    fn test_plain_entry() {
        assert_eq!(
            description().render(false),
            "{\n  .name = \"flag\",\n  .dataTypeSpecific.clazz = Nil,\n  .number = TPFoo_FieldNumber_Flag,\n  .hasIndex = 0,\n  .offset = 1,  // Stored in _has_storage_ to save space.\n  .flags = GPBFieldOptional,\n  .dataType = GPBDataTypeBool,\n},\n"
        );
    }

    #[test]
    fn test_entry_with_default() {
        let rendered = description().render(true);
        assert!(rendered.starts_with("{\n  .defaultValue.valueBool = YES,\n  .core.name = \"flag\",\n"));
        assert!(rendered.contains("  .core.dataType = GPBDataTypeBool,\n"));
        assert!(!rendered.contains("\n  .name"));
    }
}
