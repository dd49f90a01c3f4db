use std::collections::BTreeSet;
use std::fmt;

/// One `GPBFieldFlags` bit. Declaration order is rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldFlag {
    Repeated,
    /// Map key type, spelled as its `GPBDataType` suffix.
    MapKey(&'static str),
    Packed,
    Required,
    Optional,
    HasDefaultValue,
    TextFormatNameCustom,
    HasEnumDescriptor,
    ClosedEnum,
    ClearHasIvarOnZero,
}

impl fmt::Display for FieldFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldFlag::Repeated => f.write_str("GPBFieldRepeated"),
            FieldFlag::MapKey(key) => write!(f, "GPBFieldMapKey{}", key),
            FieldFlag::Packed => f.write_str("GPBFieldPacked"),
            FieldFlag::Required => f.write_str("GPBFieldRequired"),
            FieldFlag::Optional => f.write_str("GPBFieldOptional"),
            FieldFlag::HasDefaultValue => f.write_str("GPBFieldHasDefaultValue"),
            FieldFlag::TextFormatNameCustom => f.write_str("GPBFieldTextFormatNameCustom"),
            FieldFlag::HasEnumDescriptor => f.write_str("GPBFieldHasEnumDescriptor"),
            FieldFlag::ClosedEnum => f.write_str("GPBFieldClosedEnum"),
            FieldFlag::ClearHasIvarOnZero => f.write_str("GPBFieldClearHasIvarOnZero"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFlags(BTreeSet<FieldFlag>);

impl FieldFlags {
    pub fn insert(&mut self, flag: FieldFlag) {
        self.0.insert(flag);
    }

    pub fn contains(&self, flag: FieldFlag) -> bool {
        self.0.contains(&flag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<FieldFlag> for FieldFlags {
    fn from_iter<I: IntoIterator<Item = FieldFlag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/* C initializer expression for the `.flags` member */
impl fmt::Display for FieldFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.0.iter();
        match (iter.next(), self.0.len()) {
            (None, _) => f.write_str("GPBFieldNone"),
            (Some(only), 1) => write!(f, "{}", only),
            (Some(first), _) => {
                write!(f, "(GPBFieldFlags)({}", first)?;
                for flag in iter {
                    write!(f, " | {}", flag)?;
                }
                f.write_str(")")
            }
        }
    }
}
