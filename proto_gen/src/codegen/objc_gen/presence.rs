//! Results of the message-wide allocation passes.
//!
//! These records are produced once per message by [`HasBitLayout::calculate`]
//! and by the oneof base assignment, and are never modified afterwards.

use super::policy::{FieldPolicy, PresenceMechanism};
use serde_derive::Serialize;
use std::fmt;

/// Runtime sentinel for fields that signal presence without a bit.
pub const NO_HAS_BIT: &str = "GPBNoHasBit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HasBit {
    Index(u32),
    NoHasBit,
}

impl HasBit {
    pub fn index(self) -> Option<u32> {
        match self {
            HasBit::Index(index) => Some(index),
            HasBit::NoHasBit => None,
        }
    }
}

impl fmt::Display for HasBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HasBit::Index(index) => write!(f, "{}", index),
            HasBit::NoHasBit => f.write_str(NO_HAS_BIT),
        }
    }
}

/// Bits assigned to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresenceAssignment {
    pub has_bit: HasBit,
    /// First of the field's extra bits, when it requested any.
    pub extra_bits_base: Option<u32>,
}

/// Has-bit allocation for every field of a message, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HasBitLayout {
    assignments: Vec<PresenceAssignment>,
    standard_bits: u32,
    extra_bits: u32,
}

impl HasBitLayout {
    /// Assign standard bits in declaration order, then extra bits in a
    /// contiguous block after all standard bits.
    pub fn calculate<'p>(policies: impl IntoIterator<Item = &'p FieldPolicy>) -> Self {
        let policies: Vec<&FieldPolicy> = policies.into_iter().collect();

        let mut standard_bits = 0;
        let mut assignments: Vec<PresenceAssignment> = policies
            .iter()
            .map(|policy| {
                let has_bit = if policy.runtime_uses_has_bit() {
                    standard_bits += 1;
                    HasBit::Index(standard_bits - 1)
                } else {
                    HasBit::NoHasBit
                };
                PresenceAssignment {
                    has_bit,
                    extra_bits_base: None,
                }
            })
            .collect();

        let mut next_extra = standard_bits;
        for (assignment, policy) in assignments.iter_mut().zip(&policies) {
            let needed = policy.extra_runtime_has_bits_needed();
            if needed > 0 {
                assignment.extra_bits_base = Some(next_extra);
                next_extra += needed;
            }
        }

        Self {
            assignments,
            standard_bits,
            extra_bits: next_extra - standard_bits,
        }
    }

    /// Bits the message's has storage must hold.
    pub fn total(&self) -> u32 {
        self.standard_bits + self.extra_bits
    }

    pub fn standard_bits(&self) -> u32 {
        self.standard_bits
    }

    pub fn extra_bits(&self) -> u32 {
        self.extra_bits
    }

    /// 32-bit words needed for the bits. Never zero: the storage array always
    /// exists and oneof case slots follow it.
    pub fn storage_words(&self) -> u32 {
        self.total().div_ceil(32).max(1)
    }

    pub fn get(&self, field_index: usize) -> Option<&PresenceAssignment> {
        self.assignments.get(field_index)
    }

    pub fn assignments(&self) -> &[PresenceAssignment] {
        &self.assignments
    }
}

/// Where a oneof member's presence lives once the oneof base is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OneofAssignment {
    /// Base plus the member's position within its oneof; unique per oneof.
    pub index: u32,
    /// Base plus the oneof's declaration index: the has storage slot that
    /// holds the oneof case. Emitted negated as the member's `hasIndex`.
    pub case_slot: u32,
}

/// Allocation summary of one field, as reported by `proto-gen analyze`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PresenceSlot {
    pub field: String,
    pub number: u32,
    pub policy: &'static str,
    pub presence: PresenceMechanism,
    pub has_bit: HasBit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_bits_base: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oneof: Option<OneofAssignment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::objc_gen::policy::{ObjectKind, ValueShape};

    #[test]
    fn test_standard_bits_follow_declaration_order() {
        let policies = [
            FieldPolicy::Primitive,
            FieldPolicy::Object(ObjectKind::String),
            FieldPolicy::Enum,
            FieldPolicy::Repeated(ValueShape::Primitive),
            FieldPolicy::Primitive,
        ];
        let layout = HasBitLayout::calculate(&policies);
        let bits: Vec<_> = layout.assignments().iter().map(|a| a.has_bit).collect();
        assert_eq!(
            bits,
            vec![
                HasBit::Index(0),
                HasBit::NoHasBit,
                HasBit::Index(1),
                HasBit::NoHasBit,
                HasBit::Index(2),
            ]
        );
        assert_eq!(layout.total(), 3);
        assert_eq!(layout.extra_bits(), 0);
    }

    #[test]
    fn test_extra_bits_follow_all_standard_bits() {
        let policies = [
            FieldPolicy::Bool,
            FieldPolicy::Primitive,
            FieldPolicy::OneofMember(ValueShape::Bool),
            FieldPolicy::Bool,
        ];
        let layout = HasBitLayout::calculate(&policies);
        assert_eq!(layout.standard_bits(), 3);
        assert_eq!(layout.extra_bits(), 3);
        assert_eq!(layout.total(), 6);

        let extras: Vec<_> = layout
            .assignments()
            .iter()
            .map(|a| a.extra_bits_base)
            .collect();
        assert_eq!(extras, vec![Some(3), None, Some(4), Some(5)]);
        assert_eq!(layout.get(2).map(|a| a.has_bit), Some(HasBit::NoHasBit));
    }

    #[test]
    fn test_storage_words() {
        assert_eq!(HasBitLayout::calculate(&[] as &[FieldPolicy]).storage_words(), 1);
        let many = vec![FieldPolicy::Primitive; 33];
        assert_eq!(HasBitLayout::calculate(&many).storage_words(), 2);
    }

    #[test]
    fn test_has_bit_rendering() {
        assert_eq!(HasBit::Index(4).to_string(), "4");
        assert_eq!(HasBit::NoHasBit.to_string(), "GPBNoHasBit");
    }
}
