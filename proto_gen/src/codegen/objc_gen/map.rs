//! Generators for every field of one message, and the passes that need to
//! see all of them at once.

use super::emitter::FieldEmitter;
use super::error::FieldGenError;
use super::field::{FieldContext, FieldGenerator, OneofMembership};
use super::fwd_decls::ForwardDeclaration;
use super::policy::{classify, FieldPolicy};
use super::presence::{HasBitLayout, PresenceSlot};
use crate::schema::TypeRegistry;
use proto_types::{FieldDescriptor, MessageDescriptor};
use std::collections::BTreeSet;
use std::ptr;

#[derive(Debug)]
pub struct FieldGeneratorMap<'a> {
    message: &'a MessageDescriptor,
    classname: String,
    generators: Vec<FieldGenerator<'a>>,
    has_bits: Option<HasBitLayout>,
    oneof_index_base: Option<u32>,
}

impl<'a> FieldGeneratorMap<'a> {
    /// Build one generator per field, in declaration order.
    pub fn new(
        message: &'a MessageDescriptor,
        registry: &TypeRegistry,
    ) -> Result<Self, FieldGenError> {
        let classname = registry.class_name(&message.name);
        let ctx = FieldContext {
            message_name: &message.name,
            classname: &classname,
            registry,
        };

        let mut members_seen = vec![0u32; message.oneofs.len()];
        let mut generators = Vec::with_capacity(message.fields.len());
        for field in &message.fields {
            let policy = classify(field).map_err(|reason| FieldGenError::DispatchGap {
                message: message.name.clone(),
                field: field.name.clone(),
                reason,
            })?;

            let oneof = match &field.oneof {
                Some(name) => {
                    let group_index = message.oneof_index(name).ok_or_else(|| {
                        FieldGenError::UnknownOneof {
                            message: message.name.clone(),
                            field: field.name.clone(),
                            oneof: name.clone(),
                        }
                    })?;
                    let position = members_seen[group_index];
                    members_seen[group_index] += 1;
                    Some(OneofMembership {
                        name: name.clone(),
                        group_index: group_index as u32,
                        position,
                    })
                }
                None => None,
            };

            tracing::trace!("{}.{} -> {}", message.name, field.name, policy.label());
            generators.push(FieldGenerator::new(field, policy, oneof, &ctx)?);
        }

        tracing::debug!(
            "built {} field generators for message {}",
            generators.len(),
            message.name
        );

        Ok(Self {
            message,
            classname,
            generators,
            has_bits: None,
            oneof_index_base: None,
        })
    }

    pub fn message(&self) -> &'a MessageDescriptor {
        self.message
    }

    pub fn classname(&self) -> &str {
        &self.classname
    }

    pub fn generators(&self) -> &[FieldGenerator<'a>] {
        &self.generators
    }

    fn position(&self, field: &FieldDescriptor) -> Result<usize, FieldGenError> {
        self.generators
            .iter()
            .position(|g| ptr::eq(g.descriptor(), field))
            .ok_or_else(|| FieldGenError::ForeignField {
                message: self.message.name.clone(),
                field: field.name.clone(),
            })
    }

    /// Generator for exactly this descriptor. A descriptor that is equal to
    /// one of the message's fields but not one of them is rejected.
    pub fn get(&self, field: &FieldDescriptor) -> Result<&FieldGenerator<'a>, FieldGenError> {
        let index = self.position(field)?;
        Ok(&self.generators[index])
    }

    /// Assign has bits to every field and return how many bits the message
    /// needs in total.
    pub fn calculate_has_bits(&mut self) -> u32 {
        let policies: Vec<FieldPolicy> = self.generators.iter().map(FieldGenerator::policy).collect();
        let layout = HasBitLayout::calculate(&policies);
        let total = layout.total();
        tracing::debug!(
            "message {}: {} standard has bits, {} extra",
            self.message.name,
            layout.standard_bits(),
            layout.extra_bits()
        );
        self.has_bits = Some(layout);
        total
    }

    /// Oneof members take `base + position` as their index and
    /// `base + oneof index` as the slot holding their case.
    pub fn set_oneof_index_base(&mut self, base: u32) {
        tracing::debug!("message {}: oneof index base {}", self.message.name, base);
        self.oneof_index_base = Some(base);
    }

    pub fn has_bit_layout(&self) -> Option<&HasBitLayout> {
        self.has_bits.as_ref()
    }

    pub fn oneof_index_base(&self) -> Option<u32> {
        self.oneof_index_base
    }

    pub fn does_any_field_have_non_zero_default(&self) -> bool {
        self.generators.iter().any(FieldGenerator::has_non_zero_default)
    }

    /// Emitter for `field`, once the allocation passes have run.
    pub fn emitter(&self, field: &FieldDescriptor) -> Result<FieldEmitter<'_, 'a>, FieldGenError> {
        let index = self.position(field)?;
        self.emitter_at(index)
    }

    /// Emitters for every field, in declaration order.
    pub fn emitters(&self) -> Result<Vec<FieldEmitter<'_, 'a>>, FieldGenError> {
        (0..self.generators.len())
            .map(|index| self.emitter_at(index))
            .collect()
    }

    fn emitter_at(&self, index: usize) -> Result<FieldEmitter<'_, 'a>, FieldGenError> {
        let generator = &self.generators[index];
        let presence = self
            .has_bits
            .as_ref()
            .and_then(|layout| layout.get(index))
            .copied()
            .ok_or_else(|| FieldGenError::HasBitsPending {
                message: self.message.name.clone(),
                field: generator.descriptor().name.clone(),
            })?;

        let oneof = match generator.oneof() {
            Some(_) => {
                let base = self.oneof_index_base.ok_or_else(|| {
                    FieldGenError::OneofBasePending {
                        message: self.message.name.clone(),
                        field: generator.descriptor().name.clone(),
                    }
                })?;
                generator.oneof_assignment(base)
            }
            None => None,
        };

        Ok(FieldEmitter::new(generator, presence, oneof))
    }

    /// Allocation summary of every field.
    pub fn presence_slots(&self) -> Result<Vec<PresenceSlot>, FieldGenError> {
        let slots = self
            .emitters()?
            .iter()
            .map(|emitter| {
                let generator = emitter.generator();
                let policy = generator.policy();
                PresenceSlot {
                    field: generator.descriptor().name.clone(),
                    number: generator.descriptor().number,
                    policy: policy.label(),
                    presence: policy.presence(),
                    has_bit: emitter.presence().has_bit,
                    extra_bits_base: emitter.presence().extra_bits_base,
                    oneof: emitter.oneof(),
                }
            })
            .collect();
        Ok(slots)
    }

    pub fn forward_declarations(&self, include_external_types: bool) -> BTreeSet<ForwardDeclaration> {
        let mut decls = BTreeSet::new();
        self.determine_forward_declarations(&mut decls, include_external_types);
        decls
    }

    pub fn determine_forward_declarations(
        &self,
        decls: &mut BTreeSet<ForwardDeclaration>,
        include_external_types: bool,
    ) {
        for generator in &self.generators {
            generator.determine_forward_declarations(decls, include_external_types);
        }
    }

    pub fn determine_objc_class_definitions(&self, classes: &mut BTreeSet<String>) {
        for generator in &self.generators {
            generator.determine_objc_class_definitions(classes);
        }
    }
}

#[cfg(test)]
#[path = "map_tests.rs"]
mod map_tests;
