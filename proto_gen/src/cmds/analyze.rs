/* Analyze command - report how each message's presence storage is laid out */

use super::common::load_schemas;
use crate::codegen::objc::root_class_name;
use crate::codegen::objc_gen::{HasBit, MessageGenerator, PresenceSlot};
use crate::schema::{SchemaFile, TypeRegistry};
use anyhow::Context;
use clap::ValueEnum;
use serde_derive::Serialize;
use std::path::PathBuf;

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum OutputFormat {
    /* Human readable summary */
    Text,
    /* One JSON document with every message */
    Json,
}

/* Allocation results for one message */
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MessageReport {
    pub message: String,
    pub class: String,
    pub has_bits: u32,
    pub standard_bits: u32,
    pub extra_bits: u32,
    pub has_storage_size: u32,
    pub oneof_index_base: Option<u32>,
    pub any_non_zero_default: bool,
    pub fields: Vec<PresenceSlot>,
}

/* Build the reports for every message of a schema */
pub fn message_reports(schema: &SchemaFile) -> anyhow::Result<Vec<MessageReport>> {
    let file = &schema.descriptor;
    let registry = TypeRegistry::from_file(file)?;
    let root_class = root_class_name(registry.class_prefix(), &schema.output_stem());

    let mut reports = Vec::with_capacity(file.messages.len());
    for message in &file.messages {
        let generator = MessageGenerator::new(message, &registry, &root_class)
            .with_context(|| format!("while analyzing message '{}'", message.name))?;
        let fields = generator.fields();
        let (has_bits, standard_bits, extra_bits) = fields
            .has_bit_layout()
            .map(|l| (l.total(), l.standard_bits(), l.extra_bits()))
            .unwrap_or_default();
        reports.push(MessageReport {
            message: message.name.clone(),
            class: generator.classname().to_string(),
            has_bits,
            standard_bits,
            extra_bits,
            has_storage_size: generator.has_storage_size(),
            oneof_index_base: fields.oneof_index_base(),
            any_non_zero_default: fields.does_any_field_have_non_zero_default(),
            fields: fields.presence_slots()?,
        });
    }
    Ok(reports)
}

/* Execute the analyze command */
pub fn run(files: Vec<PathBuf>, format: OutputFormat) -> anyhow::Result<()> {
    let verbose = format == OutputFormat::Text;
    if verbose {
        println!("Proto Generator - Presence Analysis Tool");
        println!("=======================================\n");
    }

    let schemas = load_schemas(&files, verbose)?;

    let mut all_reports = Vec::new();
    for schema in &schemas {
        all_reports.extend(message_reports(schema)?);
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&all_reports)?);
        }
        OutputFormat::Text => {
            for report in &all_reports {
                print_report(report);
            }
        }
    }
    Ok(())
}

fn print_report(report: &MessageReport) {
    println!("[~] Message {} ({})", report.message, report.class);
    println!(
        "    has bits: {} ({} standard, {} extra), _has_storage_[{}]",
        report.has_bits, report.standard_bits, report.extra_bits, report.has_storage_size
    );
    if let Some(base) = report.oneof_index_base {
        println!("    oneof index base: {}", base);
    }
    if report.any_non_zero_default {
        println!("    uses field descriptions with defaults");
    }
    for slot in &report.fields {
        let mut line = format!("    - {} #{} [{}]", slot.field, slot.number, slot.policy);
        match slot.has_bit {
            HasBit::Index(index) => line.push_str(&format!(" has-bit {}", index)),
            HasBit::NoHasBit => line.push_str(" no has-bit"),
        }
        if let Some(base) = slot.extra_bits_base {
            line.push_str(&format!(", extra bits from {}", base));
        }
        if let Some(oneof) = slot.oneof {
            line.push_str(&format!(
                ", oneof index {} (case slot {})",
                oneof.index, oneof.case_slot
            ));
        }
        println!("{}", line);
    }
    println!();
}
