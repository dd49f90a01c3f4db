/* Codegen command - generate Objective-C sources from schema files */

use super::common::load_schemas;
use crate::codegen::{ObjCCodeGenerator, ObjCCodeGeneratorOptions};
use anyhow::{Context, bail};
use std::path::PathBuf;

/* Execute the codegen command */
pub fn run(
    files: Vec<PathBuf>,
    output_dir: PathBuf,
    class_prefix: Option<String>,
    include_external_types: bool,
    verbose: bool,
) -> anyhow::Result<()> {
    if files.is_empty() {
        bail!("no schema files given");
    }

    if verbose {
        println!("Proto Generator - Objective-C Code Generation");
        println!("=============================================\n");
        println!("[~] Configuration:");
        println!("  Output directory: {}", output_dir.display());
        if let Some(prefix) = &class_prefix {
            println!("  Class prefix: {}", prefix);
        }
        println!("  Include external types: {}", include_external_types);
        println!("  Input files: {}", files.len());
        for file in &files {
            println!("    - {}", file.display());
        }
        println!();
    }

    let schemas = load_schemas(&files, verbose)?;

    let generator = ObjCCodeGenerator::new(ObjCCodeGeneratorOptions {
        output_dir: output_dir.to_string_lossy().to_string(),
        emit_header: true,
        emit_source: true,
        include_external_types,
        class_prefix,
    });

    for schema in &schemas {
        let origin = schema
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let written = generator
            .emit_code(schema)
            .with_context(|| format!("code generation failed for {}", origin))?;
        for path in written {
            println!("[✓] Generated {}", path.display());
        }
    }

    if verbose {
        println!("\n[✓] Code generation complete!");
    }
    Ok(())
}
