/* Common utilities shared between analyze and codegen commands */

use crate::schema::SchemaFile;
use anyhow::Context;
use std::path::PathBuf;

/* Load every schema file named on the command line */
pub fn load_schemas(files: &[PathBuf], verbose: bool) -> anyhow::Result<Vec<SchemaFile>> {
    if verbose {
        println!("[~] Loading schema files...");
    }

    let mut schemas = Vec::with_capacity(files.len());
    for path in files {
        let schema = SchemaFile::load(path)
            .with_context(|| format!("while loading {}", path.display()))?;
        if verbose {
            let file = &schema.descriptor;
            println!(
                "  - {} (package '{}', {} messages, {} enums)",
                path.display(),
                file.package,
                file.messages.len(),
                file.enums.len()
            );
        }
        schemas.push(schema);
    }

    if verbose {
        println!();
    }
    Ok(schemas)
}
