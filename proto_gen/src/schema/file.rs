use proto_types::FileDescriptor;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_yml::Error,
    },

    #[error("type '{name}' is declared more than once in package '{package}'")]
    DuplicateType { package: String, name: String },
}

/* A loaded schema file: the descriptor plus where it came from */
#[derive(Debug, Clone)]
pub struct SchemaFile {
    pub path: Option<PathBuf>,
    pub descriptor: FileDescriptor,
}

impl SchemaFile {
    /* Load and parse a YAML schema file from disk */
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let descriptor = parse_descriptor(&content, &path.display().to_string())?;
        tracing::debug!(
            "loaded schema {} ({} messages, {} enums)",
            path.display(),
            descriptor.messages.len(),
            descriptor.enums.len()
        );
        Ok(Self {
            path: Some(path.to_path_buf()),
            descriptor,
        })
    }

    /* Parse a YAML schema held in memory */
    pub fn parse(content: &str) -> Result<Self, SchemaError> {
        Ok(Self {
            path: None,
            descriptor: parse_descriptor(content, "<inline>")?,
        })
    }

    /* Base name used for generated outputs, e.g. `foo/bar.yaml` -> `Bar` */
    pub fn output_stem(&self) -> String {
        let stem = self
            .path
            .as_ref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| {
                self.descriptor
                    .package
                    .rsplit('.')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            });
        crate::codegen::names::underscores_to_camel_case(&stem, true)
    }
}

fn parse_descriptor(content: &str, origin: &str) -> Result<FileDescriptor, SchemaError> {
    serde_yml::from_str(content).map_err(|source| SchemaError::Parse {
        origin: origin.to_string(),
        source,
    })
}
