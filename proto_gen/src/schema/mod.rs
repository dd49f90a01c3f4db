pub mod file;
pub mod registry;

pub use file::{SchemaError, SchemaFile};
pub use registry::{TypeCategory, TypeEntry, TypeRegistry};
