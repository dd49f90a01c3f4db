//! Schema Descriptor Definitions
//!
//! This crate contains the immutable schema facts consumed by the code
//! generator: files, messages, oneofs, fields and enums. It provides pure
//! data structures without any file I/O or code generation logic.

pub mod descriptor;
pub mod types;

// Re-export commonly used types at the crate root
pub use descriptor::*;
pub use types::*;
