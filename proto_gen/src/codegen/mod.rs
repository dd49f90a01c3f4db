pub mod escape;
pub mod names;
pub mod objc;
pub mod objc_gen;
pub mod printer;

pub use objc::{CodegenError, GeneratedFile, ObjCCodeGenerator, ObjCCodeGeneratorOptions};
pub use printer::{Printer, PrinterError};
