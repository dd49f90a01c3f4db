use super::policy::ClassifyError;
use crate::codegen::printer::PrinterError;
use thiserror::Error;

/// Failures while building or emitting the generators of one message.
///
/// None of these are recoverable: each one aborts generation of the message
/// named in the error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldGenError {
    #[error("no generator for field '{message}.{field}': {reason}")]
    DispatchGap {
        message: String,
        field: String,
        reason: ClassifyError,
    },

    #[error("field '{field}' does not belong to message '{message}'")]
    ForeignField { message: String, field: String },

    #[error("has bits of message '{message}' were read before they were calculated (field '{field}')")]
    HasBitsPending { message: String, field: String },

    #[error("oneof index base of message '{message}' was read before it was set (field '{field}')")]
    OneofBasePending { message: String, field: String },

    #[error("field '{message}.{field}' names undeclared oneof '{oneof}'")]
    UnknownOneof {
        message: String,
        field: String,
        oneof: String,
    },

    #[error("field '{message}.{field}' references unknown type '{type_name}'")]
    UnresolvedType {
        message: String,
        field: String,
        type_name: String,
    },

    #[error("field '{message}.{field}' has invalid default value: {reason}")]
    InvalidDefault {
        message: String,
        field: String,
        reason: String,
    },

    #[error(transparent)]
    Printer(#[from] PrinterError),
}
