pub mod data_type;
pub mod defaults;
pub mod description;
pub mod emitter;
pub mod enum_gen;
pub mod error;
pub mod field;
pub mod flags;
pub mod fwd_decls;
pub mod map;
pub mod message;
pub mod policy;
pub mod presence;
pub mod variables;

// Re-export main public types
pub use description::FieldDescription;
pub use emitter::FieldEmitter;
pub use enum_gen::EnumGenerator;
pub use error::FieldGenError;
pub use field::FieldGenerator;
pub use fwd_decls::ForwardDeclaration;
pub use map::FieldGeneratorMap;
pub use message::MessageGenerator;
pub use policy::{classify, FieldPolicy, ObjectKind, PresenceMechanism, ValueShape};
pub use presence::{HasBit, HasBitLayout, OneofAssignment, PresenceAssignment, PresenceSlot};
pub use variables::{VarKey, VariableMap};
