// dBase (.dbf) Rust Reader
// Main library entry point

pub mod core;

// Re-export main types
pub use crate::core::error::{DbfError, Result};
pub use crate::core::field::{FieldDescriptor, FieldType};
pub use crate::core::header::Header;
pub use crate::core::reader::DbfReader;
pub use crate::core::source::{ByteSource, FileSource, LockedSource};
pub use crate::core::value::{Record, Value};
