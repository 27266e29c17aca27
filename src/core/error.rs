// Error handling for the dBase reader

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbfError>;

#[derive(Error, Debug)]
pub enum DbfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Truncated {structure} at offset {offset}: expected {expected} bytes, got {found}")]
    Truncated {
        structure: &'static str,
        offset: u64,
        expected: usize,
        found: usize,
    },

    #[error("Unrecognized field type '{0}'")]
    UnrecognizedFieldType(char),

    #[error("Record index {index} out of range (record count {count})")]
    IndexOutOfRange { index: u32, count: u32 },

    #[error("Truncated record {index}: expected {expected} bytes, got {found}")]
    TruncatedRecord {
        index: u32,
        expected: usize,
        found: usize,
    },

    #[error("Malformed value in field {field}: {raw:?} ({reason})")]
    MalformedValue {
        field: String,
        raw: String,
        reason: String,
    },

    #[error("Corrupted layout: {0}")]
    CorruptedLayout(String),

    #[error("Byte source lock poisoned by a panicking reader")]
    LockPoisoned,
}
