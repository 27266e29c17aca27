pub mod constants;
pub mod error;
pub mod field;
pub mod header;
pub mod reader;
pub mod source;
pub mod value;

#[cfg(test)]
pub(crate) mod fixtures;
