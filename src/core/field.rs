// Field descriptor table

use crate::core::constants::*;
use crate::core::error::{DbfError, Result};
use crate::core::source::ByteSource;
use serde::Serialize;
use tracing::{debug, warn};

/// Column type, resolved once from the descriptor's type character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldType {
    Character,
    Numeric,
    Float,
    Date,
    Logical,
}

impl FieldType {
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            b'C' => Ok(FieldType::Character),
            b'N' => Ok(FieldType::Numeric),
            b'F' => Ok(FieldType::Float),
            b'D' => Ok(FieldType::Date),
            b'L' => Ok(FieldType::Logical),
            other => Err(DbfError::UnrecognizedFieldType(char::from(other))),
        }
    }

    pub fn tag(self) -> char {
        match self {
            FieldType::Character => 'C',
            FieldType::Numeric => 'N',
            FieldType::Float => 'F',
            FieldType::Date => 'D',
            FieldType::Logical => 'L',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    /// Width in bytes inside a record.
    pub length: u8,
    /// Digits after the decimal point; only numeric fields use it.
    pub decimal_count: u8,
}

impl FieldDescriptor {
    pub fn parse(bytes: &[u8; DESCRIPTOR_SIZE]) -> Result<Self> {
        let field_type = FieldType::from_tag(bytes[DESCRIPTOR_TYPE_OFFSET])?;

        Ok(Self {
            name: parse_name(&bytes[..DESCRIPTOR_NAME_LEN]),
            field_type,
            length: bytes[DESCRIPTOR_LENGTH_OFFSET],
            decimal_count: bytes[DESCRIPTOR_DECIMALS_OFFSET],
        })
    }
}

// Names are NUL terminated inside their 11 bytes, some writers pad with spaces
fn parse_name(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim_end().to_string()
}

/// Reads descriptors following the file header until the terminator byte.
pub fn parse_table<S: ByteSource + ?Sized>(source: &S) -> Result<Vec<FieldDescriptor>> {
    let mut fields = Vec::new();
    let mut offset = HEADER_SIZE as u64;

    loop {
        let mut buf = [0u8; DESCRIPTOR_SIZE];
        let found = source.read_at(offset, &mut buf)?;

        if found > 0 && buf[0] == DESCRIPTOR_TERMINATOR {
            break;
        }
        if found < DESCRIPTOR_SIZE {
            return Err(DbfError::Truncated {
                structure: "field descriptor",
                offset,
                expected: DESCRIPTOR_SIZE,
                found,
            });
        }

        let field = FieldDescriptor::parse(&buf)?;
        debug!(
            "Field {}: name={}, type={}, length={}, decimals={}",
            fields.len(),
            field.name,
            field.field_type.tag(),
            field.length,
            field.decimal_count
        );
        if fields.iter().any(|f: &FieldDescriptor| f.name == field.name) {
            warn!(
                "Duplicate field name {}: decoded records keep only the last column",
                field.name
            );
        }
        fields.push(field);
        offset += DESCRIPTOR_SIZE as u64;
    }

    Ok(fields)
}
