// Random-access dBase reader - safe to share across threads

use crate::core::constants::*;
use crate::core::error::{DbfError, Result};
use crate::core::field::{self, FieldDescriptor, FieldType};
use crate::core::header::Header;
use crate::core::source::{read_exact_at, ByteSource, FileSource, LockedSource};
use crate::core::value::{decode_record, Record};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, trace};

/// Reader over one .dbf image. Header and schema are parsed once in the
/// constructor and never change afterwards; records are fetched on demand
/// with positioned reads, so `read` can be called from many threads at once.
#[derive(Debug)]
pub struct DbfReader<S = FileSource> {
    source: S,
    header: Header,
    fields: Vec<FieldDescriptor>,
    // Deletion flag plus all field widths; bytes past it are padding
    data_length: usize,
}

impl DbfReader<FileSource> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening dBase file: {}", path.display());
        let file = File::open(path)?;
        Self::new(LockedSource::new(file))
    }
}

impl<S: ByteSource> DbfReader<S> {
    pub fn new(source: S) -> Result<Self> {
        let header_bytes = read_exact_at(&source, 0, HEADER_SIZE, "header")?;
        let header = Header::parse(&header_bytes)?;
        let fields = field::parse_table(&source)?;

        let data_length = validate_layout(&header, &fields)?;

        let (year, month, day) = header.mod_date();
        info!(
            "dBase schema parsed: version={:#04x}, modified={:04}-{:02}-{:02}, records={}, fields={}",
            header.version,
            year,
            month,
            day,
            header.record_count,
            fields.len()
        );

        Ok(Self {
            source,
            header,
            fields,
            data_length,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn mod_date(&self) -> (u16, u8, u8) {
        self.header.mod_date()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn len(&self) -> u32 {
        self.header.record_count
    }

    pub fn is_empty(&self) -> bool {
        self.header.record_count == 0
    }

    /// Decodes record `index`. Deleted records are returned like any other;
    /// use [`DbfReader::is_deleted`] to filter them.
    ///
    /// Trailing padding between the last field and `record_length` may be
    /// missing at the end of the file; only the field bytes are required.
    pub fn read(&self, index: u32) -> Result<Record> {
        let offset = self.record_offset(index)?;
        let record_length = usize::from(self.header.record_length);

        let mut buf = vec![0u8; record_length];
        let found = self.source.read_at(offset, &mut buf)?;
        if found < self.data_length {
            return Err(DbfError::TruncatedRecord {
                index,
                expected: self.data_length,
                found,
            });
        }

        debug!("Read record {} ({} bytes at offset {})", index, found, offset);
        decode_record(&self.fields, &buf[..found])
    }

    /// Reads only the deletion flag of record `index`.
    pub fn is_deleted(&self, index: u32) -> Result<bool> {
        let offset = self.record_offset(index)?;

        let mut flag = [0u8; DELETION_FLAG_SIZE];
        if self.source.read_at(offset, &mut flag)? < DELETION_FLAG_SIZE {
            return Err(DbfError::TruncatedRecord {
                index,
                expected: self.data_length,
                found: 0,
            });
        }

        Ok(flag[0] == RECORD_DELETED)
    }

    fn record_offset(&self, index: u32) -> Result<u64> {
        if index >= self.header.record_count {
            return Err(DbfError::IndexOutOfRange {
                index,
                count: self.header.record_count,
            });
        }
        let offset = self.header.record_offset(index);
        trace!("Record {} at offset {}", index, offset);
        Ok(offset)
    }
}

/// Checks the record and header geometry against the field table and
/// returns the number of bytes a record needs for its fields.
fn validate_layout(header: &Header, fields: &[FieldDescriptor]) -> Result<usize> {
    for f in fields {
        if f.length == 0 {
            return Err(DbfError::CorruptedLayout(format!(
                "field {} has zero length",
                f.name
            )));
        }
        let expected = match f.field_type {
            FieldType::Date => Some(DATE_FIELD_LEN),
            FieldType::Logical => Some(LOGICAL_FIELD_LEN),
            _ => None,
        };
        if let Some(expected) = expected.filter(|&len| len != f.length) {
            return Err(DbfError::CorruptedLayout(format!(
                "{} field {} must be {} bytes wide, found {}",
                f.field_type.tag(),
                f.name,
                expected,
                f.length
            )));
        }
    }

    let data_length: usize =
        DELETION_FLAG_SIZE + fields.iter().map(|f| usize::from(f.length)).sum::<usize>();
    if usize::from(header.record_length) < data_length {
        return Err(DbfError::CorruptedLayout(format!(
            "record length {} is shorter than its fields ({} bytes)",
            header.record_length, data_length
        )));
    }

    let schema_length = HEADER_SIZE + fields.len() * DESCRIPTOR_SIZE + 1;
    if usize::from(header.header_length) < schema_length {
        return Err(DbfError::CorruptedLayout(format!(
            "header length {} overlaps the field table ({} bytes)",
            header.header_length, schema_length
        )));
    }

    Ok(data_length)
}
