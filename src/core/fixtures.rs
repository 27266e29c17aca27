// Builders for small in-memory .dbf images used by unit tests

use crate::core::constants::*;

pub fn descriptor(name: &str, tag: u8, length: u8, decimals: u8) -> [u8; DESCRIPTOR_SIZE] {
    let mut raw = [0u8; DESCRIPTOR_SIZE];
    raw[..name.len()].copy_from_slice(name.as_bytes());
    raw[DESCRIPTOR_TYPE_OFFSET] = tag;
    raw[DESCRIPTOR_LENGTH_OFFSET] = length;
    raw[DESCRIPTOR_DECIMALS_OFFSET] = decimals;
    raw
}

/// Assembles a file from `(name, tag, length, decimals)` columns and
/// already-encoded record bodies (without the deletion flag). Records are
/// padded with spaces to the computed record length.
pub struct Image {
    pub fields: Vec<(&'static str, u8, u8, u8)>,
    pub records: Vec<(u8, Vec<u8>)>,
    pub record_count: Option<u32>,
    pub extra_record_bytes: u16,
}

impl Image {
    pub fn new(fields: Vec<(&'static str, u8, u8, u8)>) -> Self {
        Self {
            fields,
            records: Vec::new(),
            record_count: None,
            extra_record_bytes: 0,
        }
    }

    pub fn record(mut self, body: &[u8]) -> Self {
        self.records.push((RECORD_ACTIVE, body.to_vec()));
        self
    }

    pub fn deleted_record(mut self, body: &[u8]) -> Self {
        self.records.push((RECORD_DELETED, body.to_vec()));
        self
    }

    pub fn record_length(&self) -> u16 {
        let fields: u16 = self.fields.iter().map(|f| u16::from(f.2)).sum();
        DELETION_FLAG_SIZE as u16 + fields + self.extra_record_bytes
    }

    pub fn header_length(&self) -> u16 {
        (HEADER_SIZE + self.fields.len() * DESCRIPTOR_SIZE + 1) as u16
    }

    pub fn build(&self) -> Vec<u8> {
        let record_length = self.record_length();
        let count = self.record_count.unwrap_or(self.records.len() as u32);

        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes[0] = 0x03;
        bytes[1] = 124;
        bytes[2] = 1;
        bytes[3] = 15;
        bytes[4..8].copy_from_slice(&count.to_le_bytes());
        bytes[8..10].copy_from_slice(&self.header_length().to_le_bytes());
        bytes[10..12].copy_from_slice(&record_length.to_le_bytes());

        for &(name, tag, length, decimals) in &self.fields {
            bytes.extend_from_slice(&descriptor(name, tag, length, decimals));
        }
        bytes.push(DESCRIPTOR_TERMINATOR);

        for (flag, body) in &self.records {
            let mut record = vec![b' '; usize::from(record_length)];
            record[0] = *flag;
            record[1..1 + body.len()].copy_from_slice(body);
            bytes.extend_from_slice(&record);
        }

        bytes
    }
}
