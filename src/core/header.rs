// dBase file header (first 32 bytes)

use crate::core::constants::*;
use crate::core::error::{DbfError, Result};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    pub version: u8,
    /// Years since 1900, as stored.
    pub mod_year_offset: u8,
    pub mod_month: u8,
    pub mod_day: u8,
    pub record_count: u32,
    /// Byte offset of the first record.
    pub header_length: u16,
    /// Size of one record, deletion flag included.
    pub record_length: u16,
}

impl Header {
    /// Parses the fixed header. Only the length is checked here; the
    /// geometry is validated once the field table is known.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(DbfError::Truncated {
                structure: "header",
                offset: 0,
                expected: HEADER_SIZE,
                found: bytes.len(),
            });
        }

        Ok(Self {
            version: bytes[HEADER_VERSION_OFFSET],
            mod_year_offset: bytes[HEADER_DATE_OFFSET],
            mod_month: bytes[HEADER_DATE_OFFSET + 1],
            mod_day: bytes[HEADER_DATE_OFFSET + 2],
            record_count: u32::from_le_bytes([
                bytes[HEADER_RECORD_COUNT_OFFSET],
                bytes[HEADER_RECORD_COUNT_OFFSET + 1],
                bytes[HEADER_RECORD_COUNT_OFFSET + 2],
                bytes[HEADER_RECORD_COUNT_OFFSET + 3],
            ]),
            header_length: u16::from_le_bytes([
                bytes[HEADER_LENGTH_OFFSET],
                bytes[HEADER_LENGTH_OFFSET + 1],
            ]),
            record_length: u16::from_le_bytes([
                bytes[HEADER_RECORD_LENGTH_OFFSET],
                bytes[HEADER_RECORD_LENGTH_OFFSET + 1],
            ]),
        })
    }

    /// Modification date as (year, month, day) with the year normalized.
    pub fn mod_date(&self) -> (u16, u8, u8) {
        (
            YEAR_BASE + u16::from(self.mod_year_offset),
            self.mod_month,
            self.mod_day,
        )
    }

    /// Calendar form of [`Header::mod_date`], `None` when the stored bytes
    /// do not name a real day.
    pub fn mod_naive_date(&self) -> Option<NaiveDate> {
        let (year, month, day) = self.mod_date();
        NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
    }

    pub fn record_offset(&self, index: u32) -> u64 {
        u64::from(self.header_length) + u64::from(index) * u64::from(self.record_length)
    }
}
