// Layout constants for dBase (.dbf) files

// File header: version(u8) yy(u8) mm(u8) dd(u8) records(u32) header_len(u16) record_len(u16) reserved(20)
pub const HEADER_SIZE: usize = 32;

pub const HEADER_VERSION_OFFSET: usize = 0;
pub const HEADER_DATE_OFFSET: usize = 1;
pub const HEADER_RECORD_COUNT_OFFSET: usize = 4;
pub const HEADER_LENGTH_OFFSET: usize = 8;
pub const HEADER_RECORD_LENGTH_OFFSET: usize = 10;

// Modification year is stored as an offset from this base
pub const YEAR_BASE: u16 = 1900;

// Field descriptor: name(11) type(1) reserved(4) length(u8) decimals(u8) reserved(14)
pub const DESCRIPTOR_SIZE: usize = 32;

pub const DESCRIPTOR_NAME_LEN: usize = 11;
pub const DESCRIPTOR_TYPE_OFFSET: usize = 11;
pub const DESCRIPTOR_LENGTH_OFFSET: usize = 16;
pub const DESCRIPTOR_DECIMALS_OFFSET: usize = 17;

// Ends the descriptor table in place of a descriptor's first byte
pub const DESCRIPTOR_TERMINATOR: u8 = 0x0D;

// First byte of every record
pub const RECORD_ACTIVE: u8 = 0x20;
pub const RECORD_DELETED: u8 = 0x2A;
pub const DELETION_FLAG_SIZE: usize = 1;

// Fixed widths for date (YYYYMMDD) and logical fields
pub const DATE_FIELD_LEN: u8 = 8;
pub const LOGICAL_FIELD_LEN: u8 = 1;
