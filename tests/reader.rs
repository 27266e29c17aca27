use dbf_reader::{DbfError, DbfReader, LockedSource, Value};
use std::collections::HashMap;
use std::io::{Cursor, Write};

// Ordnance Survey place-name extract: OBJECTID N(11,0), Name C(50), Shape_Leng F(9,4)
const HEADER_AND_SCHEMA: &[u8] = &[
    0x03, 0x6F, 0x07, 0x1A, 0x0D, 0x21, 0x00, 0x00, 0x81, 0x00, 0x55, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x4F, 0x42, 0x4A, 0x45, 0x43, 0x54, 0x49, 0x44, 0x00, 0x00, 0x00, 0x4E, 0x00, 0x00, 0x00, 0x00,
    0x0B, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x4E, 0x61, 0x6D, 0x65, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x43, 0x00, 0x00, 0x00, 0x00,
    0x32, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x53, 0x68, 0x61, 0x70, 0x65, 0x5F, 0x4C, 0x65, 0x6E, 0x67, 0x00, 0x46, 0x00, 0x00, 0x00, 0x00,
    0x09, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x0D,
];

// The single record as stored: 71 bytes, 14 short of the declared record
// length because the file ends without trailing padding
const FIRST_RECORD: &[u8] = &[
    0x20,
    0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x31,
    0x41, 0x62, 0x62, 0x6F, 0x74, 0x73, 0x62, 0x75, 0x72, 0x79, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20,
    0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20,
    0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20,
    0x20, 0x20,
    0x20, 0x30, 0x2E, 0x30, 0x35, 0x32, 0x34, 0x36, 0x37,
];

const RECORD_LENGTH: usize = 0x55;

fn record(flag: u8, object_id: &str, name: &str, shape_leng: &str) -> Vec<u8> {
    let mut bytes = vec![flag];
    bytes.extend_from_slice(format!("{:>11}", object_id).as_bytes());
    bytes.extend_from_slice(format!("{:<50}", name).as_bytes());
    bytes.extend_from_slice(format!("{:>9}", shape_leng).as_bytes());
    // Records followed by another one carry their full padding
    bytes.resize(RECORD_LENGTH, b' ');
    bytes
}

fn sample_file() -> Vec<u8> {
    [HEADER_AND_SCHEMA, FIRST_RECORD].concat()
}

fn two_record_file() -> Vec<u8> {
    let mut bytes = HEADER_AND_SCHEMA.to_vec();
    bytes.extend(record(b' ', "1", "Abbotsbury", "0.052467"));
    bytes.extend(record(b'*', "", "Abberley", ""));
    bytes
}

fn sample_reader() -> DbfReader<LockedSource<Cursor<Vec<u8>>>> {
    DbfReader::new(LockedSource::new(Cursor::new(sample_file()))).unwrap()
}

fn two_record_reader() -> DbfReader<LockedSource<Cursor<Vec<u8>>>> {
    DbfReader::new(LockedSource::new(Cursor::new(two_record_file()))).unwrap()
}

#[test]
fn test_mod_date() {
    assert_eq!(sample_reader().mod_date(), (2011, 7, 26));
}

#[test]
fn test_field_names() {
    let reader = sample_reader();
    assert_eq!(reader.field_names(), vec!["OBJECTID", "Name", "Shape_Leng"]);
}

#[test]
fn test_header_geometry() {
    let reader = sample_reader();
    let header = reader.header();
    assert_eq!(header.version, 0x03);
    assert_eq!(header.header_length, 129);
    assert_eq!(header.record_length, 85);
    assert_eq!(reader.len(), 8461);
}

#[test]
fn test_unrecognized_field_type() {
    let bad_field_type: &[u8] = &[
        0x03, 0x6F, 0x07, 0x1A, 0x00, 0x00, 0x00, 0x00, 0x41, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x4F, 0x42, 0x4A, 0x45, 0x43, 0x54, 0x49, 0x44, 0x00, 0x00, 0x00, 0x42, 0x00, 0x00, 0x00, 0x00,
        0x0B, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x0D,
    ];

    let err = DbfReader::new(bad_field_type).unwrap_err();
    assert!(matches!(err, DbfError::UnrecognizedFieldType('B')));
    assert_eq!(err.to_string(), "Unrecognized field type 'B'");
}

#[test]
fn test_one_read() {
    let expected: HashMap<String, Value> = HashMap::from([
        ("OBJECTID".to_string(), Value::Integer(1)),
        ("Name".to_string(), Value::Character("Abbotsbury".to_string())),
        ("Shape_Leng".to_string(), Value::Float(0.052467)),
    ]);
    assert_eq!(sample_reader().read(0).unwrap(), expected);
}

#[test]
fn test_blank_numeric_reads_as_zero() {
    let reader = two_record_reader();
    let record = reader.read(1).unwrap();

    assert!(reader.is_deleted(1).unwrap());
    assert_eq!(record["OBJECTID"], Value::Integer(0));
    assert_eq!(record["Shape_Leng"], Value::Float(0.0));
    assert_eq!(record["Name"], Value::Character("Abberley".to_string()));
}

#[test]
fn test_out_of_range() {
    let reader = sample_reader();
    assert!(matches!(
        reader.read(8461),
        Err(DbfError::IndexOutOfRange { index: 8461, count: 8461 })
    ));
}

#[test]
fn test_short_file_names_record() {
    // The header claims 8461 records but only two are present
    let err = two_record_reader().read(2).unwrap_err();
    assert!(matches!(err, DbfError::TruncatedRecord { index: 2, found: 0, .. }));
    assert!(err.to_string().contains("record 2"));

    let err = sample_reader().read(1).unwrap_err();
    assert!(matches!(err, DbfError::TruncatedRecord { index: 1, expected: 71, found: 0 }));
}

#[test]
fn test_malformed_value() {
    let mut bytes = HEADER_AND_SCHEMA.to_vec();
    bytes.extend(record(b' ', "12x", "Abbotsbury", "0.1"));
    let reader = DbfReader::new(bytes).unwrap();

    match reader.read(0) {
        Err(DbfError::MalformedValue { field, raw, .. }) => {
            assert_eq!(field, "OBJECTID");
            assert_eq!(raw.trim(), "12x");
        }
        other => panic!("expected malformed value, got {:?}", other),
    }
}

#[test]
fn test_concurrent_reads() {
    let reader = two_record_reader();
    let expected = reader.read(0).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let reader = &reader;
                scope.spawn(move || {
                    // Interleave both records so the shared stream is repositioned constantly
                    (0..50)
                        .map(|n| reader.read(((i + n) % 2) as u32))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            for (n, result) in handle.join().unwrap().into_iter().enumerate() {
                let record = result.unwrap();
                if (i + n) % 2 == 0 {
                    assert_eq!(record, expected);
                } else {
                    assert_eq!(record["Name"], Value::Character("Abberley".to_string()));
                }
            }
        }
    });
}

#[test]
fn test_open_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&sample_file()).unwrap();
    file.flush().unwrap();

    let reader = DbfReader::open(file.path()).unwrap();
    assert_eq!(reader.field_names(), ["OBJECTID", "Name", "Shape_Leng"]);
    assert_eq!(
        reader.read(0).unwrap()["Name"],
        Value::Character("Abbotsbury".to_string())
    );
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        DbfReader::open(dir.path().join("missing.dbf")),
        Err(DbfError::Io(_))
    ));
}
