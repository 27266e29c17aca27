// Example usage of the dBase reader

use dbf_reader::{DbfReader, Result};
use std::env;
use tracing::{info, warn, Level};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    let path = env::args().nth(1).unwrap_or_else(|| "data/places.dbf".to_string());
    let reader = DbfReader::open(&path)?;

    let (year, month, day) = reader.mod_date();
    info!("Last modified: {:04}-{:02}-{:02}", year, month, day);
    info!("Records: {}", reader.len());

    info!("Fields:");
    for field in reader.fields() {
        info!(
            "  {} {}({}, {})",
            field.name,
            field.field_type.tag(),
            field.length,
            field.decimal_count
        );
    }

    // Random access: first few records, skipping deleted ones
    for index in 0..reader.len().min(5) {
        if reader.is_deleted(index)? {
            warn!("Record {} is marked deleted", index);
            continue;
        }
        let record = reader.read(index)?;
        for name in reader.field_names() {
            info!("  [{}] {} = {:?}", index, name, record[name]);
        }
    }

    // Last record, if the file holds any
    if !reader.is_empty() {
        let last = reader.len() - 1;
        info!("Last record: {:?}", reader.read(last)?);
    }

    Ok(())
}
