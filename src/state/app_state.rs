use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use dbf_reader::DbfReader;

/// Readers are immutable after opening and read records with positioned
/// reads, so handlers share them without a lock.
pub type SharedReader = Arc<DbfReader>;

#[derive(Clone)]
pub struct OpenedFile {
    pub path: String,
    pub reader: SharedReader,
}

#[derive(Clone)]
pub struct FieldInfo {
    pub reader_id: String,
    pub reader: SharedReader,
    pub original_name: String, // The actual field name in the file
}

#[derive(Clone)]
pub struct AppState {
    // reader id -> opened file
    pub readers: Arc<RwLock<HashMap<String, OpenedFile>>>,
    // unique header name -> field (with reader and original name)
    pub fields: Arc<RwLock<HashMap<String, FieldInfo>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            readers: Arc::new(RwLock::new(HashMap::new())),
            fields: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers an opened file and all of its fields. Returns the new
    /// reader id and the exposed header names, in field order.
    pub async fn register(&self, path: String, reader: SharedReader) -> (String, Vec<String>) {
        let reader_id = Uuid::new_v4().to_string();

        // Lock order: readers, then fields
        let mut readers = self.readers.write().await;
        let mut fields = self.fields.write().await;

        let mut headers = Vec::with_capacity(reader.fields().len());
        for name in reader.field_names() {
            let header = unique_header(&*fields, name);
            fields.insert(
                header.clone(),
                FieldInfo {
                    reader_id: reader_id.clone(),
                    reader: reader.clone(),
                    original_name: name.to_string(),
                },
            );
            headers.push(header);
        }

        readers.insert(reader_id.clone(), OpenedFile { path, reader });

        (reader_id, headers)
    }

    pub async fn reader(&self, reader_id: &str) -> Option<OpenedFile> {
        self.readers.read().await.get(reader_id).cloned()
    }

    pub async fn field(&self, header: &str) -> Option<FieldInfo> {
        self.fields.read().await.get(header).cloned()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// `base` if free, otherwise the first free `base_1`, `base_2`, ...
pub fn unique_header<V>(taken: &HashMap<String, V>, base: &str) -> String {
    if !taken.contains_key(base) {
        return base.to_string();
    }
    (1..)
        .map(|i| format!("{}_{}", base, i))
        .find(|candidate| !taken.contains_key(candidate))
        .unwrap_or_else(|| base.to_string())
}
