use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Manifest read from `plugin.json` and posted to the core on registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtensionConfig {
    pub name: String,
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    pub mode: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub cmd: Vec<String>,
    pub enabled: bool,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub git_path: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub post_url: String,
    #[serde(default)]
    pub webpage: String,
    #[serde(default = "default_file_formats")]
    pub file_formats: Vec<String>,
    #[serde(default)]
    pub ask_form: bool,
    pub connection: Connection,
    #[serde(default)]
    pub configuration: Value,
}

fn default_file_formats() -> Vec<String> {
    vec!["dbf".to_string()]
}

impl ExtensionConfig {
    /// Whether the file extension of `path` is one this extension serves.
    pub fn accepts(&self, path: &str) -> bool {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.file_formats
                    .iter()
                    .any(|format| format.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Connection {
    pub ip: String,
    pub port: u16,
    pub target: String,
    pub target_port: u16,
}
