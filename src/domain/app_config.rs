use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_file: PathBuf,
    pub admin_password: String,
    /// WHATWG label of the CSV export encoding, e.g. `euc-kr` or `utf-8`.
    pub export_encoding: String,
    pub recent_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            data_file: PathBuf::from("result.json"),
            admin_password: "password".to_string(),
            export_encoding: "euc-kr".to_string(),
            recent_limit: 5,
        }
    }
}

impl AppConfig {
    pub fn with_data_file(mut self, data_file: impl Into<PathBuf>) -> Self {
        self.data_file = data_file.into();
        self
    }

    pub fn with_admin_password(mut self, password: impl Into<String>) -> Self {
        self.admin_password = password.into();
        self
    }

    pub fn with_export_encoding(mut self, label: impl Into<String>) -> Self {
        self.export_encoding = label.into();
        self
    }
}
