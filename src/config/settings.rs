use serde::{Deserialize, Serialize};

use crate::invoice::Vendor;
use crate::pdf::Language;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default owner id (the shop identifier) used when --owner is not given
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub vendor: Vendor,
    #[serde(default)]
    pub storage: StorageSettings,
    pub pdf: PdfSettings,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StorageSettings {
    pub database: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database: "digireceipts.db".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PdfSettings {
    pub output_dir: String,
    #[serde(default)]
    pub logo: Option<String>,
}
