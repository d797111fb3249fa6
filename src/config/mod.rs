mod settings;

pub use settings::{Config, PdfSettings, StorageSettings};

use crate::error::{ReceiptError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.digireceipt/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "digireceipt") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.digireceipt/
    let home = dirs_home().ok_or_else(|| {
        ReceiptError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".digireceipt"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Expand ~ and resolve relative paths against the config directory
pub fn resolve_path(path: &str, cfg_dir: &Path) -> PathBuf {
    let expanded = expand_path(path);
    if expanded.is_absolute() {
        expanded
    } else {
        cfg_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(cfg_dir: &Path) -> Result<Config> {
    if !cfg_dir.exists() {
        return Err(ReceiptError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    let path = cfg_dir.join("config.toml");
    if !path.exists() {
        return Err(ReceiptError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| ReceiptError::ConfigParse { path, source: e })
}

impl Config {
    pub fn database_path(&self, cfg_dir: &Path) -> PathBuf {
        resolve_path(&self.storage.database, cfg_dir)
    }

    pub fn output_dir(&self, cfg_dir: &Path) -> PathBuf {
        resolve_path(&self.pdf.output_dir, cfg_dir)
    }

    pub fn logo_path(&self, cfg_dir: &Path) -> Option<PathBuf> {
        self.pdf
            .logo
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(|p| resolve_path(p, cfg_dir))
    }

    /// Pick the owner id: the command-line value wins over config.toml.
    pub fn resolve_owner(&self, cli_owner: Option<&str>) -> Result<String> {
        cli_owner
            .or(self.owner.as_deref())
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .ok_or(ReceiptError::MissingOwner)
    }
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"# Owner id scoping your records (e.g., your shop ID).
# Can be overridden per command with --owner.
owner = "my-shop"

# Receipt language: "english" or "urdu"
language = "english"

[vendor]
name = "Your Shop Name"
address = "123 Market Road"
phone = "+92-300-0000000"
tax_id = ""                      # NTN, optional

[storage]
database = "digireceipts.db"     # relative paths live inside this directory

[pdf]
output_dir = "output"
# logo = "~/Pictures/logo.png"   # optional, PNG or JPEG
"#;
