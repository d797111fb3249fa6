use std::path::PathBuf;
use thiserror::Error;

/// Problems with the user's input; nothing is saved when one of these occurs.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Invalid item format '{0}'. Expected 'name:quantity:price' (e.g., 'Tea:2:10.50')")]
    InvalidItemFormat(String),

    #[error("Invalid quantity '{qty}' for item '{item}': {reason}")]
    InvalidQuantity {
        item: String,
        qty: String,
        reason: String,
    },

    #[error("Invalid price '{price}' for item '{item}': must be a number")]
    InvalidPrice { item: String, price: String },

    #[error("Item '{0}' is filled, but its quantity and/or price is empty. Please check your entries.")]
    IncompleteItem(String),

    #[error("Please ensure at least one item has a name, quantity, and price.")]
    NoValidItems,

    #[error("Discount must not be negative (got {0:.2})")]
    NegativeDiscount(f64),

    #[error("Discount must be a finite amount (got {0})")]
    InvalidDiscount(f64),

    #[error("Unknown document type '{0}'. Use 'invoice' or 'quote'.")]
    UnknownDocType(String),

    #[error("Unknown language '{0}'. Use 'english' or 'urdu'.")]
    UnknownLanguage(String),
}

#[derive(Error, Debug)]
pub enum ReceiptError {
    #[error("Config directory not found at {0}. Run 'digireceipt init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("An owner id is required. Pass --owner <id> or set 'owner' in config.toml.")]
    MissingOwner,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Stored document '{invoice_no}' is malformed: {source}")]
    CorruptDocument {
        invoice_no: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not find document '{0}'")]
    DocumentNotFound(String),

    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to encode QR code: {0}")]
    QrEncode(#[from] qrcode::types::QrError),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("Logo file not found: {0}")]
    LogoNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReceiptError>;
