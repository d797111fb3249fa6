pub mod config;
pub mod error;
pub mod export;
pub mod invoice;
pub mod pdf;
pub mod store;

pub use config::Config;
pub use error::{ReceiptError, Result, ValidationError};
pub use invoice::{issue, Draft, InvoiceDocument, SummaryRow};
pub use store::RecordStore;
