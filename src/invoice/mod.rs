mod assembler;
mod document;
mod draft;
mod generator;
mod sequence;

pub use assembler::{assemble, validate};
pub use document::{
    ClientDetails, ClientRecord, DocType, InvoiceDocument, ItemInput, LineItem, SummaryRow, Vendor,
};
pub use draft::Draft;
pub use generator::{
    issue, items_file_name, qr_payload, receipt_file_name, write_items_csv, write_receipt,
};
pub use sequence::{format_invoice_number, next_number};
