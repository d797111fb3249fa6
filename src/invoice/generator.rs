use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::assembler::assemble;
use super::document::InvoiceDocument;
use super::draft::Draft;
use super::sequence::next_number;
use crate::error::Result;
use crate::export::items_csv;
use crate::pdf::{render_receipt, Language};
use crate::store::RecordStore;

/// Validate a draft, number it and append it to the store.
///
/// Validation happens before anything is written. A named client is also
/// saved to the owner's client list.
pub fn issue(store: &mut RecordStore, draft: &Draft, owner_id: &str) -> Result<InvoiceDocument> {
    let invoice_no = next_number(store, owner_id)?;
    let doc = assemble(draft, invoice_no, Utc::now())?;

    let client = (!doc.client.is_empty()).then_some(&doc.client);
    store.append_with_client(&doc, client, owner_id)?;

    info!(
        invoice_no = %doc.invoice_no,
        doc_type = %doc.doc_type,
        owner_id,
        grand_total = doc.grand_total(),
        "issued document"
    );
    Ok(doc)
}

/// Text encoded into the receipt's QR code: the stored document as JSON
pub fn qr_payload(doc: &InvoiceDocument) -> Result<String> {
    Ok(serde_json::to_string(doc)?)
}

pub fn receipt_file_name(doc: &InvoiceDocument) -> String {
    format!("{}.pdf", doc.invoice_no)
}

pub fn items_file_name(doc: &InvoiceDocument) -> String {
    format!("{}_items.csv", doc.invoice_no)
}

/// Render the receipt PDF for a document and write it to `path`
pub fn write_receipt(
    doc: &InvoiceDocument,
    path: &Path,
    logo: Option<&Path>,
    language: Language,
) -> Result<()> {
    let payload = qr_payload(doc)?;
    let bytes = render_receipt(doc, &payload, logo, language)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// Write the items CSV for a document into `dir`
pub fn write_items_csv(doc: &InvoiceDocument, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(items_file_name(doc));
    fs::write(&path, items_csv(doc.items())?)?;
    Ok(path)
}
