use chrono::{DateTime, Utc};
use tracing::warn;

use super::document::{InvoiceDocument, ItemInput, LineItem};
use super::draft::Draft;
use crate::error::ValidationError;

/// Check a draft's items and discount, returning the rows that make it onto
/// the document. Rows without a name are dropped.
pub fn validate(draft: &Draft) -> Result<Vec<LineItem>, ValidationError> {
    if let Some(incomplete) = draft
        .items()
        .iter()
        .find(|i| i.has_name() && !i.is_complete())
    {
        return Err(ValidationError::IncompleteItem(
            incomplete.name.trim().to_string(),
        ));
    }

    if !draft.items().iter().any(ItemInput::is_complete) {
        return Err(ValidationError::NoValidItems);
    }

    let discount = draft.discount();
    if !discount.is_finite() {
        return Err(ValidationError::InvalidDiscount(discount));
    }
    if discount < 0.0 {
        return Err(ValidationError::NegativeDiscount(discount));
    }

    Ok(draft
        .items()
        .iter()
        .filter(|i| i.has_name())
        .map(|i| ItemInput::new(i.name.trim(), i.quantity, i.unit_price).into())
        .collect())
}

/// Build the canonical document for a draft under the given number
pub fn assemble(
    draft: &Draft,
    invoice_no: String,
    issued_at: DateTime<Utc>,
) -> Result<InvoiceDocument, ValidationError> {
    let items = validate(draft)?;
    let doc = InvoiceDocument::new(
        invoice_no,
        issued_at,
        draft.doc_type(),
        draft.vendor().clone(),
        draft.client().clone(),
        items,
        draft.discount(),
    );

    if doc.grand_total() < 0.0 {
        warn!(
            invoice_no = %doc.invoice_no,
            subtotal = doc.subtotal(),
            discount = doc.discount(),
            "discount exceeds subtotal, grand total is negative"
        );
    }

    Ok(doc)
}
