use tracing::debug;

use crate::error::Result;
use crate::store::RecordStore;

/// Derive the next invoice number.
///
/// The sequence is global: it follows the most recently stored invoice of any
/// owner, not just `owner_id`'s. Nothing locks between reading the last number
/// and appending the new document, so two writers can issue the same number.
pub fn next_number(store: &RecordStore, owner_id: &str) -> Result<String> {
    let last = store.last_invoice_no()?;
    let next = next_sequence(last.as_deref());
    debug!(owner_id, last = ?last, next, "derived invoice number from global sequence");
    Ok(format_invoice_number(next))
}

/// Last number + 1; a missing or non-numeric last number restarts at 1
fn next_sequence(last: Option<&str>) -> u64 {
    last.and_then(|s| s.trim().parse::<u64>().ok())
        .map_or(1, |n| n.saturating_add(1))
}

pub fn format_invoice_number(seq: u64) -> String {
    format!("{:04}", seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_numeric_numbers() {
        assert_eq!(next_sequence(Some("0007")), 8);
        assert_eq!(next_sequence(Some("9999")), 10000);
    }

    #[test]
    fn restarts_when_missing_or_not_numeric() {
        assert_eq!(next_sequence(None), 1);
        assert_eq!(next_sequence(Some("INV-2026-0003")), 1);
        assert_eq!(next_sequence(Some("")), 1);
    }

    #[test]
    fn pads_to_four_digits() {
        assert_eq!(format_invoice_number(8), "0008");
        assert_eq!(format_invoice_number(12345), "12345");
    }
}
