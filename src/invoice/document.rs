use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    #[default]
    #[serde(alias = "رسید")]
    Invoice,
    #[serde(alias = "اقتباس")]
    Quote,
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocType::Invoice => write!(f, "invoice"),
            DocType::Quote => write!(f, "quote"),
        }
    }
}

impl FromStr for DocType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "invoice" => Ok(DocType::Invoice),
            "quote" => Ok(DocType::Quote),
            other => Err(ValidationError::UnknownDocType(other.to_string())),
        }
    }
}

/// The business issuing the document
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Vendor {
    pub name: String,
    pub address: String,
    pub phone: String,
    /// National tax number (NTN)
    #[serde(alias = "ntn")]
    pub tax_id: String,
}

/// Client details are kept for the owner's records and never printed
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ClientDetails {
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(alias = "ntn")]
    pub tax_id: String,
    pub notes: String,
}

impl ClientDetails {
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
    }
}

/// A line item as it sits in a draft, before validation
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ItemInput {
    pub name: String,
    pub quantity: u32,
    #[serde(alias = "price")]
    pub unit_price: f64,
}

impl ItemInput {
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// A blank row, as a fresh draft starts with
    pub fn blank() -> Self {
        Self::new("", 1, 0.0)
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.has_name() && self.quantity > 0 && self.unit_price > 0.0
    }

    /// Parse "name:quantity:price". The name may itself contain colons.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let mut parts = input.rsplitn(3, ':');
        let (Some(price_str), Some(qty_str), Some(name)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(ValidationError::InvalidItemFormat(input.to_string()));
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidItemFormat(input.to_string()));
        }

        let quantity: u32 = qty_str
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidQuantity {
                item: name.to_string(),
                qty: qty_str.to_string(),
                reason: "must be a whole number".to_string(),
            })?;

        if quantity == 0 {
            return Err(ValidationError::InvalidQuantity {
                item: name.to_string(),
                qty: qty_str.to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        let unit_price: f64 = price_str
            .trim()
            .parse()
            .ok()
            .filter(|p: &f64| p.is_finite())
            .ok_or_else(|| ValidationError::InvalidPrice {
                item: name.to_string(),
                price: price_str.to_string(),
            })?;

        Ok(Self::new(name, quantity, unit_price))
    }
}

/// A validated line item. `line_total` is always quantity x unit_price.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(from = "ItemInput")]
pub struct LineItem {
    name: String,
    quantity: u32,
    unit_price: f64,
    line_total: f64,
}

impl From<ItemInput> for LineItem {
    fn from(input: ItemInput) -> Self {
        let line_total = f64::from(input.quantity) * input.unit_price;
        Self {
            name: input.name,
            quantity: input.quantity,
            unit_price: input.unit_price,
            line_total,
        }
    }
}

impl From<&LineItem> for ItemInput {
    fn from(item: &LineItem) -> Self {
        ItemInput::new(item.name.clone(), item.quantity, item.unit_price)
    }
}

impl LineItem {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    pub fn line_total(&self) -> f64 {
        self.line_total
    }
}

/// Number and timestamp as documents from the earlier receipt app nest them
#[derive(Debug, Deserialize)]
struct LegacyInvoiceInfo {
    invoice_no: String,
    timestamp: DateTime<Utc>,
}

/// Fields of a document that are not derived from other fields
#[derive(Debug, Deserialize)]
struct DocumentFields {
    invoice_no: Option<String>,
    issued_at: Option<DateTime<Utc>>,
    invoice_info: Option<LegacyInvoiceInfo>,
    #[serde(default)]
    doc_type: DocType,
    #[serde(default)]
    vendor: Vendor,
    #[serde(default)]
    client: ClientDetails,
    items: Vec<LineItem>,
    #[serde(default)]
    discount: f64,
}

impl TryFrom<DocumentFields> for InvoiceDocument {
    type Error = String;

    fn try_from(f: DocumentFields) -> Result<Self, Self::Error> {
        let (legacy_no, legacy_at) = f
            .invoice_info
            .map(|info| (info.invoice_no, info.timestamp))
            .unzip();
        let invoice_no = f
            .invoice_no
            .or(legacy_no)
            .ok_or("missing field `invoice_no`")?;
        let issued_at = f
            .issued_at
            .or(legacy_at)
            .ok_or("missing field `issued_at`")?;

        Ok(InvoiceDocument::new(
            invoice_no,
            issued_at,
            f.doc_type,
            f.vendor,
            f.client,
            f.items,
            f.discount,
        ))
    }
}

/// A complete, issued invoice or quote.
///
/// Totals are derived on construction and on deserialization, so the
/// stored `subtotal`/`grand_total` can never drift from items and discount.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(try_from = "DocumentFields")]
pub struct InvoiceDocument {
    pub invoice_no: String,
    pub issued_at: DateTime<Utc>,
    pub doc_type: DocType,
    pub vendor: Vendor,
    pub client: ClientDetails,
    items: Vec<LineItem>,
    subtotal: f64,
    discount: f64,
    grand_total: f64,
}

impl InvoiceDocument {
    pub(crate) fn new(
        invoice_no: String,
        issued_at: DateTime<Utc>,
        doc_type: DocType,
        vendor: Vendor,
        client: ClientDetails,
        items: Vec<LineItem>,
        discount: f64,
    ) -> Self {
        let subtotal: f64 = items.iter().map(LineItem::line_total).sum();
        Self {
            invoice_no,
            issued_at,
            doc_type,
            vendor,
            client,
            items,
            subtotal,
            discount,
            grand_total: subtotal - discount,
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn subtotal(&self) -> f64 {
        self.subtotal
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    pub fn grand_total(&self) -> f64 {
        self.grand_total
    }

    pub fn summary(&self, owner_id: &str) -> SummaryRow {
        SummaryRow {
            invoice_no: self.invoice_no.clone(),
            vendor_name: self.vendor.name.clone(),
            grand_total: self.grand_total,
            issued_at: self.issued_at,
            owner_id: owner_id.to_string(),
        }
    }
}

/// Listing projection of a stored document
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SummaryRow {
    pub invoice_no: String,
    pub vendor_name: String,
    pub grand_total: f64,
    pub issued_at: DateTime<Utc>,
    pub owner_id: String,
}

/// A client saved alongside an issued document
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ClientRecord {
    pub details: ClientDetails,
    pub created_at: DateTime<Utc>,
    pub owner_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(rows: &[(u32, f64)]) -> Vec<LineItem> {
        rows.iter()
            .enumerate()
            .map(|(i, (q, p))| ItemInput::new(format!("item {i}"), *q, *p).into())
            .collect()
    }

    fn doc(rows: &[(u32, f64)], discount: f64) -> InvoiceDocument {
        InvoiceDocument::new(
            "0001".to_string(),
            Utc::now(),
            DocType::Invoice,
            Vendor::default(),
            ClientDetails::default(),
            items(rows),
            discount,
        )
    }

    #[test]
    fn totals_follow_items_and_discount() {
        let d = doc(&[(2, 10.0), (1, 5.0)], 3.0);
        assert_eq!(d.items()[0].line_total(), 20.0);
        assert_eq!(d.subtotal(), 25.0);
        assert_eq!(d.grand_total(), 22.0);
    }

    #[test]
    fn grand_total_is_not_clamped() {
        let d = doc(&[(1, 5.0)], 8.0);
        assert_eq!(d.grand_total(), -3.0);
    }

    #[test]
    fn deserializing_recomputes_totals() {
        let json = r#"{
            "invoice_no": "0042",
            "issued_at": "2026-01-10T08:00:00Z",
            "doc_type": "quote",
            "items": [
                {"name": "Tea", "quantity": 3, "unit_price": 2.5, "line_total": 999.0}
            ],
            "subtotal": 1.0,
            "discount": 0.5,
            "grand_total": 1000.0
        }"#;
        let d: InvoiceDocument = serde_json::from_str(json).unwrap();
        assert_eq!(d.doc_type, DocType::Quote);
        assert_eq!(d.items()[0].line_total(), 7.5);
        assert_eq!(d.subtotal(), 7.5);
        assert_eq!(d.grand_total(), 7.0);
    }

    #[test]
    fn reads_documents_in_the_earlier_app_layout() {
        let json = r#"{
            "vendor": {"name": "Old Shop", "address": "Saddar", "phone": "021", "ntn": "NTN-9"},
            "client": {"name": "Ali", "address": "", "phone": "", "ntn": "C-1", "notes": "x"},
            "items": [{"name": "Tea", "quantity": 2, "price": 10.0}],
            "doc_type": "invoice",
            "invoice_info": {
                "invoice_no": "0003",
                "date": "2025-03-01",
                "timestamp": "2025-03-01T09:15:00.123456+00:00"
            },
            "subtotal": 20.0,
            "discount": 2.0,
            "grand_total": 18.0
        }"#;
        let d: InvoiceDocument = serde_json::from_str(json).unwrap();
        assert_eq!(d.invoice_no, "0003");
        assert_eq!(d.issued_at.to_rfc3339(), "2025-03-01T09:15:00.123456+00:00");
        assert_eq!(d.vendor.tax_id, "NTN-9");
        assert_eq!(d.client.tax_id, "C-1");
        assert_eq!(d.items()[0].unit_price(), 10.0);
        assert_eq!(d.grand_total(), 18.0);
    }

    #[test]
    fn reads_urdu_doc_type_labels() {
        let d: DocType = serde_json::from_str("\"اقتباس\"").unwrap();
        assert_eq!(d, DocType::Quote);
    }

    #[test]
    fn document_without_a_number_is_rejected() {
        let json = r#"{"issued_at": "2026-01-10T08:00:00Z", "items": []}"#;
        let err = serde_json::from_str::<InvoiceDocument>(json).unwrap_err();
        assert!(err.to_string().contains("invoice_no"));
    }

    #[test]
    fn parse_item_input() {
        let item = ItemInput::parse("Chai: special:2:10.50").unwrap();
        assert_eq!(item, ItemInput::new("Chai: special", 2, 10.5));
    }

    #[test]
    fn parse_item_rejects_bad_input() {
        assert!(matches!(
            ItemInput::parse("Tea:2"),
            Err(ValidationError::InvalidItemFormat(_))
        ));
        assert!(matches!(
            ItemInput::parse("Tea:two:1"),
            Err(ValidationError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            ItemInput::parse("Tea:0:1"),
            Err(ValidationError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            ItemInput::parse("Tea:1:abc"),
            Err(ValidationError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn doc_type_parses_case_insensitively() {
        assert_eq!("Quote".parse::<DocType>().unwrap(), DocType::Quote);
        assert!("receipt".parse::<DocType>().is_err());
    }
}
