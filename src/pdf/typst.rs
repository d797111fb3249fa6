use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use super::labels::{Language, ReceiptLabels};
use super::qr::qr_svg;
use crate::error::{ReceiptError, Result};
use crate::invoice::{InvoiceDocument, Vendor};

/// Embedded Typst template for a 58mm POS receipt.
/// Uses a placeholder that gets replaced with the actual JSON file path
const RECEIPT_TEMPLATE: &str = r##"// Receipt Template
// Data is loaded from JSON file

#let data = json("DATA_JSON_PATH")

#set page(width: 58mm, height: auto, margin: (x: 5mm, y: 8mm))
#set text(
  font: ("Helvetica", "Noto Nastaliq Urdu", "Noto Naskh Arabic"),
  size: 8pt,
  dir: if data.rtl { rtl } else { ltr },
)

#let rule() = line(length: 100%, stroke: 0.5pt)
#let row(left, right) = grid(columns: (1fr, auto), column-gutter: 2mm, left, right)

// Header: logo and vendor details
#align(center)[
  #if data.logo != none [
    #image(data.logo, width: 40mm)
    #v(2mm)
  ]
  #text(size: 10pt, weight: "bold")[#data.vendor.name] \
  #data.vendor.address \
  Phone: #data.vendor.phone \
  NTN: #data.vendor.tax_id
]

#v(4mm)
#data.labels.number #data.number \
#data.labels.date #data.date
#v(2mm)

// Items
#rule()
#row([*#data.labels.description*], [*#data.labels.total*])
#rule()
#for item in data.items [
  #item.name \
  #row([#item.quantity x #item.unit_price], [#item.line_total])
  #v(1mm)
]
#rule()

// Totals
#row(data.labels.subtotal, data.subtotal)
#row(data.labels.discount, data.discount)
#text(size: 10pt, weight: "bold")[#row(data.labels.grand_total, data.grand_total)]

#v(4mm)

// Footer with QR code
#align(center)[
  #text(weight: "bold")[#data.labels.thank_you]
  #v(2mm)
  #image(data.qr, width: 40mm)
  #v(2mm)
  #text(size: 6pt)[#data.labels.note]
]
"##;

#[derive(Debug, Serialize)]
struct ReceiptLine<'a> {
    name: &'a str,
    quantity: u32,
    unit_price: String,
    line_total: String,
}

/// Everything the template reads, with amounts pre-formatted
#[derive(Debug, Serialize)]
struct ReceiptData<'a> {
    labels: ReceiptLabels,
    rtl: bool,
    vendor: &'a Vendor,
    number: &'a str,
    date: String,
    items: Vec<ReceiptLine<'a>>,
    subtotal: String,
    discount: String,
    grand_total: String,
    logo: Option<String>,
    qr: &'static str,
}

impl<'a> ReceiptData<'a> {
    fn new(doc: &'a InvoiceDocument, language: Language, logo: Option<String>) -> Self {
        Self {
            labels: language.labels(doc.doc_type),
            rtl: language.is_rtl(),
            vendor: &doc.vendor,
            number: &doc.invoice_no,
            date: doc
                .issued_at
                .with_timezone(&Local)
                .format("%Y-%m-%d")
                .to_string(),
            items: doc
                .items()
                .iter()
                .map(|item| ReceiptLine {
                    name: item.name(),
                    quantity: item.quantity(),
                    unit_price: format!("{:.2}", item.unit_price()),
                    line_total: format!("{:.2}", item.line_total()),
                })
                .collect(),
            subtotal: format!("{:.2}", doc.subtotal()),
            discount: format!("{:.2}", doc.discount()),
            grand_total: format!("{:.2}", doc.grand_total()),
            logo,
            qr: QR_FILE,
        }
    }
}

const QR_FILE: &str = "qr.svg";

/// Scratch directory for one render, removed when dropped
struct Scratch(PathBuf);

impl Scratch {
    fn create() -> Result<Self> {
        let dir = std::env::temp_dir().join(format!("digireceipt-{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        Ok(Self(dir))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// Copy the logo next to the template so Typst can read it inside --root
fn stage_logo(logo: &Path, scratch: &Path) -> Result<String> {
    if !logo.is_file() {
        return Err(ReceiptError::LogoNotFound(logo.to_path_buf()));
    }
    let ext = logo
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_lowercase();
    let name = format!("logo.{ext}");
    std::fs::copy(logo, scratch.join(&name))?;
    Ok(name)
}

/// Render a receipt PDF using the Typst CLI and return its bytes.
///
/// `qr_payload` is encoded verbatim into the QR code at the bottom.
pub fn render_receipt(
    doc: &InvoiceDocument,
    qr_payload: &str,
    logo: Option<&Path>,
    language: Language,
) -> Result<Vec<u8>> {
    // Check if typst is available
    if Command::new("typst").arg("--version").output().is_err() {
        return Err(ReceiptError::TypstNotFound);
    }

    let scratch = Scratch::create()?;
    let dir = scratch.path();

    std::fs::write(dir.join(QR_FILE), qr_svg(qr_payload)?)?;

    let logo_name = logo.map(|l| stage_logo(l, dir)).transpose()?;
    let data = ReceiptData::new(doc, language, logo_name);
    let json_data =
        serde_json::to_string(&data).map_err(|e| ReceiptError::PdfGeneration(e.to_string()))?;
    std::fs::write(dir.join("data.json"), json_data)?;

    let template_path = dir.join("receipt.typ");
    std::fs::write(
        &template_path,
        RECEIPT_TEMPLATE.replace("DATA_JSON_PATH", "data.json"),
    )?;

    let pdf_path = dir.join("receipt.pdf");
    debug!(invoice_no = %doc.invoice_no, dir = %dir.display(), "compiling receipt");

    let output = Command::new("typst")
        .arg("compile")
        .arg("--root")
        .arg(dir)
        .arg(&template_path)
        .arg(&pdf_path)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReceiptError::PdfGeneration(stderr.to_string()));
    }

    Ok(std::fs::read(&pdf_path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{assemble, DocType, Draft, ItemInput};
    use chrono::Utc;

    fn quote() -> InvoiceDocument {
        let draft = Draft::new(DocType::Quote)
            .with_items(vec![ItemInput::new("Tea", 2, 10.0)])
            .with_discount(1.5);
        assemble(&draft, "0009".to_string(), Utc::now()).unwrap()
    }

    #[test]
    fn receipt_data_formats_amounts() {
        let doc = quote();
        let data = ReceiptData::new(&doc, Language::English, None);
        assert_eq!(data.number, "0009");
        assert_eq!(data.items[0].unit_price, "10.00");
        assert_eq!(data.items[0].line_total, "20.00");
        assert_eq!(data.subtotal, "20.00");
        assert_eq!(data.discount, "1.50");
        assert_eq!(data.grand_total, "18.50");
        assert_eq!(data.labels.number, "Quote No:");
        assert!(!data.rtl);
    }

    #[test]
    fn missing_logo_is_reported() {
        let scratch = tempfile::tempdir().unwrap();
        let missing = scratch.path().join("nope.png");
        assert!(matches!(
            stage_logo(&missing, scratch.path()),
            Err(ReceiptError::LogoNotFound(_))
        ));
    }

    #[test]
    fn logo_is_staged_with_its_extension() {
        let scratch = tempfile::tempdir().unwrap();
        let logo = scratch.path().join("Brand.JPG");
        std::fs::write(&logo, b"fake").unwrap();
        let staged = tempfile::tempdir().unwrap();
        let name = stage_logo(&logo, staged.path()).unwrap();
        assert_eq!(name, "logo.jpg");
        assert!(staged.path().join("logo.jpg").exists());
    }
}
