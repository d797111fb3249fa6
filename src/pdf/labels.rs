use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::invoice::DocType;

/// Language used for the printed receipt
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Urdu,
}

impl FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "urdu" | "ur" => Ok(Language::Urdu),
            other => Err(ValidationError::UnknownLanguage(other.to_string())),
        }
    }
}

impl Language {
    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Urdu)
    }

    fn table(self) -> &'static LabelTable {
        match self {
            Language::English => &ENGLISH,
            Language::Urdu => &URDU,
        }
    }

    /// Labels for one receipt, picking the invoice or quote wording
    pub fn labels(self, doc_type: DocType) -> ReceiptLabels {
        let t = self.table();
        let (number, thank_you, note) = match doc_type {
            DocType::Invoice => (t.invoice_no, t.thank_you_invoice, t.note_invoice),
            DocType::Quote => (t.quote_no, t.thank_you_quote, t.note_quote),
        };
        ReceiptLabels {
            number,
            date: t.date,
            description: t.description,
            total: t.total,
            subtotal: t.subtotal,
            discount: t.discount,
            grand_total: t.grand_total,
            thank_you,
            note,
        }
    }
}

struct LabelTable {
    invoice_no: &'static str,
    quote_no: &'static str,
    date: &'static str,
    description: &'static str,
    total: &'static str,
    subtotal: &'static str,
    discount: &'static str,
    grand_total: &'static str,
    thank_you_invoice: &'static str,
    thank_you_quote: &'static str,
    note_invoice: &'static str,
    note_quote: &'static str,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ReceiptLabels {
    pub number: &'static str,
    pub date: &'static str,
    pub description: &'static str,
    pub total: &'static str,
    pub subtotal: &'static str,
    pub discount: &'static str,
    pub grand_total: &'static str,
    pub thank_you: &'static str,
    pub note: &'static str,
}

const ENGLISH: LabelTable = LabelTable {
    invoice_no: "Invoice No:",
    quote_no: "Quote No:",
    date: "Date:",
    description: "Description",
    total: "Total",
    subtotal: "Subtotal:",
    discount: "Discount:",
    grand_total: "Grand Total:",
    thank_you_invoice: "Thank you for your business!",
    thank_you_quote: "We look forward to working with you!",
    note_invoice: "Note: This is a system-generated receipt and requires no signature.",
    note_quote: "Note: This is a system-generated quote. Prices are valid for 30 days.",
};

const URDU: LabelTable = LabelTable {
    invoice_no: "رسید نمبر:",
    quote_no: "پیداواری قیمت:",
    date: "تاریخ:",
    description: "تفصیل",
    total: "کُل",
    subtotal: "مجموعی رقم:",
    discount: "چھوٹ:",
    grand_total: "کل رقم:",
    thank_you_invoice: "آپ کے کاروبار کے لئے شکریہ!",
    thank_you_quote: "ہم آپ کے ساتھ کام کرنے کے منتظر ہیں!",
    note_invoice: "نوٹ: یہ ایک نظام سے تیار کردہ رسید ہے اور اس پر دستخط کی ضرورت نہیں ہے۔",
    note_quote: "نوٹ: یہ ایک نظام سے تیار کردہ قیمت ہے۔ قیمتیں 30 دنوں کے لیے درست ہیں۔",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_wording_differs_from_invoice() {
        let invoice = Language::English.labels(DocType::Invoice);
        let quote = Language::English.labels(DocType::Quote);
        assert_eq!(invoice.number, "Invoice No:");
        assert_eq!(quote.number, "Quote No:");
        assert!(quote.note.contains("valid for 30 days"));
        assert!(invoice.note.contains("requires no signature"));
    }

    #[test]
    fn parses_language_names() {
        assert_eq!("Urdu".parse::<Language>().unwrap(), Language::Urdu);
        assert_eq!("en".parse::<Language>().unwrap(), Language::English);
        assert!("french".parse::<Language>().is_err());
        assert!(Language::Urdu.is_rtl());
    }
}
