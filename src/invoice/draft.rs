use serde::{Deserialize, Serialize};

use super::document::{ClientDetails, DocType, InvoiceDocument, ItemInput, Vendor};

/// An editable document that has not been issued yet.
///
/// Each edit consumes the draft and returns the updated one.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Draft {
    doc_type: DocType,
    vendor: Vendor,
    client: ClientDetails,
    items: Vec<ItemInput>,
    discount: f64,
}

impl Default for Draft {
    fn default() -> Self {
        Self::new(DocType::Invoice)
    }
}

impl Draft {
    /// An empty draft with a single blank item row
    pub fn new(doc_type: DocType) -> Self {
        Self {
            doc_type,
            vendor: Vendor::default(),
            client: ClientDetails::default(),
            items: vec![ItemInput::blank()],
            discount: 0.0,
        }
    }

    /// Load a previously issued document for editing and re-issue
    pub fn from_document(doc: &InvoiceDocument) -> Self {
        let mut items: Vec<ItemInput> = doc.items().iter().map(ItemInput::from).collect();
        if items.is_empty() {
            items.push(ItemInput::blank());
        }
        Self {
            doc_type: doc.doc_type,
            vendor: doc.vendor.clone(),
            client: doc.client.clone(),
            items,
            discount: doc.discount(),
        }
    }

    pub fn with_doc_type(self, doc_type: DocType) -> Self {
        Self { doc_type, ..self }
    }

    pub fn with_vendor(self, vendor: Vendor) -> Self {
        Self { vendor, ..self }
    }

    pub fn with_client(self, client: ClientDetails) -> Self {
        Self { client, ..self }
    }

    pub fn with_discount(self, discount: f64) -> Self {
        Self { discount, ..self }
    }

    /// Append an item, filling the blank starter row if it is still untouched
    pub fn push_item(mut self, item: ItemInput) -> Self {
        if self.items.len() == 1 && self.items[0] == ItemInput::blank() {
            self.items[0] = item;
        } else {
            self.items.push(item);
        }
        self
    }

    /// Drop the last item; a draft always keeps at least one row
    pub fn pop_item(mut self) -> Self {
        if self.items.len() > 1 {
            self.items.pop();
        }
        self
    }

    /// Swap the whole item list (an empty list leaves a single blank row)
    pub fn with_items(self, items: Vec<ItemInput>) -> Self {
        let items = if items.is_empty() {
            vec![ItemInput::blank()]
        } else {
            items
        };
        Self { items, ..self }
    }

    pub fn doc_type(&self) -> DocType {
        self.doc_type
    }

    pub fn vendor(&self) -> &Vendor {
        &self.vendor
    }

    pub fn client(&self) -> &ClientDetails {
        &self.client
    }

    pub fn items(&self) -> &[ItemInput] {
        &self.items
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    /// Running subtotal over all rows, as shown while the draft is edited
    pub fn preview_subtotal(&self) -> f64 {
        self.items
            .iter()
            .map(|i| f64::from(i.quantity) * i.unit_price)
            .sum()
    }

    pub fn preview_grand_total(&self) -> f64 {
        self.preview_subtotal() - self.discount
    }
}
