mod schema;

pub use schema::SCHEMA_VERSION;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::debug;

use crate::error::{ReceiptError, Result};
use crate::invoice::{ClientDetails, ClientRecord, InvoiceDocument, SummaryRow};

/// Append-only SQLite store for issued documents and client records.
///
/// Rows are never updated or deleted; every row carries the owner id it was
/// written for and reads only ever see the caller's own rows.
pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Open (or create) the database file and run pending migrations
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        debug!(path = %path.display(), "opening record store");
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        conn.busy_timeout(std::time::Duration::from_millis(5000))?;
        schema::migrate(&mut conn)?;
        Ok(Self { conn })
    }

    /// Write the summary row and the full document together
    pub fn append(&mut self, doc: &InvoiceDocument, owner_id: &str) -> Result<()> {
        self.append_with_client(doc, None, owner_id)
    }

    /// Like [`append`](Self::append), also saving `client` in the same
    /// transaction, so either every row lands or none does
    pub fn append_with_client(
        &mut self,
        doc: &InvoiceDocument,
        client: Option<&ClientDetails>,
        owner_id: &str,
    ) -> Result<()> {
        let json = serde_json::to_string(doc)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO invoices (timestamp, vendor, invoice_no, total, user_id) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                doc.issued_at,
                doc.vendor.name,
                doc.invoice_no,
                doc.grand_total(),
                owner_id
            ],
        )?;
        tx.execute(
            "INSERT INTO invoices_full (timestamp, invoice_no, invoice_json, user_id) \
             VALUES (?1, ?2, ?3, ?4)",
            params![doc.issued_at, doc.invoice_no, json, owner_id],
        )?;
        if let Some(client) = client {
            insert_client(&tx, client, doc.issued_at, owner_id)?;
        }
        tx.commit()?;
        debug!(invoice_no = %doc.invoice_no, owner_id, "appended document");
        Ok(())
    }

    /// Fetch a full document by number, only if it belongs to `owner_id`
    pub fn get(&self, invoice_no: &str, owner_id: &str) -> Result<InvoiceDocument> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT invoice_json FROM invoices_full \
                 WHERE invoice_no = ?1 AND user_id = ?2 ORDER BY id LIMIT 1",
                params![invoice_no, owner_id],
                |row| row.get(0),
            )
            .optional()?;

        let json = json.ok_or_else(|| ReceiptError::DocumentNotFound(invoice_no.to_string()))?;
        serde_json::from_str(&json).map_err(|source| ReceiptError::CorruptDocument {
            invoice_no: invoice_no.to_string(),
            source,
        })
    }

    /// Summary rows for `owner_id`, oldest first
    pub fn list(&self, owner_id: &str) -> Result<Vec<SummaryRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT invoice_no, vendor, total, timestamp, user_id FROM invoices \
             WHERE user_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![owner_id], |row| {
                Ok(SummaryRow {
                    invoice_no: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    vendor_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    grand_total: row.get::<_, Option<f64>>(2)?.unwrap_or_default(),
                    issued_at: row.get(3)?,
                    owner_id: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// The most recently stored invoice number, across every owner
    pub fn last_invoice_no(&self) -> Result<Option<String>> {
        let last: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT invoice_no FROM invoices ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(last.flatten())
    }

    pub fn append_client(
        &self,
        client: &ClientDetails,
        created_at: DateTime<Utc>,
        owner_id: &str,
    ) -> Result<()> {
        insert_client(&self.conn, client, created_at, owner_id)
    }

    pub fn list_clients(&self, owner_id: &str) -> Result<Vec<ClientRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, address, phone, ntn, notes, created_at, user_id FROM clients \
             WHERE user_id = ?1 ORDER BY id",
        )?;
        let text = |row: &rusqlite::Row<'_>, idx: usize| -> rusqlite::Result<String> {
            Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
        };
        let rows = stmt
            .query_map(params![owner_id], |row| {
                Ok(ClientRecord {
                    details: ClientDetails {
                        name: text(row, 0)?,
                        address: text(row, 1)?,
                        phone: text(row, 2)?,
                        tax_id: text(row, 3)?,
                        notes: text(row, 4)?,
                    },
                    created_at: row.get(5)?,
                    owner_id: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

fn insert_client(
    conn: &Connection,
    client: &ClientDetails,
    created_at: DateTime<Utc>,
    owner_id: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO clients (name, address, phone, ntn, notes, created_at, user_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            client.name,
            client.address,
            client.phone,
            client.tax_id,
            client.notes,
            created_at,
            owner_id
        ],
    )?;
    debug!(client = %client.name, owner_id, "saved client record");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{assemble, next_number, DocType, Draft, ItemInput, Vendor};

    fn sample(invoice_no: &str, vendor: &str) -> InvoiceDocument {
        let draft = Draft::new(DocType::Invoice)
            .with_vendor(Vendor {
                name: vendor.to_string(),
                address: "1 Mall Road".to_string(),
                phone: "0300".to_string(),
                tax_id: "NTN-1".to_string(),
            })
            .with_client(ClientDetails {
                name: "Ali".to_string(),
                notes: "regular".to_string(),
                ..ClientDetails::default()
            })
            .with_items(vec![
                ItemInput::new("Tea", 2, 10.0),
                ItemInput::new("Cake", 1, 5.0),
            ])
            .with_discount(3.0);
        assemble(&draft, invoice_no.to_string(), Utc::now()).unwrap()
    }

    #[test]
    fn round_trip_by_number_and_owner() {
        let mut store = RecordStore::open_in_memory().unwrap();
        let doc = sample("0001", "Shop A");
        store.append(&doc, "shop-a").unwrap();

        let loaded = store.get("0001", "shop-a").unwrap();
        assert_eq!(loaded, doc);
        assert_eq!(loaded.grand_total(), 22.0);
    }

    #[test]
    fn get_is_scoped_to_owner() {
        let mut store = RecordStore::open_in_memory().unwrap();
        store.append(&sample("0001", "Shop A"), "shop-a").unwrap();

        assert!(matches!(
            store.get("0001", "shop-b"),
            Err(ReceiptError::DocumentNotFound(n)) if n == "0001"
        ));
        assert!(matches!(
            store.get("0404", "shop-a"),
            Err(ReceiptError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn list_only_returns_owner_rows_in_issue_order() {
        let mut store = RecordStore::open_in_memory().unwrap();
        store.append(&sample("0001", "Shop A"), "shop-a").unwrap();
        store.append(&sample("0002", "Shop B"), "shop-b").unwrap();
        store.append(&sample("0003", "Shop A"), "shop-a").unwrap();

        let rows = store.list("shop-a").unwrap();
        let numbers: Vec<_> = rows.iter().map(|r| r.invoice_no.as_str()).collect();
        assert_eq!(numbers, ["0001", "0003"]);
        assert!(rows.iter().all(|r| r.owner_id == "shop-a"));
        assert_eq!(rows[0].grand_total, 22.0);
        assert_eq!(rows[0].vendor_name, "Shop A");
    }

    #[test]
    fn next_number_follows_last_stored_number() {
        let mut store = RecordStore::open_in_memory().unwrap();
        assert_eq!(next_number(&store, "shop-a").unwrap(), "0001");

        store.append(&sample("0007", "Shop A"), "shop-a").unwrap();
        assert_eq!(next_number(&store, "shop-a").unwrap(), "0008");
    }

    #[test]
    fn next_number_is_global_across_owners() {
        let mut store = RecordStore::open_in_memory().unwrap();
        store.append(&sample("0012", "Shop B"), "shop-b").unwrap();
        assert_eq!(next_number(&store, "shop-a").unwrap(), "0013");
    }

    #[test]
    fn next_number_restarts_after_non_numeric_number() {
        let mut store = RecordStore::open_in_memory().unwrap();
        store.append(&sample("0007", "Shop A"), "shop-a").unwrap();
        store.append(&sample("INV-X", "Shop A"), "shop-a").unwrap();
        assert_eq!(next_number(&store, "shop-a").unwrap(), "0001");
    }

    #[test]
    fn malformed_stored_json_is_a_storage_failure() {
        let store = RecordStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO invoices_full (timestamp, invoice_no, invoice_json, user_id) \
                 VALUES ('2026-01-01T00:00:00Z', '0005', '{not json', 'shop-a')",
                [],
            )
            .unwrap();
        assert!(matches!(
            store.get("0005", "shop-a"),
            Err(ReceiptError::CorruptDocument { .. })
        ));
    }

    #[test]
    fn clients_are_scoped_to_owner() {
        let store = RecordStore::open_in_memory().unwrap();
        let client = ClientDetails {
            name: "Ali".to_string(),
            phone: "0301".to_string(),
            ..ClientDetails::default()
        };
        store.append_client(&client, Utc::now(), "shop-a").unwrap();

        let clients = store.list_clients("shop-a").unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].details, client);
        assert!(store.list_clients("shop-b").unwrap().is_empty());
    }

    #[test]
    fn client_is_saved_with_the_document() {
        let mut store = RecordStore::open_in_memory().unwrap();
        let doc = sample("0001", "Shop A");
        store
            .append_with_client(&doc, Some(&doc.client), "shop-a")
            .unwrap();

        let clients = store.list_clients("shop-a").unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].details.name, "Ali");
        assert_eq!(clients[0].created_at, doc.issued_at);
    }

    #[test]
    fn failed_client_insert_leaves_nothing_behind() {
        let mut store = RecordStore::open_in_memory().unwrap();
        store.conn.execute_batch("DROP TABLE clients").unwrap();

        let doc = sample("0001", "Shop A");
        assert!(matches!(
            store.append_with_client(&doc, Some(&doc.client), "shop-a"),
            Err(ReceiptError::Storage(_))
        ));

        assert!(store.list("shop-a").unwrap().is_empty());
        assert!(store.last_invoice_no().unwrap().is_none());
        assert!(matches!(
            store.get("0001", "shop-a"),
            Err(ReceiptError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn documents_from_the_earlier_app_load_after_migration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoices.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                r#"
                CREATE TABLE invoices (id INTEGER PRIMARY KEY AUTOINCREMENT, timestamp TEXT,
                    vendor TEXT, invoice_no TEXT, total REAL, user_id TEXT);
                CREATE TABLE invoices_full (id INTEGER PRIMARY KEY AUTOINCREMENT, timestamp TEXT,
                    invoice_no TEXT, invoice_json TEXT, user_id TEXT);
                INSERT INTO invoices (timestamp, vendor, invoice_no, total, user_id)
                    VALUES ('2025-03-01T09:15:00.123456+00:00', 'Old Shop', '0003', 18.0, 'shop');
                "#,
            )
            .unwrap();
            let json = r#"{"vendor": {"name": "Old Shop", "address": "Saddar", "phone": "021", "ntn": "NTN-9"}, "client": {"name": "", "address": "", "phone": "", "ntn": "", "notes": ""}, "items": [{"name": "Tea", "quantity": 2, "price": 10.0}, {"name": "", "quantity": 1, "price": 0.0}], "doc_type": "invoice", "invoice_info": {"invoice_no": "0003", "date": "2025-03-01", "timestamp": "2025-03-01T09:15:00.123456+00:00"}, "subtotal": 20.0, "discount": 2.0, "grand_total": 18.0}"#;
            conn.execute(
                "INSERT INTO invoices_full (timestamp, invoice_no, invoice_json, user_id) \
                 VALUES ('2025-03-01T09:15:00.123456+00:00', '0003', ?1, 'shop')",
                params![json],
            )
            .unwrap();
        }

        let store = RecordStore::open(&path).unwrap();
        assert_eq!(next_number(&store, "shop").unwrap(), "0004");

        let doc = store.get("0003", "shop").unwrap();
        assert_eq!(doc.invoice_no, "0003");
        assert_eq!(doc.vendor.tax_id, "NTN-9");
        assert_eq!(doc.items()[0].unit_price(), 10.0);
        assert_eq!(doc.subtotal(), 20.0);
        assert_eq!(doc.grand_total(), 18.0);

        // A loaded legacy document re-issues like any other
        let reissued = Draft::from_document(&doc);
        assert!(assemble(&reissued, "0004".to_string(), Utc::now()).is_ok());
    }

    #[test]
    fn reopening_a_file_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("receipts.db");
        {
            let mut store = RecordStore::open(&path).unwrap();
            store.append(&sample("0001", "Shop A"), "shop-a").unwrap();
        }
        let store = RecordStore::open(&path).unwrap();
        assert_eq!(store.list("shop-a").unwrap().len(), 1);
        assert_eq!(store.last_invoice_no().unwrap().as_deref(), Some("0001"));
    }
}
