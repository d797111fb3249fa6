use crate::error::{ReceiptError, Result};
use crate::invoice::LineItem;

const HEADER: [&str; 4] = ["name", "quantity", "unit_price", "line_total"];

/// Items of a document as CSV bytes, header first
pub fn items_csv(items: &[LineItem]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for item in items {
        writer.serialize(item)?;
    }
    writer
        .into_inner()
        .map_err(|e| ReceiptError::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::ItemInput;

    #[test]
    fn writes_header_and_rows() {
        let items: Vec<LineItem> = vec![
            ItemInput::new("Tea", 2, 10.0).into(),
            ItemInput::new("Cake, chocolate", 1, 5.5).into(),
        ];
        let csv = String::from_utf8(items_csv(&items).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "name,quantity,unit_price,line_total");
        assert_eq!(lines[1], "Tea,2,10.0,20.0");
        assert_eq!(lines[2], "\"Cake, chocolate\",1,5.5,5.5");
    }

    #[test]
    fn empty_list_still_has_header() {
        let csv = String::from_utf8(items_csv(&[]).unwrap()).unwrap();
        assert_eq!(csv, "name,quantity,unit_price,line_total\n");
    }
}
