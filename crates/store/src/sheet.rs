//! Xlsx workbook read/write for bulk stock data.
//!
//! Export and import carry deliberately different column sets: export
//! resolves the category to its name and includes the record timestamp,
//! import takes a raw `categoryId` plus `reorderLevel`. The two layouts are
//! independent schemas, not a round-trip pair.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use chrono::{DateTime, Utc};
use rust_xlsxwriter::Workbook;

use depot_catalog::StockImportRow;

use crate::error::{StoreError, StoreResult};

/// Column layout of the export workbook, in order.
pub const EXPORT_COLUMNS: [&str; 11] = [
    "code",
    "name",
    "description",
    "price",
    "discountPercentage",
    "inStock",
    "category",
    "status",
    "rating",
    "createdBy",
    "time",
];

/// Header set the import parser understands.
pub const IMPORT_COLUMNS: [&str; 11] = [
    "code",
    "name",
    "description",
    "price",
    "discountPercentage",
    "inStock",
    "categoryId",
    "status",
    "rating",
    "reorderLevel",
    "createdBy",
];

/// One stock record flattened for export, category already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct StockExportRow {
    pub code: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub discount_percentage: f64,
    pub in_stock: i64,
    pub category: String,
    pub status: i32,
    pub rating: i32,
    pub created_by: String,
    pub time: DateTime<Utc>,
}

/// Serialize export rows into an xlsx workbook held in memory.
pub fn write_workbook(rows: &[StockExportRow]) -> StoreResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet
        .set_name("stocks")
        .map_err(|e| StoreError::sheet(e.to_string()))?;

    for (col, header) in EXPORT_COLUMNS.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *header)
            .map_err(|e| StoreError::sheet(e.to_string()))?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        let write = |sheet: &mut rust_xlsxwriter::Worksheet, c: u16, v: &str| {
            sheet
                .write_string(r, c, v)
                .map(|_| ())
                .map_err(|e| StoreError::sheet(e.to_string()))
        };
        write(sheet, 0, &row.code)?;
        write(sheet, 1, &row.name)?;
        write(sheet, 2, &row.description)?;
        sheet
            .write_number(r, 3, row.price)
            .map_err(|e| StoreError::sheet(e.to_string()))?;
        sheet
            .write_number(r, 4, row.discount_percentage)
            .map_err(|e| StoreError::sheet(e.to_string()))?;
        sheet
            .write_number(r, 5, row.in_stock as f64)
            .map_err(|e| StoreError::sheet(e.to_string()))?;
        write(sheet, 6, &row.category)?;
        sheet
            .write_number(r, 7, f64::from(row.status))
            .map_err(|e| StoreError::sheet(e.to_string()))?;
        sheet
            .write_number(r, 8, f64::from(row.rating))
            .map_err(|e| StoreError::sheet(e.to_string()))?;
        write(sheet, 9, &row.created_by)?;
        write(sheet, 10, &row.time.to_rfc3339())?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| StoreError::sheet(e.to_string()))
}

/// Parse the first sheet of an in-memory workbook into import rows.
///
/// The first row is the header; rows are keyed by header name, blank rows
/// are skipped, and any row-level error aborts the whole parse (the caller
/// inserts all-or-nothing anyway).
pub fn read_workbook(bytes: &[u8]) -> StoreResult<Vec<StockImportRow>> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| StoreError::sheet(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| StoreError::sheet("workbook has no sheets"))?
        .map_err(|e| StoreError::sheet(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| StoreError::sheet("sheet has no header row"))?
        .iter()
        .map(cell_text)
        .collect();

    let mut parsed = Vec::new();
    for (i, row) in rows.enumerate() {
        let mut record: HashMap<String, String> = HashMap::new();
        for (header, cell) in headers.iter().zip(row) {
            let text = cell_text(cell);
            if !header.is_empty() && !text.is_empty() {
                record.insert(header.clone(), text);
            }
        }
        if record.is_empty() {
            continue;
        }
        // Header row is row 1 in the sheet, so data starts at row 2.
        let parsed_row = StockImportRow::from_record(&record)
            .map_err(|e| StoreError::sheet(format!("row {}: {}", i + 2, e)))?;
        parsed.push(parsed_row);
    }
    Ok(parsed)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn export_row(code: &str) -> StockExportRow {
        StockExportRow {
            code: code.to_string(),
            name: "Widget".into(),
            description: "desc".into(),
            price: 9.99,
            discount_percentage: 5.0,
            in_stock: 12,
            category: "Tools".into(),
            status: 1,
            rating: 4,
            created_by: "ava".into(),
            time: Utc::now(),
        }
    }

    #[test]
    fn export_then_parse_header_layout() {
        let bytes = write_workbook(&[export_row("SKU1")]).unwrap();

        // Read the workbook back just to check the fixed header layout;
        // export/import schemas are otherwise independent.
        let mut wb: Xlsx<_> = Xlsx::new(Cursor::new(bytes.as_slice())).unwrap();
        let range = wb.worksheet_range_at(0).unwrap().unwrap();
        let header: Vec<String> = range.rows().next().unwrap().iter().map(cell_text).collect();
        assert_eq!(header, EXPORT_COLUMNS.to_vec());
    }

    #[test]
    fn import_fills_defaults_and_skips_blank_rows() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (c, h) in IMPORT_COLUMNS.iter().enumerate() {
            sheet.write_string(0, c as u16, *h).unwrap();
        }
        // Row with only code+name; numeric columns empty.
        sheet.write_string(1, 0, "SKU9").unwrap();
        sheet.write_string(1, 1, "Bolt").unwrap();
        // Blank row, then one with numbers as numeric cells.
        sheet.write_string(3, 0, "SKU10").unwrap();
        sheet.write_string(3, 1, "Nut").unwrap();
        sheet.write_number(3, 3, 2.5).unwrap();
        sheet.write_number(3, 5, 40.0).unwrap();
        sheet.write_number(3, 8, 5.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let rows = read_workbook(&bytes).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].inner.rating, 3);
        assert_eq!(rows[0].inner.status, 0);
        assert_eq!(rows[1].inner.price, 2.5);
        assert_eq!(rows[1].inner.in_stock, 40);
        assert_eq!(rows[1].inner.rating, 5);
    }

    #[test]
    fn import_reports_failing_row() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "code").unwrap();
        sheet.write_string(0, 1, "categoryId").unwrap();
        sheet.write_string(1, 0, "SKU1").unwrap();
        sheet.write_string(1, 1, "not-a-uuid").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let err = read_workbook(&bytes).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }
}
