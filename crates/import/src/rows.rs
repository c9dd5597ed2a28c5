//! Typed import rows and their grouping by style.

use std::collections::{HashMap, HashSet};

use crate::error::ImportError;
use crate::sheet::Table;

pub const STYLE_ID: &str = "Style Id";
pub const COMPANY: &str = "Company";
pub const PRODUCT_CATEGORY: &str = "Product Category";
pub const COLOR_ID: &str = "Color Id";
pub const SIZE: &str = "Size";
pub const ITEM_CATEGORY_CODE: &str = "Item Category Code";
pub const PRODUCT_TYPE: &str = "ProductType";
pub const UNIT_PRICE: &str = "Unit Price Including VAT";
pub const SKU: &str = "SKU";
pub const BARCODE: &str = "No_";

/// One data row of the sheet. Absent columns read as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    pub style_id: String,
    pub company: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub item_category_code: Option<String>,
    pub product_type: Option<String>,
    pub unit_price: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
}

impl ImportRow {
    /// Read every row with a non-blank style id.
    pub fn collect(table: &Table) -> Result<Vec<ImportRow>, ImportError> {
        let style_col = table
            .column_index(STYLE_ID)
            .ok_or_else(|| ImportError::validation(format!("Missing \"{STYLE_ID}\" column in the uploaded file.")))?;

        let col = |name: &str| table.column_index(name);
        let (company, category, color, size) = (col(COMPANY), col(PRODUCT_CATEGORY), col(COLOR_ID), col(SIZE));
        let (code, kind, price, sku, barcode) =
            (col(ITEM_CATEGORY_CODE), col(PRODUCT_TYPE), col(UNIT_PRICE), col(SKU), col(BARCODE));

        let mut rows = Vec::with_capacity(table.row_count());
        for row in 0..table.row_count() {
            let Some(style_id) = table.cell(row, style_col) else {
                continue;
            };
            let read = |column: Option<usize>| column.and_then(|c| table.cell(row, c)).map(str::to_string);

            rows.push(ImportRow {
                style_id: style_id.to_string(),
                company: read(company),
                category: read(category),
                color: read(color),
                size: read(size),
                item_category_code: read(code),
                product_type: read(kind),
                unit_price: read(price),
                sku: read(sku),
                barcode: read(barcode),
            });
        }
        Ok(rows)
    }
}

/// Rows sharing one style id; becomes one product template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleGroup {
    pub style_id: String,
    /// Non-empty, in sheet order.
    pub rows: Vec<ImportRow>,
}

impl StyleGroup {
    /// Row carrying the template-level fields.
    pub fn representative(&self) -> &ImportRow {
        &self.rows[0]
    }

    /// Distinct colors in first-seen order.
    pub fn colors(&self) -> Vec<&str> {
        distinct(self.rows.iter().filter_map(|r| r.color.as_deref()))
    }

    /// Distinct sizes in first-seen order.
    pub fn sizes(&self) -> Vec<&str> {
        distinct(self.rows.iter().filter_map(|r| r.size.as_deref()))
    }

    /// Template name: style id and item category code joined by " - ".
    pub fn template_name(&self) -> String {
        let row = self.representative();
        match (row.style_id.as_str(), row.item_category_code.as_deref()) {
            ("", None) => "Unnamed Product".to_string(),
            (style, None) => style.to_string(),
            ("", Some(code)) => code.to_string(),
            (style, Some(code)) => format!("{style} - {code}"),
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|value| seen.insert(*value)).collect()
}

/// Group rows by style id, groups in order of first appearance.
pub fn group_by_style(rows: Vec<ImportRow>) -> Vec<StyleGroup> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<StyleGroup> = Vec::new();

    for row in rows {
        match positions.get(&row.style_id) {
            Some(&idx) => groups[idx].rows.push(row),
            None => {
                positions.insert(row.style_id.clone(), groups.len());
                groups.push(StyleGroup {
                    style_id: row.style_id.clone(),
                    rows: vec![row],
                });
            }
        }
    }
    groups
}
