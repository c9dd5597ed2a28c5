//! Catalog import wizard.
//!
//! ```text
//! upload
//!   ↓
//! 1. Decode the file and parse the sheet (header on row 2)
//!   ↓
//! 2. Collect rows with a style id, group them by style
//!   ↓
//! 3. Per group: resolve company/category, resolve-or-create Color/Size
//!    values, create the template (variants are expanded by the store)
//!   ↓
//! 4. Copy SKU/barcode from the first matching row onto each variant
//!   ↓
//! 5. Commit and return the success notification
//! ```
//!
//! Any failure rolls the whole import back.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use retailforge_catalog::{
    AttributeLine, AttributeValueId, NewAttribute, NewAttributeValue, NewProductTemplate, ProductType,
    TemplateId, VariantCreation, VariantUpdate, parse_price,
};
use retailforge_infra::{CatalogRepository, UnitOfWork};

use crate::error::ImportError;
use crate::matching::VariantRowIndex;
use crate::notification::ClientNotification;
use crate::rows::{ImportRow, StyleGroup, group_by_style};
use crate::sheet::read_table;
use crate::upload::Upload;

const COLOR_ATTRIBUTE: &str = "Color";
const SIZE_ATTRIBUTE: &str = "Size";

/// Outcome of a successful import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub notification: ClientNotification,
    /// Created templates, in sheet order.
    pub templates: Vec<TemplateId>,
    /// Variants that received a SKU or barcode from a matching row.
    pub variants_matched: usize,
}

/// Attribute line resolved for one group, with value names for matching.
struct ResolvedLine {
    line: AttributeLine,
    names: HashMap<AttributeValueId, String>,
}

impl ResolvedLine {
    fn name_in(&self, value_ids: &[AttributeValueId]) -> Option<&str> {
        value_ids.iter().find_map(|id| self.names.get(id)).map(String::as_str)
    }
}

/// Imports product templates and variants from an uploaded spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImportWizard {
    #[serde(flatten)]
    pub upload: Upload,
}

impl ProductImportWizard {
    pub fn new(upload: Upload) -> Self {
        Self { upload }
    }

    /// Run the import inside `uow`, committing on success.
    pub fn import_data<U: UnitOfWork>(&self, mut uow: U) -> Result<ImportReport, ImportError> {
        match self.run(&mut uow) {
            Ok(report) => {
                uow.commit()?;
                tracing::info!(
                    templates = report.templates.len(),
                    variants_matched = report.variants_matched,
                    "catalog import committed"
                );
                Ok(report)
            }
            Err(e) => {
                tracing::warn!(error = %e, "catalog import aborted");
                uow.rollback();
                Err(e)
            }
        }
    }

    fn run<R: CatalogRepository>(&self, repo: &mut R) -> Result<ImportReport, ImportError> {
        let (format, bytes) = self.upload.decode()?;
        let table = read_table(format, &bytes)?;
        let groups = group_by_style(ImportRow::collect(&table)?);

        tracing::info!(
            filename = self.upload.filename.as_deref().unwrap_or_default(),
            rows = table.row_count(),
            groups = groups.len(),
            "importing catalog"
        );

        let mut templates = Vec::with_capacity(groups.len());
        let mut variants_matched = 0;
        for group in &groups {
            let (template_id, matched) = import_group(repo, group)?;
            templates.push(template_id);
            variants_matched += matched;
        }

        Ok(ImportReport {
            notification: ClientNotification::import_succeeded(),
            templates,
            variants_matched,
        })
    }
}

fn import_group<R: CatalogRepository>(repo: &mut R, group: &StyleGroup) -> Result<(TemplateId, usize), ImportError> {
    let first = group.representative();

    let company_id = match first.company.as_deref() {
        Some(name) => Some(
            repo.find_company_by_name(name)?
                .ok_or_else(|| ImportError::validation(format!("Company not found: {name}")))?
                .id,
        ),
        None => None,
    };
    let category_id = match first.category.as_deref() {
        Some(name) => Some(
            repo.find_category_by_name(name)?
                .ok_or_else(|| ImportError::validation(format!("Product Category not found: {name}")))?
                .id,
        ),
        None => None,
    };

    let color = resolve_line(repo, COLOR_ATTRIBUTE, &group.colors())?;
    let size = resolve_line(repo, SIZE_ATTRIBUTE, &group.sizes())?;

    let list_price = match first.unit_price.as_deref() {
        Some(text) => parse_price(text).map_err(|_| {
            ImportError::validation(format!("Invalid unit price for style {}: {text}", group.style_id))
        })?,
        None => 0,
    };

    let template = repo.create_template(NewProductTemplate {
        name: group.template_name(),
        product_type: ProductType::from_label(first.product_type.as_deref()),
        default_code: Some(group.style_id.clone()),
        list_price,
        attribute_lines: color.iter().chain(size.iter()).map(|r| r.line.clone()).collect(),
        company_id,
        category_id,
    })?;

    let index = VariantRowIndex::build(&group.rows);
    let mut matched = 0;
    for variant in repo.variants_of(template.id)? {
        let color_name = color.as_ref().and_then(|r| r.name_in(&variant.value_ids));
        let size_name = size.as_ref().and_then(|r| r.name_in(&variant.value_ids));

        let Some(row) = index.lookup(color_name, size_name).map(|idx| &group.rows[idx]) else {
            tracing::debug!(variant_id = %variant.id, ?color_name, ?size_name, "no row for variant");
            continue;
        };

        let update = VariantUpdate {
            default_code: row.sku.clone(),
            barcode: row.barcode.clone(),
        };
        if !update.is_empty() {
            repo.update_variant(variant.id, update)?;
            matched += 1;
        }
    }

    tracing::info!(
        style_id = %group.style_id,
        template_id = %template.id,
        rows = group.rows.len(),
        variants_matched = matched,
        "imported style"
    );
    Ok((template.id, matched))
}

/// Find or create `attribute` and one value per name; `None` when there are no names.
fn resolve_line<R: CatalogRepository>(
    repo: &mut R,
    attribute: &str,
    names: &[&str],
) -> Result<Option<ResolvedLine>, ImportError> {
    if names.is_empty() {
        return Ok(None);
    }

    let attribute = match repo.find_attribute_by_name(attribute)? {
        Some(existing) if existing.variant_creation == VariantCreation::Always => existing,
        Some(existing) => repo.set_variant_creation(existing.id, VariantCreation::Always)?,
        None => repo.create_attribute(NewAttribute {
            name: attribute.to_string(),
            variant_creation: VariantCreation::Always,
        })?,
    };

    let mut value_ids = Vec::with_capacity(names.len());
    let mut by_id = HashMap::with_capacity(names.len());
    for name in names {
        let value = match repo.find_attribute_value(attribute.id, name)? {
            Some(value) => value,
            None => repo.create_attribute_value(NewAttributeValue {
                attribute_id: attribute.id,
                name: name.to_string(),
            })?,
        };
        value_ids.push(value.id);
        by_id.insert(value.id, value.name);
    }

    Ok(Some(ResolvedLine {
        line: AttributeLine {
            attribute_id: attribute.id,
            value_ids,
        },
        names: by_id,
    }))
}
