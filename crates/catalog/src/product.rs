use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use retailforge_core::{CompanyId, DomainError, DomainResult, Entity, uuid_newtype};

use crate::attribute::{AttributeLine, AttributeValueId};
use crate::company::CategoryId;

uuid_newtype!(
    /// Product template identifier.
    TemplateId
);

uuid_newtype!(
    /// Product variant identifier.
    VariantId
);

/// Kind of product a template describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    #[default]
    Consumable,
    Service,
    Combo,
}

impl ProductType {
    /// Map a spreadsheet "ProductType" label onto a product type.
    ///
    /// Labels are matched exactly after trimming; anything unrecognized (or
    /// missing) is a consumable.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some("Goods") => ProductType::Consumable,
            Some("Service") => ProductType::Service,
            Some("Combo") => ProductType::Combo,
            _ => ProductType::Consumable,
        }
    }
}

/// Aggregate root: ProductTemplate.
///
/// Owns the attribute lines from which its variants are expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTemplate {
    pub id: TemplateId,
    pub name: String,
    pub product_type: ProductType,
    /// Internal reference; the import uses the style id.
    pub default_code: Option<String>,
    pub list_price: u64, // smallest currency unit (e.g. cents)
    pub attribute_lines: Vec<AttributeLine>,
    pub company_id: Option<CompanyId>,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
}

impl Entity for ProductTemplate {
    type Id = TemplateId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Request: create a product template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProductTemplate {
    pub name: String,
    pub product_type: ProductType,
    pub default_code: Option<String>,
    pub list_price: u64,
    pub attribute_lines: Vec<AttributeLine>,
    pub company_id: Option<CompanyId>,
    pub category_id: Option<CategoryId>,
}

impl NewProductTemplate {
    /// Check the request in isolation (references are checked by the store).
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("template name cannot be empty"));
        }

        let mut attributes = HashSet::new();
        for line in &self.attribute_lines {
            if !attributes.insert(line.attribute_id) {
                return Err(DomainError::validation(format!(
                    "attribute {} appears on more than one line",
                    line.attribute_id
                )));
            }
            if line.value_ids.is_empty() {
                return Err(DomainError::validation(format!(
                    "attribute line for {} has no values",
                    line.attribute_id
                )));
            }
            let distinct: HashSet<_> = line.value_ids.iter().collect();
            if distinct.len() != line.value_ids.len() {
                return Err(DomainError::validation(format!(
                    "attribute line for {} repeats a value",
                    line.attribute_id
                )));
            }
        }

        Ok(())
    }
}

/// A concrete, purchasable combination of attribute values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub template_id: TemplateId,
    pub value_ids: Vec<AttributeValueId>,
    /// Internal reference (SKU).
    pub default_code: Option<String>,
    pub barcode: Option<String>,
}

impl Entity for ProductVariant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Request: update a variant. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantUpdate {
    pub default_code: Option<String>,
    pub barcode: Option<String>,
}

impl VariantUpdate {
    pub fn is_empty(&self) -> bool {
        self.default_code.is_none() && self.barcode.is_none()
    }

    /// Apply the update to a variant in place.
    pub fn apply_to(&self, variant: &mut ProductVariant) {
        if let Some(code) = &self.default_code {
            variant.default_code = Some(code.clone());
        }
        if let Some(barcode) = &self.barcode {
            variant.barcode = Some(barcode.clone());
        }
    }
}

/// Parse a price cell into the smallest currency unit.
///
/// Accepts `.` as decimal separator, or a single `,` when the text has no `.`
/// and the comma is not followed by exactly three digits (a thousands
/// separator such as `1,299` is ambiguous and rejected). Rounds to two
/// decimals.
pub fn parse_price(text: &str) -> DomainResult<u64> {
    let trimmed = text.trim();
    let invalid = || DomainError::validation(format!("invalid price: {trimmed}"));

    let normalized = match trimmed.split_once(',') {
        None => trimmed.to_string(),
        Some((whole, fraction)) => {
            let grouped = fraction.len() == 3 && fraction.bytes().all(|b| b.is_ascii_digit());
            if trimmed.contains('.') || fraction.contains(',') || grouped {
                return Err(invalid());
            }
            format!("{whole}.{fraction}")
        }
    };

    let value: f64 = normalized.parse().map_err(|_| invalid())?;
    let cents = (value * 100.0).round();
    if !cents.is_finite() || cents < 0.0 || cents >= u64::MAX as f64 {
        return Err(invalid());
    }

    Ok(cents as u64)
}
