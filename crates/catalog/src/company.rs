use serde::{Deserialize, Serialize};

use retailforge_core::{CompanyId, DomainError, DomainResult, Entity, uuid_newtype};

uuid_newtype!(
    /// Product category identifier.
    CategoryId
);

/// A company owning catalog records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
}

impl Entity for Company {
    type Id = CompanyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Request: create a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompany {
    pub name: String,
}

impl NewCompany {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("company name cannot be empty"));
        }
        Ok(())
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: CategoryId,
    pub name: String,
}

impl Entity for ProductCategory {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Request: create a product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

impl NewCategory {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("category name cannot be empty"));
        }
        Ok(())
    }
}

/// Case-insensitive name lookup over a list of named records.
///
/// An exact (case-folded) match wins; otherwise the first record whose name
/// contains the query is returned. Records are scanned in the given order.
pub fn match_by_name<'a, T>(
    records: impl IntoIterator<Item = &'a T>,
    name_of: impl Fn(&T) -> &str,
    query: &str,
) -> Option<&'a T>
where
    T: 'a,
{
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let mut partial = None;
    for record in records {
        let name = name_of(record).to_lowercase();
        if name == needle {
            return Some(record);
        }
        if partial.is_none() && name.contains(&needle) {
            partial = Some(record);
        }
    }
    partial
}
