use serde::{Deserialize, Serialize};

use retailforge_core::{DomainError, DomainResult, Entity, uuid_newtype};

uuid_newtype!(
    /// Attribute (taxonomy) identifier, e.g. the "Color" attribute.
    AttributeId
);

uuid_newtype!(
    /// Attribute value identifier, e.g. "Red" under "Color".
    AttributeValueId
);

/// When variants are generated for an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantCreation {
    /// Every value combination becomes a variant as soon as the template exists.
    #[default]
    Always,
    /// Variants are created lazily when a combination is first ordered.
    Dynamic,
    /// The attribute is informational; it never produces variants.
    NoVariant,
}

/// Named product dimension shared across templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub name: String,
    pub variant_creation: VariantCreation,
}

impl Entity for Attribute {
    type Id = AttributeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Request: create an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttribute {
    pub name: String,
    pub variant_creation: VariantCreation,
}

impl NewAttribute {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("attribute name cannot be empty"));
        }
        Ok(())
    }
}

/// One possible value of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub id: AttributeValueId,
    pub attribute_id: AttributeId,
    pub name: String,
}

impl Entity for AttributeValue {
    type Id = AttributeValueId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Request: create a value under an existing attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttributeValue {
    pub attribute_id: AttributeId,
    pub name: String,
}

impl NewAttributeValue {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("attribute value name cannot be empty"));
        }
        Ok(())
    }
}

/// Attaches an attribute and a subset of its values to a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeLine {
    pub attribute_id: AttributeId,
    pub value_ids: Vec<AttributeValueId>,
}
