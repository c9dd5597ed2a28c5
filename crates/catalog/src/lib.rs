//! Catalog domain module.
//!
//! Companies, product categories, attribute taxonomies, product templates and
//! their variants, implemented purely as deterministic domain logic (no IO, no
//! HTTP, no storage).

pub mod attribute;
pub mod company;
pub mod product;
pub mod variants;

pub use attribute::{
    Attribute, AttributeId, AttributeLine, AttributeValue, AttributeValueId, NewAttribute,
    NewAttributeValue, VariantCreation,
};
pub use company::{CategoryId, Company, NewCategory, NewCompany, ProductCategory, match_by_name};
pub use product::{
    NewProductTemplate, ProductTemplate, ProductType, ProductVariant, TemplateId, VariantId,
    VariantUpdate, parse_price,
};
pub use variants::expand_combinations;
