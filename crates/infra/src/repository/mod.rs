//! Repository abstractions over the catalog and loyalty records.
//!
//! Every operation takes or returns a typed request/record from the domain
//! crates. Writes only happen inside a [`UnitOfWork`], which is committed or
//! rolled back as a whole.

use std::sync::Arc;

use thiserror::Error;

use retailforge_catalog::{
    Attribute, AttributeId, AttributeValue, AttributeValueId, Company, NewAttribute,
    NewAttributeValue, NewCategory, NewCompany, NewProductTemplate, ProductCategory,
    ProductTemplate, ProductVariant, TemplateId, VariantCreation, VariantId, VariantUpdate,
};
use retailforge_core::{DomainError, PartnerId};
use retailforge_loyalty::{LoyaltyCard, LoyaltyProgram, NewLoyaltyCard, NewLoyaltyProgram, ProgramId};

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository operation error.
///
/// These are **storage errors** (missing references, uniqueness, stale
/// commits) as opposed to request-level validation owned by callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found: {0}")]
    NotFound(String),

    /// Uniqueness violation or a commit over a store that changed since `begin`.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The request was rejected by domain validation.
    #[error("invalid record: {0}")]
    Invalid(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<DomainError> for RepositoryError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => RepositoryError::Invalid(msg),
        }
    }
}

/// Catalog records: companies, categories, attributes, templates, variants.
pub trait CatalogRepository {
    fn create_company(&mut self, request: NewCompany) -> RepoResult<Company>;

    /// Case-insensitive lookup; exact match first, then substring match.
    fn find_company_by_name(&self, name: &str) -> RepoResult<Option<Company>>;

    fn create_category(&mut self, request: NewCategory) -> RepoResult<ProductCategory>;

    /// Case-insensitive lookup; exact match first, then substring match.
    fn find_category_by_name(&self, name: &str) -> RepoResult<Option<ProductCategory>>;

    /// Exact name lookup.
    fn find_attribute_by_name(&self, name: &str) -> RepoResult<Option<Attribute>>;

    fn create_attribute(&mut self, request: NewAttribute) -> RepoResult<Attribute>;

    fn set_variant_creation(&mut self, id: AttributeId, mode: VariantCreation) -> RepoResult<Attribute>;

    fn attribute_value(&self, id: AttributeValueId) -> RepoResult<Option<AttributeValue>>;

    /// Exact name lookup within one attribute.
    fn find_attribute_value(&self, attribute_id: AttributeId, name: &str) -> RepoResult<Option<AttributeValue>>;

    fn attribute_values(&self, attribute_id: AttributeId) -> RepoResult<Vec<AttributeValue>>;

    fn create_attribute_value(&mut self, request: NewAttributeValue) -> RepoResult<AttributeValue>;

    /// Create a template and expand its variants (one per value combination
    /// of the lines whose attribute creates variants eagerly).
    fn create_template(&mut self, request: NewProductTemplate) -> RepoResult<ProductTemplate>;

    fn template(&self, id: TemplateId) -> RepoResult<Option<ProductTemplate>>;

    fn templates(&self) -> RepoResult<Vec<ProductTemplate>>;

    fn variants_of(&self, template_id: TemplateId) -> RepoResult<Vec<ProductVariant>>;

    fn update_variant(&mut self, id: VariantId, update: VariantUpdate) -> RepoResult<ProductVariant>;
}

/// Loyalty records: programs and cards.
pub trait LoyaltyRepository {
    fn create_program(&mut self, request: NewLoyaltyProgram) -> RepoResult<LoyaltyProgram>;

    fn program(&self, id: ProgramId) -> RepoResult<Option<LoyaltyProgram>>;

    /// Number of stored cards held by `partner_id` on `program_id`.
    fn count_cards(&self, partner_id: PartnerId, program_id: ProgramId) -> RepoResult<usize>;

    /// Create cards in request order. Fails as a whole if any request names
    /// an unknown program or a code already in use.
    fn create_cards(&mut self, requests: Vec<NewLoyaltyCard>) -> RepoResult<Vec<LoyaltyCard>>;

    fn cards_of_program(&self, program_id: ProgramId) -> RepoResult<Vec<LoyaltyCard>>;
}

/// A transactional view of the store.
///
/// Changes are invisible to other units of work until `commit`. Dropping a
/// unit of work without committing discards its changes.
pub trait UnitOfWork: CatalogRepository + LoyaltyRepository + Sized {
    fn commit(self) -> RepoResult<()>;

    fn rollback(self);
}

/// Hands out units of work.
pub trait Store: Send + Sync {
    type UnitOfWork: UnitOfWork;

    fn begin(&self) -> RepoResult<Self::UnitOfWork>;
}

impl<S> Store for Arc<S>
where
    S: Store + ?Sized,
{
    type UnitOfWork = S::UnitOfWork;

    fn begin(&self) -> RepoResult<Self::UnitOfWork> {
        (**self).begin()
    }
}
