//! `retailforge-core`: shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed record identifiers, the domain error model and the `Entity` trait.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CompanyId, PartnerId};

#[doc(hidden)]
pub use uuid::Uuid;
