use serde::{Deserialize, Serialize};

use retailforge_core::{DomainError, DomainResult, Entity, uuid_newtype};

uuid_newtype!(
    /// Loyalty program identifier.
    ProgramId
);

/// A loyalty program cards are issued under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyProgram {
    pub id: ProgramId,
    pub name: String,
    /// "First Time Customer Only": at most one card per customer.
    pub first_time_only: bool,
}

impl Entity for LoyaltyProgram {
    type Id = ProgramId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Request: create a loyalty program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLoyaltyProgram {
    pub name: String,
    #[serde(default)]
    pub first_time_only: bool,
}

impl NewLoyaltyProgram {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("program name cannot be empty"));
        }
        Ok(())
    }
}
