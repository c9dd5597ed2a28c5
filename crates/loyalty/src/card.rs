use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use retailforge_core::{Entity, PartnerId, uuid_newtype};

use crate::program::ProgramId;

uuid_newtype!(
    /// Loyalty card identifier.
    CardId
);

/// A card tying a customer (optionally) to a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyCard {
    pub id: CardId,
    pub program_id: ProgramId,
    pub partner_id: Option<PartnerId>,
    pub code: String,
    pub points: u64,
    pub created_at: DateTime<Utc>,
}

impl Entity for LoyaltyCard {
    type Id = CardId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Request: create a card.
///
/// Cards may be issued without a customer (e.g. anonymous gift cards).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLoyaltyCard {
    pub program_id: ProgramId,
    #[serde(default)]
    pub partner_id: Option<PartnerId>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub points: u64,
}

/// Generate a printable card code for a new card.
///
/// Uses the random tail of the card's UUIDv7, so codes of cards created in the
/// same millisecond still differ.
pub fn generate_code(id: &CardId) -> String {
    let hex = id.as_uuid().simple().to_string();
    format!("044{}", &hex[hex.len() - 12..])
}
