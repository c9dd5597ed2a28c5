use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use retailforge_core::PartnerId;
use retailforge_events::Event;

use crate::card::{CardId, LoyaltyCard};
use crate::program::ProgramId;

/// Event: CardCreated. Drives the "new card" customer communication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCreated {
    pub card_id: CardId,
    pub program_id: ProgramId,
    pub partner_id: Option<PartnerId>,
    pub code: String,
    pub occurred_at: DateTime<Utc>,
}

impl From<&LoyaltyCard> for CardCreated {
    fn from(card: &LoyaltyCard) -> Self {
        Self {
            card_id: card.id,
            program_id: card.program_id,
            partner_id: card.partner_id,
            code: card.code.clone(),
            occurred_at: card.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoyaltyEvent {
    CardCreated(CardCreated),
}

impl Event for LoyaltyEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LoyaltyEvent::CardCreated(_) => "loyalty.card.created",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LoyaltyEvent::CardCreated(e) => e.occurred_at,
        }
    }
}
