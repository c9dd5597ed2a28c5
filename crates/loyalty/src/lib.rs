//! Loyalty domain module.
//!
//! Programs, cards and the first-time-customer eligibility rule, implemented
//! as deterministic domain logic (no IO, no storage).

pub mod card;
pub mod eligibility;
pub mod event;
pub mod program;

pub use card::{CardId, LoyaltyCard, NewLoyaltyCard, generate_code};
pub use eligibility::{Eligibility, admit, needs_history_check};
pub use event::{CardCreated, LoyaltyEvent};
pub use program::{LoyaltyProgram, NewLoyaltyProgram, ProgramId};
