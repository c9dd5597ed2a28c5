//! First-time-customer eligibility rule for card creation.
//!
//! Only requests that carry a customer are ever checked. A restricted program
//! still accepts any number of customer-less cards; that asymmetry is kept on
//! purpose until the product owner decides otherwise.

use retailforge_core::PartnerId;

use crate::card::NewLoyaltyCard;
use crate::program::LoyaltyProgram;

/// Outcome of the eligibility check for one creation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    /// The customer already holds a card on a first-time-only program.
    RepeatCustomer,
}

impl Eligibility {
    pub fn is_eligible(self) -> bool {
        self == Eligibility::Eligible
    }
}

/// Customer whose card history must be counted before admitting `request`.
///
/// `None` means the request is admitted without looking at existing cards.
pub fn needs_history_check(program: &LoyaltyProgram, request: &NewLoyaltyCard) -> Option<PartnerId> {
    if program.first_time_only {
        request.partner_id
    } else {
        None
    }
}

/// Decide whether `request` may create a card, given how many cards the
/// customer already holds on the program.
pub fn admit(program: &LoyaltyProgram, request: &NewLoyaltyCard, existing_cards: usize) -> Eligibility {
    match needs_history_check(program, request) {
        Some(_) if existing_cards > 0 => Eligibility::RepeatCustomer,
        _ => Eligibility::Eligible,
    }
}
