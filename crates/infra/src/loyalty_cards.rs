//! Loyalty card creation pipeline.
//!
//! ```text
//! requests
//!   ↓
//! 1. Drop repeat customers on first-time-only programs (silently)
//!   ↓
//! 2. Create the surviving cards inside one unit of work
//!   ↓
//! 3. Commit
//!   ↓
//! 4. Publish one `loyalty.card.created` event per card (creation communication)
//! ```
//!
//! Publication happens after the commit. If it fails the cards exist and the
//! error is returned to the caller (at-least-once).

use thiserror::Error;

use retailforge_events::EventBus;
use retailforge_loyalty::{Eligibility, LoyaltyCard, LoyaltyEvent, NewLoyaltyCard, admit, needs_history_check};

use crate::repository::{LoyaltyRepository, RepoResult, RepositoryError, Store, UnitOfWork};

#[derive(Debug, Error)]
pub enum LoyaltyCardError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Cards were committed but the creation communication could not be sent.
    #[error("card communication failed: {0}")]
    Publish(String),
}

/// Keep only the requests that pass the first-time-customer rule.
///
/// Existing cards are counted against the repository as it was before the
/// batch; two requests for the same customer in one batch both survive.
pub fn filter_eligible<R>(repo: &R, requests: Vec<NewLoyaltyCard>) -> RepoResult<Vec<NewLoyaltyCard>>
where
    R: LoyaltyRepository + ?Sized,
{
    let mut admitted = Vec::with_capacity(requests.len());

    for request in requests {
        // Unknown programs pass through; creation rejects them.
        let Some(program) = repo.program(request.program_id)? else {
            admitted.push(request);
            continue;
        };

        let existing = match needs_history_check(&program, &request) {
            Some(partner_id) => repo.count_cards(partner_id, program.id)?,
            None => 0,
        };

        match admit(&program, &request, existing) {
            Eligibility::Eligible => admitted.push(request),
            Eligibility::RepeatCustomer => {
                tracing::info!(
                    program_id = %program.id,
                    partner_id = ?request.partner_id,
                    "skipping card for repeat customer on first-time-only program"
                );
            }
        }
    }

    Ok(admitted)
}

/// Creates loyalty cards and sends their creation communication.
#[derive(Debug)]
pub struct LoyaltyCardService<S, B> {
    store: S,
    bus: B,
}

impl<S, B> LoyaltyCardService<S, B> {
    pub fn new(store: S, bus: B) -> Self {
        Self { store, bus }
    }
}

impl<S, B> LoyaltyCardService<S, B>
where
    S: Store,
    B: EventBus<LoyaltyEvent>,
{
    /// Create the eligible subset of `requests`.
    ///
    /// Returns the created cards, which may be fewer than requested (or none).
    /// Any store error aborts the whole batch.
    pub fn create_cards(&self, requests: Vec<NewLoyaltyCard>) -> Result<Vec<LoyaltyCard>, LoyaltyCardError> {
        let requested = requests.len();
        let mut uow = self.store.begin()?;

        let created = match filter_eligible(&uow, requests).and_then(|admitted| uow.create_cards(admitted)) {
            Ok(created) => created,
            Err(e) => {
                uow.rollback();
                return Err(e.into());
            }
        };
        uow.commit()?;

        tracing::info!(requested, created = created.len(), "loyalty cards created");

        for card in &created {
            self.bus
                .publish(LoyaltyEvent::CardCreated(card.into()))
                .map_err(|e| LoyaltyCardError::Publish(format!("{e:?}")))?;
        }

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use retailforge_core::PartnerId;
    use retailforge_events::InMemoryEventBus;
    use retailforge_loyalty::{LoyaltyProgram, NewLoyaltyProgram, ProgramId};

    use crate::store::InMemoryStore;

    type Service = LoyaltyCardService<Arc<InMemoryStore>, Arc<InMemoryEventBus<LoyaltyEvent>>>;

    fn setup() -> (Service, Arc<InMemoryStore>, Arc<InMemoryEventBus<LoyaltyEvent>>) {
        let store = Arc::new(InMemoryStore::new());
        let bus = Arc::new(InMemoryEventBus::new());
        (LoyaltyCardService::new(store.clone(), bus.clone()), store, bus)
    }

    fn program(store: &InMemoryStore, first_time_only: bool) -> LoyaltyProgram {
        let mut uow = store.begin().unwrap();
        let program = uow
            .create_program(NewLoyaltyProgram {
                name: "Welcome".to_string(),
                first_time_only,
            })
            .unwrap();
        uow.commit().unwrap();
        program
    }

    fn card(program_id: ProgramId, partner_id: Option<PartnerId>) -> NewLoyaltyCard {
        NewLoyaltyCard {
            program_id,
            partner_id,
            code: None,
            points: 0,
        }
    }

    fn stored_cards(store: &InMemoryStore, program_id: ProgramId) -> usize {
        store.begin().unwrap().cards_of_program(program_id).unwrap().len()
    }

    #[test]
    fn second_card_for_same_customer_is_silently_dropped() {
        let (service, store, bus) = setup();
        let program = program(&store, true);
        let partner = PartnerId::new();
        let events = bus.subscribe();

        let first = service.create_cards(vec![card(program.id, Some(partner))]).unwrap();
        assert_eq!(first.len(), 1);

        let second = service.create_cards(vec![card(program.id, Some(partner))]).unwrap();
        assert!(second.is_empty());

        assert_eq!(stored_cards(&store, program.id), 1);
        assert_eq!(events.drain().len(), 1);
    }

    #[test]
    fn unrestricted_program_accepts_repeat_customers() {
        let (service, store, _bus) = setup();
        let program = program(&store, false);
        let partner = PartnerId::new();

        service.create_cards(vec![card(program.id, Some(partner))]).unwrap();
        service.create_cards(vec![card(program.id, Some(partner))]).unwrap();

        assert_eq!(stored_cards(&store, program.id), 2);
    }

    #[test]
    fn customerless_requests_are_never_filtered() {
        let (service, store, _bus) = setup();
        let program = program(&store, true);

        service.create_cards(vec![card(program.id, None)]).unwrap();
        service.create_cards(vec![card(program.id, None)]).unwrap();

        assert_eq!(stored_cards(&store, program.id), 2);
    }

    #[test]
    fn only_repeat_requests_are_dropped_from_a_mixed_batch() {
        let (service, store, _bus) = setup();
        let program = program(&store, true);
        let returning = PartnerId::new();
        service.create_cards(vec![card(program.id, Some(returning))]).unwrap();

        let newcomer = PartnerId::new();
        let created = service
            .create_cards(vec![
                card(program.id, Some(returning)),
                card(program.id, Some(newcomer)),
                card(program.id, None),
            ])
            .unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(created[0].partner_id, Some(newcomer));
        assert_eq!(created[1].partner_id, None);
    }

    #[test]
    fn duplicates_within_one_batch_both_survive() {
        let (service, store, _bus) = setup();
        let program = program(&store, true);
        let partner = PartnerId::new();

        let created = service
            .create_cards(vec![card(program.id, Some(partner)), card(program.id, Some(partner))])
            .unwrap();

        assert_eq!(created.len(), 2);
    }

    #[test]
    fn unknown_program_aborts_the_batch() {
        let (service, store, bus) = setup();
        let program = program(&store, false);
        let events = bus.subscribe();

        let err = service
            .create_cards(vec![card(program.id, None), card(ProgramId::new(), None)])
            .unwrap_err();

        assert!(matches!(err, LoyaltyCardError::Repository(RepositoryError::NotFound(_))));
        assert_eq!(stored_cards(&store, program.id), 0);
        assert!(events.drain().is_empty());
    }

    #[test]
    fn creation_communication_carries_card_details() {
        let (service, store, bus) = setup();
        let program = program(&store, false);
        let events = bus.subscribe();
        let partner = PartnerId::new();

        let created = service.create_cards(vec![card(program.id, Some(partner))]).unwrap();

        match events.try_recv().unwrap() {
            LoyaltyEvent::CardCreated(e) => {
                assert_eq!(e.card_id, created[0].id);
                assert_eq!(e.partner_id, Some(partner));
                assert_eq!(e.code, created[0].code);
            }
        }
    }
}
