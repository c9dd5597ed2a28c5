use std::sync::Arc;
use std::thread;

use retailforge_events::{EventBus, InMemoryEventBus, Subscription};
use retailforge_infra::{
    InMemoryStore, InMemoryUnitOfWork, LoyaltyCardService, RepoResult, Store, UnitOfWork,
};
use retailforge_loyalty::LoyaltyEvent;

pub type LoyaltyBus = InMemoryEventBus<LoyaltyEvent>;
pub type CardService = LoyaltyCardService<Arc<InMemoryStore>, Arc<LoyaltyBus>>;

/// Process-wide services shared by every handler.
#[derive(Debug)]
pub struct AppServices {
    pub store: Arc<InMemoryStore>,
    pub loyalty_cards: CardService,
}

impl AppServices {
    /// Run a read-only operation against a fresh snapshot.
    pub fn read<T>(&self, op: impl FnOnce(&InMemoryUnitOfWork) -> RepoResult<T>) -> RepoResult<T> {
        let uow = self.store.begin()?;
        let out = op(&uow);
        uow.rollback();
        out
    }

    /// Run `op` in its own unit of work, committing only if it succeeds.
    pub fn write<T>(&self, op: impl FnOnce(&mut InMemoryUnitOfWork) -> RepoResult<T>) -> RepoResult<T> {
        let mut uow = self.store.begin()?;
        match op(&mut uow) {
            Ok(value) => {
                uow.commit()?;
                Ok(value)
            }
            Err(e) => {
                uow.rollback();
                Err(e)
            }
        }
    }
}

pub fn build_services() -> AppServices {
    let store = Arc::new(InMemoryStore::new());
    let bus = Arc::new(LoyaltyBus::new());

    spawn_card_communications(bus.subscribe());

    AppServices {
        store: store.clone(),
        loyalty_cards: LoyaltyCardService::new(store, bus),
    }
}

/// Background consumer sending the "new card" communication.
///
/// Runs until the bus is dropped.
fn spawn_card_communications(subscription: Subscription<LoyaltyEvent>) {
    let spawned = thread::Builder::new()
        .name("card-communications".to_string())
        .spawn(move || {
            while let Ok(event) = subscription.recv() {
                match event {
                    LoyaltyEvent::CardCreated(card) => tracing::info!(
                        card_id = %card.card_id,
                        program_id = %card.program_id,
                        partner_id = ?card.partner_id,
                        code = %card.code,
                        "sending loyalty card creation communication"
                    ),
                }
            }
        });

    if let Err(e) = spawned {
        tracing::error!(error = %e, "failed to start card communication worker");
    }
}
