use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use retailforge_infra::{LoyaltyRepository, RepositoryError};
use retailforge_loyalty::{NewLoyaltyProgram, ProgramId};

use crate::app::dto::{CreateCardsRequest, Items};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/programs", post(create_program))
        .route("/programs/:id/cards", get(list_program_cards))
        .route("/cards", post(create_cards))
}

pub async fn create_program(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewLoyaltyProgram>,
) -> axum::response::Response {
    match services.write(|uow| uow.create_program(body)) {
        Ok(program) => (StatusCode::CREATED, Json(program)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

/// Creates the eligible subset of the batch; repeat customers on
/// first-time-only programs are dropped without an error.
pub async fn create_cards(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<CreateCardsRequest>,
) -> axum::response::Response {
    match services.loyalty_cards.create_cards(body.cards) {
        Ok(created) => (StatusCode::CREATED, Json(Items::from(created))).into_response(),
        Err(e) => errors::loyalty_error_to_response(e),
    }
}

pub async fn list_program_cards(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let program_id: ProgramId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid program id"),
    };

    let cards = services.read(|uow| {
        if uow.program(program_id)?.is_none() {
            return Err(RepositoryError::NotFound(format!("loyalty program {program_id}")));
        }
        uow.cards_of_program(program_id)
    });

    match cards {
        Ok(cards) => (StatusCode::OK, Json(Items::from(cards))).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}
