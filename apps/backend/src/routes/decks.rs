//! Deck endpoints

use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use studydeck_core::{assign_ids, parse, RawCard};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/decks
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<DeckListResponse>> {
    let decks = state.db.list_decks(auth.user_id).await?;
    Ok(Json(DeckListResponse { decks }))
}

/// POST /api/decks
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<CreateDeckRequest>,
) -> Result<Json<Deck>> {
    let name = deck_name(&request.name)?;
    let cards = cards_from_request(request.cards)?;
    store_deck(&state, auth.user_id, name, cards).await
}

/// POST /api/decks/import
/// Creates a deck from deck-file text
pub async fn import(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<ImportDeckRequest>,
) -> Result<Json<Deck>> {
    let name = deck_name(&request.name)?;
    let cards = assign_ids(parse(&request.content)?, 0);
    store_deck(&state, auth.user_id, name, cards).await
}

/// GET /api/decks/{deck_id}
pub async fn get(
    State(state): State<AppState>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<Deck>> {
    let deck = require_deck(&state, deck_id).await?;
    Ok(Json(deck))
}

/// DELETE /api/decks/{deck_id}
/// Only the owner may delete; every user's progress goes with it
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>> {
    let deck = state
        .db
        .get_deck(deck_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Deck {deck_id}")))?;

    if deck.owner_id != auth.user_id {
        return Err(ApiError::Forbidden("not the deck owner".to_string()));
    }

    let deleted = state.db.delete_deck(deck_id).await?;
    tracing::info!(%deck_id, "deleted deck");

    Ok(Json(DeleteResponse { deleted }))
}

/// GET /api/decks/{deck_id}/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<DeckStatsResponse>> {
    let deck = require_deck(&state, deck_id).await?;
    let progress = state.db.load_deck_progress(auth.user_id, deck_id).await?;

    let summary = progress.summary(&deck);
    Ok(Json(DeckStatsResponse {
        mastered_percent: summary.mastered_percent(),
        summary,
    }))
}

/// Load a deck with its cards or fail with 404
pub(crate) async fn require_deck(state: &AppState, deck_id: Uuid) -> Result<Deck> {
    state
        .db
        .get_core_deck(deck_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Deck {deck_id}")))
}

async fn store_deck(
    state: &AppState,
    owner_id: Uuid,
    name: &str,
    cards: Vec<Card>,
) -> Result<Json<Deck>> {
    let deck = state.db.create_deck(owner_id, name, &cards).await?;

    tracing::info!(deck_id = %deck.id, cards = cards.len(), "created deck");

    Ok(Json(Deck {
        id: deck.id.to_string(),
        name: deck.name,
        cards,
    }))
}

fn deck_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("deck name must not be empty".to_string()));
    }
    Ok(name)
}

/// Validate JSON cards and give id-less ones fresh ids
fn cards_from_request(cards: Vec<NewCard>) -> Result<Vec<Card>> {
    let mut seen = HashSet::new();
    let mut raw = Vec::with_capacity(cards.len());

    for (index, card) in cards.into_iter().enumerate() {
        if card.term.trim().is_empty() || card.definition.trim().is_empty() {
            return Err(ApiError::BadRequest(format!(
                "card {index} needs a term and a definition"
            )));
        }
        if let CardKind::MultipleChoice { options } = &card.kind {
            if options.is_empty() {
                return Err(ApiError::BadRequest(format!(
                    "multiple-choice card {index} has no options"
                )));
            }
        }
        if let Some(id) = card.id {
            if !seen.insert(id) {
                return Err(ApiError::BadRequest(format!("duplicate card id {id}")));
            }
        }

        raw.push(RawCard {
            id: card.id,
            term: card.term,
            definition: card.definition,
            hint: card.hint,
            kind: card.kind,
            line_number: index + 1,
        });
    }

    Ok(assign_ids(raw, 0))
}
