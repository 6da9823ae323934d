//! Study endpoints: progress documents, grading, overrides and stars
//!
//! Every mutation is a load, change and whole-document overwrite of the
//! user's progress for the deck. Concurrent writers clobber each other.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use studydeck_core::{grade as grade_answer, grading::strip_markup, MasteryStatus, StudyError};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::routes::decks::require_deck;
use crate::AppState;

/// GET /api/decks/{deck_id}/progress
pub async fn get_progress(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<DeckProgress>> {
    require_deck(&state, deck_id).await?;
    let progress = state.db.load_deck_progress(auth.user_id, deck_id).await?;
    Ok(Json(progress))
}

/// PUT /api/decks/{deck_id}/progress
pub async fn put_progress(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<Uuid>,
    Json(progress): Json<DeckProgress>,
) -> Result<Json<DeckProgress>> {
    require_deck(&state, deck_id).await?;
    state
        .db
        .save_deck_progress(auth.user_id, deck_id, &progress)
        .await?;
    Ok(Json(progress))
}

/// POST /api/decks/{deck_id}/grade
pub async fn grade(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<Uuid>,
    Json(request): Json<GradeRequest>,
) -> Result<Json<GradeResponse>> {
    let deck = require_deck(&state, deck_id).await?;
    let card = deck
        .card(request.card_id)
        .ok_or(StudyError::UnknownCard(request.card_id))?;

    let (is_correct, report) = match (request.typed_answer.as_deref(), request.correct) {
        (Some(typed), _) => {
            if strip_markup(typed).trim().is_empty() {
                return Err(StudyError::EmptyAnswer.into());
            }
            let settings = state.db.get_settings(auth.user_id).await?;
            let report = grade_answer(typed, card, settings.smart_grading);
            (report.verdict.is_correct(), Some(report))
        }
        (None, Some(correct)) => (correct, None),
        (None, None) => {
            return Err(ApiError::BadRequest(
                "either typed_answer or correct is required".to_string(),
            ))
        }
    };

    let mut progress = state.db.load_deck_progress(auth.user_id, deck_id).await?;
    let previous_status = progress.status(card.id);
    let status = progress.record(card.id, is_correct);
    state
        .db
        .save_deck_progress(auth.user_id, deck_id, &progress)
        .await?;

    tracing::info!(
        user_id = %auth.user_id,
        %deck_id,
        card_id = card.id,
        from = previous_status.as_str(),
        to = status.as_str(),
        "graded card"
    );

    Ok(Json(GradeResponse {
        card_id: card.id,
        is_correct,
        previous_status,
        status,
        report,
    }))
}

/// POST /api/decks/{deck_id}/override
/// Re-applies mastery from the pre-answer status with the given verdict.
/// The stored status must be the one the opposite verdict produced.
pub async fn override_verdict(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<Uuid>,
    Json(request): Json<OverrideRequest>,
) -> Result<Json<GradeResponse>> {
    let deck = require_deck(&state, deck_id).await?;
    let card = deck
        .card(request.card_id)
        .ok_or(StudyError::UnknownCard(request.card_id))?;

    let mut progress = state.db.load_deck_progress(auth.user_id, deck_id).await?;
    let status = overridden_status(
        progress.status(card.id),
        request.previous_status,
        request.correct,
    )?;
    progress.set_status(card.id, status);
    state
        .db
        .save_deck_progress(auth.user_id, deck_id, &progress)
        .await?;

    tracing::info!(
        user_id = %auth.user_id,
        %deck_id,
        card_id = card.id,
        to = status.as_str(),
        "overrode verdict"
    );

    Ok(Json(GradeResponse {
        card_id: card.id,
        is_correct: request.correct,
        previous_status: request.previous_status,
        status,
        report: None,
    }))
}

fn overridden_status(
    stored: MasteryStatus,
    previous: MasteryStatus,
    correct: bool,
) -> Result<MasteryStatus> {
    if stored != previous.next(!correct) {
        return Err(ApiError::BadRequest(format!(
            "card is {}, which a {} answer from {} does not produce",
            stored.as_str(),
            if correct { "wrong" } else { "right" },
            previous.as_str(),
        )));
    }
    Ok(previous.next(correct))
}

/// POST /api/decks/{deck_id}/cards/{card_id}/star
pub async fn toggle_star(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path((deck_id, card_id)): Path<(Uuid, i64)>,
) -> Result<Json<StarResponse>> {
    let deck = require_deck(&state, deck_id).await?;
    if deck.card(card_id).is_none() {
        return Err(StudyError::UnknownCard(card_id).into());
    }

    let mut progress = state.db.load_deck_progress(auth.user_id, deck_id).await?;
    let starred = progress.toggle_star(card_id);
    state
        .db
        .save_deck_progress(auth.user_id, deck_id, &progress)
        .await?;

    Ok(Json(StarResponse { card_id, starred }))
}
