//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from studydeck-core
pub use studydeck_core::{
    Card, CardKind, Deck, DeckProgress, GradeReport, MasteryStatus, MasterySummary, Verdict,
};

// === Database Entity Types ===

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub token: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Deck row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDeck {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbDeck {
    /// Combine with its cards into the core deck type
    pub fn into_core_deck(self, cards: Vec<DbCard>) -> Deck {
        Deck {
            id: self.id.to_string(),
            name: self.name,
            cards: cards.into_iter().map(DbCard::into_core_card).collect(),
        }
    }
}

/// Card row, id scoped to its deck
#[derive(Debug, Clone, FromRow)]
pub struct DbCard {
    pub deck_id: Uuid,
    pub id: i64,
    pub position: i32,
    pub term: String,
    pub definition: String,
    pub hint: Option<String>,
    pub card_type: String,
    pub options: Json<Vec<String>>,
}

impl DbCard {
    /// Create from a core card at a position in its deck
    pub fn from_core_card(deck_id: Uuid, position: i32, card: &Card) -> Self {
        Self {
            deck_id,
            id: card.id,
            position,
            term: card.term.clone(),
            definition: card.definition.clone(),
            hint: card.hint.clone(),
            card_type: card.kind.as_str().to_string(),
            options: Json(card.kind.options().to_vec()),
        }
    }

    /// Convert to core card type
    pub fn into_core_card(self) -> Card {
        let kind = CardKind::from_parts(&self.card_type, self.options.0).unwrap_or_default();
        Card {
            id: self.id,
            term: self.term,
            definition: self.definition,
            hint: self.hint,
            kind,
        }
    }
}

/// Per-user study settings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUserSettings {
    pub user_id: Uuid,
    pub smart_grading: bool,
    pub updated_at: DateTime<Utc>,
}

impl DbUserSettings {
    pub fn default_for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            smart_grading: true,
            updated_at: Utc::now(),
        }
    }
}

/// Deck info with counts
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeckInfo {
    pub id: Uuid,
    pub name: String,
    pub card_count: i64,
    pub created_at: DateTime<Utc>,
}

// === API Request/Response Types ===

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct RegisterUserRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterUserResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub last_seen_at: DateTime<Utc>,
}

// Settings types
#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub smart_grading: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    pub smart_grading: Option<bool>,
}

// Deck types
#[derive(Debug, Serialize, Deserialize)]
pub struct DeckListResponse {
    pub decks: Vec<DeckInfo>,
}

/// Card in a create-deck request; the id is assigned when missing
#[derive(Debug, Serialize, Deserialize)]
pub struct NewCard {
    #[serde(default)]
    pub id: Option<i64>,
    pub term: String,
    pub definition: String,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(flatten)]
    pub kind: CardKind,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateDeckRequest {
    pub name: String,
    pub cards: Vec<NewCard>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportDeckRequest {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeckStatsResponse {
    #[serde(flatten)]
    pub summary: MasterySummary,
    pub mastered_percent: Option<u32>,
}

// Study types
/// Flip-card grading sends `correct`; typed recall sends `typed_answer`
#[derive(Debug, Serialize, Deserialize)]
pub struct GradeRequest {
    pub card_id: i64,
    #[serde(default)]
    pub typed_answer: Option<String>,
    #[serde(default)]
    pub correct: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GradeResponse {
    pub card_id: i64,
    pub is_correct: bool,
    pub previous_status: MasteryStatus,
    pub status: MasteryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<GradeReport>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OverrideRequest {
    pub card_id: i64,
    pub previous_status: MasteryStatus,
    pub correct: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StarResponse {
    pub card_id: i64,
    pub starred: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_card_row_round_trip() {
        let deck_id = Uuid::new_v4();
        let card = Card::new(3, "2 + 2", "4").with_kind(CardKind::MultipleChoice {
            options: vec!["3".into(), "5".into()],
        });

        let row = DbCard::from_core_card(deck_id, 0, &card);
        assert_eq!(row.card_type, "multiple-choice");
        assert_eq!(row.into_core_card(), card);
    }

    #[test]
    fn test_unknown_card_type_falls_back() {
        let row = DbCard {
            deck_id: Uuid::new_v4(),
            id: 1,
            position: 0,
            term: "t".into(),
            definition: "d".into(),
            hint: None,
            card_type: "essay".into(),
            options: Json(vec![]),
        };
        assert_eq!(row.into_core_card().kind, CardKind::TermDefinition);
    }

    #[test]
    fn test_grade_request_accepts_either_mode() {
        let flip: GradeRequest = serde_json::from_str(r#"{"card_id":1,"correct":true}"#).unwrap();
        assert_eq!(flip.correct, Some(true));
        assert!(flip.typed_answer.is_none());

        let typed: GradeRequest =
            serde_json::from_str(r#"{"card_id":1,"typed_answer":"Paris"}"#).unwrap();
        assert_eq!(typed.typed_answer.as_deref(), Some("Paris"));
    }

    #[test]
    fn test_new_card_defaults_to_term_definition() {
        let card: NewCard = serde_json::from_str(
            r#"{"term":"t","definition":"d","card_type":"term-definition"}"#,
        )
        .unwrap();
        assert_eq!(card.kind, CardKind::TermDefinition);
        assert_eq!(card.id, None);
    }
}
