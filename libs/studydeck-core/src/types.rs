//! Core types for the study engine.

use serde::{Deserialize, Serialize};

/// How well a learner knows a single card.
///
/// Variants are declared in tier order, so the derived `Ord` ranks
/// `New < Learning < AlmostDone < Mastered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MasteryStatus {
    New,
    Learning,
    AlmostDone,
    Mastered,
}

impl Default for MasteryStatus {
    fn default() -> Self {
        Self::New
    }
}

impl MasteryStatus {
    /// All statuses in tier order.
    pub const ALL: [MasteryStatus; 4] = [
        Self::New,
        Self::Learning,
        Self::AlmostDone,
        Self::Mastered,
    ];

    /// Tier from 0 (new) to 3 (mastered).
    pub fn tier(self) -> u8 {
        match self {
            Self::New => 0,
            Self::Learning => 1,
            Self::AlmostDone => 2,
            Self::Mastered => 3,
        }
    }

    /// Get the status name as stored in progress documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::AlmostDone => "almostDone",
            Self::Mastered => "mastered",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "learning" => Some(Self::Learning),
            "almostDone" => Some(Self::AlmostDone),
            "mastered" => Some(Self::Mastered),
            _ => None,
        }
    }
}

/// Per-card progress owned by one (user, deck) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardProgress {
    #[serde(default)]
    pub status: MasteryStatus,
    #[serde(default)]
    pub starred: bool,
}

/// The closed set of card kinds a deck can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "card_type", rename_all = "kebab-case")]
pub enum CardKind {
    TermDefinition,
    MultipleChoice { options: Vec<String> },
    FillInTheBlank,
}

impl Default for CardKind {
    fn default() -> Self {
        Self::TermDefinition
    }
}

impl CardKind {
    /// Tag used in deck files and database rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TermDefinition => "term-definition",
            Self::MultipleChoice { .. } => "multiple-choice",
            Self::FillInTheBlank => "fill-in-the-blank",
        }
    }

    /// Rebuild a kind from its tag and the stored distractor list.
    pub fn from_parts(tag: &str, options: Vec<String>) -> Option<Self> {
        match tag {
            "term-definition" => Some(Self::TermDefinition),
            "multiple-choice" => Some(Self::MultipleChoice { options }),
            "fill-in-the-blank" => Some(Self::FillInTheBlank),
            _ => None,
        }
    }

    /// Distractor options, empty for kinds without them.
    pub fn options(&self) -> &[String] {
        match self {
            Self::MultipleChoice { options } => options,
            Self::TermDefinition | Self::FillInTheBlank => &[],
        }
    }
}

/// Raw card parsed from a deck file (may not have an ID yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCard {
    pub id: Option<i64>,
    pub term: String,
    pub definition: String,
    pub hint: Option<String>,
    pub kind: CardKind,
    pub line_number: usize,
}

/// A published card. The id is scoped to its deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub term: String,
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(flatten)]
    pub kind: CardKind,
}

impl Card {
    /// Create a term/definition card.
    pub fn new(id: i64, term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            id,
            term: term.into(),
            definition: definition.into(),
            hint: None,
            kind: CardKind::TermDefinition,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_kind(mut self, kind: CardKind) -> Self {
        self.kind = kind;
        self
    }

    /// Answer choices for a multiple-choice card: the definition plus distractors.
    /// Empty for other kinds.
    pub fn choices(&self) -> Vec<&str> {
        match &self.kind {
            CardKind::MultipleChoice { options } => std::iter::once(self.definition.as_str())
                .chain(
                    options
                        .iter()
                        .map(String::as_str)
                        .filter(|o| *o != self.definition),
                )
                .collect(),
            CardKind::TermDefinition | CardKind::FillInTheBlank => Vec::new(),
        }
    }
}

/// An ordered collection of cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub name: String,
    pub cards: Vec<Card>,
}

impl Deck {
    pub fn card(&self, card_id: i64) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    /// Next free card id in this deck.
    pub fn next_card_id(&self) -> i64 {
        self.cards.iter().map(|c| c.id).max().unwrap_or(0) + 1
    }
}

/// Which player drives the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyMode {
    FlipCard,
    TypedRecall,
}

impl Default for StudyMode {
    fn default() -> Self {
        Self::FlipCard
    }
}
