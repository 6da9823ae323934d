//! Per-user deck progress documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{CardProgress, Deck, MasteryStatus};

/// Progress for every card a user has touched in one deck.
///
/// Entries are created lazily by the first grading or star event. Entries for
/// cards that were later removed from the deck are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckProgress {
    cards: BTreeMap<i64, CardProgress>,
}

impl DeckProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress for a card, defaulting to new and unstarred.
    pub fn get(&self, card_id: i64) -> CardProgress {
        self.cards.get(&card_id).copied().unwrap_or_default()
    }

    pub fn status(&self, card_id: i64) -> MasteryStatus {
        self.get(card_id).status
    }

    pub fn is_starred(&self, card_id: i64) -> bool {
        self.get(card_id).starred
    }

    /// Run the mastery machine for a graded answer and store the result.
    pub fn record(&mut self, card_id: i64, is_correct: bool) -> MasteryStatus {
        let entry = self.cards.entry(card_id).or_default();
        entry.status = entry.status.next(is_correct);
        entry.status
    }

    /// Overwrite a card's status, keeping its star.
    pub fn set_status(&mut self, card_id: i64, status: MasteryStatus) {
        self.cards.entry(card_id).or_default().status = status;
    }

    /// Flip the star flag and return the new value.
    pub fn toggle_star(&mut self, card_id: i64) -> bool {
        let entry = self.cards.entry(card_id).or_default();
        entry.starred = !entry.starred;
        entry.starred
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, CardProgress)> + '_ {
        self.cards.iter().map(|(id, p)| (*id, *p))
    }

    /// Mastery counts over the cards currently in `deck`.
    pub fn summary(&self, deck: &Deck) -> MasterySummary {
        let mut summary = MasterySummary {
            total_cards: deck.cards.len(),
            ..Default::default()
        };

        for card in &deck.cards {
            let progress = self.get(card.id);
            match progress.status {
                MasteryStatus::New => summary.new_cards += 1,
                MasteryStatus::Learning => summary.learning_cards += 1,
                MasteryStatus::AlmostDone => summary.almost_done_cards += 1,
                MasteryStatus::Mastered => summary.mastered_cards += 1,
            }
            if progress.starred {
                summary.starred_cards += 1;
            }
        }

        summary
    }
}

impl FromIterator<(i64, CardProgress)> for DeckProgress {
    fn from_iter<I: IntoIterator<Item = (i64, CardProgress)>>(iter: I) -> Self {
        Self {
            cards: iter.into_iter().collect(),
        }
    }
}

/// Mastery counts for one deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterySummary {
    pub total_cards: usize,
    pub new_cards: usize,
    pub learning_cards: usize,
    pub almost_done_cards: usize,
    pub mastered_cards: usize,
    pub starred_cards: usize,
}

impl MasterySummary {
    /// Share of mastered cards, rounded to a whole percent.
    pub fn mastered_percent(&self) -> Option<u32> {
        percent(self.mastered_cards, self.total_cards)
    }
}

/// `round(100 * part / whole)`, or `None` when `whole` is zero.
pub(crate) fn percent(part: usize, whole: usize) -> Option<u32> {
    if whole == 0 {
        return None;
    }
    Some((100.0 * part as f64 / whole as f64).round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Card;
    use pretty_assertions::assert_eq;

    fn deck() -> Deck {
        Deck {
            id: "bio".into(),
            name: "Biology".into(),
            cards: vec![
                Card::new(1, "ATP", "energy currency"),
                Card::new(2, "DNA", "genetic material"),
                Card::new(3, "RNA", "messenger"),
            ],
        }
    }

    #[test]
    fn unknown_cards_default_to_new() {
        let progress = DeckProgress::new();
        assert_eq!(progress.get(42), CardProgress::default());
        assert_eq!(progress.status(42), MasteryStatus::New);
        assert!(progress.is_empty());
    }

    #[test]
    fn record_applies_mastery_machine() {
        let mut progress = DeckProgress::new();
        assert_eq!(progress.record(1, true), MasteryStatus::AlmostDone);
        assert_eq!(progress.record(1, true), MasteryStatus::Mastered);
        assert_eq!(progress.record(1, false), MasteryStatus::AlmostDone);
        assert_eq!(progress.len(), 1);
    }

    #[test]
    fn star_survives_grading() {
        let mut progress = DeckProgress::new();
        assert!(progress.toggle_star(2));
        progress.record(2, false);
        assert_eq!(
            progress.get(2),
            CardProgress {
                status: MasteryStatus::Learning,
                starred: true
            }
        );
        assert!(!progress.toggle_star(2));
    }

    #[test]
    fn serializes_as_object_keyed_by_card_id() {
        let mut progress = DeckProgress::new();
        progress.record(7, true);
        progress.toggle_star(7);

        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json, serde_json::json!({"7": {"status": "almostDone", "starred": true}}));

        let back: DeckProgress = serde_json::from_value(json).unwrap();
        assert_eq!(back, progress);
    }

    #[test]
    fn summary_ignores_orphaned_entries() {
        let mut progress = DeckProgress::new();
        progress.record(1, true);
        progress.record(1, true);
        progress.record(2, false);
        progress.toggle_star(3);
        progress.record(99, true);

        let summary = progress.summary(&deck());
        assert_eq!(
            summary,
            MasterySummary {
                total_cards: 3,
                new_cards: 1,
                learning_cards: 1,
                almost_done_cards: 0,
                mastered_cards: 1,
                starred_cards: 1,
            }
        );
        assert_eq!(summary.mastered_percent(), Some(33));
    }

    #[test]
    fn percent_of_nothing_is_undefined() {
        assert_eq!(percent(0, 0), None);
        assert_eq!(percent(1, 2), Some(50));
        assert_eq!(percent(2, 3), Some(67));
    }
}
