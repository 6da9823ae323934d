//! Test fixtures and factory functions for creating test data.

use serde_json::{json, Value};

/// Deck-file text with `num_cards` term/definition cards.
pub fn sample_deck_file(num_cards: usize, with_ids: bool) -> String {
    (0..num_cards)
        .map(|i| {
            if with_ids {
                format!("ID: {}\nQ: Term {}\nA: Definition {}\n", i + 1, i + 1, i + 1)
            } else {
                format!("Q: Term {}\nA: Definition {}\n", i + 1, i + 1)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Create-deck request body with one card of each kind.
pub fn mixed_deck_request(name: &str) -> Value {
    json!({
        "name": name,
        "cards": [
            {
                "id": 1,
                "term": "Powerhouse of the cell",
                "definition": "The mitochondria",
                "hint": "Organelle",
                "card_type": "term-definition"
            },
            {
                "id": 2,
                "term": "Capital of France?",
                "definition": "Paris",
                "card_type": "multiple-choice",
                "options": ["Lyon", "Marseille"]
            },
            {
                "id": 3,
                "term": "Water boils at ___ degrees Celsius.",
                "definition": "100",
                "card_type": "fill-in-the-blank"
            }
        ]
    })
}

/// Create-deck request body with plain term/definition cards.
pub fn simple_deck_request(name: &str, cards: &[(&str, &str)]) -> Value {
    let cards: Vec<Value> = cards
        .iter()
        .map(|(term, definition)| {
            json!({
                "term": term,
                "definition": definition,
                "card_type": "term-definition"
            })
        })
        .collect();

    json!({ "name": name, "cards": cards })
}

/// Flip-card grading body.
pub fn flip_grade(card_id: i64, correct: bool) -> Value {
    json!({ "card_id": card_id, "correct": correct })
}

/// Typed-recall grading body.
pub fn typed_grade(card_id: i64, typed_answer: &str) -> Value {
    json!({ "card_id": card_id, "typed_answer": typed_answer })
}
