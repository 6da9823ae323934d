//! Parser for plain-text deck files.
//!
//! # Format
//! ```text
//! ID: 1
//! Q: What is the powerhouse of the cell?
//! A: The mitochondria
//! Hint: Organelle
//!
//! Type: multiple-choice
//! Q: Capital of France?
//! A: Paris
//! Option: Lyon
//! Option: Marseille
//!
//! Type: fill-in-the-blank
//! Q: Water boils at ___ degrees Celsius.
//! A: 100
//! ```
//!
//! `Q:` and `A:` may continue over several lines. `ID:` is optional; cards
//! without one get ids assigned by [`assign_ids`].

use std::collections::HashSet;

use crate::error::ParseError;
use crate::types::{Card, CardKind, RawCard};

/// Parse deck-file content into raw cards.
pub fn parse(content: &str) -> Result<Vec<RawCard>, ParseError> {
    if content.trim().is_empty() {
        return Ok(vec![]);
    }

    let mut parser = Parser::new();
    for (idx, line) in content.lines().enumerate() {
        parser.process_line(line, idx + 1)?;
    }
    parser.finish()
}

/// Turn raw cards into deck cards, giving id-less cards the ids after the
/// highest id already in use (including `existing_max`).
pub fn assign_ids(raw: Vec<RawCard>, existing_max: i64) -> Vec<Card> {
    let mut next_id = raw
        .iter()
        .filter_map(|c| c.id)
        .max()
        .unwrap_or(0)
        .max(existing_max)
        + 1;

    raw.into_iter()
        .map(|c| {
            let id = c.id.unwrap_or_else(|| {
                let id = next_id;
                next_id += 1;
                id
            });
            Card {
                id,
                term: c.term,
                definition: c.definition,
                hint: c.hint,
                kind: c.kind,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Question,
    Answer,
    Hint,
}

struct CardBuilder {
    id: Option<i64>,
    kind_tag: Option<String>,
    question: Option<String>,
    answer: Option<String>,
    hint: Option<String>,
    options: Vec<String>,
    start_line: usize,
}

impl CardBuilder {
    fn new(start_line: usize) -> Self {
        Self {
            id: None,
            kind_tag: None,
            question: None,
            answer: None,
            hint: None,
            options: Vec::new(),
            start_line,
        }
    }

    fn has_content(&self) -> bool {
        self.question.is_some() || self.answer.is_some()
    }

    fn build(self) -> Result<RawCard, ParseError> {
        let line = self.start_line;
        let question = self.question.ok_or(ParseError::MissingQuestion { line })?;
        let answer = self.answer.ok_or(ParseError::MissingAnswer { line })?;

        let tag = self.kind_tag.as_deref().unwrap_or("term-definition");
        let kind = CardKind::from_parts(tag, self.options).ok_or_else(|| {
            ParseError::UnknownCardType {
                line,
                value: tag.to_string(),
            }
        })?;
        if let CardKind::MultipleChoice { options } = &kind {
            if options.is_empty() {
                return Err(ParseError::MissingOptions { line });
            }
        }

        Ok(RawCard {
            id: self.id,
            term: question.trim().to_string(),
            definition: answer.trim().to_string(),
            hint: self
                .hint
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty()),
            kind,
            line_number: line,
        })
    }
}

struct Parser {
    current: Option<CardBuilder>,
    current_field: Option<Field>,
    buffer: Vec<String>,
    cards: Vec<RawCard>,
    seen_ids: HashSet<i64>,
}

enum LineType<'a> {
    Id(&'a str),
    Type(&'a str),
    Question(&'a str),
    Answer(&'a str),
    Hint(&'a str),
    Option(&'a str),
    Text(&'a str),
    Empty,
}

impl Parser {
    fn new() -> Self {
        Self {
            current: None,
            current_field: None,
            buffer: Vec::new(),
            cards: Vec::new(),
            seen_ids: HashSet::new(),
        }
    }

    fn parse_line(line: &str) -> LineType<'_> {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix("ID:") {
            LineType::Id(rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("Type:") {
            LineType::Type(rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("Q:") {
            LineType::Question(rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("A:") {
            LineType::Answer(rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("Hint:") {
            LineType::Hint(rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("Option:") {
            LineType::Option(rest.trim())
        } else if trimmed.is_empty() {
            LineType::Empty
        } else {
            LineType::Text(line)
        }
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<(), ParseError> {
        match Self::parse_line(line) {
            LineType::Id(id_str) => {
                let id = id_str.parse::<i64>().map_err(|_| ParseError::InvalidId {
                    line: line_num,
                    value: id_str.to_string(),
                })?;
                self.header(line_num)?.id = Some(id);
            }
            LineType::Type(tag) => {
                self.header(line_num)?.kind_tag = Some(tag.to_string());
            }
            LineType::Question(text) => {
                self.flush_buffer();
                if self.current.as_ref().is_some_and(CardBuilder::has_content) {
                    self.finish_card()?;
                }
                self.current.get_or_insert_with(|| CardBuilder::new(line_num));
                self.start_field(Field::Question, text);
            }
            LineType::Answer(text) => self.start_field(Field::Answer, text),
            LineType::Hint(text) => self.start_field(Field::Hint, text),
            LineType::Option(text) => {
                self.flush_buffer();
                self.current_field = None;
                if let Some(card) = self.current.as_mut() {
                    card.options.push(text.to_string());
                }
            }
            LineType::Text(text) => self.buffer.push(text.to_string()),
            LineType::Empty => self.buffer.push(String::new()),
        }
        Ok(())
    }

    /// `ID:` and `Type:` lines open a new card once the current one has content.
    fn header(&mut self, line_num: usize) -> Result<&mut CardBuilder, ParseError> {
        self.flush_buffer();
        self.current_field = None;
        if self.current.as_ref().is_some_and(CardBuilder::has_content) {
            self.finish_card()?;
        }
        Ok(self.current.get_or_insert_with(|| CardBuilder::new(line_num)))
    }

    fn start_field(&mut self, field: Field, text: &str) {
        self.flush_buffer();
        self.current_field = Some(field);
        self.buffer.push(text.to_string());
    }

    fn flush_buffer(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let content = self.buffer.join("\n");
        self.buffer.clear();

        if let Some(ref mut card) = self.current {
            match self.current_field {
                Some(Field::Question) => card.question = Some(content),
                Some(Field::Answer) => card.answer = Some(content),
                Some(Field::Hint) => card.hint = Some(content),
                None => {}
            }
        }
    }

    fn finish_card(&mut self) -> Result<(), ParseError> {
        let Some(card) = self.current.take() else {
            return Ok(());
        };
        self.current_field = None;

        let raw_card = card.build()?;
        if let Some(id) = raw_card.id {
            if !self.seen_ids.insert(id) {
                return Err(ParseError::DuplicateId {
                    id,
                    line: raw_card.line_number,
                });
            }
        }
        self.cards.push(raw_card);
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<RawCard>, ParseError> {
        self.flush_buffer();
        self.finish_card()?;
        Ok(self.cards)
    }
}
