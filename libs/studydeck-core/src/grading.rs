//! Answer grading for typed-recall study sessions.

use crate::types::{Card, CardKind};
use serde::{Deserialize, Serialize};

/// Similarity at or above which a non-exact answer counts as a typo.
pub const TYPO_THRESHOLD: f64 = 0.85;

/// Tags that separate words when markup is stripped.
const BLOCK_TAGS: &[&str] = &["br", "p", "div", "li", "ul", "ol", "tr", "td", "h1", "h2", "h3"];

/// Outcome of grading a typed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Typo,
    Incorrect,
}

impl Verdict {
    /// Whether the verdict counts as a correct answer for the mastery machine.
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct | Self::Typo)
    }
}

/// Map a similarity score to a verdict.
pub fn classify_score(score: f64) -> Verdict {
    if score >= 1.0 {
        Verdict::Correct
    } else if score >= TYPO_THRESHOLD {
        Verdict::Typo
    } else {
        Verdict::Incorrect
    }
}

/// Classify a typed answer against the correct answer.
///
/// Without smart grading only a trimmed, case-insensitive exact match is
/// accepted. With smart grading, near misses are reported as typos.
pub fn classify(user_answer: &str, correct_answer: &str, smart_grading: bool) -> Verdict {
    let typed = strip_markup(user_answer);
    let correct = strip_markup(correct_answer);

    if smart_grading {
        classify_score(normalized_similarity(
            &normalize_whitespace(&typed.to_lowercase()),
            &normalize_whitespace(&correct.to_lowercase()),
        ))
    } else if typed.trim().to_lowercase() == correct.trim().to_lowercase() {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

/// Full grading result shown after a typed answer is submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    pub verdict: Verdict,
    /// Similarity score between 0.0 and 1.0.
    pub similarity: f64,
    /// Whether typo tolerance was applied.
    pub smart_grading: bool,
    /// Plain-text typed answer (for display).
    pub typed_plain: String,
    /// Plain-text correct answer (for display).
    pub correct_plain: String,
    pub diff: Vec<DiffSegment>,
}

/// Grade a typed answer for a card.
///
/// Multiple-choice answers are picked, not typed, so they never get typo
/// tolerance.
pub fn grade(user_answer: &str, card: &Card, smart_grading: bool) -> GradeReport {
    let smart = match card.kind {
        CardKind::MultipleChoice { .. } => false,
        CardKind::TermDefinition | CardKind::FillInTheBlank => smart_grading,
    };

    let typed_plain = normalize_whitespace(&strip_markup(user_answer));
    let correct_plain = normalize_whitespace(&strip_markup(&card.definition));
    let similarity =
        normalized_similarity(&typed_plain.to_lowercase(), &correct_plain.to_lowercase());
    let verdict = classify(user_answer, &card.definition, smart);
    let diff = word_diff(&typed_plain, &correct_plain);

    GradeReport {
        verdict,
        similarity,
        smart_grading: smart,
        typed_plain,
        correct_plain,
        diff,
    }
}

/// Reduce rich text to plain text: tags removed, block tags become spaces,
/// common entities decoded.
///
/// A `<` that does not open a tag (`a < b`, `x <= 5`) is kept as text.
pub fn strip_markup(input: &str) -> String {
    if !input
        .match_indices('<')
        .any(|(i, _)| opens_tag(&input[i + 1..]))
    {
        return decode_entities(input);
    }

    let escaped = escape_stray_lt(input);
    let dom = match tl::parse(&escaped, tl::ParserOptions::default()) {
        Ok(dom) => dom,
        Err(_) => return decode_entities(input),
    };

    let parser = dom.parser();
    let mut out = String::new();
    for handle in dom.children() {
        collect_text(*handle, parser, &mut out);
    }

    decode_entities(&out)
}

fn opens_tag(rest: &str) -> bool {
    matches!(rest.chars().next(), Some(c) if c.is_ascii_alphabetic() || c == '/' || c == '!')
}

fn escape_stray_lt(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (i, c) in input.char_indices() {
        if c == '<' && !opens_tag(&input[i + 1..]) {
            out.push_str("&lt;");
        } else {
            out.push(c);
        }
    }
    out
}

fn collect_text(handle: tl::NodeHandle, parser: &tl::Parser<'_>, out: &mut String) {
    let Some(node) = handle.get(parser) else {
        return;
    };

    match node {
        tl::Node::Tag(tag) => {
            let name = tag.name().as_utf8_str().to_ascii_lowercase();
            let is_block = BLOCK_TAGS.contains(&name.as_str());
            if is_block {
                out.push(' ');
            }
            for child in tag.children().top().iter() {
                collect_text(*child, parser, out);
            }
            if is_block {
                out.push(' ');
            }
        }
        tl::Node::Raw(text) => out.push_str(&text.as_utf8_str()),
        tl::Node::Comment(_) => {}
    }
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    // &amp; last so "&amp;lt;" stays "&lt;"
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Normalize whitespace in a string (trim and collapse multiple spaces).
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Calculate Levenshtein distance between two strings, in characters.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rows instead of the full matrix
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;

        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);

            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Normalized similarity (0.0 to 1.0) based on Levenshtein distance.
///
/// Computed as `(longest - distance) / longest` so identical strings score
/// exactly 1.0 and ratios like 17/20 land exactly on their decimal value.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(a, b);
    (max_len - distance) as f64 / max_len as f64
}

/// Kind of a segment in a word diff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiffType {
    /// Text is the same in both strings.
    Same,
    /// Text is in the correct answer but was not typed.
    Missing,
    /// Text was typed but is not in the correct answer.
    Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffSegment {
    pub text: String,
    pub diff_type: DiffType,
}

impl DiffSegment {
    fn new(text: &str, diff_type: DiffType) -> Self {
        Self {
            text: text.to_string(),
            diff_type,
        }
    }
}

/// Word-level diff between typed and correct answers, with a short lookahead
/// to resync after skipped or inserted words.
pub fn word_diff(typed: &str, correct: &str) -> Vec<DiffSegment> {
    const LOOKAHEAD: usize = 3;

    let typed_words: Vec<&str> = typed.split_whitespace().collect();
    let correct_words: Vec<&str> = correct.split_whitespace().collect();
    let same = |a: &str, b: &str| a.to_lowercase() == b.to_lowercase();

    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < typed_words.len() && j < correct_words.len() {
        if same(typed_words[i], correct_words[j]) {
            result.push(DiffSegment::new(typed_words[i], DiffType::Same));
            i += 1;
            j += 1;
            continue;
        }

        // Typed word shows up a little later in the correct answer
        let skipped = (j + 1..correct_words.len().min(j + LOOKAHEAD))
            .find(|&k| same(typed_words[i], correct_words[k]));
        if let Some(k) = skipped {
            result.extend(correct_words[j..k].iter().map(|w| DiffSegment::new(w, DiffType::Missing)));
            j = k;
            continue;
        }

        // Correct word shows up a little later in the typed answer
        let inserted = (i + 1..typed_words.len().min(i + LOOKAHEAD))
            .find(|&k| same(correct_words[j], typed_words[k]));
        if let Some(k) = inserted {
            result.extend(typed_words[i..k].iter().map(|w| DiffSegment::new(w, DiffType::Extra)));
            i = k;
            continue;
        }

        result.push(DiffSegment::new(typed_words[i], DiffType::Extra));
        result.push(DiffSegment::new(correct_words[j], DiffType::Missing));
        i += 1;
        j += 1;
    }

    result.extend(typed_words[i..].iter().map(|w| DiffSegment::new(w, DiffType::Extra)));
    result.extend(correct_words[j..].iter().map(|w| DiffSegment::new(w, DiffType::Missing)));
    result
}
