//! Field-level parsing shared by the CSV tools: numeric coercion, month keys,
//! comma lists, FAQ splitting and paragraph-to-block conversion.

use crate::domain::model::{Block, FaqItem};
use regex::Regex;
use std::sync::LazyLock;

static FAQ_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?Q:\s*").expect("static FAQ pattern"));

static PARAGRAPH_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("static paragraph pattern"));

/// Lenient numeric coercion: blank, unparseable and non-finite values become `None`.
pub fn to_num(value: Option<&str>) -> Option<f64> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// `"202401"` -> `"2024-01"`. Anything shorter than six characters has no month.
pub fn month_from_yyyymm(raw: &str) -> Option<String> {
    let chars: Vec<char> = raw.chars().take(6).collect();
    if chars.len() < 6 {
        return None;
    }
    let year: String = chars[0..4].iter().collect();
    let month: String = chars[4..6].iter().collect();
    Some(format!("{}-{}", year, month))
}

pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Empty strings are stored as null.
pub fn non_empty(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.is_empty()).map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// Splits `Q: ... A: ...` text into entries in source order.
///
/// Text that does not open with `Q:` carries no FAQs. A question without an
/// `A:` marker keeps an empty answer.
pub fn parse_faqs(text: &str) -> Vec<FaqEntry> {
    let text = text.trim();
    if text.is_empty() || !text.starts_with("Q:") {
        return Vec::new();
    }

    FAQ_SPLIT
        .split(text)
        .filter(|part| !part.trim().is_empty())
        .map(|part| match part.split_once("A:") {
            Some((q, a)) => FaqEntry {
                question: q.trim().to_string(),
                answer: a.trim().to_string(),
            },
            None => FaqEntry {
                question: part.trim().to_string(),
                answer: String::new(),
            },
        })
        .collect()
}

pub fn faq_items(text: &str) -> Vec<FaqItem> {
    parse_faqs(text)
        .into_iter()
        .map(|entry| FaqItem::new(entry.question, entry.answer))
        .collect()
}

/// Number of FAQs the copy sheet claims, counted by `"\nQ: "` markers.
pub fn faq_count(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    text.matches("\nQ: ").count() + 1
}

pub fn split_paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_SPLIT
        .split(text.trim())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Blank-line separated paragraphs as portable-text blocks; `None` for blank input.
pub fn text_to_blocks(text: &str) -> Option<Vec<Block>> {
    let paragraphs = split_paragraphs(text);
    if paragraphs.is_empty() {
        return None;
    }
    Some(paragraphs.into_iter().map(Block::paragraph).collect())
}
