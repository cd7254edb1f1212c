//! Unicode normalization pipeline
//!
//! Two ordered step lists, both supplied as configuration data:
//! - normalization: decompose, strip marks, lowercase, collapse separators, recompose
//! - transliteration: map everything outside the Latin script to Latin
//!
//! The output of [`Normalizer::normalize`] is lowercase with single spaces
//! between tokens and no leading or trailing space.

use pinyin::ToPinyin;
use unicode_general_category::{get_general_category, GeneralCategory};
use unicode_normalization::UnicodeNormalization;

use crate::error::ConfigurationError;

/// Normalization steps of the standard pipeline
pub const STANDARD_NORMALIZATION: &[&str] = &[
    ":: NFD ()",
    "[[:Nonspacing Mark:] [:Cf:]] >",
    ":: lower ()",
    "[[:Punctuation:][:Space:]]+ > ' '",
    ":: NFC ()",
];

/// Transliteration steps of the standard pipeline
pub const STANDARD_TRANSLITERATION: &[&str] = &[":: Latin ()"];

/// Character class usable in `[...] >` steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    NonspacingMark,
    Format,
    Punctuation,
    Space,
    Symbol,
    Control,
}

impl CharClass {
    fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "nonspacingmark" | "mn" => Some(Self::NonspacingMark),
            "format" | "cf" => Some(Self::Format),
            "punctuation" | "p" => Some(Self::Punctuation),
            "space" | "whitespace" | "z" => Some(Self::Space),
            "symbol" | "s" => Some(Self::Symbol),
            "control" | "cc" => Some(Self::Control),
            _ => None,
        }
    }

    /// Whether `ch` belongs to this class
    pub fn contains(self, ch: char) -> bool {
        let category = get_general_category(ch);
        match self {
            Self::NonspacingMark => matches!(category, GeneralCategory::NonspacingMark),
            Self::Format => matches!(category, GeneralCategory::Format),
            Self::Punctuation => matches!(
                category,
                GeneralCategory::ConnectorPunctuation
                    | GeneralCategory::DashPunctuation
                    | GeneralCategory::OpenPunctuation
                    | GeneralCategory::ClosePunctuation
                    | GeneralCategory::InitialPunctuation
                    | GeneralCategory::FinalPunctuation
                    | GeneralCategory::OtherPunctuation
            ),
            Self::Space => {
                ch.is_whitespace()
                    || matches!(
                        category,
                        GeneralCategory::SpaceSeparator
                            | GeneralCategory::LineSeparator
                            | GeneralCategory::ParagraphSeparator
                    )
            }
            Self::Symbol => matches!(
                category,
                GeneralCategory::MathSymbol
                    | GeneralCategory::CurrencySymbol
                    | GeneralCategory::ModifierSymbol
                    | GeneralCategory::OtherSymbol
            ),
            Self::Control => matches!(category, GeneralCategory::Control),
        }
    }
}

/// A single text transform step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    Nfd,
    Nfc,
    Nfkd,
    Nfkc,
    Lower,
    /// Non-Latin script to Latin; unmapped characters are dropped
    Latin,
    /// Everything non-ASCII to ASCII; unmapped characters are dropped
    LatinAscii,
    /// `'from' > 'to'`
    Replace { from: String, to: String },
    /// `[classes] >`
    Remove(Vec<CharClass>),
    /// `[classes] > 'to'`
    Substitute { classes: Vec<CharClass>, to: String },
    /// `[classes]+ > 'to'`
    Collapse { classes: Vec<CharClass>, to: String },
}

impl Transform {
    /// Parse one step
    ///
    /// Accepted forms:
    /// - `:: NFD ()`, `:: NFC ()`, `:: NFKD ()`, `:: NFKC ()`, `:: lower ()`,
    ///   `:: Latin ()`, `:: Latin-ASCII ()`
    /// - `'x' > 'y'` and `'x' >`
    /// - `[[:Class:] ...] >` and `[[:Class:] ...]+ > 'y'`
    pub fn parse(step: &str) -> Result<Self, ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidTransform {
            step: step.to_string(),
            reason,
        };

        let rule = step.trim().trim_end_matches(';').trim();

        if let Some(id) = rule.strip_prefix("::") {
            let id = id.trim();
            let id = id.strip_suffix("()").unwrap_or(id).trim();
            return match id.to_ascii_lowercase().as_str() {
                "nfd" => Ok(Self::Nfd),
                "nfc" => Ok(Self::Nfc),
                "nfkd" => Ok(Self::Nfkd),
                "nfkc" => Ok(Self::Nfkc),
                "lower" | "lowercase" => Ok(Self::Lower),
                "latin" | "any-latin" => Ok(Self::Latin),
                "latin-ascii" | "ascii" => Ok(Self::LatinAscii),
                _ => Err(invalid(format!("unknown transform '{}'", id))),
            };
        }

        if rule.starts_with('\'') {
            let (from, rest) =
                split_quoted(rule).ok_or_else(|| invalid("unterminated literal".to_string()))?;
            if from.is_empty() {
                return Err(invalid("empty source literal".to_string()));
            }
            let target = rest
                .trim_start()
                .strip_prefix('>')
                .ok_or_else(|| invalid("expected '>'".to_string()))?;
            let to = parse_target(target).map_err(|e| invalid(e.to_string()))?;
            return Ok(Self::Replace {
                from: from.to_string(),
                to,
            });
        }

        if rule.starts_with('[') {
            let (set, rest) =
                split_bracketed(rule).ok_or_else(|| invalid("unbalanced '['".to_string()))?;
            let classes = parse_classes(set).map_err(invalid)?;
            let rest = rest.trim_start();
            let (repeated, rest) = match rest.strip_prefix('+') {
                Some(r) => (true, r.trim_start()),
                None => (false, rest),
            };
            let target = rest
                .strip_prefix('>')
                .ok_or_else(|| invalid("expected '>'".to_string()))?;
            let to = parse_target(target).map_err(|e| invalid(e.to_string()))?;

            return Ok(if repeated {
                Self::Collapse { classes, to }
            } else if to.is_empty() {
                Self::Remove(classes)
            } else {
                Self::Substitute { classes, to }
            });
        }

        Err(invalid("unrecognized step".to_string()))
    }

    /// Apply the step
    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Nfd => text.nfd().collect(),
            Self::Nfc => text.nfc().collect(),
            Self::Nfkd => text.nfkd().collect(),
            Self::Nfkc => text.nfkc().collect(),
            Self::Lower => text.to_lowercase(),
            Self::Latin => to_latin(text),
            Self::LatinAscii => to_ascii(text),
            Self::Replace { from, to } => text.replace(from.as_str(), to),
            Self::Remove(classes) => text
                .chars()
                .filter(|&ch| !classes.iter().any(|c| c.contains(ch)))
                .collect(),
            Self::Substitute { classes, to } => replace_each(text, classes, to),
            Self::Collapse { classes, to } => collapse_runs(text, classes, to),
        }
    }
}

/// An ordered list of transform steps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transliterator {
    steps: Vec<Transform>,
}

impl Transliterator {
    pub fn new(steps: Vec<Transform>) -> Self {
        Self { steps }
    }

    /// Parse every step, failing on the first invalid one
    pub fn from_rules<S: AsRef<str>>(rules: &[S]) -> Result<Self, ConfigurationError> {
        let steps = rules
            .iter()
            .map(|r| Transform::parse(r.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[Transform] {
        &self.steps
    }

    /// Run all steps in order
    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_string();
        for step in &self.steps {
            current = step.apply(&current);
        }
        current
    }
}

/// Normalization followed by transliteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    normalization: Transliterator,
    transliteration: Transliterator,
}

impl Normalizer {
    pub fn new(normalization: Transliterator, transliteration: Transliterator) -> Self {
        Self {
            normalization,
            transliteration,
        }
    }

    /// Build from textual step lists
    pub fn from_rules<S: AsRef<str>>(
        normalization: &[S],
        transliteration: &[S],
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            normalization: Transliterator::from_rules(normalization)?,
            transliteration: Transliterator::from_rules(transliteration)?,
        })
    }

    /// NFD, strip marks and format chars, lowercase, collapse separators, NFC, Latin
    pub fn standard() -> Self {
        let separators = vec![CharClass::Punctuation, CharClass::Space];
        Self {
            normalization: Transliterator::new(vec![
                Transform::Nfd,
                Transform::Remove(vec![CharClass::NonspacingMark, CharClass::Format]),
                Transform::Lower,
                Transform::Collapse {
                    classes: separators,
                    to: " ".to_string(),
                },
                Transform::Nfc,
            ]),
            transliteration: Transliterator::new(vec![Transform::Latin]),
        }
    }

    /// Full pipeline: the canonical stored and searched form of a name
    pub fn normalize(&self, text: &str) -> String {
        let normalized = self.normalization.apply(text);
        squash_whitespace(&self.transliteration.apply(&normalized))
    }

    /// Normalization steps only (rule literals are written against this form)
    pub fn normalize_literal(&self, text: &str) -> String {
        squash_whitespace(&self.normalization.apply(text))
    }

    /// Transliteration steps only (applied to every realized variant)
    pub fn transliterate(&self, text: &str) -> String {
        squash_whitespace(&self.transliteration.apply(text))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::standard()
    }
}

/// Collapse whitespace runs to one space and trim
pub(crate) fn squash_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }
    result
}

/// `'literal'rest` -> (literal, rest)
fn split_quoted(text: &str) -> Option<(&str, &str)> {
    let body = text.strip_prefix('\'')?;
    let end = body.find('\'')?;
    Some((&body[..end], &body[end + 1..]))
}

/// `[...]rest` -> (`[...]`, rest), honouring nested brackets
fn split_bracketed(text: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (idx, ch) in text.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some((&text[..=idx], &text[idx + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_classes(set: &str) -> Result<Vec<CharClass>, String> {
    let mut classes = Vec::new();
    let mut rest = set;

    while let Some(start) = rest.find("[:") {
        let after = &rest[start + 2..];
        let end = after
            .find(":]")
            .ok_or_else(|| "unterminated character class".to_string())?;
        let name = &after[..end];
        let class = CharClass::from_name(name)
            .ok_or_else(|| format!("unknown character class '{}'", name))?;
        if !classes.contains(&class) {
            classes.push(class);
        }
        rest = &after[end + 2..];
    }

    if classes.is_empty() {
        return Err("no character class in set".to_string());
    }
    Ok(classes)
}

fn parse_target(target: &str) -> Result<String, &'static str> {
    let target = target.trim();
    if target.is_empty() {
        return Ok(String::new());
    }
    match split_quoted(target) {
        Some((literal, rest)) if rest.trim().is_empty() => Ok(literal.to_string()),
        _ => Err("replacement must be a quoted literal"),
    }
}

fn collapse_runs(text: &str, classes: &[CharClass], to: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_run = false;

    for ch in text.chars() {
        if classes.iter().any(|c| c.contains(ch)) {
            if !in_run {
                result.push_str(to);
                in_run = true;
            }
        } else {
            result.push(ch);
            in_run = false;
        }
    }

    result
}

fn replace_each(text: &str, classes: &[CharClass], to: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        if classes.iter().any(|c| c.contains(ch)) {
            result.push_str(to);
        } else {
            result.push(ch);
        }
    }
    result
}

/// Latin script letters plus printable ASCII
fn is_latin(ch: char) -> bool {
    ch == ' '
        || ch.is_ascii_graphic()
        || matches!(ch,
            '\u{00C0}'..='\u{024F}'
            | '\u{0250}'..='\u{02AF}'
            | '\u{1E00}'..='\u{1EFF}'
            | '\u{2C60}'..='\u{2C7F}'
            | '\u{A720}'..='\u{A7FF}'
            | '\u{AB30}'..='\u{AB6F}')
}

/// Append transliterated text, keeping only lowercase ASCII letters and digits
fn push_transliterated(out: &mut String, latin: &str) {
    for ch in latin.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if let Some(folded) = deunicode::deunicode_char(ch).filter(|_| !ch.is_ascii()) {
            // pinyin syllables may still carry a diaeresis
            out.extend(
                folded
                    .chars()
                    .filter(char::is_ascii_alphanumeric)
                    .map(|c| c.to_ascii_lowercase()),
            );
        } else {
            out.push(' ');
        }
    }
}

fn to_latin(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for ch in text.chars() {
        if is_latin(ch) {
            result.push(ch);
        } else if ch.is_whitespace() {
            result.push(' ');
        } else if let Some(pinyin) = ch.to_pinyin() {
            // one syllable per Han character
            result.push(' ');
            push_transliterated(&mut result, pinyin.plain());
            result.push(' ');
        } else if let Some(latin) = deunicode::deunicode_char(ch) {
            push_transliterated(&mut result, latin);
        }
    }

    result
}

fn to_ascii(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii() {
            result.push(ch);
        } else if let Some(ascii) = deunicode::deunicode_char(ch) {
            result.push_str(ascii);
        }
    }
    result
}
