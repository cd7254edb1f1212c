//! Place-name normalization and variant generation
//!
//! Turns raw place names into a canonical normalized form plus the set of
//! alternative spellings (abbreviations, compound splits) to index.
//!
//! ## Processing flow
//! 1. Unicode normalization + transliteration to Latin
//! 2. Rule compilation into boundary-aware match keys (once, at startup)
//! 3. Longest-match scan over the framed name
//! 4. Bounded expansion of per-site alternatives, deduplicated
//!
//! Queries only go through step 1.

mod expander;
mod matcher;
mod normalizer;
mod processor;
mod rules;
mod types;

pub use expander::{expand, DEFAULT_MAX_VARIANTS};
pub use matcher::find_matches;
pub use normalizer::{
    CharClass, Normalizer, Transform, Transliterator, STANDARD_NORMALIZATION,
    STANDARD_TRANSLITERATION,
};
pub use processor::NameProcessor;
pub use rules::{CompiledRuleSet, Compound, Direction, Pattern, RuleKey, VariantRule};
pub use types::{MatchSite, ProcessedName, VariantSet};
