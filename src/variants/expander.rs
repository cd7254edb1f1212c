//! Variant expander
//!
//! Splices every combination of per-site alternatives back into the literal
//! text between the sites. The number of combinations is known before the
//! first one is built; above the cap only the literal name is returned.

use crate::variants::matcher::frame;
use crate::variants::normalizer::Normalizer;
use crate::variants::rules::{CompiledRuleSet, ANCHOR};
use crate::variants::types::{MatchSite, VariantSet};

/// Default upper bound on realized combinations per name
pub const DEFAULT_MAX_VARIANTS: usize = 128;

/// Expand a normalized name into its variant set
///
/// # Arguments
/// * `name` - normalized name the sites were found in
/// * `sites` - output of [`find_matches`](crate::variants::matcher::find_matches)
/// * `rules` - rule set the sites refer to
/// * `normalizer` - its transliteration steps finish every variant
/// * `max_variants` - combination cap
pub fn expand(
    name: &str,
    sites: &[MatchSite],
    rules: &CompiledRuleSet,
    normalizer: &Normalizer,
    max_variants: usize,
) -> VariantSet {
    if sites.is_empty() {
        return literal(name, normalizer);
    }

    // a site sharing its leading space with the previous one must keep it
    let choices: Vec<Vec<&str>> = sites
        .iter()
        .map(|site| {
            rules.keys()[site.key]
                .replacements
                .iter()
                .map(String::as_str)
                .filter(|r| !site.shares_start || r.starts_with(' '))
                .collect()
        })
        .collect();

    let total = choices
        .iter()
        .try_fold(1usize, |acc, c| acc.checked_mul(c.len()));
    match total {
        Some(count) if count > 0 && count <= max_variants => {}
        Some(0) => {
            tracing::debug!("'{}': a match site has no usable alternative, keeping literal name", name);
            return literal(name, normalizer);
        }
        _ => {
            tracing::debug!(
                "'{}': {} match sites exceed {} combinations, keeping literal name",
                name,
                sites.len(),
                max_variants
            );
            return literal(name, normalizer);
        }
    }

    let framed = frame(name);
    let mut segments = Vec::with_capacity(sites.len());
    let mut last_end = 0;
    for site in sites {
        segments.push(&framed[last_end..site.start]);
        last_end = site.end;
    }
    let tail = &framed[last_end..];

    let mut variants = VariantSet::new();
    let mut buffer = String::with_capacity(framed.len() * 2);

    for combination in Combinations::new(&choices) {
        buffer.clear();
        let mut fuse = false;
        for ((segment, choice), site) in segments.iter().zip(combination).zip(sites) {
            push_piece(&mut buffer, segment, &mut fuse);
            push_piece(&mut buffer, choice, &mut fuse);
            fuse = site.shares_end && !choice.ends_with(' ');
        }
        push_piece(&mut buffer, tail, &mut fuse);

        let unframed: String = buffer.chars().filter(|&c| c != ANCHOR).collect();
        let variant = normalizer.transliterate(&unframed);
        if !variant.is_empty() {
            variants.insert(variant);
        }
    }

    if variants.is_empty() {
        tracing::debug!("'{}': every variant is empty, keeping literal name", name);
        return literal(name, normalizer);
    }

    variants
}

/// Append `piece`; a pending fuse drops its leading shared space
fn push_piece(buffer: &mut String, piece: &str, fuse: &mut bool) {
    if piece.is_empty() {
        return;
    }
    if *fuse {
        buffer.push_str(piece.strip_prefix(' ').unwrap_or(piece));
    } else {
        buffer.push_str(piece);
    }
    *fuse = false;
}

/// The name alone, or nothing if it transliterates to an empty string
fn literal(name: &str, normalizer: &Normalizer) -> VariantSet {
    let mut variants = VariantSet::new();
    let variant = normalizer.transliterate(name);
    if !variant.is_empty() {
        variants.insert(variant);
    }
    variants
}

/// Odometer over one choice per site, last site turning fastest
struct Combinations<'a, 's> {
    choices: &'a [Vec<&'s str>],
    indices: Vec<usize>,
    done: bool,
}

impl<'a, 's> Combinations<'a, 's> {
    fn new(choices: &'a [Vec<&'s str>]) -> Self {
        Self {
            choices,
            indices: vec![0; choices.len()],
            done: choices.iter().any(|c| c.is_empty()),
        }
    }
}

impl<'a, 's> Iterator for Combinations<'a, 's> {
    type Item = Vec<&'s str>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let current = self
            .indices
            .iter()
            .zip(self.choices)
            .map(|(&idx, options)| options[idx])
            .collect();

        let mut pos = self.indices.len();
        loop {
            if pos == 0 {
                self.done = true;
                break;
            }
            pos -= 1;
            self.indices[pos] += 1;
            if self.indices[pos] < self.choices[pos].len() {
                break;
            }
            self.indices[pos] = 0;
        }

        Some(current)
    }
}
