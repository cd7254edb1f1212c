//! Name processor
//!
//! Owns one normalization pipeline and one compiled rule set. Both are
//! immutable after construction and shared between clones.

use std::sync::Arc;
use std::time::Instant;

use crate::config::VariantConfig;
use crate::error::ConfigurationError;
use crate::variants::expander::{expand, DEFAULT_MAX_VARIANTS};
use crate::variants::matcher::find_matches;
use crate::variants::normalizer::Normalizer;
use crate::variants::rules::CompiledRuleSet;
use crate::variants::types::{ProcessedName, VariantSet};

/// Normalization and variant generation for place names (reusable, precompiled)
#[derive(Debug, Clone)]
pub struct NameProcessor {
    normalizer: Arc<Normalizer>,
    rules: Arc<CompiledRuleSet>,
    max_variants: usize,
}

impl NameProcessor {
    /// Create a processor
    ///
    /// # Arguments
    /// * `normalizer` - pipeline used for names and realized variants
    /// * `rules` - compiled against the same `normalizer`
    pub fn new(normalizer: Normalizer, rules: CompiledRuleSet) -> Self {
        Self {
            normalizer: Arc::new(normalizer),
            rules: Arc::new(rules),
            max_variants: DEFAULT_MAX_VARIANTS,
        }
    }

    /// Override the combination cap (at least 1)
    pub fn with_max_variants(mut self, max_variants: usize) -> Self {
        self.max_variants = max_variants.max(1);
        self
    }

    /// Build the pipeline and compile all rules of a configuration
    pub fn from_config(config: &VariantConfig) -> Result<Self, ConfigurationError> {
        if config.max_variants == 0 {
            return Err(ConfigurationError::InvalidCap {
                value: config.max_variants,
            });
        }

        let normalizer = Normalizer::from_rules(&config.normalization, &config.transliteration)?;
        let lines = config.rule_lines()?;
        let rules = CompiledRuleSet::compile(&lines, &normalizer)?;

        tracing::info!(
            "Name processor ready: {} rules, {} match keys, cap {}",
            rules.rules().len(),
            rules.keys().len(),
            config.max_variants
        );

        Ok(Self::new(normalizer, rules).with_max_variants(config.max_variants))
    }

    /// Canonical stored form of a name
    pub fn get_normalized(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }

    /// Query form of user input; variant rules are not applied
    pub fn get_search_normalized(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }

    /// Variants of an already normalized name
    ///
    /// Without any rule match this is exactly `{normalized}`; an empty name
    /// gives an empty set.
    pub fn get_variants_ascii(&self, normalized: &str) -> VariantSet {
        let sites = find_matches(normalized, &self.rules);
        expand(
            normalized,
            &sites,
            &self.rules,
            &self.normalizer,
            self.max_variants,
        )
    }

    /// Normalize once and expand, for indexing
    pub fn process(&self, text: &str) -> ProcessedName {
        let start = Instant::now();

        let normalized = self.get_normalized(text);
        let variants = self.get_variants_ascii(&normalized);

        ProcessedName {
            normalized,
            variants,
            elapsed_us: start.elapsed().as_micros() as u64,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn rules(&self) -> &CompiledRuleSet {
        &self.rules
    }

    pub fn max_variants(&self) -> usize {
        self.max_variants
    }
}

impl Default for NameProcessor {
    fn default() -> Self {
        Self::new(Normalizer::standard(), CompiledRuleSet::empty())
    }
}
