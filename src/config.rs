// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigurationError;
use crate::variants::{DEFAULT_MAX_VARIANTS, STANDARD_NORMALIZATION, STANDARD_TRANSLITERATION};

// ============================================================================
// Rule groups
// ============================================================================

/// Whether a structured group keeps the original suffix as a variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleMode {
    /// Compiles to `->`
    #[default]
    TwoWay,
    /// Compiles to `=>`
    OneWay,
}

impl RuleMode {
    fn separator(self) -> &'static str {
        match self {
            RuleMode::TwoWay => "->",
            RuleMode::OneWay => "=>",
        }
    }
}

/// Compound suffixes sharing one list of abbreviations
///
/// `{ "suffixes": ["strasse", "straße"], "abbreviations": ["str"] }` is the
/// same as the rule line `~strasse,~straße -> str`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundSuffixGroup {
    pub suffixes: Vec<String>,
    pub abbreviations: Vec<String>,
    #[serde(default)]
    pub mode: RuleMode,
}

impl CompoundSuffixGroup {
    /// Render the group in the rule-line grammar
    pub fn to_rule_line(&self) -> Result<String, ConfigurationError> {
        let suffixes: Vec<&str> = self
            .suffixes
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if suffixes.is_empty() {
            return Err(ConfigurationError::InvalidGroup {
                reason: "no suffixes".to_string(),
            });
        }
        if self.abbreviations.iter().all(|a| a.trim().is_empty()) {
            return Err(ConfigurationError::InvalidGroup {
                reason: format!("no abbreviations for '{}'", suffixes.join(",")),
            });
        }

        let lhs: Vec<String> = suffixes
            .iter()
            .map(|s| format!("~{}", s.trim_start_matches('~')))
            .collect();
        let rhs: Vec<&str> = self.abbreviations.iter().map(|a| a.trim()).collect();

        Ok(format!(
            "{} {} {}",
            lhs.join(","),
            self.mode.separator(),
            rhs.join(",")
        ))
    }
}

// ============================================================================
// Variant sections
// ============================================================================

/// One block of variant rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSection {
    /// Rule lines (`LHS -> RHS` / `LHS => RHS`)
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compound_suffixes: Vec<CompoundSuffixGroup>,
}

// ============================================================================
// Engine configuration
// ============================================================================

/// Normalization pipeline and variant rules of one processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantConfig {
    #[serde(default = "default_normalization")]
    pub normalization: Vec<String>,
    #[serde(default = "default_transliteration")]
    pub transliteration: Vec<String>,
    #[serde(default)]
    pub variants: Vec<VariantSection>,
    /// Combination cap per name
    #[serde(default = "default_max_variants")]
    pub max_variants: usize,
}

fn default_normalization() -> Vec<String> {
    STANDARD_NORMALIZATION.iter().map(|s| s.to_string()).collect()
}

fn default_transliteration() -> Vec<String> {
    STANDARD_TRANSLITERATION.iter().map(|s| s.to_string()).collect()
}

fn default_max_variants() -> usize {
    DEFAULT_MAX_VARIANTS
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl VariantConfig {
    /// Standard pipeline, no rules
    pub fn new() -> Self {
        Self {
            normalization: default_normalization(),
            transliteration: default_transliteration(),
            variants: Vec::new(),
            max_variants: DEFAULT_MAX_VARIANTS,
        }
    }

    /// `<config dir>/name-variants/variants.json`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("cannot determine config directory"))?;
        Ok(config_dir.join("name-variants").join("variants.json"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: VariantConfig =
            serde_json::from_str(content).context("invalid variant configuration")?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        tracing::info!("Loading variant configuration from {:?}", path);

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::from_json(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        tracing::info!(
            "Loaded {} variant sections, {} normalization steps, {} transliteration steps",
            config.variants.len(),
            config.normalization.len(),
            config.transliteration.len()
        );
        Ok(config)
    }

    /// Write the configuration as pretty JSON (temp file, then rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        let temp_path = path.with_extension("json.tmp");

        tracing::info!("Saving variant configuration to {:?}", path);
        std::fs::write(&temp_path, &content).map_err(|e| {
            tracing::error!("Failed to write {:?}: {}", temp_path, e);
            e
        })?;
        std::fs::rename(&temp_path, path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    /// All rules in declaration order: per section, `words` then groups
    pub fn rule_lines(&self) -> Result<Vec<String>, ConfigurationError> {
        let mut lines = Vec::new();
        for section in &self.variants {
            lines.extend(section.words.iter().cloned());
            for group in &section.compound_suffixes {
                lines.push(group.to_rule_line()?);
            }
        }
        Ok(lines)
    }
}
