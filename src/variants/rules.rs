//! Variant rule model and compiler
//!
//! One rule per line: `LHS SEP RHS`
//! - `SEP` is `->` (two-way, original text kept) or `=>` (one-way);
//!   a leading `|` (`|->`, `|=>`) disables compound decomposition
//! - `LHS` and `RHS` are comma-separated alternatives
//! - an `LHS` alternative may carry `~` on one side (compound), a leading `^`
//!   (start anchor) and/or a trailing `$` (end anchor)
//!
//! Rules compile into match keys over the framed name `F name F`, where `F`
//! is [`ANCHOR`]. Keys carry their boundary spaces, so `~weg` yields both
//! `"weg "` (fused onto the previous token) and `" weg "` (own token).

use std::collections::HashMap;

use aho_corasick::{AhoCorasick, MatchKind};

use crate::error::ConfigurationError;
use crate::variants::normalizer::Normalizer;

/// Marks the start and end of a framed name; normalization never produces it
pub(crate) const ANCHOR: char = '\u{2}';

/// Whether the matched text survives as an alternative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `=>`: replacements only
    OneWay,
    /// `->`: replacements plus the original text
    TwoWay,
}

/// Compound marker of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compound {
    Simple,
    /// `~word`: may be fused onto the end of the preceding token
    Suffix,
    /// `word~`: may have the following token fused onto it
    Prefix,
}

/// One left-hand alternative
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub text: String,
    pub start_anchored: bool,
    pub end_anchored: bool,
    pub compound: Compound,
}

impl Pattern {
    fn parse(raw: &str, rule: &str, normalizer: &Normalizer) -> Result<Self, ConfigurationError> {
        let invalid = |reason: &'static str| ConfigurationError::InvalidPattern {
            rule: rule.to_string(),
            pattern: raw.trim().to_string(),
            reason,
        };

        let word = raw.trim();
        if word.is_empty() {
            return Err(ConfigurationError::EmptyPattern {
                rule: rule.to_string(),
            });
        }

        let (lead, body) = match word.strip_prefix('~') {
            Some(rest) => (Some('~'), rest),
            None => match word.strip_prefix('^') {
                Some(rest) => (Some('^'), rest),
                None => (None, word),
            },
        };
        let (body, trail) = match body.strip_suffix('~') {
            Some(rest) => (rest, Some('~')),
            None => match body.strip_suffix('$') {
                Some(rest) => (rest, Some('$')),
                None => (body, None),
            },
        };

        if lead == Some('~') && trail == Some('~') {
            return Err(invalid("compound marker on both sides"));
        }
        if body.contains(['~', '^', '$']) {
            return Err(invalid("misplaced marker"));
        }

        let text = normalizer.normalize_literal(body);
        if text.is_empty() {
            return Err(ConfigurationError::EmptyPattern {
                rule: rule.to_string(),
            });
        }
        if text.contains(ANCHOR) {
            return Err(invalid("contains a reserved character"));
        }
        // names are matched after transliteration
        if normalizer.normalize(&text) != text {
            return Err(invalid("never occurs in a normalized name"));
        }

        let compound = match (lead, trail) {
            (Some('~'), _) => Compound::Suffix,
            (_, Some('~')) => Compound::Prefix,
            _ => Compound::Simple,
        };

        Ok(Self {
            text,
            start_anchored: lead == Some('^'),
            end_anchored: trail == Some('$'),
            compound,
        })
    }

    /// (key, replacement) pairs for one replacement text
    fn key_pairs(&self, replacement: &str, decompose: bool) -> Vec<(String, String)> {
        let lead = if self.start_anchored {
            format!("{} ", ANCHOR)
        } else {
            " ".to_string()
        };
        let trail = if self.end_anchored {
            format!(" {}", ANCHOR)
        } else {
            " ".to_string()
        };

        match self.compound {
            Compound::Suffix => {
                let src = format!("{}{}", self.text, trail);
                let repl = format!("{}{}", replacement, trail);
                let mut pairs = vec![(src.clone(), repl.clone()), (format!(" {}", src), repl.clone())];
                if decompose {
                    pairs.push((src.clone(), format!(" {}", repl)));
                    pairs.push((format!(" {}", src), format!(" {}", repl)));
                }
                pairs
            }
            Compound::Prefix => {
                let src = format!("{}{}", lead, self.text);
                let repl = format!("{}{}", lead, replacement);
                let mut pairs = vec![(src.clone(), repl.clone()), (format!("{} ", src), repl.clone())];
                if decompose {
                    pairs.push((src.clone(), format!("{} ", repl)));
                    pairs.push((format!("{} ", src), format!("{} ", repl)));
                }
                pairs
            }
            Compound::Simple => vec![(
                format!("{}{}{}", lead, self.text, trail),
                format!("{}{}{}", lead, replacement, trail),
            )],
        }
    }
}

/// A parsed variant rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRule {
    /// Rule line as written
    pub source: String,
    pub patterns: Vec<Pattern>,
    /// Normalized replacement texts; an empty string deletes the match
    pub replacements: Vec<String>,
    pub direction: Direction,
    /// Compound matches produce both fused and spaced forms
    pub decompose: bool,
}

impl VariantRule {
    /// Parse one rule line
    ///
    /// Literal texts on both sides go through the normalization steps of
    /// `normalizer`, so rules may be written in either raw or normalized form.
    pub fn parse(line: &str, normalizer: &Normalizer) -> Result<Self, ConfigurationError> {
        let syntax = |reason: &'static str| ConfigurationError::Syntax {
            rule: line.to_string(),
            reason,
        };

        if line.matches("->").count() + line.matches("=>").count() != 1 {
            return Err(syntax("expected exactly one '->' or '=>'"));
        }
        let (pos, direction) = match (line.find("->"), line.find("=>")) {
            (Some(pos), None) => (pos, Direction::TwoWay),
            (None, Some(pos)) => (pos, Direction::OneWay),
            _ => return Err(syntax("expected exactly one '->' or '=>'")),
        };

        let (lhs, decompose) = match line[..pos].strip_suffix('|') {
            Some(lhs) => (lhs, false),
            None => (&line[..pos], true),
        };
        let rhs = &line[pos + 2..];

        let patterns = lhs
            .split(',')
            .map(|p| Pattern::parse(p, line, normalizer))
            .collect::<Result<Vec<_>, _>>()?;

        if rhs.trim().is_empty() {
            return Err(ConfigurationError::EmptyReplacement {
                rule: line.to_string(),
            });
        }
        let mut replacements: Vec<String> = Vec::new();
        for alternative in rhs.split(',') {
            let text = normalizer.normalize_literal(alternative);
            if !replacements.contains(&text) {
                replacements.push(text);
            }
        }

        Ok(Self {
            source: line.trim().to_string(),
            patterns,
            replacements,
            direction,
            decompose,
        })
    }

    /// Every (key, replacement) pair, original-text pairs first for two-way rules
    fn key_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if self.direction == Direction::TwoWay {
            for pattern in &self.patterns {
                pairs.extend(pattern.key_pairs(&pattern.text, self.decompose));
            }
        }
        for pattern in &self.patterns {
            for replacement in &self.replacements {
                pairs.extend(pattern.key_pairs(replacement, self.decompose));
            }
        }

        pairs
    }
}

/// Matchable key with the alternatives it can be replaced by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleKey {
    /// Key text over the framed name, boundary spaces included
    pub text: String,
    pub replacements: Vec<String>,
    /// Index of the owning rule
    pub rule: usize,
    /// Trailing space stays with the following text; a replacement without
    /// one fuses onto it
    pub shares_end: bool,
}

/// Immutable, compiled rule set
#[derive(Debug, Clone, Default)]
pub struct CompiledRuleSet {
    rules: Vec<VariantRule>,
    keys: Vec<RuleKey>,
    /// Leftmost-longest automaton over `keys`; pattern id = key index
    automaton: Option<AhoCorasick>,
}

impl CompiledRuleSet {
    /// Rule set that matches nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse and compile rule lines
    ///
    /// # Arguments
    /// * `lines` - rules in the `LHS SEP RHS` grammar, in priority order
    /// * `normalizer` - pipeline the rule literals are normalized with
    pub fn compile<S: AsRef<str>>(
        lines: &[S],
        normalizer: &Normalizer,
    ) -> Result<Self, ConfigurationError> {
        let rules = lines
            .iter()
            .map(|line| VariantRule::parse(line.as_ref(), normalizer))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rules(rules)
    }

    /// Compile already parsed rules
    ///
    /// Pairs of one rule with the same key merge their replacements; a key
    /// already owned by an earlier rule is left to that rule.
    pub fn from_rules(rules: Vec<VariantRule>) -> Result<Self, ConfigurationError> {
        let mut keys: Vec<RuleKey> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (rule_idx, rule) in rules.iter().enumerate() {
            for (key, replacement) in rule.key_pairs() {
                match index.get(&key) {
                    Some(&existing) if keys[existing].rule == rule_idx => {
                        let entry = &mut keys[existing];
                        if !entry.replacements.contains(&replacement) {
                            entry.replacements.push(replacement);
                        }
                    }
                    Some(&existing) => {
                        tracing::debug!(
                            "variant key {:?} of rule '{}' already taken by rule '{}'",
                            key,
                            rule.source,
                            rules[keys[existing].rule].source
                        );
                    }
                    None => {
                        index.insert(key.clone(), keys.len());
                        keys.push(RuleKey {
                            text: key,
                            replacements: vec![replacement],
                            rule: rule_idx,
                            shares_end: false,
                        });
                    }
                }
            }
        }

        for key in &mut keys {
            // replacements without the trailing space fuse onto what follows
            key.shares_end = key.text.ends_with(' ');
        }

        let automaton = if keys.is_empty() {
            None
        } else {
            Some(
                AhoCorasick::builder()
                    .match_kind(MatchKind::LeftmostLongest)
                    .build(keys.iter().map(|k| k.text.as_str()))?,
            )
        };

        tracing::info!(
            "compiled {} variant rules into {} match keys",
            rules.len(),
            keys.len()
        );

        Ok(Self {
            rules,
            keys,
            automaton,
        })
    }

    pub fn rules(&self) -> &[VariantRule] {
        &self.rules
    }

    pub fn keys(&self) -> &[RuleKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub(crate) fn automaton(&self) -> Option<&AhoCorasick> {
        self.automaton.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<VariantRule, ConfigurationError> {
        VariantRule::parse(line, &Normalizer::standard())
    }

    #[test]
    fn test_parse_two_way() {
        let rule = parse("saint -> s,st").unwrap();
        assert_eq!(rule.direction, Direction::TwoWay);
        assert!(rule.decompose);
        assert_eq!(rule.patterns.len(), 1);
        assert_eq!(rule.patterns[0].text, "saint");
        assert_eq!(rule.patterns[0].compound, Compound::Simple);
        assert_eq!(rule.replacements, vec!["s", "st"]);
    }

    #[test]
    fn test_parse_markers() {
        let rule = parse("~strasse,~straße -> str").unwrap();
        assert!(rule.patterns.iter().all(|p| p.compound == Compound::Suffix));
        assert_eq!(rule.patterns[1].text, "straße");

        let rule = parse("^north => n").unwrap();
        assert_eq!(rule.direction, Direction::OneWay);
        assert!(rule.patterns[0].start_anchored);
        assert!(!rule.patterns[0].end_anchored);

        let rule = parse("river$ -> r").unwrap();
        assert!(rule.patterns[0].end_anchored);

        let rule = parse("hinter~ -> h").unwrap();
        assert_eq!(rule.patterns[0].compound, Compound::Prefix);

        let rule = parse("~weg$ => w").unwrap();
        assert_eq!(rule.patterns[0].compound, Compound::Suffix);
        assert!(rule.patterns[0].end_anchored);

        let rule = parse("~weg |=> w").unwrap();
        assert!(!rule.decompose);
        assert_eq!(rule.direction, Direction::OneWay);
    }

    #[test]
    fn test_literals_are_normalized() {
        let rule = parse("St. => Saint").unwrap();
        assert_eq!(rule.patterns[0].text, "st");
        assert_eq!(rule.replacements, vec!["saint"]);

        let rule = parse("Sankt Peter -> St. Peter").unwrap();
        assert_eq!(rule.patterns[0].text, "sankt peter");
        assert_eq!(rule.replacements, vec!["st peter"]);
    }

    #[test]
    fn test_deletion_replacement() {
        let rule = parse("the => ''").unwrap();
        assert_eq!(rule.replacements, vec![""]);

        let rule = parse("van -> v,''").unwrap();
        assert_eq!(rule.replacements, vec!["v", ""]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse("saint s"), Err(ConfigurationError::Syntax { .. })));
        assert!(matches!(parse("a -> b -> c"), Err(ConfigurationError::Syntax { .. })));
        assert!(matches!(parse("a -> b => c"), Err(ConfigurationError::Syntax { .. })));
        assert!(matches!(parse(" -> x"), Err(ConfigurationError::EmptyPattern { .. })));
        assert!(matches!(parse("x,  -> y"), Err(ConfigurationError::EmptyPattern { .. })));
        assert!(matches!(parse("!!! -> x"), Err(ConfigurationError::EmptyPattern { .. })));
        assert!(matches!(parse("~ -> x"), Err(ConfigurationError::EmptyPattern { .. })));
        assert!(matches!(parse("x -> "), Err(ConfigurationError::EmptyReplacement { .. })));
        assert!(matches!(parse("~x~ -> y"), Err(ConfigurationError::InvalidPattern { .. })));
        assert!(matches!(parse("a^b -> c"), Err(ConfigurationError::InvalidPattern { .. })));
        assert!(matches!(parse("$ab -> c"), Err(ConfigurationError::InvalidPattern { .. })));
    }

    #[test]
    fn test_pattern_outside_normalized_alphabet() {
        // names are transliterated before matching, Cyrillic never survives
        assert!(matches!(
            parse("улица -> ул"),
            Err(ConfigurationError::InvalidPattern { .. })
        ));
        assert!(parse("ulitsa -> ul").is_ok());
    }

    #[test]
    fn test_compile_compound_keys() {
        let rules = CompiledRuleSet::compile(&["~weg => w"], &Normalizer::standard()).unwrap();
        let keys = rules.keys();

        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].text, "weg ");
        assert_eq!(keys[0].replacements, vec!["w ", " w "]);
        assert_eq!(keys[1].text, " weg ");
        assert_eq!(keys[1].replacements, vec!["w ", " w "]);
        assert!(keys.iter().all(|k| k.shares_end));
    }

    #[test]
    fn test_compile_two_way_keeps_original_first() {
        let rules = CompiledRuleSet::compile(&["weg -> wg"], &Normalizer::standard()).unwrap();
        assert_eq!(rules.keys().len(), 1);
        assert_eq!(rules.keys()[0].replacements, vec![" weg ", " wg "]);
    }

    #[test]
    fn test_compile_anchored_keys() {
        let rules = CompiledRuleSet::compile(&["^north => n", "river$ -> r"], &Normalizer::standard())
            .unwrap();
        assert_eq!(rules.keys()[0].text, format!("{} north ", ANCHOR));
        assert_eq!(rules.keys()[1].text, format!(" river {}", ANCHOR));
        assert!(!rules.keys()[1].shares_end);
    }

    #[test]
    fn test_prefix_compound_leaves_boundary() {
        let rules = CompiledRuleSet::compile(&["hinter~ -> h"], &Normalizer::standard()).unwrap();
        let spaced = rules.keys().iter().find(|k| k.text == " hinter ").unwrap();
        assert!(spaced.shares_end);
        let fused = rules.keys().iter().find(|k| k.text == " hinter").unwrap();
        assert!(!fused.shares_end);
        assert!(spaced.replacements.contains(&" h".to_string()));
        assert!(spaced.replacements.contains(&" h ".to_string()));
    }

    #[test]
    fn test_first_rule_owns_duplicate_key() {
        let rules = CompiledRuleSet::compile(
            &["street -> st", "street => str"],
            &Normalizer::standard(),
        )
        .unwrap();
        assert_eq!(rules.rules().len(), 2);
        assert_eq!(rules.keys().len(), 1);
        assert_eq!(rules.keys()[0].rule, 0);
        assert_eq!(rules.keys()[0].replacements, vec![" street ", " st "]);
    }

    #[test]
    fn test_empty_rule_set() {
        let rules = CompiledRuleSet::compile::<&str>(&[], &Normalizer::standard()).unwrap();
        assert!(rules.is_empty());
        assert!(rules.automaton().is_none());
    }
}
