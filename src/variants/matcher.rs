//! Variant matcher
//!
//! Scans a framed name left to right. At every position the longest compiled
//! key wins (ties cannot happen: keys are unique and owned by the first rule
//! declaring them). Accepted sites never overlap.

use aho_corasick::Input;

use crate::variants::rules::{CompiledRuleSet, ANCHOR};
use crate::variants::types::MatchSite;

/// `F name F` with the anchor character removed from the name itself
pub(crate) fn frame(name: &str) -> String {
    let mut framed = String::with_capacity(name.len() + 4);
    framed.push(ANCHOR);
    framed.push(' ');
    framed.extend(name.chars().filter(|&c| c != ANCHOR));
    framed.push(' ');
    framed.push(ANCHOR);
    framed
}

/// Find the rule matches in a normalized name
///
/// Site offsets refer to the framed name (see [`frame`]). No match yields an
/// empty list.
pub fn find_matches(name: &str, rules: &CompiledRuleSet) -> Vec<MatchSite> {
    let Some(automaton) = rules.automaton() else {
        return Vec::new();
    };

    let framed = frame(name);
    let mut sites = Vec::new();
    let mut pos = 0;
    let mut shared_boundary: Option<usize> = None;

    while pos < framed.len() {
        let Some(found) = automaton.find(Input::new(&framed).range(pos..)) else {
            break;
        };

        let key_idx = found.pattern().as_usize();
        let shares_end = rules.keys()[key_idx].shares_end;
        // leave the boundary space to whatever follows
        let end = if shares_end {
            found.end() - 1
        } else {
            found.end()
        };

        sites.push(MatchSite {
            start: found.start(),
            end,
            key: key_idx,
            shares_start: shared_boundary == Some(found.start()),
            shares_end,
        });

        shared_boundary = shares_end.then_some(end);
        pos = end;
    }

    sites
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::normalizer::Normalizer;

    fn compile(lines: &[&str]) -> CompiledRuleSet {
        CompiledRuleSet::compile(lines, &Normalizer::standard()).unwrap()
    }

    fn matched_text(name: &str, rules: &CompiledRuleSet) -> Vec<String> {
        let framed = frame(name);
        find_matches(name, rules)
            .iter()
            .map(|s| {
                framed[s.start..s.end]
                    .trim_matches(|c: char| c == ' ' || c == ANCHOR)
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_no_rules() {
        assert!(find_matches("meier weg", &CompiledRuleSet::empty()).is_empty());
    }

    #[test]
    fn test_no_match() {
        let rules = compile(&["weg => wg"]);
        assert!(find_matches("holzweg", &rules).is_empty());
    }

    #[test]
    fn test_compound_suffix_match() {
        let rules = compile(&["~weg => w"]);
        let sites = find_matches("holzweg", &rules);

        assert_eq!(sites.len(), 1);
        assert_eq!(rules.keys()[sites[0].key].text, "weg ");
        assert!(!sites[0].shares_start);
    }

    #[test]
    fn test_spaced_compound_prefers_leading_space() {
        let rules = compile(&["~weg => w"]);
        let sites = find_matches("meier weg", &rules);

        assert_eq!(sites.len(), 1);
        assert_eq!(rules.keys()[sites[0].key].text, " weg ");
    }

    #[test]
    fn test_adjacent_sites_share_boundary() {
        let rules = compile(&["am => a", "bach => b"]);
        let sites = find_matches("am bach", &rules);

        assert_eq!(sites.len(), 2);
        assert!(sites[0].shares_end);
        assert!(!sites[0].shares_start);
        assert!(sites[1].shares_start);
        assert_eq!(sites[0].end, sites[1].start);
    }

    #[test]
    fn test_longest_match_wins() {
        let rules = compile(&["st -> saint", "st john -> sj"]);

        assert_eq!(matched_text("st john street", &rules), vec!["st john"]);
        assert_eq!(matched_text("st johns street", &rules), vec!["st"]);
    }

    #[test]
    fn test_first_declared_rule_wins() {
        let rules = compile(&["north -> n", "north => nord"]);
        let sites = find_matches("north road", &rules);

        assert_eq!(sites.len(), 1);
        assert_eq!(rules.keys()[sites[0].key].rule, 0);
    }

    #[test]
    fn test_anchors() {
        let rules = compile(&["^north => n", "river$ -> r"]);

        assert_eq!(matched_text("north 2nd street", &rules), vec!["north"]);
        assert!(matched_text("airport north", &rules).is_empty());
        assert_eq!(matched_text("bent river", &rules), vec!["river"]);
        assert!(matched_text("river bend road", &rules).is_empty());
    }

    #[test]
    fn test_sites_do_not_overlap() {
        let rules = compile(&["am -> a"]);
        let sites = find_matches("am am am", &rules);

        assert_eq!(sites.len(), 3);
        for pair in sites.windows(2) {
            assert!(pair[0].end <= pair[1].start);
            assert!(pair[1].shares_start);
        }
    }

    #[test]
    fn test_anchor_char_in_name_is_ignored() {
        let rules = compile(&["^north => n"]);
        let name = format!("airport {} north", ANCHOR);
        assert!(find_matches(&name, &rules).is_empty());
    }
}
