use crate::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Matched {
        index: usize,
        captures: Vec<(String, String)>,
    },
    NoMatch,
}

pub fn normalize_input(input: &str) -> String {
    collapse_whitespace(input)
}

pub fn match_transition(node: &Node, input: &str) -> MatchResult {
    let normalized = normalize_input(input);
    let lowered = normalized.to_lowercase();

    for (index, transition) in node.transitions().iter().enumerate() {
        let captures = match transition.matcher() {
            Matcher::Keyword { keywords } => {
                if !keywords
                    .iter()
                    .any(|keyword| lowered.contains(keyword.as_str()))
                {
                    continue;
                }
                Vec::new()
            }
            Matcher::Pattern { regex } => {
                let Some(found) = regex.captures(&normalized) else {
                    continue;
                };
                transition
                    .captures()
                    .iter()
                    .filter_map(|name| {
                        found
                            .name(name)
                            .map(|value| (name.clone(), value.as_str().to_string()))
                    })
                    .collect()
            }
            Matcher::CatchAll => Vec::new(),
        };
        return MatchResult::Matched { index, captures };
    }

    MatchResult::NoMatch
}

#[cfg(test)]
mod matcher_tests {
    use super::*;
    use crate::runtime_test_support::*;

    fn node<'a>(script: &'a Script, id: &str) -> &'a Node {
        script.node(id).expect("node should exist")
    }

    #[test]
    fn normalize_input_collapses_whitespace() {
        assert_eq!(normalize_input("  what's \t the\n price?  "), "what's the price?");
        assert_eq!(normalize_input("   "), "");
    }

    #[test]
    fn keyword_matching_is_case_insensitive_substring() {
        let script = storefront_script();
        assert_eq!(
            match_transition(node(&script, "start"), "What's the PRICE?"),
            MatchResult::Matched {
                index: 0,
                captures: Vec::new()
            }
        );
        assert_eq!(
            match_transition(node(&script, "start"), "how much does it cost"),
            MatchResult::Matched {
                index: 0,
                captures: Vec::new()
            }
        );
    }

    #[test]
    fn lower_priority_number_wins_when_several_accept() {
        let script = storefront_script();
        let result = match_transition(node(&script, "start"), "I want to buy, what's the price");
        assert_eq!(
            result,
            MatchResult::Matched {
                index: 0,
                captures: Vec::new()
            }
        );
    }

    #[test]
    fn catch_all_accepts_anything_left_over() {
        let script = storefront_script();
        assert_eq!(
            match_transition(node(&script, "start"), "asdf"),
            MatchResult::Matched {
                index: 2,
                captures: Vec::new()
            }
        );
        assert_eq!(
            match_transition(node(&script, "start"), ""),
            MatchResult::Matched {
                index: 2,
                captures: Vec::new()
            }
        );
    }

    #[test]
    fn pattern_captures_named_groups_keeping_user_casing() {
        let script = storefront_script();
        assert_eq!(
            match_transition(node(&script, "price"), "  size   M please"),
            MatchResult::Matched {
                index: 0,
                captures: vec![("size".to_string(), "M".to_string())]
            }
        );
        assert_eq!(
            match_transition(node(&script, "price"), "l"),
            MatchResult::Matched {
                index: 0,
                captures: vec![("size".to_string(), "l".to_string())]
            }
        );
    }

    #[test]
    fn no_match_without_catch_all() {
        let script = storefront_script();
        assert_eq!(
            match_transition(node(&script, "fallback"), "tell me a joke"),
            MatchResult::NoMatch
        );
    }

    #[test]
    fn multi_word_keyword_matches_regardless_of_spacing() {
        let script = script_from_json(serde_json::json!({
            "id": "cart",
            "version": 1,
            "entryNodeId": "ask",
            "nodes": [
                {
                    "id": "ask",
                    "kind": "decision",
                    "transitions": [{
                        "targetNodeId": "done",
                        "matcher": {"kind": "keyword", "keywords": ["check  out"]}
                    }]
                },
                {"id": "done", "kind": "terminal"}
            ]
        }));
        for input in ["I want to check  out", "check out", "CHECK\tOUT now"] {
            assert_eq!(
                match_transition(node(&script, "ask"), input),
                MatchResult::Matched {
                    index: 0,
                    captures: Vec::new()
                },
                "input {:?} should match",
                input
            );
        }
        assert_eq!(
            match_transition(node(&script, "ask"), "checkout"),
            MatchResult::NoMatch
        );
    }

    #[test]
    fn optional_group_that_did_not_participate_captures_nothing() {
        let script = script_from_json(serde_json::json!({
            "id": "qty",
            "version": 1,
            "entryNodeId": "ask",
            "nodes": [
                {
                    "id": "ask",
                    "kind": "decision",
                    "transitions": [{
                        "targetNodeId": "done",
                        "matcher": {"kind": "pattern", "pattern": "^(?:(?P<qty>\\d+) )?hoodies?$"},
                        "captures": ["qty"]
                    }]
                },
                {"id": "done", "kind": "terminal"}
            ],
            "variables": [{"name": "qty", "type": {"kind": "number"}}]
        }));
        assert_eq!(
            match_transition(node(&script, "ask"), "Hoodie"),
            MatchResult::Matched {
                index: 0,
                captures: Vec::new()
            }
        );
        assert_eq!(
            match_transition(node(&script, "ask"), "3 hoodies"),
            MatchResult::Matched {
                index: 0,
                captures: vec![("qty".to_string(), "3".to_string())]
            }
        );
    }
}
