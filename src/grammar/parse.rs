use log::debug;

use super::{grammar::Rule, is_epsilon, Grammar, GrammarError, END_MARK};

impl Grammar {
    /// Parses grammar text of the form `HEAD -> BODY (| BODY)*`, one head per
    /// line. Symbols are whitespace-delimited; `ε`, `ϵ` or `epsilon` stands for
    /// the empty body. Lines repeating a head append to its alternatives.
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        Self::from_rules(&parse_rules(grammar)?)
    }
}

pub(crate) fn parse_rules(grammar: &str) -> Result<Vec<Rule>, GrammarError> {
    let lines: Vec<&str> = grammar.lines().collect();
    let is_blank = |line: &&str| line.chars().all(|c| c.is_whitespace());
    let first = match lines.iter().position(|l| !is_blank(l)) {
        Some(first) => first,
        None => return Err(GrammarError::EmptyGrammar),
    };
    let last = lines.iter().rposition(|l| !is_blank(l)).unwrap_or(first);

    let mut rules: Vec<Rule> = Vec::new();
    for (i, line) in lines.iter().enumerate().take(last + 1).skip(first) {
        let line_no = i + 1;
        if is_blank(line) {
            return Err(GrammarError::malformed(line_no, "blank line inside grammar"));
        }

        let parts: Vec<&str> = line.split("->").collect();
        if parts.len() < 2 {
            return Err(GrammarError::malformed(line_no, "missing \"->\""));
        } else if parts.len() > 2 {
            return Err(GrammarError::malformed(line_no, "too many \"->\""));
        }

        let left = parts[0].trim();
        if left.is_empty() {
            return Err(GrammarError::malformed(line_no, "empty left side"));
        } else if left.split_whitespace().count() != 1 {
            return Err(GrammarError::malformed(line_no, "left side contains whitespace"));
        } else if is_epsilon(left) || left == END_MARK {
            return Err(GrammarError::malformed(
                line_no,
                format!("reserved symbol \"{}\" cannot be a left side", left),
            ));
        }

        let mut alternatives = Vec::new();
        for right in parts[1].split('|') {
            let tokens: Vec<&str> = right.split_whitespace().collect();
            if tokens.is_empty() {
                return Err(GrammarError::malformed(line_no, "empty alternative"));
            }
            alternatives.push(
                tokens
                    .into_iter()
                    .filter(|s| !is_epsilon(s))
                    .map(str::to_string)
                    .collect(),
            );
        }

        debug!("line {}: {} with {} alternative(s)", line_no, left, alternatives.len());
        rules.push(Rule::new(left, alternatives));
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use crate::grammar::{Grammar, GrammarError, EPSILON_INDEX};

    fn reason(grammar: &str) -> String {
        match Grammar::parse(grammar) {
            Err(GrammarError::MalformedProduction { reason, .. }) => reason,
            other => panic!("expected a malformed production, got {:?}", other),
        }
    }

    #[test]
    fn simple_parse() {
        let g = Grammar::parse("S -> a").unwrap();

        let s = g.get_symbol_index("S").unwrap();
        let a = g.get_symbol_index("a").unwrap();

        assert_eq!(g.get_symbol_name(s), "S");
        assert_eq!(g.get_symbol_name(a), "a");
        assert_eq!(g.non_terminal(s).unwrap().productions[0], vec![a]);
        assert_eq!(g.start_symbol, s);
    }

    #[test]
    fn simple_parse_with_space() {
        let g = Grammar::parse("  S -> a ").unwrap();
        let s = g.get_symbol_index("S").unwrap();
        let a = g.get_symbol_index("a").unwrap();
        assert_eq!(g.non_terminal(s).unwrap().productions[0], vec![a]);
    }

    #[test]
    fn multi_character_symbols_stay_whole() {
        let g = Grammar::parse("S -> id + num").unwrap();
        let s = g.get_symbol_index("S").unwrap();
        assert_eq!(
            g.production_to_vec_str(&g.non_terminal(s).unwrap().productions[0]),
            vec!["id", "+", "num"]
        );
        assert!(g.get_symbol_index("i").is_none());
    }

    #[test]
    fn epsilon_spellings() {
        let g = Grammar::parse("S -> a S | ε\nT -> epsilon | ϵ").unwrap();
        let s = g.non_terminal(g.get_symbol_index("S").unwrap()).unwrap();
        let t = g.non_terminal(g.get_symbol_index("T").unwrap()).unwrap();
        assert!(s.productions[1].is_empty());
        assert!(t.productions.iter().all(|p| p.is_empty()));
        assert!(g
            .non_terminal_iter()
            .flat_map(|nt| nt.productions.iter().flatten())
            .all(|&idx| idx != EPSILON_INDEX));
    }

    #[test]
    fn surrounding_blank_lines_are_ignored() {
        let g = Grammar::parse("\n  \nS -> a\nA -> b\n\n").unwrap();
        assert_eq!(g.non_terminal_iter().count(), 2);
    }

    #[test]
    fn empty_parse() {
        assert_eq!(Grammar::parse("  \n  "), Err(GrammarError::EmptyGrammar));
    }

    #[test]
    fn two_rightarrows_parse() {
        assert_eq!(reason("S -> a -> b"), "too many \"->\"");
    }

    #[test]
    fn no_rightarrow_parse() {
        assert_eq!(reason("S a b"), "missing \"->\"");
    }

    #[test]
    fn no_left_parse() {
        assert_eq!(reason("-> a"), "empty left side");
    }

    #[test]
    fn continuation_line_is_malformed() {
        assert_eq!(reason("S -> a\n | b c"), "missing \"->\"");
    }

    #[test]
    fn left_contain_space() {
        assert_eq!(reason("S a S -> x"), "left side contains whitespace");
    }

    #[test]
    fn empty_alternative() {
        assert_eq!(reason("S -> a | | b"), "empty alternative");
        assert_eq!(reason("S ->"), "empty alternative");
    }

    #[test]
    fn blank_line_inside_grammar() {
        assert_eq!(
            Grammar::parse("S -> a\n\nA -> b"),
            Err(GrammarError::MalformedProduction {
                line: 2,
                reason: "blank line inside grammar".to_string()
            })
        );
    }

    #[test]
    fn reserved_left_side() {
        assert!(reason("epsilon -> a").starts_with("reserved symbol"));
        assert!(reason("$ -> a").starts_with("reserved symbol"));
    }
}
