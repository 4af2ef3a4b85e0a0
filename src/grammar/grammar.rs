use std::collections::{HashMap, HashSet};

use log::debug;

use super::{GrammarError, END_MARK, END_MARK_INDEX, EPSILON, EPSILON_INDEX};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonTerminal {
    pub index: usize,
    pub name: String,
    /// Alternatives in the order they were first seen. An empty body is `ε`.
    pub productions: Vec<Vec<usize>>,
}

impl NonTerminal {
    pub fn new(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            productions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    NonTerminal(NonTerminal),
    Terminal(String),
}

impl Symbol {
    pub fn non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            Symbol::Terminal(_) => None,
        }
    }

    pub fn mut_non_terminal(&mut self) -> Option<&mut NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            Symbol::Terminal(_) => None,
        }
    }
}

/// A grammar rule at the level of names, before symbols are interned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub head: String,
    pub alternatives: Vec<Vec<String>>,
}

impl Rule {
    pub fn new(head: impl Into<String>, alternatives: Vec<Vec<String>>) -> Self {
        Self {
            head: head.into(),
            alternatives,
        }
    }
}

/// Symbol arena of a context-free grammar.
///
/// Slot [`EPSILON_INDEX`] holds `ε` and slot [`END_MARK_INDEX`] holds `$`.
/// Non-terminals keep the order in which their heads were first defined,
/// and `start_symbol` is the first of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    pub symbols: Vec<Symbol>,
    pub symbol_table: HashMap<String, usize>,
    pub start_symbol: usize,
}

impl Grammar {
    fn new() -> Self {
        let mut g = Self {
            symbols: Vec::new(),
            symbol_table: HashMap::new(),
            start_symbol: 0,
        };

        g.add_terminal(EPSILON.to_string());
        g.add_terminal(END_MARK.to_string());

        g
    }

    /// Interns `rules` into a grammar. Heads are registered first so that any
    /// body symbol which never heads a rule becomes a terminal.
    pub fn from_rules(rules: &[Rule]) -> Result<Self, GrammarError> {
        let first_rule = rules.first().ok_or(GrammarError::EmptyGrammar)?;
        let mut g = Self::new();

        for rule in rules {
            if g.get_symbol_index(&rule.head).is_none() {
                g.add_non_terminal(&rule.head);
            }
        }

        for rule in rules {
            let left = g.symbol_table[&rule.head];
            for alternative in &rule.alternatives {
                let right = alternative
                    .iter()
                    .map(|s| {
                        if let Some(idx) = g.get_symbol_index(s) {
                            idx
                        } else {
                            debug!("`{}` never heads a rule, treating it as a terminal", s);
                            g.add_terminal(s.clone())
                        }
                    })
                    .collect();
                g.add_production(left, right);
            }
        }

        g.start_symbol = g.symbol_table[&first_rule.head];
        Ok(g)
    }

    /// Terminals in first-seen order, without `ε` and `$`.
    pub fn terminal_iter(&self) -> impl Iterator<Item = &String> {
        self.symbols
            .iter()
            .enumerate()
            .filter_map(|(idx, s)| match s {
                Symbol::Terminal(name) if idx != EPSILON_INDEX && idx != END_MARK_INDEX => {
                    Some(name)
                }
                _ => None,
            })
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &NonTerminal> {
        self.symbols.iter().filter_map(|s| s.non_terminal())
    }

    pub fn non_terminal(&self, index: usize) -> Option<&NonTerminal> {
        self.symbols.get(index).and_then(|s| s.non_terminal())
    }

    pub fn is_non_terminal(&self, index: usize) -> bool {
        self.non_terminal(index).is_some()
    }

    pub fn get_symbol_index(&self, name: &str) -> Option<usize> {
        self.symbol_table.get(name).cloned()
    }

    pub fn add_non_terminal(&mut self, name: &str) -> usize {
        let idx = self.symbols.len();
        self.symbols
            .push(Symbol::NonTerminal(NonTerminal::new(idx, name.to_string())));
        self.symbol_table.insert(name.to_string(), idx);
        idx
    }

    pub fn add_terminal(&mut self, name: String) -> usize {
        let idx = self.symbols.len();
        self.symbols.push(Symbol::Terminal(name.clone()));
        self.symbol_table.insert(name, idx);
        idx
    }

    pub fn add_production(&mut self, left: usize, right: Vec<usize>) {
        if let Some(nt) = self.symbols[left].mut_non_terminal() {
            nt.productions.push(right);
        }
    }

    pub fn get_symbol_name(&self, index: usize) -> &str {
        match &self.symbols[index] {
            Symbol::NonTerminal(e) => e.name.as_str(),
            Symbol::Terminal(e) => e.as_str(),
        }
    }

    pub fn start_symbol_name(&self) -> &str {
        self.get_symbol_name(self.start_symbol)
    }

    /// `name` followed by as many `'` as it takes to name neither a symbol of
    /// this grammar nor anything in `generated`.
    pub fn get_symbol_prime_name(&self, name: &str, generated: &HashSet<String>) -> String {
        let mut prime = format!("{}'", name);
        while self.symbol_table.contains_key(&prime) || generated.contains(&prime) {
            prime.push('\'');
        }
        prime
    }

    /// Names of a body's symbols; the empty body is spelled `ε`.
    pub fn production_to_vec_str(&self, production: &[usize]) -> Vec<&str> {
        if production.is_empty() {
            vec![EPSILON]
        } else {
            production
                .iter()
                .map(|idx| self.get_symbol_name(*idx))
                .collect()
        }
    }

    pub fn to_rules(&self) -> Vec<Rule> {
        self.non_terminal_iter()
            .map(|nt| {
                Rule::new(
                    nt.name.clone(),
                    nt.productions
                        .iter()
                        .map(|p| p.iter().map(|i| self.get_symbol_name(*i).to_string()).collect())
                        .collect(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(head: &str, alternatives: &[&[&str]]) -> Rule {
        Rule::new(
            head,
            alternatives
                .iter()
                .map(|a| a.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn reserved_slots() {
        let g = Grammar::from_rules(&[rule("S", &[&["a"]])]).unwrap();
        assert_eq!(g.get_symbol_name(EPSILON_INDEX), EPSILON);
        assert_eq!(g.get_symbol_name(END_MARK_INDEX), END_MARK);
        assert_eq!(g.terminal_iter().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn heads_win_over_terminals() {
        let g = Grammar::from_rules(&[rule("S", &[&["A", "b"]]), rule("A", &[&["a"]])]).unwrap();
        let a = g.get_symbol_index("A").unwrap();
        assert!(g.is_non_terminal(a));
        assert!(!g.is_non_terminal(g.get_symbol_index("b").unwrap()));
        assert_eq!(g.start_symbol_name(), "S");
    }

    #[test]
    fn repeated_heads_merge_in_order() {
        let g = Grammar::from_rules(&[
            rule("S", &[&["a"]]),
            rule("T", &[&["t"]]),
            rule("S", &[&["b"], &[]]),
        ])
        .unwrap();
        let names: Vec<_> = g.non_terminal_iter().map(|nt| nt.name.as_str()).collect();
        assert_eq!(names, vec!["S", "T"]);
        assert_eq!(
            g.to_rules()[0],
            rule("S", &[&["a"], &["b"], &[]])
        );
    }

    #[test]
    fn prime_name_skips_taken_names() {
        let g = Grammar::from_rules(&[rule("A", &[&["A'", "x"]]), rule("A'", &[&["y"]])]).unwrap();
        let mut generated = HashSet::new();
        assert_eq!(g.get_symbol_prime_name("A", &generated), "A''");
        generated.insert("A''".to_string());
        assert_eq!(g.get_symbol_prime_name("A", &generated), "A'''");
        assert_eq!(g.get_symbol_prime_name("B", &generated), "B'");
    }

    #[test]
    fn no_rules_is_an_error() {
        assert_eq!(Grammar::from_rules(&[]), Err(GrammarError::EmptyGrammar));
    }
}
