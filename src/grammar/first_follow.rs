use std::collections::{HashMap, HashSet};

use log::debug;

use super::{grammar::Symbol, Grammar, END_MARK_INDEX, EPSILON_INDEX};

/// One set of symbol indices per non-terminal, plus the number of full passes
/// the fixed point took to settle (the last pass being the one that changed
/// nothing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSets {
    sets: HashMap<usize, HashSet<usize>>,
    passes: usize,
}

/// FIRST sets. `ε` ([`EPSILON_INDEX`]) is a member exactly when the
/// non-terminal is nullable.
pub type FirstSets = SymbolSets;

/// FOLLOW sets, which may contain `$` ([`END_MARK_INDEX`]).
pub type FollowSets = SymbolSets;

impl SymbolSets {
    fn new(g: &Grammar) -> Self {
        Self {
            sets: g
                .non_terminal_iter()
                .map(|nt| (nt.index, HashSet::new()))
                .collect(),
            passes: 0,
        }
    }

    pub fn get(&self, non_terminal: usize) -> Option<&HashSet<usize>> {
        self.sets.get(&non_terminal)
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Set members by name, sorted, or `None` if `non_terminal` is not a head.
    pub fn names<'a>(&self, g: &'a Grammar, non_terminal: &str) -> Option<Vec<&'a str>> {
        let set = self.get(g.get_symbol_index(non_terminal)?)?;
        let mut names: Vec<&str> = set.iter().map(|idx| g.get_symbol_name(*idx)).collect();
        names.sort();
        Some(names)
    }

    /// Adds `items` to the set of `non_terminal` and reports whether it grew.
    fn extend(&mut self, non_terminal: usize, items: impl IntoIterator<Item = usize>) -> bool {
        let set = self.sets.entry(non_terminal).or_default();
        let before = set.len();
        set.extend(items);
        set.len() != before
    }
}

impl Grammar {
    /// FIRST of a symbol sequence: terminals that can begin it, plus `ε` when
    /// every symbol of it can vanish (including the empty sequence).
    pub fn calculate_first_for_production(
        &self,
        first: &FirstSets,
        production: &[usize],
    ) -> HashSet<usize> {
        let mut result: HashSet<usize> = HashSet::new();
        for idx in production {
            match &self.symbols[*idx] {
                Symbol::Terminal(_) => {
                    result.insert(*idx);
                    return result;
                }
                Symbol::NonTerminal(nt) => {
                    let nt_first = match first.get(nt.index) {
                        Some(nt_first) => nt_first,
                        None => return result,
                    };
                    result.extend(nt_first.iter().filter(|&&s| s != EPSILON_INDEX));
                    if !nt_first.contains(&EPSILON_INDEX) {
                        return result;
                    }
                }
            }
        }
        result.insert(EPSILON_INDEX);
        result
    }

    pub fn calculate_first(&self) -> FirstSets {
        self.calculate_first_with(|_| {})
    }

    /// FIRST fixed point, handing the sets to `after_pass` at the end of
    /// every pass.
    pub(crate) fn calculate_first_with(&self, mut after_pass: impl FnMut(&FirstSets)) -> FirstSets {
        let mut first = FirstSets::new(self);

        let mut changed = true;
        while changed {
            changed = false;
            first.passes += 1;
            for nt in self.non_terminal_iter() {
                let nt_first: HashSet<usize> =
                    nt.productions
                        .iter()
                        .fold(HashSet::new(), |mut nt_first, production| {
                            nt_first.extend(self.calculate_first_for_production(&first, production));
                            nt_first
                        });
                changed |= first.extend(nt.index, nt_first);
            }
            after_pass(&first);
        }

        debug!("FIRST settled after {} pass(es)", first.passes);
        first
    }

    /// FOLLOW sets; `$` seeds the start symbol. Productions are rescanned
    /// until a full pass adds nothing.
    pub fn calculate_follow(&self, first: &FirstSets) -> FollowSets {
        let mut follow = FollowSets::new(self);
        follow.extend(self.start_symbol, [END_MARK_INDEX]);

        let mut changed = true;
        while changed {
            changed = false;
            follow.passes += 1;
            for left in self.non_terminal_iter() {
                for production in &left.productions {
                    for (i, &idx) in production.iter().enumerate() {
                        if !self.is_non_terminal(idx) {
                            continue;
                        }

                        let rest = self.calculate_first_for_production(first, &production[i + 1..]);
                        let mut additions: Vec<usize> = rest
                            .iter()
                            .filter(|&&s| s != EPSILON_INDEX)
                            .cloned()
                            .collect();
                        if rest.contains(&EPSILON_INDEX) && idx != left.index {
                            if let Some(left_follow) = follow.get(left.index) {
                                additions.extend(left_follow.iter().cloned());
                            }
                        }

                        changed |= follow.extend(idx, additions);
                    }
                }
            }
        }

        debug!("FOLLOW settled after {} pass(es)", follow.passes);
        follow
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::{FirstSets, Grammar, EPSILON};

    fn expression_grammar() -> Grammar {
        Grammar::parse("E -> T E'\nE' -> + T E' | ε\nT -> F T'\nT' -> * F T' | ε\nF -> ( E ) | id")
            .unwrap()
    }

    #[test]
    fn first_of_expression_grammar() {
        let g = expression_grammar();
        let first = g.calculate_first();
        assert_eq!(first.names(&g, "F").unwrap(), vec!["(", "id"]);
        assert_eq!(first.names(&g, "T").unwrap(), vec!["(", "id"]);
        assert_eq!(first.names(&g, "E").unwrap(), vec!["(", "id"]);
        assert_eq!(first.names(&g, "T'").unwrap(), vec!["*", EPSILON]);
        assert_eq!(first.names(&g, "E'").unwrap(), vec!["+", EPSILON]);
        assert!(first.names(&g, "id").is_none());
    }

    #[test]
    fn follow_of_expression_grammar() {
        let g = expression_grammar();
        let first = g.calculate_first();
        let follow = g.calculate_follow(&first);
        assert_eq!(follow.names(&g, "E").unwrap(), vec!["$", ")"]);
        assert_eq!(follow.names(&g, "E'").unwrap(), vec!["$", ")"]);
        assert_eq!(follow.names(&g, "T").unwrap(), vec!["$", ")", "+"]);
        assert_eq!(follow.names(&g, "T'").unwrap(), vec!["$", ")", "+"]);
        assert_eq!(follow.names(&g, "F").unwrap(), vec!["$", ")", "*", "+"]);
    }

    #[test]
    fn first_depends_on_later_heads() {
        // A needs FIRST(B), B needs FIRST(C), each defined after its user.
        let g = Grammar::parse("A -> B a\nB -> C | ε\nC -> c").unwrap();
        let first = g.calculate_first();
        assert_eq!(first.names(&g, "A").unwrap(), vec!["a", "c"]);
        assert_eq!(first.names(&g, "B").unwrap(), vec!["c", EPSILON]);
        assert!(first.passes() <= g.non_terminal_iter().count() + 1);
    }

    #[test]
    fn nullable_sequence_reaches_epsilon() {
        let g = Grammar::parse("S -> A B\nA -> a | ε\nB -> b | ε").unwrap();
        let first = g.calculate_first();
        assert_eq!(first.names(&g, "S").unwrap(), vec!["a", "b", EPSILON]);
    }

    #[test]
    fn follow_needs_more_than_one_pass() {
        // FOLLOW(B) comes from FOLLOW(A), which is only known once the later
        // production `S -> A s` has been scanned.
        let g = Grammar::parse("B -> b\nA -> x B\nS -> A s\nR -> S").unwrap();
        let first = g.calculate_first();
        let follow = g.calculate_follow(&first);
        assert_eq!(follow.names(&g, "A").unwrap(), vec!["s"]);
        assert_eq!(follow.names(&g, "B").unwrap(), vec!["$", "s"]);
        assert!(follow.passes() > 2);
    }

    #[test]
    fn start_symbol_follow_has_end_mark() {
        for text in ["S -> a", "S -> S a | b", "S -> ( S ) S | ε"] {
            let g = Grammar::parse(text).unwrap();
            let follow = g.calculate_follow(&g.calculate_first());
            assert!(follow.names(&g, "S").unwrap().contains(&"$"));
        }
    }

    #[test]
    fn first_sets_only_grow() {
        let g = Grammar::parse("S -> A B C\nA -> B | a\nB -> C | b | ε\nC -> c | ε").unwrap();
        let mut snapshots: Vec<FirstSets> = Vec::new();
        let first = g.calculate_first_with(|sets| snapshots.push(sets.clone()));

        assert_eq!(snapshots.len(), first.passes());
        assert!(snapshots.len() > 2);
        for (before, after) in snapshots.iter().zip(snapshots.iter().skip(1)) {
            for nt in g.non_terminal_iter() {
                let before = before.get(nt.index).unwrap();
                let after = after.get(nt.index).unwrap();
                assert!(before.is_subset(after), "FIRST({}) shrank", nt.name);
            }
        }
        assert_eq!(snapshots.last(), Some(&first));

        assert_eq!(first.names(&g, "S").unwrap(), vec!["a", "b", "c", EPSILON]);
        assert_eq!(first.names(&g, "A").unwrap(), vec!["a", "b", "c", EPSILON]);
    }
}
