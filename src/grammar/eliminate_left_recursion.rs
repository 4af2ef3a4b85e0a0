use std::collections::HashSet;

use log::{debug, warn};

use super::{grammar::Rule, Grammar};

impl Grammar {
    /// Removes immediate left recursion.
    ///
    /// Every `A -> A α1 | .. | A αm | β1 | .. | βn` becomes
    /// `A -> β1 A' | .. | βn A'` and `A' -> α1 A' | .. | αm A' | ε`, with the new
    /// head placed right after `A`. When there is no `β`, `A -> A'` is
    /// produced. Indirect recursion (`A -> B x`, `B -> A y`) is left alone.
    ///
    /// Heads are visited in definition order and the start symbol is kept, so
    /// the result is the same on every run.
    pub fn eliminate_left_recursion(&self) -> Grammar {
        let mut generated: HashSet<String> = HashSet::new();
        let mut rules: Vec<Rule> = Vec::new();

        for nt in self.non_terminal_iter() {
            let mut recursive_productions: Vec<Vec<String>> = Vec::new();
            let mut productions: Vec<Vec<String>> = Vec::new();

            for production in &nt.productions {
                let names = production
                    .iter()
                    .map(|idx| self.get_symbol_name(*idx).to_string());
                if production.first() == Some(&nt.index) {
                    if production.len() == 1 {
                        warn!("dropping degenerate production {} -> {}", nt.name, nt.name);
                        continue;
                    }
                    recursive_productions.push(names.skip(1).collect());
                } else {
                    productions.push(names.collect());
                }
            }

            if recursive_productions.is_empty() {
                rules.push(Rule::new(nt.name.clone(), productions));
                continue;
            }

            let prime = self.get_symbol_prime_name(&nt.name, &generated);
            generated.insert(prime.clone());
            debug!(
                "{} is left recursive, introducing {} for {} recursive alternative(s)",
                nt.name,
                prime,
                recursive_productions.len()
            );

            if productions.is_empty() {
                productions.push(Vec::new());
            }
            for production in productions.iter_mut().chain(recursive_productions.iter_mut()) {
                production.push(prime.clone());
            }
            recursive_productions.push(Vec::new());

            rules.push(Rule::new(nt.name.clone(), productions));
            rules.push(Rule::new(prime, recursive_productions));
        }

        // Non-empty: every head of `self` yields at least one rule.
        let mut g = Grammar::from_rules(&rules).unwrap_or_else(|_| self.clone());
        g.start_symbol = g
            .get_symbol_index(self.start_symbol_name())
            .unwrap_or(g.start_symbol);
        g
    }
}
