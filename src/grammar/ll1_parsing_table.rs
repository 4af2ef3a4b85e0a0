use crowbook_text_processing::escape::tex as escape_tex;
use log::warn;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::Grammar;

use super::{
    pretty_print::{align_columns, ProductionOutput},
    FirstSets, FollowSets, END_MARK_INDEX, EPSILON, EPSILON_INDEX,
};

/// Two different bodies claiming the same table cell. The table keeps
/// `existing`; `rejected` is the body that lost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub non_terminal: String,
    pub terminal: String,
    pub existing: Vec<String>,
    pub rejected: Vec<String>,
}

/// LL(1) table detached from the grammar it was built from. Bodies are stored
/// by symbol name; the empty body is `ε`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LL1ParsingTable {
    start_symbol: String,
    terminals: Vec<String>,
    non_terminals: Vec<String>,
    rows: Vec<Vec<Option<Vec<String>>>>,
    #[serde(skip)]
    conflicted: HashSet<(usize, usize)>,
}

impl LL1ParsingTable {
    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    /// Column labels, with `$` last.
    pub fn terminals(&self) -> &[String] {
        &self.terminals
    }

    pub fn non_terminals(&self) -> &[String] {
        &self.non_terminals
    }

    pub fn is_non_terminal(&self, name: &str) -> bool {
        self.non_terminals.iter().any(|nt| nt == name)
    }

    pub fn get(&self, non_terminal: &str, terminal: &str) -> Option<&[String]> {
        let row = self.non_terminals.iter().position(|nt| nt == non_terminal)?;
        let col = self.terminals.iter().position(|t| t == terminal)?;
        self.rows[row][col].as_deref()
    }

    /// Writes `body` into an empty cell, or reports a conflict if the cell
    /// already holds a different body.
    fn insert(&mut self, row: usize, col: usize, body: Vec<String>) -> Option<Conflict> {
        if let Some(existing) = &self.rows[row][col] {
            if *existing == body {
                return None;
            }
            let conflict = Conflict {
                non_terminal: self.non_terminals[row].clone(),
                terminal: self.terminals[col].clone(),
                existing: existing.clone(),
                rejected: body,
            };
            self.conflicted.insert((row, col));
            return Some(conflict);
        }

        self.rows[row][col] = Some(body);
        None
    }

    fn cell_output(&self, row: usize, col: usize) -> ProductionOutput<'_> {
        let left = self.non_terminals[row].as_str();
        let rights = match &self.rows[row][col] {
            Some(body) if body.is_empty() => vec![vec![EPSILON]],
            Some(body) => vec![body.iter().map(|s| s.as_str()).collect()],
            None => Vec::new(),
        };
        ProductionOutput { left, rights }
    }

    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().cloned());
        let mut output: Vec<Vec<String>> = vec![header];
        for (i, left) in self.non_terminals.iter().enumerate() {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend((0..self.terminals.len()).map(|j| {
                let cell = self.cell_output(i, j).to_plaintext(0, false);
                if self.conflicted.contains(&(i, j)) {
                    format!("{} (!)", cell)
                } else {
                    cell
                }
            }));
            output.push(line);
        }

        align_columns(&output)
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|t| format!("\\text{{{}}}", escape_tex(t.as_str()))),
        );
        let header = header.join(" & ");

        let mut output: Vec<String> = Vec::new();
        for (i, left) in self.non_terminals.iter().enumerate() {
            let mut line: Vec<String> = vec![escape_tex(left.as_str()).to_string()];
            line.extend((0..self.terminals.len()).map(|j| {
                let cell = self.cell_output(i, j).to_latex(false);
                if self.conflicted.contains(&(i, j)) {
                    format!("{{\\color{{red}}{}}}", cell)
                } else {
                    cell
                }
            }));
            output.push(line.join(" & "));
        }

        let output = output.join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }
}

impl Conflict {
    pub fn to_plaintext(&self) -> String {
        let body = |b: &Vec<String>| {
            if b.is_empty() {
                EPSILON.to_string()
            } else {
                b.join(" ")
            }
        };
        format!(
            "conflict at [{}, {}]: {} -> {} | {} -> {}",
            self.non_terminal,
            self.terminal,
            self.non_terminal,
            body(&self.existing),
            self.non_terminal,
            body(&self.rejected)
        )
    }
}

impl Grammar {
    /// Builds the LL(1) table. Conflicting writes keep the first body and are
    /// returned alongside the table instead of aborting construction.
    pub fn generate_ll1_parsing_table(
        &self,
        first: &FirstSets,
        follow: &FollowSets,
    ) -> (LL1ParsingTable, Vec<Conflict>) {
        let mut terminals: Vec<usize> = self
            .terminal_iter()
            .filter_map(|t| self.get_symbol_index(t))
            .collect();
        terminals.push(END_MARK_INDEX);
        let map: HashMap<usize, usize> = terminals
            .iter()
            .enumerate()
            .map(|(i, idx)| (*idx, i))
            .collect();

        let mut table = LL1ParsingTable {
            start_symbol: self.start_symbol_name().to_string(),
            terminals: terminals
                .iter()
                .map(|idx| self.get_symbol_name(*idx).to_string())
                .collect(),
            non_terminals: self.non_terminal_iter().map(|nt| nt.name.clone()).collect(),
            rows: vec![vec![None; terminals.len()]; self.non_terminal_iter().count()],
            conflicted: HashSet::new(),
        };

        let mut conflicts = Vec::new();
        for (row, nt) in self.non_terminal_iter().enumerate() {
            for production in &nt.productions {
                let production_first = self.calculate_first_for_production(first, production);

                let mut cols: Vec<usize> = production_first
                    .iter()
                    .filter(|&&idx| idx != EPSILON_INDEX)
                    .filter_map(|idx| map.get(idx).cloned())
                    .collect();
                if production_first.contains(&EPSILON_INDEX) {
                    if let Some(nt_follow) = follow.get(nt.index) {
                        cols.extend(nt_follow.iter().filter_map(|idx| map.get(idx).cloned()));
                    }
                }
                cols.sort_unstable();
                cols.dedup();

                let body: Vec<String> = production
                    .iter()
                    .map(|idx| self.get_symbol_name(*idx).to_string())
                    .collect();
                for col in cols {
                    if let Some(conflict) = table.insert(row, col, body.clone()) {
                        warn!("grammar is not LL(1): {}", conflict.to_plaintext());
                        conflicts.push(conflict);
                    }
                }
            }
        }

        (table, conflicts)
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::{Grammar, END_MARK};

    fn table_for(text: &str) -> (crate::grammar::LL1ParsingTable, Vec<crate::grammar::Conflict>) {
        let g = Grammar::parse(text).unwrap();
        let first = g.calculate_first();
        let follow = g.calculate_follow(&first);
        g.generate_ll1_parsing_table(&first, &follow)
    }

    #[test]
    fn expression_table() {
        let (table, conflicts) = table_for(
            "E -> T E'\nE' -> + T E' | ε\nT -> F T'\nT' -> * F T' | ε\nF -> ( E ) | id",
        );
        assert!(conflicts.is_empty());
        assert_eq!(table.get("F", "id").unwrap(), ["id"]);
        assert!(table.get("T'", "+").unwrap().is_empty());
        assert!(table.get("E'", END_MARK).unwrap().is_empty());
        assert_eq!(table.get("E", "(").unwrap(), ["T", "E'"]);
        assert!(table.get("E", "+").is_none());
        assert_eq!(table.terminals().last().unwrap(), END_MARK);
        assert_eq!(table.start_symbol(), "E");
    }

    #[test]
    fn conflict_keeps_first_writer() {
        let (table, conflicts) = table_for("S -> a b | a c");
        assert_eq!(table.get("S", "a").unwrap(), ["a", "b"]);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].non_terminal, "S");
        assert_eq!(conflicts[0].terminal, "a");
        assert_eq!(conflicts[0].existing, ["a", "b"]);
        assert_eq!(conflicts[0].rejected, ["a", "c"]);
        assert!(table.to_plaintext().contains("(!)"));
        assert!(table.to_latex().contains("\\color{red}"));
    }

    #[test]
    fn epsilon_follow_conflict() {
        // FIRST(A -> a) and FOLLOW(A) both contain `a`.
        let (_, conflicts) = table_for("S -> A a\nA -> a | ε");
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].existing, ["a"]);
        assert!(conflicts[0].rejected.is_empty());
    }

    #[test]
    fn duplicate_alternative_is_not_a_conflict() {
        let (_, conflicts) = table_for("S -> a | a");
        assert!(conflicts.is_empty());
    }

    #[test]
    fn plaintext_lists_every_row() {
        let (table, _) = table_for("S -> ( S ) S | ε");
        let text = table.to_plaintext();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("S -> ( S ) S"));
        assert!(text.contains("S -> ε"));
    }
}
