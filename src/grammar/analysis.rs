use serde::Serialize;

use super::{
    pretty_print::{NonTerminalOutputVec, ProductionOutputVec},
    Conflict, FirstSets, FollowSets, Grammar, LL1ParsingTable, ParseResult,
};

/// Everything derived from one grammar: FIRST and FOLLOW sets, the LL(1)
/// table and the conflicts found while filling it.
#[derive(Debug, Clone)]
pub struct Analysis<'a> {
    pub grammar: &'a Grammar,
    pub first: FirstSets,
    pub follow: FollowSets,
    pub table: LL1ParsingTable,
    pub conflicts: Vec<Conflict>,
}

impl Analysis<'_> {
    pub fn is_ll1(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn parse(&self, input: &str) -> ParseResult {
        self.table.parse(input)
    }

    pub fn to_output(&self) -> AnalysisOutput {
        AnalysisOutput {
            start_symbol: self.grammar.start_symbol_name(),
            productions: self.grammar.to_production_output_vec(),
            first_follow: self.to_non_terminal_output_vec(),
            table: &self.table,
            conflicts: &self.conflicts,
        }
    }
}

/// Serializable view of an [`Analysis`].
#[derive(Debug, Serialize)]
pub struct AnalysisOutput<'a> {
    pub start_symbol: &'a str,
    pub productions: ProductionOutputVec<'a>,
    pub first_follow: NonTerminalOutputVec<'a>,
    pub table: &'a LL1ParsingTable,
    pub conflicts: &'a [Conflict],
}

impl Grammar {
    pub fn analyze(&self) -> Analysis<'_> {
        let first = self.calculate_first();
        let follow = self.calculate_follow(&first);
        let (table, conflicts) = self.generate_ll1_parsing_table(&first, &follow);
        Analysis {
            grammar: self,
            first,
            follow,
            table,
            conflicts,
        }
    }
}
