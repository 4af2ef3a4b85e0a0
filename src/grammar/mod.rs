pub mod analysis;
pub mod eliminate_left_recursion;
pub mod error;
pub mod first_follow;
pub mod grammar;
pub mod ll1_parser;
pub mod ll1_parsing_table;
pub mod parse;
pub mod pretty_print;

pub use analysis::Analysis;
pub use error::GrammarError;
pub use first_follow::{FirstSets, FollowSets, SymbolSets};
pub use grammar::Grammar;
pub use ll1_parser::{ParseAction, ParseResult, ParseStep};
pub use ll1_parsing_table::{Conflict, LL1ParsingTable};

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "$";

/// Spellings of the empty string accepted in grammar text.
pub const EPSILON_ALIASES: [&str; 3] = ["ε", "ϵ", "epsilon"];

/// Every grammar reserves these two symbol slots before anything else.
pub const EPSILON_INDEX: usize = 0;
pub const END_MARK_INDEX: usize = 1;

pub fn is_epsilon(token: &str) -> bool {
    EPSILON_ALIASES.contains(&token)
}
