extern crate wasm_bindgen;

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod grammar;
pub use grammar::{
    Analysis, Conflict, Grammar, GrammarError, LL1ParsingTable, ParseAction, ParseResult,
    ParseStep,
};

/// Rewrites grammar text without immediate left recursion and renders the
/// result back to the same text format.
pub fn eliminate_left_recursion(grammar: &str) -> Result<String, GrammarError> {
    let g = Grammar::parse(grammar)?.eliminate_left_recursion();
    Ok(g.to_production_output_vec().to_grammar_text())
}

pub fn analyze(grammar: &Grammar) -> Analysis<'_> {
    grammar.analyze()
}

pub fn parse(table: &LL1ParsingTable, input: &str) -> ParseResult {
    table.parse(input)
}

fn error_to_json(e: impl ToString) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| error_to_json(e))
}

#[wasm_bindgen]
pub fn eliminate_left_recursion_to_json(grammar: &str) -> String {
    match eliminate_left_recursion(grammar) {
        Ok(text) => serde_json::json!({ "grammar": text }).to_string(),
        Err(e) => error_to_json(e),
    }
}

#[wasm_bindgen]
pub fn analyze_to_json(grammar: &str) -> String {
    match Grammar::parse(grammar) {
        Ok(g) => {
            let g = g.eliminate_left_recursion();
            to_json(&g.analyze().to_output())
        }
        Err(e) => error_to_json(e),
    }
}

#[wasm_bindgen]
pub fn parse_to_json(grammar: &str, input: &str) -> String {
    match Grammar::parse(grammar) {
        Ok(g) => {
            let g = g.eliminate_left_recursion();
            to_json(&g.analyze().parse(input))
        }
        Err(e) => error_to_json(e),
    }
}
