use crowbook_text_processing::escape;
use log::{debug, trace};
use serde::Serialize;

use super::{pretty_print::align_columns, LL1ParsingTable, END_MARK, EPSILON};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseAction {
    /// The terminal on top of the stack equals the lookahead.
    Match { terminal: String },
    /// The non-terminal on top of the stack is replaced by `body`.
    Expand {
        non_terminal: String,
        body: Vec<String>,
    },
    Accept,
    Reject,
}

/// A parser configuration and the action taken from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseStep {
    /// Bottom first; the last element is the top.
    pub stack: Vec<String>,
    /// Unconsumed input including the trailing `$`.
    pub remaining: Vec<String>,
    pub action: ParseAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    pub accepted: bool,
    pub trace: Vec<ParseStep>,
}

impl LL1ParsingTable {
    /// Runs the predictive parser on whitespace-separated `input`.
    ///
    /// The stack starts as `$ S`. Input is accepted only when the stack is
    /// empty and every token, `$` included, has been consumed. A non-terminal
    /// that would expand into itself again before the next match (left
    /// recursion left in a conflicted table) rejects the input.
    pub fn parse(&self, input: &str) -> ParseResult {
        let input: Vec<String> = input
            .split_whitespace()
            .map(str::to_string)
            .chain(std::iter::once(END_MARK.to_string()))
            .collect();
        let mut stack: Vec<String> = vec![END_MARK.to_string(), self.start_symbol().to_string()];
        // Parallel to `stack`: the cursor a slot was pushed at and the
        // non-terminals expanded to produce it without consuming input.
        let mut origins: Vec<(usize, Vec<String>)> = vec![(0, Vec::new()), (0, Vec::new())];
        let mut cursor = 0;
        let mut trace: Vec<ParseStep> = Vec::new();

        let step = |stack: &Vec<String>, cursor: usize, action: ParseAction| ParseStep {
            stack: stack.clone(),
            remaining: input[cursor..].to_vec(),
            action,
        };

        let accepted = loop {
            let top = match stack.last() {
                Some(top) => top.clone(),
                None => break cursor == input.len(),
            };
            let current = match input.get(cursor) {
                Some(current) => current,
                None => break false,
            };

            if !self.is_non_terminal(&top) && top == *current {
                trace!("match {}", top);
                trace.push(step(&stack, cursor, ParseAction::Match { terminal: top }));
                stack.pop();
                origins.pop();
                cursor += 1;
            } else if let Some(body) = self.get(&top, current) {
                let mut chain = match origins.last() {
                    Some((at, chain)) if *at == cursor => chain.clone(),
                    _ => Vec::new(),
                };
                if chain.contains(&top) {
                    debug!("{} derives itself on {} without consuming input", top, current);
                    break false;
                }
                chain.push(top.clone());

                trace!("expand {} on {}", top, current);
                trace.push(step(
                    &stack,
                    cursor,
                    ParseAction::Expand {
                        non_terminal: top,
                        body: body.to_vec(),
                    },
                ));
                stack.pop();
                origins.pop();
                for symbol in body.iter().rev() {
                    stack.push(symbol.clone());
                    origins.push((cursor, chain.clone()));
                }
            } else {
                trace!("no entry for [{}, {}]", top, current);
                break false;
            }
        };

        let action = if accepted {
            ParseAction::Accept
        } else {
            ParseAction::Reject
        };
        trace.push(step(&stack, cursor, action));

        ParseResult { accepted, trace }
    }
}

impl ParseAction {
    pub fn to_plaintext(&self) -> String {
        match self {
            ParseAction::Match { terminal } => format!("match {}", terminal),
            ParseAction::Expand { non_terminal, body } => {
                let body = if body.is_empty() {
                    EPSILON.to_string()
                } else {
                    body.join(" ")
                };
                format!("{} -> {}", non_terminal, body)
            }
            ParseAction::Accept => "accept".to_string(),
            ParseAction::Reject => "reject".to_string(),
        }
    }
}

impl ParseResult {
    pub fn to_plaintext(&self) -> String {
        let mut output: Vec<Vec<String>> = vec![vec![
            "Stack".to_string(),
            "Input".to_string(),
            "Action".to_string(),
        ]];
        output.extend(self.trace.iter().map(|step| {
            vec![
                step.stack.join(" "),
                step.remaining.join(" "),
                step.action.to_plaintext(),
            ]
        }));

        align_columns(&output)
    }

    pub fn to_latex(&self) -> String {
        let f = |symbols: &[String]| {
            symbols
                .iter()
                .map(|s| escape::tex(s.as_str()).to_string())
                .collect::<Vec<_>>()
                .join(r"\ ")
        };
        let content = self
            .trace
            .iter()
            .map(|step| {
                format!(
                    "{} & {} & {}",
                    f(&step.stack),
                    f(&step.remaining),
                    escape::tex(step.action.to_plaintext())
                        .replace("->", r"$\rightarrow$")
                        .replace(EPSILON, r"$\epsilon$")
                )
            })
            .collect::<Vec<_>>()
            .join("\\\\\n");

        "\\begin{tabular}{r|r|l}\n".to_string()
            + "Stack & Input & Action\\\\\\hline\n"
            + &content
            + "\n\\end{tabular}"
    }
}
