use crowbook_text_processing::escape;
use serde::Serialize;

use super::{Analysis, Grammar, EPSILON};

/// Right-aligns every column and joins cells with ` | `.
pub(crate) fn align_columns(output: &[Vec<String>]) -> String {
    let columns = output.iter().map(|line| line.len()).max().unwrap_or(0);
    let width: Vec<usize> = (0..columns)
        .map(|j| {
            output
                .iter()
                .filter_map(|line| line.get(j))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    output
        .iter()
        .map(|line| {
            line.iter()
                .enumerate()
                .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A head with its alternatives, as names. An empty `rights` renders as
/// nothing; an `ε` body is spelled out by the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    pub rights: Vec<Vec<&'a str>>,
}

impl ProductionOutput<'_> {
    /// `left` is right-aligned to `left_width`. In multiline mode every
    /// alternative after the first gets its own line with `|` under `->`.
    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        if self.rights.is_empty() {
            return String::new();
        }
        let separator = if multiline {
            format!("\n{}  | ", " ".repeat(left_width))
        } else {
            " | ".to_string()
        };
        let bodies: Vec<String> = self.rights.iter().map(|right| right.join(" ")).collect();
        format!(
            "{:>width$} -> {}",
            self.left,
            bodies.join(&separator),
            width = left_width
        )
    }

    /// With `and_sign` the head, arrow and bodies become three `array` columns.
    pub fn to_latex(&self, and_sign: bool) -> String {
        if self.rights.is_empty() {
            return String::new();
        }
        let tex_symbol = |s: &str| match s {
            EPSILON => "\\epsilon".to_string(),
            s => escape::tex(s).to_string(),
        };
        let bodies: Vec<String> = self
            .rights
            .iter()
            .map(|right| {
                let symbols: Vec<String> = right.iter().map(|s| tex_symbol(*s)).collect();
                symbols.join(" \\ ")
            })
            .collect();
        let arrow = if and_sign { " & \\rightarrow &" } else { " \\rightarrow " };
        format!("{}{}{}", tex_symbol(self.left), arrow, bodies.join(" \\mid "))
    }
}

#[derive(Debug, Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
}

impl ProductionOutputVec<'_> {
    fn render(&self, left_width: usize, multiline: bool) -> String {
        let lines: Vec<String> = self
            .productions
            .iter()
            .map(|p| p.to_plaintext(left_width, multiline))
            .collect();
        lines.join("\n")
    }

    pub fn to_plaintext(&self) -> String {
        let left_width = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        self.render(left_width, true)
    }

    /// One `HEAD -> BODY | BODY` line per head; this is the grammar text
    /// format accepted by [`Grammar::parse`].
    pub fn to_grammar_text(&self) -> String {
        self.render(0, false)
    }

    pub fn to_latex(&self) -> String {
        let rows: Vec<String> = self.productions.iter().map(|p| p.to_latex(true)).collect();
        format!(
            "\\[\\begin{{array}}{{cll}}\\\\\n{}\\\\\n\\end{{array}}\\]",
            rows.join("\\\\\n")
        )
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = self
            .non_terminal_iter()
            .map(|non_terminal| ProductionOutput {
                left: non_terminal.name.as_str(),
                rights: non_terminal
                    .productions
                    .iter()
                    .map(|production| self.production_to_vec_str(production))
                    .collect(),
            })
            .collect();
        ProductionOutputVec { productions }
    }
}

#[derive(Debug, Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<&'a str>,
    follow: Vec<&'a str>,
}

impl NonTerminalOutput<'_> {
    fn to_plaintext(&self) -> Vec<String> {
        vec![
            self.name.to_string(),
            self.nullable.to_string(),
            self.first.join(", "),
            self.follow.join(", "),
        ]
    }

    fn to_latex(&self) -> String {
        fn f(a: &[&str]) -> String {
            a.iter()
                .map(|s| escape::tex(*s))
                .collect::<Vec<_>>()
                .join(r"\ ")
                .replace(EPSILON, r"$\epsilon$")
        }

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Debug, Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl NonTerminalOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut output = vec![vec![
            "Symbol".to_string(),
            "Nullable".to_string(),
            "First".to_string(),
            "Follow".to_string(),
        ]];
        output.extend(self.data.iter().map(|s| s.to_plaintext()));
        align_columns(&output)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl Analysis<'_> {
    pub fn to_non_terminal_output_vec(&self) -> NonTerminalOutputVec {
        let g = self.grammar;
        let data = g
            .non_terminal_iter()
            .map(|non_terminal| {
                let name = non_terminal.name.as_str();
                let first = self.first.names(g, name).unwrap_or_default();
                NonTerminalOutput {
                    name,
                    nullable: first.contains(&EPSILON),
                    first,
                    follow: self.follow.names(g, name).unwrap_or_default(),
                }
            })
            .collect();
        NonTerminalOutputVec { data }
    }
}
