use thiserror::Error;

/// Failures while turning grammar text into a [`Grammar`](super::Grammar).
///
/// LL(1) conflicts and rejected parses are ordinary results and are not
/// represented here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// A line that is not of the form `HEAD -> BODY (| BODY)*`.
    #[error("Line {line}: {reason}")]
    MalformedProduction { line: usize, reason: String },

    /// The text holds no production, so there is no start symbol.
    #[error("grammar contains no productions")]
    EmptyGrammar,
}

impl GrammarError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        GrammarError::MalformedProduction {
            line,
            reason: reason.into(),
        }
    }
}
