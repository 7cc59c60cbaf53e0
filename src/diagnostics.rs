//! Non-fatal findings recorded while rendering a report.

use std::fmt;

/// Something the pipeline noticed and worked around.
///
/// Every diagnostic is also emitted through `tracing` at the point it is
/// recorded; the collected list lets callers and tests inspect them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A directive had no `charts` entry at its ordinal.
    MissingChartData {
        placeholder_id: String,
        directive: String,
    },
    /// More `charts` entries than directives in the report body.
    SurplusChartData { directives: usize, charts: usize },
    /// The markdown engine dropped or altered a placeholder's container.
    PlaceholderNotFound { placeholder_id: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingChartData { directive, .. } => {
                write!(f, "Could not find parsed chart data for directive: {directive}")
            }
            Self::SurplusChartData { directives, charts } => write!(
                f,
                "{charts} chart entr(ies) supplied for {directives} directive(s); extras ignored"
            ),
            Self::PlaceholderNotFound { placeholder_id } => write!(
                f,
                "Placeholder element {placeholder_id} not found after Markdown rendering."
            ),
        }
    }
}
