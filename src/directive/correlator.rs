use serde::{Deserialize, Serialize};
use tracing::warn;

use super::extractor::extract;
use crate::chart::ChartEntry;
use crate::diagnostics::Diagnostic;
use crate::error::CorrelationError;

/// How a directive without a matching chart entry is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMode {
    /// Keep the placeholder, skip the chart, record a diagnostic.
    #[default]
    Lenient,
    /// Any count mismatch between directives and chart entries is an error.
    Strict,
}

/// Marker substituted for the Nth directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub id: String,
    pub ordinal: usize,
}

impl Placeholder {
    #[must_use]
    pub fn new(ordinal: usize) -> Self {
        Self {
            id: format!("chart-placeholder-{ordinal}"),
            ordinal,
        }
    }

    /// HTML container the markdown engine must pass through untouched.
    #[must_use]
    pub fn marker(&self) -> String {
        format!("<div id=\"{}\" class=\"chart-render-target\"></div>", self.id)
    }

    /// Id of the canvas created inside the placeholder.
    #[must_use]
    pub fn canvas_id(&self) -> String {
        format!("chart-canvas-{}", self.ordinal)
    }
}

/// A chart to render: the placeholder it belongs to and its authoritative data.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartJob<'a> {
    pub placeholder: Placeholder,
    pub entry: &'a ChartEntry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Correlation<'a> {
    /// Report markdown with every directive replaced by its placeholder marker.
    pub markdown: String,
    /// Jobs in directive order.
    pub jobs: Vec<ChartJob<'a>>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Pair each directive in `markdown` with `charts[ordinal]` and rewrite the
/// directive span into its placeholder marker.
pub fn correlate<'a>(
    markdown: &str,
    charts: &'a [ChartEntry],
    mode: CorrelationMode,
) -> Result<Correlation<'a>, CorrelationError> {
    let mut rewritten = String::with_capacity(markdown.len());
    let mut jobs = Vec::new();
    let mut diagnostics = Vec::new();
    let mut cursor = 0;
    let mut directives = 0;

    for directive in extract(markdown) {
        let placeholder = Placeholder::new(directive.ordinal);
        rewritten.push_str(&markdown[cursor..directive.span.start]);
        rewritten.push_str(&placeholder.marker());
        cursor = directive.span.end;
        directives += 1;

        match charts.get(directive.ordinal) {
            Some(entry) => jobs.push(ChartJob { placeholder, entry }),
            None => {
                warn!(
                    "Could not find parsed chart data for directive: {}",
                    directive.text
                );
                diagnostics.push(Diagnostic::MissingChartData {
                    placeholder_id: placeholder.id,
                    directive: directive.text.to_string(),
                });
            }
        }
    }
    rewritten.push_str(&markdown[cursor..]);

    if directives != charts.len() {
        if mode == CorrelationMode::Strict {
            return Err(CorrelationError::Mismatch {
                directives,
                charts: charts.len(),
            });
        }
        if charts.len() > directives {
            warn!(
                "{} chart entr(ies) supplied for {directives} directive(s)",
                charts.len()
            );
            diagnostics.push(Diagnostic::SurplusChartData {
                directives,
                charts: charts.len(),
            });
        }
    }

    Ok(Correlation {
        markdown: rewritten,
        jobs,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartSpec, Dataset};

    fn chart(title: &str) -> ChartEntry {
        ChartEntry::Spec(ChartSpec {
            chart_type: "bar".into(),
            title: Some(title.into()),
            labels: vec!["a".into()],
            datasets: vec![Dataset {
                label: None,
                data: vec![1.0],
                background_color: None,
                border_color: None,
            }],
            source: None,
        })
    }

    fn directive(title: &str) -> String {
        format!(r#"CHART_DATA: TYPE=bar TITLE="{title}" LABELS=["a"] DATA=[1]"#)
    }

    #[test]
    fn test_zero_directives() {
        let out = correlate("# Title\n\nNo charts here.", &[], CorrelationMode::Lenient).unwrap();
        assert!(out.jobs.is_empty());
        assert!(out.diagnostics.is_empty());
        assert_eq!(out.markdown, "# Title\n\nNo charts here.");
    }

    #[test]
    fn test_ordinals_follow_text_order() {
        let text = format!("{}\n\nmiddle\n\n{}\n\nend {}", directive("A"), directive("B"), directive("C"));
        let charts = vec![chart("A"), chart("B"), chart("C")];
        let out = correlate(&text, &charts, CorrelationMode::Lenient).unwrap();

        assert_eq!(out.jobs.len(), 3);
        for (i, job) in out.jobs.iter().enumerate() {
            assert_eq!(job.placeholder.ordinal, i);
            assert_eq!(job.placeholder.id, format!("chart-placeholder-{i}"));
            assert!(std::ptr::eq(job.entry, &charts[i]));
        }
        assert_eq!(
            out.markdown,
            format!(
                "{}\n\nmiddle\n\n{}\n\nend {}",
                Placeholder::new(0).marker(),
                Placeholder::new(1).marker(),
                Placeholder::new(2).marker()
            )
        );
        assert!(!out.markdown.contains("CHART_DATA"));
    }

    #[test]
    fn test_identical_directives_replace_their_own_span() {
        let d = directive("Same");
        let text = format!("one {d} two {d} three");
        let charts = vec![chart("Same"), chart("Same")];
        let out = correlate(&text, &charts, CorrelationMode::Lenient).unwrap();
        assert_eq!(
            out.markdown,
            format!(
                "one {} two {} three",
                Placeholder::new(0).marker(),
                Placeholder::new(1).marker()
            )
        );
    }

    #[test]
    fn test_missing_chart_data_is_dropped_with_diagnostic() {
        let text = format!("{} {} {}", directive("A"), directive("B"), directive("C"));
        let charts = vec![chart("A")];
        let out = correlate(&text, &charts, CorrelationMode::Lenient).unwrap();

        assert_eq!(out.jobs.len(), 1);
        assert_eq!(out.jobs[0].placeholder.ordinal, 0);
        // Placeholders stay in the markdown even without a job.
        assert!(out.markdown.contains(&Placeholder::new(2).marker()));
        assert_eq!(out.diagnostics.len(), 2);
        assert!(matches!(
            &out.diagnostics[0],
            Diagnostic::MissingChartData { placeholder_id, .. } if placeholder_id == "chart-placeholder-1"
        ));
    }

    #[test]
    fn test_surplus_charts_recorded() {
        let text = directive("A");
        let charts = vec![chart("A"), chart("B")];
        let out = correlate(&text, &charts, CorrelationMode::Lenient).unwrap();
        assert_eq!(out.jobs.len(), 1);
        assert_eq!(
            out.diagnostics,
            vec![Diagnostic::SurplusChartData {
                directives: 1,
                charts: 2
            }]
        );
    }

    #[test]
    fn test_strict_mode_rejects_mismatch() {
        let text = format!("{} {}", directive("A"), directive("B"));
        let charts = vec![chart("A")];
        let err = correlate(&text, &charts, CorrelationMode::Strict).unwrap_err();
        assert_eq!(
            err,
            CorrelationError::Mismatch {
                directives: 2,
                charts: 1
            }
        );

        let charts = vec![chart("A"), chart("B")];
        assert!(correlate(&text, &charts, CorrelationMode::Strict).is_ok());
    }
}
