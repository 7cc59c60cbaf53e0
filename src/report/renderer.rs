use tracing::{error, info, warn};

use super::{ERROR_SENTINEL, Report};
use crate::chart::{ChartEngine, ChartInstance, ChartMaterializer};
use crate::diagnostics::Diagnostic;
use crate::directive::{CorrelationMode, correlate};
use crate::error::{ChartError, RenderError};
use crate::markdown::MarkdownEngine;
use crate::surface::{ReportSurface, error_block};

pub const INVALID_REPORT_MESSAGE: &str = "Received invalid report data from the server.";

/// Chart instances belonging to the report currently on display.
#[derive(Debug, Default)]
pub struct RenderState {
    instances: Vec<ChartInstance>,
}

impl RenderState {
    /// Destroy every owned chart. Idempotent.
    pub fn teardown(&mut self) {
        for instance in &mut self.instances {
            instance.destroy();
        }
        self.instances.clear();
    }

    #[must_use]
    pub fn instances(&self) -> &[ChartInstance] {
        &self.instances
    }
}

impl Drop for RenderState {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// What happened while rendering one report.
#[derive(Debug, Default)]
pub struct RenderSummary {
    /// The body carried the upstream error sentinel and was shown verbatim.
    pub upstream_error: bool,
    /// Charts instantiated successfully.
    pub rendered: usize,
    /// Charts that failed, by placeholder id. Each was replaced by an inline
    /// error message.
    pub failed: Vec<(String, ChartError)>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Turns a report into markup on a surface and materializes its charts.
pub struct ReportRenderer {
    markdown: Box<dyn MarkdownEngine>,
    charts: Box<dyn ChartEngine>,
    mode: CorrelationMode,
}

impl ReportRenderer {
    pub fn new(
        markdown: Box<dyn MarkdownEngine>,
        charts: Box<dyn ChartEngine>,
        mode: CorrelationMode,
    ) -> Self {
        Self {
            markdown,
            charts,
            mode,
        }
    }

    /// The markdown engine, shared with follow-up answers.
    #[must_use]
    pub fn markdown(&self) -> &dyn MarkdownEngine {
        self.markdown.as_ref()
    }

    /// Render `report` onto `surface`, replacing whatever `state` held.
    ///
    /// The surface is only revealed once every chart job has been attempted.
    /// Individual chart failures are reported in the summary, never as `Err`.
    pub fn render(
        &mut self,
        report: &Report,
        state: &mut RenderState,
        surface: &mut ReportSurface,
    ) -> Result<RenderSummary, RenderError> {
        let (Some(area), Some(body)) = (report.area_name(), report.full_report_markdown.as_deref())
        else {
            error!("Rejecting report payload without area_name or full_report_markdown");
            surface.set_error(INVALID_REPORT_MESSAGE);
            surface.hide();
            return Err(RenderError::InvalidReport);
        };

        surface.set_title(format!("Comprehensive Health Analysis Report for: {area}"));
        state.teardown();
        surface.clear_content();

        if body.starts_with(ERROR_SENTINEL) {
            warn!("Report generation failed upstream for {area}");
            surface.set_markup(error_block("Report Generation Error", body));
            surface.show();
            return Ok(RenderSummary {
                upstream_error: true,
                ..RenderSummary::default()
            });
        }

        let correlation = match correlate(body, &report.charts, self.mode) {
            Ok(c) => c,
            Err(e) => {
                error!("Report for {area} rejected: {e}");
                surface.set_error(format!("Failed to render report: {e}"));
                surface.hide();
                return Err(e.into());
            }
        };

        surface.set_markup(self.markdown.to_markup(&correlation.markdown));

        let mut summary = RenderSummary {
            diagnostics: correlation.diagnostics,
            ..RenderSummary::default()
        };

        let mut materializer = ChartMaterializer::new(self.charts.as_mut());
        for job in &correlation.jobs {
            let id = &job.placeholder.id;
            if !surface.has_placeholder(id) {
                warn!("Placeholder element {id} not found in rendered markup");
                summary.diagnostics.push(Diagnostic::PlaceholderNotFound {
                    placeholder_id: id.clone(),
                });
                continue;
            }

            match materializer.materialize(surface, &job.placeholder, job.entry, job.placeholder.ordinal) {
                Ok(instance) => {
                    state.instances.push(instance);
                    summary.rendered += 1;
                }
                Err(e) => summary.failed.push((id.clone(), e)),
            }
        }

        surface.show();
        info!(
            "Rendered report for {area}: {} chart(s), {} failed, {} diagnostic(s)",
            summary.rendered,
            summary.failed.len(),
            summary.diagnostics.len()
        );
        Ok(summary)
    }
}
