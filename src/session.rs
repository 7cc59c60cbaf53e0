/// Session controller: request lifecycle, control locking and error surfacing.
///
/// Owns the current report, its chart instances and the display surfaces.
/// Everything runs on one task; the only concurrency control is disabling a
/// request's trigger and input while that request is in flight.
use std::cell::Cell;
use std::rc::Rc;

use tracing::{error, info};

use crate::chart::ChartInstance;
use crate::client::{AskRequest, ReportService};
use crate::error::SessionError;
use crate::markdown::render_or_unavailable;
use crate::report::{RenderState, RenderSummary, Report, ReportRenderer};
use crate::surface::ReportSurface;

pub const EMPTY_AREA_MESSAGE: &str = "Please enter a geographical area.";
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a follow-up question.";
pub const NO_CONTEXT_MESSAGE: &str =
    "No report context available for follow-up. Please generate a report first.";

// ── Controls ─────────────────────────────────────────────────────────

/// A trigger button plus its input field. Disabled while a request runs.
#[derive(Debug, Clone, Default)]
pub struct Control {
    disabled: Rc<Cell<bool>>,
}

/// Re-enables its control when dropped.
#[derive(Debug)]
pub struct ControlGuard {
    disabled: Rc<Cell<bool>>,
}

impl Control {
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    /// Disable the control until the returned guard is dropped.
    pub fn lock(&self) -> Result<ControlGuard, SessionError> {
        if self.disabled.replace(true) {
            return Err(SessionError::Busy);
        }
        Ok(ControlGuard {
            disabled: Rc::clone(&self.disabled),
        })
    }
}

impl Drop for ControlGuard {
    fn drop(&mut self) {
        self.disabled.set(false);
    }
}

// ── Follow-up pane ───────────────────────────────────────────────────

#[derive(Debug, Default, Clone)]
pub struct FollowUpPane {
    pub question: String,
    answer_html: String,
    error: Option<String>,
}

impl FollowUpPane {
    #[must_use]
    pub fn answer_html(&self) -> &str {
        &self.answer_html
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn reset(&mut self) {
        self.question.clear();
        self.answer_html.clear();
        self.error = None;
    }
}

// ── Controller ───────────────────────────────────────────────────────

pub struct SessionController<S: ReportService> {
    service: S,
    renderer: ReportRenderer,
    current: Option<Report>,
    charts: RenderState,
    surface: ReportSurface,
    follow_up: FollowUpPane,
    research_control: Control,
    follow_up_control: Control,
}

impl<S: ReportService> SessionController<S> {
    pub fn new(service: S, renderer: ReportRenderer) -> Self {
        Self {
            service,
            renderer,
            current: None,
            charts: RenderState::default(),
            surface: ReportSurface::default(),
            follow_up: FollowUpPane::default(),
            research_control: Control::default(),
            follow_up_control: Control::default(),
        }
    }

    /// Request and render a report for `area`.
    ///
    /// Every error is also written to the surface's inline error slot.
    pub async fn submit_research(&mut self, area: &str) -> Result<RenderSummary, SessionError> {
        if self.research_control.is_disabled() {
            return Err(SessionError::Busy);
        }

        let area = area.trim();
        if area.is_empty() {
            self.surface.set_error(EMPTY_AREA_MESSAGE);
            return Err(SessionError::Validation(EMPTY_AREA_MESSAGE.to_string()));
        }

        self.surface.clear_error();
        self.surface.hide();
        self.surface.clear_content();
        self.charts.teardown();
        self.follow_up.reset();
        self.current = None;

        let _guard = self.research_control.lock()?;
        info!("Requesting health report for {area}");

        let report = match self.service.research(area).await {
            Ok(report) => report,
            Err(e) => {
                error!("Research error: {e}");
                self.surface
                    .set_error(format!("Failed to generate health report: {e}"));
                return Err(e.into());
            }
        };

        let rendered = self
            .renderer
            .render(&report, &mut self.charts, &mut self.surface);
        self.current = Some(report);
        Ok(rendered?)
    }

    /// Ask a follow-up question about the current report.
    pub async fn submit_follow_up(&mut self, question: &str) -> Result<(), SessionError> {
        if self.follow_up_control.is_disabled() {
            return Err(SessionError::Busy);
        }

        self.follow_up.question = question.to_string();
        let question = question.trim();
        if question.is_empty() {
            self.follow_up.error = Some(EMPTY_QUESTION_MESSAGE.to_string());
            return Err(SessionError::Validation(EMPTY_QUESTION_MESSAGE.to_string()));
        }

        let Some(report) = self.current.as_ref().filter(|r| r.has_follow_up_context()) else {
            self.follow_up.error = Some(NO_CONTEXT_MESSAGE.to_string());
            return Err(SessionError::Validation(NO_CONTEXT_MESSAGE.to_string()));
        };

        self.follow_up.error = None;
        self.follow_up.answer_html.clear();

        let _guard = self.follow_up_control.lock()?;
        info!("Asking follow-up question for report {}", report.report_id);

        let request = AskRequest {
            report_id: &report.report_id,
            question,
            report_context: &report.full_text_for_follow_up,
        };

        match self.service.ask(&request).await {
            Ok(resp) => {
                self.follow_up.answer_html =
                    render_or_unavailable(self.renderer.markdown(), resp.answer.as_deref());
                Ok(())
            }
            Err(e) => {
                error!("Follow-up error: {e}");
                self.follow_up.error = Some(format!("Failed to get answer: {e}"));
                Err(e.into())
            }
        }
    }

    #[must_use]
    pub fn surface(&self) -> &ReportSurface {
        &self.surface
    }

    #[must_use]
    pub fn follow_up(&self) -> &FollowUpPane {
        &self.follow_up
    }

    #[must_use]
    pub fn current_report(&self) -> Option<&Report> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn chart_instances(&self) -> &[ChartInstance] {
        self.charts.instances()
    }

    #[must_use]
    pub fn research_control(&self) -> &Control {
        &self.research_control
    }

    #[must_use]
    pub fn follow_up_control(&self) -> &Control {
        &self.follow_up_control
    }
}
