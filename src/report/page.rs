//! Standalone HTML page for a rendered report.
//!
//! The template is filled by token substitution rather than `format!()` since
//! the embedded CSS is full of braces. Substitution is a single forward pass:
//! substituted text is never scanned for tokens.

use crate::markdown::escape_html;
use crate::surface::ReportSurface;

pub const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";

/// One follow-up question and its outcome.
#[derive(Debug, Clone, Default)]
pub struct FollowUpExchange {
    pub question: String,
    pub answer_html: String,
    pub error: Option<String>,
}

const TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0 auto; max-width: 960px; padding: 16px; color: #222; }
  h1 { font-size: 1.6em; border-bottom: 1px solid #ddd; padding-bottom: 8px; }
  .error-message { color: #b00020; font-weight: 600; }
  .chart-render-target { position: relative; height: 400px; margin: 16px 0; }
  .report-subsection { margin: 16px 0; }
  table { border-collapse: collapse; }
  th, td { border: 1px solid #ddd; padding: 4px 8px; }
  .follow-up { border-top: 1px solid #ddd; margin-top: 24px; padding-top: 8px; }
  .follow-up .question { font-weight: 600; margin-top: 16px; }
</style>
<script src="__CHART_JS__"></script>
</head>
<body>
__ERROR__
<section id="report-container"__HIDDEN__>
<h1 id="report-title">__TITLE__</h1>
<div id="report-content">
__CONTENT__
</div>
</section>
__FOLLOW_UP__
__CHARTS__
</body>
</html>
"#;

/// Assemble the page.
///
/// `charts_script` is the `<script>` block that instantiates the live charts.
#[must_use]
pub fn render_page(
    surface: &ReportSurface,
    follow_ups: &[FollowUpExchange],
    charts_script: &str,
) -> String {
    let title = if surface.title().is_empty() {
        "Health Report".to_string()
    } else {
        escape_html(surface.title())
    };

    let error = surface
        .error()
        .map(|e| format!("<p id=\"error-message\" class=\"error-message\">{}</p>", escape_html(e)))
        .unwrap_or_default();

    let hidden = if surface.is_visible() { "" } else { " hidden" };

    let follow_up = follow_up_section(follow_ups);
    let content = surface.to_html();

    fill(
        TEMPLATE,
        &[
            ("__CHART_JS__", CHART_JS_CDN),
            ("__TITLE__", title.as_str()),
            ("__ERROR__", error.as_str()),
            ("__HIDDEN__", hidden),
            ("__CONTENT__", content.as_str()),
            ("__FOLLOW_UP__", follow_up.as_str()),
            ("__CHARTS__", charts_script),
        ],
    )
}

/// Replace every token occurrence in `template`, left to right.
fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    let extra: usize = slots.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some((at, token, value)) = slots
        .iter()
        .filter_map(|&(token, value)| rest.find(token).map(|at| (at, token, value)))
        .min_by_key(|&(at, _, _)| at)
    {
        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + token.len()..];
    }
    out.push_str(rest);
    out
}

fn follow_up_section(follow_ups: &[FollowUpExchange]) -> String {
    if follow_ups.is_empty() {
        return String::new();
    }

    let mut out = String::from("<section class=\"follow-up\"><h2>Follow-up Questions</h2>\n");
    for exchange in follow_ups {
        out.push_str("<p class=\"question\">");
        out.push_str(&escape_html(&exchange.question));
        out.push_str("</p>\n");
        match &exchange.error {
            Some(e) => {
                out.push_str("<p class=\"error-message\">");
                out.push_str(&escape_html(e));
                out.push_str("</p>\n");
            }
            None => {
                out.push_str("<div class=\"answer\">");
                out.push_str(&exchange.answer_html);
                out.push_str("</div>\n");
            }
        }
    }
    out.push_str("</section>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_report_page() {
        let mut surface = ReportSurface::default();
        surface.set_title("Comprehensive Health Analysis Report for: Lagos");
        surface.set_markup("<p>Body</p>".into());
        surface.show();

        let html = render_page(&surface, &[], "<script>/* charts */</script>");
        assert!(html.contains("<h1 id=\"report-title\">Comprehensive Health Analysis Report for: Lagos</h1>"));
        assert!(html.contains("<section id=\"report-container\">"));
        assert!(html.contains("<p>Body</p>"));
        assert!(html.contains("/* charts */"));
        assert!(html.contains(CHART_JS_CDN));
        assert!(!html.contains("follow-up\""));
    }

    #[test]
    fn test_hidden_report_shows_error() {
        let mut surface = ReportSurface::default();
        surface.set_error("Failed to generate health report: <timeout>");

        let html = render_page(&surface, &[], "");
        assert!(html.contains("<section id=\"report-container\" hidden>"));
        assert!(html.contains("class=\"error-message\">Failed to generate health report: &lt;timeout&gt;</p>"));
        assert!(html.contains("<title>Health Report</title>"));
    }

    #[test]
    fn test_follow_up_section() {
        let surface = ReportSurface::default();
        let exchanges = vec![
            FollowUpExchange {
                question: "Is <malaria> common?".into(),
                answer_html: "<p>Yes.</p>".into(),
                error: None,
            },
            FollowUpExchange {
                question: "And cholera?".into(),
                answer_html: String::new(),
                error: Some("Failed to get answer: HTTP error! Status: 500".into()),
            },
        ];

        let html = render_page(&surface, &exchanges, "");
        assert!(html.contains("<p class=\"question\">Is &lt;malaria&gt; common?</p>"));
        assert!(html.contains("<div class=\"answer\"><p>Yes.</p></div>"));
        assert!(html.contains("Failed to get answer: HTTP error! Status: 500"));
    }

    #[test]
    fn test_template_tokens_in_content_stay_literal() {
        let mut surface = ReportSurface::default();
        surface.set_title("Report for: __CHARTS__");
        surface.set_markup("<p>Body</p>".into());
        surface.show();
        let exchanges = vec![FollowUpExchange {
            question: "What is __CONTENT__?".into(),
            answer_html: "<p>It is __CONTENT__ and __TITLE__.</p>".into(),
            error: None,
        }];
        let script = "<script>reportviewChart(\"c\", {\"title\":\"__FOLLOW_UP__\"});</script>";

        let html = render_page(&surface, &exchanges, script);
        assert_eq!(html.matches("<p>Body</p>").count(), 1);
        assert_eq!(html.matches("Follow-up Questions").count(), 1);
        assert_eq!(html.matches("reportviewChart(").count(), 1);
        assert!(html.contains("<p>It is __CONTENT__ and __TITLE__.</p>"));
        assert!(html.contains("<h1 id=\"report-title\">Report for: __CHARTS__</h1>"));
        assert!(html.contains("{\"title\":\"__FOLLOW_UP__\"}"));
    }

    #[test]
    fn test_fill_single_pass() {
        assert_eq!(fill("a__X__b__Y__c__X__", &[("__X__", "__Y__"), ("__Y__", "1")]), "a__Y__b1c__Y__");
    }
}
