/// Report payload and rendering.
pub mod page;
pub mod renderer;

use serde::{Deserialize, Deserializer, Serialize};

use crate::chart::ChartEntry;

pub use renderer::{RenderState, RenderSummary, ReportRenderer};

/// Prefix the report service puts on a body when generation failed upstream.
pub const ERROR_SENTINEL: &str = "Error:";

/// A generated report as returned by `POST /research`.
///
/// Fields are deserialized leniently: a missing or non-string `area_name` or
/// `full_report_markdown` becomes `None` so that shape validation happens in
/// the renderer rather than failing the whole response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default, deserialize_with = "string_or_none")]
    pub area_name: Option<String>,

    #[serde(default, deserialize_with = "string_or_none")]
    pub full_report_markdown: Option<String>,

    #[serde(default)]
    pub charts: Vec<ChartEntry>,

    #[serde(default)]
    pub report_id: String,

    #[serde(default)]
    pub full_text_for_follow_up: String,
}

impl Report {
    /// Non-empty area name, if present.
    #[must_use]
    pub fn area_name(&self) -> Option<&str> {
        self.area_name.as_deref().filter(|a| !a.is_empty())
    }

    /// Whether the report body is an upstream generation error.
    #[must_use]
    pub fn is_upstream_error(&self) -> bool {
        self.full_report_markdown
            .as_deref()
            .is_some_and(|body| body.starts_with(ERROR_SENTINEL))
    }

    /// Whether follow-up questions can be asked against this report.
    #[must_use]
    pub fn has_follow_up_context(&self) -> bool {
        !self.report_id.is_empty() && !self.full_text_for_follow_up.is_empty()
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}
