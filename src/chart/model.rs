use std::fmt;

use serde::{Deserialize, Serialize};

/// Chart kinds the charting engine knows how to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Doughnut,
    Radar,
    Scatter,
    Bubble,
    PolarArea,
    /// Anything else, lowercased. Rejected at materialization.
    Other(String),
}

impl ChartType {
    /// Case-insensitive parse; an empty type defaults to `bar`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let lower = raw.trim().to_lowercase();
        match lower.as_str() {
            "" | "bar" => Self::Bar,
            "line" => Self::Line,
            "pie" => Self::Pie,
            "doughnut" => Self::Doughnut,
            "radar" => Self::Radar,
            "scatter" => Self::Scatter,
            "bubble" => Self::Bubble,
            "polararea" => Self::PolarArea,
            _ => Self::Other(lower),
        }
    }

    /// Engine identifier, e.g. `"polarArea"`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
            Self::Doughnut => "doughnut",
            Self::Radar => "radar",
            Self::Scatter => "scatter",
            Self::Bubble => "bubble",
            Self::PolarArea => "polarArea",
            Self::Other(s) => s,
        }
    }

    /// Pie and doughnut charts, where each data point is a slice category.
    #[must_use]
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::Pie | Self::Doughnut)
    }

    /// Types colored per data point rather than per dataset.
    #[must_use]
    pub fn colors_per_point(&self) -> bool {
        matches!(self, Self::Bar | Self::Pie | Self::Doughnut)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An explicit dataset color: one for the whole dataset or one per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Single(String),
    PerPoint(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub data: Vec<f64>,

    #[serde(
        default,
        rename = "backgroundColor",
        skip_serializing_if = "Option::is_none"
    )]
    pub background_color: Option<ColorValue>,

    #[serde(default, rename = "borderColor", skip_serializing_if = "Option::is_none")]
    pub border_color: Option<ColorValue>,
}

/// Authoritative description of one chart, as produced by the report service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(rename = "type", default)]
    pub chart_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub labels: Vec<String>,

    pub datasets: Vec<Dataset>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ChartSpec {
    #[must_use]
    pub fn kind(&self) -> ChartType {
        ChartType::parse(&self.chart_type)
    }

    /// Non-empty title, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// Non-empty source attribution, if any.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref().filter(|s| !s.is_empty())
    }
}

/// One entry of a report's `charts` sequence.
///
/// An entry that does not match the `ChartSpec` shape is kept as raw JSON so
/// it still occupies its ordinal and fails only its own placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartEntry {
    Spec(ChartSpec),
    Malformed(serde_json::Value),
}

impl ChartEntry {
    /// Best-effort title, used in inline error messages.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Spec(spec) => spec.title(),
            Self::Malformed(value) => value
                .get("title")
                .and_then(|t| t.as_str())
                .filter(|t| !t.is_empty()),
        }
    }
}

impl From<ChartSpec> for ChartEntry {
    fn from(spec: ChartSpec) -> Self {
        Self::Spec(spec)
    }
}
