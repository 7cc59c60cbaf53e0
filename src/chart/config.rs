/// Charting-engine configuration built from a `ChartSpec`.
///
/// The serialized shape follows the Chart.js configuration object
/// (`type`, `data`, `options.plugins`, `options.scales`). Tick and tooltip
/// formatting cannot travel as JSON callbacks, so they are carried as
/// `maxDecimals` / `labelSource` / `maxFractionDigits` hints that the engine
/// turns back into callbacks.
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::model::{ChartSpec, ChartType, ColorValue, Dataset};
use crate::color::{SLICE_SEPARATOR, color_at};
use crate::error::ChartError;

const GRID_COLOR: &str = "rgba(200, 200, 200, 0.2)";

/// Maximum fraction digits shown in tooltip values.
pub const TOOLTIP_FRACTION_DIGITS: usize = 2;

/// Maximum fraction digits shown on axis ticks.
pub const TICK_FRACTION_DIGITS: usize = 1;

// ── Configuration shape ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub chart_type: String,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<DatasetConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetConfig {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: ColorValue,
    pub border_color: ColorValue,
    pub border_width: f64,
    pub tension: f64,
    pub fill: Fill,
}

/// Area fill beneath a line: `"origin"` or `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Origin,
    Off,
}

impl Serialize for Fill {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Origin => serializer.serialize_str("origin"),
            Self::Off => serializer.serialize_bool(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    pub animation: Animation,
    pub plugins: Plugins,
    pub scales: Scales,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animation {
    pub duration: u32,
    pub easing: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub title: TitleOptions,
    pub subtitle: SubtitleOptions,
    pub legend: LegendOptions,
    pub tooltip: TooltipOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Font {
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<&'static str>,
}

impl Font {
    const fn sized(size: u32) -> Self {
        Self {
            size,
            weight: None,
            style: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Padding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleOptions {
    pub display: bool,
    pub text: String,
    pub font: Font,
    pub padding: Padding,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleOptions {
    pub display: bool,
    pub text: String,
    pub font: Font,
    pub color: &'static str,
    pub padding: Padding,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendOptions {
    pub display: bool,
    pub position: &'static str,
    pub labels: LegendLabels,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendLabels {
    pub font: Font,
}

/// Where a tooltip takes its leading label from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelSource {
    /// The slice's category label (pie, doughnut).
    Category,
    /// The dataset label (everything else).
    Dataset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipOptions {
    pub enabled: bool,
    pub mode: &'static str,
    pub intersect: bool,
    pub label_source: LabelSource,
    pub max_fraction_digits: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticks {
    pub font: Font,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_decimals: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_skip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ticks_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop_color: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Grid {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearAxis {
    pub begin_at_zero: bool,
    pub ticks: Ticks,
    pub grid: Grid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAxis {
    pub ticks: Ticks,
    pub grid: Grid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadialAxis {
    pub angle_lines: Grid,
    pub suggested_min: f64,
    pub point_labels: LegendLabels,
    pub grid: Grid,
    pub ticks: Ticks,
}

/// Axis configuration by chart family.
#[derive(Debug, Clone, PartialEq)]
pub enum Scales {
    /// bar, line, scatter
    Cartesian { y: LinearAxis, x: CategoryAxis },
    /// radar
    Radial { r: RadialAxis },
    /// pie, doughnut and the rest: engine defaults
    None,
}

impl Serialize for Scales {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Cartesian { y, x } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("y", y)?;
                map.serialize_entry("x", x)?;
                map.end()
            }
            Self::Radial { r } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("r", r)?;
                map.end()
            }
            Self::None => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

// ── Builder ──────────────────────────────────────────────────────────

impl ChartConfig {
    /// Build the configuration for the chart at `ordinal` within its report.
    ///
    /// The ordinal feeds color allocation so charts sharing the palette stay
    /// visually distinct and identical across re-renders.
    pub fn build(spec: &ChartSpec, ordinal: usize) -> Result<Self, ChartError> {
        let kind = spec.kind();
        if let ChartType::Other(name) = &kind {
            return Err(ChartError::UnsupportedType(name.clone()));
        }

        let single_dataset = spec.datasets.len() == 1;
        let datasets = spec
            .datasets
            .iter()
            .enumerate()
            .map(|(i, ds)| build_dataset(spec, &kind, ds, ordinal, i, single_dataset))
            .collect();

        Ok(Self {
            chart_type: kind.as_str().to_string(),
            data: ChartData {
                labels: spec.labels.clone(),
                datasets,
            },
            options: ChartOptions {
                responsive: true,
                maintain_aspect_ratio: true,
                animation: Animation {
                    duration: 600,
                    easing: "easeOutQuart",
                },
                plugins: build_plugins(spec, &kind),
                scales: build_scales(&kind),
            },
        })
    }
}

fn build_dataset(
    spec: &ChartSpec,
    kind: &ChartType,
    ds: &Dataset,
    ordinal: usize,
    index: usize,
    single_dataset: bool,
) -> DatasetConfig {
    let (background_color, border_color) = if kind.colors_per_point() {
        let fills: Vec<_> = (0..ds.data.len())
            .map(|point| color_at(ordinal * 10 + index * 5 + point, false))
            .collect();
        let borders = if *kind == ChartType::Bar {
            ColorValue::PerPoint(fills.iter().map(|c| c.solid()).collect())
        } else {
            ColorValue::Single(SLICE_SEPARATOR.to_string())
        };
        (
            ColorValue::PerPoint(fills.iter().map(ToString::to_string).collect()),
            borders,
        )
    } else {
        let base = ordinal * 10 + index;
        (
            ds.background_color
                .clone()
                .unwrap_or_else(|| ColorValue::Single(color_at(base, false).to_string())),
            ds.border_color
                .clone()
                .unwrap_or_else(|| ColorValue::Single(color_at(base, true).to_string())),
        )
    };

    let fill = match kind {
        ChartType::Radar if single_dataset => Fill::Origin,
        ChartType::Line if single_dataset && ds.data.len() > 1 => Fill::Origin,
        _ => Fill::Off,
    };

    let label = ds
        .label
        .as_deref()
        .filter(|l| !l.is_empty())
        .or(spec.title())
        .map_or_else(|| format!("Dataset {}", index + 1), str::to_string);

    DatasetConfig {
        label,
        data: ds.data.clone(),
        background_color,
        border_color,
        border_width: if kind.is_circular() { 2.0 } else { 1.5 },
        tension: if matches!(kind, ChartType::Line | ChartType::Radar) {
            0.3
        } else {
            0.0
        },
        fill,
    }
}

fn build_plugins(spec: &ChartSpec, kind: &ChartType) -> Plugins {
    let title = spec.title();
    let source = spec.source();

    Plugins {
        title: TitleOptions {
            display: title.is_some(),
            text: title.unwrap_or_default().to_string(),
            font: Font {
                size: 16,
                weight: Some("bold"),
                style: None,
            },
            padding: Padding {
                top: Some(10),
                bottom: Some(if source.is_some() { 5 } else { 20 }),
            },
        },
        subtitle: SubtitleOptions {
            display: source.is_some(),
            text: source.map(|s| format!("Source: {s}")).unwrap_or_default(),
            font: Font {
                size: 10,
                weight: None,
                style: Some("italic"),
            },
            color: "#666",
            padding: Padding {
                top: None,
                bottom: Some(15),
            },
        },
        legend: LegendOptions {
            display: spec.datasets.len() > 1 || kind.is_circular(),
            position: "top",
            labels: LegendLabels {
                font: Font::sized(12),
            },
        },
        tooltip: TooltipOptions {
            enabled: true,
            mode: "index",
            intersect: false,
            label_source: if kind.is_circular() {
                LabelSource::Category
            } else {
                LabelSource::Dataset
            },
            max_fraction_digits: TOOLTIP_FRACTION_DIGITS,
        },
    }
}

fn build_scales(kind: &ChartType) -> Scales {
    match kind {
        ChartType::Bar | ChartType::Line | ChartType::Scatter => Scales::Cartesian {
            y: LinearAxis {
                begin_at_zero: true,
                ticks: Ticks {
                    font: Font::sized(11),
                    max_decimals: Some(TICK_FRACTION_DIGITS),
                    ..Ticks::default()
                },
                grid: Grid {
                    display: None,
                    color: Some(GRID_COLOR),
                },
            },
            x: CategoryAxis {
                ticks: Ticks {
                    font: Font::sized(11),
                    auto_skip: Some(true),
                    max_ticks_limit: Some(10),
                    ..Ticks::default()
                },
                grid: Grid {
                    display: Some(false),
                    color: None,
                },
            },
        },
        ChartType::Radar => Scales::Radial {
            r: RadialAxis {
                angle_lines: Grid {
                    display: Some(true),
                    color: Some(GRID_COLOR),
                },
                suggested_min: 0.0,
                point_labels: LegendLabels {
                    font: Font::sized(11),
                },
                grid: Grid {
                    display: None,
                    color: Some(GRID_COLOR),
                },
                ticks: Ticks {
                    font: Font::sized(10),
                    max_decimals: Some(TICK_FRACTION_DIGITS),
                    backdrop_color: Some("transparent"),
                    ..Ticks::default()
                },
            },
        },
        _ => Scales::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(kind: &str, datasets: Vec<Vec<f64>>) -> ChartSpec {
        ChartSpec {
            chart_type: kind.to_string(),
            title: Some("Life Expectancy".to_string()),
            labels: vec!["2010".into(), "2020".into(), "2030".into()],
            datasets: datasets
                .into_iter()
                .map(|data| Dataset {
                    label: None,
                    data,
                    background_color: None,
                    border_color: None,
                })
                .collect(),
            source: None,
        }
    }

    fn single(color: &ColorValue) -> &str {
        match color {
            ColorValue::Single(c) => c,
            ColorValue::PerPoint(_) => panic!("expected a single color"),
        }
    }

    fn per_point(color: &ColorValue) -> &[String] {
        match color {
            ColorValue::PerPoint(c) => c,
            ColorValue::Single(_) => panic!("expected per-point colors"),
        }
    }

    #[test]
    fn test_bar_colors_per_point_with_solid_borders() {
        let cfg = ChartConfig::build(&spec("bar", vec![vec![52.0, 58.0]]), 0).unwrap();
        let ds = &cfg.data.datasets[0];
        assert_eq!(
            per_point(&ds.background_color),
            [color_at(0, false).to_string(), color_at(1, false).to_string()]
        );
        assert_eq!(
            per_point(&ds.border_color),
            [color_at(0, false).solid(), color_at(1, false).solid()]
        );
        assert_eq!(ds.border_width, 1.5);
        assert_eq!(ds.tension, 0.0);
        assert_eq!(ds.fill, Fill::Off);
    }

    #[test]
    fn test_composite_color_index() {
        let cfg = ChartConfig::build(&spec("BAR", vec![vec![1.0, 2.0], vec![3.0, 4.0]]), 2).unwrap();
        let second = per_point(&cfg.data.datasets[1].background_color);
        assert_eq!(second[0], color_at(2 * 10 + 5, false).to_string());
        assert_eq!(second[1], color_at(2 * 10 + 5 + 1, false).to_string());
    }

    #[test]
    fn test_pie_uses_separator_border_and_legend() {
        let cfg = ChartConfig::build(&spec("pie", vec![vec![1.0, 2.0, 3.0]]), 1).unwrap();
        let ds = &cfg.data.datasets[0];
        assert_eq!(per_point(&ds.background_color).len(), 3);
        assert_eq!(single(&ds.border_color), "#fff");
        assert_eq!(ds.border_width, 2.0);
        assert!(cfg.options.plugins.legend.display);
        assert_eq!(cfg.options.plugins.tooltip.label_source, LabelSource::Category);
        assert_eq!(cfg.options.scales, Scales::None);
    }

    #[test]
    fn test_line_colors_per_dataset() {
        let cfg = ChartConfig::build(&spec("line", vec![vec![1.0, 2.0]]), 3).unwrap();
        let ds = &cfg.data.datasets[0];
        assert_eq!(single(&ds.background_color), color_at(30, false).to_string());
        assert_eq!(single(&ds.border_color), color_at(30, true).to_string());
        assert_eq!(ds.tension, 0.3);
        assert_eq!(ds.fill, Fill::Origin);
        assert!(!cfg.options.plugins.legend.display);
        assert_eq!(cfg.options.plugins.tooltip.label_source, LabelSource::Dataset);
    }

    #[test]
    fn test_explicit_colors_win_for_line() {
        let mut s = spec("line", vec![vec![1.0, 2.0]]);
        s.datasets[0].background_color = Some(ColorValue::Single("#abcdef".into()));
        let cfg = ChartConfig::build(&s, 0).unwrap();
        let ds = &cfg.data.datasets[0];
        assert_eq!(single(&ds.background_color), "#abcdef");
        assert_eq!(single(&ds.border_color), color_at(0, true).to_string());
    }

    #[test]
    fn test_explicit_colors_ignored_for_bar() {
        let mut s = spec("bar", vec![vec![1.0]]);
        s.datasets[0].background_color = Some(ColorValue::Single("#abcdef".into()));
        let cfg = ChartConfig::build(&s, 0).unwrap();
        assert_eq!(
            per_point(&cfg.data.datasets[0].background_color),
            [color_at(0, false).to_string()]
        );
    }

    #[test]
    fn test_fill_rules() {
        let line_one_point = ChartConfig::build(&spec("line", vec![vec![1.0]]), 0).unwrap();
        assert_eq!(line_one_point.data.datasets[0].fill, Fill::Off);

        let line_two_sets =
            ChartConfig::build(&spec("line", vec![vec![1.0, 2.0], vec![3.0, 4.0]]), 0).unwrap();
        assert!(line_two_sets.data.datasets.iter().all(|d| d.fill == Fill::Off));
        assert!(line_two_sets.options.plugins.legend.display);

        let radar_one = ChartConfig::build(&spec("radar", vec![vec![1.0]]), 0).unwrap();
        assert_eq!(radar_one.data.datasets[0].fill, Fill::Origin);
        assert_eq!(radar_one.data.datasets[0].tension, 0.3);

        let scatter = ChartConfig::build(&spec("scatter", vec![vec![1.0, 2.0]]), 0).unwrap();
        assert_eq!(scatter.data.datasets[0].fill, Fill::Off);
    }

    #[test]
    fn test_scales_by_type() {
        let bar = ChartConfig::build(&spec("bar", vec![vec![1.0]]), 0).unwrap();
        let Scales::Cartesian { y, x } = &bar.options.scales else {
            panic!("bar charts use cartesian scales");
        };
        assert!(y.begin_at_zero);
        assert_eq!(y.ticks.max_decimals, Some(1));
        assert_eq!(x.ticks.max_ticks_limit, Some(10));

        let radar = ChartConfig::build(&spec("radar", vec![vec![1.0]]), 0).unwrap();
        let Scales::Radial { r } = &radar.options.scales else {
            panic!("radar charts use a radial scale");
        };
        assert_eq!(r.suggested_min, 0.0);

        let doughnut = ChartConfig::build(&spec("doughnut", vec![vec![1.0]]), 0).unwrap();
        assert_eq!(doughnut.options.scales, Scales::None);
    }

    #[test]
    fn test_title_and_subtitle() {
        let mut s = spec("bar", vec![vec![1.0]]);
        let cfg = ChartConfig::build(&s, 0).unwrap();
        assert!(cfg.options.plugins.title.display);
        assert_eq!(cfg.options.plugins.title.padding.bottom, Some(20));
        assert!(!cfg.options.plugins.subtitle.display);

        s.source = Some("WHO, 2021".into());
        let cfg = ChartConfig::build(&s, 0).unwrap();
        assert_eq!(cfg.options.plugins.title.padding.bottom, Some(5));
        assert!(cfg.options.plugins.subtitle.display);
        assert_eq!(cfg.options.plugins.subtitle.text, "Source: WHO, 2021");

        s.title = None;
        let cfg = ChartConfig::build(&s, 0).unwrap();
        assert!(!cfg.options.plugins.title.display);
        assert_eq!(cfg.data.datasets[0].label, "Dataset 1");
    }

    #[test]
    fn test_dataset_label_fallbacks() {
        let mut s = spec("line", vec![vec![1.0], vec![2.0]]);
        s.datasets[0].label = Some("Men".into());
        s.datasets[1].label = Some(String::new());
        let cfg = ChartConfig::build(&s, 0).unwrap();
        assert_eq!(cfg.data.datasets[0].label, "Men");
        assert_eq!(cfg.data.datasets[1].label, "Life Expectancy");
    }

    #[test]
    fn test_unsupported_type() {
        let err = ChartConfig::build(&spec("histogram", vec![vec![1.0]]), 0).unwrap_err();
        assert_eq!(err, ChartError::UnsupportedType("histogram".into()));
    }

    #[test]
    fn test_serialized_shape() {
        let cfg = ChartConfig::build(&spec("pie", vec![vec![1.0, 2.0]]), 0).unwrap();
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["type"], "pie");
        assert_eq!(json["options"]["scales"], serde_json::json!({}));
        assert_eq!(json["options"]["maintainAspectRatio"], true);
        assert_eq!(json["data"]["datasets"][0]["fill"], false);
        assert_eq!(json["data"]["datasets"][0]["borderColor"], "#fff");
        assert_eq!(json["options"]["plugins"]["tooltip"]["labelSource"], "category");

        let line = ChartConfig::build(&spec("line", vec![vec![1.0, 2.0]]), 0).unwrap();
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["data"]["datasets"][0]["fill"], "origin");
        assert_eq!(json["options"]["scales"]["y"]["beginAtZero"], true);
    }

    #[test]
    fn test_formatting_hints() {
        let bar = ChartConfig::build(&spec("bar", vec![vec![1.0]]), 0).unwrap();
        let bar = serde_json::to_value(&bar).unwrap();
        assert_eq!(bar["options"]["plugins"]["tooltip"]["maxFractionDigits"], 2);
        assert_eq!(bar["options"]["plugins"]["tooltip"]["labelSource"], "dataset");
        assert_eq!(bar["options"]["scales"]["y"]["ticks"]["maxDecimals"], 1);

        let pie = ChartConfig::build(&spec("pie", vec![vec![1.0]]), 0).unwrap();
        let pie = serde_json::to_value(&pie).unwrap();
        assert_eq!(pie["options"]["plugins"]["tooltip"]["maxFractionDigits"], 2);
        assert!(pie["options"]["scales"].get("y").is_none());
    }
}
