/// Chart directives embedded in report prose.
///
/// A directive looks like
/// `CHART_DATA: TYPE=bar TITLE="Life Expectancy" LABELS=["2010","2020"] DATA=[52,58]`
/// with an optional trailing `SOURCE="..."`. Directives are positional
/// references only: the authoritative chart data is the report's `charts`
/// entry at the same ordinal.
pub mod correlator;
pub mod extractor;

pub use correlator::{ChartJob, Correlation, CorrelationMode, Placeholder, correlate};
pub use extractor::{Directive, Directives, extract, parse_data, parse_labels};
