/// Error types shared across the rendering pipeline.
use thiserror::Error;

/// Problems found while parsing the raw lists captured by a chart directive.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectiveError {
    #[error("unbalanced brackets in {0:?}")]
    UnbalancedBrackets(String),

    #[error("unterminated quote in {0:?}")]
    UnterminatedQuote(String),

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("empty list")]
    Empty,
}

/// Raised only in strict correlation mode.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrelationError {
    #[error("chart data mismatch: {directives} directive(s) but {charts} chart entr(ies)")]
    Mismatch { directives: usize, charts: usize },
}

/// Failure to build or instantiate a single chart.
///
/// Always isolated to the placeholder it belongs to.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("malformed chart data: {0}")]
    Malformed(String),

    #[error("\"{0}\" is not a registered chart type")]
    UnsupportedType(String),

    #[error("charting engine error: {0}")]
    Engine(String),
}

/// Report-level render failure. Per-chart failures never surface here.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("received invalid report data from the server")]
    InvalidReport,

    #[error(transparent)]
    Correlation(#[from] CorrelationError),
}

/// Transport or server failure talking to the report service.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Non-success response; the message is already user-facing.
    #[error("{0}")]
    Status(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Errors returned by the session controller. Each one has already been
/// written to the relevant inline error slot when it is returned.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0}")]
    Validation(String),

    #[error("another request is already in flight")]
    Busy,

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
