use std::ops::Range;
use std::sync::LazyLock;

use regex::{CaptureMatches, Regex};

use crate::error::DirectiveError;

static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"CHART_DATA:\s*TYPE=(?<type>\w+)\s*TITLE="(?<title>[^"]+)"\s*LABELS=(?<labels>\[[^\]]*\])\s*DATA=(?<data>\[[^\]]*\])(?:\s*SOURCE="(?<source>[^"]+)")?"#,
    )
    .expect("directive pattern is valid")
});

/// One directive occurrence, borrowed from the report text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
    /// Zero-based order of appearance in the text.
    pub ordinal: usize,
    /// Byte range of the whole directive in the source text.
    pub span: Range<usize>,
    pub text: &'a str,
    pub chart_type: &'a str,
    pub title: &'a str,
    /// Bracketed label list exactly as written, e.g. `["2010","2020"]`.
    pub labels_raw: &'a str,
    /// Bracketed data list exactly as written, e.g. `[52,58]`.
    pub data_raw: &'a str,
    pub source: Option<&'a str>,
}

impl Directive<'_> {
    /// Parse the captured label list.
    pub fn labels(&self) -> Result<Vec<String>, DirectiveError> {
        parse_labels(self.labels_raw)
    }

    /// Parse the captured data list into numbers.
    pub fn data(&self) -> Result<Vec<f64>, DirectiveError> {
        parse_data(self.data_raw)
    }
}

/// Lazy, non-overlapping iterator over the directives of a text, in order.
pub struct Directives<'a> {
    matches: CaptureMatches<'static, 'a>,
    next_ordinal: usize,
}

impl<'a> Iterator for Directives<'a> {
    type Item = Directive<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let caps = self.matches.next()?;
        let whole = caps.get(0)?;
        let field = |name: &str| caps.name(name).map_or("", |m| m.as_str());

        let directive = Directive {
            ordinal: self.next_ordinal,
            span: whole.range(),
            text: whole.as_str(),
            chart_type: field("type"),
            title: field("title"),
            labels_raw: field("labels"),
            data_raw: field("data"),
            source: caps.name("source").map(|m| m.as_str()),
        };
        self.next_ordinal += 1;
        Some(directive)
    }
}

/// Scan `text` for chart directives. Calling again restarts from the top.
pub fn extract(text: &str) -> Directives<'_> {
    Directives {
        matches: DIRECTIVE_RE.captures_iter(text),
        next_ordinal: 0,
    }
}

// ── Typed list parsing ───────────────────────────────────────────────

/// Parse a bracketed label list.
///
/// Valid JSON is accepted as-is (non-string items are stringified);
/// otherwise items may be single-quoted, double-quoted or bare.
pub fn parse_labels(raw: &str) -> Result<Vec<String>, DirectiveError> {
    if let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        if values.is_empty() {
            return Err(DirectiveError::Empty);
        }
        return Ok(values
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect());
    }

    let items = split_list(raw)?;
    Ok(items.into_iter().map(|s| unquote(s).to_string()).collect())
}

/// Parse a bracketed numeric list.
///
/// Items are cleaned before parsing: `%` and anything that cannot appear in
/// a float literal is dropped, so `"12.5%"` and `1,200` style values
/// written inside quotes still parse.
pub fn parse_data(raw: &str) -> Result<Vec<f64>, DirectiveError> {
    split_list(raw)?
        .into_iter()
        .map(|item| {
            let cleaned: String = unquote(item)
                .chars()
                .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | 'e' | 'E'))
                .collect();
            if cleaned.is_empty() {
                return Err(DirectiveError::InvalidNumber(item.to_string()));
            }
            cleaned
                .parse::<f64>()
                .map_err(|_| DirectiveError::InvalidNumber(item.to_string()))
        })
        .collect()
}

/// Split the inside of `[...]` on top-level commas, honoring quotes.
fn split_list(raw: &str) -> Result<Vec<&str>, DirectiveError> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| DirectiveError::UnbalancedBrackets(raw.to_string()))?;

    if inner.trim().is_empty() {
        return Err(DirectiveError::Empty);
    }

    let mut items = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in inner.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | ']') => return Err(DirectiveError::UnbalancedBrackets(raw.to_string())),
            (None, ',') => {
                items.push(inner[start..i].trim());
                start = i + 1;
            }
            (None, _) => {}
        }
    }

    if quote.is_some() {
        return Err(DirectiveError::UnterminatedQuote(raw.to_string()));
    }
    items.push(inner[start..].trim());
    Ok(items)
}

fn unquote(item: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = item.strip_prefix(q).and_then(|s| s.strip_suffix(q)) {
            return inner;
        }
    }
    item
}
