/// Markdown-to-HTML conversion.
///
/// The engine must pass raw HTML through untouched so that chart
/// placeholder containers survive conversion.
use pulldown_cmark::{Event, Options, Parser, html};
use serde::{Deserialize, Serialize};

/// Shown when there is no markdown to render.
pub const UNAVAILABLE_HTML: &str =
    "<p><em>Content not available or in an unexpected format.</em></p>";

/// External markdown engine.
pub trait MarkdownEngine {
    fn to_markup(&self, text: &str) -> String;
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Render single newlines as `<br>`.
    #[serde(default = "default_true")]
    pub breaks: bool,

    /// GitHub-flavored extensions (tables, strikethrough, task lists).
    #[serde(default = "default_true")]
    pub gfm: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            breaks: default_true(),
            gfm: default_true(),
        }
    }
}

/// `pulldown-cmark` backed engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulldownEngine {
    pub options: MarkdownOptions,
}

impl PulldownEngine {
    #[must_use]
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }
}

impl MarkdownEngine for PulldownEngine {
    fn to_markup(&self, text: &str) -> String {
        let mut opts = Options::empty();
        if self.options.gfm {
            opts.insert(Options::ENABLE_TABLES);
            opts.insert(Options::ENABLE_STRIKETHROUGH);
            opts.insert(Options::ENABLE_TASKLISTS);
        }

        let breaks = self.options.breaks;
        let parser = Parser::new_ext(text, opts).map(|event| match event {
            Event::SoftBreak if breaks => Event::HardBreak,
            other => other,
        });

        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

/// Render `text` or fall back to the "not available" notice.
pub fn render_or_unavailable(engine: &dyn MarkdownEngine, text: Option<&str>) -> String {
    match text {
        Some(t) => engine.to_markup(t),
        None => UNAVAILABLE_HTML.to_string(),
    }
}

/// Escape text for safe inclusion in HTML content or attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = r#"<div id="chart-placeholder-0" class="chart-render-target"></div>"#;

    #[test]
    fn test_block_placeholder_survives() {
        let engine = PulldownEngine::default();
        let html = engine.to_markup(&format!("## Mortality\n\nIntro.\n\n{MARKER}\n\nAfter."));
        assert!(html.contains("<h2>Mortality</h2>"));
        assert!(html.contains(MARKER));
        assert!(html.contains("<p>After.</p>"));
    }

    #[test]
    fn test_inline_placeholder_survives() {
        let engine = PulldownEngine::default();
        let html = engine.to_markup(&format!("See chart {MARKER} for details."));
        assert!(html.contains(MARKER));
    }

    #[test]
    fn test_breaks_option() {
        let with = PulldownEngine::default().to_markup("line one\nline two");
        assert!(with.contains("<br />"));

        let without = PulldownEngine::new(MarkdownOptions {
            breaks: false,
            gfm: true,
        })
        .to_markup("line one\nline two");
        assert!(!without.contains("<br"));
    }

    #[test]
    fn test_gfm_tables() {
        let table = "| a | b |\n|---|---|\n| 1 | 2 |";
        assert!(PulldownEngine::default().to_markup(table).contains("<table>"));

        let plain = PulldownEngine::new(MarkdownOptions {
            breaks: true,
            gfm: false,
        });
        assert!(!plain.to_markup(table).contains("<table>"));
    }

    #[test]
    fn test_render_or_unavailable() {
        let engine = PulldownEngine::default();
        assert_eq!(render_or_unavailable(&engine, None), UNAVAILABLE_HTML);
        assert!(render_or_unavailable(&engine, Some("**yes**")).contains("<strong>yes</strong>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }
}
