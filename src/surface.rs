//! Display surface: the DOM-equivalent target a report is rendered into.
//!
//! Holds the rendered markup, the set of placeholder elements found in it,
//! per-placeholder content, visibility and the inline error slot.

use std::collections::{BTreeMap, HashSet};

use scraper::{Html, Selector};

use crate::markdown::escape_html;

const PLACEHOLDER_SELECTOR: &str = "div.chart-render-target[id]";

/// Report display area.
#[derive(Debug, Default, Clone)]
pub struct ReportSurface {
    title: String,
    visible: bool,
    error: Option<String>,
    markup: String,
    placeholders: HashSet<String>,
    slots: BTreeMap<String, String>,
}

impl ReportSurface {
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the content with freshly rendered markup and index its
    /// placeholder elements.
    pub fn set_markup(&mut self, markup: String) {
        let fragment = Html::parse_fragment(&markup);
        self.placeholders = match Selector::parse(PLACEHOLDER_SELECTOR) {
            Ok(selector) => fragment
                .select(&selector)
                .filter_map(|el| el.value().id().map(str::to_string))
                .collect(),
            Err(e) => {
                tracing::error!("Invalid placeholder selector: {e}");
                HashSet::new()
            }
        };
        self.markup = markup;
        self.slots.clear();
    }

    /// Empty the content area.
    pub fn clear_content(&mut self) {
        self.markup.clear();
        self.placeholders.clear();
        self.slots.clear();
    }

    #[must_use]
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Whether a placeholder element with this id exists in the markup.
    #[must_use]
    pub fn has_placeholder(&self, id: &str) -> bool {
        self.placeholders.contains(id)
    }

    /// Append HTML inside the placeholder element.
    pub fn append_html(&mut self, id: &str, html: &str) {
        self.slots.entry(id.to_string()).or_default().push_str(html);
    }

    /// Replace the placeholder element's content.
    pub fn set_inner_html(&mut self, id: &str, html: &str) {
        self.slots.insert(id.to_string(), html.to_string());
    }

    /// Content of a placeholder element.
    #[must_use]
    pub fn inner_html(&self, id: &str) -> Option<&str> {
        self.slots.get(id).map(String::as_str)
    }

    /// Final content markup with placeholder elements filled in.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = self.markup.clone();
        for (id, inner) in &self.slots {
            let empty = format!("<div id=\"{id}\" class=\"chart-render-target\"></div>");
            let filled = format!("<div id=\"{id}\" class=\"chart-render-target\">{inner}</div>");
            out = out.replacen(&empty, &filled, 1);
        }
        out
    }
}

/// Pre-formatted block shown instead of a report when generation failed
/// upstream.
#[must_use]
pub fn error_block(heading: &str, body: &str) -> String {
    format!(
        "<div class=\"report-subsection\"><h3>{}</h3><pre style=\"white-space: pre-wrap; word-wrap: break-word;\">{}</pre></div>",
        escape_html(heading),
        escape_html(body)
    )
}
