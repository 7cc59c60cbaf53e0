use tracing::{debug, error};

use super::config::ChartConfig;
use super::engine::{ChartEngine, ChartHandle, ChartInstance};
use super::model::{ChartEntry, ChartSpec};
use crate::directive::Placeholder;
use crate::error::ChartError;
use crate::markdown::escape_html;
use crate::surface::ReportSurface;

/// Result of one materialization attempt. A failure affects only its own
/// placeholder.
pub type MaterializeOutcome = Result<ChartInstance, ChartError>;

/// Builds chart configurations and hands them to the charting engine.
pub struct ChartMaterializer<'e> {
    engine: &'e mut dyn ChartEngine,
}

impl<'e> ChartMaterializer<'e> {
    pub fn new(engine: &'e mut dyn ChartEngine) -> Self {
        Self { engine }
    }

    /// Materialize `entry` into the placeholder element on `surface`.
    ///
    /// A canvas is appended to the placeholder first. On any failure the
    /// placeholder's content is replaced by an inline error message.
    pub fn materialize(
        &mut self,
        surface: &mut ReportSurface,
        placeholder: &Placeholder,
        entry: &ChartEntry,
        ordinal: usize,
    ) -> MaterializeOutcome {
        let canvas_id = placeholder.canvas_id();
        surface.append_html(&placeholder.id, &format!("<canvas id=\"{canvas_id}\"></canvas>"));

        match self.instantiate(&canvas_id, entry, ordinal) {
            Ok(instance) => {
                debug!("Rendered chart {} into {}", ordinal, placeholder.id);
                Ok(ChartInstance::new(placeholder.id.clone(), canvas_id, instance))
            }
            Err(e) => {
                let title = entry.title().unwrap_or("Untitled Chart");
                error!(
                    "Error rendering chart {title:?} in {}: {e}. Chart data: {}",
                    placeholder.id,
                    serde_json::to_string_pretty(entry).unwrap_or_default()
                );
                surface.set_inner_html(
                    &placeholder.id,
                    &format!(
                        "<p class=\"error-message\">Could not render chart: {}. Error: {}</p>",
                        escape_html(title),
                        escape_html(&e.to_string())
                    ),
                );
                Err(e)
            }
        }
    }

    fn instantiate(
        &mut self,
        canvas_id: &str,
        entry: &ChartEntry,
        ordinal: usize,
    ) -> Result<Box<dyn ChartHandle>, ChartError> {
        let spec = match entry {
            ChartEntry::Spec(spec) => spec,
            ChartEntry::Malformed(value) => {
                return Err(ChartError::Malformed(describe_malformed(value)));
            }
        };
        let config = ChartConfig::build(spec, ordinal)?;
        self.engine.create(canvas_id, &config)
    }
}

/// Explain why a raw chart entry did not match the expected shape.
fn describe_malformed(value: &serde_json::Value) -> String {
    let Some(obj) = value.as_object() else {
        return format!("expected an object, got {value}");
    };
    match obj.get("datasets") {
        None => "missing datasets".to_string(),
        Some(ds) if !ds.is_array() => "datasets is not a list".to_string(),
        Some(_) => serde_json::from_value::<ChartSpec>(value.clone())
            .err()
            .map_or_else(|| "unexpected shape".to_string(), |e| e.to_string()),
    }
}
