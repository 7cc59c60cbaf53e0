/// Charting engine seam and the default Chart.js engine.
///
/// The engine receives a canvas id plus a `ChartConfig` and hands back a
/// handle that can be destroyed. `ChartJsEngine` keeps every live chart in a
/// registry and emits one bootstrap `<script>` for the rendered page;
/// destroying a handle removes its chart from that registry.
use std::cell::RefCell;
use std::rc::Rc;

use super::config::ChartConfig;
use crate::error::ChartError;

/// A live chart owned by the engine.
pub trait ChartHandle {
    /// Release the chart. Called at most once per handle.
    fn destroy(&mut self);
}

/// External charting engine.
pub trait ChartEngine {
    fn create(
        &mut self,
        canvas_id: &str,
        config: &ChartConfig,
    ) -> Result<Box<dyn ChartHandle>, ChartError>;
}

/// A chart bound to one placeholder, owned by the render state.
pub struct ChartInstance {
    pub placeholder_id: String,
    pub canvas_id: String,
    handle: Option<Box<dyn ChartHandle>>,
}

impl ChartInstance {
    pub fn new(placeholder_id: String, canvas_id: String, handle: Box<dyn ChartHandle>) -> Self {
        Self {
            placeholder_id,
            canvas_id,
            handle: Some(handle),
        }
    }

    /// Destroy the underlying chart. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.destroy();
        }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.handle.is_some()
    }
}

impl std::fmt::Debug for ChartInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartInstance")
            .field("placeholder_id", &self.placeholder_id)
            .field("canvas_id", &self.canvas_id)
            .field("live", &self.is_live())
            .finish()
    }
}

// ── Chart.js engine ──────────────────────────────────────────────────

/// Live charts as `(canvas_id, config_json)`, in creation order.
type Registry = Rc<RefCell<Vec<(String, String)>>>;

/// Emits Chart.js constructor calls for every live chart.
#[derive(Default, Clone)]
pub struct ChartJsEngine {
    live: Registry,
}

struct ChartJsHandle {
    canvas_id: String,
    live: Registry,
}

impl ChartHandle for ChartJsHandle {
    fn destroy(&mut self) {
        self.live.borrow_mut().retain(|(id, _)| *id != self.canvas_id);
    }
}

impl ChartEngine for ChartJsEngine {
    fn create(
        &mut self,
        canvas_id: &str,
        config: &ChartConfig,
    ) -> Result<Box<dyn ChartHandle>, ChartError> {
        let json = serde_json::to_string(config).map_err(|e| ChartError::Engine(e.to_string()))?;

        let mut live = self.live.borrow_mut();
        if live.iter().any(|(id, _)| id == canvas_id) {
            return Err(ChartError::Engine(format!(
                "canvas {canvas_id} is already in use"
            )));
        }
        live.push((canvas_id.to_string(), json));

        Ok(Box::new(ChartJsHandle {
            canvas_id: canvas_id.to_string(),
            live: Rc::clone(&self.live),
        }))
    }
}

/// Re-creates the tick and tooltip callbacks from the JSON hints.
const BOOTSTRAP_JS: &str = r#"
function reportviewChart(id, cfg) {
  const fmt = (d) => new Intl.NumberFormat('en-US', { maximumFractionDigits: d });
  const tick = (d) => (value) => Number(Number(value).toFixed(d));
  for (const axis of Object.values(cfg.options.scales || {})) {
    if (axis.ticks && axis.ticks.maxDecimals !== undefined) {
      axis.ticks.callback = tick(axis.ticks.maxDecimals);
    }
  }
  const tip = cfg.options.plugins.tooltip;
  const number = fmt(tip.maxFractionDigits);
  tip.callbacks = {
    label(ctx) {
      let label = (tip.labelSource === 'category' ? ctx.label : ctx.dataset.label) || '';
      if (label) { label += ': '; }
      let value;
      if (ctx.parsed.y !== undefined) value = ctx.parsed.y;
      else if (ctx.parsed.r !== undefined) value = ctx.parsed.r;
      else value = ctx.parsed;
      if (value !== null && value !== undefined) { label += number.format(value); }
      return label;
    }
  };
  const canvas = document.getElementById(id);
  if (canvas) { new Chart(canvas.getContext('2d'), cfg); }
}
"#;

impl ChartJsEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of charts currently alive.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.borrow().len()
    }

    /// `<script>` block instantiating every live chart, in creation order.
    #[must_use]
    pub fn bootstrap_script(&self) -> String {
        let live = self.live.borrow();
        let mut out = String::from("<script>");
        out.push_str(BOOTSTRAP_JS);
        for (canvas_id, json) in live.iter() {
            // Keep `</script>` sequences inside string literals from closing the tag.
            let json = json.replace("</", "<\\/");
            out.push_str(&format!("reportviewChart({canvas_id:?}, {json});\n"));
        }
        out.push_str("</script>");
        out
    }
}
