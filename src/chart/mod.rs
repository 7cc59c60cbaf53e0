/// Chart data model, configuration building and materialization.
pub mod config;
pub mod engine;
pub mod materializer;
pub mod model;

pub use config::ChartConfig;
pub use engine::{ChartEngine, ChartHandle, ChartInstance, ChartJsEngine};
pub use materializer::{ChartMaterializer, MaterializeOutcome};
pub use model::{ChartEntry, ChartSpec, ChartType, ColorValue, Dataset};
