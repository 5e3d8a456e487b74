//! Core functionality for the LLM response dashboard
//!
//! This crate holds the canonical record model, the chart/table projections,
//! the shared selection and the application state store that both views
//! render from.

pub mod events;
pub mod projection;
pub mod record;
pub mod selection;
pub mod settings;
pub mod state;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use events::EventBus;
pub use projection::{to_chart_points, to_table_rows, ChartPoint, Projections, TableRow, TimeFormatter};
pub use record::{EvaluationMetrics, ResponseError, ResponseRecord, ResponseStatus};
pub use selection::{SelectionCoordinator, SelectionSet, SelectionSource};
pub use settings::AppSettings;
pub use state::{AppAction, AppState, DatasetVersion};
pub use stats::{detect_anomalies, DatasetStats};
pub use store::{AppStore, LoadingGuard};
