mod dataset;
mod pipeline;
mod report;

pub use dataset::{Dataset, FeatureRequest};
pub use pipeline::{
    forecast_feature, forecast_weekly, run_feature, run_weekly, FeatureRun, WeeklyRun,
};
pub use report::{
    assemble_feature, assemble_weekly, DebugInfo, EnsembleEntry, ErrorReport, FeatureReport,
    HistoryEntry, ModelReport, PredictionEntry, WeeklyReport,
};
