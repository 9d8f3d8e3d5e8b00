pub mod backtester;
pub mod data_generator;
pub mod metrics;
pub mod reporter;
