mod adaptive;
mod ensemble;
mod split;
mod trainer;

pub use adaptive::{AdaptiveFallback, ADAPTIVE_MODEL_NAME};
pub use ensemble::average_forecasts;
pub use split::{SplitStrategy, TrainTestSplit};
pub use trainer::{Horizon, ModelBank, Scoring};
