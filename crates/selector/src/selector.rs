use std::fmt;

use common::AdaptiveConfig;
use tracing::debug;

/// Behavior of the adaptive fallback model for a given history length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptiveStrategy {
    /// Forecast the training mean at every step.
    ConstantMean,
    /// Fit a plain linear regression on the week index.
    Linear,
    /// History is long enough; no adaptive forecast is produced.
    Omitted,
}

impl AdaptiveStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            AdaptiveStrategy::ConstantMean => "constant_mean",
            AdaptiveStrategy::Linear => "linear",
            AdaptiveStrategy::Omitted => "omitted",
        }
    }

    pub fn produces_forecast(&self) -> bool {
        !matches!(self, AdaptiveStrategy::Omitted)
    }
}

impl fmt::Display for AdaptiveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pick the adaptive strategy for `n_points` weekly observations.
///
/// `n < constant_below` → constant mean, `n < linear_below` → linear,
/// otherwise omitted.
pub fn select_adaptive_strategy(n_points: usize, config: &AdaptiveConfig) -> AdaptiveStrategy {
    let strategy = if n_points < config.constant_below {
        AdaptiveStrategy::ConstantMean
    } else if n_points < config.linear_below {
        AdaptiveStrategy::Linear
    } else {
        AdaptiveStrategy::Omitted
    };

    debug!(
        n_points,
        constant_below = config.constant_below,
        linear_below = config.linear_below,
        strategy = %strategy,
        "Adaptive strategy selected"
    );
    strategy
}
