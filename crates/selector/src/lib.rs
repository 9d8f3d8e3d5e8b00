mod selector;

pub use selector::{select_adaptive_strategy, AdaptiveStrategy};
