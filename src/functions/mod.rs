pub mod indicators;
pub mod primitives;
pub mod registry;
pub mod strategy;
pub mod traits;

pub use registry::IndicatorRegistry;
pub use strategy::{ResolvedStrategy, Term};
pub use traits::{read_indicator, FnIndicator, Indicator, IndicatorReading};
