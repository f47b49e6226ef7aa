pub mod market;
pub mod splitter;

pub use market::{MarketData, RequiredColumn};
pub use splitter::{DataSplit, DataSplitter, SimpleSplitter};
