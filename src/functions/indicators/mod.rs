//! Built-in indicator catalog.
//!
//! Outputs are centered and scaled so that a unit-norm weight vector produces
//! signals on the order of the entry (0.5) and exit (0.2) thresholds.

pub mod momentum;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use trend::{SMA, EMA, WMA, DEMA, MACD};
pub use momentum::{RSI, Momentum, ROC, Stochastic, WilliamsR, CCI, CMO};
pub use volatility::{ATR, BollingerBands, Donchian, Keltner};
pub use volume::{OBV, VWMA, MFI, CMF};
