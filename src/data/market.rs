use crate::error::{GenetraderError, Result};
use crate::types::Bar;
use chrono::{DateTime, Utc};
use polars::prelude::*;

/// OHLCV columns read from a bar table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredColumn {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl RequiredColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Volume => "volume",
        }
    }

    /// Accepted column names, matched case-insensitively
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Open => &["open", "o"],
            Self::High => &["high", "h"],
            Self::Low => &["low", "l"],
            Self::Close => &["close", "c"],
            Self::Volume => &["volume", "vol", "v"],
        }
    }
}

const TIMESTAMP_ALIASES: &[&str] = &["timestamp", "datetime", "date", "time"];

/// Chronologically ordered bar series consumed by the backtester
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketData {
    bars: Vec<Bar>,
}

impl MarketData {
    pub fn from_bars(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    /// Convert a bar table. Open/high/low/close are required and must be non-null;
    /// volume defaults to zero and the timestamp column is optional.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let open = required_values(df, RequiredColumn::Open)?;
        let high = required_values(df, RequiredColumn::High)?;
        let low = required_values(df, RequiredColumn::Low)?;
        let close = required_values(df, RequiredColumn::Close)?;
        let volume = match find_column(df, RequiredColumn::Volume.aliases()) {
            Some(name) => f64_values(df, &name)?,
            None => vec![0.0; df.height()],
        };
        let timestamps = match find_column(df, TIMESTAMP_ALIASES) {
            Some(name) => timestamp_values(df, &name)?,
            None => vec![None; df.height()],
        };

        let bars = (0..df.height())
            .map(|i| Bar {
                timestamp: timestamps[i],
                open: open[i],
                high: high[i],
                low: low[i],
                close: close[i],
                volume: volume[i],
            })
            .collect();

        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.first().and_then(|b| b.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.last().and_then(|b| b.timestamp)
    }

    /// Fails when both series carry timestamps and `later` does not start after `self` ends.
    pub fn ensure_precedes(&self, later: &MarketData) -> Result<()> {
        if let (Some(end), Some(start)) = (self.last_timestamp(), later.first_timestamp()) {
            if end >= start {
                return Err(GenetraderError::Validation(format!(
                    "Training data ends at {} but test data starts at {}",
                    end, start
                )));
            }
        }
        Ok(())
    }
}

fn find_column(df: &DataFrame, aliases: &[&str]) -> Option<String> {
    df.get_column_names()
        .into_iter()
        .find(|name| aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name.as_str())))
        .map(|name| name.to_string())
}

fn required_values(df: &DataFrame, column: RequiredColumn) -> Result<Vec<f64>> {
    let name = find_column(df, column.aliases()).ok_or_else(|| {
        GenetraderError::Validation(format!("Missing required column '{}'", column.as_str()))
    })?;
    f64_values(df, &name)
}

fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    let values = column.f64()?;

    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| {
                GenetraderError::Validation(format!("Null value in '{}' at row {}", name, row))
            })
        })
        .collect()
}

fn timestamp_values(df: &DataFrame, name: &str) -> Result<Vec<Option<DateTime<Utc>>>> {
    let column = df.column(name)?;
    let to_millis: fn(i64) -> i64 = match column.dtype() {
        DataType::Datetime(TimeUnit::Nanoseconds, _) => |v| v / 1_000_000,
        DataType::Datetime(TimeUnit::Microseconds, _) => |v| v / 1_000,
        DataType::Datetime(TimeUnit::Milliseconds, _) => |v| v,
        DataType::Date => |v| v * 86_400_000,
        dtype if dtype.is_integer() => |v| v,
        other => {
            return Err(GenetraderError::Validation(format!(
                "Unsupported timestamp column type {:?}",
                other
            )))
        }
    };

    let raw = column.cast(&DataType::Int64)?;
    let values = raw.i64()?;

    Ok(values
        .into_iter()
        .map(|value| value.and_then(|v| DateTime::<Utc>::from_timestamp_millis(to_millis(v))))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn test_from_dataframe_with_aliases() {
        let df = df! {
            "Open" => &[1.0, 2.0],
            "High" => &[1.5, 2.5],
            "Low" => &[0.5, 1.5],
            "Close" => &[1.2, 2.2],
            "vol" => &[10.0, 20.0],
            "timestamp" => &[1_700_000_000_000i64, 1_700_000_060_000i64],
        }
        .unwrap();

        let data = MarketData::from_dataframe(&df).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.bars()[1].close, 2.2);
        assert_eq!(data.bars()[1].volume, 20.0);
        assert_eq!(
            data.first_timestamp(),
            DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000)
        );
    }

    #[test]
    fn test_missing_volume_defaults_to_zero() {
        let df = df! {
            "open" => &[1.0],
            "high" => &[1.0],
            "low" => &[1.0],
            "close" => &[1.0],
        }
        .unwrap();

        let data = MarketData::from_dataframe(&df).unwrap();
        assert_eq!(data.bars()[0].volume, 0.0);
        assert!(data.bars()[0].timestamp.is_none());
    }

    #[test]
    fn test_missing_close_is_rejected() {
        let df = df! {
            "open" => &[1.0],
            "high" => &[1.0],
            "low" => &[1.0],
        }
        .unwrap();

        assert!(matches!(
            MarketData::from_dataframe(&df),
            Err(GenetraderError::Validation(_))
        ));
    }

    #[test]
    fn test_null_price_is_rejected() {
        let df = df! {
            "open" => &[Some(1.0), None],
            "high" => &[Some(1.0), Some(1.0)],
            "low" => &[Some(1.0), Some(1.0)],
            "close" => &[Some(1.0), Some(1.0)],
        }
        .unwrap();

        assert!(MarketData::from_dataframe(&df).is_err());
    }

    #[test]
    fn test_ensure_precedes_rejects_overlap() {
        let t0 = DateTime::<Utc>::from_timestamp(1_000, 0).unwrap();
        let t1 = DateTime::<Utc>::from_timestamp(2_000, 0).unwrap();
        let bar = Bar::new(1.0, 1.0, 1.0, 1.0, 0.0);

        let early = MarketData::from_bars(vec![bar.with_timestamp(t0)]);
        let late = MarketData::from_bars(vec![bar.with_timestamp(t1)]);

        assert!(early.ensure_precedes(&late).is_ok());
        assert!(late.ensure_precedes(&early).is_err());
    }
}
