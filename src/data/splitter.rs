use crate::error::{GenetraderError, Result};
use polars::prelude::*;

/// Chronological train/test partition of one bar table
#[derive(Debug, Clone)]
pub struct DataSplit {
    pub train: DataFrame,
    pub test: DataFrame,
}

pub trait DataSplitter: Send + Sync {
    fn split(&self, data: &DataFrame) -> Result<DataSplit>;
}

/// Leading `train_pct` of the rows trains, the remainder tests.
pub struct SimpleSplitter {
    train_pct: f64,
}

impl SimpleSplitter {
    pub fn new(train_pct: f64) -> Self {
        Self { train_pct }
    }
}

impl DataSplitter for SimpleSplitter {
    fn split(&self, data: &DataFrame) -> Result<DataSplit> {
        let total_rows = data.height();
        let train_rows = (total_rows as f64 * self.train_pct) as usize;

        if train_rows == 0 || train_rows >= total_rows {
            return Err(GenetraderError::Validation(format!(
                "Invalid split: {} training rows out of {}",
                train_rows, total_rows
            )));
        }

        Ok(DataSplit {
            train: data.slice(0, train_rows),
            test: data.slice(train_rows as i64, total_rows - train_rows),
        })
    }
}
