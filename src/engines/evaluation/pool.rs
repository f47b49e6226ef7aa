use crate::error::{GenetraderError, Result};
use rayon::prelude::*;

/// Worker pool built once and reused for every generation's evaluations.
pub struct EvaluationPool {
    pool: rayon::ThreadPool,
}

impl EvaluationPool {
    /// Sizes the pool to the machine's processing units minus `reserved_threads`, at least 1.
    pub fn new(reserved_threads: usize) -> Result<Self> {
        Self::with_threads(num_cpus::get().saturating_sub(reserved_threads).max(1))
    }

    pub fn with_threads(threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("genetrader-eval-{}", i))
            .build()
            .map_err(|e| GenetraderError::Computation(format!("Failed to create thread pool: {}", e)))?;
        log::debug!("Evaluation pool started with {} threads", pool.current_num_threads());
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Applies `task` to every item in parallel; results keep the input order.
    pub fn map<T, U, F>(&self, items: &[T], task: F) -> Vec<U>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Send + Sync,
    {
        self.pool.install(|| items.par_iter().map(|item| task(item)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_keep_input_order() {
        let pool = EvaluationPool::with_threads(4).unwrap();
        let items: Vec<u64> = (0..100).collect();
        let squares = pool.map(&items, |x| x * x);
        assert_eq!(squares, items.iter().map(|x| x * x).collect::<Vec<_>>());
        assert_eq!(pool.threads(), 4);
    }

    #[test]
    fn test_pool_has_at_least_one_thread() {
        let pool = EvaluationPool::new(usize::MAX).unwrap();
        assert_eq!(pool.threads(), 1);
    }
}
