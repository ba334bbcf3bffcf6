//! Memoising wrapper around [`FleetOptimizer`].
//!
//! Entries are keyed by the exact bit patterns of the request, so two
//! requests share a result only when they are identical. Each key owns a
//! [`OnceLock`]; concurrent callers with the same key block on the first
//! computation instead of starting their own.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use log::debug;

use crate::{FleetOptimizer, OptimizationRequest, OptimizeError, RouteSolver, Solution};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    locations: Vec<(u64, u64)>,
    demands: Vec<u32>,
    num_vehicles: usize,
    time_limit_seconds: Option<u64>,
}

impl From<&OptimizationRequest> for CacheKey {
    fn from(request: &OptimizationRequest) -> Self {
        Self {
            locations: request
                .locations
                .iter()
                .map(|location| (location.latitude.to_bits(), location.longitude.to_bits()))
                .collect(),
            demands: request.demands.clone(),
            num_vehicles: request.num_vehicles,
            time_limit_seconds: request.time_limit_seconds,
        }
    }
}

type Entry = Arc<OnceLock<Result<Solution, OptimizeError>>>;

/// [`FleetOptimizer`] that computes each distinct request at most once.
///
/// Errors are cached alongside solutions.
#[derive(Debug)]
pub struct CachedOptimizer<S> {
    optimizer: FleetOptimizer<S>,
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl<S: RouteSolver> CachedOptimizer<S> {
    /// Wrap an optimizer with an empty cache.
    #[must_use]
    pub fn new(optimizer: FleetOptimizer<S>) -> Self {
        Self {
            optimizer,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The wrapped optimizer.
    #[must_use]
    pub const fn inner(&self) -> &FleetOptimizer<S> {
        &self.optimizer
    }

    /// Return the cached result for `request`, computing it on first use.
    ///
    /// # Errors
    /// Returns the [`OptimizeError`] produced by the first computation.
    pub fn optimize(&self, request: &OptimizationRequest) -> Result<Solution, OptimizeError> {
        let key = CacheKey::from(request);
        let entry = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(entries.entry(key).or_default())
        };
        entry
            .get_or_init(|| {
                debug!("solve cache miss for {} locations", request.locations.len());
                self.optimizer.optimize(request)
            })
            .clone()
    }

    /// Number of cached requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Report whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached result.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CountingSolver, accra_request};
    use rstest::rstest;

    #[rstest]
    fn reuses_results_for_identical_requests() {
        let cache = CachedOptimizer::new(FleetOptimizer::new(CountingSolver::default()));
        let first = cache.optimize(&accra_request()).expect("valid request");
        let second = cache.optimize(&accra_request()).expect("valid request");
        assert_eq!(first, second);
        assert_eq!(cache.inner().solver().calls(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    fn distinguishes_vehicle_counts() {
        let cache = CachedOptimizer::new(FleetOptimizer::new(CountingSolver::default()));
        let mut request = accra_request();
        cache.optimize(&request).expect("valid request");
        request.num_vehicles = 3;
        cache.optimize(&request).expect("valid request");
        assert_eq!(cache.inner().solver().calls(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[rstest]
    fn caches_errors_and_clears() {
        let cache = CachedOptimizer::new(FleetOptimizer::new(CountingSolver::default()));
        let mut request = accra_request();
        request.demands.pop();
        assert!(cache.optimize(&request).is_err());
        assert!(cache.optimize(&request).is_err());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
