//! Concurrency coverage for `CachedOptimizer`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use minibus_core::{
    CachedOptimizer, FleetOptimizer, Location, OptimizationRequest, RouteSolver, RoutingProblem,
    SolverFailure, VehicleTours,
};
use rstest::rstest;

/// Puts every stop on one tour after a pause, counting calls.
#[derive(Debug, Default)]
struct SlowSolver {
    calls: AtomicUsize,
}

impl RouteSolver for SlowSolver {
    fn solve(&self, problem: &RoutingProblem) -> Result<VehicleTours, SolverFailure> {
        thread::sleep(Duration::from_millis(50));
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![(1..problem.size()).collect()])
    }
}

fn request() -> OptimizationRequest {
    OptimizationRequest::new(
        vec![
            Location::new(5.6037, -0.1870),
            Location::new(5.6137, -0.1870),
            Location::new(5.5937, -0.1770),
        ],
        vec![0, 10, 20],
        1,
    )
}

#[rstest]
fn concurrent_identical_requests_solve_once() {
    let threads = 8;
    let cache = Arc::new(CachedOptimizer::new(FleetOptimizer::new(
        SlowSolver::default(),
    )));
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache.optimize(&request())
            })
        })
        .collect();

    let solutions: Vec<_> = handles
        .into_iter()
        .map(|handle| {
            handle
                .join()
                .expect("worker thread should not panic")
                .expect("valid request")
        })
        .collect();

    assert_eq!(cache.inner().solver().calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
    assert!(solutions.windows(2).all(|pair| pair[0] == pair[1]));
}
