//! # Single-Flight Deduplication
//!
//! Concurrent requests for the same key share one computation. The first
//! caller starts it; later callers join it and receive a clone of the same
//! output.
//!
//! The map holds only a weak handle to the shared future. The computation
//! is polled by its waiters and lives exactly as long as at least one
//! waiter does: when the last waiter cancels, the future is dropped, which
//! aborts whatever it owns (spawned tasks in a `JoinSet`, pending requests).
//! A key whose computation was abandoned starts afresh on the next call.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

struct Flight<T, P> {
    generation: u64,
    future: WeakShared<BoxFuture<'static, T>>,
    progress: P,
}

/// Result of waiting on a flight.
#[derive(Debug, Clone, PartialEq)]
pub enum FlightOutcome<T, P> {
    /// The computation finished. `joined` is true when this caller shared
    /// a computation started by someone else.
    Completed { value: T, joined: bool },
    /// This caller's token fired first. The computation may continue for
    /// other waiters.
    Cancelled { progress: P },
}

/// Deduplicates concurrent computations by key.
///
/// `P` is a progress handle created alongside each computation and handed
/// to every waiter.
pub struct SingleFlight<K, T, P> {
    flights: Mutex<HashMap<K, Flight<T, P>>>,
    next_generation: AtomicU64,
}

impl<K, T, P> std::fmt::Debug for SingleFlight<K, T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.flights.lock().len())
            .finish()
    }
}

impl<K, T, P> Default for SingleFlight<K, T, P> {
    fn default() -> Self {
        Self {
            flights: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }
}

impl<K, T, P> SingleFlight<K, T, P>
where
    K: Eq + Hash + Clone,
    T: Clone + Send + Sync + 'static,
    P: Clone,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys with a live computation.
    pub fn in_flight(&self) -> usize {
        self.flights
            .lock()
            .values()
            .filter(|f| f.future.upgrade().is_some())
            .count()
    }

    /// Join the computation for `key`, starting it with `start` if none is
    /// live, and wait for it or for `cancel`.
    pub async fn run<F>(&self, key: K, cancel: &CancellationToken, start: F) -> FlightOutcome<T, P>
    where
        F: FnOnce() -> (BoxFuture<'static, T>, P),
    {
        let (generation, shared, progress, joined) = self.join_or_start(&key, start);

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => FlightOutcome::Cancelled { progress },
            value = shared => FlightOutcome::Completed { value, joined },
        };

        self.forget(&key, generation);
        outcome
    }

    fn join_or_start<F>(&self, key: &K, start: F) -> (u64, Shared<BoxFuture<'static, T>>, P, bool)
    where
        F: FnOnce() -> (BoxFuture<'static, T>, P),
    {
        let mut flights = self.flights.lock();
        if let Some(flight) = flights.get(key) {
            if let Some(shared) = flight.future.upgrade() {
                return (flight.generation, shared, flight.progress.clone(), true);
            }
        }

        let (future, progress) = start();
        let shared = future.shared();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        if let Some(weak) = shared.downgrade() {
            flights.insert(
                key.clone(),
                Flight {
                    generation,
                    future: weak,
                    progress: progress.clone(),
                },
            );
        }
        (generation, shared, progress, false)
    }

    /// Remove the entry for `key` if it is still this generation and no
    /// waiter is left, or if it already completed.
    fn forget(&self, key: &K, generation: u64) {
        let mut flights = self.flights.lock();
        let stale = flights.get(key).is_some_and(|f| {
            f.generation == generation
                && f.future
                    .upgrade()
                    .map_or(true, |shared| shared.peek().is_some())
        });
        if stale {
            flights.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;

    type Flights = SingleFlight<&'static str, u32, ()>;

    fn slow(value: u32, calls: Arc<AtomicUsize>) -> (BoxFuture<'static, u32>, ()) {
        let fut = async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            value
        }
        .boxed();
        (fut, ())
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_computation() {
        let flights = Arc::new(Flights::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let flights = flights.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                let token = CancellationToken::new();
                flights.run("doc", &token, || slow(7, calls)).await
            }));
        }
        let mut joined = 0;
        for h in handles {
            match h.await.unwrap() {
                FlightOutcome::Completed { value, joined: j } => {
                    assert_eq!(value, 7);
                    joined += usize::from(j);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(joined, 7);
        assert_eq!(flights.in_flight(), 0);
    }

    #[tokio::test]
    async fn sequential_calls_recompute() {
        let flights = Flights::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();
        flights.run("doc", &token, || slow(1, calls.clone())).await;
        flights.run("doc", &token, || slow(1, calls.clone())).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn one_cancelled_waiter_leaves_the_others_running() {
        let flights = Arc::new(Flights::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let quitter = CancellationToken::new();

        let f1 = flights.clone();
        let c1 = calls.clone();
        let q = quitter.clone();
        let first = tokio::spawn(async move { f1.run("doc", &q, || slow(9, c1)).await });
        tokio::time::sleep(Duration::from_millis(5)).await;

        let f2 = flights.clone();
        let c2 = calls.clone();
        let second = tokio::spawn(async move {
            let token = CancellationToken::new();
            f2.run("doc", &token, || slow(9, c2)).await
        });
        tokio::time::sleep(Duration::from_millis(5)).await;

        quitter.cancel();
        assert!(matches!(first.await.unwrap(), FlightOutcome::Cancelled { .. }));
        assert!(matches!(
            second.await.unwrap(),
            FlightOutcome::Completed { value: 9, joined: true }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn last_waiter_leaving_drops_the_computation() {
        let flights = Flights::new();
        let finished = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();
        let done = finished.clone();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });
        let outcome = flights
            .run("doc", &token, move || {
                let fut = async move {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    done.fetch_add(1, Ordering::SeqCst);
                    1
                }
                .boxed();
                (fut, ())
            })
            .await;
        assert!(matches!(outcome, FlightOutcome::Cancelled { .. }));
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
        assert_eq!(flights.in_flight(), 0);
    }
}
