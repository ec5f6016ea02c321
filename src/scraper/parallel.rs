//! Bounded fan-out over independent units of work
//!
//! Used for repositories and for the branches of each repository, keeping
//! results in discovery order.

use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};
use log::debug;

/// Run `task` over every input with at most `max_concurrent` in flight.
///
/// Results come back in input order regardless of completion order. A slow
/// input never blocks the start of later ones beyond the concurrency bound.
///
/// # Example
///
/// ```ignore
/// let reports = run_ordered(
///     repositories,
///     |repo| collect_repository(client, &ctx, &owner, repo),
///     ctx.concurrency,
/// )
/// .await;
/// ```
pub async fn run_ordered<I, T, F, Fut>(inputs: Vec<I>, task: F, max_concurrent: usize) -> Vec<T>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = T>,
{
    let total = inputs.len();
    if total == 0 {
        return Vec::new();
    }
    let max_concurrent = max_concurrent.max(1);

    debug!("Running {} tasks with max {} concurrent", total, max_concurrent);

    let mut slots: Vec<Option<T>> = (0..total).map(|_| None).collect();
    let mut running = FuturesUnordered::new();
    let mut pending = inputs.into_iter().enumerate();

    let start = |index: usize, input: I| {
        let fut = task(input);
        async move { (index, fut.await) }
    };

    for (index, input) in pending.by_ref().take(max_concurrent) {
        running.push(start(index, input));
    }

    while let Some((index, output)) = running.next().await {
        slots[index] = Some(output);

        if let Some((index, input)) = pending.next() {
            running.push(start(index, input));
        }
    }

    slots.into_iter().flatten().collect()
}
