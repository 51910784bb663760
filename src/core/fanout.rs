use crate::domain::model::FailurePolicy;
use crate::utils::error::{EtlError, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

type Settled<I, T> = (usize, I, Result<T>);

/// Runs `task` once per item with at most `limit` calls in flight.
///
/// Results are returned in input order. With `limit <= 1` items are processed
/// strictly one after another. Under [`FailurePolicy::Abort`] the first error
/// is returned and no further item is started; outstanding tasks are
/// cancelled when the `JoinSet` is dropped. Under [`FailurePolicy::Skip`]
/// each item's error is kept next to it, except malformed payloads which
/// always abort.
pub async fn fan_out<I, T, F, Fut>(
    items: Vec<I>,
    limit: usize,
    policy: FailurePolicy,
    task: F,
) -> Result<Vec<(I, Result<T>)>>
where
    I: Clone + Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    if limit <= 1 {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            match task(item.clone()).await {
                Err(e) if aborts(&e, policy) => return Err(e),
                outcome => results.push((item, outcome)),
            }
        }
        return Ok(results);
    }

    let semaphore = Arc::new(Semaphore::new(limit));
    let mut tasks: JoinSet<Settled<I, T>> = JoinSet::new();
    let mut slots: Vec<Option<(I, Result<T>)>> = Vec::new();
    slots.resize_with(items.len(), || None);

    for (index, item) in items.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| EtlError::processing(format!("worker pool closed: {}", e)))?;
        let future = task(item.clone());
        tasks.spawn(async move {
            let outcome = future.await;
            drop(permit);
            (index, item, outcome)
        });

        while let Some(joined) = tasks.try_join_next() {
            settle(joined, policy, &mut slots)?;
        }
    }

    while let Some(joined) = tasks.join_next().await {
        settle(joined, policy, &mut slots)?;
    }

    Ok(slots.into_iter().flatten().collect())
}

fn aborts(error: &EtlError, policy: FailurePolicy) -> bool {
    policy == FailurePolicy::Abort || error.is_malformed()
}

fn settle<I, T>(
    joined: std::result::Result<Settled<I, T>, JoinError>,
    policy: FailurePolicy,
    slots: &mut [Option<(I, Result<T>)>],
) -> Result<()> {
    let (index, item, outcome) =
        joined.map_err(|e| EtlError::processing(format!("lookup task failed: {}", e)))?;

    match outcome {
        Err(e) if aborts(&e, policy) => Err(e),
        outcome => {
            slots[index] = Some((item, outcome));
            Ok(())
        }
    }
}
