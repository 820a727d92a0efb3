//! Trailing debounce over a `watch` channel of raw input.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

const SETTLED_CHANNEL_CAPACITY: usize = 16;

/// Spawns a task that emits the input value once it has stopped changing for
/// `window`.
///
/// Every change restarts the timer, so a burst of edits yields one emission
/// carrying the last value. A settled value equal to the previous emission
/// (or to the input's value at spawn time) is not emitted again. The task
/// ends when the input sender or the returned receiver is dropped.
pub fn spawn_debouncer(
    mut input: watch::Receiver<String>,
    window: Duration,
) -> (mpsc::Receiver<String>, JoinHandle<()>) {
    let (settled_tx, settled_rx) = mpsc::channel(SETTLED_CHANNEL_CAPACITY);
    // Read before spawning: a change made before the task first runs must
    // still count as a change.
    let mut last_settled = input.borrow_and_update().clone();

    let handle = tokio::spawn(async move {
        while input.changed().await.is_ok() {
            // Quiet period: restart the timer on every further change.
            loop {
                tokio::select! {
                    changed = input.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                    () = tokio::time::sleep(window) => break,
                }
            }

            let settled = input.borrow_and_update().clone();
            if settled == last_settled {
                continue;
            }
            last_settled.clone_from(&settled);
            tracing::debug!(query = %settled, "search input settled");
            if settled_tx.send(settled).await.is_err() {
                return;
            }
        }
    });

    (settled_rx, handle)
}
