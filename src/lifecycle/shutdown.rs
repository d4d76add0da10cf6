//! Graceful shutdown signalling.

use tokio::sync::watch;

/// One-shot shutdown flag shared by every long-running task.
///
/// Built on a `watch` channel rather than a broadcast: the flag is level-
/// triggered, so a task that subscribes after the signal has already fired
/// still observes it and drains instead of hanging.
#[derive(Clone)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Obtain a receiver; pass it to [`wait`](Self::wait) or poll it directly.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Raise the flag. Safe to call more than once.
    pub fn trigger(&self) {
        if self.tx.send(true).is_err() {
            tracing::debug!("Shutdown triggered with no tasks listening");
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once the shutdown flag is raised.
pub async fn wait(rx: &mut watch::Receiver<bool>) {
    // Err means the Shutdown handle was dropped; treat that as a signal too.
    let _ = rx.wait_for(|fired| *fired).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn all_subscribers_observe_the_trigger() {
        let shutdown = Shutdown::new();
        let mut a = shutdown.subscribe();
        let mut b = shutdown.subscribe();

        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), wait(&mut a))
            .await
            .expect("first subscriber should unblock");
        tokio::time::timeout(Duration::from_secs(1), wait(&mut b))
            .await
            .expect("second subscriber should unblock");
    }

    #[tokio::test]
    async fn late_subscriber_still_sees_the_flag() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        // subscribed after the fact, yet the level-triggered flag is visible
        let mut late = shutdown.subscribe();
        tokio::time::timeout(Duration::from_secs(1), wait(&mut late))
            .await
            .expect("late subscriber should unblock");
    }
}
