use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

const CHANNEL_CAPACITY: usize = 32;

/// Host-side event source (deep links, back presses). Each subscriber gets
/// its own receiver task; dropping the returned `Subscription` aborts it.
pub struct EventHub<E> {
    tx: broadcast::Sender<E>,
}

impl<E> Clone for EventHub<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<E: Clone + Send + 'static> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone + Send + 'static> EventHub<E> {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Must be called from within a tokio runtime.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(E) + Send + Sync + 'static,
    {
        let mut rx = self.tx.subscribe();
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => listener(event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "host event listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Subscription { task: Some(task) }
    }

    /// Queues `event` for every current subscriber and returns how many
    /// there were.
    pub fn emit(&self, event: E) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Disposer for a registered listener.
#[must_use = "dropping a Subscription unsubscribes"]
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Stops the listener and waits until its receiver is gone.
    pub async fn unsubscribe(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Event sources the operating system feeds into the running app.
#[derive(Clone, Default)]
pub struct HostEvents {
    pub deep_links: EventHub<String>,
    pub back_presses: EventHub<()>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    async fn wait_until(cond: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while !cond() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_emit_reaches_subscribers() {
        let hub: EventHub<String> = EventHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = hub.subscribe(move |url| sink.lock().unwrap().push(url));

        assert_eq!(hub.emit("pangkas://payment/success".to_string()), 1);
        wait_until(|| !seen.lock().unwrap().is_empty()).await;
        assert_eq!(seen.lock().unwrap().as_slice(), ["pangkas://payment/success"]);
    }

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let hub: EventHub<u8> = EventHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = hub.subscribe(move |n| sink.lock().unwrap().push(n));

        for n in 0..5 {
            hub.emit(n);
        }
        wait_until(|| seen.lock().unwrap().len() == 5).await;
        assert_eq!(seen.lock().unwrap().as_slice(), [0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let hub: EventHub<()> = EventHub::new();
        let hits = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&hits);
        let sub = hub.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hub.listener_count(), 1);

        hub.emit(());
        wait_until(|| hits.load(Ordering::SeqCst) == 1).await;

        drop(sub);
        wait_until(|| hub.listener_count() == 0).await;
        assert_eq!(hub.emit(()), 0);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_explicit_unsubscribe_leaves_others() {
        let hub: EventHub<u8> = EventHub::new();
        let first = hub.subscribe(|_| {});
        let _second = hub.subscribe(|_| {});
        first.unsubscribe().await;
        assert_eq!(hub.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_subscription_outlives_hub() {
        let hub: EventHub<u8> = EventHub::new();
        let sub = hub.subscribe(|_| {});
        drop(hub);
        sub.unsubscribe().await;
    }
}
