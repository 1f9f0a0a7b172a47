//! Background polling for queries with a refetch interval.

use std::future::Future;

use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{debug, info, warn};

use super::query_cache::{QueryCache, QueryError, QueryKey, QueryOptions};

/// Re-reads one query every `refetch_interval` until dropped.
pub struct RefetchPoller {
    key: QueryKey,
    handle: JoinHandle<()>,
}

impl RefetchPoller {
    /// Returns `None` for queries that are not polled or are disabled.
    pub fn spawn<T, F, Fut, E>(
        cache: QueryCache,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Option<Self>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<QueryError> + 'static,
    {
        let period = options.refetch_interval.filter(|p| !p.is_zero())?;
        if !options.enabled {
            return None;
        }

        info!(key = %key, period = ?period, "Starting refetch poller");
        let poll_key = key.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match cache
                    .refetch::<T, _, _, _>(poll_key.clone(), &options, fetcher.clone())
                    .await
                {
                    Ok(_) => debug!(key = %poll_key, "Refetched query"),
                    Err(e) => warn!(key = %poll_key, error = %e, "Background refetch failed"),
                }
            }
        });

        Some(Self { key, handle })
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for RefetchPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Pollers started together and stopped together, e.g. for one screen.
#[derive(Default)]
pub struct PollerSet {
    pollers: Vec<RefetchPoller>,
}

impl PollerSet {
    pub fn push(&mut self, poller: Option<RefetchPoller>) {
        if let Some(poller) = poller {
            self.pollers.push(poller);
        }
    }

    pub fn len(&self) -> usize {
        self.pollers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pollers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use client::ClientError;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_polls_on_interval_until_dropped() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = {
            let calls = calls.clone();
            move || {
                let calls = calls.clone();
                async move { Ok::<_, QueryError>(calls.fetch_add(1, Ordering::SeqCst)) }
            }
        };

        let poller = RefetchPoller::spawn(
            cache.clone(),
            QueryKey::jotforms(),
            QueryOptions::polling(),
            fetcher,
        )
        .unwrap();

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_secs(62)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        drop(poller);
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_stop_polling() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = {
            let calls = calls.clone();
            move || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<u8, _>(ClientError::UnexpectedStatus {
                        status: 400,
                        body: String::new(),
                    })
                }
            }
        };

        let mut set = PollerSet::default();
        set.push(RefetchPoller::spawn(
            cache,
            QueryKey::random_exhibit(),
            QueryOptions::random_splash(),
            fetcher,
        ));
        assert_eq!(set.len(), 1);

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_unpolled_query_has_no_poller() {
        let fetcher = || async { Ok::<_, QueryError>(0_u8) };
        assert!(
            RefetchPoller::spawn(
                QueryCache::default(),
                QueryKey::profile(),
                QueryOptions::stale_window(),
                fetcher,
            )
            .is_none()
        );
    }
}
