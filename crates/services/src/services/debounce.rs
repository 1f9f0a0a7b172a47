//! Coalesces search-box keystrokes so filtering runs once typing pauses.

use std::time::Duration;

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::sleep,
};
use tracing::trace;
use utils::config::Config;

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Publishes the latest pushed term once no new term has arrived for `delay`.
///
/// The background task stops when the debouncer is dropped.
pub struct SearchDebouncer {
    input: mpsc::UnboundedSender<String>,
    output: watch::Receiver<String>,
    task: JoinHandle<()>,
}

impl SearchDebouncer {
    pub fn spawn(delay: Duration) -> Self {
        let (input, mut rx) = mpsc::unbounded_channel::<String>();
        let (tx, output) = watch::channel(String::new());

        let task = tokio::spawn(async move {
            let mut pending: Option<String> = None;
            loop {
                match pending.take() {
                    None => match rx.recv().await {
                        Some(term) => pending = Some(term),
                        None => break,
                    },
                    Some(term) => tokio::select! {
                        next = rx.recv() => match next {
                            Some(next) => pending = Some(next),
                            None => break,
                        },
                        _ = sleep(delay) => {
                            trace!(term = %term, "Publishing debounced search term");
                            tx.send_if_modified(|current| {
                                if *current == term {
                                    false
                                } else {
                                    *current = term;
                                    true
                                }
                            });
                        }
                    },
                }
            }
        });

        Self {
            input,
            output,
            task,
        }
    }

    /// Uses the configured `search_debounce` delay.
    pub fn from_config(config: &Config) -> Self {
        Self::spawn(config.search_debounce)
    }

    pub fn push(&self, term: impl Into<String>) {
        // The task only exits once this sender is gone.
        let _ = self.input.send(term.into());
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.output.clone()
    }

    /// Last published term.
    pub fn current(&self) -> String {
        self.output.borrow().clone()
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::spawn(DEFAULT_SEARCH_DEBOUNCE)
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
