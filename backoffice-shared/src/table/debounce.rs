/// Debounced search input
///
/// Keystrokes go in through [`SearchDebouncer::input`]; a background task
/// waits until the input has been quiet for the configured delay and then
/// emits one [`TableEvent::SearchChanged`] carrying the last value. Dropping
/// the debouncer flushes any pending value and ends the task.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::TableEvent;

/// Quiet period before a search is sent
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

pub struct SearchDebouncer {
    input: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

impl SearchDebouncer {
    /// Starts the debounce task on the current tokio runtime
    ///
    /// # Returns
    ///
    /// The debouncer and the receiver its events arrive on
    pub fn spawn(delay: Duration) -> (Self, mpsc::UnboundedReceiver<TableEvent>) {
        let (input, mut keystrokes) = mpsc::unbounded_channel::<String>();
        let (events, output) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            let mut pending: Option<String> = None;

            loop {
                match pending.take() {
                    None => match keystrokes.recv().await {
                        Some(value) => pending = Some(value),
                        None => break,
                    },
                    Some(value) => {
                        tokio::select! {
                            next = keystrokes.recv() => match next {
                                Some(newer) => pending = Some(newer),
                                None => {
                                    let _ = events.send(TableEvent::SearchChanged(value));
                                    break;
                                }
                            },
                            _ = tokio::time::sleep(delay) => {
                                tracing::trace!(search = %value, "Search input settled");
                                if events.send(TableEvent::SearchChanged(value)).is_err() {
                                    break;
                                }
                            }
                        }
                    }
                }
            }
        });

        (Self { input, task }, output)
    }

    /// Records the current contents of the search box
    pub fn input(&self, value: impl Into<String>) {
        // Fails only after the task ended, when there is nobody left to notify
        let _ = self.input.send(value.into());
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_emits_once_with_last_value() {
        let (debouncer, mut events) = SearchDebouncer::spawn(SEARCH_DEBOUNCE);

        debouncer.input("s");
        debouncer.input("sm");
        debouncer.input("smith");

        assert_eq!(
            events.recv().await,
            Some(TableEvent::SearchChanged("smith".to_string()))
        );

        let quiet = tokio::time::timeout(Duration::from_secs(5), events.recv()).await;
        assert!(quiet.is_err(), "no second event for one burst");
        assert!(debouncer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_emit_separately() {
        let (debouncer, mut events) = SearchDebouncer::spawn(SEARCH_DEBOUNCE);

        debouncer.input("a");
        tokio::time::sleep(Duration::from_millis(400)).await;
        debouncer.input("ab");

        assert_eq!(events.recv().await, Some(TableEvent::SearchChanged("a".to_string())));
        assert_eq!(events.recv().await, Some(TableEvent::SearchChanged("ab".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_flushes_pending_value() {
        let (debouncer, mut events) = SearchDebouncer::spawn(SEARCH_DEBOUNCE);

        debouncer.input("pending");
        drop(debouncer);

        assert_eq!(
            events.recv().await,
            Some(TableEvent::SearchChanged("pending".to_string()))
        );
        assert_eq!(events.recv().await, None);
    }
}
