use diary_common::{AuthorizationGate, DiaryEntry, EntryId, EntryStore, NetworkError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Minimum time the loading state stays visible.
pub const DEFAULT_LOADING_FLOOR: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Ready {
        entry: DiaryEntry,

        /// From the authorization gate at load time, never from the entry.
        is_author: bool,
    },
    Failed {
        reason: String,
    },
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }
}

/// One mounted detail view.
///
/// Dropping the view tears it down.
pub struct EntryView {
    state: Arc<watch::Sender<ViewState>>,
    cancel: CancellationToken,
}

impl EntryView {
    /// Enters `Loading` and starts the fetch on the current tokio runtime.
    ///
    /// The state leaves `Loading` once the fetch has resolved *and* `floor`
    /// has elapsed since mount, whichever comes last. `Failed` is terminal.
    pub fn mount(
        entries: Arc<dyn EntryStore>,
        gate: Arc<dyn AuthorizationGate>,
        id: EntryId,
        floor: Duration,
    ) -> Self {
        let (tx, _) = watch::channel(ViewState::Loading);
        let state = Arc::new(tx);
        let cancel = CancellationToken::new();

        tokio::spawn(load(
            entries,
            gate,
            id,
            floor,
            state.clone(),
            cancel.clone(),
        ));

        Self { state, cancel }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Discards any pending transition. No state is written afterwards.
    pub fn teardown(&self) {
        if !self.cancel.is_cancelled() {
            debug!("View torn down");
            self.cancel.cancel();
        }
    }

    /// Waits until the view leaves `Loading`. `None` if it is torn down first.
    pub async fn settled(&self) -> Option<ViewState> {
        let mut rx = self.subscribe();
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            state = rx.wait_for(|s| !s.is_loading()) => state.ok().map(|s| (*s).clone()),
        }
    }
}

impl Drop for EntryView {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[instrument(skip(entries, gate, state, cancel))]
async fn load(
    entries: Arc<dyn EntryStore>,
    gate: Arc<dyn AuthorizationGate>,
    id: EntryId,
    floor: Duration,
    state: Arc<watch::Sender<ViewState>>,
    cancel: CancellationToken,
) {
    // The floor runs from mount, alongside the fetch.
    let fetch_and_floor = async {
        let (result, ()) = tokio::join!(entries.fetch_entry(&id), tokio::time::sleep(floor));
        result
    };

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        result = fetch_and_floor => result,
    };

    if cancel.is_cancelled() {
        return;
    }

    let next = match result {
        Ok(entry) => {
            let is_author = gate.is_authorized();
            info!(entry_id = %id, is_author, "Entry loaded");
            ViewState::Ready { entry, is_author }
        }
        Err(err) => {
            let err = NetworkError::from_anyhow("fetch_entry", &err);
            warn!(entry_id = %id, error = %err, "Entry load failed");
            ViewState::Failed {
                reason: err.to_string(),
            }
        }
    };

    state.send_replace(next);
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use diary_common::{Category, MediaId, Submission};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    struct SlowEntries {
        latency: Duration,
        fail: bool,
        fetches: AtomicUsize,
    }

    impl SlowEntries {
        fn new(latency_ms: u64, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                latency: Duration::from_millis(latency_ms),
                fail,
                fetches: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl EntryStore for SlowEntries {
        async fn fetch_entry(&self, id: &EntryId) -> Result<DiaryEntry> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;
            if self.fail {
                return Err(anyhow!("404 not found"));
            }
            Ok(DiaryEntry {
                id: Some(id.clone()),
                title: "Market".to_string(),
                real_content: "<p>tteokbokki</p>".to_string(),
                category: Category::Food,
                img_data: vec![MediaId::new("a.png")],
                ..DiaryEntry::default()
            })
        }

        async fn create_entry(&self, _: &Submission) -> Result<EntryId> {
            unreachable!()
        }

        async fn update_entry(&self, _: &EntryId, _: &Submission) -> Result<()> {
            unreachable!()
        }

        async fn delete_entry(&self, _: &EntryId) -> Result<()> {
            unreachable!()
        }
    }

    fn mount(entries: Arc<SlowEntries>, author: bool) -> EntryView {
        EntryView::mount(
            entries,
            Arc::new(move || author),
            EntryId::new("e-1"),
            DEFAULT_LOADING_FLOOR,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_fetch_waits_for_floor() {
        let start = Instant::now();
        let view = mount(SlowEntries::new(100, false), true);
        assert!(view.state().is_loading());

        let state = view.settled().await.unwrap();

        assert!(start.elapsed() >= DEFAULT_LOADING_FLOOR);
        match state {
            ViewState::Ready { entry, is_author } => {
                assert_eq!(entry.title, "Market");
                assert!(is_author);
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_is_not_padded() {
        let start = Instant::now();
        let view = mount(SlowEntries::new(800, false), false);

        let state = view.settled().await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(800));
        assert!(start.elapsed() < Duration::from_millis(1300));
        assert!(matches!(state, ViewState::Ready { is_author: false, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_is_terminal() {
        let entries = SlowEntries::new(100, true);
        let view = mount(entries.clone(), true);

        let state = view.settled().await.unwrap();
        assert!(matches!(state, ViewState::Failed { ref reason } if reason.contains("404")));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(entries.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(view.state(), state);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_write_after_teardown() {
        let view = mount(SlowEntries::new(100, false), true);
        let mut spy = view.subscribe();

        // Fetch resolved at 100ms; the floor is still pending at 200ms.
        tokio::time::sleep(Duration::from_millis(200)).await;
        view.teardown();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(!spy.has_changed().unwrap());
        assert_eq!(*spy.borrow_and_update(), ViewState::Loading);
        assert!(view.settled().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_tears_down() {
        let view = mount(SlowEntries::new(100, false), true);
        let mut spy = view.subscribe();
        drop(view);

        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(!spy.has_changed().unwrap_or(false));
        assert_eq!(*spy.borrow_and_update(), ViewState::Loading);
    }
}
