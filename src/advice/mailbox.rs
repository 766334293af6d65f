use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{AdviceProvider, EMPTY_LEDGER_MESSAGE, get_financial_advice};
use crate::domain::Transaction;

/// The advisory-text slot as the presentation layer sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdviceSlot {
    /// Latest completed advice, kept visible while a new request runs.
    pub advice: Option<String>,
    pub loading: bool,
}

/// What happened to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A background task was spawned.
    Started,
    /// Answered inline (empty ledger); no task, no provider call.
    Answered,
    /// A previous request is still running; nothing was started.
    AlreadyPending,
}

/// Runs advice requests in the background and publishes each result into a
/// single slot.
///
/// One request runs at a time. Results overwrite the slot; nothing is
/// queued. The ledger is never touched: each request works on the snapshot
/// it was given.
pub struct AdviceDesk<P> {
    provider: Arc<P>,
    slot: Arc<watch::Sender<AdviceSlot>>,
    task: Option<JoinHandle<()>>,
}

impl<P: AdviceProvider> AdviceDesk<P> {
    pub fn new(provider: P) -> Self {
        let (slot, _) = watch::channel(AdviceSlot::default());
        Self {
            provider: Arc::new(provider),
            slot: Arc::new(slot),
            task: None,
        }
    }

    /// Watch the slot for updates.
    pub fn subscribe(&self) -> watch::Receiver<AdviceSlot> {
        self.slot.subscribe()
    }

    /// Current slot contents.
    pub fn slot(&self) -> AdviceSlot {
        self.slot.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start a request for `snapshot`. Must be called inside a tokio runtime.
    pub fn request(&mut self, snapshot: Vec<Transaction>) -> RequestOutcome {
        if self.is_pending() {
            tracing::debug!("advice request ignored, one is already running");
            return RequestOutcome::AlreadyPending;
        }

        if snapshot.is_empty() {
            self.slot.send_modify(|slot| {
                slot.advice = Some(EMPTY_LEDGER_MESSAGE.to_string());
                slot.loading = false;
            });
            return RequestOutcome::Answered;
        }

        self.slot.send_modify(|slot| slot.loading = true);

        let provider = Arc::clone(&self.provider);
        let slot = Arc::clone(&self.slot);
        self.task = Some(tokio::spawn(async move {
            let text = get_financial_advice(&*provider, &snapshot).await;
            slot.send_modify(|slot| {
                slot.advice = Some(text);
                slot.loading = false;
            });
        }));

        RequestOutcome::Started
    }

    /// Abort the running request, if any. The slot keeps its previous advice.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            self.slot.send_modify(|slot| slot.loading = false);
            tracing::debug!("advice request cancelled");
        }
    }

    /// Wait for the running request to finish and return the slot.
    pub async fn wait(&mut self) -> AdviceSlot {
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                if !err.is_cancelled() {
                    tracing::error!(error = %err, "advice task failed");
                }
                self.slot.send_modify(|slot| slot.loading = false);
            }
        }
        self.slot()
    }
}

impl<P> Drop for AdviceDesk<P> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
