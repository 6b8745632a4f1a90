//! Live binding of one content document.
//!
//! A [`LiveBinding`] owns a background task that loads the document
//! through the content service and then follows the store's change feed.
//! Each observed change clears the content cache and republishes the
//! fresh snapshot. Cancelling or dropping the binding ends the task, so
//! no subscription outlives its holder.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::kind::ContentKind;
use crate::service::ContentService;

/// Observable state of a binding.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingState<T> {
    Idle,
    Loading,
    /// Latest snapshot; `None` when the document does not exist yet.
    Ready(Option<T>),
    Error(String),
}

impl<T> BindingState<T> {
    pub fn is_settled(&self) -> bool {
        matches!(self, BindingState::Ready(_) | BindingState::Error(_))
    }
}

pub struct LiveBinding<T: ContentKind> {
    state: watch::Receiver<BindingState<T>>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl<T: ContentKind> LiveBinding<T> {
    /// Start following `T`'s document. Must be called inside a tokio runtime.
    pub fn mount(service: ContentService) -> Self {
        let (state_tx, state) = watch::channel(BindingState::Idle);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(follow::<T>(service, state_tx, shutdown_rx));
        Self {
            state,
            shutdown,
            task,
        }
    }

    /// Current state.
    pub fn state(&self) -> BindingState<T> {
        self.state.borrow().clone()
    }

    /// Latest loaded document, if any.
    pub fn current(&self) -> Option<T> {
        match &*self.state.borrow() {
            BindingState::Ready(doc) => doc.clone(),
            _ => None,
        }
    }

    /// Wait for the next state transition. `None` once the binding task
    /// has ended and no further states will arrive.
    pub async fn changed(&mut self) -> Option<BindingState<T>> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// Wait until the state satisfies `predicate`.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&BindingState<T>) -> bool,
    ) -> Option<BindingState<T>> {
        let state = self.state.wait_for(|s| predicate(s)).await.ok()?;
        Some(state.clone())
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop following the document. Also runs on drop.
    pub fn cancel(&mut self) {
        let _ = self.shutdown.send(true);
        self.task.abort();
    }
}

impl<T: ContentKind> Drop for LiveBinding<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn follow<T: ContentKind>(
    service: ContentService,
    state: watch::Sender<BindingState<T>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let id = T::ID;
    // Subscribe before the first read so a write landing in between is
    // still observed.
    let mut feed = service.subscribe(id);

    state.send_replace(BindingState::Loading);
    let initial = match service.try_get::<T>().await {
        Ok(doc) => BindingState::Ready(doc),
        Err(e) => {
            error!(%id, error = %e, "live binding initial load failed");
            BindingState::Error(e.to_string())
        }
    };
    state.send_replace(initial);
    debug!(%id, "live binding ready");

    loop {
        tokio::select! {
            changed = feed.changed() => {
                if changed.is_err() {
                    warn!(%id, "change feed closed, live binding stopped");
                    state.send_replace(BindingState::Error("change feed closed".into()));
                    break;
                }
                let snapshot = feed.borrow_and_update().clone();
                let Some(doc) = snapshot.and_then(T::from_document) else {
                    continue;
                };
                service.clear_cache().await;
                debug!(%id, "live binding refreshed");
                state.send_replace(BindingState::Ready(Some(doc)));
            }
            _ = shutdown.changed() => {
                debug!(%id, "live binding cancelled");
                break;
            }
        }
    }
}
