use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::sync::watch;

use crate::{error::PlayerError, types::PlaybackState};

/// One-shot readiness signal for the playback device.
///
/// The player bootstrap resolves it exactly once with the device id; any
/// number of waiters observe the same value.
#[derive(Clone)]
pub struct PlayerReadiness {
    tx: watch::Sender<Option<String>>,
}

impl Default for PlayerReadiness {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerReadiness {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn resolve(&self, device_id: impl Into<String>) -> Result<(), PlayerError> {
        let device_id = device_id.into();
        let resolved = self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(device_id);
            true
        });

        if resolved {
            Ok(())
        } else {
            Err(PlayerError::AlreadyResolved)
        }
    }

    pub fn device_id(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    pub async fn wait(&self, timeout: Duration) -> Result<String, PlayerError> {
        let mut rx = self.tx.subscribe();
        match tokio::time::timeout(timeout, rx.wait_for(|d| d.is_some())).await {
            Ok(Ok(device_id)) => device_id
                .clone()
                .ok_or(PlayerError::ReadyTimeout(timeout)),
            _ => Err(PlayerError::ReadyTimeout(timeout)),
        }
    }
}

pub type StateHandler = Arc<dyn Fn(&PlaybackState) + Send + Sync>;

/// Token returned by [`PlayerEvents::on_state_change`]; pass it back to
/// [`PlayerEvents::unsubscribe`] on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subscription(u64);

#[derive(Default)]
struct Handlers {
    next_id: u64,
    entries: BTreeMap<u64, StateHandler>,
}

/// Player state-change notifications.
#[derive(Clone, Default)]
pub struct PlayerEvents {
    handlers: Arc<Mutex<Handlers>>,
}

impl PlayerEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_state_change<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&PlaybackState) + Send + Sync + 'static,
    {
        let mut handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        let id = handlers.next_id;
        handlers.next_id += 1;
        handlers.entries.insert(id, Arc::new(handler));
        Subscription(id)
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .remove(&subscription.0)
            .is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn emit(&self, state: &PlaybackState) {
        // handlers run outside the lock so they may (un)subscribe
        let handlers: Vec<StateHandler> = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .values()
            .cloned()
            .collect();

        for handler in handlers {
            handler(state);
        }
    }
}
