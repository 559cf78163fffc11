use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use async_trait::async_trait;
use spotrack::error::{BrowseError, PlayerError};
use spotrack::management::{Credential, PlayerEvents, PlayerReadiness};
use spotrack::spotify::{PlayerControl, bootstrap_player, choose_device};
use spotrack::types::{Device, PlaybackState};

fn device(id: Option<&str>, name: &str, is_active: bool) -> Device {
    Device {
        id: id.map(str::to_string),
        name: name.to_string(),
        is_active,
    }
}

fn idle_state() -> PlaybackState {
    PlaybackState {
        is_playing: false,
        progress_ms: None,
        item: None,
        device: None,
    }
}

/// Player double exposing a fixed device list.
struct DevicesOnly(Vec<Device>);

#[async_trait]
impl PlayerControl for DevicesOnly {
    async fn devices(&self, _: &Credential) -> Result<Vec<Device>, BrowseError> {
        Ok(self.0.clone())
    }

    async fn play(&self, _: &Credential, _: &str, _: &str) -> Result<(), BrowseError> {
        Ok(())
    }

    async fn pause(&self, _: &Credential, _: &str) -> Result<(), BrowseError> {
        Ok(())
    }

    async fn resume(&self, _: &Credential, _: &str) -> Result<(), BrowseError> {
        Ok(())
    }

    async fn next(&self, _: &Credential, _: &str) -> Result<(), BrowseError> {
        Ok(())
    }

    async fn previous(&self, _: &Credential, _: &str) -> Result<(), BrowseError> {
        Ok(())
    }

    async fn state(&self, _: &Credential) -> Result<Option<PlaybackState>, BrowseError> {
        Ok(None)
    }
}

#[tokio::test]
async fn test_readiness_resolves_once() {
    let readiness = PlayerReadiness::new();
    assert_eq!(readiness.device_id(), None);

    readiness.resolve("device-1").unwrap();
    assert_eq!(
        readiness.resolve("device-2"),
        Err(PlayerError::AlreadyResolved)
    );

    assert_eq!(readiness.device_id().as_deref(), Some("device-1"));
    assert_eq!(
        readiness.wait(Duration::from_millis(10)).await,
        Ok("device-1".to_string())
    );
}

#[tokio::test]
async fn test_readiness_wakes_every_waiter() {
    let readiness = PlayerReadiness::new();

    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let readiness = readiness.clone();
            tokio::spawn(async move { readiness.wait(Duration::from_secs(5)).await })
        })
        .collect();

    readiness.resolve("device-1").unwrap();

    for waiter in waiters {
        assert_eq!(waiter.await.unwrap(), Ok("device-1".to_string()));
    }
}

#[tokio::test]
async fn test_readiness_times_out() {
    let readiness = PlayerReadiness::new();
    let timeout = Duration::from_millis(20);

    assert_eq!(
        readiness.wait(timeout).await,
        Err(PlayerError::ReadyTimeout(timeout))
    );
    assert_eq!(
        BrowseError::from(PlayerError::ReadyTimeout(timeout)),
        BrowseError::PlayerNotReady
    );
}

#[test]
fn test_events_subscribe_and_unsubscribe() {
    let events = PlayerEvents::new();
    let seen = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&seen);
    let subscription = events.on_state_change(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(events.subscriber_count(), 1);

    events.emit(&idle_state());
    events.emit(&idle_state());
    assert_eq!(seen.load(Ordering::SeqCst), 2);

    assert!(events.unsubscribe(subscription));
    assert!(!events.unsubscribe(subscription));
    assert_eq!(events.subscriber_count(), 0);

    events.emit(&idle_state());
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[test]
fn test_handler_may_unsubscribe_itself() {
    let events = PlayerEvents::new();
    let slot: Arc<std::sync::Mutex<Option<spotrack::management::Subscription>>> =
        Arc::new(std::sync::Mutex::new(None));

    let inner_events = events.clone();
    let inner_slot = Arc::clone(&slot);
    let subscription = events.on_state_change(move |_| {
        if let Some(s) = inner_slot.lock().unwrap().take() {
            inner_events.unsubscribe(s);
        }
    });
    *slot.lock().unwrap() = Some(subscription);

    events.emit(&idle_state());
    assert_eq!(events.subscriber_count(), 0);
}

#[test]
fn test_choose_device() {
    let devices = vec![
        device(Some("1"), "Kitchen", false),
        device(Some("2"), "Laptop", true),
        device(None, "Restricted", false),
    ];

    assert_eq!(choose_device(&devices, Some("kitchen")).unwrap().name, "Kitchen");
    assert_eq!(choose_device(&devices, None).unwrap().name, "Laptop");
    // Unknown preference falls back to the active device
    assert_eq!(choose_device(&devices, Some("Car")).unwrap().name, "Laptop");
    // Devices without an id cannot be targeted
    assert_eq!(choose_device(&devices, Some("Restricted")).unwrap().name, "Laptop");

    let inactive = vec![device(Some("1"), "Kitchen", false)];
    assert_eq!(choose_device(&inactive, None).unwrap().name, "Kitchen");
    assert!(choose_device(&[], None).is_none());
}

#[tokio::test]
async fn test_bootstrap_resolves_readiness() {
    let player = Arc::new(DevicesOnly(vec![device(Some("dev-9"), "Speaker", true)]));
    let readiness = PlayerReadiness::new();

    let chosen = bootstrap_player(player, Credential::new("token"), readiness.clone(), None)
        .await
        .unwrap();

    assert_eq!(chosen.name, "Speaker");
    assert_eq!(readiness.device_id().as_deref(), Some("dev-9"));
}

#[tokio::test]
async fn test_bootstrap_without_devices() {
    let player = Arc::new(DevicesOnly(vec![]));
    let readiness = PlayerReadiness::new();

    let result = bootstrap_player(player, Credential::new("token"), readiness.clone(), None).await;

    assert_eq!(result, Err(BrowseError::PlayerNotReady));
    assert_eq!(readiness.device_id(), None);
}
