mod browser;
mod credential;
mod player;
pub mod store;
mod window;

pub use browser::DEFAULT_READY_TIMEOUT;
pub use browser::NowPlaying;
pub use browser::PlaybackAction;
pub use browser::PrefetchStatus;
pub use browser::SelectOutcome;
pub use browser::TrackBrowser;
pub use credential::Credential;
pub use credential::CredentialCell;
pub use player::PlayerEvents;
pub use player::PlayerReadiness;
pub use player::StateHandler;
pub use player::Subscription;
pub use store::MemoryStore;
pub use store::SessionStore;
pub use window::FetchKind;
pub use window::Maintenance;
pub use window::PageOutcome;
pub use window::PageRequest;
pub use window::PlayerCommand;
pub use window::ResultWindow;
pub use window::SelectPlan;
pub use window::WindowSnapshot;
pub use window::WindowState;
