//! Screen controllers: the state and behavior behind each app screen, minus rendering.

use std::time::Duration;

use shared::{domain::Recipe, error::ErrorCode};
use tokio::sync::broadcast;

use crate::{
    debounce::DEFAULT_DEBOUNCE, reveal::DEFAULT_REVEAL_DELAY, RevealSurface, ScreenEvent,
    ScreenKind,
};

pub mod cart;
pub mod detail;
pub mod home;
pub mod onboarding;
pub mod profile;
pub mod search;

pub use cart::QuantitySelector;
pub use detail::{DetailScreen, DetailState};
pub use home::HomeScreen;
pub use onboarding::{OnboardingFlow, Slide, SLIDES};
pub use profile::{
    Notification, NotificationCenter, NotificationOutcome, PermissionStatus, ProfileScreen,
};
pub use search::SearchScreen;

const EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSettings {
    pub reveal_delay: Duration,
    pub debounce: Duration,
    /// Recipes fetched for the home feed and for the search screen's defaults.
    pub feed_count: usize,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            reveal_delay: DEFAULT_REVEAL_DELAY,
            debounce: DEFAULT_DEBOUNCE,
            feed_count: home::FEED_COUNT,
        }
    }
}

pub(crate) fn event_channel() -> broadcast::Sender<ScreenEvent> {
    let (events, _) = broadcast::channel(EVENT_CAPACITY);
    events
}

/// Surface that turns reveal steps into broadcast events.
pub(crate) struct EventSurface {
    screen: ScreenKind,
    events: broadcast::Sender<ScreenEvent>,
}

impl EventSurface {
    pub(crate) fn new(screen: ScreenKind, events: broadcast::Sender<ScreenEvent>) -> Self {
        Self { screen, events }
    }

    /// Raises the loading flag until the returned guard is dropped, even when
    /// the awaiting task is aborted.
    pub(crate) fn loading(&self) -> LoadingGuard<'_> {
        self.set_loading(true);
        LoadingGuard { surface: self }
    }

    pub(crate) fn alert(
        &self,
        title: &str,
        message: impl Into<String>,
        code: Option<ErrorCode>,
        offer_back: bool,
    ) {
        let _ = self.events.send(ScreenEvent::Alert {
            screen: self.screen,
            title: title.to_string(),
            message: message.into(),
            code,
            offer_back,
        });
    }
}

impl RevealSurface<Recipe> for EventSurface {
    fn render(&self, visible: &[Recipe]) {
        let _ = self.events.send(ScreenEvent::ItemsChanged {
            screen: self.screen,
            items: visible.to_vec(),
        });
    }

    fn set_loading(&self, loading: bool) {
        let _ = self.events.send(ScreenEvent::LoadingChanged {
            screen: self.screen,
            loading,
        });
    }
}

pub(crate) struct LoadingGuard<'a> {
    surface: &'a EventSurface,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.surface.set_loading(false);
    }
}

#[cfg(test)]
#[path = "../tests/support.rs"]
pub(crate) mod test_support;
