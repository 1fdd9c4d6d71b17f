use std::sync::Arc;

use parking_lot::Mutex;
use shared::domain::{Recipe, Section};
use storage::FlagStore;
use tokio::sync::broadcast;
use tracing::{error, info};

use super::{event_channel, EventSurface, ScreenSettings};
use crate::{
    routing::{reset_onboarding, Route},
    PresentMode, RecipeSource, RevealController, RevealSurface, ScreenEvent, ScreenKind,
};

pub const FEED_COUNT: usize = 9;

/// `(id, title, subtitle)` of the home feed sections, filled three recipes each.
pub const SECTION_TEMPLATES: [(&str, &str, &str); 3] = [
    ("1", "Popular", "See the most popular food on order"),
    ("2", "New Menu", "Try our new menu on the list"),
    ("3", "Recommended for you", "Based on your previous order"),
];

const RECIPES_PER_SECTION: usize = 3;

struct HomeState {
    reveal: RevealController<Recipe>,
    recipes: Vec<Recipe>,
    refreshing: bool,
}

pub struct HomeScreen {
    source: Arc<dyn RecipeSource>,
    surface: Arc<EventSurface>,
    events: broadcast::Sender<ScreenEvent>,
    feed_count: usize,
    inner: Mutex<HomeState>,
}

impl HomeScreen {
    pub fn new(source: Arc<dyn RecipeSource>, settings: ScreenSettings) -> Arc<Self> {
        let events = event_channel();
        let surface = Arc::new(EventSurface::new(ScreenKind::Home, events.clone()));
        let reveal_surface: Arc<dyn RevealSurface<Recipe>> = surface.clone();
        Arc::new(Self {
            source,
            surface,
            events,
            feed_count: settings.feed_count,
            inner: Mutex::new(HomeState {
                reveal: RevealController::new(reveal_surface, settings.reveal_delay),
                recipes: Vec::new(),
                refreshing: false,
            }),
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ScreenEvent> {
        self.events.subscribe()
    }

    /// Fetches the feed; staggered on the first successful load, batch afterwards.
    pub async fn load(&self) -> PresentMode {
        let loading = self.surface.loading();
        let recipes = self.source.fetch_random_items(self.feed_count).await;
        info!(count = recipes.len(), "home: feed loaded");

        let mode = {
            let mut state = self.inner.lock();
            state.recipes = recipes.clone();
            state.reveal.present(recipes)
        };
        drop(loading);
        mode
    }

    /// Pull-to-refresh: refetches and shows the new feed at once.
    pub async fn refresh(&self) {
        {
            let mut state = self.inner.lock();
            if state.refreshing {
                return;
            }
            state.refreshing = true;
            state.reveal.cancel();
        }
        let _ = self.events.send(ScreenEvent::RefreshingChanged(true));

        let recipes = self.source.fetch_random_items(self.feed_count).await;

        {
            let mut state = self.inner.lock();
            state.recipes = recipes.clone();
            state.reveal.show_all(recipes);
            state.refreshing = false;
        }
        let _ = self.events.send(ScreenEvent::RefreshingChanged(false));
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.inner.lock().recipes.clone()
    }

    pub fn visible(&self) -> Vec<Recipe> {
        self.inner.lock().reveal.visible()
    }

    pub fn is_revealing(&self) -> bool {
        self.inner.lock().reveal.is_revealing()
    }

    pub fn sections(&self) -> Vec<Section> {
        split_into_sections(&self.inner.lock().recipes)
    }

    /// Debug action: forget onboarding and go back to the introduction.
    pub async fn reset_onboarding(&self, store: &dyn FlagStore) -> Option<Route> {
        match reset_onboarding(store).await {
            Ok(route) => {
                self.unmount();
                let _ = self.events.send(ScreenEvent::Navigate(route.clone()));
                Some(route)
            }
            Err(err) => {
                error!("home: error resetting onboarding status: {err:#}");
                None
            }
        }
    }

    pub fn unmount(&self) {
        self.inner.lock().reveal.cancel();
    }
}

pub fn split_into_sections(recipes: &[Recipe]) -> Vec<Section> {
    SECTION_TEMPLATES
        .iter()
        .enumerate()
        .map(|(index, (id, title, subtitle))| {
            let start = (index * RECIPES_PER_SECTION).min(recipes.len());
            let end = (start + RECIPES_PER_SECTION).min(recipes.len());
            Section {
                id: id.to_string(),
                title: title.to_string(),
                subtitle: subtitle.to_string(),
                recipes: recipes[start..end].to_vec(),
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../tests/home_tests.rs"]
mod tests;
