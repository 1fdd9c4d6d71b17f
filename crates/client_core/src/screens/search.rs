//! Search screen: debounced text search over the recipe source, with a default
//! feed shown whenever the query is blank.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use shared::domain::Recipe;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::{event_channel, EventSurface, ScreenSettings};
use crate::{
    debounce::Debouncer, PresentMode, RecipeSource, RevealController, RevealSurface, ScreenEvent,
    ScreenKind,
};

pub const SUGGESTION_CHIPS: [&str; 6] = [
    "Chicken",
    "Beef",
    "Pasta",
    "Dessert",
    "Vegetarian",
    "Seafood",
];

struct SearchState {
    query: String,
    defaults: Vec<Recipe>,
    has_searched: bool,
    /// Bumped per executed query so a slow, superseded search cannot overwrite a newer one.
    generation: u64,
    reveal: RevealController<Recipe>,
    debouncer: Debouncer,
}

pub struct SearchScreen {
    source: Arc<dyn RecipeSource>,
    surface: Arc<EventSurface>,
    events: broadcast::Sender<ScreenEvent>,
    feed_count: usize,
    inner: Mutex<SearchState>,
}

impl SearchScreen {
    pub fn new(source: Arc<dyn RecipeSource>, settings: ScreenSettings) -> Arc<Self> {
        let events = event_channel();
        let surface = Arc::new(EventSurface::new(ScreenKind::Search, events.clone()));
        let reveal_surface: Arc<dyn RevealSurface<Recipe>> = surface.clone();
        Arc::new(Self {
            source,
            surface,
            events,
            feed_count: settings.feed_count,
            inner: Mutex::new(SearchState {
                query: String::new(),
                defaults: Vec::new(),
                has_searched: false,
                generation: 0,
                reveal: RevealController::new(reveal_surface, settings.reveal_delay),
                debouncer: Debouncer::new(settings.debounce),
            }),
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ScreenEvent> {
        self.events.subscribe()
    }

    pub fn suggestion_chips(&self) -> &'static [&'static str] {
        &SUGGESTION_CHIPS
    }

    /// Fetches the default feed and shows it unless the user already typed a query.
    pub async fn load_defaults(&self) -> Option<PresentMode> {
        let loading = self.surface.loading();
        let recipes = self.source.fetch_random_items(self.feed_count).await;
        info!(count = recipes.len(), "search: default recipes loaded");

        let mode = {
            let mut state = self.inner.lock();
            state.defaults = recipes.clone();
            if state.query.trim().is_empty() {
                Some(state.reveal.present(recipes))
            } else {
                None
            }
        };
        drop(loading);
        mode
    }

    /// Keystroke handler: stops any reveal and restarts the debounce timer.
    pub fn on_text_changed(self: &Arc<Self>, text: &str) {
        let screen: Weak<Self> = Arc::downgrade(self);
        let text = text.to_string();

        let mut state = self.inner.lock();
        state.query = text.clone();
        state.generation += 1;
        state.reveal.cancel();
        state.debouncer.schedule(async move {
            if let Some(screen) = screen.upgrade() {
                screen.run_query(text).await;
            }
        });
    }

    /// Chip tap: searches right away, dropping any pending debounced query.
    pub async fn select_chip(&self, chip: &str) {
        {
            let mut state = self.inner.lock();
            state.debouncer.cancel();
            state.reveal.cancel();
            state.query = chip.to_string();
        }
        self.run_query(chip.to_string()).await;
    }

    pub fn query(&self) -> String {
        self.inner.lock().query.clone()
    }

    pub fn visible(&self) -> Vec<Recipe> {
        self.inner.lock().reveal.visible()
    }

    pub fn has_searched(&self) -> bool {
        self.inner.lock().has_searched
    }

    pub fn is_revealing(&self) -> bool {
        self.inner.lock().reveal.is_revealing()
    }

    pub fn has_pending_search(&self) -> bool {
        self.inner.lock().debouncer.is_pending()
    }

    pub fn unmount(&self) {
        let mut state = self.inner.lock();
        state.debouncer.cancel();
        state.reveal.cancel();
    }

    async fn run_query(&self, text: String) {
        let query = text.trim().to_string();
        if query.is_empty() {
            self.restore_defaults();
            return;
        }

        let generation = {
            let mut state = self.inner.lock();
            state.generation += 1;
            state.generation
        };

        let loading = self.surface.loading();
        let results = self.source.search_items(&query).await;

        let count = results.len();
        let applied = {
            let mut state = self.inner.lock();
            if state.generation == generation {
                state.has_searched = true;
                state.reveal.show_all(results);
                true
            } else {
                false
            }
        };
        drop(loading);

        if applied {
            info!(query = %query, results = count, "search: results shown");
            let _ = self.events.send(ScreenEvent::SearchCompleted {
                query,
                results: count,
            });
        } else {
            debug!(query = %query, "search: discarded superseded results");
        }
    }

    fn restore_defaults(&self) {
        let mut state = self.inner.lock();
        state.generation += 1;
        let defaults = state.defaults.clone();
        if state.has_searched {
            debug!("search: blank query, showing defaults at once");
            state.reveal.show_all(defaults);
        } else {
            debug!("search: blank query before any search, resuming reveal");
            state.reveal.present(defaults);
        }
    }
}

impl Drop for SearchScreen {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
#[path = "../tests/search_tests.rs"]
mod tests;
