use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::domain::{Price, Recipe, RecipeDetail, RecipeId};
use tokio::{sync::broadcast, time::Instant};

use crate::{RecipeSource, RevealSurface, ScreenEvent};

pub(crate) fn recipe(id: &str, name: &str) -> Recipe {
    Recipe {
        id: RecipeId(id.to_string()),
        name: name.to_string(),
        category: "Chicken".to_string(),
        area: "Japanese".to_string(),
        instructions: "Cook it.".to_string(),
        thumbnail_url: format!("https://img/{id}.jpg"),
        youtube_url: None,
        ingredients: Vec::new(),
        price: Some(Price::from_cents(1200)),
    }
}

pub(crate) fn sample_recipes(prefix: &str, count: usize) -> Vec<Recipe> {
    (1..=count)
        .map(|i| recipe(&format!("{prefix}{i}"), &format!("{prefix} {i}")))
        .collect()
}

pub(crate) fn names(recipes: &[Recipe]) -> Vec<String> {
    recipes.iter().map(|r| r.name.clone()).collect()
}

pub(crate) fn drain_events(rx: &mut broadcast::Receiver<ScreenEvent>) -> Vec<ScreenEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub(crate) struct FakeSource {
    feed: Vec<Recipe>,
    search_results: Vec<Recipe>,
    search_latency: Duration,
    pub(crate) queries: Mutex<Vec<String>>,
    pub(crate) random_calls: Mutex<u32>,
}

impl FakeSource {
    pub(crate) fn new(feed: Vec<Recipe>) -> Self {
        Self {
            feed,
            search_results: Vec::new(),
            search_latency: Duration::ZERO,
            queries: Mutex::new(Vec::new()),
            random_calls: Mutex::new(0),
        }
    }

    pub(crate) fn with_search_results(mut self, results: Vec<Recipe>) -> Self {
        self.search_results = results;
        self
    }

    pub(crate) fn with_search_latency(mut self, latency: Duration) -> Self {
        self.search_latency = latency;
        self
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl RecipeSource for FakeSource {
    async fn fetch_random_items(&self, count: usize) -> Vec<Recipe> {
        *self.random_calls.lock() += 1;
        self.feed.iter().take(count).cloned().collect()
    }

    async fn fetch_item_by_id(&self, id: &RecipeId) -> Option<RecipeDetail> {
        self.feed
            .iter()
            .find(|recipe| &recipe.id == id)
            .map(|recipe| RecipeDetail {
                recipe: recipe.clone(),
                rating: 4.3,
                comments: 980,
            })
    }

    async fn search_items(&self, query: &str) -> Vec<Recipe> {
        self.queries.lock().push(query.to_string());
        if !self.search_latency.is_zero() {
            tokio::time::sleep(self.search_latency).await;
        }
        self.search_results.clone()
    }
}

/// Records every render with the paused-clock time it happened at.
pub(crate) struct RecordingSurface<T> {
    started: Instant,
    frames: Mutex<Vec<(u64, Vec<T>)>>,
}

impl<T: Clone> RecordingSurface<T> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            started: Instant::now(),
            frames: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn frames(&self) -> Vec<(u64, Vec<T>)> {
        self.frames.lock().clone()
    }

    pub(crate) fn frame_count(&self) -> usize {
        self.frames.lock().len()
    }
}

impl<T: Clone + Send> RevealSurface<T> for RecordingSurface<T> {
    fn render(&self, visible: &[T]) {
        let elapsed = self.started.elapsed().as_millis() as u64;
        self.frames.lock().push((elapsed, visible.to_vec()));
    }
}
