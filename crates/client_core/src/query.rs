//! Query layer between screens and the MealDB client.
//!
//! Every operation here is infallible from the caller's point of view: failures
//! are retried with capped exponential backoff, logged, and then degraded to an
//! empty or absent result so a screen can render "no items" instead of failing.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use futures::future::join_all;
use rand::Rng;
use shared::domain::{Price, Recipe, RecipeDetail, RecipeId};
use tracing::{debug, error, warn};

use crate::api::{ApiClientError, MealDbClient};

const LIST_PRICE_CENTS: std::ops::Range<u32> = 800..2500;
const DETAIL_PRICE_CENTS: std::ops::Range<u32> = 500..1500;
const RATING_TENTHS: std::ops::Range<u32> = 40..50;
const COMMENT_COUNT: std::ops::Range<u32> = 50..999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt` (0-based): `base * 2^attempt`, capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, ApiClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiClientError>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "query: retrying after error: {err}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Data source the screens pull recipes from.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    async fn fetch_random_items(&self, count: usize) -> Vec<Recipe>;
    async fn fetch_item_by_id(&self, id: &RecipeId) -> Option<RecipeDetail>;
    async fn search_items(&self, query: &str) -> Vec<Recipe>;
}

pub struct RecipeRepository {
    client: MealDbClient,
    retry: RetryPolicy,
    artificial_latency: Option<Duration>,
}

impl RecipeRepository {
    pub fn new(client: MealDbClient) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
            artificial_latency: None,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Delays every result, handy for eyeballing loading states during development.
    pub fn with_artificial_latency(mut self, latency: Duration) -> Self {
        self.artificial_latency = (!latency.is_zero()).then_some(latency);
        self
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.artificial_latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RecipeSource for RecipeRepository {
    async fn fetch_random_items(&self, count: usize) -> Vec<Recipe> {
        let calls = (0..count).map(|_| self.retry.run("random", || self.client.random_meal()));
        let results = join_all(calls).await;

        let mut recipes = Vec::with_capacity(count);
        for result in results {
            match result {
                Ok(Some(recipe)) => recipes.push(recipe.with_price(random_list_price())),
                Ok(None) => {}
                Err(err) => error!("query: error fetching random meal: {err}"),
            }
        }

        self.simulate_latency().await;
        debug!(requested = count, received = recipes.len(), "query: random meals");
        recipes
    }

    async fn fetch_item_by_id(&self, id: &RecipeId) -> Option<RecipeDetail> {
        let result = self.retry.run("lookup", || self.client.lookup_meal(id)).await;
        self.simulate_latency().await;

        match result {
            Ok(Some(recipe)) => Some(detail_for(recipe)),
            Ok(None) => {
                warn!(id = %id, "query: no meal found");
                None
            }
            Err(err) => {
                error!(id = %id, "query: error fetching meal: {err}");
                None
            }
        }
    }

    async fn search_items(&self, query: &str) -> Vec<Recipe> {
        let query = query.trim();
        if query.is_empty() {
            debug!("query: skipping search for blank query");
            return Vec::new();
        }

        let result = self.retry.run("search", || self.client.search_meals(query)).await;
        self.simulate_latency().await;

        match result {
            Ok(recipes) => recipes
                .into_iter()
                .map(|recipe| recipe.with_price(random_list_price()))
                .collect(),
            Err(err) => {
                error!(query, "query: error searching meals: {err}");
                Vec::new()
            }
        }
    }
}

pub fn random_list_price() -> Price {
    Price::from_cents(rand::rng().random_range(LIST_PRICE_CENTS))
}

/// Attaches the detail-screen extras: its own price, a star rating and a comment count.
pub fn detail_for(recipe: Recipe) -> RecipeDetail {
    let mut rng = rand::rng();
    let price = Price::from_cents(rng.random_range(DETAIL_PRICE_CENTS));
    let rating = rng.random_range(RATING_TENTHS) as f32 / 10.0;
    let comments = rng.random_range(COMMENT_COUNT);
    RecipeDetail {
        recipe: recipe.with_price(price),
        rating,
        comments,
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
