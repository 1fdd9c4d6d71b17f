//! HTTP client for the public MealDB JSON API.

use reqwest::Client;
use shared::{
    domain::{Recipe, RecipeId},
    protocol::MealDbResponse,
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1/";

const RANDOM_ENDPOINT: &str = "random.php";
const LOOKUP_ENDPOINT: &str = "lookup.php";
const SEARCH_ENDPOINT: &str = "search.php";

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("invalid MealDB url: {0}")]
    Url(#[from] url::ParseError),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },
    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiClientError {
    /// Transport failures, throttling and server-side errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Url(_) | Self::Decode { .. } => false,
        }
    }
}

#[derive(Clone)]
pub struct MealDbClient {
    http: Client,
    base_url: Url,
}

impl MealDbClient {
    pub fn new(base_url: &str) -> Result<Self, ApiClientError> {
        Self::with_http_client(Client::new(), base_url)
    }

    pub fn with_http_client(http: Client, base_url: &str) -> Result<Self, ApiClientError> {
        // `Url::join` replaces the last segment unless the base ends with a slash.
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn random_meal(&self) -> Result<Option<Recipe>, ApiClientError> {
        let meals = self.get_meals(RANDOM_ENDPOINT, &[]).await?;
        if meals.is_empty() {
            warn!("mealdb: no meals found in random response");
        }
        Ok(meals.into_iter().next())
    }

    pub async fn lookup_meal(&self, id: &RecipeId) -> Result<Option<Recipe>, ApiClientError> {
        if id.as_str().trim().is_empty() {
            warn!("mealdb: skipping lookup for blank meal id");
            return Ok(None);
        }
        let meals = self
            .get_meals(LOOKUP_ENDPOINT, &[("i", id.as_str())])
            .await?;
        Ok(meals.into_iter().next())
    }

    pub async fn search_meals(&self, query: &str) -> Result<Vec<Recipe>, ApiClientError> {
        self.get_meals(SEARCH_ENDPOINT, &[("s", query)]).await
    }

    async fn get_meals(
        &self,
        endpoint: &'static str,
        query: &[(&str, &str)],
    ) -> Result<Vec<Recipe>, ApiClientError> {
        let url = self.base_url.join(endpoint)?;
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| ApiClientError::Transport { endpoint, source })?;

        let status = res.status();
        if !status.is_success() {
            return Err(ApiClientError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body: MealDbResponse = res
            .json()
            .await
            .map_err(|source| ApiClientError::Decode { endpoint, source })?;
        let raw_meals = body.into_meals();
        let received = raw_meals.len();

        let recipes = raw_meals
            .into_iter()
            .filter_map(|raw| match raw.normalize() {
                Ok(recipe) => Some(recipe),
                Err(err) => {
                    warn!(endpoint, "mealdb: dropping invalid meal record: {err}");
                    None
                }
            })
            .collect::<Vec<_>>();

        debug!(
            endpoint,
            received,
            kept = recipes.len(),
            "mealdb: response decoded"
        );
        Ok(recipes)
    }
}
