use shared::{domain::Recipe, error::ErrorCode};

pub mod api;
pub mod debounce;
pub mod query;
pub mod reveal;
pub mod routing;
pub mod screens;

pub use api::{ApiClientError, MealDbClient, DEFAULT_BASE_URL};
pub use query::{RecipeRepository, RecipeSource, RetryPolicy};
pub use reveal::{PresentMode, RevealController, RevealHandle, RevealSurface};
pub use routing::{startup_route, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Home,
    Search,
    Detail,
    Profile,
}

/// State changes a screen publishes to whatever renders it.
#[derive(Debug, Clone)]
pub enum ScreenEvent {
    ItemsChanged {
        screen: ScreenKind,
        items: Vec<Recipe>,
    },
    LoadingChanged {
        screen: ScreenKind,
        loading: bool,
    },
    RefreshingChanged(bool),
    SearchCompleted {
        query: String,
        results: usize,
    },
    Alert {
        screen: ScreenKind,
        title: String,
        message: String,
        code: Option<ErrorCode>,
        offer_back: bool,
    },
    Navigate(Route),
}
