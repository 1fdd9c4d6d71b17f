use std::sync::Arc;

use shared::{
    domain::{RecipeDetail, RecipeId},
    error::ErrorCode,
};
use tokio::sync::broadcast;
use tracing::warn;

use super::{event_channel, EventSurface};
use crate::{RecipeSource, ScreenEvent, ScreenKind};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loaded(RecipeDetail),
    MissingId,
    NotFound(RecipeId),
}

pub struct DetailScreen {
    source: Arc<dyn RecipeSource>,
    surface: EventSurface,
    events: broadcast::Sender<ScreenEvent>,
}

impl DetailScreen {
    pub fn new(source: Arc<dyn RecipeSource>) -> Self {
        let events = event_channel();
        Self {
            source,
            surface: EventSurface::new(ScreenKind::Detail, events.clone()),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ScreenEvent> {
        self.events.subscribe()
    }

    /// Loads the recipe behind a route parameter; failures alert and offer a way back.
    pub async fn open(&self, id: Option<&str>) -> DetailState {
        let Some(id) = id.and_then(RecipeId::parse) else {
            warn!("detail: opened without a recipe id");
            self.surface.alert(
                "Recipe unavailable",
                "No recipe was selected.",
                Some(ErrorCode::MissingId),
                true,
            );
            return DetailState::MissingId;
        };

        let loading = self.surface.loading();
        let detail = self.source.fetch_item_by_id(&id).await;
        drop(loading);

        match detail {
            Some(detail) => DetailState::Loaded(detail),
            None => {
                self.surface.alert(
                    "Recipe not found",
                    format!("We couldn't load recipe {id}."),
                    Some(ErrorCode::NotFound),
                    true,
                );
                DetailState::NotFound(id)
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/detail_tests.rs"]
mod tests;
