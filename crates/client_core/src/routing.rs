use anyhow::{Context, Result};
use shared::domain::RecipeId;
use storage::{FlagStore, ONBOARDED_KEY, ONBOARDED_VALUE};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Onboarding,
    Main,
    Detail(RecipeId),
}

/// Reads the onboarding flag once; anything but `"true"` sends the user to onboarding.
pub async fn startup_route(store: &dyn FlagStore) -> Route {
    match store.get(ONBOARDED_KEY).await {
        Ok(Some(value)) if value == ONBOARDED_VALUE => Route::Main,
        Ok(_) => Route::Onboarding,
        Err(err) => {
            error!("routing: error reading onboarding status: {err:#}");
            Route::Onboarding
        }
    }
}

pub async fn complete_onboarding(store: &dyn FlagStore) -> Result<Route> {
    store
        .set(ONBOARDED_KEY, ONBOARDED_VALUE)
        .await
        .context("failed to save onboarding status")?;
    info!("routing: onboarding completed");
    Ok(Route::Main)
}

pub async fn reset_onboarding(store: &dyn FlagStore) -> Result<Route> {
    store
        .remove(ONBOARDED_KEY)
        .await
        .context("failed to reset onboarding status")?;
    info!("routing: onboarding reset");
    Ok(Route::Onboarding)
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use async_trait::async_trait;
    use storage::MemoryFlagStore;

    use super::*;

    struct BrokenStore;

    #[async_trait]
    impl FlagStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow!("storage offline"))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow!("storage offline"))
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Err(anyhow!("storage offline"))
        }
    }

    #[tokio::test]
    async fn fresh_install_routes_to_onboarding() {
        let store = MemoryFlagStore::new();
        assert_eq!(startup_route(&store).await, Route::Onboarding);
    }

    #[tokio::test]
    async fn only_literal_true_counts_as_onboarded() {
        let store = MemoryFlagStore::with_flag(ONBOARDED_KEY, "yes");
        assert_eq!(startup_route(&store).await, Route::Onboarding);

        let store = MemoryFlagStore::with_flag(ONBOARDED_KEY, ONBOARDED_VALUE);
        assert_eq!(startup_route(&store).await, Route::Main);
    }

    #[tokio::test]
    async fn complete_then_reset_round_trips_route() {
        let store = MemoryFlagStore::new();
        assert_eq!(complete_onboarding(&store).await.expect("complete"), Route::Main);
        assert_eq!(startup_route(&store).await, Route::Main);

        assert_eq!(
            reset_onboarding(&store).await.expect("reset"),
            Route::Onboarding
        );
        assert_eq!(startup_route(&store).await, Route::Onboarding);
    }

    #[tokio::test]
    async fn unreadable_store_falls_back_to_onboarding() {
        assert_eq!(startup_route(&BrokenStore).await, Route::Onboarding);
        let err = complete_onboarding(&BrokenStore)
            .await
            .expect_err("write should fail");
        assert!(err.to_string().contains("onboarding status"));
    }
}
